use anyhow::{Context, Result};
use std::fs;

use crate::config::BuildConfig;

/// Copies the project's `pyproject.toml` next to the crate manifest,
/// where maturin looks for it. Any existing copy is overwritten.
pub fn sync_pyproject(config: &BuildConfig) -> Result<u64> {
    let source = config.pyproject_source();
    let target = config.pyproject_target();

    let bytes = fs::copy(&source, &target).with_context(|| {
        format!(
            "Failed to copy {} to {}",
            source.display(),
            target.display()
        )
    })?;

    log::info!("copied {} -> {} ({} bytes)", source.display(), target.display(), bytes);

    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn layout() -> (tempfile::TempDir, BuildConfig) {
        let root = tempdir().unwrap();
        let config = BuildConfig::new(root.path());
        fs::create_dir_all(config.crate_dir()).unwrap();
        (root, config)
    }

    #[test]
    fn test_copy_creates_target() {
        let (_root, config) = layout();
        fs::write(config.pyproject_source(), "[project]\nname = \"pngquant\"\n").unwrap();

        let bytes = sync_pyproject(&config).unwrap();

        let copied = fs::read(config.pyproject_target()).unwrap();
        assert_eq!(copied, fs::read(config.pyproject_source()).unwrap());
        assert_eq!(bytes, copied.len() as u64);
    }

    #[test]
    fn test_copy_overwrites_stale_target() {
        let (_root, config) = layout();
        fs::write(config.pyproject_source(), "short").unwrap();
        fs::write(config.pyproject_target(), "a much longer stale copy of the file").unwrap();

        sync_pyproject(&config).unwrap();

        assert_eq!(fs::read_to_string(config.pyproject_target()).unwrap(), "short");
    }

    #[test]
    fn test_missing_source_fails() {
        let (_root, config) = layout();
        assert!(sync_pyproject(&config).is_err());
        assert!(!config.pyproject_target().exists());
    }
}
