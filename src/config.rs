use std::path::{Path, PathBuf};

pub const DEFAULT_CRATE_DIR: &str = "pngquant";
pub const DEFAULT_DIST_DIR: &str = "dist";
pub const DEFAULT_TOOL: &str = "maturin";
pub const PYPROJECT_FILE: &str = "pyproject.toml";
pub const CARGO_MANIFEST_FILE: &str = "Cargo.toml";

/// Entry maturin needs in the crate's `package.include` so the sdist
/// carries its `pyproject.toml`.
pub const REQUIRED_INCLUDE: &str = "/pyproject.toml";

/// Paths and names used for a single packaging run.
///
/// Everything is derived from the project root unless overridden.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    root_dir: PathBuf,
    crate_dir: PathBuf,
    dist_dir: PathBuf,
    tool: String,
    required_include: String,
}

impl BuildConfig {
    pub fn new(root_dir: impl AsRef<Path>) -> Self {
        let root_dir = root_dir.as_ref().to_path_buf();

        Self {
            crate_dir: root_dir.join(DEFAULT_CRATE_DIR),
            dist_dir: root_dir.join(DEFAULT_DIST_DIR),
            root_dir,
            tool: DEFAULT_TOOL.to_string(),
            required_include: REQUIRED_INCLUDE.to_string(),
        }
    }

    pub fn with_crate_dir(mut self, crate_dir: impl AsRef<Path>) -> Self {
        self.crate_dir = self.resolve(crate_dir.as_ref());
        self
    }

    pub fn with_dist_dir(mut self, dist_dir: impl AsRef<Path>) -> Self {
        self.dist_dir = self.resolve(dist_dir.as_ref());
        self
    }

    pub fn with_tool(mut self, tool: impl Into<String>) -> Self {
        self.tool = tool.into();
        self
    }

    pub fn with_required_include(mut self, entry: impl Into<String>) -> Self {
        self.required_include = entry.into();
        self
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root_dir.join(path)
        }
    }

    pub fn crate_dir(&self) -> &Path {
        &self.crate_dir
    }

    pub fn dist_dir(&self) -> &Path {
        &self.dist_dir
    }

    pub fn tool(&self) -> &str {
        &self.tool
    }

    pub fn required_include(&self) -> &str {
        &self.required_include
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.crate_dir.join(CARGO_MANIFEST_FILE)
    }

    pub fn pyproject_source(&self) -> PathBuf {
        self.root_dir.join(PYPROJECT_FILE)
    }

    pub fn pyproject_target(&self) -> PathBuf {
        self.crate_dir.join(PYPROJECT_FILE)
    }
}
