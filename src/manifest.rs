use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use toml_edit::{Array, DocumentMut};

use crate::config::BuildConfig;

/// What `ensure_include` did to the manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IncludeOutcome {
    Added,
    AlreadyPresent,
    /// The package declares no `include` list, so nothing was touched.
    NoIncludeList,
}

/// A crate's `Cargo.toml`, kept as a format-preserving document so that
/// rewriting it leaves comments and key order alone.
#[derive(Debug, Clone)]
pub struct CargoManifest {
    path: PathBuf,
    document: DocumentMut,
}

impl CargoManifest {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read Cargo manifest from {}", path.display()))?;

        Self::parse(path, &content)
    }

    pub fn parse(path: impl AsRef<Path>, content: &str) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let document = content
            .parse::<DocumentMut>()
            .with_context(|| format!("Failed to parse Cargo manifest {}", path.display()))?;

        Ok(Self { path, document })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Entries of `package.include`, or `None` when the key is absent.
    pub fn include_list(&self) -> Result<Option<Vec<String>>> {
        let Some(array) = self.include_array()? else {
            return Ok(None);
        };

        let entries = array
            .iter()
            .map(|value| {
                value
                    .as_str()
                    .map(str::to_string)
                    .ok_or_else(|| anyhow!("Non-string entry in package.include: {}", value))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Some(entries))
    }

    /// Appends `entry` to `package.include` unless it is already listed.
    /// A package without an `include` list is left as it is.
    pub fn ensure_include(&mut self, entry: &str) -> Result<IncludeOutcome> {
        match self.include_list()? {
            None => return Ok(IncludeOutcome::NoIncludeList),
            Some(entries) if entries.iter().any(|e| e == entry) => {
                return Ok(IncludeOutcome::AlreadyPresent);
            }
            Some(_) => {}
        }

        let manifest_path = self.path.display().to_string();
        let array = self
            .document
            .get_mut("package")
            .and_then(|package| package.as_table_like_mut())
            .and_then(|package| package.get_mut("include"))
            .and_then(|include| include.as_array_mut())
            .ok_or_else(|| anyhow!("package.include disappeared from {}", manifest_path))?;
        array.push(entry);

        Ok(IncludeOutcome::Added)
    }

    pub fn save(&self) -> Result<()> {
        fs::write(&self.path, self.to_toml_string())
            .with_context(|| format!("Failed to write Cargo manifest to {}", self.path.display()))
    }

    pub fn to_toml_string(&self) -> String {
        self.document.to_string()
    }

    fn include_array(&self) -> Result<Option<&Array>> {
        let package = self
            .document
            .get("package")
            .and_then(|package| package.as_table_like())
            .ok_or_else(|| anyhow!("No [package] table in {}", self.path.display()))?;

        match package.get("include") {
            None => Ok(None),
            Some(include) => include
                .as_array()
                .map(Some)
                .ok_or_else(|| anyhow!("package.include in {} is not an array", self.path.display())),
        }
    }
}

/// Makes sure the crate manifest lists the required include entry,
/// rewriting the file only when it had to be added.
pub fn sync_manifest(config: &BuildConfig) -> Result<IncludeOutcome> {
    let mut manifest = CargoManifest::load(config.manifest_path())?;
    let outcome = manifest.ensure_include(config.required_include())?;

    match outcome {
        IncludeOutcome::Added => {
            manifest.save()?;
            log::info!(
                "added {} to package.include in {}",
                config.required_include(),
                manifest.path().display()
            );
        }
        IncludeOutcome::AlreadyPresent => {
            log::debug!("{} already in package.include", config.required_include());
        }
        IncludeOutcome::NoIncludeList => {
            log::debug!("{} has no package.include, leaving it alone", manifest.path().display());
        }
    }

    Ok(outcome)
}
