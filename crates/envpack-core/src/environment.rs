//! Deployment environments
//!
//! An environment is a pre-existing directory `<environments_dir>/<name>`
//! holding every manifest for one deployment target. It is never created here.

use std::path::{Path, PathBuf};

use crate::error::{CoreError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    name: String,
    dir: PathBuf,
}

impl Environment {
    /// Resolve `name` under `root`, rejecting names with path separators and
    /// environments whose directory is missing.
    pub fn open(root: &Path, name: &str) -> Result<Self> {
        validate_name(name)?;
        let dir = root.join(name);
        if !dir.is_dir() {
            return Err(CoreError::EnvironmentNotFound { path: dir });
        }
        Ok(Self {
            name: name.to_string(),
            dir,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of a file relative to the environment directory
    pub fn join(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.dir.join(relative)
    }

    /// Read the release marker, if present
    ///
    /// The marker value is the trimmed first line. A missing file and a blank
    /// first line both read as `None`.
    pub fn read_release_marker(&self, marker_file: &str) -> Result<Option<String>> {
        let path = self.join(marker_file);
        if !path.is_file() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&path)?;
        Ok(first_line(&content))
    }
}

pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() || name.contains(['/', '\\']) {
        return Err(CoreError::InvalidEnvironmentName {
            name: name.to_string(),
        });
    }
    Ok(())
}

fn first_line(content: &str) -> Option<String> {
    content
        .lines()
        .next()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
}
