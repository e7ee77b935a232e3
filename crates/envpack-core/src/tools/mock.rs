//! In-memory toolbox for testing
//!
//! Answers queries from canned data and records every call, so reconciliation
//! can be exercised without `git` or real archives.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use super::Toolbox;
use crate::error::{CoreError, Result};

/// A call made against [`MockToolbox`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolCall {
    Extract { archive: PathBuf, dest: PathBuf },
    ListMembers { archive: PathBuf },
    ChangedFiles { scope: PathBuf },
    Diff { path: PathBuf },
}

#[derive(Clone, Default)]
pub struct MockToolbox {
    /// Files written relative to `dest` on extract
    extracted: Vec<(String, String)>,
    extract_failure: Option<String>,
    /// `None` makes listing unavailable
    members: Option<Vec<String>>,
    changed: Vec<String>,
    /// Diff output per path; unknown paths diff empty
    diffs: HashMap<PathBuf, String>,
    /// Behave like dry-run: no extraction, no query results
    suppressed: bool,
    calls: Arc<RwLock<Vec<ToolCall>>>,
}

impl MockToolbox {
    pub fn new() -> Self {
        Self {
            members: Some(Vec::new()),
            ..Self::default()
        }
    }

    /// Write `content` to `path` (relative to the destination) on extract
    pub fn with_extracted_file(mut self, path: &str, content: &str) -> Self {
        self.extracted.push((path.to_string(), content.to_string()));
        self
    }

    pub fn with_extract_failure(mut self, message: &str) -> Self {
        self.extract_failure = Some(message.to_string());
        self
    }

    pub fn with_members(mut self, members: &[&str]) -> Self {
        self.members = Some(members.iter().map(|m| m.to_string()).collect());
        self
    }

    pub fn without_listing(mut self) -> Self {
        self.members = None;
        self
    }

    pub fn with_changed_files(mut self, files: &[&str]) -> Self {
        self.changed = files.iter().map(|f| f.to_string()).collect();
        self
    }

    pub fn with_diff(mut self, path: impl Into<PathBuf>, diff: &str) -> Self {
        self.diffs.insert(path.into(), diff.to_string());
        self
    }

    pub fn suppressed(mut self) -> Self {
        self.suppressed = true;
        self
    }

    /// Calls recorded so far, in order
    pub fn calls(&self) -> Vec<ToolCall> {
        self.calls.read().unwrap().clone()
    }

    fn record(&self, call: ToolCall) {
        self.calls.write().unwrap().push(call);
    }
}

impl Toolbox for MockToolbox {
    fn extract(&self, archive: &Path, dest: &Path) -> Result<()> {
        self.record(ToolCall::Extract {
            archive: archive.to_path_buf(),
            dest: dest.to_path_buf(),
        });
        if let Some(message) = &self.extract_failure {
            return Err(CoreError::CommandFailed {
                command: format!("extract {}", archive.display()),
                stderr: message.clone(),
            });
        }
        if self.suppressed {
            return Ok(());
        }
        for (path, content) in &self.extracted {
            let target = dest.join(path);
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(target, content)?;
        }
        Ok(())
    }

    fn list_members(&self, archive: &Path) -> Result<Option<Vec<String>>> {
        self.record(ToolCall::ListMembers {
            archive: archive.to_path_buf(),
        });
        Ok(self.members.clone())
    }

    fn changed_files(&self, scope: &Path) -> Result<Option<Vec<String>>> {
        self.record(ToolCall::ChangedFiles {
            scope: scope.to_path_buf(),
        });
        if self.suppressed {
            return Ok(None);
        }
        Ok(Some(self.changed.clone()))
    }

    fn diff(&self, path: &Path) -> Result<Option<String>> {
        self.record(ToolCall::Diff {
            path: path.to_path_buf(),
        });
        if self.suppressed {
            return Ok(None);
        }
        Ok(Some(self.diffs.get(path).cloned().unwrap_or_default()))
    }
}
