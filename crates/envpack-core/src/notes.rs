//! Operator notes
//!
//! Advisories accumulate in order during a run and are numbered only when
//! rendered.

use std::io::Write;
use std::path::Path;
use tracing::info;

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Informational, nothing to do
    Info,
    /// A follow-up the operator must perform
    Action,
    /// Disruptive follow-up required before pushing changes
    Critical,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advisory {
    pub severity: Severity,
    pub message: String,
}

impl Advisory {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            message: message.into(),
        }
    }

    pub fn action(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Action,
            message: message.into(),
        }
    }

    pub fn critical(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Critical,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Notes {
    advisories: Vec<Advisory>,
}

impl Notes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, advisory: Advisory) {
        self.advisories.push(advisory);
    }

    pub fn extend(&mut self, advisories: impl IntoIterator<Item = Advisory>) {
        self.advisories.extend(advisories);
    }

    pub fn advisories(&self) -> &[Advisory] {
        &self.advisories
    }

    pub fn len(&self) -> usize {
        self.advisories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.advisories.is_empty()
    }

    /// Numbered `(n, advisory)` pairs, starting at 1
    pub fn numbered(&self) -> impl Iterator<Item = (usize, &Advisory)> {
        self.advisories.iter().enumerate().map(|(i, a)| (i + 1, a))
    }

    /// Write the plain-text rendering
    pub fn write_to<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        for (n, advisory) in self.numbered() {
            write!(out, "NOTE {n}\n\n")?;
            write!(out, "  {}\n\n", advisory.message)?;
        }
        Ok(())
    }

    pub fn render(&self) -> String {
        let mut buf = Vec::new();
        // Writing into a Vec cannot fail.
        let _ = self.write_to(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Persist to `path`, overwriting it; skipped under dry-run
    ///
    /// Returns whether the file was written.
    pub fn persist(&self, path: &Path, dry_run: bool) -> Result<bool> {
        if dry_run {
            info!("Dryrun: skip writing {}", path.display());
            return Ok(false);
        }
        let mut file = std::fs::File::create(path)?;
        self.write_to(&mut file)?;
        Ok(true)
    }
}
