//! Table of contents for the last unpacked release
//!
//! The TOC records which files in an environment came from the release
//! tarball. It is rebuilt from scratch on every unpack, and read back by
//! downstream checks that must skip release-owned files.

use std::path::Path;
use tracing::info;

use crate::error::{CoreError, Result};
use crate::tools::Toolbox;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableOfContents {
    entries: Vec<String>,
}

impl TableOfContents {
    /// Build from raw archive member names, prefixing each with `env_dir`
    ///
    /// Directory members and empty names are dropped.
    pub fn from_members<I, S>(env_dir: &Path, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let prefix = env_dir.display().to_string();
        let entries = members
            .into_iter()
            .filter_map(|m| normalize_member(m.as_ref()).map(|short| format!("{prefix}/{short}")))
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.iter().any(|e| e == path)
    }

    /// Render one entry per line
    pub fn render(&self) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            out.push_str(entry);
            out.push('\n');
        }
        out
    }

    /// Overwrite `path` with this TOC
    pub fn write(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.render())?;
        Ok(())
    }

    /// Read a persisted TOC
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let entries = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect();
        Ok(Self { entries })
    }
}

/// Strip leading `./` markers; `None` for directories and empty names
pub fn normalize_member(raw: &str) -> Option<&str> {
    let mut short = raw;
    while let Some(rest) = short.strip_prefix("./") {
        short = rest;
    }
    if short.is_empty() || short.ends_with('/') {
        None
    } else {
        Some(short)
    }
}

/// List `archive` and persist its TOC to `toc_path`
///
/// Under dry-run nothing is written, and an unavailable listing is a no-op.
pub fn extract_table_of_contents(
    tools: &dyn Toolbox,
    archive: &Path,
    env_dir: &Path,
    toc_path: &Path,
    dry_run: bool,
) -> Result<Option<TableOfContents>> {
    let wrap = |e: CoreError| CoreError::TableOfContents {
        archive: archive.to_path_buf(),
        message: e.to_string(),
    };

    let Some(members) = tools.list_members(archive).map_err(wrap)? else {
        return Ok(None);
    };

    let toc = TableOfContents::from_members(env_dir, &members);
    if dry_run {
        info!("Dryrun: skip writing {} ({} entries)", toc_path.display(), toc.len());
    } else {
        toc.write(toc_path).map_err(wrap)?;
        info!("Wrote {} ({} entries)", toc_path.display(), toc.len());
    }
    Ok(Some(toc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::MockToolbox;
    use tempfile::TempDir;

    #[test]
    fn test_normalize_member() {
        assert_eq!(normalize_member("a/b.yaml"), Some("a/b.yaml"));
        assert_eq!(normalize_member("./c.yaml"), Some("c.yaml"));
        assert_eq!(normalize_member("dir/"), None);
        assert_eq!(normalize_member("./"), None);
        assert_eq!(normalize_member(""), None);
    }

    #[test]
    fn test_toc_skips_directories_and_dot_prefix() {
        let toc = TableOfContents::from_members(
            Path::new("environments/dev"),
            ["a/b.yaml", "./c.yaml", "dir/"],
        );
        assert_eq!(
            toc.entries(),
            &["environments/dev/a/b.yaml", "environments/dev/c.yaml"]
        );
    }

    #[test]
    fn test_extract_overwrites_prior_toc() {
        let temp = TempDir::new().unwrap();
        let toc_path = temp.path().join("manifest-toc.txt");
        std::fs::write(&toc_path, "environments/dev/stale.yaml\n").unwrap();

        let tools = MockToolbox::new().with_members(&["a/b.yaml", "./c.yaml", "dir/"]);
        let env_dir = Path::new("environments/dev");
        extract_table_of_contents(&tools, Path::new("r.tar"), env_dir, &toc_path, false)
            .unwrap();

        let content = std::fs::read_to_string(&toc_path).unwrap();
        assert_eq!(content, "environments/dev/a/b.yaml\nenvironments/dev/c.yaml\n");

        let loaded = TableOfContents::load(&toc_path).unwrap();
        assert_eq!(loaded.len(), 2);
        assert!(loaded.contains("environments/dev/c.yaml"));
        assert!(!loaded.contains("environments/dev/stale.yaml"));
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let temp = TempDir::new().unwrap();
        let toc_path = temp.path().join("manifest-toc.txt");

        let tools = MockToolbox::new().with_members(&["a.yaml"]);
        let toc = extract_table_of_contents(&tools, Path::new("r.tar"), temp.path(), &toc_path, true)
            .unwrap();
        assert_eq!(toc.map(|t| t.len()), Some(1));
        assert!(!toc_path.exists());
    }

    #[test]
    fn test_unavailable_listing_is_noop() {
        let temp = TempDir::new().unwrap();
        let toc_path = temp.path().join("manifest-toc.txt");

        let tools = MockToolbox::new().without_listing();
        let toc = extract_table_of_contents(&tools, Path::new("r.tar"), temp.path(), &toc_path, true)
            .unwrap();
        assert!(toc.is_none());
        assert!(!toc_path.exists());
    }

    #[test]
    fn test_load_missing_toc() {
        let temp = TempDir::new().unwrap();
        let err = TableOfContents::load(&temp.path().join("manifest-toc.txt")).unwrap_err();
        assert!(matches!(err, CoreError::Io(ref e) if e.kind() == std::io::ErrorKind::NotFound));
    }
}
