//! Toolbox backed by the local filesystem and `git`

use std::ffi::OsStr;
use std::path::Path;
use tracing::info;

use super::{ProcessRunner, Toolbox};
use crate::archive;
use crate::error::Result;

/// Native archive handling plus `git` subprocesses for version control
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemToolbox {
    runner: ProcessRunner,
}

impl SystemToolbox {
    pub fn new(dry_run: bool) -> Self {
        Self {
            runner: ProcessRunner::new(dry_run),
        }
    }
}

impl Toolbox for SystemToolbox {
    fn extract(&self, archive_path: &Path, dest: &Path) -> Result<()> {
        if self.runner.is_dry_run() {
            info!("Dryrun: extract {} into {}", archive_path.display(), dest.display());
            return Ok(());
        }
        archive::extract_archive(archive_path, dest)
    }

    fn list_members(&self, archive_path: &Path) -> Result<Option<Vec<String>>> {
        // Listing is read-only, so it stays available under dry-run.
        archive::list_members(archive_path).map(Some)
    }

    fn changed_files(&self, scope: &Path) -> Result<Option<Vec<String>>> {
        let args: [&OsStr; 5] = [
            OsStr::new("status"),
            OsStr::new("--porcelain"),
            OsStr::new("--untracked-files=all"),
            OsStr::new("--"),
            scope.as_os_str(),
        ];
        let out = self.runner.run("git", args)?;
        Ok(out.map(|stdout| parse_porcelain_status(&stdout)))
    }

    fn diff(&self, path: &Path) -> Result<Option<String>> {
        let args: [&OsStr; 3] = [OsStr::new("diff"), OsStr::new("--"), path.as_os_str()];
        self.runner.run("git", args)
    }
}

/// Extract paths from `git status --porcelain` output
///
/// Renames report their destination path. Quoted paths are unquoted.
pub fn parse_porcelain_status(output: &str) -> Vec<String> {
    output
        .lines()
        .filter(|line| line.len() > 3)
        .map(|line| {
            let path = &line[3..];
            let path = match path.split_once(" -> ") {
                Some((_, renamed)) => renamed,
                None => path,
            };
            unquote(path)
        })
        .collect()
}

/// Undo git's C-style path quoting
///
/// Non-ASCII bytes arrive as `\NNN` octal escapes and are decoded back into
/// UTF-8.
fn unquote(path: &str) -> String {
    let Some(inner) = path.strip_prefix('"').and_then(|p| p.strip_suffix('"')) else {
        return path.to_string();
    };

    let mut bytes = Vec::with_capacity(inner.len());
    let mut rest = inner.as_bytes();
    while let Some((&b, tail)) = rest.split_first() {
        rest = tail;
        if b != b'\\' {
            bytes.push(b);
            continue;
        }
        let Some((&esc, tail)) = rest.split_first() else {
            bytes.push(b'\\');
            break;
        };
        rest = tail;
        match esc {
            b'a' => bytes.push(0x07),
            b'b' => bytes.push(0x08),
            b'f' => bytes.push(0x0c),
            b'n' => bytes.push(b'\n'),
            b'r' => bytes.push(b'\r'),
            b't' => bytes.push(b'\t'),
            b'v' => bytes.push(0x0b),
            b'0'..=b'3' if rest.len() >= 2 && is_octal(rest[0]) && is_octal(rest[1]) => {
                bytes.push(((esc - b'0') << 6) | ((rest[0] - b'0') << 3) | (rest[1] - b'0'));
                rest = &rest[2..];
            }
            other => bytes.push(other),
        }
    }
    String::from_utf8_lossy(&bytes).into_owned()
}

fn is_octal(b: u8) -> bool {
    (b'0'..=b'7').contains(&b)
}
