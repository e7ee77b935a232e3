//! Release tarball unpacking
//!
//! Unpacking captures the release marker on both sides of extraction so the
//! caller can judge how disruptive the incoming release is.

use std::path::Path;
use tracing::{info, warn};

use crate::config::EnvpackConfig;
use crate::environment::Environment;
use crate::error::{CoreError, Result};
use crate::toc::{TableOfContents, extract_table_of_contents};
use crate::tools::Toolbox;

/// Release markers read before and after extraction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReleasePair {
    pub previous: Option<String>,
    pub new: Option<String>,
}

#[derive(Debug, Clone)]
pub struct UnpackOutcome {
    pub releases: ReleasePair,
    /// `None` when the listing was unavailable under dry-run
    pub toc: Option<TableOfContents>,
}

/// Unpack `archive` into `env` and record its table of contents
pub fn unpack_release(
    tools: &dyn Toolbox,
    env: &Environment,
    config: &EnvpackConfig,
    archive: &Path,
    dry_run: bool,
) -> Result<UnpackOutcome> {
    let marker_path = env.join(&config.release_marker);
    let previous = env.read_release_marker(&config.release_marker)?;

    tools
        .extract(archive, env.dir())
        .map_err(|e| CoreError::Extraction {
            archive: archive.to_path_buf(),
            message: diagnostic(e),
        })?;

    // Only a missing marker is fatal. An empty one reads as no release and
    // classifies as an unknown upgrade.
    let new = env.read_release_marker(&config.release_marker)?;
    if !marker_path.is_file() {
        let err = CoreError::MissingReleaseMarker { path: marker_path };
        if !dry_run {
            return Err(err);
        }
        warn!("{}: (dryrun continuing)", err);
    }

    info!(
        previous = previous.as_deref().unwrap_or("<none>"),
        new = new.as_deref().unwrap_or("<none>"),
        "unpacked {}",
        archive.display()
    );

    let toc = extract_table_of_contents(
        tools,
        archive,
        env.dir(),
        &env.join(&config.table_of_contents),
        dry_run,
    )?;

    Ok(UnpackOutcome {
        releases: ReleasePair { previous, new },
        toc,
    })
}

/// The command's own diagnostic text, without our wrapping
fn diagnostic(err: CoreError) -> String {
    match err {
        CoreError::CommandFailed { stderr, .. } => stderr,
        other => other.to_string(),
    }
}
