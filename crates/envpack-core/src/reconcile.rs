//! End-to-end unpack run
//!
//! Order matters: the tarball is unpacked first (yielding the release pair and
//! TOC), the upgrade type is derived from the pair, each component's templates
//! are reconciled, and finally working-tree status is checked for CRD changes.
//! The configured reminder is always the last note.
//!
//! Runs mutate the environment directory in place without locking. Two runs
//! against the same environment at once are not supported.

use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::EnvpackConfig;
use crate::crd::check_crd_updates;
use crate::environment::Environment;
use crate::error::{CoreError, Result};
use crate::notes::{Advisory, Notes};
use crate::templates::TemplateExtractor;
use crate::tools::Toolbox;
use crate::unpack::{ReleasePair, unpack_release};
use crate::upgrade::UpgradeType;

/// Outcome of a run, before notes are persisted
#[derive(Debug, Clone)]
pub struct RunReport {
    pub releases: ReleasePair,
    pub upgrade: UpgradeType,
    /// TOC size, when a listing was available
    pub toc_entries: Option<usize>,
    pub notes: Notes,
    pub notes_path: PathBuf,
}

pub struct Reconciler<'a> {
    tools: &'a dyn Toolbox,
    config: &'a EnvpackConfig,
    dry_run: bool,
}

impl<'a> Reconciler<'a> {
    pub fn new(tools: &'a dyn Toolbox, config: &'a EnvpackConfig, dry_run: bool) -> Self {
        Self {
            tools,
            config,
            dry_run,
        }
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Resolve an environment name under the configured environments directory
    pub fn open_environment(&self, name: &str) -> Result<Environment> {
        Environment::open(Path::new(&self.config.environments_dir), name)
    }

    /// Run every stage against `env`
    pub fn run(&self, env: &Environment, archive: &Path) -> Result<RunReport> {
        check_archive(archive)?;

        let outcome = unpack_release(self.tools, env, self.config, archive, self.dry_run)?;
        let upgrade = UpgradeType::from_releases(&outcome.releases);
        info!(upgrade = %upgrade, "classified upgrade");

        let mut notes = Notes::new();
        let extractor = TemplateExtractor::new(self.tools, self.dry_run);
        for component in &self.config.components {
            notes.extend(extractor.extract_component(env, component)?);
        }

        if let Some(advisory) =
            check_crd_updates(self.tools, env.dir(), &self.config.crd_suffix, upgrade)?
        {
            notes.push(advisory);
        }

        notes.push(Advisory::action(self.config.reminder.clone()));

        Ok(RunReport {
            releases: outcome.releases,
            upgrade,
            toc_entries: outcome.toc.map(|toc| toc.len()),
            notes,
            notes_path: env.join(&self.config.notes_file),
        })
    }

    /// Write the report's notes file, unless running dry
    pub fn persist_notes(&self, report: &RunReport) -> Result<bool> {
        report.notes.persist(&report.notes_path, self.dry_run)
    }
}

/// The release tarball must be a readable regular file
pub fn check_archive(path: &Path) -> Result<()> {
    if !path.is_file() || File::open(path).is_err() {
        return Err(CoreError::ManifestUnreadable {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}
