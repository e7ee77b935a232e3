//! Unpack command - extract a release into an environment and report notes

use envpack_core::{EnvpackConfig, Reconciler, SystemToolbox, check_archive};
use std::path::Path;
use tracing::debug;

use crate::display;
use crate::error::Result;

pub fn run(env_name: &str, manifest: &Path, config: Option<&Path>, dry_run: bool) -> Result<()> {
    let config = EnvpackConfig::resolve(config)?;
    debug!(?config, "resolved configuration");

    let tools = SystemToolbox::new(dry_run);
    let reconciler = Reconciler::new(&tools, &config, dry_run);

    // Usage checks come before anything touches the environment.
    let env = reconciler.open_environment(env_name)?;
    check_archive(manifest)?;

    let report = reconciler.run(&env, manifest)?;

    display::print_report(&report);
    display::print_notes(&report.notes, &report.notes_path, dry_run);
    reconciler.persist_notes(&report)?;

    Ok(())
}
