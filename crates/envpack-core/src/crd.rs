//! CRD change detection
//!
//! CRD changes are harmless between two tagged releases but may strand
//! custom resources otherwise, so the advice depends on the upgrade type.

use std::path::Path;
use tracing::debug;

use crate::error::Result;
use crate::notes::Advisory;
use crate::tools::Toolbox;
use crate::upgrade::UpgradeType;

/// Changed working-tree files under `scope` ending in `suffix`
///
/// `None` when status was unavailable under dry-run.
pub fn changed_crds(tools: &dyn Toolbox, scope: &Path, suffix: &str) -> Result<Option<Vec<String>>> {
    let Some(changed) = tools.changed_files(scope)? else {
        return Ok(None);
    };
    let crds: Vec<String> = changed.into_iter().filter(|p| p.ends_with(suffix)).collect();
    debug!(scope = %scope.display(), count = crds.len(), "changed CRD manifests");
    Ok(Some(crds))
}

/// Advice for a set of changed CRD manifests, if any
pub fn crd_advisory(crds: &[String], upgrade: UpgradeType) -> Option<Advisory> {
    if crds.is_empty() {
        return None;
    }

    match upgrade {
        UpgradeType::ReleaseToRelease => Some(Advisory::info(
            "**This looks like a release-to-release upgrade.**\n  \
             This release includes some CRD changes. However, because this\n  \
             appears to be a release-to-release upgrade, it should not be\n  \
             necessary to remove all jobs and workflows or to undeploy the\n  \
             existing software from the cluster.",
        )),
        UpgradeType::Unknown => {
            let listing = crds.join("\n  ");
            Some(Advisory::critical(format!(
                "**This does NOT look like a release-to-release upgrade.**\n  \
                 The following manifests show CRD changes. Before pushing these\n  \
                 changes to your gitops repo you should remove all jobs and\n  \
                 workflows from the cluster and undeploy the software from the\n  \
                 cluster by removing the bootstrap resources.\n  \
                 Consult 'tools/undeploy-env.sh -C' to remove all CRDs from the cluster.\n\n  \
                 {listing}"
            )))
        }
    }
}

/// Query status under `scope` and advise on any CRD changes
pub fn check_crd_updates(
    tools: &dyn Toolbox,
    scope: &Path,
    suffix: &str,
    upgrade: UpgradeType,
) -> Result<Option<Advisory>> {
    Ok(changed_crds(tools, scope, suffix)?.and_then(|crds| crd_advisory(&crds, upgrade)))
}
