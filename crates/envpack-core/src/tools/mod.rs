//! External tool capabilities
//!
//! Reconciliation only needs four things from the outside world: unpacking an
//! archive, listing its members, asking version control which files changed,
//! and diffing one file against its committed version. The [`Toolbox`] trait
//! narrows the surface to exactly those so the decision logic can run against
//! [`MockToolbox`] in tests.
//!
//! Every query returns `Ok(None)` when the call was suppressed by dry-run.

mod mock;
mod process;
mod system;

pub use mock::{MockToolbox, ToolCall};
pub use process::ProcessRunner;
pub use system::{SystemToolbox, parse_porcelain_status};

use std::path::Path;

use crate::error::Result;

pub trait Toolbox {
    /// Unpack `archive` over the existing directory `dest`
    fn extract(&self, archive: &Path, dest: &Path) -> Result<()>;

    /// Raw member paths of `archive`, in archive order
    fn list_members(&self, archive: &Path) -> Result<Option<Vec<String>>>;

    /// Working-tree paths under `scope` that differ from version control
    fn changed_files(&self, scope: &Path) -> Result<Option<Vec<String>>>;

    /// Unified diff of `path` against version control; empty when unchanged
    fn diff(&self, path: &Path) -> Result<Option<String>>;
}
