//! envpack Core - release unpacking and template reconciliation
//!
//! This crate unpacks a release tarball of Kubernetes manifests into a GitOps
//! environment directory and works out what the operator has to do next:
//! - `unpack`: extraction plus the release markers on either side of it
//! - `toc`: the table of contents of the last unpacked tarball
//! - `upgrade`: release-to-release vs. unknown upgrade classification
//! - `templates`: reference copies and default instances of template resources
//! - `crd`: risk-tiered advice for changed CRD manifests
//! - `notes`: the numbered advisories shown to the operator
//!
//! External tools sit behind the [`Toolbox`] trait. Dry-run never touches the
//! filesystem but still walks the decision logic.

pub mod archive;
pub mod config;
pub mod crd;
pub mod environment;
pub mod error;
pub mod notes;
pub mod reconcile;
pub mod templates;
pub mod toc;
pub mod tools;
pub mod unpack;
pub mod upgrade;

pub use config::{ComponentConfig, EnvpackConfig};
pub use environment::Environment;
pub use error::{CoreError, Result};
pub use notes::{Advisory, Notes, Severity};
pub use reconcile::{Reconciler, RunReport, check_archive};
pub use templates::{TemplateExtractor, TemplateResource, default_name_for};
pub use toc::TableOfContents;
pub use tools::{MockToolbox, ProcessRunner, SystemToolbox, ToolCall, Toolbox};
pub use unpack::{ReleasePair, UnpackOutcome, unpack_release};
pub use upgrade::UpgradeType;
