//! Unpack configuration
//!
//! Loaded from `envpack.yaml` (or an explicit `--config` file). Every field has
//! a default, so an empty file or no file at all yields the stock layout.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::error::{CoreError, Result};

/// Default configuration file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "envpack.yaml";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct EnvpackConfig {
    /// Directory holding one subdirectory per environment
    pub environments_dir: String,

    /// Release marker file, relative to the environment directory
    pub release_marker: String,

    /// Table-of-contents sidecar, relative to the environment directory
    pub table_of_contents: String,

    /// Notes file, relative to the environment directory
    pub notes_file: String,

    /// Suffix identifying CRD manifests in working-tree status
    pub crd_suffix: String,

    /// Advisory always appended last
    pub reminder: String,

    /// Components scanned for template resources
    pub components: Vec<ComponentConfig>,
}

/// A component directory inside an environment
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ComponentConfig {
    pub name: String,

    #[serde(default = "default_examples_suffix")]
    pub examples_suffix: String,
}

fn default_examples_suffix() -> String {
    "-examples.yaml".to_string()
}

impl ComponentConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            examples_suffix: default_examples_suffix(),
        }
    }

    /// File name of the examples manifest, e.g. `nnf-sos-examples.yaml`
    pub fn examples_file(&self) -> String {
        format!("{}{}", self.name, self.examples_suffix)
    }
}

impl Default for EnvpackConfig {
    fn default() -> Self {
        Self {
            environments_dir: "environments".to_string(),
            release_marker: "manifest-release.txt".to_string(),
            table_of_contents: "manifest-toc.txt".to_string(),
            notes_file: "unpacking-notes.txt".to_string(),
            crd_suffix: "-crds.yaml".to_string(),
            reminder: "Run 'tools/verify-deployment.sh'.".to_string(),
            components: vec![ComponentConfig::new("nnf-sos"), ComponentConfig::new("nnf-dm")],
        }
    }
}

impl EnvpackConfig {
    /// Load an explicit configuration file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CoreError::Config {
            message: format!("unable to read {}: {}", path.display(), e),
        })?;
        let config: Self = serde_yaml::from_str(&content).map_err(|e| CoreError::Config {
            message: format!("unable to parse {}: {}", path.display(), e),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if given, else `envpack.yaml` when present, else defaults
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load_from(p),
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.is_file() {
                    Self::load_from(fallback)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for component in &self.components {
            if component.name.is_empty() || component.name.contains(['/', '\\']) {
                return Err(CoreError::Config {
                    message: format!("invalid component name '{}'", component.name),
                });
            }
            if !seen.insert(component.name.as_str()) {
                return Err(CoreError::Config {
                    message: format!("duplicate component '{}'", component.name),
                });
            }
        }
        if self.crd_suffix.is_empty() {
            return Err(CoreError::Config {
                message: "crdSuffix must not be empty".to_string(),
            });
        }
        Ok(())
    }
}
