//! Template resource extraction and default synthesis
//!
//! A component's examples manifest may carry resources named `template` or
//! `<base>-template`. Each one is mirrored into `<component>/reference/` on
//! every run so version control can show how it changed, and a minimal
//! `default` (or `<base>-default`) instance is created beside the component's
//! other manifests the first time the template is seen.
//!
//! A default resource is never rewritten once it exists. When its template
//! changes the operator is told to inspect the reference diff instead.

use serde::Deserialize;
use serde_yaml::value::TaggedValue;
use serde_yaml::{Mapping, Value};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::ComponentConfig;
use crate::environment::Environment;
use crate::error::{CoreError, Result};
use crate::notes::Advisory;
use crate::tools::Toolbox;

pub const TEMPLATE_NAME: &str = "template";
pub const TEMPLATE_SUFFIX: &str = "-template";
pub const DEFAULT_NAME: &str = "default";
pub const REFERENCE_DIR: &str = "reference";
pub const KUSTOMIZATION_FILE: &str = "kustomization.yaml";

/// Name of the default derived from a template name
///
/// `template` maps to `default` and `<base>-template` to `<base>-default`.
/// Anything else, including `template-<x>`, is not a template.
pub fn default_name_for(name: &str) -> Option<String> {
    if name == TEMPLATE_NAME {
        return Some(DEFAULT_NAME.to_string());
    }
    name.strip_suffix(TEMPLATE_SUFFIX)
        .filter(|base| !base.is_empty())
        .map(|base| format!("{base}-{DEFAULT_NAME}"))
}

/// A template document from an examples manifest
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateResource {
    pub name: String,
    pub kind: String,
    pub namespace: Option<String>,
    pub default_name: String,
    pub document: Value,
}

impl TemplateResource {
    /// Recognize a template, or `None` for any other document
    pub fn from_document(document: Value, source: &Path) -> Result<Option<Self>> {
        let metadata = document.get("metadata");
        let Some(name) = metadata.and_then(|m| m.get("name")).and_then(Value::as_str) else {
            debug!("skipping unnamed document in {}", source.display());
            return Ok(None);
        };
        let Some(default_name) = default_name_for(name) else {
            return Ok(None);
        };

        let kind = document
            .get("kind")
            .and_then(Value::as_str)
            .ok_or_else(|| CoreError::InvalidResource {
                path: source.to_path_buf(),
                message: format!("template '{name}' has no kind"),
            })?;
        for (field, value) in [("name", name), ("kind", kind)] {
            if !is_file_safe(value) {
                return Err(CoreError::InvalidResource {
                    path: source.to_path_buf(),
                    message: format!("template {field} '{value}' cannot be used in a file name"),
                });
            }
        }
        let namespace = metadata
            .and_then(|m| m.get("namespace"))
            .and_then(Value::as_str)
            .map(String::from);

        Ok(Some(Self {
            name: name.to_string(),
            kind: kind.to_string(),
            namespace,
            default_name,
            document,
        }))
    }

    /// `<name>-<kind>.yaml`, keyed by the template's own name
    pub fn reference_file(&self) -> String {
        format!("{}-{}.yaml", self.name, self.kind.to_lowercase())
    }

    /// `<default-name>-<kind>.yaml`
    pub fn default_file(&self) -> String {
        format!("{}-{}.yaml", self.default_name, self.kind.to_lowercase())
    }

    /// Build the default instance
    ///
    /// Metadata is replaced wholesale by `{name, namespace}`, dropping labels,
    /// annotations and owner references. The bare `default` instance also has
    /// its boolean `data.default` flag forced on.
    pub fn synthesize_default(&self) -> Value {
        let mut document = self.document.clone();

        if self.default_name == DEFAULT_NAME {
            if let Some(flag) = document.get_mut("data").and_then(|d| d.get_mut(DEFAULT_NAME)) {
                if flag.is_bool() {
                    *flag = Value::Bool(true);
                }
            }
        }

        let mut metadata = Mapping::new();
        metadata.insert("name".into(), self.default_name.as_str().into());
        if let Some(namespace) = &self.namespace {
            metadata.insert("namespace".into(), namespace.as_str().into());
        }
        if let Some(root) = document.as_mapping_mut() {
            root.insert("metadata".into(), Value::Mapping(metadata));
        }
        document
    }
}

/// Names and kinds become file names inside the component directory
fn is_file_safe(value: &str) -> bool {
    !value.contains(['/', '\\', '\0']) && !value.contains("..")
}

/// Parse an examples manifest and keep its template documents
///
/// A malformed document fails the whole manifest.
pub fn parse_examples(path: &Path) -> Result<Vec<TemplateResource>> {
    let content = std::fs::read_to_string(path)?;
    let mut templates = Vec::new();

    for document in serde_yaml::Deserializer::from_str(&content) {
        let value = Value::deserialize(document).map_err(|source| CoreError::ManifestParse {
            path: path.to_path_buf(),
            source,
        })?;
        if value.is_null() {
            continue;
        }
        if let Some(template) = TemplateResource::from_document(value, path)? {
            templates.push(template);
        }
    }

    Ok(templates)
}

/// Serialize with mapping keys sorted, plus a trailing blank line
///
/// Existing reference copies end with an extra newline; keeping it avoids a
/// spurious diff on every file.
pub fn to_stable_yaml(value: &Value) -> Result<String> {
    let mut out = serde_yaml::to_string(&sort_keys(value))?;
    out.push('\n');
    Ok(out)
}

fn sort_keys(value: &Value) -> Value {
    match value {
        Value::Mapping(map) => {
            let mut entries: Vec<(&Value, &Value)> = map.iter().collect();
            entries.sort_by_cached_key(|(key, _)| key_text(key));
            Value::Mapping(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.clone(), sort_keys(v)))
                    .collect(),
            )
        }
        Value::Sequence(items) => Value::Sequence(items.iter().map(sort_keys).collect()),
        Value::Tagged(tagged) => Value::Tagged(Box::new(TaggedValue {
            tag: tagged.tag.clone(),
            value: sort_keys(&tagged.value),
        })),
        other => other.clone(),
    }
}

fn key_text(key: &Value) -> String {
    match key.as_str() {
        Some(s) => s.to_string(),
        None => serde_yaml::to_string(key).unwrap_or_default(),
    }
}

/// Reconciles template resources for each component of an environment
pub struct TemplateExtractor<'a> {
    tools: &'a dyn Toolbox,
    dry_run: bool,
}

/// Per-component bookkeeping for one pass
struct Pass {
    component_dir: PathBuf,
    references_dir: PathBuf,
    /// Defaults created (or, under dry-run, that would be) during this pass
    synthesized: HashSet<PathBuf>,
    advisories: Vec<Advisory>,
}

impl<'a> TemplateExtractor<'a> {
    pub fn new(tools: &'a dyn Toolbox, dry_run: bool) -> Self {
        Self { tools, dry_run }
    }

    /// Reconcile one component; a missing examples manifest yields nothing
    pub fn extract_component(
        &self,
        env: &Environment,
        component: &ComponentConfig,
    ) -> Result<Vec<Advisory>> {
        let component_dir = env.join(&component.name);
        let examples = component_dir.join(component.examples_file());
        if !examples.is_file() {
            debug!("no examples manifest at {}", examples.display());
            return Ok(Vec::new());
        }

        let templates = parse_examples(&examples)?;
        debug!(
            component = %component.name,
            templates = templates.len(),
            "parsed {}",
            examples.display()
        );

        let mut pass = Pass {
            references_dir: component_dir.join(REFERENCE_DIR),
            component_dir,
            synthesized: HashSet::new(),
            advisories: Vec::new(),
        };
        for template in &templates {
            self.reconcile(template, &mut pass)?;
        }
        Ok(pass.advisories)
    }

    fn reconcile(&self, template: &TemplateResource, pass: &mut Pass) -> Result<()> {
        let reference_path = pass.references_dir.join(template.reference_file());
        let default_path = pass.component_dir.join(template.default_file());

        let reference_existed = reference_path.is_file();
        self.write_file(&reference_path, &to_stable_yaml(&template.document)?, true)?;

        let mut changed = false;
        if reference_existed {
            match self.tools.diff(&reference_path)? {
                Some(diff) => changed = !diff.trim().is_empty(),
                None if self.dry_run => {
                    info!("no diff for {} (dryrun continuing)", reference_path.display());
                    return Ok(());
                }
                None => return Err(CoreError::DiffUnavailable { path: reference_path }),
            }
        }

        if default_path.is_file() || pass.synthesized.contains(&default_path) {
            if changed {
                pass.advisories.push(Advisory::action(format!(
                    "Inspect the changes to {} for any updates that you may need to add to {}.",
                    reference_path.display(),
                    default_path.display()
                )));
            }
            return Ok(());
        }

        self.write_file(&default_path, &to_stable_yaml(&template.synthesize_default())?, false)?;
        pass.synthesized.insert(default_path);

        let verb = if self.dry_run { "would be" } else { "has been" };
        pass.advisories.push(Advisory::action(format!(
            "A new resource file '{}' {} created in {}. Please add it to the 'resources' list in {}.",
            template.default_file(),
            verb,
            pass.component_dir.display(),
            pass.component_dir.join(KUSTOMIZATION_FILE).display()
        )));
        Ok(())
    }

    fn write_file(&self, path: &Path, content: &str, create_parent: bool) -> Result<()> {
        if self.dry_run {
            info!("Dryrun: write {}", path.display());
            return Ok(());
        }
        if create_parent {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, content)?;
        info!("Wrote {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notes::Severity;
    use crate::tools::{MockToolbox, ToolCall};
    use tempfile::TempDir;

    const EXAMPLES: &str = r#"apiVersion: nnf.cray.hpe.com/v1alpha1
kind: NnfStorageProfile
metadata:
  name: db-template
  namespace: nnf-system
  labels:
    app: examples
  annotations:
    note: keep-out
data:
  default: false
  size: 10
---
apiVersion: v1
kind: ConfigMap
metadata:
  name: plain-config
  namespace: nnf-system
---
apiVersion: v1
kind: ConfigMap
metadata:
  name: template-foo
  namespace: nnf-system
"#;

    struct Fixture {
        _temp: TempDir,
        env: Environment,
        component: ComponentConfig,
    }

    impl Fixture {
        fn new(examples: &str) -> Self {
            let temp = TempDir::new().unwrap();
            let component_dir = temp.path().join("dev").join("nnf-sos");
            std::fs::create_dir_all(&component_dir).unwrap();
            std::fs::write(component_dir.join("nnf-sos-examples.yaml"), examples).unwrap();
            let env = Environment::open(temp.path(), "dev").unwrap();
            Self {
                _temp: temp,
                env,
                component: ComponentConfig::new("nnf-sos"),
            }
        }

        fn path(&self, relative: &str) -> PathBuf {
            self.env.join("nnf-sos").join(relative)
        }

        fn run(&self, tools: &MockToolbox, dry_run: bool) -> Result<Vec<Advisory>> {
            TemplateExtractor::new(tools, dry_run).extract_component(&self.env, &self.component)
        }
    }

    fn load(path: &Path) -> Value {
        serde_yaml::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn test_default_name_for() {
        assert_eq!(default_name_for("template").as_deref(), Some("default"));
        assert_eq!(default_name_for("db-template").as_deref(), Some("db-default"));
        assert_eq!(default_name_for("a-b-template").as_deref(), Some("a-b-default"));
        assert_eq!(default_name_for("template-foo"), None);
        assert_eq!(default_name_for("-template"), None);
        assert_eq!(default_name_for("templates"), None);
        assert_eq!(default_name_for("default"), None);
    }

    #[test]
    fn test_first_run_creates_reference_and_default() {
        let fx = Fixture::new(EXAMPLES);
        let tools = MockToolbox::new();

        let advisories = fx.run(&tools, false).unwrap();

        let reference = fx.path("reference/db-template-nnfstorageprofile.yaml");
        let default = fx.path("db-default-nnfstorageprofile.yaml");
        assert!(reference.is_file());
        assert!(default.is_file());
        assert!(std::fs::read_to_string(&reference).unwrap().ends_with("\n\n"));

        let doc = load(&default);
        let mut expected = Mapping::new();
        expected.insert("name".into(), "db-default".into());
        expected.insert("namespace".into(), "nnf-system".into());
        assert_eq!(doc["metadata"], Value::Mapping(expected));
        // Only the bare `default` instance gets its flag forced.
        assert_eq!(doc["data"]["default"], Value::Bool(false));
        assert_eq!(doc["data"]["size"], Value::from(10));

        let reference_doc = load(&reference);
        assert_eq!(reference_doc["metadata"]["labels"]["app"], "examples");

        assert_eq!(advisories.len(), 1);
        assert_eq!(advisories[0].severity, Severity::Action);
        assert!(advisories[0].message.contains("'db-default-nnfstorageprofile.yaml' has been created"));
        assert!(advisories[0].message.contains("kustomization.yaml"));

        // Nothing to diff against on first sight.
        assert!(tools.calls().is_empty());
        assert!(!fx.path("reference/template-foo-configmap.yaml").exists());
        assert!(!fx.path("reference/plain-config-configmap.yaml").exists());
    }

    #[test]
    fn test_second_run_is_silent() {
        let fx = Fixture::new(EXAMPLES);
        let tools = MockToolbox::new();
        fx.run(&tools, false).unwrap();

        let reference = fx.path("reference/db-template-nnfstorageprofile.yaml");
        let first = std::fs::read_to_string(&reference).unwrap();

        let advisories = fx.run(&tools, false).unwrap();
        assert!(advisories.is_empty());
        assert_eq!(std::fs::read_to_string(&reference).unwrap(), first);
        assert_eq!(tools.calls(), vec![ToolCall::Diff { path: reference }]);
    }

    #[test]
    fn test_existing_default_is_never_overwritten() {
        let fx = Fixture::new(EXAMPLES);
        fx.run(&MockToolbox::new(), false).unwrap();

        let default = fx.path("db-default-nnfstorageprofile.yaml");
        std::fs::write(&default, "hand: edited\n").unwrap();

        let reference = fx.path("reference/db-template-nnfstorageprofile.yaml");
        let tools = MockToolbox::new().with_diff(&reference, "-  size: 5\n+  size: 10\n");
        let advisories = fx.run(&tools, false).unwrap();

        assert_eq!(std::fs::read_to_string(&default).unwrap(), "hand: edited\n");
        assert_eq!(advisories.len(), 1);
        assert!(advisories[0].message.starts_with("Inspect the changes to"));
        assert!(advisories[0].message.contains("db-template-nnfstorageprofile.yaml"));
        assert!(advisories[0].message.contains("db-default-nnfstorageprofile.yaml"));
    }

    #[test]
    fn test_removed_default_is_recreated() {
        let fx = Fixture::new(EXAMPLES);
        fx.run(&MockToolbox::new(), false).unwrap();

        let default = fx.path("db-default-nnfstorageprofile.yaml");
        std::fs::remove_file(&default).unwrap();

        let advisories = fx.run(&MockToolbox::new(), false).unwrap();
        assert!(default.is_file());
        assert_eq!(advisories.len(), 1);
    }

    #[test]
    fn test_bare_template_forces_default_flag() {
        let fx = Fixture::new(
            "kind: NnfStorageProfile\nmetadata:\n  name: template\n  namespace: nnf-system\ndata:\n  default: false\n",
        );
        fx.run(&MockToolbox::new(), false).unwrap();

        assert!(fx.path("reference/template-nnfstorageprofile.yaml").is_file());
        let doc = load(&fx.path("default-nnfstorageprofile.yaml"));
        assert_eq!(doc["metadata"]["name"], "default");
        assert_eq!(doc["data"]["default"], Value::Bool(true));
    }

    #[test]
    fn test_duplicate_templates_synthesize_once() {
        let doc = "kind: Profile\nmetadata:\n  name: db-template\n  namespace: a\n";
        let fx = Fixture::new(&format!("{doc}---\n{doc}"));

        let advisories = fx.run(&MockToolbox::new(), false).unwrap();
        assert_eq!(advisories.len(), 1);

        let fx = Fixture::new(&format!("{doc}---\n{doc}"));
        let advisories = fx.run(&MockToolbox::new().suppressed(), true).unwrap();
        assert_eq!(advisories.len(), 1);
    }

    #[test]
    fn test_dry_run_touches_nothing() {
        let fx = Fixture::new(EXAMPLES);
        let advisories = fx.run(&MockToolbox::new().suppressed(), true).unwrap();

        assert!(!fx.path("reference").exists());
        assert!(!fx.path("db-default-nnfstorageprofile.yaml").exists());
        assert_eq!(advisories.len(), 1);
        assert!(advisories[0].message.contains("would be created"));
    }

    #[test]
    fn test_dry_run_without_baseline_skips_document() {
        let fx = Fixture::new(EXAMPLES);
        let reference = fx.path("reference/db-template-nnfstorageprofile.yaml");
        std::fs::create_dir_all(reference.parent().unwrap()).unwrap();
        std::fs::write(&reference, "old: copy\n").unwrap();

        let advisories = fx.run(&MockToolbox::new().suppressed(), true).unwrap();
        assert!(advisories.is_empty());
        assert_eq!(std::fs::read_to_string(&reference).unwrap(), "old: copy\n");
        assert!(!fx.path("db-default-nnfstorageprofile.yaml").exists());
    }

    #[test]
    fn test_missing_examples_manifest() {
        let fx = Fixture::new(EXAMPLES);
        let other = ComponentConfig::new("nnf-dm");
        let advisories = TemplateExtractor::new(&MockToolbox::new(), false)
            .extract_component(&fx.env, &other)
            .unwrap();
        assert!(advisories.is_empty());
    }

    #[test]
    fn test_malformed_manifest_is_fatal() {
        let fx = Fixture::new("kind: Profile\nmetadata: [unclosed\n");
        let err = fx.run(&MockToolbox::new(), false).unwrap_err();
        assert!(matches!(err, CoreError::ManifestParse { .. }));
    }

    #[test]
    fn test_template_without_kind_is_invalid() {
        let fx = Fixture::new("metadata:\n  name: db-template\n");
        let err = fx.run(&MockToolbox::new(), false).unwrap_err();
        assert!(matches!(err, CoreError::InvalidResource { .. }));
    }

    #[test]
    fn test_template_escaping_component_dir_is_invalid() {
        let fx = Fixture::new("kind: Profile\nmetadata:\n  name: ../../db-template\n");
        let err = fx.run(&MockToolbox::new(), false).unwrap_err();
        assert!(matches!(err, CoreError::InvalidResource { .. }));
        assert!(!fx.path("reference").exists());

        let fx = Fixture::new("kind: a/Profile\nmetadata:\n  name: db-template\n");
        let err = fx.run(&MockToolbox::new(), false).unwrap_err();
        assert!(err.to_string().contains("template kind 'a/Profile'"));
    }

    #[test]
    fn test_stable_yaml_sorts_keys() {
        let value: Value = serde_yaml::from_str("b: 1\na:\n  z: 2\n  y: 3\n").unwrap();
        assert_eq!(to_stable_yaml(&value).unwrap(), "a:\n  y: 3\n  z: 2\nb: 1\n\n");
    }
}
