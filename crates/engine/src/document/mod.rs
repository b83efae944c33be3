//! The workflow configuration document
//!
//! The document is kept as an order-preserving YAML tree so keys unrelated
//! to hooks, and unknown keys on existing entries, round-trip untouched.
//! Only the `workflows -> hook type -> stage -> [entry]` path is ever
//! inspected or modified.

pub mod comments;
pub mod numeric;
pub mod store;

pub use comments::CommentLedger;
pub use store::{BUNDLED_TEMPLATE, DocumentStore};

use serde::{Deserialize, Serialize};
use serde_yaml_ng::{Mapping, Value};
use silverhook_core::{Error, Result};
use std::path::{Path, PathBuf};

/// Top-level key holding all hook types
pub const WORKFLOWS_KEY: &str = "workflows";

/// One scheduled hook invocation as stored in the document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskEntry {
    /// Task kind, e.g. `webphp`
    #[serde(rename = "type")]
    pub kind: String,
    /// Script path relative to the project root
    pub script: String,
    /// Label that also identifies the owning package
    pub description: String,
}

impl TaskEntry {
    /// Convert into a YAML mapping with keys in `type, script, description` order
    #[must_use]
    pub fn into_value(self) -> Value {
        let mut mapping = Mapping::new();
        mapping.insert("type".into(), self.kind.into());
        mapping.insert("script".into(), self.script.into());
        mapping.insert("description".into(), self.description.into());
        Value::Mapping(mapping)
    }
}

/// Description of an entry node, if it has one
#[must_use]
pub fn entry_description(entry: &Value) -> Option<&str> {
    entry.get("description").and_then(Value::as_str)
}

/// Script of an entry node, if it has one
#[must_use]
pub fn entry_script(entry: &Value) -> Option<&str> {
    entry.get("script").and_then(Value::as_str)
}

/// Overwrite the script of an entry node in place
///
/// Returns `true` when the value changed. Non-mapping entries are left alone.
pub fn set_entry_script(entry: &mut Value, script: &str) -> bool {
    let Value::Mapping(mapping) = entry else {
        return false;
    };
    if mapping.get("script").and_then(Value::as_str) == Some(script) {
        return false;
    }
    mapping.insert("script".into(), script.into());
    true
}

/// Parsed workflow configuration document
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigurationDocument {
    root: Mapping,
    origin: PathBuf,
}

impl ConfigurationDocument {
    /// Parse document text
    ///
    /// An empty document is an empty mapping. `origin` is only used in
    /// error messages.
    ///
    /// # Errors
    ///
    /// Returns `DocumentParse` for invalid YAML and `DocumentShape` when the
    /// top level is not a mapping
    pub fn parse(text: &str, origin: &Path) -> Result<Self> {
        let value: Value = serde_yaml_ng::from_str(text).map_err(|e| Error::DocumentParse {
            path: origin.to_path_buf(),
            message: e.to_string(),
        })?;

        let root = match value {
            Value::Null => Mapping::new(),
            Value::Mapping(mapping) => mapping,
            _ => return Err(shape(origin, "the top level is not a mapping")),
        };

        Ok(Self {
            root,
            origin: origin.to_path_buf(),
        })
    }

    /// The whole document tree
    #[must_use]
    pub fn root(&self) -> &Mapping {
        &self.root
    }

    /// Serialize to YAML without comments
    ///
    /// Float values are written with their trailing zero kept and unquoted.
    ///
    /// # Errors
    ///
    /// Returns `Serialize` if the tree cannot be serialized
    pub fn to_yaml(&self) -> Result<String> {
        let mut tree = Value::Mapping(self.root.clone());
        numeric::stringify_floats(&mut tree);
        let text = serde_yaml_ng::to_string(&tree).map_err(|e| Error::Serialize(e.to_string()))?;
        Ok(numeric::unquote_numeric_scalars(&text))
    }

    /// Whether the semantic content differs from another document
    #[must_use]
    pub fn changed_since(&self, other: &Self) -> bool {
        self.root != other.root
    }

    /// Whether a `workflows` mapping is present
    #[must_use]
    pub fn has_workflows(&self) -> bool {
        matches!(self.root.get(WORKFLOWS_KEY), Some(Value::Mapping(_)))
    }

    /// Create an empty `workflows` mapping when it is missing or null
    ///
    /// Returns `true` when the document was changed.
    ///
    /// # Errors
    ///
    /// Returns `DocumentShape` if `workflows` holds something other than a mapping
    pub fn ensure_workflows(&mut self) -> Result<bool> {
        let created = !self.has_workflows();
        mapping_slot(&mut self.root, WORKFLOWS_KEY, &self.origin, WORKFLOWS_KEY)?;
        Ok(created)
    }

    /// Entries of one stage, or `None` when the hook type or stage is absent
    ///
    /// # Errors
    ///
    /// Returns `DocumentShape` if a node on the path has the wrong type
    pub fn stage(&self, wf_type: &str, stage: &str) -> Result<Option<&Vec<Value>>> {
        let Some(workflows) = self.workflows()? else {
            return Ok(None);
        };
        let hooks = match workflows.get(wf_type) {
            None | Some(Value::Null) => return Ok(None),
            Some(Value::Mapping(hooks)) => hooks,
            Some(_) => return Err(shape(&self.origin, &format!("workflows.{wf_type} is not a mapping"))),
        };
        match hooks.get(stage) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Sequence(entries)) => Ok(Some(entries)),
            Some(_) => Err(shape(
                &self.origin,
                &format!("workflows.{wf_type}.{stage} is not a list"),
            )),
        }
    }

    /// Mutable entries of one stage, without creating anything
    ///
    /// # Errors
    ///
    /// Returns `DocumentShape` if a node on the path has the wrong type
    pub fn stage_mut(&mut self, wf_type: &str, stage: &str) -> Result<Option<&mut Vec<Value>>> {
        if self.stage(wf_type, stage)?.is_none() {
            return Ok(None);
        }
        self.stage_mut_or_insert(wf_type, stage).map(Some)
    }

    /// Mutable entries of one stage, creating the path on demand
    ///
    /// # Errors
    ///
    /// Returns `DocumentShape` if a node on the path has the wrong type
    pub fn stage_mut_or_insert(&mut self, wf_type: &str, stage: &str) -> Result<&mut Vec<Value>> {
        let origin = &self.origin;
        let workflows = mapping_slot(&mut self.root, WORKFLOWS_KEY, origin, WORKFLOWS_KEY)?;
        let hooks = mapping_slot(workflows, wf_type, origin, &format!("workflows.{wf_type}"))?;

        let slot = hooks
            .entry(Value::String(stage.to_string()))
            .or_insert(Value::Null);
        if slot.is_null() {
            *slot = Value::Sequence(Vec::new());
        }
        match slot {
            Value::Sequence(entries) => Ok(entries),
            _ => Err(shape(
                origin,
                &format!("workflows.{wf_type}.{stage} is not a list"),
            )),
        }
    }

    fn workflows(&self) -> Result<Option<&Mapping>> {
        match self.root.get(WORKFLOWS_KEY) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Mapping(workflows)) => Ok(Some(workflows)),
            Some(_) => Err(shape(&self.origin, "workflows is not a mapping")),
        }
    }
}

/// Mapping stored under `key`, created when missing or null
fn mapping_slot<'a>(
    parent: &'a mut Mapping,
    key: &str,
    origin: &Path,
    label: &str,
) -> Result<&'a mut Mapping> {
    let slot = parent
        .entry(Value::String(key.to_string()))
        .or_insert(Value::Null);
    if slot.is_null() {
        *slot = Value::Mapping(Mapping::new());
    }
    match slot {
        Value::Mapping(mapping) => Ok(mapping),
        _ => Err(shape(origin, &format!("{label} is not a mapping"))),
    }
}

fn shape(origin: &Path, message: &str) -> Error {
    Error::DocumentShape {
        path: origin.to_path_buf(),
        message: message.to_string(),
    }
}
