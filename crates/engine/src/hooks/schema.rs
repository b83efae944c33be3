//! Known hook types and their stages
//!
//! The catalog is a static YAML resource bundled into the binary. A hook
//! declaration is only accepted when its hook type is listed and its stage
//! is one of that type's states.

use super::declaration::RawDeclaration;
use indexmap::IndexMap;
use serde::Deserialize;
use silverhook_core::{Error, Result};

const BUNDLED_SCHEMA: &str = include_str!("../../resources/schema.yml");

/// Permitted stages of one hook type
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct WorkflowSchema {
    /// Stage names in declaration order
    #[serde(default)]
    pub states: Vec<String>,
}

/// Catalog of known hook types
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaCatalog {
    workflows: IndexMap<String, WorkflowSchema>,
}

impl SchemaCatalog {
    /// Load the catalog shipped with silverhook
    ///
    /// # Errors
    ///
    /// Only fails if the bundled resource is malformed, which the test suite rules out
    pub fn bundled() -> Result<Self> {
        Self::from_yaml_str(BUNDLED_SCHEMA)
    }

    /// Parse a catalog from its YAML form
    ///
    /// The format is a sequence of single-key maps:
    ///
    /// ```yaml
    /// - deploy:
    ///     states: [before, after]
    /// ```
    ///
    /// A hook type listed twice merges its states.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not YAML of that shape
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let entries: Vec<IndexMap<String, WorkflowSchema>> = serde_yaml_ng::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid hook schema: {e}")))?;

        let mut workflows: IndexMap<String, WorkflowSchema> = IndexMap::new();
        for entry in entries {
            for (wf_type, schema) in entry {
                let known = workflows.entry(wf_type).or_default();
                for state in schema.states {
                    if !known.states.contains(&state) {
                        known.states.push(state);
                    }
                }
            }
        }

        Ok(Self { workflows })
    }

    /// Check a raw declaration against the catalog
    ///
    /// Fails closed: a missing hook type or stage, an unknown hook type and
    /// a stage outside the type's states are all rejected.
    #[must_use]
    pub fn validate(&self, declaration: &RawDeclaration) -> bool {
        let (Some(wf_type), Some(stage)) = (&declaration.wf_type, &declaration.stage) else {
            return false;
        };

        self.states(wf_type)
            .is_some_and(|states| states.iter().any(|s| s == stage))
    }

    /// Stages permitted for a hook type, or `None` if the type is unknown
    #[must_use]
    pub fn states(&self, wf_type: &str) -> Option<&[String]> {
        self.workflows.get(wf_type).map(|w| w.states.as_slice())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;

    fn raw(wf_type: Option<&str>, stage: Option<&str>) -> RawDeclaration {
        RawDeclaration {
            wf_type: wf_type.map(str::to_string),
            stage: stage.map(str::to_string),
            ..RawDeclaration::default()
        }
    }

    #[test]
    fn test_bundled_schema_parses() {
        let schema = SchemaCatalog::bundled().unwrap();

        assert_eq!(
            schema.states("deploy").unwrap(),
            &["before".to_string(), "after".to_string()]
        );
        assert_eq!(
            schema.states("autopilot_vrt").unwrap(),
            &["after".to_string()]
        );
        assert!(schema.states("clone_database").is_some());
        assert!(schema.states("launch_rockets").is_none());
    }

    #[test]
    fn test_validate_known_pair() {
        let schema = SchemaCatalog::bundled().unwrap();
        assert!(schema.validate(&raw(Some("deploy"), Some("after"))));
        assert!(schema.validate(&raw(Some("sync_code"), Some("before"))));
    }

    #[test]
    fn test_validate_missing_fields() {
        let schema = SchemaCatalog::bundled().unwrap();
        assert!(!schema.validate(&raw(None, Some("after"))));
        assert!(!schema.validate(&raw(Some("deploy"), None)));
        assert!(!schema.validate(&raw(None, None)));
    }

    #[test]
    fn test_validate_unknown_type_or_stage() {
        let schema = SchemaCatalog::bundled().unwrap();
        assert!(!schema.validate(&raw(Some("launch_rocket"), Some("after"))));
        assert!(!schema.validate(&raw(Some("deploy"), Some("during"))));
        assert!(!schema.validate(&raw(Some("autopilot_vrt"), Some("before"))));
    }

    #[test]
    fn test_from_yaml_str_merges_repeated_types() {
        let schema = SchemaCatalog::from_yaml_str(
            "- deploy:\n    states: [before]\n- deploy:\n    states: [before, after]\n",
        )
        .unwrap();

        assert_eq!(
            schema.states("deploy").unwrap(),
            &["before".to_string(), "after".to_string()]
        );
    }

    #[test]
    fn test_from_yaml_str_rejects_wrong_shape() {
        let result = SchemaCatalog::from_yaml_str("deploy: [before, after]\n");
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
