//! Project-level opt-out rules
//!
//! The root project can refuse individual hooks of installed packages. A
//! rule only keeps a hook from being *inserted*; entries already present in
//! the document are left alone.

use indexmap::IndexMap;
use serde_json::Value;

/// One suppressed hook type and stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DenyTarget {
    /// Hook type
    pub wf_type: String,
    /// Stage within the hook type
    pub stage: String,
}

/// Suppression rules keyed by package name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Denylist {
    rules: IndexMap<String, Vec<DenyTarget>>,
}

impl Denylist {
    /// Create an empty denylist
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read rules from the root project's extras value
    ///
    /// Expected shape: `{"vendor/pkg": [{"wf_type": "...", "stage": "..."}]}`.
    /// `null` means no rules. Anything malformed is skipped with a warning.
    #[must_use]
    pub fn from_json(value: &Value) -> Self {
        let mut denylist = Self::new();

        let Some(packages) = value.as_object() else {
            if !value.is_null() {
                tracing::warn!("Ignoring denylist: expected a map of package names, got {value}");
            }
            return denylist;
        };

        for (package, targets) in packages {
            let Some(targets) = targets.as_array() else {
                tracing::warn!("Ignoring denylist entry for {package}: expected a list");
                continue;
            };

            for target in targets {
                let field = |key: &str| target.get(key).and_then(Value::as_str);
                match (field("wf_type"), field("stage")) {
                    (Some(wf_type), Some(stage)) => denylist.deny(package, wf_type, stage),
                    _ => tracing::warn!(
                        "Ignoring denylist rule for {package}: {target} needs wf_type and stage"
                    ),
                }
            }
        }

        denylist
    }

    /// Add a rule
    pub fn deny(&mut self, package: &str, wf_type: &str, stage: &str) {
        self.rules
            .entry(package.to_string())
            .or_default()
            .push(DenyTarget {
                wf_type: wf_type.to_string(),
                stage: stage.to_string(),
            });
    }

    /// Whether a package's hook for this type and stage is refused
    #[must_use]
    pub fn suppresses(&self, wf_type: &str, stage: &str, package: &str) -> bool {
        self.rules.get(package).is_some_and(|targets| {
            targets
                .iter()
                .any(|t| t.wf_type == wf_type && t.stage == stage)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_exact_match() {
        let denylist = Denylist::from_json(&json!({
            "acme/cache-warm": [{"wf_type": "deploy", "stage": "after"}]
        }));

        assert!(denylist.suppresses("deploy", "after", "acme/cache-warm"));
        assert!(!denylist.suppresses("deploy", "before", "acme/cache-warm"));
        assert!(!denylist.suppresses("sync_code", "after", "acme/cache-warm"));
        assert!(!denylist.suppresses("deploy", "after", "acme/other"));
    }

    #[test]
    fn test_package_key_is_exact() {
        let denylist = Denylist::from_json(&json!({
            "acme/cache": [{"wf_type": "deploy", "stage": "after"}]
        }));
        assert!(!denylist.suppresses("deploy", "after", "acme/cache-warm"));
    }

    #[test]
    fn test_null_suppresses_nothing() {
        assert!(!Denylist::from_json(&Value::Null).suppresses("deploy", "after", "acme/a"));
    }

    #[test]
    fn test_malformed_rules_are_skipped() {
        let denylist = Denylist::from_json(&json!({
            "acme/a": "deploy",
            "acme/b": [{"wf_type": "deploy"}, 42, {"wf_type": "deploy", "stage": "before"}]
        }));

        assert!(denylist.suppresses("deploy", "before", "acme/b"));
        assert!(!denylist.suppresses("deploy", "after", "acme/b"));
    }

    #[test]
    fn test_non_map_suppresses_nothing() {
        assert!(!Denylist::from_json(&json!(["acme/a"])).suppresses("deploy", "after", "acme/a"));
    }
}
