//! Package metadata records
//!
//! A [`PackageRef`] is the immutable view of one installed package supplied
//! by the host package manager for a single reconciliation pass. Its field
//! names follow the Composer manifest format so records can be read straight
//! from `installed.json` or a package's `composer.json`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One installed package as seen by the reconciliation pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageRef {
    /// Package identifier, e.g. `acme/cache-warm`
    pub name: String,

    /// Declared package type (category tag)
    #[serde(rename = "type", default = "default_kind")]
    pub kind: String,

    /// Free-text description
    #[serde(default)]
    pub description: String,

    /// Opaque map of declared extras
    ///
    /// Kept untyped: only the hook catalog builder looks inside, and it
    /// converts what it finds into strict declarations immediately.
    #[serde(rename = "extra", default)]
    pub extras: Value,
}

impl PackageRef {
    /// Create a package record with no extras
    pub fn new(
        name: impl Into<String>,
        kind: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            description: description.into(),
            extras: Value::Null,
        }
    }

    /// Attach an extras map
    #[must_use]
    pub fn with_extras(mut self, extras: Value) -> Self {
        self.extras = extras;
        self
    }

    /// Look up one key of the extras map
    ///
    /// Returns `None` when the extras are absent or are not a map.
    #[must_use]
    pub fn extra(&self, key: &str) -> Option<&Value> {
        self.extras.as_object().and_then(|map| map.get(key))
    }

    /// The part of the name after the vendor prefix (`acme/cache-warm` -> `cache-warm`)
    #[must_use]
    pub fn short_name(&self) -> &str {
        self.name
            .rsplit_once('/')
            .map_or(self.name.as_str(), |(_, name)| name)
    }

    /// The vendor prefix of the name, if any
    #[must_use]
    pub fn vendor(&self) -> Option<&str> {
        self.name.split_once('/').map(|(vendor, _)| vendor)
    }
}

fn default_kind() -> String {
    "library".to_string()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_composer_record() {
        let record = json!({
            "name": "acme/cache-warm",
            "type": "quicksilver-script",
            "description": "Warm caches after deploy",
            "extra": {"quicksilver": {"cache-warm": []}},
            "version": "1.2.0"
        });

        let package: PackageRef = serde_json::from_value(record).unwrap();
        assert_eq!(package.name, "acme/cache-warm");
        assert_eq!(package.kind, "quicksilver-script");
        assert_eq!(package.description, "Warm caches after deploy");
        assert!(package.extra("quicksilver").is_some());
    }

    #[test]
    fn test_deserialize_defaults() {
        let package: PackageRef = serde_json::from_value(json!({"name": "acme/lib"})).unwrap();
        assert_eq!(package.kind, "library");
        assert!(package.description.is_empty());
        assert!(package.extra("quicksilver").is_none());
    }

    #[test]
    fn test_extra_on_non_map_extras() {
        // PHP serializes an empty extras map as an empty list
        let package = PackageRef::new("acme/x", "library", "").with_extras(json!([]));
        assert!(package.extra("quicksilver").is_none());
    }

    #[test]
    fn test_short_name_and_vendor() {
        let package = PackageRef::new("acme/cache-warm", "quicksilver-script", "");
        assert_eq!(package.short_name(), "cache-warm");
        assert_eq!(package.vendor(), Some("acme"));

        let bare = PackageRef::new("standalone", "quicksilver-script", "");
        assert_eq!(bare.short_name(), "standalone");
        assert_eq!(bare.vendor(), None);
    }
}
