//! Hook declaration structures
//!
//! Defines the strict [`HookDeclaration`] produced from a package's untyped
//! extras, the [`RawDeclaration`] it is converted from, and the
//! [`HookCatalog`] that groups declarations by hook type.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

/// Hook declaration fields exactly as a package wrote them
///
/// Every field is optional here; the schema validator decides whether the
/// combination is usable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawDeclaration {
    /// Hook type (`wf_type`)
    pub wf_type: Option<String>,
    /// Stage within the hook type
    pub stage: Option<String>,
    /// Ordering weight, not yet checked
    pub weight: Option<Value>,
    /// Explicit script file name
    pub script: Option<String>,
}

impl RawDeclaration {
    /// Read a declaration out of one extras list item
    ///
    /// Returns `None` when the item is not a map. Fields of the wrong type
    /// are treated as absent.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let text = |key: &str| {
            object
                .get(key)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        Some(Self {
            wf_type: text("wf_type"),
            stage: text("stage"),
            weight: object.get("weight").filter(|w| !w.is_null()).cloned(),
            script: text("script"),
        })
    }

    /// Interpret the declared weight
    ///
    /// A missing weight is 0. Integers, integral floats and integer strings
    /// are accepted.
    ///
    /// # Errors
    ///
    /// Returns a description of the problem when the weight is not an integer
    #[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
    pub fn weight(&self) -> std::result::Result<i64, String> {
        match &self.weight {
            None => Ok(0),
            Some(Value::Number(n)) => {
                if let Some(w) = n.as_i64() {
                    return Ok(w);
                }
                match n.as_f64() {
                    Some(f) if f.fract() == 0.0 && f.abs() < 9.0e15 => Ok(f as i64),
                    _ => Err(format!("weight {n} is not an integer")),
                }
            }
            Some(Value::String(s)) => s
                .trim()
                .parse::<i64>()
                .map_err(|_| format!("weight '{s}' is not an integer")),
            Some(other) => Err(format!("weight {other} is not an integer")),
        }
    }

    /// Label used in log messages
    #[must_use]
    pub fn label(&self) -> String {
        format!(
            "{}/{}",
            self.wf_type.as_deref().unwrap_or("<missing wf_type>"),
            self.stage.as_deref().unwrap_or("<missing stage>")
        )
    }
}

/// A validated hook contributed by one package
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HookDeclaration {
    /// Hook type (`wf_type`)
    pub wf_type: String,

    /// Stage within the hook type
    pub stage: String,

    /// Ordering weight (lower runs first)
    pub weight: i64,

    /// Resolved script path, relative to the project root
    pub script: String,

    /// Owning package name
    pub package_name: String,

    /// Owning package description
    pub package_description: String,
}

/// Declarations grouped by hook type
///
/// Groups keep the order in which hook types were first discovered. Inside
/// a group declarations are sorted ascending by weight; equal weights keep
/// discovery order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct HookCatalog {
    groups: IndexMap<String, Vec<HookDeclaration>>,
}

impl HookCatalog {
    /// Create an empty catalog
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a declaration to its hook type group
    ///
    /// Call [`HookCatalog::sort_by_weight`] once all declarations are in.
    pub fn push(&mut self, declaration: HookDeclaration) {
        self.groups
            .entry(declaration.wf_type.clone())
            .or_default()
            .push(declaration);
    }

    /// Sort every group ascending by weight
    ///
    /// `sort_by_key` is a stable sort, so equal weights keep discovery order.
    pub fn sort_by_weight(&mut self) {
        for declarations in self.groups.values_mut() {
            declarations.sort_by_key(|d| d.weight);
        }
    }

    /// Check if there are no declarations
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.values().all(Vec::is_empty)
    }

    /// Get total number of declarations
    #[must_use]
    pub fn total(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    /// Declarations of one hook type
    #[must_use]
    pub fn get(&self, wf_type: &str) -> &[HookDeclaration] {
        self.groups.get(wf_type).map(Vec::as_slice).unwrap_or_default()
    }

    /// Iterate over hook types and their declarations
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[HookDeclaration])> {
        self.groups.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Iterate over all declarations, group by group
    pub fn declarations(&self) -> impl Iterator<Item = &HookDeclaration> {
        self.groups.values().flatten()
    }

    /// Declarations of one hook type and stage, in weight order
    pub fn for_stage<'a>(
        &'a self,
        wf_type: &str,
        stage: &'a str,
    ) -> impl Iterator<Item = &'a HookDeclaration> {
        self.get(wf_type).iter().filter(move |d| d.stage == stage)
    }

    /// Whether a package already has a declaration for this hook type and stage
    #[must_use]
    pub fn contains(&self, package_name: &str, wf_type: &str, stage: &str) -> bool {
        self.for_stage(wf_type, stage)
            .any(|d| d.package_name == package_name)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use serde_json::json;

    fn declaration(package: &str, wf_type: &str, stage: &str, weight: i64) -> HookDeclaration {
        HookDeclaration {
            wf_type: wf_type.to_string(),
            stage: stage.to_string(),
            weight,
            script: format!("private/scripts/{package}.php"),
            package_name: package.to_string(),
            package_description: String::new(),
        }
    }

    #[test]
    fn test_raw_from_value_full() {
        let raw = RawDeclaration::from_value(&json!({
            "wf_type": "deploy",
            "stage": "after",
            "weight": 5,
            "script": "warm.php"
        }))
        .unwrap();

        assert_eq!(raw.wf_type.as_deref(), Some("deploy"));
        assert_eq!(raw.stage.as_deref(), Some("after"));
        assert_eq!(raw.weight(), Ok(5));
        assert_eq!(raw.script.as_deref(), Some("warm.php"));
    }

    #[test]
    fn test_raw_from_value_not_a_map() {
        assert!(RawDeclaration::from_value(&json!("deploy")).is_none());
        assert!(RawDeclaration::from_value(&json!([1, 2])).is_none());
    }

    #[test]
    fn test_raw_wrong_types_are_absent() {
        let raw = RawDeclaration::from_value(&json!({"wf_type": 3, "stage": "", "script": null}))
            .unwrap();
        assert!(raw.wf_type.is_none());
        assert!(raw.stage.is_none());
        assert!(raw.script.is_none());
    }

    #[test]
    fn test_weight_defaults_to_zero() {
        let raw = RawDeclaration::from_value(&json!({"wf_type": "deploy", "stage": "after"}))
            .unwrap();
        assert_eq!(raw.weight(), Ok(0));

        let null_weight = RawDeclaration::from_value(&json!({"weight": null})).unwrap();
        assert_eq!(null_weight.weight(), Ok(0));
    }

    #[test]
    fn test_weight_accepts_integral_forms() {
        let float = RawDeclaration::from_value(&json!({"weight": 10.0})).unwrap();
        assert_eq!(float.weight(), Ok(10));

        let negative = RawDeclaration::from_value(&json!({"weight": -3})).unwrap();
        assert_eq!(negative.weight(), Ok(-3));

        let text = RawDeclaration::from_value(&json!({"weight": " 7 "})).unwrap();
        assert_eq!(text.weight(), Ok(7));
    }

    #[test]
    fn test_weight_rejects_non_integers() {
        for weight in [json!(1.5), json!("heavy"), json!([1]), json!(true)] {
            let raw = RawDeclaration::from_value(&json!({ "weight": weight })).unwrap();
            assert!(raw.weight().is_err(), "{weight} should be rejected");
        }
    }

    #[test]
    fn test_raw_label() {
        let raw = RawDeclaration {
            wf_type: Some("deploy".to_string()),
            ..RawDeclaration::default()
        };
        assert_eq!(raw.label(), "deploy/<missing stage>");
    }

    #[test]
    fn test_catalog_default() {
        let catalog = HookCatalog::new();
        assert!(catalog.is_empty());
        assert_eq!(catalog.total(), 0);
        assert!(catalog.get("deploy").is_empty());
    }

    #[test]
    fn test_catalog_groups_by_hook_type() {
        let mut catalog = HookCatalog::new();
        catalog.push(declaration("acme/a", "deploy", "after", 0));
        catalog.push(declaration("acme/b", "sync_code", "before", 0));
        catalog.push(declaration("acme/c", "deploy", "before", 0));

        assert_eq!(catalog.total(), 3);
        assert_eq!(catalog.get("deploy").len(), 2);
        assert_eq!(catalog.get("sync_code").len(), 1);

        let types: Vec<&str> = catalog.iter().map(|(t, _)| t).collect();
        assert_eq!(types, vec!["deploy", "sync_code"]);
    }

    #[test]
    fn test_sort_by_weight_is_stable() {
        let mut catalog = HookCatalog::new();
        catalog.push(declaration("acme/first", "deploy", "after", 5));
        catalog.push(declaration("acme/second", "deploy", "after", 0));
        catalog.push(declaration("acme/third", "deploy", "after", 5));
        catalog.push(declaration("acme/fourth", "deploy", "after", -1));
        catalog.sort_by_weight();

        let names: Vec<&str> = catalog
            .get("deploy")
            .iter()
            .map(|d| d.package_name.as_str())
            .collect();
        assert_eq!(
            names,
            vec!["acme/fourth", "acme/second", "acme/first", "acme/third"]
        );
    }

    #[test]
    fn test_for_stage_and_contains() {
        let mut catalog = HookCatalog::new();
        catalog.push(declaration("acme/a", "deploy", "after", 0));
        catalog.push(declaration("acme/b", "deploy", "before", 0));

        assert_eq!(catalog.for_stage("deploy", "after").count(), 1);
        assert!(catalog.contains("acme/a", "deploy", "after"));
        assert!(!catalog.contains("acme/a", "deploy", "before"));
        assert!(!catalog.contains("acme/a", "clear_cache", "after"));
    }

    #[test]
    fn test_catalog_serializes_as_map() {
        let mut catalog = HookCatalog::new();
        catalog.push(declaration("acme/a", "deploy", "after", 2));

        let value = serde_json::to_value(&catalog).unwrap();
        assert_eq!(value["deploy"][0]["package_name"], "acme/a");
        assert_eq!(value["deploy"][0]["weight"], 2);
    }
}
