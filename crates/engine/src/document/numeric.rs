//! Numeric literal repair
//!
//! Values such as a PHP version of `7.0` must be written back as `7.0`,
//! never as `7` or as the string `'7.0'`. The serializer cannot be told to
//! keep a trailing zero, so the repair happens in two separate steps:
//! floats are turned into strings before serialization, then the quotes the
//! serializer puts around number-like strings are removed again.

use regex::Regex;
use serde_yaml_ng::Value;
use std::sync::LazyLock;

/// `key: '1.5'` and `- '1.5'` lines whose quoted value is only digits and dots
static QUOTED_NUMERIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^([^:\n]+: *|(?: *- +)+)'([0-9.]+)'$")
        .expect("numeric scalar pattern is valid")
});

/// Replace every finite float in the tree with its literal text
///
/// Integral floats keep a `.0` suffix (`7.0` -> `"7.0"`). Mapping keys are
/// left untouched.
pub fn stringify_floats(value: &mut Value) {
    match value {
        Value::Number(number) if number.is_f64() => {
            if let Some(float) = number.as_f64().filter(|f| f.is_finite()) {
                *value = Value::String(float_literal(float));
            }
        }
        Value::Sequence(items) => items.iter_mut().for_each(stringify_floats),
        Value::Mapping(mapping) => mapping.values_mut().for_each(stringify_floats),
        Value::Tagged(tagged) => stringify_floats(&mut tagged.value),
        _ => {}
    }
}

/// Remove quotes from mapping values and sequence items holding a numeric literal
#[must_use]
pub fn unquote_numeric_scalars(text: &str) -> String {
    QUOTED_NUMERIC.replace_all(text, "${1}${2}").into_owned()
}

#[allow(clippy::float_cmp)]
fn float_literal(float: f64) -> String {
    let text = float.to_string();
    if float.fract() == 0.0 && !text.contains(['.', 'e', 'E']) {
        format!("{text}.0")
    } else {
        text
    }
}
