//! Config validation - warns about unknown fields

use serde_json::Value;
use std::collections::{HashMap, HashSet};
use tracing::warn;

use crate::keymap::KeyAction;

/// Validate JSON config and warn about unknown fields.
pub fn warn_unknown_fields(content: &str, config_name: &str) {
    let Ok(value) = serde_json::from_str::<Value>(content) else {
        return;
    };

    for path in find_unknown_keys(&value, &expected_config_keys(), "") {
        warn!("Unknown config field in {config_name}: {path}");
    }
}

/// Walk `value` against `expected`, returning dotted paths such as
/// `window.heigth` for every key that has no counterpart.
fn find_unknown_keys(value: &Value, expected: &ExpectedKeys, prefix: &str) -> Vec<String> {
    let Value::Object(obj) = value else {
        return Vec::new();
    };

    let mut unknowns = Vec::new();
    for (key, child) in obj {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };

        match expected.nested.get(key.as_str()) {
            Some(nested) => unknowns.extend(find_unknown_keys(child, nested, &path)),
            None if expected.fields.contains(key.as_str()) => {}
            None => unknowns.push(path),
        }
    }
    unknowns
}

/// Leaf `fields` and `nested` sections accepted at one level of the config.
#[derive(Default)]
struct ExpectedKeys {
    fields: HashSet<&'static str>,
    nested: HashMap<&'static str, ExpectedKeys>,
}

impl ExpectedKeys {
    fn new(fields: &[&'static str]) -> Self {
        Self {
            fields: fields.iter().copied().collect(),
            nested: HashMap::new(),
        }
    }

    fn with_nested(mut self, key: &'static str, nested: ExpectedKeys) -> Self {
        self.nested.insert(key, nested);
        self
    }
}

fn expected_config_keys() -> ExpectedKeys {
    let keymap_names: Vec<&'static str> = KeyAction::ALL.iter().map(|a| a.as_str()).collect();

    ExpectedKeys::default()
        .with_nested("poll", ExpectedKeys::new(&["intervalMs"]))
        .with_nested(
            "window",
            ExpectedKeys::new(&["width", "collapsedHeight", "expandedHeight"]),
        )
        .with_nested("keymap", ExpectedKeys::new(&keymap_names))
        .with_nested(
            "apps",
            ExpectedKeys::new(&["launcher", "fileManager", "clipboard"]),
        )
}
