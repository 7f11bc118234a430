use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A single tunable value. Numbers are always f64 — typed configs cast
/// on read. Untagged so JSON/TOML values map directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Number(v)
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Text(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        ParamValue::Text(v)
    }
}

/// The UI-facing parameter map. Keys are never validated against the
/// control schema — unknown keys are stored and carried along.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Params(BTreeMap<String, ParamValue>);

impl Params {
    pub fn new() -> Self {
        Params(BTreeMap::new())
    }

    /// Shared defaults every variant starts from.
    pub fn base_defaults() -> Self {
        Params::new()
            .with("speed", 1.0)
            .with("trails", false)
            .with("trail_fade", 0.95)
    }

    pub fn with(mut self, key: &str, value: impl Into<ParamValue>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    /// Shallow merge: every key in `patch` replaces the existing entry.
    pub fn merge(&mut self, patch: Params) {
        for (k, v) in patch.0 {
            self.0.insert(k, v);
        }
    }

    #[allow(dead_code)]
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.0.get(key)
    }

    pub fn number(&self, key: &str, default: f64) -> f64 {
        match self.0.get(key) {
            Some(ParamValue::Number(v)) => *v,
            _ => default,
        }
    }

    pub fn flag(&self, key: &str, default: bool) -> bool {
        match self.0.get(key) {
            Some(ParamValue::Bool(v)) => *v,
            _ => default,
        }
    }

    pub fn text<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        match self.0.get(key) {
            Some(ParamValue::Text(v)) => v,
            _ => default,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Descriptor for one UI control. The host maps these to widgets and
/// feeds edits back through `update_params` — the core never sees a
/// widget.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Control {
    Range {
        min: f64,
        max: f64,
        step: f64,
        label: &'static str,
    },
    Select {
        options: Vec<&'static str>,
        label: &'static str,
    },
    Checkbox {
        label: &'static str,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct ControlEntry {
    pub name: &'static str,
    #[serde(flatten)]
    pub control: Control,
}

/// Ordered control schema for one variant. Logically a constant: built
/// fresh on each call but always identical for a given variant.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Schema(pub Vec<ControlEntry>);

impl Schema {
    pub fn new() -> Self {
        Schema(Vec::new())
    }

    /// Controls for the shared base parameters.
    pub fn base() -> Self {
        Schema::new()
            .range("speed", "Speed", 0.1, 5.0, 0.1)
            .checkbox("trails", "Trails")
            .range("trail_fade", "Trail fade", 0.80, 0.99, 0.01)
    }

    pub fn range(mut self, name: &'static str, label: &'static str, min: f64, max: f64, step: f64) -> Self {
        self.0.push(ControlEntry {
            name,
            control: Control::Range { min, max, step, label },
        });
        self
    }

    pub fn select(mut self, name: &'static str, label: &'static str, options: &[&'static str]) -> Self {
        self.0.push(ControlEntry {
            name,
            control: Control::Select {
                options: options.to_vec(),
                label,
            },
        });
        self
    }

    pub fn checkbox(mut self, name: &'static str, label: &'static str) -> Self {
        self.0.push(ControlEntry {
            name,
            control: Control::Checkbox { label },
        });
        self
    }

    #[allow(dead_code)]
    pub fn entries(&self) -> &[ControlEntry] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_is_shallow_and_keeps_unknown_keys() {
        let mut params = Params::base_defaults().with("sides", 5.0);
        params.merge(Params::new().with("sides", 8.0).with("bogus", "yes"));
        assert_eq!(params.number("sides", 0.0), 8.0);
        assert_eq!(params.text("bogus", ""), "yes");
        // Untouched keys survive
        assert_eq!(params.number("speed", 0.0), 1.0);
        assert!(!params.flag("trails", true));
    }

    #[test]
    fn test_typed_getters_fall_back_on_wrong_type() {
        let params = Params::new().with("speed", "fast");
        assert_eq!(params.number("speed", 1.0), 1.0);
    }

    #[test]
    fn test_json_patch_round_trip() {
        let patch: Params =
            serde_json::from_str(r#"{"speed": 2.5, "trails": true, "color_mode": "fire"}"#).unwrap();
        assert_eq!(patch.number("speed", 0.0), 2.5);
        assert!(patch.flag("trails", false));
        assert_eq!(patch.text("color_mode", ""), "fire");

        let json = serde_json::to_string(&patch).unwrap();
        let back: Params = serde_json::from_str(&json).unwrap();
        assert_eq!(back, patch);
    }

    #[test]
    fn test_integer_json_values_become_numbers() {
        let patch: Params = serde_json::from_str(r#"{"sides": 7}"#).unwrap();
        assert_eq!(patch.number("sides", 0.0), 7.0);
    }

    #[test]
    fn test_schema_serializes_tagged() {
        let schema = Schema::new().range("zoom_speed", "Zoom speed", 0.0, 20.0, 0.5);
        let json = serde_json::to_value(&schema).unwrap();
        assert_eq!(json[0]["kind"], "range");
        assert_eq!(json[0]["name"], "zoom_speed");
        assert_eq!(json[0]["max"], 20.0);
    }
}
