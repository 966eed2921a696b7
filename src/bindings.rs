//! Values substituted for `@name` references in a formula.
//!
//! Host data is usually a nested JSON document (an actor's system data). [`Bindings::from_json`]
//! flattens it into dotted paths so `@aptitudes.might.mod` resolves the same way it does on the host.

use crate::common::*;
use std::collections::HashMap;
use std::convert::Infallible;
use std::str::FromStr;

/// A single bound value: a number, or a formula that is parsed in place of the reference.
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(untagged)]
pub enum Binding {
    Int(Int),
    Float(Float),
    Formula(String),
}

impl From<i32> for Binding {
    fn from(x: i32) -> Self {
        Self::Int(x.into())
    }
}

impl From<Int> for Binding {
    fn from(x: Int) -> Self {
        Self::Int(x)
    }
}

impl From<Float> for Binding {
    fn from(x: Float) -> Self {
        Self::Float(x)
    }
}

impl From<&str> for Binding {
    fn from(s: &str) -> Self {
        Self::Formula(s.to_owned())
    }
}

impl From<String> for Binding {
    fn from(s: String) -> Self {
        Self::Formula(s)
    }
}

/// Numbers become numeric bindings; anything else is kept as a formula.
impl FromStr for Binding {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Ok(if let Ok(x) = s.parse::<Int>() {
            Self::Int(x)
        } else if let Ok(x) = s.parse::<Float>() {
            Self::Float(x)
        } else {
            Self::Formula(s.to_owned())
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize)]
#[serde(transparent)]
pub struct Bindings {
    values: HashMap<String, Binding>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<Binding>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Binding>) -> Option<Binding> {
        self.values.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&Binding> {
        self.values.get(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Flattens a JSON document into dotted-path bindings.
    ///
    /// Numbers and strings become bindings; booleans, nulls and arrays carry nothing a formula
    /// can reference and are skipped.
    pub fn from_json(value: &serde_json::Value) -> Self {
        let mut ret = Self::new();
        ret.flatten_json(None, value);
        ret
    }

    fn flatten_json(&mut self, prefix: Option<&str>, value: &serde_json::Value) {
        use serde_json::Value;

        match value {
            Value::Object(map) => {
                for (key, inner) in map {
                    let path = match prefix {
                        Some(prefix) => format!("{}.{}", prefix, key),
                        None => key.clone(),
                    };
                    self.flatten_json(Some(&path), inner);
                }
            }
            Value::Number(n) => {
                if let Some(prefix) = prefix {
                    let binding = match n.as_i64() {
                        Some(x) => Binding::Int(x),
                        None => Binding::Float(n.as_f64().unwrap_or(0.0)),
                    };
                    self.insert(prefix, binding);
                }
            }
            Value::String(s) => {
                if let Some(prefix) = prefix {
                    self.insert(prefix, s.as_str());
                }
            }
            Value::Bool(_) | Value::Null | Value::Array(_) => {}
        }
    }
}

impl<K: Into<String>, V: Into<Binding>> FromIterator<(K, V)> for Bindings {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut ret = Self::new();
        ret.extend(iter);
        ret
    }
}

impl<K: Into<String>, V: Into<Binding>> Extend<(K, V)> for Bindings {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (name, value) in iter {
            self.insert(name, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binding_from_str() {
        assert_eq!("3".parse::<Binding>().unwrap(), Binding::Int(3));
        assert_eq!(" -2 ".parse::<Binding>().unwrap(), Binding::Int(-2));
        assert_eq!("1.5".parse::<Binding>().unwrap(), Binding::Float(1.5));
        assert_eq!(
            "1d4 + 1".parse::<Binding>().unwrap(),
            Binding::Formula("1d4 + 1".to_string())
        );
    }

    #[test]
    fn test_from_json_flattens_paths() {
        let data = serde_json::json!({
            "aptitudes": {
                "might": { "value": 3, "mod": 1 },
                "deft": { "value": 2, "mod": -1 },
            },
            "attributes": { "ac": { "flat": 12.5, "formula": "10 + @aptitudes.deft.mod" } },
            "biography": null,
            "tags": ["veteran"],
            "inspired": true,
        });

        let bindings = Bindings::from_json(&data);
        assert_eq!(bindings.get("aptitudes.might.mod"), Some(&Binding::Int(1)));
        assert_eq!(bindings.get("aptitudes.deft.mod"), Some(&Binding::Int(-1)));
        assert_eq!(bindings.get("attributes.ac.flat"), Some(&Binding::Float(12.5)));
        assert_eq!(
            bindings.get("attributes.ac.formula"),
            Some(&Binding::Formula("10 + @aptitudes.deft.mod".to_string()))
        );
        assert_eq!(bindings.get("biography"), None);
        assert_eq!(bindings.get("tags"), None);
        assert_eq!(bindings.get("inspired"), None);
        assert_eq!(bindings.len(), 6);
    }

    #[test]
    fn test_deserialize_flat_map() {
        let bindings: Bindings =
            serde_json::from_str(r#"{ "mod": 2, "prof": 3, "bonus": "1d4" }"#).unwrap();
        assert_eq!(bindings.get("mod"), Some(&Binding::Int(2)));
        assert_eq!(bindings.get("bonus"), Some(&Binding::Formula("1d4".to_string())));
    }

    #[test]
    fn test_collect() {
        let bindings: Bindings = vec![("mod", 2), ("prof", 3)].into_iter().collect();
        assert_eq!(bindings.len(), 2);
        assert!(!bindings.is_empty());
    }
}
