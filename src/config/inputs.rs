//! Action input access
//!
//! The Actions runner exposes each `with:` input as an environment variable
//! named `INPUT_<NAME>`, upper-cased with spaces replaced by underscores.

use indexmap::IndexMap;
use serde_json::Value;

use crate::error::IacError;
use crate::system::System;

/// Environment variable holding input `name`
#[must_use]
pub fn input_env_key(name: &str) -> String {
    format!("INPUT_{}", name.replace(' ', "_").to_uppercase())
}

/// Typed reader over the agent's action inputs
pub struct ActionInputs<'sys> {
    system: &'sys dyn System,
}

impl<'sys> ActionInputs<'sys> {
    #[must_use]
    pub fn new(system: &'sys dyn System) -> Self {
        Self { system }
    }

    /// Trimmed input value; unset and empty inputs are `None`
    ///
    /// # Errors
    ///
    /// Returns an error if `required` is set and the input is missing
    pub fn get_input(&self, name: &str, required: bool) -> Result<Option<String>, IacError> {
        let value = self
            .system
            .env_var(&input_env_key(name))
            .ok()
            .map(|v| v.trim().to_owned())
            .filter(|v| !v.is_empty());

        if required && value.is_none() {
            return Err(IacError::input(name, "Input required and not supplied"));
        }
        Ok(value)
    }

    /// Boolean input following the YAML 1.2 core schema spellings
    ///
    /// # Errors
    ///
    /// Returns an error for values other than `true`/`false` variants
    pub fn get_bool_input(&self, name: &str, default: bool) -> Result<bool, IacError> {
        match self.get_input(name, false)?.as_deref() {
            None => Ok(default),
            Some("true" | "True" | "TRUE") => Ok(true),
            Some("false" | "False" | "FALSE") => Ok(false),
            Some(other) => Err(IacError::input(
                name,
                format!("'{other}' is not a boolean. Use `true` or `false`"),
            )),
        }
    }

    /// Integer input
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not an integer
    pub fn get_int_input(&self, name: &str) -> Result<Option<i64>, IacError> {
        self.get_input(name, false)?
            .map(|raw| {
                raw.parse::<i64>().map_err(|e| {
                    IacError::input(name, format!("'{raw}' is not an integer: {e}"))
                })
            })
            .transpose()
    }

    /// Comma- or newline-separated list, entries trimmed, empties dropped
    ///
    /// # Errors
    ///
    /// Same as `get_input`
    pub fn get_list_input(&self, name: &str) -> Result<Vec<String>, IacError> {
        Ok(self
            .get_input(name, false)?
            .map(|raw| parse_list(&raw))
            .unwrap_or_default())
    }

    /// JSON object input
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not a JSON object
    pub fn get_map_input(&self, name: &str) -> Result<IndexMap<String, Value>, IacError> {
        self.get_input(name, false)?
            .map(|raw| parse_object(name, &raw))
            .transpose()
            .map(Option::unwrap_or_default)
    }
}

/// Split on commas and newlines
#[must_use]
pub fn parse_list(raw: &str) -> Vec<String> {
    raw.split([',', '\n'])
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Parse a JSON object, keeping key order
///
/// # Errors
///
/// Returns an error naming `name` if `raw` is not a JSON object
pub fn parse_object(name: &str, raw: &str) -> Result<IndexMap<String, Value>, IacError> {
    serde_json::from_str::<IndexMap<String, Value>>(raw)
        .map_err(|e| IacError::input(name, format!("expected a JSON object: {e}")))
}

/// String form of a JSON value as passed on the command line
///
/// Strings are taken verbatim; everything else uses its JSON encoding, which
/// terraform accepts for numbers, booleans, lists and maps.
#[must_use]
pub fn value_to_arg(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "These are unit tests")]
mod tests {
    use super::*;
    use crate::system::MockSystem;

    #[test]
    fn env_key_format() {
        assert_eq!(input_env_key("working-directory"), "INPUT_WORKING-DIRECTORY");
        assert_eq!(input_env_key("my input"), "INPUT_MY_INPUT");
    }

    #[test]
    fn required_input_missing() {
        let system = MockSystem::new();
        let inputs = ActionInputs::new(&system);
        let err = inputs.get_input("command", true).unwrap_err();
        assert!(err.to_string().contains("command"));
        assert!(inputs.get_input("command", false).unwrap().is_none());
    }

    #[test]
    fn blank_input_is_unset() {
        let system = MockSystem::new().with_input("command", "   ").unwrap();
        let inputs = ActionInputs::new(&system);
        inputs.get_input("command", true).unwrap_err();
    }

    #[test]
    fn booleans() {
        let system = MockSystem::new()
            .with_input("a", "true")
            .unwrap()
            .with_input("b", "FALSE")
            .unwrap()
            .with_input("c", "yes")
            .unwrap();
        let inputs = ActionInputs::new(&system);
        assert!(inputs.get_bool_input("a", false).unwrap());
        assert!(!inputs.get_bool_input("b", true).unwrap());
        assert!(inputs.get_bool_input("missing", true).unwrap());
        inputs.get_bool_input("c", false).unwrap_err();
    }

    #[test]
    fn integers() {
        let system = MockSystem::new()
            .with_input("parallelism", "8")
            .unwrap()
            .with_input("bad", "eight")
            .unwrap();
        let inputs = ActionInputs::new(&system);
        assert_eq!(inputs.get_int_input("parallelism").unwrap(), Some(8));
        assert_eq!(inputs.get_int_input("missing").unwrap(), None);
        inputs.get_int_input("bad").unwrap_err();
    }

    #[test]
    fn lists() {
        assert_eq!(
            parse_list("a.tfvars, b.tfvars\nc.tfvars,,"),
            vec!["a.tfvars", "b.tfvars", "c.tfvars"]
        );
        assert!(parse_list("").is_empty());
    }

    #[test]
    fn objects_keep_order() {
        let map = parse_object("variables", r#"{"z": "1", "a": 2, "m": true}"#).unwrap();
        let keys: Vec<_> = map.keys().cloned().collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
        assert_eq!(value_to_arg(&map["a"]), "2");
        assert_eq!(value_to_arg(&map["m"]), "true");
        assert_eq!(value_to_arg(&map["z"]), "1");
    }

    #[test]
    fn object_rejects_arrays() {
        let err = parse_object("variables", r#"["a"]"#).unwrap_err();
        assert!(err.to_string().contains("variables"));
    }

    #[test]
    fn list_values_stay_json() {
        let value = serde_json::json!(["a", "b"]);
        assert_eq!(value_to_arg(&value), r#"["a","b"]"#);
    }
}
