//! Argument schemas compiled from a tool's JSON Schema
//!
//! Only the subset MCP servers actually emit for tool inputs is checked:
//! object type, `required`, per-property `type` (including `anyOf`/`oneOf`
//! unions of simple types), `enum`, and `additionalProperties: false`.
//! Anything else in the schema is accepted as-is.

use serde_json::{Map, Value};
use std::fmt;

/// JSON value kinds a property may be declared as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonType {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
    Null,
}

impl JsonType {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "string" => Some(JsonType::String),
            "integer" => Some(JsonType::Integer),
            "number" => Some(JsonType::Number),
            "boolean" => Some(JsonType::Boolean),
            "array" => Some(JsonType::Array),
            "object" => Some(JsonType::Object),
            "null" => Some(JsonType::Null),
            _ => None,
        }
    }

    fn matches(&self, value: &Value) -> bool {
        match self {
            JsonType::String => value.is_string(),
            JsonType::Integer => match value {
                Value::Number(n) => {
                    n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.fract() == 0.0)
                }
                _ => false,
            },
            JsonType::Number => value.is_number(),
            JsonType::Boolean => value.is_boolean(),
            JsonType::Array => value.is_array(),
            JsonType::Object => value.is_object(),
            JsonType::Null => value.is_null(),
        }
    }

    fn of(value: &Value) -> &'static str {
        match value {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }
}

impl fmt::Display for JsonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JsonType::String => "string",
            JsonType::Integer => "integer",
            JsonType::Number => "number",
            JsonType::Boolean => "boolean",
            JsonType::Array => "array",
            JsonType::Object => "object",
            JsonType::Null => "null",
        };
        f.write_str(name)
    }
}

/// Constraints on a single property
#[derive(Debug, Clone, Default, PartialEq)]
struct PropertySchema {
    /// Accepted kinds; empty means any
    types: Vec<JsonType>,
    enum_values: Option<Vec<Value>>,
}

impl PropertySchema {
    fn compile(schema: &Value) -> Self {
        let enum_values = schema.get("enum").and_then(Value::as_array).cloned();
        Self {
            types: Self::declared_types(schema).unwrap_or_default(),
            enum_values,
        }
    }

    /// `None` when any branch is unconstrained
    fn declared_types(schema: &Value) -> Option<Vec<JsonType>> {
        if let Some(declared) = schema.get("type") {
            return match declared {
                Value::String(name) => JsonType::from_name(name).map(|t| vec![t]),
                Value::Array(names) => names
                    .iter()
                    .map(|n| n.as_str().and_then(JsonType::from_name))
                    .collect(),
                _ => None,
            };
        }

        let branches = schema
            .get("anyOf")
            .or_else(|| schema.get("oneOf"))
            .and_then(Value::as_array)?;

        let mut types = Vec::new();
        for branch in branches {
            types.extend(Self::declared_types(branch)?);
        }
        Some(types)
    }

    fn check(&self, key: &str, value: &Value) -> Result<(), String> {
        if !self.types.is_empty() && !self.types.iter().any(|t| t.matches(value)) {
            let expected = self
                .types
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(" or ");
            return Err(format!(
                "argument '{}' must be {}, got {}",
                key,
                expected,
                JsonType::of(value)
            ));
        }

        if let Some(ref allowed) = self.enum_values {
            if !allowed.contains(value) {
                return Err(format!("argument '{}' must be one of {:?}", key, allowed));
            }
        }

        Ok(())
    }
}

/// Compiled argument schema for one tool
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArgumentSchema {
    properties: Vec<(String, PropertySchema)>,
    required: Vec<String>,
    additional_allowed: bool,
}

impl ArgumentSchema {
    /// Compile from a tool's `inputSchema`
    pub fn compile(schema: &Value) -> Self {
        let properties = schema
            .get("properties")
            .and_then(Value::as_object)
            .map(|props| {
                props
                    .iter()
                    .map(|(name, prop)| (name.clone(), PropertySchema::compile(prop)))
                    .collect()
            })
            .unwrap_or_default();

        let required = schema
            .get("required")
            .and_then(Value::as_array)
            .map(|names| {
                names
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let additional_allowed = !matches!(
            schema.get("additionalProperties"),
            Some(Value::Bool(false))
        );

        Self {
            properties,
            required,
            additional_allowed,
        }
    }

    /// Check a payload, returning it as an object on success
    ///
    /// A missing payload (`null`) is treated as an empty object.
    pub fn validate(&self, arguments: &Value) -> Result<Map<String, Value>, String> {
        let map = match arguments {
            Value::Object(map) => map.clone(),
            Value::Null => Map::new(),
            other => {
                return Err(format!(
                    "arguments must be an object, got {}",
                    JsonType::of(other)
                ))
            }
        };

        if let Some(missing) = self.required.iter().find(|name| !map.contains_key(*name)) {
            return Err(format!("missing required argument '{}'", missing));
        }

        for (key, value) in &map {
            match self.properties.iter().find(|(name, _)| name == key) {
                Some((_, prop)) => prop.check(key, value)?,
                None if !self.additional_allowed => {
                    return Err(format!("unexpected argument '{}'", key));
                }
                None => {}
            }
        }

        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn add_schema() -> ArgumentSchema {
        ArgumentSchema::compile(&json!({
            "type": "object",
            "properties": {
                "a": {"type": "integer", "title": "A"},
                "b": {"type": "integer", "title": "B"}
            },
            "required": ["a", "b"],
            "title": "addArguments"
        }))
    }

    #[test]
    fn test_valid_arguments_pass() {
        let map = add_schema().validate(&json!({"a": 2, "b": 3})).unwrap();
        assert_eq!(map.get("a"), Some(&json!(2)));
    }

    #[test]
    fn test_missing_required_argument() {
        let err = add_schema().validate(&json!({"a": 2})).unwrap_err();
        assert_eq!(err, "missing required argument 'b'");
    }

    #[test]
    fn test_wrong_type_rejected() {
        let err = add_schema().validate(&json!({"a": "2", "b": 3})).unwrap_err();
        assert_eq!(err, "argument 'a' must be integer, got string");
    }

    #[test]
    fn test_integral_float_counts_as_integer() {
        assert!(add_schema().validate(&json!({"a": 2.0, "b": 3})).is_ok());
        assert!(add_schema().validate(&json!({"a": 2.5, "b": 3})).is_err());
    }

    #[test]
    fn test_non_object_payload_rejected() {
        let err = add_schema().validate(&json!([2, 3])).unwrap_err();
        assert!(err.contains("must be an object"));
    }

    #[test]
    fn test_null_payload_is_empty_object() {
        let schema = ArgumentSchema::compile(&json!({"type": "object", "properties": {}}));
        assert!(schema.validate(&Value::Null).unwrap().is_empty());
    }

    #[test]
    fn test_any_of_union_for_optional_argument() {
        let schema = ArgumentSchema::compile(&json!({
            "type": "object",
            "properties": {
                "note": {"anyOf": [{"type": "string"}, {"type": "null"}], "default": null}
            }
        }));
        assert!(schema.validate(&json!({"note": null})).is_ok());
        assert!(schema.validate(&json!({"note": "hi"})).is_ok());
        assert!(schema.validate(&json!({"note": 1})).is_err());
    }

    #[test]
    fn test_type_list_and_enum() {
        let schema = ArgumentSchema::compile(&json!({
            "type": "object",
            "properties": {
                "mode": {"type": ["string", "null"], "enum": ["fast", "slow", null]}
            }
        }));
        assert!(schema.validate(&json!({"mode": "fast"})).is_ok());
        assert!(schema.validate(&json!({"mode": "medium"})).is_err());
    }

    #[test]
    fn test_additional_properties() {
        let open = add_schema();
        assert!(open.validate(&json!({"a": 1, "b": 2, "c": 3})).is_ok());

        let closed = ArgumentSchema::compile(&json!({
            "type": "object",
            "properties": {"a": {"type": "integer"}},
            "additionalProperties": false
        }));
        let err = closed.validate(&json!({"a": 1, "c": 3})).unwrap_err();
        assert_eq!(err, "unexpected argument 'c'");
    }

    #[test]
    fn test_unknown_type_is_unconstrained() {
        let schema = ArgumentSchema::compile(&json!({
            "type": "object",
            "properties": {"x": {"type": "custom"}, "y": {"$ref": "#/defs/Y"}}
        }));
        assert!(schema.validate(&json!({"x": 1, "y": "anything"})).is_ok());
    }
}
