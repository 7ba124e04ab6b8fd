//! Schema type definitions
//!
//! Supported types:
//! - string: UTF-8 string
//! - number: any JSON number (stored as 64-bit float)
//! - bool: Boolean
//! - object: Embedded object with its own field schema
//! - map: Open string-keyed map of arbitrary values

use serde_json::{Map, Value};

/// Supported field types
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    /// UTF-8 string
    String,
    /// JSON number, integer or float
    Number,
    /// Boolean
    Bool,
    /// Embedded object with its own field schema
    Object {
        /// Nested field definitions
        fields: Vec<FieldDef>,
    },
    /// Dynamically-keyed map; values are not inspected
    Map,
}

impl FieldType {
    /// Returns the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Bool => "bool",
            FieldType::Object { .. } => "object",
            FieldType::Map => "object",
        }
    }

    /// Returns whether a JSON value has this field's primitive type.
    ///
    /// No coercion is performed: `"5"` is not a number and `1` is not a bool.
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            FieldType::String => value.is_string(),
            FieldType::Number => value.is_number(),
            FieldType::Bool => value.is_boolean(),
            FieldType::Object { .. } | FieldType::Map => value.is_object(),
        }
    }
}

/// Field definition
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    /// Canonical field name, as written on output
    pub name: String,
    /// Field data type
    pub field_type: FieldType,
    /// Whether field must carry a value at persistence time
    pub required: bool,
    /// Value applied when the field is absent (objects derive theirs from
    /// their nested fields)
    pub default: Option<Value>,
    /// Alternate input names accepted for this field
    pub aliases: Vec<String>,
}

impl FieldDef {
    fn new(name: impl Into<String>, field_type: FieldType, default: Option<Value>) -> Self {
        Self {
            name: name.into(),
            field_type,
            required: true,
            default,
            aliases: Vec::new(),
        }
    }

    /// Create a required string field with a default
    pub fn required_string(name: impl Into<String>, default: &str) -> Self {
        Self::new(name, FieldType::String, Some(Value::from(default)))
    }

    /// Create a required number field with a default
    pub fn required_number(name: impl Into<String>, default: f64) -> Self {
        Self::new(name, FieldType::Number, Some(number_value(default)))
    }

    /// Create a required bool field with a default
    pub fn required_bool(name: impl Into<String>, default: bool) -> Self {
        Self::new(name, FieldType::Bool, Some(Value::Bool(default)))
    }

    /// Create a required embedded object field
    pub fn required_object(name: impl Into<String>, fields: Vec<FieldDef>) -> Self {
        Self::new(name, FieldType::Object { fields }, None)
    }

    /// Create a required open map field, empty by default
    pub fn required_map(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Map, Some(Value::Object(Map::new())))
    }

    /// Accept an additional input name for this field
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Returns the value used when the field is absent.
    ///
    /// Object fields without an explicit default are built from the
    /// defaults of their nested fields.
    pub fn default_value(&self) -> Option<Value> {
        if let Some(default) = &self.default {
            return Some(default.clone());
        }
        match &self.field_type {
            FieldType::Object { fields } => {
                let mut obj = Map::new();
                for field in fields {
                    if let Some(value) = field.default_value() {
                        obj.insert(field.name.clone(), value);
                    }
                }
                Some(Value::Object(obj))
            }
            _ => None,
        }
    }

    /// Returns every name this field may appear under, canonical first.
    pub fn input_names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }
}

/// Integral defaults are written as JSON integers.
fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        Value::from(n as i64)
    } else {
        Value::from(n)
    }
}

/// Complete schema definition
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    /// Unique schema identifier
    pub schema_id: String,
    /// Schema version
    pub schema_version: String,
    /// Field definitions, in output order
    pub fields: Vec<FieldDef>,
}

impl Schema {
    /// Create a new schema
    pub fn new(
        schema_id: impl Into<String>,
        schema_version: impl Into<String>,
        fields: Vec<FieldDef>,
    ) -> Self {
        Self {
            schema_id: schema_id.into(),
            schema_version: schema_version.into(),
            fields,
        }
    }

    /// Looks up a top-level field by canonical name
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Validates the schema structure itself (not a document).
    ///
    /// Input names must be unique within each object, and every required
    /// field must be able to produce a default.
    pub fn validate_structure(&self) -> Result<(), String> {
        check_fields(&self.fields, "")
    }
}

fn check_fields(fields: &[FieldDef], prefix: &str) -> Result<(), String> {
    let mut seen = std::collections::HashSet::new();
    for field in fields {
        for name in field.input_names() {
            if !seen.insert(name) {
                return Err(format!("duplicate field name '{}{}'", prefix, name));
            }
        }
        if field.required && field.default_value().is_none() {
            return Err(format!("required field '{}{}' has no default", prefix, field.name));
        }
        if let FieldType::Object { fields } = &field.field_type {
            check_fields(fields, &format!("{}{}.", prefix, field.name))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_accepts_exact_primitive_types() {
        assert!(FieldType::Number.accepts(&json!(3)));
        assert!(FieldType::Number.accepts(&json!(3.5)));
        assert!(!FieldType::Number.accepts(&json!("3")));
        assert!(!FieldType::Bool.accepts(&json!(1)));
        assert!(FieldType::Map.accepts(&json!({})));
        assert!(!FieldType::Map.accepts(&json!([])));
    }

    #[test]
    fn test_object_default_built_from_nested_fields() {
        let field = FieldDef::required_object(
            "bucket",
            vec![
                FieldDef::required_number("total", 0.0),
                FieldDef::required_map("options"),
            ],
        );
        assert_eq!(
            field.default_value(),
            Some(json!({"total": 0, "options": {}}))
        );
    }

    #[test]
    fn test_duplicate_alias_rejected() {
        let schema = Schema::new(
            "s",
            "v1",
            vec![
                FieldDef::required_string("userId", "u").with_alias("user_id"),
                FieldDef::required_string("user_id", "u"),
            ],
        );
        assert!(schema.validate_structure().is_err());
    }

    #[test]
    fn test_input_names_lists_canonical_first() {
        let field = FieldDef::required_bool("isPostShock", false).with_alias("is_post_shock");
        let names: Vec<_> = field.input_names().collect();
        assert_eq!(names, vec!["isPostShock", "is_post_shock"]);
    }
}
