//! Schema validator for candidate documents
//!
//! Validation semantics:
//! - Missing required fields receive their declared default
//! - Embedded objects are validated recursively, each nested field
//!   defaulted independently
//! - Present fields must match their declared primitive type exactly
//! - Null on a required field is a violation, not a request for the default
//! - Undeclared fields are dropped
//! - Every violation is collected; validation never stops at the first one
//!
//! The validator does not mutate its input; it builds a normalized copy.

use serde_json::{Map, Value};

use super::errors::{SchemaError, SchemaResult, ValidationDetails};
use super::types::{FieldDef, FieldType, Schema};

/// Path used for violations on the document itself.
const ROOT_PATH: &str = "$root";

/// Schema validator that normalizes documents against a schema.
pub struct SchemaValidator<'a> {
    schema: &'a Schema,
}

impl<'a> SchemaValidator<'a> {
    /// Creates a new validator for the given schema.
    pub fn new(schema: &'a Schema) -> Self {
        Self { schema }
    }

    /// Validates a candidate document and returns its normalized form.
    ///
    /// The normalized document contains exactly the declared fields, under
    /// their canonical names, with defaults applied.
    ///
    /// # Errors
    ///
    /// Returns `SCHEMA_VALIDATION_FAILED` listing every offending field.
    pub fn normalize(&self, document: &Value) -> SchemaResult<Value> {
        let obj = match document.as_object() {
            Some(obj) => obj,
            None => {
                return Err(SchemaError::validation_failed(
                    &self.schema.schema_id,
                    vec![ValidationDetails::type_mismatch(
                        ROOT_PATH,
                        "object",
                        json_type_name(document),
                    )],
                ))
            }
        };

        let mut violations = Vec::new();
        let normalized = normalize_object(obj, &self.schema.fields, "", &mut violations);

        if violations.is_empty() {
            Ok(Value::Object(normalized))
        } else {
            Err(SchemaError::validation_failed(&self.schema.schema_id, violations))
        }
    }
}

/// Builds the normalized object for `fields`, recording violations.
fn normalize_object(
    obj: &Map<String, Value>,
    fields: &[FieldDef],
    path_prefix: &str,
    violations: &mut Vec<ValidationDetails>,
) -> Map<String, Value> {
    let mut out = Map::new();

    for field in fields {
        let field_path = make_path(path_prefix, &field.name);
        let present = field.input_names().find_map(|name| obj.get(name));

        let value = match present {
            Some(Value::Null) if field.required => {
                violations.push(ValidationDetails::null_value(&field_path));
                continue;
            }
            Some(Value::Null) | None => match field.default_value() {
                Some(default) => default,
                None => continue,
            },
            Some(value) => match normalize_value(value, field, &field_path, violations) {
                Some(value) => value,
                None => continue,
            },
        };

        out.insert(field.name.clone(), value);
    }

    out
}

/// Checks a present value against its field definition.
fn normalize_value(
    value: &Value,
    field: &FieldDef,
    field_path: &str,
    violations: &mut Vec<ValidationDetails>,
) -> Option<Value> {
    if !field.field_type.accepts(value) {
        violations.push(ValidationDetails::type_mismatch(
            field_path,
            field.field_type.type_name(),
            json_type_name(value),
        ));
        return None;
    }

    match (&field.field_type, value) {
        (FieldType::Object { fields }, Value::Object(obj)) => Some(Value::Object(
            normalize_object(obj, fields, field_path, violations),
        )),
        _ => Some(value.clone()),
    }
}

/// Returns the JSON type name for error messages.
fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Creates a field path from prefix and field name.
fn make_path(prefix: &str, field: &str) -> String {
    if prefix.is_empty() {
        field.to_string()
    } else {
        format!("{}.{}", prefix, field)
    }
}
