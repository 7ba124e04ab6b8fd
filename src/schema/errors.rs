//! Schema error types
//!
//! Error codes:
//! - SCHEMA_VALIDATION_FAILED (REJECT)
//! - SCHEMA_MALFORMED_DOCUMENT (INTERNAL)

use std::fmt;

/// Severity levels for schema errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Client request rejected
    Reject,
    /// A validated document could not be materialized; a server-side bug
    Internal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
            Severity::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// Schema-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaErrorCode {
    /// Document violates schema
    SchemaValidationFailed,
    /// Normalized document does not fit the typed model
    SchemaMalformedDocument,
}

impl SchemaErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            SchemaErrorCode::SchemaValidationFailed => "SCHEMA_VALIDATION_FAILED",
            SchemaErrorCode::SchemaMalformedDocument => "SCHEMA_MALFORMED_DOCUMENT",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            SchemaErrorCode::SchemaValidationFailed => Severity::Reject,
            SchemaErrorCode::SchemaMalformedDocument => Severity::Internal,
        }
    }
}

impl fmt::Display for SchemaErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// One offending field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationDetails {
    /// Field path (e.g., "allocatedOptions.savings.total")
    pub field: String,
    /// Expected type or condition
    pub expected: String,
    /// Actual value or type found
    pub actual: String,
}

impl ValidationDetails {
    pub fn new(field: impl Into<String>, expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn type_mismatch(field: impl Into<String>, expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::new(field, expected, actual)
    }

    pub fn null_value(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            expected: "a value (field is required)".into(),
            actual: "null".into(),
        }
    }
}

impl fmt::Display for ValidationDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "field '{}': expected {}, got {}", self.field, self.expected, self.actual)
    }
}

/// Schema error type with full context
#[derive(Debug)]
pub struct SchemaError {
    /// Error code
    code: SchemaErrorCode,
    /// Human-readable message
    message: String,
    /// Schema ID
    schema_id: String,
    /// Every offending field, in document order
    details: Vec<ValidationDetails>,
}

impl SchemaError {
    /// Create a validation failed error listing every offending field
    pub fn validation_failed(schema_id: impl Into<String>, details: Vec<ValidationDetails>) -> Self {
        let fields: Vec<&str> = details.iter().map(|d| d.field.as_str()).collect();
        Self {
            code: SchemaErrorCode::SchemaValidationFailed,
            message: format!("Document validation failed for: {}", fields.join(", ")),
            schema_id: schema_id.into(),
            details,
        }
    }

    /// Create an error for a normalized document that does not fit the model
    pub fn malformed_document(schema_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            code: SchemaErrorCode::SchemaMalformedDocument,
            message: format!("Normalized document rejected by model: {}", reason.into()),
            schema_id: schema_id.into(),
            details: Vec::new(),
        }
    }

    /// Returns the error code
    pub fn code(&self) -> SchemaErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the schema ID
    pub fn schema_id(&self) -> &str {
        &self.schema_id
    }

    /// Returns validation details
    pub fn details(&self) -> &[ValidationDetails] {
        &self.details
    }

    /// Returns one human-readable line per offending field
    pub fn detail_messages(&self) -> Vec<String> {
        self.details.iter().map(ToString::to_string).collect()
    }

    /// Returns whether the client is at fault
    pub fn is_rejection(&self) -> bool {
        self.severity() == Severity::Reject
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code.severity(), self.code.code(), self.message)
    }
}

impl std::error::Error for SchemaError {}

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;
