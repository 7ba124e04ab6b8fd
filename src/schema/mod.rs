//! Schema validation for game session writes
//!
//! Schemas are declarative and enforced at write time, before anything
//! reaches the record store.
//!
//! # Design Principles
//!
//! - Mandatory on all writes
//! - Defaults fill absent fields, recursively through embedded objects
//! - No coercion between primitive types
//! - Every violation is reported, not only the first
//! - Deterministic validation

mod errors;
mod game;
mod types;
mod validator;

pub use errors::{SchemaError, SchemaErrorCode, SchemaResult, Severity, ValidationDetails};
pub use game::{game_session_schema, validate_session, GAME_SCHEMA_ID, GAME_SCHEMA_VERSION};
pub use types::{FieldDef, FieldType, Schema};
pub use validator::SchemaValidator;
