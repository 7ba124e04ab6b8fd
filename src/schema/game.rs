//! The game session schema
//!
//! Declares every `GameSession` field with its type, default and the
//! snake_case input name older clients still send.

use std::sync::OnceLock;

use serde_json::Value;

use super::errors::{SchemaError, SchemaResult};
use super::types::{FieldDef, Schema};
use super::validator::SchemaValidator;
use crate::session::{
    GameSession, ALLOCATION_BUCKETS, DEFAULT_DATE, DEFAULT_SPECIFIC_OPTION, DEFAULT_STAGE_NAME,
    DEFAULT_TIME, DEFAULT_USER_ID,
};

pub const GAME_SCHEMA_ID: &str = "games";
pub const GAME_SCHEMA_VERSION: &str = "v1";

fn allocation_bucket(name: &str) -> FieldDef {
    FieldDef::required_object(
        name,
        vec![
            FieldDef::required_number("total", 0.0),
            FieldDef::required_map("options"),
        ],
    )
}

fn build_schema() -> Schema {
    let buckets = ALLOCATION_BUCKETS.iter().map(|name| allocation_bucket(name)).collect();

    Schema::new(
        GAME_SCHEMA_ID,
        GAME_SCHEMA_VERSION,
        vec![
            FieldDef::required_string("stageName", DEFAULT_STAGE_NAME).with_alias("stage_name"),
            FieldDef::required_string("date", DEFAULT_DATE),
            FieldDef::required_string("time", DEFAULT_TIME),
            FieldDef::required_string("userId", DEFAULT_USER_ID).with_alias("user_id"),
            FieldDef::required_number("totalAmount", 0.0).with_alias("total_amount"),
            FieldDef::required_number("shockAmount", 0.0).with_alias("shock_amount"),
            FieldDef::required_number("totalEarning", 0.0).with_alias("total_earning"),
            FieldDef::required_number("speedBonus", 0.0).with_alias("speed_bonus"),
            FieldDef::required_number("preShockEarnings", 0.0).with_alias("pre_shock_earnings"),
            FieldDef::required_string("specificOption", DEFAULT_SPECIFIC_OPTION)
                .with_alias("specific_option"),
            FieldDef::required_bool("isPostShock", false).with_alias("is_post_shock"),
            FieldDef::required_object("allocatedOptions", buckets)
                .with_alias("amount_allocated_options"),
        ],
    )
}

/// Returns the process-wide game session schema.
pub fn game_session_schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(build_schema)
}

/// Validates a candidate payload and materializes it as a `GameSession`.
///
/// # Errors
///
/// - `SCHEMA_VALIDATION_FAILED` with every offending field
/// - `SCHEMA_MALFORMED_DOCUMENT` if the normalized document does not fit the
///   model (a schema/model mismatch, never caused by the client)
pub fn validate_session(candidate: &Value) -> SchemaResult<GameSession> {
    let schema = game_session_schema();
    let normalized = SchemaValidator::new(schema).normalize(candidate)?;

    serde_json::from_value(normalized)
        .map_err(|e| SchemaError::malformed_document(&schema.schema_id, e.to_string()))
}
