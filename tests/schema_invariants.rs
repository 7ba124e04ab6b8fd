//! Schema Invariant Tests
//!
//! Game session validation:
//! - Validation is deterministic
//! - Absent fields take their defaults
//! - Type matching is exact, no coercion
//! - Every violation is reported

use gamedata::schema::{game_session_schema, validate_session, SchemaErrorCode, GAME_SCHEMA_ID};
use gamedata::session::{GameSession, ALLOCATION_BUCKETS};
use serde_json::json;

// =============================================================================
// Determinism
// =============================================================================

/// Same document validates the same way every time.
#[test]
fn test_validation_is_deterministic() {
    let doc = json!({ "stageName": "stage1", "totalAmount": 12.5 });
    let first = validate_session(&doc).unwrap();

    for _ in 0..100 {
        assert_eq!(validate_session(&doc).unwrap(), first);
    }
}

/// Invalid document fails consistently, with the same details.
#[test]
fn test_invalid_document_fails_consistently() {
    let doc = json!({ "isPostShock": "yes" });
    let first = validate_session(&doc).unwrap_err().detail_messages();

    for _ in 0..100 {
        assert_eq!(validate_session(&doc).unwrap_err().detail_messages(), first);
    }
}

// =============================================================================
// Defaults
// =============================================================================

#[test]
fn test_empty_document_equals_default_session() {
    assert_eq!(validate_session(&json!({})).unwrap(), GameSession::default());
}

#[test]
fn test_explicit_null_on_required_field_rejected() {
    let err = validate_session(&json!({ "stageName": null })).unwrap_err();
    assert_eq!(err.code(), SchemaErrorCode::SchemaValidationFailed);
    assert!(err.detail_messages()[0].contains("stageName"));
}

#[test]
fn test_partial_bucket_completed_with_defaults() {
    let session = validate_session(&json!({
        "allocatedOptions": { "transport": { "options": { "bus": 20 } } }
    }))
    .unwrap();

    assert_eq!(session.allocated_options.transport.total.as_f64(), Some(0.0));
    assert_eq!(session.allocated_options.transport.options["bus"], 20);
    assert!(session.allocated_options.savings.options.is_empty());
}

// =============================================================================
// Exact Types
// =============================================================================

#[test]
fn test_no_coercion_between_primitives() {
    for doc in [
        json!({ "totalAmount": "100" }),
        json!({ "stageName": 1 }),
        json!({ "isPostShock": 0 }),
        json!({ "allocatedOptions": { "essentials": { "options": [] } } }),
    ] {
        let err = validate_session(&doc).unwrap_err();
        assert_eq!(err.code(), SchemaErrorCode::SchemaValidationFailed, "{}", doc);
    }
}

#[test]
fn test_all_violations_reported() {
    let err = validate_session(&json!({
        "stageName": false,
        "date": 20240501,
        "speedBonus": "fast",
        "allocatedOptions": { "lifestyle": { "total": "none" } }
    }))
    .unwrap_err();

    assert_eq!(err.schema_id(), GAME_SCHEMA_ID);
    let fields: Vec<&str> = err.details().iter().map(|d| d.field.as_str()).collect();
    assert_eq!(
        fields,
        vec![
            "stageName",
            "date",
            "speedBonus",
            "allocatedOptions.lifestyle.total"
        ]
    );
}

// =============================================================================
// Schema Shape
// =============================================================================

#[test]
fn test_schema_declares_every_bucket() {
    let schema = game_session_schema();
    assert!(schema.validate_structure().is_ok());

    let allocated = schema.field("allocatedOptions").unwrap();
    let default = allocated.default_value().unwrap();
    for bucket in ALLOCATION_BUCKETS {
        assert!(default.get(bucket).is_some(), "missing bucket {}", bucket);
    }
}
