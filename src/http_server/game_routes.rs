//! Game Data HTTP Routes
//!
//! CRUD endpoints over the game session collection, nested under `/api`.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{error, info, warn};

use super::errors::{ApiError, ApiResult, StoreOperation, HIDDEN_INTERNAL_MESSAGE};
use crate::observability::Event;
use crate::schema::validate_session;
use crate::session::StoredSession;
use crate::storage::StoreHandle;

// ==================
// Shared State
// ==================

/// State shared across game data handlers
pub struct GameDataState {
    pub store: Arc<StoreHandle>,
    /// Whether client-facing messages may carry internal error text
    pub expose_errors: bool,
}

impl GameDataState {
    pub fn new(store: Arc<StoreHandle>, expose_errors: bool) -> Self {
        Self {
            store,
            expose_errors,
        }
    }

    /// Hides internal error text unless exposure is enabled.
    fn redact(&self, err: ApiError) -> ApiError {
        if self.expose_errors {
            return err;
        }
        match err {
            ApiError::Internal(_) => ApiError::Internal(HIDDEN_INTERNAL_MESSAGE.to_string()),
            ApiError::MalformedBody(_) => ApiError::MalformedBody(HIDDEN_INTERNAL_MESSAGE.to_string()),
            other => other,
        }
    }
}

// ==================
// Response Types
// ==================

#[derive(Debug, Serialize)]
pub struct SaveResponse {
    pub success: bool,
    pub message: &'static str,
    pub data: StoredSession,
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub success: bool,
    pub data: Vec<StoredSession>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearResponse {
    pub success: bool,
    pub message: &'static str,
    pub deleted_count: u64,
}

// ==================
// Game Data Routes
// ==================

/// Create game data routes
///
/// Every path answers unsupported methods with a JSON 405.
pub fn game_routes(state: Arc<GameDataState>) -> Router {
    Router::new()
        .route(
            "/save-game-data",
            post(save_game_data_handler).fallback(method_not_allowed_handler),
        )
        .route(
            "/get-game-data",
            get(get_game_data_handler).fallback(method_not_allowed_handler),
        )
        .route(
            "/fetch-game-data",
            get(fetch_game_data_handler).fallback(method_not_allowed_handler),
        )
        .route(
            "/clear-game-data",
            delete(clear_game_data_handler)
                .post(clear_game_data_handler)
                .fallback(method_not_allowed_handler),
        )
        .with_state(state)
}

/// Parses the request body; an empty body is an empty document.
fn parse_body(body: &[u8]) -> ApiResult<Value> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Map::new()));
    }
    serde_json::from_slice(body).map_err(|e| ApiError::MalformedBody(e.to_string()))
}

// ==================
// Handlers
// ==================

async fn save_game_data_handler(
    State(state): State<Arc<GameDataState>>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<SaveResponse>)> {
    let candidate = parse_body(&body).map_err(|e| state.redact(e))?;

    let session = validate_session(&candidate).map_err(|e| {
        warn!(
            event = %Event::SessionRejected,
            schema = e.schema_id(),
            error = %e,
            "game data rejected"
        );
        state.redact(ApiError::from(e))
    })?;

    let stored = state.store.insert(session).await.map_err(|e| {
        error!(error = %e, "Error saving game data");
        ApiError::from_storage(StoreOperation::Save, e)
    })?;

    info!(
        event = %Event::SessionSaved,
        id = %stored.id,
        stage = %stored.session.stage_name,
        user = %stored.session.user_id,
        "game data saved"
    );

    Ok((
        StatusCode::CREATED,
        Json(SaveResponse {
            success: true,
            message: "Game data saved successfully",
            data: stored,
        }),
    ))
}

async fn get_game_data_handler(
    State(state): State<Arc<GameDataState>>,
) -> ApiResult<Json<ListResponse>> {
    let data = state.store.find_all().await.map_err(|e| {
        error!(error = %e, "Error retrieving game data");
        ApiError::from_storage(StoreOperation::Retrieve, e)
    })?;

    Ok(Json(ListResponse {
        success: true,
        data,
    }))
}

async fn fetch_game_data_handler(
    State(state): State<Arc<GameDataState>>,
) -> ApiResult<Json<ListResponse>> {
    let data = state.store.find_all_sorted().await.map_err(|e| {
        error!(error = %e, "Error retrieving game data");
        ApiError::from_storage(StoreOperation::Retrieve, e)
    })?;

    Ok(Json(ListResponse {
        success: true,
        data,
    }))
}

async fn clear_game_data_handler(
    State(state): State<Arc<GameDataState>>,
) -> ApiResult<Json<ClearResponse>> {
    let deleted_count = state.store.delete_all().await.map_err(|e| {
        error!(error = %e, "Error clearing game data");
        ApiError::from_storage(StoreOperation::Clear, e)
    })?;

    info!(event = %Event::CollectionCleared, deleted_count, "game data cleared");

    Ok(Json(ClearResponse {
        success: true,
        message: "All game data cleared",
        deleted_count,
    }))
}

async fn method_not_allowed_handler() -> ApiError {
    ApiError::MethodNotAllowed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_body_is_empty_document() {
        assert_eq!(parse_body(b"").unwrap(), Value::Object(Map::new()));
        assert_eq!(parse_body(b" \n\t").unwrap(), Value::Object(Map::new()));
    }

    #[test]
    fn test_malformed_body_rejected() {
        let err = parse_body(b"{\"stageName\": ").unwrap_err();
        assert!(matches!(err, ApiError::MalformedBody(_)));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_clear_response_serialization() {
        let json = serde_json::to_value(ClearResponse {
            success: true,
            message: "All game data cleared",
            deleted_count: 3,
        })
        .unwrap();
        assert_eq!(json["deletedCount"], 3);
        assert_eq!(json["success"], true);
    }
}
