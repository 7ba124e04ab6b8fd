//! # Game Data HTTP Server Module
//!
//! Axum server exposing the game session collection.
//!
//! # Endpoints
//!
//! - `/health` - Health check with store state
//! - `POST /api/save-game-data` - Validate and store one session
//! - `GET /api/get-game-data` - All sessions, insertion order
//! - `GET /api/fetch-game-data` - All sessions, sorted by stage then phase
//! - `DELETE|POST /api/clear-game-data` - Remove every session

pub mod config;
pub mod errors;
pub mod game_routes;
pub mod health_routes;
pub mod server;

pub use config::{HttpServerConfig, MAX_BODY_BYTES};
pub use errors::{ApiError, ApiResult, StoreOperation};
pub use game_routes::GameDataState;
pub use server::{shutdown_signal, HttpServer};
