//! gamedata - game session record service
//!
//! Validates game session submissions against a fixed schema, stores them
//! in a checksummed append-only collection and serves them over HTTP.

pub mod cli;
pub mod http_server;
pub mod observability;
pub mod schema;
pub mod session;
pub mod storage;
