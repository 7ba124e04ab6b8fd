//! Observability subsystem
//!
//! - Structured logging through `tracing`
//! - Typed lifecycle events
//!
//! # Usage
//!
//! ```ignore
//! use gamedata::observability::{init_logging, Event};
//!
//! init_logging("info");
//! tracing::info!(event = %Event::BootStart, "starting");
//! ```

mod events;
mod logger;

pub use events::Event;
pub use logger::{build_filter, init_logging, DEFAULT_LOG_FILTER};
