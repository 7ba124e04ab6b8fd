//! Lifecycle events
//!
//! Events are explicit and typed. Each one is emitted through `tracing` with a
//! stable name in the `event` field so log pipelines can match on it.

use std::fmt;

/// Observable lifecycle events of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Boot & Lifecycle
    /// Startup begins
    BootStart,
    /// Listener bound, ready to serve
    Serving,
    /// Shutdown signal received
    ShutdownStart,
    /// Listener drained and store closed
    ShutdownComplete,

    // Configuration
    /// Configuration resolved and validated
    ConfigLoaded,

    // Store connection
    /// Connection attempt begins
    StoreConnecting,
    /// Backend opened and serving operations
    StoreConnected,
    /// Backend lost after an I/O failure
    StoreDisconnected,
    /// Connection attempt failed, next attempt scheduled
    StoreRetrying,
    /// Backend reported corrupted data
    StoreCorruption,
    /// Handle closed
    StoreClosed,

    // Collection operations
    /// Session accepted and stored
    SessionSaved,
    /// Session rejected by validation
    SessionRejected,
    /// Collection cleared
    CollectionCleared,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::BootStart => "GAMEDATA_STARTUP_BEGIN",
            Event::Serving => "GAMEDATA_SERVING",
            Event::ShutdownStart => "SHUTDOWN_START",
            Event::ShutdownComplete => "SHUTDOWN_COMPLETE",

            Event::ConfigLoaded => "CONFIG_LOADED",

            Event::StoreConnecting => "STORE_CONNECTING",
            Event::StoreConnected => "STORE_CONNECTED",
            Event::StoreDisconnected => "STORE_DISCONNECTED",
            Event::StoreRetrying => "STORE_RETRYING",
            Event::StoreCorruption => "STORE_CORRUPTION",
            Event::StoreClosed => "STORE_CLOSED",

            Event::SessionSaved => "SESSION_SAVED",
            Event::SessionRejected => "SESSION_REJECTED",
            Event::CollectionCleared => "COLLECTION_CLEARED",
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
