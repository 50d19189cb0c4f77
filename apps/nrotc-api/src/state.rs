//! Application state management.
//!
//! Shared state handed to the shell's own handlers (readiness). Domain
//! routers get their repositories at construction time instead.

use mongodb::{Client, Database};

/// Shared application state.
///
/// Cloning is cheap: the MongoDB client and database are handles onto one
/// connection pool.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration loaded from environment variables
    pub config: crate::config::Config,
    pub mongo_client: Client,
    pub db: Database,
}
