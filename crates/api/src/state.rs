use std::sync::Arc;

use rollcall_db::store::StudentStore;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Student record store (PostgreSQL in production).
    pub store: Arc<dyn StudentStore>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
}
