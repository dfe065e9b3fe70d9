use std::sync::Arc;

use tryon_core::dispatch::ImageGenerator;

use crate::config::ServerConfig;
use crate::sessions::SessionStore;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration (upload limits, spool directory).
    pub config: Arc<ServerConfig>,
    /// Image generation backend (Gemini in production, fakes in tests).
    pub generator: Arc<dyn ImageGenerator>,
    /// Live try-on sessions.
    pub sessions: Arc<SessionStore>,
}
