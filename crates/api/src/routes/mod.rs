pub mod health;
pub mod sessions;
pub mod try_on;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /try-on                                          one-shot generation (multipart)
///
/// /sessions                                        create
/// /sessions/{id}                                   get, delete
/// /sessions/{id}/slots/{slot}                      upload, clear
/// /sessions/{id}/slots/{slot}/preview              stored upload
/// /sessions/{id}/garments                          garment mode and kind
/// /sessions/{id}/generate                          start batch
/// /sessions/{id}/reset                             back to idle
/// /sessions/{id}/results/{index}/download          result as attachment
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/try-on", try_on::router())
        .nest("/sessions", sessions::router())
}
