use axum::routing::post;
use axum::Router;

use crate::handlers::try_on;
use crate::state::AppState;

/// Routes mounted at `/try-on`.
///
/// ```text
/// POST   /                                         -> create_try_on
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", post(try_on::create_try_on))
}
