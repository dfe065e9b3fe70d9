use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::sessions;
use crate::state::AppState;

/// Routes mounted at `/sessions`.
///
/// ```text
/// POST   /                                         -> create_session
/// GET    /{id}                                     -> get_session
/// DELETE /{id}                                     -> delete_session
/// PUT    /{id}/slots/{slot}                        -> put_slot (multipart)
/// DELETE /{id}/slots/{slot}                        -> clear_slot
/// GET    /{id}/slots/{slot}/preview                -> preview_slot
/// PUT    /{id}/garments                            -> update_garments
/// POST   /{id}/generate                            -> start_generation
/// POST   /{id}/reset                               -> reset_session
/// GET    /{id}/results/{index}/download            -> download_result
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(sessions::create_session))
        .route(
            "/{id}",
            get(sessions::get_session).delete(sessions::delete_session),
        )
        .route(
            "/{id}/slots/{slot}",
            put(sessions::put_slot).delete(sessions::clear_slot),
        )
        .route("/{id}/slots/{slot}/preview", get(sessions::preview_slot))
        .route("/{id}/garments", put(sessions::update_garments))
        .route("/{id}/generate", post(sessions::start_generation))
        .route("/{id}/reset", post(sessions::reset_session))
        .route(
            "/{id}/results/{index}/download",
            get(sessions::download_result),
        )
}
