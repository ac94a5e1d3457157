//! Route definitions for the `/trash` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::trash;
use crate::state::AppState;

/// Routes mounted at `/trash`.
///
/// ```text
/// GET    /                              -> list_trashed  (?type=entity_type)
/// GET    /summary                       -> summary
/// POST   /{entity_type}/{id}/restore    -> restore
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(trash::list_trashed))
        .route("/summary", get(trash::summary))
        .route("/{entity_type}/{id}/restore", post(trash::restore))
}
