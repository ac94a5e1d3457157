//! Route definitions for the `/settings` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::settings;
use crate::state::AppState;

/// Routes mounted at `/settings`.
///
/// ```text
/// GET    /          -> index (?group)
/// GET    /{key}     -> show
/// PUT    /{key}     -> update
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(settings::index))
        .route("/{key}", get(settings::show).put(settings::update))
}
