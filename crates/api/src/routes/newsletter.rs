//! Route definitions for newsletter subscriptions.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::newsletter;
use crate::state::AppState;

/// Admin routes mounted at `/newsletter/subscriptions`.
///
/// ```text
/// GET    /          -> index
/// GET    /export    -> export (CSV)
/// GET    /{id}      -> show
/// DELETE /{id}      -> destroy
/// ```
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", get(newsletter::index))
        .route("/export", get(newsletter::export))
        .route("/{id}", get(newsletter::show).delete(newsletter::destroy))
}

/// Unauthenticated routes mounted at `/public/newsletter`.
///
/// ```text
/// POST   /subscribe              -> subscribe
/// GET    /verify/{token}         -> verify
/// GET    /unsubscribe/{token}    -> unsubscribe
/// ```
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/subscribe", post(newsletter::subscribe))
        .route("/verify/{token}", get(newsletter::verify))
        .route("/unsubscribe/{token}", get(newsletter::unsubscribe))
}
