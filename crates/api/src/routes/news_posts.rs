//! Route definitions for the `/news-posts` resource.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::news_posts;
use crate::state::AppState;

/// Routes mounted at `/news-posts`.
///
/// ```text
/// GET    /                  -> index
/// POST   /                  -> create
/// GET    /export            -> export (CSV)
/// GET    /{id}              -> show
/// PUT    /{id}              -> update
/// DELETE /{id}              -> destroy
/// POST   /{id}/publish      -> publish
/// POST   /{id}/unpublish    -> unpublish
/// POST   /{id}/restore      -> restore
/// DELETE /{id}/force        -> force_delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(news_posts::index).post(news_posts::create))
        .route("/export", get(news_posts::export))
        .route(
            "/{id}",
            get(news_posts::show)
                .put(news_posts::update)
                .delete(news_posts::destroy),
        )
        .route("/{id}/publish", post(news_posts::publish))
        .route("/{id}/unpublish", post(news_posts::unpublish))
        .route("/{id}/restore", post(news_posts::restore))
        .route("/{id}/force", delete(news_posts::force_delete))
}
