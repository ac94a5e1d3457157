pub mod academic_years;
pub mod activity;
pub mod auth;
pub mod calls;
pub mod document_categories;
pub mod documents;
pub mod events;
pub mod health;
pub mod news_posts;
pub mod newsletter;
pub mod programs;
pub mod resolutions;
pub mod settings;
pub mod translations;
pub mod trash;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login, /auth/refresh                       public
/// /auth/logout, /auth/me                           authenticated
///
/// /public/newsletter/subscribe                     public subscription
/// /public/newsletter/verify/{token}                confirm address
/// /public/newsletter/unsubscribe/{token}           opt out
///
/// /users                                           CRUD, restore, force
/// /programs                                        CRUD, restore, force
/// /academic-years                                  CRUD, set-current, restore, force
/// /calls                                           CRUD, publish, unpublish, status, export
/// /calls/{id}/phases                               CRUD, mark-current, restore, force
/// /calls/{id}/applications                         CRUD, status, restore, force
/// /resolutions                                     CRUD, publish, unpublish, export
/// /news-posts                                      CRUD, publish, unpublish, export
/// /document-categories                             CRUD, restore, force
/// /documents                                       CRUD, download, export
/// /events                                          CRUD, restore, force
/// /newsletter/subscriptions                        index, show, delete, export
/// /settings, /settings/{key}                       list, show, update
/// /translations                                    CRUD, upsert, per-record lookup
/// /activity-log                                    index, show, export, per-subject
/// /trash                                           list, summary, restore (admin)
/// ```
///
/// Every route outside `/auth/login`, `/auth/refresh` and `/public` needs a
/// Bearer token; handlers authorize against the entity policy.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/public/newsletter", newsletter::public_router())
        .nest("/users", users::router())
        .nest("/programs", programs::router())
        .nest("/academic-years", academic_years::router())
        .nest("/calls", calls::router())
        .nest("/resolutions", resolutions::router())
        .nest("/news-posts", news_posts::router())
        .nest("/document-categories", document_categories::router())
        .nest("/documents", documents::router())
        .nest("/events", events::router())
        .nest("/newsletter/subscriptions", newsletter::admin_router())
        .nest("/settings", settings::router())
        .nest("/translations", translations::router())
        .nest("/activity-log", activity::router())
        .nest("/trash", trash::router())
}
