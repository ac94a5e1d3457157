//! Request handlers, one submodule per resource.
//!
//! Every admin handler authenticates through [`AuthUser`], authorizes with
//! the entity's policy, delegates to the matching repository in
//! `erasmus_db` and records model changes through
//! [`ActivityLogger`](crate::activity::ActivityLogger). Errors map to HTTP
//! responses via [`AppError`].
//!
//! [`AuthUser`]: crate::middleware::auth::AuthUser

pub mod academic_years;
pub mod activity;
pub mod auth;
pub mod call_applications;
pub mod call_phases;
pub mod calls;
pub mod document_categories;
pub mod documents;
pub mod events;
pub mod news_posts;
pub mod newsletter;
pub mod programs;
pub mod resolutions;
pub mod settings;
pub mod translations;
pub mod trash;
pub mod users;

use erasmus_core::error::CoreError;
use erasmus_core::slug::slugify;
use erasmus_core::types::DbId;
use erasmus_db::repositories::TrashRepo;
use sqlx::PgPool;

use crate::error::{AppError, AppResult};

/// Slug base from an explicit slug, or from `fallback` (title or name).
pub(crate) fn slug_base(requested: Option<&str>, fallback: &str) -> AppResult<String> {
    let source = requested
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(fallback);
    let slug = slugify(source);
    if slug.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "slug must contain at least one letter or digit".into(),
        )));
    }
    Ok(slug)
}

/// Refuse to restore a record whose parent is still in the trash.
pub(crate) async fn ensure_parent_not_trashed(
    pool: &PgPool,
    entity_type: &str,
    id: DbId,
) -> AppResult<()> {
    match TrashRepo::check_parent_trashed(pool, entity_type, id).await? {
        Some(message) => Err(AppError::Core(CoreError::Conflict(message))),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn slug_prefers_explicit_value() {
        assert_eq!(slug_base(Some("Mi Slug"), "Título").unwrap(), "mi-slug");
        assert_eq!(slug_base(Some("  "), "Título largo").unwrap(), "titulo-largo");
        assert_eq!(slug_base(None, "KA121 FP").unwrap(), "ka121-fp");
    }

    #[test]
    fn symbol_only_slug_is_rejected() {
        assert_matches!(
            slug_base(None, "¡¿?!"),
            Err(AppError::Core(CoreError::Validation(_)))
        );
    }
}
