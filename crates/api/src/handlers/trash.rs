//! Handlers for the `/trash` resource.
//!
//! A single view over every soft-deletable entity type: listing trashed
//! rows, per-type counts, and restoring a row by `(entity_type, id)`.

use axum::extract::{Path, Query, State};
use axum::Json;
use erasmus_core::audit::Auditable;
use erasmus_core::types::DbId;
use erasmus_db::repositories::trash_repo::{is_known_entity_type, TrashList, TrashSummary};
use erasmus_db::repositories::{
    AcademicYearRepo, CallApplicationRepo, CallPhaseRepo, CallRepo, DocumentCategoryRepo,
    DocumentRepo, ErasmusEventRepo, NewsPostRepo, ProgramRepo, ResolutionRepo, TrashRepo,
    UserRepo,
};
use serde::{Deserialize, Serialize};
use sqlx::PgConnection;

use super::ensure_parent_not_trashed;
use crate::activity::ActivityLogger;
use crate::error::{AppError, AppResult};
use crate::middleware::context::RequestContext;
use crate::middleware::rbac::RequireAdmin;
use crate::state::AppState;

/// Query parameters for the trash listing endpoint.
#[derive(Debug, Deserialize)]
pub struct TrashQuery {
    /// Optional entity type filter (e.g. "calls", "news_posts").
    #[serde(rename = "type")]
    pub entity_type: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RestoredItem {
    pub restored: bool,
    pub entity_type: String,
    pub id: DbId,
}

/// GET /api/v1/trash
///
/// Every soft-deleted row, newest first, optionally limited to one type.
pub async fn list_trashed(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(params): Query<TrashQuery>,
) -> AppResult<Json<TrashList>> {
    if let Some(ref et) = params.entity_type {
        validate_entity_type(et)?;
    }
    let list = TrashRepo::list_trashed(&state.pool, params.entity_type.as_deref()).await?;
    Ok(Json(list))
}

/// GET /api/v1/trash/summary
pub async fn summary(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<TrashSummary>> {
    let summary = TrashRepo::summary(&state.pool).await?;
    Ok(Json(summary))
}

/// POST /api/v1/trash/{entity_type}/{id}/restore
///
/// 409 while a parent is still trashed, 404 when the row is not in the trash.
pub async fn restore(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    RequestContext(ctx): RequestContext,
    Path((entity_type, id)): Path<(String, DbId)>,
) -> AppResult<Json<RestoredItem>> {
    validate_entity_type(&entity_type)?;
    ensure_parent_not_trashed(&state.pool, &entity_type, id).await?;

    let logger = ActivityLogger::new(Some(admin.user_id), &ctx);
    let mut tx = state.pool.begin().await?;
    if !dispatch_restore(&mut tx, &logger, &entity_type, id).await? {
        return Err(AppError::not_found("TrashedItem", id));
    }
    tx.commit().await?;

    tracing::info!(entity_type = %entity_type, id, user_id = admin.user_id, "Restored from trash");
    Ok(Json(RestoredItem {
        restored: true,
        entity_type,
        id,
    }))
}

// ------ Private helpers ------

fn validate_entity_type(entity_type: &str) -> AppResult<()> {
    if is_known_entity_type(entity_type) {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!(
            "Unknown entity type: {entity_type}"
        )))
    }
}

async fn log_restored<T: Auditable>(
    conn: &mut PgConnection,
    logger: &ActivityLogger<'_>,
    model: Option<T>,
) -> Result<(), sqlx::Error> {
    if let Some(model) = model {
        logger.restored(conn, &model).await?;
    }
    Ok(())
}

/// Restore through the entity's repository and record the restore.
///
/// `false` when the row was not trashed (already live or missing).
async fn dispatch_restore(
    conn: &mut PgConnection,
    logger: &ActivityLogger<'_>,
    entity_type: &str,
    id: DbId,
) -> Result<bool, sqlx::Error> {
    macro_rules! restore_via {
        ($repo:ident, $find:ident) => {{
            if !$repo::restore(&mut *conn, id).await? {
                return Ok(false);
            }
            let model = $repo::$find(&mut *conn, id).await?;
            log_restored(&mut *conn, logger, model).await?;
        }};
    }

    match entity_type {
        "programs" => restore_via!(ProgramRepo, find_by_id),
        "academic_years" => restore_via!(AcademicYearRepo, find_by_id),
        "calls" => restore_via!(CallRepo, find_by_id),
        "call_phases" => restore_via!(CallPhaseRepo, find_any),
        "call_applications" => restore_via!(CallApplicationRepo, find_any),
        "resolutions" => restore_via!(ResolutionRepo, find_by_id),
        "news_posts" => restore_via!(NewsPostRepo, find_by_id),
        "document_categories" => restore_via!(DocumentCategoryRepo, find_by_id),
        "documents" => restore_via!(DocumentRepo, find_by_id),
        "erasmus_events" => restore_via!(ErasmusEventRepo, find_by_id),
        "users" => restore_via!(UserRepo, find_by_id),
        _ => return Ok(false),
    }
    Ok(true)
}
