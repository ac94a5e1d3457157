//! Read-only access to the activity log.

use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::Json;
use erasmus_core::listing::{ListOptions, ListParams, Page};
use erasmus_core::policy::{authorize, Ability, ActivityPolicy};
use erasmus_core::types::DbId;
use erasmus_db::models::activity::{ActivityFilter, ActivityLog, ACTIVITY_SORT};
use erasmus_db::repositories::ActivityRepo;

use crate::error::{AppError, AppResult};
use crate::exports::csv_response;
use crate::exports::sheets::{activity_row, ACTIVITY_FILENAME, ACTIVITY_HEADERS};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

const ENTITY: &str = "Activity";

/// GET /api/v1/activity-log
pub async fn index(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<ListParams>,
    Query(filter): Query<ActivityFilter>,
) -> AppResult<Json<Page<ActivityLog>>> {
    authorize(&ActivityPolicy, &auth.actor(), Ability::ViewAny)?;
    let options = ListOptions::resolve(&params, &ACTIVITY_SORT)?;
    let page = ActivityRepo::list(&state.pool, &filter, &options).await?;
    Ok(Json(page))
}

/// GET /api/v1/activity-log/export
pub async fn export(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<ListParams>,
    Query(filter): Query<ActivityFilter>,
) -> AppResult<Response> {
    authorize(&ActivityPolicy, &auth.actor(), Ability::Export)?;
    let options = ListOptions::for_export(&params, &ACTIVITY_SORT)?;
    let rows = ActivityRepo::export(&state.pool, &filter, &options).await?;

    tracing::info!(rows = rows.len(), user_id = auth.user_id, "Activity log exported");
    csv_response(ACTIVITY_FILENAME, ACTIVITY_HEADERS, rows.iter().map(activity_row))
}

/// GET /api/v1/activity-log/subject/{subject_type}/{subject_id}
///
/// History of one record, newest first.
pub async fn for_subject(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((subject_type, subject_id)): Path<(String, DbId)>,
    Query(params): Query<ListParams>,
) -> AppResult<Json<Page<ActivityLog>>> {
    authorize(&ActivityPolicy, &auth.actor(), Ability::ViewAny)?;
    let options = ListOptions::resolve(&params, &ACTIVITY_SORT)?;
    let page = ActivityRepo::for_subject(&state.pool, &subject_type, subject_id, &options).await?;
    Ok(Json(page))
}

/// GET /api/v1/activity-log/{id}
pub async fn show(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ActivityLog>>> {
    authorize(&ActivityPolicy, &auth.actor(), Ability::View)?;
    let entry = ActivityRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(ENTITY, id))?;
    Ok(Json(DataResponse::new(entry)))
}
