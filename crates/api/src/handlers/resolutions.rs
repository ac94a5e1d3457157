//! Handlers for the `/resolutions` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use chrono::Utc;
use erasmus_core::listing::{ListOptions, ListParams, Page};
use erasmus_core::policy::{authorize, Ability, ResolutionPolicy};
use erasmus_core::resolution::{ensure_phase_matches_call, ResolutionType};
use erasmus_core::types::DbId;
use erasmus_db::models::resolution::{
    CreateResolution, Resolution, ResolutionFilter, UpdateResolution, RESOLUTION_SORT,
};
use erasmus_db::repositories::{CallPhaseRepo, CallRepo, ResolutionRepo};
use validator::Validate;

use super::ensure_parent_not_trashed;
use crate::activity::ActivityLogger;
use crate::error::{AppError, AppResult};
use crate::exports::csv_response;
use crate::exports::sheets::{resolution_row, RESOLUTIONS_FILENAME, RESOLUTION_HEADERS};
use crate::middleware::auth::AuthUser;
use crate::middleware::context::RequestContext;
use crate::response::DataResponse;
use crate::state::AppState;

const ENTITY: &str = "Resolution";

async fn find_resolution(state: &AppState, id: DbId) -> AppResult<Resolution> {
    ResolutionRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(ENTITY, id))
}

/// The call must exist and the phase, when given, must belong to it.
async fn check_call_and_phase(
    state: &AppState,
    call_id: DbId,
    call_phase_id: Option<DbId>,
) -> AppResult<()> {
    CallRepo::find_by_id(&state.pool, call_id)
        .await?
        .ok_or_else(|| AppError::not_found("Call", call_id))?;
    if let Some(phase_id) = call_phase_id {
        let phase = CallPhaseRepo::find_any(&state.pool, phase_id)
            .await?
            .ok_or_else(|| AppError::not_found("CallPhase", phase_id))?;
        ensure_phase_matches_call(call_id, phase.call_id)?;
    }
    Ok(())
}

/// GET /api/v1/resolutions
pub async fn index(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<ListParams>,
    Query(filter): Query<ResolutionFilter>,
) -> AppResult<Json<Page<Resolution>>> {
    authorize(&ResolutionPolicy, &auth.actor(), Ability::ViewAny)?;
    let options = ListOptions::resolve(&params, &RESOLUTION_SORT)?;
    let page = ResolutionRepo::list(&state.pool, &filter, &options).await?;
    Ok(Json(page))
}

/// GET /api/v1/resolutions/export
pub async fn export(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<ListParams>,
    Query(filter): Query<ResolutionFilter>,
) -> AppResult<Response> {
    authorize(&ResolutionPolicy, &auth.actor(), Ability::Export)?;
    let options = ListOptions::for_export(&params, &RESOLUTION_SORT)?;
    let rows = ResolutionRepo::export(&state.pool, &filter, &options).await?;

    tracing::info!(rows = rows.len(), user_id = auth.user_id, "Resolutions exported");
    csv_response(
        RESOLUTIONS_FILENAME,
        RESOLUTION_HEADERS,
        rows.iter().map(resolution_row),
    )
}

/// POST /api/v1/resolutions
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    RequestContext(ctx): RequestContext,
    Json(input): Json<CreateResolution>,
) -> AppResult<(StatusCode, Json<DataResponse<Resolution>>)> {
    authorize(&ResolutionPolicy, &auth.actor(), Ability::Create)?;
    input.validate()?;
    ResolutionType::parse(&input.resolution_type)?;
    check_call_and_phase(&state, input.call_id, input.call_phase_id).await?;

    let mut tx = state.pool.begin().await?;
    let resolution = ResolutionRepo::create(&mut *tx, &input, auth.user_id).await?;
    ActivityLogger::new(Some(auth.user_id), &ctx)
        .created(&mut tx, &resolution)
        .await?;
    tx.commit().await?;

    tracing::info!(
        resolution_id = resolution.id,
        call_id = resolution.call_id,
        user_id = auth.user_id,
        "Resolution created"
    );
    Ok((StatusCode::CREATED, Json(DataResponse::new(resolution))))
}

/// GET /api/v1/resolutions/{id}
pub async fn show(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Resolution>>> {
    authorize(&ResolutionPolicy, &auth.actor(), Ability::View)?;
    let resolution = find_resolution(&state, id).await?;
    Ok(Json(DataResponse::new(resolution)))
}

/// PUT /api/v1/resolutions/{id}
///
/// `call_phase_id: null` detaches the resolution from its phase. Moving it
/// to another call without naming a phase detaches it too; a phase that is
/// named is checked against the new call.
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    RequestContext(ctx): RequestContext,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateResolution>,
) -> AppResult<Json<DataResponse<Resolution>>> {
    authorize(&ResolutionPolicy, &auth.actor(), Ability::Update)?;
    input.validate()?;
    if let Some(resolution_type) = &input.resolution_type {
        ResolutionType::parse(resolution_type)?;
    }

    let before = find_resolution(&state, id).await?;
    let call_id = input.call_id.unwrap_or(before.call_id);
    let call_changed = call_id != before.call_id;
    let call_phase_id = match input.call_phase_id {
        Some(phase) => phase,
        None if call_changed => None,
        None => before.call_phase_id,
    };
    if call_changed || input.call_phase_id.is_some() {
        check_call_and_phase(&state, call_id, call_phase_id).await?;
    }
    let patch = UpdateResolution {
        call_phase_id: Some(call_phase_id),
        ..input
    };

    let mut tx = state.pool.begin().await?;
    let resolution = ResolutionRepo::update(&mut *tx, id, &patch)
        .await?
        .ok_or_else(|| AppError::not_found(ENTITY, id))?;
    ActivityLogger::new(Some(auth.user_id), &ctx)
        .updated(&mut tx, &before, &resolution)
        .await?;
    tx.commit().await?;

    tracing::info!(resolution_id = id, user_id = auth.user_id, "Resolution updated");
    Ok(Json(DataResponse::new(resolution)))
}

/// POST /api/v1/resolutions/{id}/publish
pub async fn publish(
    State(state): State<AppState>,
    auth: AuthUser,
    RequestContext(ctx): RequestContext,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Resolution>>> {
    authorize(&ResolutionPolicy, &auth.actor(), Ability::Publish)?;
    find_resolution(&state, id).await?;

    let mut tx = state.pool.begin().await?;
    let resolution = ResolutionRepo::set_published_at(&mut *tx, id, Some(Utc::now()))
        .await?
        .ok_or_else(|| AppError::not_found(ENTITY, id))?;
    ActivityLogger::new(Some(auth.user_id), &ctx)
        .published(&mut tx, &resolution)
        .await?;
    tx.commit().await?;

    tracing::info!(resolution_id = id, user_id = auth.user_id, "Resolution published");
    Ok(Json(DataResponse::new(resolution)))
}

/// POST /api/v1/resolutions/{id}/unpublish
pub async fn unpublish(
    State(state): State<AppState>,
    auth: AuthUser,
    RequestContext(ctx): RequestContext,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Resolution>>> {
    authorize(&ResolutionPolicy, &auth.actor(), Ability::Publish)?;
    find_resolution(&state, id).await?;

    let mut tx = state.pool.begin().await?;
    let resolution = ResolutionRepo::set_published_at(&mut *tx, id, None)
        .await?
        .ok_or_else(|| AppError::not_found(ENTITY, id))?;
    ActivityLogger::new(Some(auth.user_id), &ctx)
        .unpublished(&mut tx, &resolution)
        .await?;
    tx.commit().await?;

    tracing::info!(resolution_id = id, user_id = auth.user_id, "Resolution unpublished");
    Ok(Json(DataResponse::new(resolution)))
}

/// DELETE /api/v1/resolutions/{id}
pub async fn destroy(
    State(state): State<AppState>,
    auth: AuthUser,
    RequestContext(ctx): RequestContext,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    authorize(&ResolutionPolicy, &auth.actor(), Ability::Delete)?;
    let resolution = find_resolution(&state, id).await?;

    let mut tx = state.pool.begin().await?;
    if !ResolutionRepo::soft_delete(&mut *tx, id).await? {
        return Err(AppError::not_found(ENTITY, id));
    }
    ActivityLogger::new(Some(auth.user_id), &ctx)
        .deleted(&mut tx, &resolution)
        .await?;
    tx.commit().await?;

    tracing::info!(resolution_id = id, user_id = auth.user_id, "Resolution moved to trash");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/resolutions/{id}/restore
///
/// 409 while the call or phase it belongs to is in the trash.
pub async fn restore(
    State(state): State<AppState>,
    auth: AuthUser,
    RequestContext(ctx): RequestContext,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Resolution>>> {
    authorize(&ResolutionPolicy, &auth.actor(), Ability::Restore)?;
    ensure_parent_not_trashed(&state.pool, "resolutions", id).await?;

    let mut tx = state.pool.begin().await?;
    if !ResolutionRepo::restore(&mut *tx, id).await? {
        return Err(AppError::not_found(ENTITY, id));
    }
    let resolution = ResolutionRepo::find_by_id(&mut *tx, id)
        .await?
        .ok_or_else(|| AppError::not_found(ENTITY, id))?;
    ActivityLogger::new(Some(auth.user_id), &ctx)
        .restored(&mut tx, &resolution)
        .await?;
    tx.commit().await?;

    tracing::info!(resolution_id = id, user_id = auth.user_id, "Resolution restored");
    Ok(Json(DataResponse::new(resolution)))
}

/// DELETE /api/v1/resolutions/{id}/force
pub async fn force_delete(
    State(state): State<AppState>,
    auth: AuthUser,
    RequestContext(ctx): RequestContext,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    authorize(&ResolutionPolicy, &auth.actor(), Ability::ForceDelete)?;
    let resolution = ResolutionRepo::find_by_id_include_deleted(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(ENTITY, id))?;

    let mut tx = state.pool.begin().await?;
    ResolutionRepo::hard_delete(&mut *tx, id).await?;
    ActivityLogger::new(Some(auth.user_id), &ctx)
        .force_deleted(&mut tx, &resolution)
        .await?;
    tx.commit().await?;

    tracing::info!(resolution_id = id, user_id = auth.user_id, "Resolution permanently deleted");
    Ok(StatusCode::NO_CONTENT)
}
