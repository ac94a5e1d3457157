//! Handlers for phases nested under `/calls/{call_id}/phases`.
//!
//! At most one phase per call is current; creating a phase with
//! `is_current` or marking one current clears the flag on its siblings.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use erasmus_core::call::PhaseType;
use erasmus_core::listing::{ListOptions, ListParams, Page};
use erasmus_core::policy::{authorize, Ability, CallPhasePolicy};
use erasmus_core::types::DbId;
use erasmus_core::validation::validate_range;
use erasmus_db::models::call_phase::{
    CallPhase, CallPhaseFilter, CreateCallPhase, UpdateCallPhase, CALL_PHASE_SORT,
};
use erasmus_db::repositories::{CallPhaseRepo, CallRepo};
use validator::Validate;

use super::ensure_parent_not_trashed;
use crate::activity::ActivityLogger;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::context::RequestContext;
use crate::response::DataResponse;
use crate::state::AppState;

const ENTITY: &str = "CallPhase";

async fn ensure_call(state: &AppState, call_id: DbId) -> AppResult<()> {
    CallRepo::find_by_id(&state.pool, call_id)
        .await?
        .map(|_| ())
        .ok_or_else(|| AppError::not_found("Call", call_id))
}

async fn find_phase(state: &AppState, call_id: DbId, id: DbId) -> AppResult<CallPhase> {
    CallPhaseRepo::find_by_id(&state.pool, call_id, id)
        .await?
        .ok_or_else(|| AppError::not_found(ENTITY, id))
}

/// GET /api/v1/calls/{call_id}/phases
pub async fn index(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(call_id): Path<DbId>,
    Query(params): Query<ListParams>,
    Query(filter): Query<CallPhaseFilter>,
) -> AppResult<Json<Page<CallPhase>>> {
    authorize(&CallPhasePolicy, &auth.actor(), Ability::ViewAny)?;
    ensure_call(&state, call_id).await?;
    let options = ListOptions::resolve(&params, &CALL_PHASE_SORT)?;
    let page = CallPhaseRepo::list(&state.pool, call_id, &filter, &options).await?;
    Ok(Json(page))
}

/// POST /api/v1/calls/{call_id}/phases
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    RequestContext(ctx): RequestContext,
    Path(call_id): Path<DbId>,
    Json(input): Json<CreateCallPhase>,
) -> AppResult<(StatusCode, Json<DataResponse<CallPhase>>)> {
    authorize(&CallPhasePolicy, &auth.actor(), Ability::Create)?;
    input.validate()?;
    PhaseType::parse(&input.phase_type)?;
    validate_range("start_date", input.start_date, "end_date", input.end_date)?;
    ensure_call(&state, call_id).await?;

    let mut tx = state.pool.begin().await?;
    let phase = CallPhaseRepo::create(&mut *tx, call_id, &input).await?;
    ActivityLogger::new(Some(auth.user_id), &ctx)
        .created(&mut tx, &phase)
        .await?;
    tx.commit().await?;

    tracing::info!(
        call_id,
        phase_id = phase.id,
        user_id = auth.user_id,
        "Call phase created"
    );
    Ok((StatusCode::CREATED, Json(DataResponse::new(phase))))
}

/// GET /api/v1/calls/{call_id}/phases/{id}
pub async fn show(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((call_id, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<CallPhase>>> {
    authorize(&CallPhasePolicy, &auth.actor(), Ability::View)?;
    let phase = find_phase(&state, call_id, id).await?;
    Ok(Json(DataResponse::new(phase)))
}

/// PUT /api/v1/calls/{call_id}/phases/{id}
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    RequestContext(ctx): RequestContext,
    Path((call_id, id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateCallPhase>,
) -> AppResult<Json<DataResponse<CallPhase>>> {
    authorize(&CallPhasePolicy, &auth.actor(), Ability::Update)?;
    input.validate()?;
    if let Some(phase_type) = &input.phase_type {
        PhaseType::parse(phase_type)?;
    }

    let before = find_phase(&state, call_id, id).await?;
    validate_range(
        "start_date",
        input.start_date.or(before.start_date),
        "end_date",
        input.end_date.or(before.end_date),
    )?;

    let mut tx = state.pool.begin().await?;
    let phase = CallPhaseRepo::update(&mut *tx, call_id, id, &input)
        .await?
        .ok_or_else(|| AppError::not_found(ENTITY, id))?;
    ActivityLogger::new(Some(auth.user_id), &ctx)
        .updated(&mut tx, &before, &phase)
        .await?;
    tx.commit().await?;

    tracing::info!(call_id, phase_id = id, user_id = auth.user_id, "Call phase updated");
    Ok(Json(DataResponse::new(phase)))
}

/// POST /api/v1/calls/{call_id}/phases/{id}/mark-current
pub async fn mark_current(
    State(state): State<AppState>,
    auth: AuthUser,
    RequestContext(ctx): RequestContext,
    Path((call_id, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<CallPhase>>> {
    authorize(&CallPhasePolicy, &auth.actor(), Ability::Update)?;
    let before = find_phase(&state, call_id, id).await?;

    let mut tx = state.pool.begin().await?;
    let phase = CallPhaseRepo::mark_current(&mut *tx, call_id, id)
        .await?
        .ok_or_else(|| AppError::not_found(ENTITY, id))?;
    ActivityLogger::new(Some(auth.user_id), &ctx)
        .updated(&mut tx, &before, &phase)
        .await?;
    tx.commit().await?;

    tracing::info!(call_id, phase_id = id, user_id = auth.user_id, "Call phase marked current");
    Ok(Json(DataResponse::new(phase)))
}

/// DELETE /api/v1/calls/{call_id}/phases/{id}
///
/// Refused while live resolutions reference the phase.
pub async fn destroy(
    State(state): State<AppState>,
    auth: AuthUser,
    RequestContext(ctx): RequestContext,
    Path((call_id, id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    authorize(&CallPhasePolicy, &auth.actor(), Ability::Delete)?;
    let phase = find_phase(&state, call_id, id).await?;

    CallPhaseRepo::dependents(&state.pool, id, false)
        .await?
        .ensure_none()?;

    let mut tx = state.pool.begin().await?;
    if !CallPhaseRepo::soft_delete(&mut *tx, id).await? {
        return Err(AppError::not_found(ENTITY, id));
    }
    ActivityLogger::new(Some(auth.user_id), &ctx)
        .deleted(&mut tx, &phase)
        .await?;
    tx.commit().await?;

    tracing::info!(call_id, phase_id = id, user_id = auth.user_id, "Call phase moved to trash");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/calls/{call_id}/phases/{id}/restore
pub async fn restore(
    State(state): State<AppState>,
    auth: AuthUser,
    RequestContext(ctx): RequestContext,
    Path((call_id, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<CallPhase>>> {
    authorize(&CallPhasePolicy, &auth.actor(), Ability::Restore)?;
    CallPhaseRepo::find_by_id_include_deleted(&state.pool, call_id, id)
        .await?
        .ok_or_else(|| AppError::not_found(ENTITY, id))?;
    ensure_parent_not_trashed(&state.pool, "call_phases", id).await?;

    let mut tx = state.pool.begin().await?;
    if !CallPhaseRepo::restore(&mut *tx, id).await? {
        return Err(AppError::not_found(ENTITY, id));
    }
    let phase = CallPhaseRepo::find_by_id(&mut *tx, call_id, id)
        .await?
        .ok_or_else(|| AppError::not_found(ENTITY, id))?;
    ActivityLogger::new(Some(auth.user_id), &ctx)
        .restored(&mut tx, &phase)
        .await?;
    tx.commit().await?;

    tracing::info!(call_id, phase_id = id, user_id = auth.user_id, "Call phase restored");
    Ok(Json(DataResponse::new(phase)))
}

/// DELETE /api/v1/calls/{call_id}/phases/{id}/force
pub async fn force_delete(
    State(state): State<AppState>,
    auth: AuthUser,
    RequestContext(ctx): RequestContext,
    Path((call_id, id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    authorize(&CallPhasePolicy, &auth.actor(), Ability::ForceDelete)?;
    let phase = CallPhaseRepo::find_by_id_include_deleted(&state.pool, call_id, id)
        .await?
        .ok_or_else(|| AppError::not_found(ENTITY, id))?;

    CallPhaseRepo::dependents(&state.pool, id, true)
        .await?
        .ensure_none()?;

    let mut tx = state.pool.begin().await?;
    CallPhaseRepo::hard_delete(&mut *tx, id).await?;
    ActivityLogger::new(Some(auth.user_id), &ctx)
        .force_deleted(&mut tx, &phase)
        .await?;
    tx.commit().await?;

    tracing::info!(
        call_id,
        phase_id = id,
        user_id = auth.user_id,
        "Call phase permanently deleted"
    );
    Ok(StatusCode::NO_CONTENT)
}
