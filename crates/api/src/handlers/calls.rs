//! Handlers for the `/calls` resource.
//!
//! Besides CRUD, a call moves through its lifecycle here: publish,
//! unpublish and direct status changes each stamp the matching timestamps
//! and are recorded in the activity log.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use chrono::Utc;
use erasmus_core::call::{
    normalize_destinations, validate_scoring_table, CallLifecycle, CallModality, CallStatus,
    CallType,
};
use erasmus_core::listing::{ListOptions, ListParams, Page};
use erasmus_core::policy::{authorize, Ability, CallPolicy};
use erasmus_core::slug::next_available;
use erasmus_core::types::DbId;
use erasmus_core::validation::validate_range;
use erasmus_db::models::call::{
    Call, CallFilter, CreateCall, SetCallStatus, UpdateCall, CALL_SORT,
};
use erasmus_db::repositories::call_repo::NewCallFields;
use erasmus_db::repositories::CallRepo;
use serde_json::Value;
use validator::Validate;

use super::{ensure_parent_not_trashed, slug_base};
use crate::activity::ActivityLogger;
use crate::error::{AppError, AppResult};
use crate::exports::sheets::{call_row, CALLS_FILENAME, CALL_HEADERS};
use crate::exports::csv_response;
use crate::middleware::auth::AuthUser;
use crate::middleware::context::RequestContext;
use crate::response::DataResponse;
use crate::state::AppState;

const ENTITY: &str = "Call";

fn destinations_value(destinations: &[String]) -> Value {
    Value::from(normalize_destinations(destinations))
}

async fn find_call(state: &AppState, id: DbId) -> AppResult<Call> {
    CallRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(ENTITY, id))
}

/// GET /api/v1/calls
pub async fn index(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<ListParams>,
    Query(filter): Query<CallFilter>,
) -> AppResult<Json<Page<Call>>> {
    authorize(&CallPolicy, &auth.actor(), Ability::ViewAny)?;
    let options = ListOptions::resolve(&params, &CALL_SORT)?;
    let page = CallRepo::list(&state.pool, &filter, &options).await?;
    Ok(Json(page))
}

/// GET /api/v1/calls/export
///
/// CSV of every call matching the index filters.
pub async fn export(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<ListParams>,
    Query(filter): Query<CallFilter>,
) -> AppResult<Response> {
    authorize(&CallPolicy, &auth.actor(), Ability::Export)?;
    let options = ListOptions::for_export(&params, &CALL_SORT)?;
    let rows = CallRepo::export(&state.pool, &filter, &options).await?;

    tracing::info!(rows = rows.len(), user_id = auth.user_id, "Calls exported");
    csv_response(CALLS_FILENAME, CALL_HEADERS, rows.iter().map(call_row))
}

/// POST /api/v1/calls
///
/// New calls start as drafts unless a status is given. Opening a call on
/// creation stamps `published_at`.
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    RequestContext(ctx): RequestContext,
    Json(input): Json<CreateCall>,
) -> AppResult<(StatusCode, Json<DataResponse<Call>>)> {
    authorize(&CallPolicy, &auth.actor(), Ability::Create)?;
    input.validate()?;
    CallType::parse(&input.call_type)?;
    CallModality::parse(&input.modality)?;
    validate_range(
        "estimated_start_date",
        input.estimated_start_date,
        "estimated_end_date",
        input.estimated_end_date,
    )?;
    if let Some(table) = &input.scoring_table {
        validate_scoring_table(table)?;
    }
    let status = match input.status.as_deref() {
        Some(raw) => CallStatus::parse(raw)?,
        None => CallStatus::Borrador,
    };

    let base = slug_base(input.slug.as_deref(), &input.title)?;
    let taken = CallRepo::slugs_like(&state.pool, &base).await?;
    let draft = CallLifecycle {
        status: CallStatus::Borrador,
        published_at: None,
        closed_at: None,
    };
    let fields = NewCallFields {
        slug: next_available(&base, &taken),
        destinations: destinations_value(input.destinations.as_deref().unwrap_or_default()),
        lifecycle: draft.with_status(status, Utc::now()),
        created_by: auth.user_id,
    };

    let mut tx = state.pool.begin().await?;
    let call = CallRepo::create(&mut *tx, &input, &fields).await?;
    ActivityLogger::new(Some(auth.user_id), &ctx)
        .created(&mut tx, &call)
        .await?;
    tx.commit().await?;

    tracing::info!(
        call_id = call.id,
        status = %call.status,
        user_id = auth.user_id,
        "Call created"
    );
    Ok((StatusCode::CREATED, Json(DataResponse::new(call))))
}

/// GET /api/v1/calls/{id}
pub async fn show(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Call>>> {
    authorize(&CallPolicy, &auth.actor(), Ability::View)?;
    let call = find_call(&state, id).await?;
    Ok(Json(DataResponse::new(call)))
}

/// PUT /api/v1/calls/{id}
///
/// Status is not editable here; use the publish and status endpoints.
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    RequestContext(ctx): RequestContext,
    Path(id): Path<DbId>,
    Json(mut input): Json<UpdateCall>,
) -> AppResult<Json<DataResponse<Call>>> {
    authorize(&CallPolicy, &auth.actor(), Ability::Update)?;
    input.validate()?;
    if let Some(call_type) = &input.call_type {
        CallType::parse(call_type)?;
    }
    if let Some(modality) = &input.modality {
        CallModality::parse(modality)?;
    }
    if let Some(table) = &input.scoring_table {
        validate_scoring_table(table)?;
    }
    if let Some(slug) = input.slug.take() {
        input.slug = Some(slug_base(Some(&slug), &slug)?);
    }

    let before = find_call(&state, id).await?;
    validate_range(
        "estimated_start_date",
        input.estimated_start_date.or(before.estimated_start_date),
        "estimated_end_date",
        input.estimated_end_date.or(before.estimated_end_date),
    )?;

    let destinations = input.destinations.as_deref().map(destinations_value);
    let mut tx = state.pool.begin().await?;
    let call = CallRepo::update(
        &mut *tx,
        id,
        &input,
        destinations.as_ref(),
        auth.user_id,
    )
    .await?
    .ok_or_else(|| AppError::not_found(ENTITY, id))?;

    ActivityLogger::new(Some(auth.user_id), &ctx)
        .updated(&mut tx, &before, &call)
        .await?;
    tx.commit().await?;

    tracing::info!(call_id = id, user_id = auth.user_id, "Call updated");
    Ok(Json(DataResponse::new(call)))
}

/// POST /api/v1/calls/{id}/publish
///
/// Opens the call and stamps `published_at` with the current time.
pub async fn publish(
    State(state): State<AppState>,
    auth: AuthUser,
    RequestContext(ctx): RequestContext,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Call>>> {
    authorize(&CallPolicy, &auth.actor(), Ability::Publish)?;
    let before = find_call(&state, id).await?;
    let lifecycle = before.lifecycle()?.published(Utc::now());

    let mut tx = state.pool.begin().await?;
    let call = CallRepo::set_lifecycle(&mut *tx, id, &lifecycle, auth.user_id)
        .await?
        .ok_or_else(|| AppError::not_found(ENTITY, id))?;
    ActivityLogger::new(Some(auth.user_id), &ctx)
        .published(&mut tx, &call)
        .await?;
    tx.commit().await?;

    tracing::info!(call_id = id, user_id = auth.user_id, "Call published");
    Ok(Json(DataResponse::new(call)))
}

/// POST /api/v1/calls/{id}/unpublish
///
/// Returns the call to draft and clears `published_at`.
pub async fn unpublish(
    State(state): State<AppState>,
    auth: AuthUser,
    RequestContext(ctx): RequestContext,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Call>>> {
    authorize(&CallPolicy, &auth.actor(), Ability::Publish)?;
    let before = find_call(&state, id).await?;
    let lifecycle = before.lifecycle()?.unpublished();

    let mut tx = state.pool.begin().await?;
    let call = CallRepo::set_lifecycle(&mut *tx, id, &lifecycle, auth.user_id)
        .await?
        .ok_or_else(|| AppError::not_found(ENTITY, id))?;
    ActivityLogger::new(Some(auth.user_id), &ctx)
        .unpublished(&mut tx, &call)
        .await?;
    tx.commit().await?;

    tracing::info!(call_id = id, user_id = auth.user_id, "Call unpublished");
    Ok(Json(DataResponse::new(call)))
}

/// POST /api/v1/calls/{id}/status
///
/// Set any status. Opening stamps `published_at` and closing stamps
/// `closed_at` when they are not set yet.
///
/// Opening the call, or moving it from `abierta` back to `borrador`, needs
/// the publish permission.
pub async fn set_status(
    State(state): State<AppState>,
    auth: AuthUser,
    RequestContext(ctx): RequestContext,
    Path(id): Path<DbId>,
    Json(input): Json<SetCallStatus>,
) -> AppResult<Json<DataResponse<Call>>> {
    let actor = auth.actor();
    authorize(&CallPolicy, &actor, Ability::Update)?;
    let status = CallStatus::parse(&input.status)?;
    let before = find_call(&state, id).await?;
    let current = before.lifecycle()?;
    if current.changes_visibility(status) {
        authorize(&CallPolicy, &actor, Ability::Publish)?;
    }
    let lifecycle = current.with_status(status, Utc::now());

    let mut tx = state.pool.begin().await?;
    let call = CallRepo::set_lifecycle(&mut *tx, id, &lifecycle, auth.user_id)
        .await?
        .ok_or_else(|| AppError::not_found(ENTITY, id))?;
    ActivityLogger::new(Some(auth.user_id), &ctx)
        .status_changed(&mut tx, &call, &before.status, status.as_str())
        .await?;
    tx.commit().await?;

    tracing::info!(
        call_id = id,
        old_status = %before.status,
        new_status = %status,
        user_id = auth.user_id,
        "Call status changed"
    );
    Ok(Json(DataResponse::new(call)))
}

/// DELETE /api/v1/calls/{id}
///
/// Soft delete. Refused while live phases, resolutions or applications
/// belong to the call.
pub async fn destroy(
    State(state): State<AppState>,
    auth: AuthUser,
    RequestContext(ctx): RequestContext,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    authorize(&CallPolicy, &auth.actor(), Ability::Delete)?;
    let call = find_call(&state, id).await?;

    CallRepo::dependents(&state.pool, id, false)
        .await?
        .ensure_none()?;

    let mut tx = state.pool.begin().await?;
    if !CallRepo::soft_delete(&mut *tx, id).await? {
        return Err(AppError::not_found(ENTITY, id));
    }
    ActivityLogger::new(Some(auth.user_id), &ctx)
        .deleted(&mut tx, &call)
        .await?;
    tx.commit().await?;

    tracing::info!(call_id = id, user_id = auth.user_id, "Call moved to trash");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/calls/{id}/restore
///
/// 409 while the call's program or academic year is in the trash.
pub async fn restore(
    State(state): State<AppState>,
    auth: AuthUser,
    RequestContext(ctx): RequestContext,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Call>>> {
    authorize(&CallPolicy, &auth.actor(), Ability::Restore)?;
    ensure_parent_not_trashed(&state.pool, "calls", id).await?;

    let mut tx = state.pool.begin().await?;
    if !CallRepo::restore(&mut *tx, id).await? {
        return Err(AppError::not_found(ENTITY, id));
    }
    let call = CallRepo::find_by_id(&mut *tx, id)
        .await?
        .ok_or_else(|| AppError::not_found(ENTITY, id))?;
    ActivityLogger::new(Some(auth.user_id), &ctx)
        .restored(&mut tx, &call)
        .await?;
    tx.commit().await?;

    tracing::info!(call_id = id, user_id = auth.user_id, "Call restored");
    Ok(Json(DataResponse::new(call)))
}

/// DELETE /api/v1/calls/{id}/force
pub async fn force_delete(
    State(state): State<AppState>,
    auth: AuthUser,
    RequestContext(ctx): RequestContext,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    authorize(&CallPolicy, &auth.actor(), Ability::ForceDelete)?;
    let call = CallRepo::find_by_id_include_deleted(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(ENTITY, id))?;

    CallRepo::dependents(&state.pool, id, true)
        .await?
        .ensure_none()?;

    let mut tx = state.pool.begin().await?;
    CallRepo::hard_delete(&mut *tx, id).await?;
    ActivityLogger::new(Some(auth.user_id), &ctx)
        .force_deleted(&mut tx, &call)
        .await?;
    tx.commit().await?;

    tracing::info!(call_id = id, user_id = auth.user_id, "Call permanently deleted");
    Ok(StatusCode::NO_CONTENT)
}
