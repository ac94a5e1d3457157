//! Handlers for applications nested under `/calls/{call_id}/applications`.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use erasmus_core::call::ApplicationStatus;
use erasmus_core::listing::{ListOptions, ListParams, Page};
use erasmus_core::policy::{authorize, Ability, CallApplicationPolicy};
use erasmus_core::types::DbId;
use erasmus_db::models::call_application::{
    CallApplication, CallApplicationFilter, CreateCallApplication, SetApplicationStatus,
    UpdateCallApplication, CALL_APPLICATION_SORT,
};
use erasmus_db::repositories::{CallApplicationRepo, CallRepo};
use validator::Validate;

use super::ensure_parent_not_trashed;
use crate::activity::ActivityLogger;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::context::RequestContext;
use crate::response::DataResponse;
use crate::state::AppState;

const ENTITY: &str = "CallApplication";

async fn find_application(
    state: &AppState,
    call_id: DbId,
    id: DbId,
) -> AppResult<CallApplication> {
    CallApplicationRepo::find_by_id(&state.pool, call_id, id)
        .await?
        .ok_or_else(|| AppError::not_found(ENTITY, id))
}

/// GET /api/v1/calls/{call_id}/applications
pub async fn index(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(call_id): Path<DbId>,
    Query(params): Query<ListParams>,
    Query(filter): Query<CallApplicationFilter>,
) -> AppResult<Json<Page<CallApplication>>> {
    authorize(&CallApplicationPolicy, &auth.actor(), Ability::ViewAny)?;
    CallRepo::find_by_id(&state.pool, call_id)
        .await?
        .ok_or_else(|| AppError::not_found("Call", call_id))?;
    let options = ListOptions::resolve(&params, &CALL_APPLICATION_SORT)?;
    let page = CallApplicationRepo::list(&state.pool, call_id, &filter, &options).await?;
    Ok(Json(page))
}

/// POST /api/v1/calls/{call_id}/applications
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    RequestContext(ctx): RequestContext,
    Path(call_id): Path<DbId>,
    Json(input): Json<CreateCallApplication>,
) -> AppResult<(StatusCode, Json<DataResponse<CallApplication>>)> {
    authorize(&CallApplicationPolicy, &auth.actor(), Ability::Create)?;
    input.validate()?;
    if let Some(status) = &input.status {
        ApplicationStatus::parse(status)?;
    }
    CallRepo::find_by_id(&state.pool, call_id)
        .await?
        .ok_or_else(|| AppError::not_found("Call", call_id))?;

    let mut tx = state.pool.begin().await?;
    let application = CallApplicationRepo::create(&mut *tx, call_id, &input).await?;
    ActivityLogger::new(Some(auth.user_id), &ctx)
        .created(&mut tx, &application)
        .await?;
    tx.commit().await?;

    tracing::info!(
        call_id,
        application_id = application.id,
        user_id = auth.user_id,
        "Call application created"
    );
    Ok((StatusCode::CREATED, Json(DataResponse::new(application))))
}

/// GET /api/v1/calls/{call_id}/applications/{id}
pub async fn show(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((call_id, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<CallApplication>>> {
    authorize(&CallApplicationPolicy, &auth.actor(), Ability::View)?;
    let application = find_application(&state, call_id, id).await?;
    Ok(Json(DataResponse::new(application)))
}

/// PUT /api/v1/calls/{call_id}/applications/{id}
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    RequestContext(ctx): RequestContext,
    Path((call_id, id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateCallApplication>,
) -> AppResult<Json<DataResponse<CallApplication>>> {
    authorize(&CallApplicationPolicy, &auth.actor(), Ability::Update)?;
    input.validate()?;
    let before = find_application(&state, call_id, id).await?;

    let mut tx = state.pool.begin().await?;
    let application = CallApplicationRepo::update(&mut *tx, call_id, id, &input)
        .await?
        .ok_or_else(|| AppError::not_found(ENTITY, id))?;
    ActivityLogger::new(Some(auth.user_id), &ctx)
        .updated(&mut tx, &before, &application)
        .await?;
    tx.commit().await?;

    tracing::info!(call_id, application_id = id, user_id = auth.user_id, "Call application updated");
    Ok(Json(DataResponse::new(application)))
}

/// POST /api/v1/calls/{call_id}/applications/{id}/status
pub async fn set_status(
    State(state): State<AppState>,
    auth: AuthUser,
    RequestContext(ctx): RequestContext,
    Path((call_id, id)): Path<(DbId, DbId)>,
    Json(input): Json<SetApplicationStatus>,
) -> AppResult<Json<DataResponse<CallApplication>>> {
    authorize(&CallApplicationPolicy, &auth.actor(), Ability::Update)?;
    let status = ApplicationStatus::parse(&input.status)?;
    let before = find_application(&state, call_id, id).await?;

    let mut tx = state.pool.begin().await?;
    let application = CallApplicationRepo::set_status(&mut *tx, call_id, id, status.as_str())
        .await?
        .ok_or_else(|| AppError::not_found(ENTITY, id))?;
    ActivityLogger::new(Some(auth.user_id), &ctx)
        .status_changed(&mut tx, &application, &before.status, status.as_str())
        .await?;
    tx.commit().await?;

    tracing::info!(
        call_id,
        application_id = id,
        new_status = %status,
        user_id = auth.user_id,
        "Call application status changed"
    );
    Ok(Json(DataResponse::new(application)))
}

/// DELETE /api/v1/calls/{call_id}/applications/{id}
pub async fn destroy(
    State(state): State<AppState>,
    auth: AuthUser,
    RequestContext(ctx): RequestContext,
    Path((call_id, id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    authorize(&CallApplicationPolicy, &auth.actor(), Ability::Delete)?;
    let application = find_application(&state, call_id, id).await?;

    let mut tx = state.pool.begin().await?;
    if !CallApplicationRepo::soft_delete(&mut *tx, id).await? {
        return Err(AppError::not_found(ENTITY, id));
    }
    ActivityLogger::new(Some(auth.user_id), &ctx)
        .deleted(&mut tx, &application)
        .await?;
    tx.commit().await?;

    tracing::info!(call_id, application_id = id, user_id = auth.user_id, "Call application moved to trash");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/calls/{call_id}/applications/{id}/restore
pub async fn restore(
    State(state): State<AppState>,
    auth: AuthUser,
    RequestContext(ctx): RequestContext,
    Path((call_id, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<CallApplication>>> {
    authorize(&CallApplicationPolicy, &auth.actor(), Ability::Restore)?;
    CallApplicationRepo::find_by_id_include_deleted(&state.pool, call_id, id)
        .await?
        .ok_or_else(|| AppError::not_found(ENTITY, id))?;
    ensure_parent_not_trashed(&state.pool, "call_applications", id).await?;

    let mut tx = state.pool.begin().await?;
    if !CallApplicationRepo::restore(&mut *tx, id).await? {
        return Err(AppError::not_found(ENTITY, id));
    }
    let application = CallApplicationRepo::find_by_id(&mut *tx, call_id, id)
        .await?
        .ok_or_else(|| AppError::not_found(ENTITY, id))?;
    ActivityLogger::new(Some(auth.user_id), &ctx)
        .restored(&mut tx, &application)
        .await?;
    tx.commit().await?;

    tracing::info!(call_id, application_id = id, user_id = auth.user_id, "Call application restored");
    Ok(Json(DataResponse::new(application)))
}

/// DELETE /api/v1/calls/{call_id}/applications/{id}/force
pub async fn force_delete(
    State(state): State<AppState>,
    auth: AuthUser,
    RequestContext(ctx): RequestContext,
    Path((call_id, id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    authorize(&CallApplicationPolicy, &auth.actor(), Ability::ForceDelete)?;
    let application = CallApplicationRepo::find_by_id_include_deleted(&state.pool, call_id, id)
        .await?
        .ok_or_else(|| AppError::not_found(ENTITY, id))?;

    let mut tx = state.pool.begin().await?;
    CallApplicationRepo::hard_delete(&mut *tx, id).await?;
    ActivityLogger::new(Some(auth.user_id), &ctx)
        .force_deleted(&mut tx, &application)
        .await?;
    tx.commit().await?;

    tracing::info!(
        call_id,
        application_id = id,
        user_id = auth.user_id,
        "Call application permanently deleted"
    );
    Ok(StatusCode::NO_CONTENT)
}
