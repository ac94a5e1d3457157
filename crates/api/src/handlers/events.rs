//! Handlers for the `/events` resource (Erasmus+ calendar events).

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use erasmus_core::event::EventType;
use erasmus_core::listing::{ListOptions, ListParams, Page};
use erasmus_core::policy::{authorize, Ability, ErasmusEventPolicy};
use erasmus_core::types::DbId;
use erasmus_core::validation::validate_range;
use erasmus_db::models::erasmus_event::{
    CreateErasmusEvent, ErasmusEvent, ErasmusEventFilter, UpdateErasmusEvent, ERASMUS_EVENT_SORT,
};
use erasmus_db::repositories::ErasmusEventRepo;
use validator::Validate;

use super::ensure_parent_not_trashed;
use crate::activity::ActivityLogger;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::context::RequestContext;
use crate::response::DataResponse;
use crate::state::AppState;

const ENTITY: &str = "ErasmusEvent";

async fn find_event(state: &AppState, id: DbId) -> AppResult<ErasmusEvent> {
    ErasmusEventRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(ENTITY, id))
}

/// GET /api/v1/events
///
/// `from` / `to` bound the start date.
pub async fn index(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<ListParams>,
    Query(filter): Query<ErasmusEventFilter>,
) -> AppResult<Json<Page<ErasmusEvent>>> {
    authorize(&ErasmusEventPolicy, &auth.actor(), Ability::ViewAny)?;
    let options = ListOptions::resolve(&params, &ERASMUS_EVENT_SORT)?;
    let page = ErasmusEventRepo::list(&state.pool, &filter, &options).await?;
    Ok(Json(page))
}

/// POST /api/v1/events
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    RequestContext(ctx): RequestContext,
    Json(input): Json<CreateErasmusEvent>,
) -> AppResult<(StatusCode, Json<DataResponse<ErasmusEvent>>)> {
    authorize(&ErasmusEventPolicy, &auth.actor(), Ability::Create)?;
    input.validate()?;
    EventType::parse(&input.event_type)?;
    validate_range("start_date", Some(input.start_date), "end_date", input.end_date)?;

    let mut tx = state.pool.begin().await?;
    let event = ErasmusEventRepo::create(&mut *tx, &input, auth.user_id).await?;
    ActivityLogger::new(Some(auth.user_id), &ctx)
        .created(&mut tx, &event)
        .await?;
    tx.commit().await?;

    tracing::info!(event_id = event.id, user_id = auth.user_id, "Event created");
    Ok((StatusCode::CREATED, Json(DataResponse::new(event))))
}

/// GET /api/v1/events/{id}
pub async fn show(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ErasmusEvent>>> {
    authorize(&ErasmusEventPolicy, &auth.actor(), Ability::View)?;
    let event = find_event(&state, id).await?;
    Ok(Json(DataResponse::new(event)))
}

/// PUT /api/v1/events/{id}
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    RequestContext(ctx): RequestContext,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateErasmusEvent>,
) -> AppResult<Json<DataResponse<ErasmusEvent>>> {
    authorize(&ErasmusEventPolicy, &auth.actor(), Ability::Update)?;
    input.validate()?;
    if let Some(event_type) = &input.event_type {
        EventType::parse(event_type)?;
    }

    let before = find_event(&state, id).await?;
    validate_range(
        "start_date",
        Some(input.start_date.unwrap_or(before.start_date)),
        "end_date",
        input.end_date.or(before.end_date),
    )?;

    let mut tx = state.pool.begin().await?;
    let event = ErasmusEventRepo::update(&mut *tx, id, &input)
        .await?
        .ok_or_else(|| AppError::not_found(ENTITY, id))?;
    ActivityLogger::new(Some(auth.user_id), &ctx)
        .updated(&mut tx, &before, &event)
        .await?;
    tx.commit().await?;

    tracing::info!(event_id = id, user_id = auth.user_id, "Event updated");
    Ok(Json(DataResponse::new(event)))
}

/// DELETE /api/v1/events/{id}
pub async fn destroy(
    State(state): State<AppState>,
    auth: AuthUser,
    RequestContext(ctx): RequestContext,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    authorize(&ErasmusEventPolicy, &auth.actor(), Ability::Delete)?;
    let event = find_event(&state, id).await?;

    let mut tx = state.pool.begin().await?;
    if !ErasmusEventRepo::soft_delete(&mut *tx, id).await? {
        return Err(AppError::not_found(ENTITY, id));
    }
    ActivityLogger::new(Some(auth.user_id), &ctx)
        .deleted(&mut tx, &event)
        .await?;
    tx.commit().await?;

    tracing::info!(event_id = id, user_id = auth.user_id, "Event moved to trash");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/events/{id}/restore
pub async fn restore(
    State(state): State<AppState>,
    auth: AuthUser,
    RequestContext(ctx): RequestContext,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ErasmusEvent>>> {
    authorize(&ErasmusEventPolicy, &auth.actor(), Ability::Restore)?;
    ensure_parent_not_trashed(&state.pool, "erasmus_events", id).await?;

    let mut tx = state.pool.begin().await?;
    if !ErasmusEventRepo::restore(&mut *tx, id).await? {
        return Err(AppError::not_found(ENTITY, id));
    }
    let event = ErasmusEventRepo::find_by_id(&mut *tx, id)
        .await?
        .ok_or_else(|| AppError::not_found(ENTITY, id))?;
    ActivityLogger::new(Some(auth.user_id), &ctx)
        .restored(&mut tx, &event)
        .await?;
    tx.commit().await?;

    tracing::info!(event_id = id, user_id = auth.user_id, "Event restored");
    Ok(Json(DataResponse::new(event)))
}

/// DELETE /api/v1/events/{id}/force
pub async fn force_delete(
    State(state): State<AppState>,
    auth: AuthUser,
    RequestContext(ctx): RequestContext,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    authorize(&ErasmusEventPolicy, &auth.actor(), Ability::ForceDelete)?;
    let event = ErasmusEventRepo::find_by_id_include_deleted(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(ENTITY, id))?;

    let mut tx = state.pool.begin().await?;
    ErasmusEventRepo::hard_delete(&mut *tx, id).await?;
    ActivityLogger::new(Some(auth.user_id), &ctx)
        .force_deleted(&mut tx, &event)
        .await?;
    tx.commit().await?;

    tracing::info!(event_id = id, user_id = auth.user_id, "Event permanently deleted");
    Ok(StatusCode::NO_CONTENT)
}
