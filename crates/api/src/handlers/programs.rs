//! Handlers for the `/programs` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use erasmus_core::listing::{ListOptions, ListParams, Page};
use erasmus_core::policy::{authorize, Ability, ProgramPolicy};
use erasmus_core::slug::next_available;
use erasmus_core::types::DbId;
use erasmus_db::models::program::{
    CreateProgram, Program, ProgramFilter, UpdateProgram, PROGRAM_SORT,
};
use erasmus_db::repositories::ProgramRepo;
use validator::Validate;

use super::{ensure_parent_not_trashed, slug_base};
use crate::activity::ActivityLogger;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::context::RequestContext;
use crate::response::DataResponse;
use crate::state::AppState;

const ENTITY: &str = "Program";

/// GET /api/v1/programs
pub async fn index(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<ListParams>,
    Query(filter): Query<ProgramFilter>,
) -> AppResult<Json<Page<Program>>> {
    authorize(&ProgramPolicy, &auth.actor(), Ability::ViewAny)?;
    let options = ListOptions::resolve(&params, &PROGRAM_SORT)?;
    let page = ProgramRepo::list(&state.pool, &filter, &options).await?;
    Ok(Json(page))
}

/// POST /api/v1/programs
///
/// The slug is derived from the name when omitted and suffixed until unique.
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    RequestContext(ctx): RequestContext,
    Json(input): Json<CreateProgram>,
) -> AppResult<(StatusCode, Json<DataResponse<Program>>)> {
    authorize(&ProgramPolicy, &auth.actor(), Ability::Create)?;
    input.validate()?;

    let base = slug_base(input.slug.as_deref(), &input.name)?;
    let taken = ProgramRepo::slugs_like(&state.pool, &base).await?;
    let slug = next_available(&base, &taken);

    let mut tx = state.pool.begin().await?;
    let program = ProgramRepo::create(&mut *tx, &input, &slug).await?;
    ActivityLogger::new(Some(auth.user_id), &ctx)
        .created(&mut tx, &program)
        .await?;
    tx.commit().await?;

    tracing::info!(program_id = program.id, user_id = auth.user_id, "Program created");
    Ok((StatusCode::CREATED, Json(DataResponse::new(program))))
}

/// GET /api/v1/programs/{id}
pub async fn show(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Program>>> {
    authorize(&ProgramPolicy, &auth.actor(), Ability::View)?;
    let program = ProgramRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(ENTITY, id))?;
    Ok(Json(DataResponse::new(program)))
}

/// PUT /api/v1/programs/{id}
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    RequestContext(ctx): RequestContext,
    Path(id): Path<DbId>,
    Json(mut input): Json<UpdateProgram>,
) -> AppResult<Json<DataResponse<Program>>> {
    authorize(&ProgramPolicy, &auth.actor(), Ability::Update)?;
    input.validate()?;
    if let Some(slug) = input.slug.take() {
        input.slug = Some(slug_base(Some(&slug), &slug)?);
    }

    let before = ProgramRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(ENTITY, id))?;
    let mut tx = state.pool.begin().await?;
    let program = ProgramRepo::update(&mut *tx, id, &input)
        .await?
        .ok_or_else(|| AppError::not_found(ENTITY, id))?;

    ActivityLogger::new(Some(auth.user_id), &ctx)
        .updated(&mut tx, &before, &program)
        .await?;
    tx.commit().await?;

    tracing::info!(program_id = id, user_id = auth.user_id, "Program updated");
    Ok(Json(DataResponse::new(program)))
}

/// DELETE /api/v1/programs/{id}
///
/// Soft delete. Refused while live calls, news posts, documents or events
/// reference the program.
pub async fn destroy(
    State(state): State<AppState>,
    auth: AuthUser,
    RequestContext(ctx): RequestContext,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    authorize(&ProgramPolicy, &auth.actor(), Ability::Delete)?;
    let program = ProgramRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(ENTITY, id))?;

    ProgramRepo::dependents(&state.pool, id, false)
        .await?
        .ensure_none()?;

    let mut tx = state.pool.begin().await?;
    if !ProgramRepo::soft_delete(&mut *tx, id).await? {
        return Err(AppError::not_found(ENTITY, id));
    }
    ActivityLogger::new(Some(auth.user_id), &ctx)
        .deleted(&mut tx, &program)
        .await?;
    tx.commit().await?;

    tracing::info!(program_id = id, user_id = auth.user_id, "Program moved to trash");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/programs/{id}/restore
pub async fn restore(
    State(state): State<AppState>,
    auth: AuthUser,
    RequestContext(ctx): RequestContext,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Program>>> {
    authorize(&ProgramPolicy, &auth.actor(), Ability::Restore)?;
    ensure_parent_not_trashed(&state.pool, "programs", id).await?;

    let mut tx = state.pool.begin().await?;
    if !ProgramRepo::restore(&mut *tx, id).await? {
        return Err(AppError::not_found(ENTITY, id));
    }
    let program = ProgramRepo::find_by_id(&mut *tx, id)
        .await?
        .ok_or_else(|| AppError::not_found(ENTITY, id))?;

    ActivityLogger::new(Some(auth.user_id), &ctx)
        .restored(&mut tx, &program)
        .await?;
    tx.commit().await?;

    tracing::info!(program_id = id, user_id = auth.user_id, "Program restored");
    Ok(Json(DataResponse::new(program)))
}

/// DELETE /api/v1/programs/{id}/force
///
/// Permanent delete. Trashed dependents also block it.
pub async fn force_delete(
    State(state): State<AppState>,
    auth: AuthUser,
    RequestContext(ctx): RequestContext,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    authorize(&ProgramPolicy, &auth.actor(), Ability::ForceDelete)?;
    let program = ProgramRepo::find_by_id_include_deleted(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(ENTITY, id))?;

    ProgramRepo::dependents(&state.pool, id, true)
        .await?
        .ensure_none()?;

    let mut tx = state.pool.begin().await?;
    ProgramRepo::hard_delete(&mut *tx, id).await?;
    ActivityLogger::new(Some(auth.user_id), &ctx)
        .force_deleted(&mut tx, &program)
        .await?;
    tx.commit().await?;

    tracing::info!(program_id = id, user_id = auth.user_id, "Program permanently deleted");
    Ok(StatusCode::NO_CONTENT)
}
