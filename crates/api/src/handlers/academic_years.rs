//! Handlers for the `/academic-years` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use erasmus_core::academic_year::parse_year_code;
use erasmus_core::listing::{ListOptions, ListParams, Page};
use erasmus_core::policy::{authorize, AcademicYearPolicy, Ability};
use erasmus_core::types::DbId;
use erasmus_core::validation::validate_range;
use erasmus_db::models::academic_year::{
    AcademicYear, AcademicYearFilter, CreateAcademicYear, UpdateAcademicYear, ACADEMIC_YEAR_SORT,
};
use erasmus_db::repositories::AcademicYearRepo;
use validator::Validate;

use super::ensure_parent_not_trashed;
use crate::activity::ActivityLogger;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::context::RequestContext;
use crate::response::DataResponse;
use crate::state::AppState;

const ENTITY: &str = "AcademicYear";

/// GET /api/v1/academic-years
pub async fn index(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<ListParams>,
    Query(filter): Query<AcademicYearFilter>,
) -> AppResult<Json<Page<AcademicYear>>> {
    authorize(&AcademicYearPolicy, &auth.actor(), Ability::ViewAny)?;
    let options = ListOptions::resolve(&params, &ACADEMIC_YEAR_SORT)?;
    let page = AcademicYearRepo::list(&state.pool, &filter, &options).await?;
    Ok(Json(page))
}

/// POST /api/v1/academic-years
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    RequestContext(ctx): RequestContext,
    Json(input): Json<CreateAcademicYear>,
) -> AppResult<(StatusCode, Json<DataResponse<AcademicYear>>)> {
    authorize(&AcademicYearPolicy, &auth.actor(), Ability::Create)?;
    input.validate()?;
    parse_year_code(&input.year)?;
    validate_range(
        "start_date",
        Some(input.start_date),
        "end_date",
        Some(input.end_date),
    )?;

    let mut tx = state.pool.begin().await?;
    let year = AcademicYearRepo::create(&mut *tx, &input).await?;
    ActivityLogger::new(Some(auth.user_id), &ctx)
        .created(&mut tx, &year)
        .await?;
    tx.commit().await?;

    tracing::info!(
        academic_year_id = year.id,
        year = %year.year,
        user_id = auth.user_id,
        "Academic year created"
    );
    Ok((StatusCode::CREATED, Json(DataResponse::new(year))))
}

/// GET /api/v1/academic-years/{id}
pub async fn show(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<AcademicYear>>> {
    authorize(&AcademicYearPolicy, &auth.actor(), Ability::View)?;
    let year = AcademicYearRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(ENTITY, id))?;
    Ok(Json(DataResponse::new(year)))
}

/// PUT /api/v1/academic-years/{id}
///
/// The date range is checked against the stored values for any side the
/// request leaves out.
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    RequestContext(ctx): RequestContext,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateAcademicYear>,
) -> AppResult<Json<DataResponse<AcademicYear>>> {
    authorize(&AcademicYearPolicy, &auth.actor(), Ability::Update)?;
    input.validate()?;
    if let Some(code) = &input.year {
        parse_year_code(code)?;
    }

    let before = AcademicYearRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(ENTITY, id))?;
    validate_range(
        "start_date",
        Some(input.start_date.unwrap_or(before.start_date)),
        "end_date",
        Some(input.end_date.unwrap_or(before.end_date)),
    )?;

    let mut tx = state.pool.begin().await?;
    let year = AcademicYearRepo::update(&mut *tx, id, &input)
        .await?
        .ok_or_else(|| AppError::not_found(ENTITY, id))?;
    ActivityLogger::new(Some(auth.user_id), &ctx)
        .updated(&mut tx, &before, &year)
        .await?;
    tx.commit().await?;

    tracing::info!(academic_year_id = id, user_id = auth.user_id, "Academic year updated");
    Ok(Json(DataResponse::new(year)))
}

/// POST /api/v1/academic-years/{id}/set-current
///
/// Marks this year as current and clears the flag on every other year.
pub async fn set_current(
    State(state): State<AppState>,
    auth: AuthUser,
    RequestContext(ctx): RequestContext,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<AcademicYear>>> {
    authorize(&AcademicYearPolicy, &auth.actor(), Ability::Update)?;
    let before = AcademicYearRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(ENTITY, id))?;

    let mut tx = state.pool.begin().await?;
    let year = AcademicYearRepo::set_current(&mut *tx, id)
        .await?
        .ok_or_else(|| AppError::not_found(ENTITY, id))?;
    ActivityLogger::new(Some(auth.user_id), &ctx)
        .updated(&mut tx, &before, &year)
        .await?;
    tx.commit().await?;

    tracing::info!(academic_year_id = id, user_id = auth.user_id, "Current academic year set");
    Ok(Json(DataResponse::new(year)))
}

/// DELETE /api/v1/academic-years/{id}
pub async fn destroy(
    State(state): State<AppState>,
    auth: AuthUser,
    RequestContext(ctx): RequestContext,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    authorize(&AcademicYearPolicy, &auth.actor(), Ability::Delete)?;
    let year = AcademicYearRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(ENTITY, id))?;

    AcademicYearRepo::dependents(&state.pool, id, false)
        .await?
        .ensure_none()?;

    let mut tx = state.pool.begin().await?;
    if !AcademicYearRepo::soft_delete(&mut *tx, id).await? {
        return Err(AppError::not_found(ENTITY, id));
    }
    ActivityLogger::new(Some(auth.user_id), &ctx)
        .deleted(&mut tx, &year)
        .await?;
    tx.commit().await?;

    tracing::info!(academic_year_id = id, user_id = auth.user_id, "Academic year moved to trash");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/academic-years/{id}/restore
pub async fn restore(
    State(state): State<AppState>,
    auth: AuthUser,
    RequestContext(ctx): RequestContext,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<AcademicYear>>> {
    authorize(&AcademicYearPolicy, &auth.actor(), Ability::Restore)?;
    ensure_parent_not_trashed(&state.pool, "academic_years", id).await?;

    let mut tx = state.pool.begin().await?;
    if !AcademicYearRepo::restore(&mut *tx, id).await? {
        return Err(AppError::not_found(ENTITY, id));
    }
    let year = AcademicYearRepo::find_by_id(&mut *tx, id)
        .await?
        .ok_or_else(|| AppError::not_found(ENTITY, id))?;
    ActivityLogger::new(Some(auth.user_id), &ctx)
        .restored(&mut tx, &year)
        .await?;
    tx.commit().await?;

    tracing::info!(academic_year_id = id, user_id = auth.user_id, "Academic year restored");
    Ok(Json(DataResponse::new(year)))
}

/// DELETE /api/v1/academic-years/{id}/force
pub async fn force_delete(
    State(state): State<AppState>,
    auth: AuthUser,
    RequestContext(ctx): RequestContext,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    authorize(&AcademicYearPolicy, &auth.actor(), Ability::ForceDelete)?;
    let year = AcademicYearRepo::find_by_id_include_deleted(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(ENTITY, id))?;

    AcademicYearRepo::dependents(&state.pool, id, true)
        .await?
        .ensure_none()?;

    let mut tx = state.pool.begin().await?;
    AcademicYearRepo::hard_delete(&mut *tx, id).await?;
    ActivityLogger::new(Some(auth.user_id), &ctx)
        .force_deleted(&mut tx, &year)
        .await?;
    tx.commit().await?;

    tracing::info!(
        academic_year_id = id,
        user_id = auth.user_id,
        "Academic year permanently deleted"
    );
    Ok(StatusCode::NO_CONTENT)
}
