//! Handlers for the `/document-categories` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use erasmus_core::listing::{ListOptions, ListParams, Page};
use erasmus_core::policy::{authorize, Ability, DocumentCategoryPolicy};
use erasmus_core::slug::next_available;
use erasmus_core::types::DbId;
use erasmus_db::models::document_category::{
    CreateDocumentCategory, DocumentCategory, UpdateDocumentCategory, DOCUMENT_CATEGORY_SORT,
};
use erasmus_db::repositories::DocumentCategoryRepo;
use validator::Validate;

use super::{ensure_parent_not_trashed, slug_base};
use crate::activity::ActivityLogger;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::context::RequestContext;
use crate::response::DataResponse;
use crate::state::AppState;

const ENTITY: &str = "DocumentCategory";

async fn find_category(state: &AppState, id: DbId) -> AppResult<DocumentCategory> {
    DocumentCategoryRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(ENTITY, id))
}

/// GET /api/v1/document-categories
pub async fn index(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<ListParams>,
) -> AppResult<Json<Page<DocumentCategory>>> {
    authorize(&DocumentCategoryPolicy, &auth.actor(), Ability::ViewAny)?;
    let options = ListOptions::resolve(&params, &DOCUMENT_CATEGORY_SORT)?;
    let page = DocumentCategoryRepo::list(&state.pool, &options).await?;
    Ok(Json(page))
}

/// POST /api/v1/document-categories
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    RequestContext(ctx): RequestContext,
    Json(input): Json<CreateDocumentCategory>,
) -> AppResult<(StatusCode, Json<DataResponse<DocumentCategory>>)> {
    authorize(&DocumentCategoryPolicy, &auth.actor(), Ability::Create)?;
    input.validate()?;

    let base = slug_base(input.slug.as_deref(), &input.name)?;
    let taken = DocumentCategoryRepo::slugs_like(&state.pool, &base).await?;
    let slug = next_available(&base, &taken);

    let mut tx = state.pool.begin().await?;
    let category = DocumentCategoryRepo::create(&mut *tx, &input, &slug).await?;
    ActivityLogger::new(Some(auth.user_id), &ctx)
        .created(&mut tx, &category)
        .await?;
    tx.commit().await?;

    tracing::info!(category_id = category.id, user_id = auth.user_id, "Document category created");
    Ok((StatusCode::CREATED, Json(DataResponse::new(category))))
}

/// GET /api/v1/document-categories/{id}
pub async fn show(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<DocumentCategory>>> {
    authorize(&DocumentCategoryPolicy, &auth.actor(), Ability::View)?;
    let category = find_category(&state, id).await?;
    Ok(Json(DataResponse::new(category)))
}

/// PUT /api/v1/document-categories/{id}
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    RequestContext(ctx): RequestContext,
    Path(id): Path<DbId>,
    Json(mut input): Json<UpdateDocumentCategory>,
) -> AppResult<Json<DataResponse<DocumentCategory>>> {
    authorize(&DocumentCategoryPolicy, &auth.actor(), Ability::Update)?;
    input.validate()?;
    if let Some(slug) = input.slug.take() {
        input.slug = Some(slug_base(Some(&slug), &slug)?);
    }

    let before = find_category(&state, id).await?;
    let mut tx = state.pool.begin().await?;
    let category = DocumentCategoryRepo::update(&mut *tx, id, &input)
        .await?
        .ok_or_else(|| AppError::not_found(ENTITY, id))?;
    ActivityLogger::new(Some(auth.user_id), &ctx)
        .updated(&mut tx, &before, &category)
        .await?;
    tx.commit().await?;

    tracing::info!(category_id = id, user_id = auth.user_id, "Document category updated");
    Ok(Json(DataResponse::new(category)))
}

/// DELETE /api/v1/document-categories/{id}
///
/// Refused while live documents belong to the category.
pub async fn destroy(
    State(state): State<AppState>,
    auth: AuthUser,
    RequestContext(ctx): RequestContext,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    authorize(&DocumentCategoryPolicy, &auth.actor(), Ability::Delete)?;
    let category = find_category(&state, id).await?;

    DocumentCategoryRepo::dependents(&state.pool, id, false)
        .await?
        .ensure_none()?;

    let mut tx = state.pool.begin().await?;
    if !DocumentCategoryRepo::soft_delete(&mut *tx, id).await? {
        return Err(AppError::not_found(ENTITY, id));
    }
    ActivityLogger::new(Some(auth.user_id), &ctx)
        .deleted(&mut tx, &category)
        .await?;
    tx.commit().await?;

    tracing::info!(category_id = id, user_id = auth.user_id, "Document category moved to trash");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/document-categories/{id}/restore
pub async fn restore(
    State(state): State<AppState>,
    auth: AuthUser,
    RequestContext(ctx): RequestContext,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<DocumentCategory>>> {
    authorize(&DocumentCategoryPolicy, &auth.actor(), Ability::Restore)?;
    ensure_parent_not_trashed(&state.pool, "document_categories", id).await?;

    let mut tx = state.pool.begin().await?;
    if !DocumentCategoryRepo::restore(&mut *tx, id).await? {
        return Err(AppError::not_found(ENTITY, id));
    }
    let category = DocumentCategoryRepo::find_by_id(&mut *tx, id)
        .await?
        .ok_or_else(|| AppError::not_found(ENTITY, id))?;
    ActivityLogger::new(Some(auth.user_id), &ctx)
        .restored(&mut tx, &category)
        .await?;
    tx.commit().await?;

    tracing::info!(category_id = id, user_id = auth.user_id, "Document category restored");
    Ok(Json(DataResponse::new(category)))
}

/// DELETE /api/v1/document-categories/{id}/force
pub async fn force_delete(
    State(state): State<AppState>,
    auth: AuthUser,
    RequestContext(ctx): RequestContext,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    authorize(&DocumentCategoryPolicy, &auth.actor(), Ability::ForceDelete)?;
    let category = DocumentCategoryRepo::find_by_id_include_deleted(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(ENTITY, id))?;

    DocumentCategoryRepo::dependents(&state.pool, id, true)
        .await?
        .ensure_none()?;

    let mut tx = state.pool.begin().await?;
    DocumentCategoryRepo::hard_delete(&mut *tx, id).await?;
    ActivityLogger::new(Some(auth.user_id), &ctx)
        .force_deleted(&mut tx, &category)
        .await?;
    tx.commit().await?;

    tracing::info!(
        category_id = id,
        user_id = auth.user_id,
        "Document category permanently deleted"
    );
    Ok(StatusCode::NO_CONTENT)
}
