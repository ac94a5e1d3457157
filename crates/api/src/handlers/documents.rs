//! Handlers for the `/documents` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use erasmus_core::document::{validate_version, DocumentType};
use erasmus_core::listing::{ListOptions, ListParams, Page};
use erasmus_core::policy::{authorize, Ability, DocumentPolicy};
use erasmus_core::slug::next_available;
use erasmus_core::types::DbId;
use erasmus_db::models::document::{
    CreateDocument, Document, DocumentFilter, UpdateDocument, DOCUMENT_SORT,
};
use erasmus_db::repositories::DocumentRepo;
use serde::Serialize;
use validator::Validate;

use super::{ensure_parent_not_trashed, slug_base};
use crate::activity::ActivityLogger;
use crate::error::{AppError, AppResult};
use crate::exports::csv_response;
use crate::exports::sheets::{document_row, DOCUMENTS_FILENAME, DOCUMENT_HEADERS};
use crate::middleware::auth::AuthUser;
use crate::middleware::context::RequestContext;
use crate::response::DataResponse;
use crate::state::AppState;

const ENTITY: &str = "Document";

/// Response body for `POST /documents/{id}/download`.
#[derive(Debug, Serialize)]
pub struct DownloadCount {
    pub id: DbId,
    pub download_count: i64,
}

async fn find_document(state: &AppState, id: DbId) -> AppResult<Document> {
    DocumentRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(ENTITY, id))
}

/// GET /api/v1/documents
pub async fn index(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<ListParams>,
    Query(filter): Query<DocumentFilter>,
) -> AppResult<Json<Page<Document>>> {
    authorize(&DocumentPolicy, &auth.actor(), Ability::ViewAny)?;
    let options = ListOptions::resolve(&params, &DOCUMENT_SORT)?;
    let page = DocumentRepo::list(&state.pool, &filter, &options).await?;
    Ok(Json(page))
}

/// GET /api/v1/documents/export
pub async fn export(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<ListParams>,
    Query(filter): Query<DocumentFilter>,
) -> AppResult<Response> {
    authorize(&DocumentPolicy, &auth.actor(), Ability::Export)?;
    let options = ListOptions::for_export(&params, &DOCUMENT_SORT)?;
    let rows = DocumentRepo::export(&state.pool, &filter, &options).await?;

    tracing::info!(rows = rows.len(), user_id = auth.user_id, "Documents exported");
    csv_response(DOCUMENTS_FILENAME, DOCUMENT_HEADERS, rows.iter().map(document_row))
}

/// POST /api/v1/documents
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    RequestContext(ctx): RequestContext,
    Json(input): Json<CreateDocument>,
) -> AppResult<(StatusCode, Json<DataResponse<Document>>)> {
    authorize(&DocumentPolicy, &auth.actor(), Ability::Create)?;
    input.validate()?;
    DocumentType::parse(&input.document_type)?;
    if let Some(version) = &input.version {
        validate_version(version)?;
    }

    let base = slug_base(input.slug.as_deref(), &input.title)?;
    let taken = DocumentRepo::slugs_like(&state.pool, &base).await?;
    let slug = next_available(&base, &taken);

    let mut tx = state.pool.begin().await?;
    let document = DocumentRepo::create(&mut *tx, &input, &slug, auth.user_id).await?;
    ActivityLogger::new(Some(auth.user_id), &ctx)
        .created(&mut tx, &document)
        .await?;
    tx.commit().await?;

    tracing::info!(document_id = document.id, user_id = auth.user_id, "Document created");
    Ok((StatusCode::CREATED, Json(DataResponse::new(document))))
}

/// GET /api/v1/documents/{id}
pub async fn show(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Document>>> {
    authorize(&DocumentPolicy, &auth.actor(), Ability::View)?;
    let document = find_document(&state, id).await?;
    Ok(Json(DataResponse::new(document)))
}

/// PUT /api/v1/documents/{id}
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    RequestContext(ctx): RequestContext,
    Path(id): Path<DbId>,
    Json(mut input): Json<UpdateDocument>,
) -> AppResult<Json<DataResponse<Document>>> {
    authorize(&DocumentPolicy, &auth.actor(), Ability::Update)?;
    input.validate()?;
    if let Some(document_type) = &input.document_type {
        DocumentType::parse(document_type)?;
    }
    if let Some(version) = &input.version {
        validate_version(version)?;
    }
    if let Some(slug) = input.slug.take() {
        input.slug = Some(slug_base(Some(&slug), &slug)?);
    }

    let before = find_document(&state, id).await?;
    let mut tx = state.pool.begin().await?;
    let document = DocumentRepo::update(&mut *tx, id, &input, auth.user_id)
        .await?
        .ok_or_else(|| AppError::not_found(ENTITY, id))?;
    ActivityLogger::new(Some(auth.user_id), &ctx)
        .updated(&mut tx, &before, &document)
        .await?;
    tx.commit().await?;

    tracing::info!(document_id = id, user_id = auth.user_id, "Document updated");
    Ok(Json(DataResponse::new(document)))
}

/// POST /api/v1/documents/{id}/download
///
/// Count one download. Not recorded in the activity log.
pub async fn register_download(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<DownloadCount>>> {
    authorize(&DocumentPolicy, &auth.actor(), Ability::View)?;
    let download_count = DocumentRepo::increment_download(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(ENTITY, id))?;

    tracing::debug!(document_id = id, download_count, "Document download counted");
    Ok(Json(DataResponse::new(DownloadCount { id, download_count })))
}

/// DELETE /api/v1/documents/{id}
pub async fn destroy(
    State(state): State<AppState>,
    auth: AuthUser,
    RequestContext(ctx): RequestContext,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    authorize(&DocumentPolicy, &auth.actor(), Ability::Delete)?;
    let document = find_document(&state, id).await?;

    let mut tx = state.pool.begin().await?;
    if !DocumentRepo::soft_delete(&mut *tx, id).await? {
        return Err(AppError::not_found(ENTITY, id));
    }
    ActivityLogger::new(Some(auth.user_id), &ctx)
        .deleted(&mut tx, &document)
        .await?;
    tx.commit().await?;

    tracing::info!(document_id = id, user_id = auth.user_id, "Document moved to trash");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/documents/{id}/restore
///
/// 409 while the document's category is in the trash.
pub async fn restore(
    State(state): State<AppState>,
    auth: AuthUser,
    RequestContext(ctx): RequestContext,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Document>>> {
    authorize(&DocumentPolicy, &auth.actor(), Ability::Restore)?;
    ensure_parent_not_trashed(&state.pool, "documents", id).await?;

    let mut tx = state.pool.begin().await?;
    if !DocumentRepo::restore(&mut *tx, id).await? {
        return Err(AppError::not_found(ENTITY, id));
    }
    let document = DocumentRepo::find_by_id(&mut *tx, id)
        .await?
        .ok_or_else(|| AppError::not_found(ENTITY, id))?;
    ActivityLogger::new(Some(auth.user_id), &ctx)
        .restored(&mut tx, &document)
        .await?;
    tx.commit().await?;

    tracing::info!(document_id = id, user_id = auth.user_id, "Document restored");
    Ok(Json(DataResponse::new(document)))
}

/// DELETE /api/v1/documents/{id}/force
pub async fn force_delete(
    State(state): State<AppState>,
    auth: AuthUser,
    RequestContext(ctx): RequestContext,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    authorize(&DocumentPolicy, &auth.actor(), Ability::ForceDelete)?;
    let document = DocumentRepo::find_by_id_include_deleted(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(ENTITY, id))?;

    let mut tx = state.pool.begin().await?;
    DocumentRepo::hard_delete(&mut *tx, id).await?;
    ActivityLogger::new(Some(auth.user_id), &ctx)
        .force_deleted(&mut tx, &document)
        .await?;
    tx.commit().await?;

    tracing::info!(document_id = id, user_id = auth.user_id, "Document permanently deleted");
    Ok(StatusCode::NO_CONTENT)
}
