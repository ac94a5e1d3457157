//! Handlers for the `/news-posts` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use chrono::Utc;
use erasmus_core::listing::{ListOptions, ListParams, Page};
use erasmus_core::news::{
    published, published_at_for_status, unpublished, MobilityCategory, MobilityType, NewsStatus,
};
use erasmus_core::policy::{authorize, Ability, NewsPostPolicy};
use erasmus_core::slug::next_available;
use erasmus_core::types::DbId;
use erasmus_db::models::news_post::{
    CreateNewsPost, NewsPost, NewsPostFilter, UpdateNewsPost, NEWS_POST_SORT,
};
use erasmus_db::repositories::news_post_repo::NewNewsPostFields;
use erasmus_db::repositories::NewsPostRepo;
use validator::Validate;

use super::{ensure_parent_not_trashed, slug_base};
use crate::activity::ActivityLogger;
use crate::error::{AppError, AppResult};
use crate::exports::csv_response;
use crate::exports::sheets::{news_post_row, NEWS_POSTS_FILENAME, NEWS_POST_HEADERS};
use crate::middleware::auth::AuthUser;
use crate::middleware::context::RequestContext;
use crate::response::DataResponse;
use crate::state::AppState;

const ENTITY: &str = "NewsPost";

async fn find_post(state: &AppState, id: DbId) -> AppResult<NewsPost> {
    NewsPostRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(ENTITY, id))
}

fn check_mobility(
    mobility_type: Option<&str>,
    mobility_category: Option<&str>,
) -> AppResult<()> {
    if let Some(value) = mobility_type {
        MobilityType::parse(value)?;
    }
    if let Some(value) = mobility_category {
        MobilityCategory::parse(value)?;
    }
    Ok(())
}

/// GET /api/v1/news-posts
pub async fn index(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<ListParams>,
    Query(filter): Query<NewsPostFilter>,
) -> AppResult<Json<Page<NewsPost>>> {
    authorize(&NewsPostPolicy, &auth.actor(), Ability::ViewAny)?;
    let options = ListOptions::resolve(&params, &NEWS_POST_SORT)?;
    let page = NewsPostRepo::list(&state.pool, &filter, &options).await?;
    Ok(Json(page))
}

/// GET /api/v1/news-posts/export
pub async fn export(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<ListParams>,
    Query(filter): Query<NewsPostFilter>,
) -> AppResult<Response> {
    authorize(&NewsPostPolicy, &auth.actor(), Ability::Export)?;
    let options = ListOptions::for_export(&params, &NEWS_POST_SORT)?;
    let rows = NewsPostRepo::export(&state.pool, &filter, &options).await?;

    tracing::info!(rows = rows.len(), user_id = auth.user_id, "News posts exported");
    csv_response(
        NEWS_POSTS_FILENAME,
        NEWS_POST_HEADERS,
        rows.iter().map(news_post_row),
    )
}

/// POST /api/v1/news-posts
///
/// The current user becomes the author. Creating a post as `publicado`
/// stamps `published_at`.
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    RequestContext(ctx): RequestContext,
    Json(input): Json<CreateNewsPost>,
) -> AppResult<(StatusCode, Json<DataResponse<NewsPost>>)> {
    authorize(&NewsPostPolicy, &auth.actor(), Ability::Create)?;
    input.validate()?;
    check_mobility(
        input.mobility_type.as_deref(),
        input.mobility_category.as_deref(),
    )?;
    let status = match input.status.as_deref() {
        Some(raw) => NewsStatus::parse(raw)?,
        None => NewsStatus::Borrador,
    };

    let base = slug_base(input.slug.as_deref(), &input.title)?;
    let taken = NewsPostRepo::slugs_like(&state.pool, &base).await?;
    let fields = NewNewsPostFields {
        slug: next_available(&base, &taken),
        status: status.as_str().to_string(),
        published_at: published_at_for_status(status, None, Utc::now()),
        author_id: auth.user_id,
    };

    let mut tx = state.pool.begin().await?;
    let post = NewsPostRepo::create(&mut *tx, &input, &fields).await?;
    ActivityLogger::new(Some(auth.user_id), &ctx)
        .created(&mut tx, &post)
        .await?;
    tx.commit().await?;

    tracing::info!(news_post_id = post.id, user_id = auth.user_id, "News post created");
    Ok((StatusCode::CREATED, Json(DataResponse::new(post))))
}

/// GET /api/v1/news-posts/{id}
pub async fn show(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<NewsPost>>> {
    authorize(&NewsPostPolicy, &auth.actor(), Ability::View)?;
    let post = find_post(&state, id).await?;
    Ok(Json(DataResponse::new(post)))
}

/// PUT /api/v1/news-posts/{id}
///
/// A status change through an edit keeps `published_at` consistent with
/// the new status.
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    RequestContext(ctx): RequestContext,
    Path(id): Path<DbId>,
    Json(mut input): Json<UpdateNewsPost>,
) -> AppResult<Json<DataResponse<NewsPost>>> {
    authorize(&NewsPostPolicy, &auth.actor(), Ability::Update)?;
    input.validate()?;
    check_mobility(
        input.mobility_type.as_deref(),
        input.mobility_category.as_deref(),
    )?;
    if let Some(slug) = input.slug.take() {
        input.slug = Some(slug_base(Some(&slug), &slug)?);
    }

    let before = find_post(&state, id).await?;
    let status = NewsStatus::parse(input.status.as_deref().unwrap_or(&before.status))?;
    let published_at = published_at_for_status(status, before.published_at, Utc::now());

    let mut tx = state.pool.begin().await?;
    let post = NewsPostRepo::update(&mut *tx, id, &input, status.as_str(), published_at)
        .await?
        .ok_or_else(|| AppError::not_found(ENTITY, id))?;
    ActivityLogger::new(Some(auth.user_id), &ctx)
        .updated(&mut tx, &before, &post)
        .await?;
    tx.commit().await?;

    tracing::info!(news_post_id = id, user_id = auth.user_id, "News post updated");
    Ok(Json(DataResponse::new(post)))
}

/// POST /api/v1/news-posts/{id}/publish
///
/// The publishing user is recorded as reviewer.
pub async fn publish(
    State(state): State<AppState>,
    auth: AuthUser,
    RequestContext(ctx): RequestContext,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<NewsPost>>> {
    authorize(&NewsPostPolicy, &auth.actor(), Ability::Publish)?;
    find_post(&state, id).await?;
    let (status, published_at) = published(Utc::now());

    let mut tx = state.pool.begin().await?;
    let post = NewsPostRepo::set_publication(
        &mut *tx,
        id,
        status.as_str(),
        published_at,
        Some(auth.user_id),
    )
    .await?
    .ok_or_else(|| AppError::not_found(ENTITY, id))?;
    ActivityLogger::new(Some(auth.user_id), &ctx)
        .published(&mut tx, &post)
        .await?;
    tx.commit().await?;

    tracing::info!(news_post_id = id, user_id = auth.user_id, "News post published");
    Ok(Json(DataResponse::new(post)))
}

/// POST /api/v1/news-posts/{id}/unpublish
pub async fn unpublish(
    State(state): State<AppState>,
    auth: AuthUser,
    RequestContext(ctx): RequestContext,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<NewsPost>>> {
    authorize(&NewsPostPolicy, &auth.actor(), Ability::Publish)?;
    find_post(&state, id).await?;
    let (status, published_at) = unpublished();

    let mut tx = state.pool.begin().await?;
    let post = NewsPostRepo::set_publication(&mut *tx, id, status.as_str(), published_at, None)
        .await?
        .ok_or_else(|| AppError::not_found(ENTITY, id))?;
    ActivityLogger::new(Some(auth.user_id), &ctx)
        .unpublished(&mut tx, &post)
        .await?;
    tx.commit().await?;

    tracing::info!(news_post_id = id, user_id = auth.user_id, "News post unpublished");
    Ok(Json(DataResponse::new(post)))
}

/// DELETE /api/v1/news-posts/{id}
pub async fn destroy(
    State(state): State<AppState>,
    auth: AuthUser,
    RequestContext(ctx): RequestContext,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    authorize(&NewsPostPolicy, &auth.actor(), Ability::Delete)?;
    let post = find_post(&state, id).await?;

    let mut tx = state.pool.begin().await?;
    if !NewsPostRepo::soft_delete(&mut *tx, id).await? {
        return Err(AppError::not_found(ENTITY, id));
    }
    ActivityLogger::new(Some(auth.user_id), &ctx)
        .deleted(&mut tx, &post)
        .await?;
    tx.commit().await?;

    tracing::info!(news_post_id = id, user_id = auth.user_id, "News post moved to trash");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/news-posts/{id}/restore
pub async fn restore(
    State(state): State<AppState>,
    auth: AuthUser,
    RequestContext(ctx): RequestContext,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<NewsPost>>> {
    authorize(&NewsPostPolicy, &auth.actor(), Ability::Restore)?;
    ensure_parent_not_trashed(&state.pool, "news_posts", id).await?;

    let mut tx = state.pool.begin().await?;
    if !NewsPostRepo::restore(&mut *tx, id).await? {
        return Err(AppError::not_found(ENTITY, id));
    }
    let post = NewsPostRepo::find_by_id(&mut *tx, id)
        .await?
        .ok_or_else(|| AppError::not_found(ENTITY, id))?;
    ActivityLogger::new(Some(auth.user_id), &ctx)
        .restored(&mut tx, &post)
        .await?;
    tx.commit().await?;

    tracing::info!(news_post_id = id, user_id = auth.user_id, "News post restored");
    Ok(Json(DataResponse::new(post)))
}

/// DELETE /api/v1/news-posts/{id}/force
pub async fn force_delete(
    State(state): State<AppState>,
    auth: AuthUser,
    RequestContext(ctx): RequestContext,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    authorize(&NewsPostPolicy, &auth.actor(), Ability::ForceDelete)?;
    let post = NewsPostRepo::find_by_id_include_deleted(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(ENTITY, id))?;

    let mut tx = state.pool.begin().await?;
    NewsPostRepo::hard_delete(&mut *tx, id).await?;
    ActivityLogger::new(Some(auth.user_id), &ctx)
        .force_deleted(&mut tx, &post)
        .await?;
    tx.commit().await?;

    tracing::info!(news_post_id = id, user_id = auth.user_id, "News post permanently deleted");
    Ok(StatusCode::NO_CONTENT)
}
