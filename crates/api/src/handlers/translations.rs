//! Handlers for the `/translations` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use erasmus_core::listing::{ListOptions, ListParams, Page};
use erasmus_core::policy::{authorize, Ability, TranslationPolicy};
use erasmus_core::translation::{validate_locale, validate_translatable};
use erasmus_core::types::DbId;
use erasmus_db::models::translation::{
    CreateTranslation, Translation, TranslationFilter, UpdateTranslation, TRANSLATION_SORT,
};
use erasmus_db::repositories::TranslationRepo;
use validator::Validate;

use crate::activity::ActivityLogger;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::context::RequestContext;
use crate::response::DataResponse;
use crate::state::AppState;

const ENTITY: &str = "Translation";

fn check_target(input: &CreateTranslation) -> AppResult<()> {
    input.validate()?;
    validate_locale(&input.locale)?;
    validate_translatable(&input.translatable_type, &input.field)?;
    Ok(())
}

/// GET /api/v1/translations
pub async fn index(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<ListParams>,
    Query(filter): Query<TranslationFilter>,
) -> AppResult<Json<Page<Translation>>> {
    authorize(&TranslationPolicy, &auth.actor(), Ability::ViewAny)?;
    let options = ListOptions::resolve(&params, &TRANSLATION_SORT)?;
    let page = TranslationRepo::list(&state.pool, &filter, &options).await?;
    Ok(Json(page))
}

/// GET /api/v1/translations/target/{translatable_type}/{translatable_id}/{locale}
///
/// Every translated field of one record in one locale.
pub async fn for_target(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((translatable_type, translatable_id, locale)): Path<(String, DbId, String)>,
) -> AppResult<Json<DataResponse<Vec<Translation>>>> {
    authorize(&TranslationPolicy, &auth.actor(), Ability::ViewAny)?;
    validate_locale(&locale)?;
    let rows =
        TranslationRepo::for_target(&state.pool, &translatable_type, translatable_id, &locale)
            .await?;
    Ok(Json(DataResponse::new(rows)))
}

/// POST /api/v1/translations
///
/// 409 when the record already has a translation of that field and locale.
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    RequestContext(ctx): RequestContext,
    Json(input): Json<CreateTranslation>,
) -> AppResult<(StatusCode, Json<DataResponse<Translation>>)> {
    authorize(&TranslationPolicy, &auth.actor(), Ability::Create)?;
    check_target(&input)?;

    let mut tx = state.pool.begin().await?;
    let translation = TranslationRepo::create(&mut *tx, &input).await?;
    ActivityLogger::new(Some(auth.user_id), &ctx)
        .created(&mut tx, &translation)
        .await?;
    tx.commit().await?;

    tracing::info!(translation_id = translation.id, user_id = auth.user_id, "Translation created");
    Ok((StatusCode::CREATED, Json(DataResponse::new(translation))))
}

/// PUT /api/v1/translations/upsert
///
/// Create the translation or replace the value of the existing one.
pub async fn upsert(
    State(state): State<AppState>,
    auth: AuthUser,
    RequestContext(ctx): RequestContext,
    Json(input): Json<CreateTranslation>,
) -> AppResult<Json<DataResponse<Translation>>> {
    authorize(&TranslationPolicy, &auth.actor(), Ability::Update)?;
    check_target(&input)?;

    let mut tx = state.pool.begin().await?;
    let existing = TranslationRepo::for_target(
        &mut *tx,
        &input.translatable_type,
        input.translatable_id,
        &input.locale,
    )
    .await?
    .into_iter()
    .find(|t| t.field == input.field);

    let translation = TranslationRepo::upsert(&mut *tx, &input).await?;
    let logger = ActivityLogger::new(Some(auth.user_id), &ctx);
    match &existing {
        Some(before) => logger.updated(&mut tx, before, &translation).await?,
        None => logger.created(&mut tx, &translation).await?,
    }
    tx.commit().await?;

    tracing::info!(translation_id = translation.id, user_id = auth.user_id, "Translation saved");
    Ok(Json(DataResponse::new(translation)))
}

/// GET /api/v1/translations/{id}
pub async fn show(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Translation>>> {
    authorize(&TranslationPolicy, &auth.actor(), Ability::View)?;
    let translation = TranslationRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(ENTITY, id))?;
    Ok(Json(DataResponse::new(translation)))
}

/// PUT /api/v1/translations/{id}
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    RequestContext(ctx): RequestContext,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateTranslation>,
) -> AppResult<Json<DataResponse<Translation>>> {
    authorize(&TranslationPolicy, &auth.actor(), Ability::Update)?;
    input.validate()?;
    let before = TranslationRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(ENTITY, id))?;

    let mut tx = state.pool.begin().await?;
    let translation = TranslationRepo::update_value(&mut *tx, id, &input.value)
        .await?
        .ok_or_else(|| AppError::not_found(ENTITY, id))?;
    ActivityLogger::new(Some(auth.user_id), &ctx)
        .updated(&mut tx, &before, &translation)
        .await?;
    tx.commit().await?;

    tracing::info!(translation_id = id, user_id = auth.user_id, "Translation updated");
    Ok(Json(DataResponse::new(translation)))
}

/// DELETE /api/v1/translations/{id}
pub async fn destroy(
    State(state): State<AppState>,
    auth: AuthUser,
    RequestContext(ctx): RequestContext,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    authorize(&TranslationPolicy, &auth.actor(), Ability::Delete)?;
    let translation = TranslationRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(ENTITY, id))?;

    let mut tx = state.pool.begin().await?;
    TranslationRepo::delete(&mut *tx, id).await?;
    ActivityLogger::new(Some(auth.user_id), &ctx)
        .deleted(&mut tx, &translation)
        .await?;
    tx.commit().await?;

    tracing::info!(translation_id = id, user_id = auth.user_id, "Translation deleted");
    Ok(StatusCode::NO_CONTENT)
}
