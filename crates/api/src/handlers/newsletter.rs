//! Handlers for newsletter subscriptions.
//!
//! Admin endpoints live under `/newsletter/subscriptions`. The public
//! subscribe / verify / unsubscribe endpoints under `/public/newsletter`
//! need no authentication; their activity entries have no causer.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use erasmus_core::audit::{events, properties, ActivityContext};
use erasmus_core::error::CoreError;
use erasmus_core::listing::{ListOptions, ListParams, Page};
use erasmus_core::newsletter::{
    generate_token, hash_token, normalize_email, normalize_program_codes,
};
use erasmus_core::policy::{authorize, Ability, NewsletterSubscriptionPolicy};
use erasmus_core::settings::{decode_value, SettingType};
use erasmus_core::types::DbId;
use erasmus_db::models::newsletter::{
    NewsletterFilter, NewsletterSubscription, Subscribe, NEWSLETTER_SORT,
};
use erasmus_db::repositories::{NewsletterRepo, ProgramRepo, SettingRepo};
use serde::Serialize;
use serde_json::{Map, Value};
use sqlx::{PgConnection, PgPool};
use validator::Validate;

use crate::activity::ActivityLogger;
use crate::error::{AppError, AppResult};
use crate::exports::csv_response;
use crate::exports::sheets::{newsletter_row, NEWSLETTER_FILENAME, NEWSLETTER_HEADERS};
use crate::middleware::auth::AuthUser;
use crate::middleware::context::RequestContext;
use crate::response::DataResponse;
use crate::state::AppState;

const ENTITY: &str = "NewsletterSubscription";

/// Setting that switches public subscriptions on and off.
const ENABLED_SETTING: &str = "newsletter_enabled";

/// Response body for a public subscription.
///
/// Echoes only what the caller submitted, normalized. Stored fields of an
/// existing address are never disclosed. No mail is sent from this service;
/// the plaintext verification token is handed back once so the caller can
/// deliver it.
#[derive(Debug, Serialize)]
pub struct SubscribeResponse {
    pub email: String,
    pub programs: Vec<String>,
    pub verification_token: String,
}

async fn subscriptions_enabled(pool: &PgPool) -> AppResult<bool> {
    let Some(setting) = SettingRepo::find_by_key(pool, ENABLED_SETTING).await? else {
        return Ok(true);
    };
    let raw = setting.value.unwrap_or_default();
    let enabled = decode_value(SettingType::Boolean, &raw)
        .ok()
        .and_then(|v| v.as_bool())
        .unwrap_or(true);
    Ok(enabled)
}

/// Log a change to `field` made by the subscriber through a token link.
async fn log_token_action(
    conn: &mut PgConnection,
    ctx: &ActivityContext,
    subscription: &NewsletterSubscription,
    field: &str,
    value: Value,
) -> AppResult<()> {
    let mut attributes = Map::new();
    attributes.insert(field.to_string(), value);
    let mut props = Map::new();
    props.insert(properties::ATTRIBUTES.to_string(), Value::Object(attributes));

    ActivityLogger::new(None, ctx)
        .subject_entry(conn, subscription, events::UPDATED, props)
        .await?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Public
// ---------------------------------------------------------------------------

/// POST /api/v1/public/newsletter/subscribe
///
/// Subscribing an address that already exists reactivates it, replaces its
/// programs and issues a new verification token.
pub async fn subscribe(
    State(state): State<AppState>,
    RequestContext(ctx): RequestContext,
    Json(input): Json<Subscribe>,
) -> AppResult<(StatusCode, Json<DataResponse<SubscribeResponse>>)> {
    input.validate()?;
    if !subscriptions_enabled(&state.pool).await? {
        return Err(AppError::Core(CoreError::Forbidden(
            "Newsletter subscriptions are disabled".into(),
        )));
    }

    let email = normalize_email(&input.email);
    let known = ProgramRepo::active_codes(&state.pool).await?;
    let programs =
        normalize_program_codes(input.programs.as_deref().unwrap_or_default(), &known)?;
    let name = input
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty());

    let (token, token_hash) = generate_token();
    let mut tx = state.pool.begin().await?;
    let existing = NewsletterRepo::find_by_email(&mut *tx, &email).await?;
    let subscription =
        NewsletterRepo::subscribe(&mut *tx, &email, name, &programs, &token_hash).await?;
    let logger = ActivityLogger::new(None, &ctx);
    match &existing {
        Some(before) => logger.updated(&mut tx, before, &subscription).await?,
        None => logger.created(&mut tx, &subscription).await?,
    }
    tx.commit().await?;

    tracing::info!(
        subscription_id = subscription.id,
        resubscribed = existing.is_some(),
        programs = programs.len(),
        "Newsletter subscription registered"
    );
    Ok((
        StatusCode::CREATED,
        Json(DataResponse::new(SubscribeResponse {
            email,
            programs,
            verification_token: token,
        })),
    ))
}

/// GET /api/v1/public/newsletter/verify/{token}
pub async fn verify(
    State(state): State<AppState>,
    RequestContext(ctx): RequestContext,
    Path(token): Path<String>,
) -> AppResult<Json<DataResponse<NewsletterSubscription>>> {
    let mut tx = state.pool.begin().await?;
    let subscription = NewsletterRepo::verify_by_token_hash(&mut *tx, &hash_token(&token))
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Validation(
                "Invalid or expired verification token".into(),
            ))
        })?;

    let verified_at = serde_json::to_value(subscription.verified_at).unwrap_or(Value::Null);
    log_token_action(&mut tx, &ctx, &subscription, "verified_at", verified_at).await?;
    tx.commit().await?;

    tracing::info!(subscription_id = subscription.id, "Newsletter subscription verified");
    Ok(Json(DataResponse::new(subscription)))
}

/// GET /api/v1/public/newsletter/unsubscribe/{token}
pub async fn unsubscribe(
    State(state): State<AppState>,
    RequestContext(ctx): RequestContext,
    Path(token): Path<String>,
) -> AppResult<Json<DataResponse<NewsletterSubscription>>> {
    let mut tx = state.pool.begin().await?;
    let subscription = NewsletterRepo::unsubscribe_by_token_hash(&mut *tx, &hash_token(&token))
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Validation("Invalid unsubscribe token".into()))
        })?;

    log_token_action(&mut tx, &ctx, &subscription, "is_active", Value::Bool(false)).await?;
    tx.commit().await?;

    tracing::info!(subscription_id = subscription.id, "Newsletter subscription cancelled");
    Ok(Json(DataResponse::new(subscription)))
}

// ---------------------------------------------------------------------------
// Admin
// ---------------------------------------------------------------------------

/// GET /api/v1/newsletter/subscriptions
pub async fn index(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<ListParams>,
    Query(filter): Query<NewsletterFilter>,
) -> AppResult<Json<Page<NewsletterSubscription>>> {
    authorize(&NewsletterSubscriptionPolicy, &auth.actor(), Ability::ViewAny)?;
    let options = ListOptions::resolve(&params, &NEWSLETTER_SORT)?;
    let page = NewsletterRepo::list(&state.pool, &filter, &options).await?;
    Ok(Json(page))
}

/// GET /api/v1/newsletter/subscriptions/export
pub async fn export(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<ListParams>,
    Query(filter): Query<NewsletterFilter>,
) -> AppResult<Response> {
    authorize(&NewsletterSubscriptionPolicy, &auth.actor(), Ability::Export)?;
    let options = ListOptions::for_export(&params, &NEWSLETTER_SORT)?;
    let rows = NewsletterRepo::export(&state.pool, &filter, &options).await?;

    tracing::info!(rows = rows.len(), user_id = auth.user_id, "Newsletter subscriptions exported");
    csv_response(
        NEWSLETTER_FILENAME,
        NEWSLETTER_HEADERS,
        rows.iter().map(newsletter_row),
    )
}

/// GET /api/v1/newsletter/subscriptions/{id}
pub async fn show(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<NewsletterSubscription>>> {
    authorize(&NewsletterSubscriptionPolicy, &auth.actor(), Ability::View)?;
    let subscription = NewsletterRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(ENTITY, id))?;
    Ok(Json(DataResponse::new(subscription)))
}

/// DELETE /api/v1/newsletter/subscriptions/{id}
///
/// Subscriptions are removed permanently.
pub async fn destroy(
    State(state): State<AppState>,
    auth: AuthUser,
    RequestContext(ctx): RequestContext,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    authorize(&NewsletterSubscriptionPolicy, &auth.actor(), Ability::Delete)?;
    let subscription = NewsletterRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(ENTITY, id))?;

    let mut tx = state.pool.begin().await?;
    NewsletterRepo::delete(&mut *tx, id).await?;
    ActivityLogger::new(Some(auth.user_id), &ctx)
        .deleted(&mut tx, &subscription)
        .await?;
    tx.commit().await?;

    tracing::info!(subscription_id = id, user_id = auth.user_id, "Newsletter subscription deleted");
    Ok(StatusCode::NO_CONTENT)
}
