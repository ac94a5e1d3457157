//! Handlers for the `/settings` resource.
//!
//! Values are stored as text and exposed decoded according to each
//! setting's declared type.

use axum::extract::{Path, Query, State};
use axum::Json;
use erasmus_core::policy::{authorize, Ability, SettingPolicy};
use erasmus_core::settings::{decode_value, encode_value, SettingGroup, SettingType};
use erasmus_core::types::{DbId, Timestamp};
use erasmus_db::models::setting::{Setting, SettingFilter, UpdateSetting};
use erasmus_db::repositories::SettingRepo;
use serde::Serialize;
use serde_json::Value;

use crate::activity::ActivityLogger;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::context::RequestContext;
use crate::response::DataResponse;
use crate::state::AppState;

/// A setting with its value decoded.
#[derive(Debug, Serialize)]
pub struct SettingView {
    pub id: DbId,
    pub key: String,
    pub value: Value,
    pub setting_type: String,
    pub setting_group: String,
    pub description: Option<String>,
    pub updated_by: Option<DbId>,
    pub updated_at: Timestamp,
}

impl From<Setting> for SettingView {
    /// Values that fail to decode are returned as raw text.
    fn from(setting: Setting) -> Self {
        let value = match (&setting.value, SettingType::parse(&setting.setting_type)) {
            (None, _) => Value::Null,
            (Some(raw), Ok(setting_type)) => {
                decode_value(setting_type, raw).unwrap_or_else(|_| Value::String(raw.clone()))
            }
            (Some(raw), Err(_)) => Value::String(raw.clone()),
        };
        SettingView {
            id: setting.id,
            key: setting.key,
            value,
            setting_type: setting.setting_type,
            setting_group: setting.setting_group,
            description: setting.description,
            updated_by: setting.updated_by,
            updated_at: setting.updated_at,
        }
    }
}

/// GET /api/v1/settings
pub async fn index(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(filter): Query<SettingFilter>,
) -> AppResult<Json<DataResponse<Vec<SettingView>>>> {
    authorize(&SettingPolicy, &auth.actor(), Ability::ViewAny)?;
    if let Some(group) = &filter.group {
        SettingGroup::parse(group)?;
    }
    let settings = SettingRepo::list(&state.pool, filter.group.as_deref()).await?;
    Ok(Json(DataResponse::new(
        settings.into_iter().map(SettingView::from).collect(),
    )))
}

/// GET /api/v1/settings/{key}
pub async fn show(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(key): Path<String>,
) -> AppResult<Json<DataResponse<SettingView>>> {
    authorize(&SettingPolicy, &auth.actor(), Ability::View)?;
    let setting = SettingRepo::find_by_key(&state.pool, &key)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Unknown setting '{key}'")))?;
    Ok(Json(DataResponse::new(setting.into())))
}

/// PUT /api/v1/settings/{key}
///
/// The value must match the setting's type. `null` clears it.
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    RequestContext(ctx): RequestContext,
    Path(key): Path<String>,
    Json(input): Json<UpdateSetting>,
) -> AppResult<Json<DataResponse<SettingView>>> {
    authorize(&SettingPolicy, &auth.actor(), Ability::Update)?;
    let before = SettingRepo::find_by_key(&state.pool, &key)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Unknown setting '{key}'")))?;

    let encoded = match &input.value {
        Value::Null => None,
        value => Some(encode_value(SettingType::parse(&before.setting_type)?, value)?),
    };

    let mut tx = state.pool.begin().await?;
    let setting = SettingRepo::update_value(&mut *tx, &key, encoded.as_deref(), auth.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Unknown setting '{key}'")))?;
    ActivityLogger::new(Some(auth.user_id), &ctx)
        .updated(&mut tx, &before, &setting)
        .await?;
    tx.commit().await?;

    tracing::info!(setting = %key, user_id = auth.user_id, "Setting updated");
    Ok(Json(DataResponse::new(setting.into())))
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn setting(value: Option<&str>, setting_type: &str) -> Setting {
        Setting {
            id: 1,
            key: "items_per_page".into(),
            value: value.map(str::to_string),
            setting_type: setting_type.into(),
            setting_group: "general".into(),
            description: None,
            updated_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn view_decodes_typed_values() {
        assert_eq!(SettingView::from(setting(Some("15"), "integer")).value, Value::from(15));
        assert_eq!(SettingView::from(setting(Some("1"), "boolean")).value, Value::Bool(true));
        assert_eq!(SettingView::from(setting(None, "string")).value, Value::Null);
    }

    #[test]
    fn undecodable_value_falls_back_to_text() {
        let view = SettingView::from(setting(Some("quince"), "integer"));
        assert_eq!(view.value, Value::String("quince".into()));
    }
}
