//! Application setting model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use erasmus_core::audit::{subject_types, Auditable};
use erasmus_core::types::{DbId, Timestamp};

/// A row from `settings`. `value` is the text encoding for `setting_type`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Setting {
    pub id: DbId,
    pub key: String,
    pub value: Option<String>,
    pub setting_type: String,
    pub setting_group: String,
    pub description: Option<String>,
    pub updated_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Auditable for Setting {
    const SUBJECT_TYPE: &'static str = subject_types::SETTING;
    const LOGGED_FIELDS: &'static [&'static str] = &["key", "value"];

    fn subject_id(&self) -> DbId {
        self.id
    }
}

/// New value for a setting, in its decoded JSON form.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateSetting {
    pub value: serde_json::Value,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingFilter {
    pub group: Option<String>,
}
