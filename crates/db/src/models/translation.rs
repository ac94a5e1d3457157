//! Content translations keyed by (type, id, locale, field).

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use erasmus_core::audit::{subject_types, Auditable};
use erasmus_core::listing::{SortDirection, SortSpec};
use erasmus_core::types::{DbId, Timestamp};

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Translation {
    pub id: DbId,
    pub translatable_type: String,
    pub translatable_id: DbId,
    pub locale: String,
    pub field: String,
    pub value: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Auditable for Translation {
    const SUBJECT_TYPE: &'static str = subject_types::TRANSLATION;
    const LOGGED_FIELDS: &'static [&'static str] =
        &["translatable_type", "translatable_id", "locale", "field", "value"];

    fn subject_id(&self) -> DbId {
        self.id
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTranslation {
    #[validate(length(min = 1, max = 50))]
    pub translatable_type: String,
    pub translatable_id: DbId,
    #[validate(length(min = 2, max = 5))]
    pub locale: String,
    #[validate(length(min = 1, max = 50))]
    pub field: String,
    #[validate(length(min = 1))]
    pub value: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateTranslation {
    #[validate(length(min = 1))]
    pub value: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TranslationFilter {
    pub translatable_type: Option<String>,
    pub translatable_id: Option<DbId>,
    pub locale: Option<String>,
    pub field: Option<String>,
}

pub const TRANSLATION_SORT: SortSpec = SortSpec {
    allowed: &["translatable_type", "translatable_id", "locale", "field", "created_at"],
    default_field: "created_at",
    default_direction: SortDirection::Desc,
};
