//! Calendar events (openings, deadlines, interviews, info sessions).

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use erasmus_core::audit::{subject_types, Auditable};
use erasmus_core::listing::{SortDirection, SortSpec};
use erasmus_core::types::{DbId, Timestamp};

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ErasmusEvent {
    pub id: DbId,
    pub program_id: Option<DbId>,
    pub call_id: Option<DbId>,
    pub title: String,
    pub description: Option<String>,
    pub event_type: String,
    pub start_date: Timestamp,
    pub end_date: Option<Timestamp>,
    pub location: Option<String>,
    pub is_public: bool,
    pub created_by: Option<DbId>,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Auditable for ErasmusEvent {
    const SUBJECT_TYPE: &'static str = subject_types::ERASMUS_EVENT;
    const LOGGED_FIELDS: &'static [&'static str] = &[
        "program_id",
        "call_id",
        "title",
        "description",
        "event_type",
        "start_date",
        "end_date",
        "location",
        "is_public",
    ];

    fn subject_id(&self) -> DbId {
        self.id
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateErasmusEvent {
    pub program_id: Option<DbId>,
    pub call_id: Option<DbId>,
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    pub description: Option<String>,
    pub event_type: String,
    pub start_date: Timestamp,
    pub end_date: Option<Timestamp>,
    #[validate(length(max = 255))]
    pub location: Option<String>,
    pub is_public: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateErasmusEvent {
    pub program_id: Option<DbId>,
    pub call_id: Option<DbId>,
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub event_type: Option<String>,
    pub start_date: Option<Timestamp>,
    pub end_date: Option<Timestamp>,
    #[validate(length(max = 255))]
    pub location: Option<String>,
    pub is_public: Option<bool>,
}

/// Index filters. `from` / `to` bound `start_date`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErasmusEventFilter {
    pub program_id: Option<DbId>,
    pub call_id: Option<DbId>,
    pub event_type: Option<String>,
    pub is_public: Option<bool>,
    pub from: Option<Timestamp>,
    pub to: Option<Timestamp>,
}

pub const ERASMUS_EVENT_SORT: SortSpec = SortSpec {
    allowed: &["title", "event_type", "start_date", "created_at"],
    default_field: "start_date",
    default_direction: SortDirection::Desc,
};
