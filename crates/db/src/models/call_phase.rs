//! Call phase model and DTOs. Phases are always addressed through their call.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use erasmus_core::audit::{subject_types, Auditable};
use erasmus_core::listing::{SortDirection, SortSpec};
use erasmus_core::types::{Date, DbId, Timestamp};

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CallPhase {
    pub id: DbId,
    pub call_id: DbId,
    pub phase_type: String,
    pub name: String,
    pub description: Option<String>,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub is_current: bool,
    pub sort_order: i32,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Auditable for CallPhase {
    const SUBJECT_TYPE: &'static str = subject_types::CALL_PHASE;
    const LOGGED_FIELDS: &'static [&'static str] = &[
        "call_id",
        "phase_type",
        "name",
        "description",
        "start_date",
        "end_date",
        "is_current",
        "sort_order",
    ];

    fn subject_id(&self) -> DbId {
        self.id
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCallPhase {
    pub phase_type: String,
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub description: Option<String>,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub is_current: Option<bool>,
    #[validate(range(min = 0))]
    pub sort_order: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateCallPhase {
    pub phase_type: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    #[validate(range(min = 0))]
    pub sort_order: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallPhaseFilter {
    pub phase_type: Option<String>,
}

pub const CALL_PHASE_SORT: SortSpec = SortSpec {
    allowed: &["sort_order", "name", "phase_type", "start_date", "created_at"],
    default_field: "sort_order",
    default_direction: SortDirection::Asc,
};
