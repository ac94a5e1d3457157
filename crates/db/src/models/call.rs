//! Call (convocatoria) model, DTOs and export projection.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use validator::Validate;

use erasmus_core::audit::{subject_types, Auditable};
use erasmus_core::call::{CallLifecycle, CallStatus};
use erasmus_core::error::CoreError;
use erasmus_core::listing::{SortDirection, SortSpec};
use erasmus_core::types::{Date, DbId, Timestamp};

/// A row from the `calls` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Call {
    pub id: DbId,
    pub program_id: DbId,
    pub academic_year_id: DbId,
    pub title: String,
    pub slug: String,
    pub call_type: String,
    pub modality: String,
    pub number_of_places: i32,
    /// JSON array of destination names.
    pub destinations: Value,
    pub estimated_start_date: Option<Date>,
    pub estimated_end_date: Option<Date>,
    pub requirements: Option<String>,
    pub documentation: Option<String>,
    pub selection_criteria: Option<String>,
    pub scoring_table: Option<Value>,
    pub status: String,
    pub published_at: Option<Timestamp>,
    pub closed_at: Option<Timestamp>,
    pub created_by: Option<DbId>,
    pub updated_by: Option<DbId>,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Call {
    /// Current status and its timestamps.
    pub fn lifecycle(&self) -> Result<CallLifecycle, CoreError> {
        Ok(CallLifecycle {
            status: CallStatus::parse(&self.status)?,
            published_at: self.published_at,
            closed_at: self.closed_at,
        })
    }
}

impl Auditable for Call {
    const SUBJECT_TYPE: &'static str = subject_types::CALL;
    const LOGGED_FIELDS: &'static [&'static str] = &[
        "program_id",
        "academic_year_id",
        "title",
        "slug",
        "call_type",
        "modality",
        "number_of_places",
        "destinations",
        "estimated_start_date",
        "estimated_end_date",
        "requirements",
        "documentation",
        "selection_criteria",
        "scoring_table",
        "status",
        "published_at",
        "closed_at",
    ];

    fn subject_id(&self) -> DbId {
        self.id
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCall {
    pub program_id: DbId,
    pub academic_year_id: DbId,
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(max = 180))]
    pub slug: Option<String>,
    pub call_type: String,
    pub modality: String,
    #[validate(range(min = 0))]
    pub number_of_places: Option<i32>,
    pub destinations: Option<Vec<String>>,
    pub estimated_start_date: Option<Date>,
    pub estimated_end_date: Option<Date>,
    pub requirements: Option<String>,
    pub documentation: Option<String>,
    pub selection_criteria: Option<String>,
    pub scoring_table: Option<Value>,
    /// Initial status; defaults to `borrador`.
    pub status: Option<String>,
}

/// Patch for a call. Status changes go through the dedicated status and
/// publish endpoints.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateCall {
    pub program_id: Option<DbId>,
    pub academic_year_id: Option<DbId>,
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 180))]
    pub slug: Option<String>,
    pub call_type: Option<String>,
    pub modality: Option<String>,
    #[validate(range(min = 0))]
    pub number_of_places: Option<i32>,
    pub destinations: Option<Vec<String>>,
    pub estimated_start_date: Option<Date>,
    pub estimated_end_date: Option<Date>,
    pub requirements: Option<String>,
    pub documentation: Option<String>,
    pub selection_criteria: Option<String>,
    pub scoring_table: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SetCallStatus {
    pub status: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallFilter {
    pub program_id: Option<DbId>,
    pub academic_year_id: Option<DbId>,
    pub call_type: Option<String>,
    pub modality: Option<String>,
    pub status: Option<String>,
}

pub const CALL_SORT: SortSpec = SortSpec {
    allowed: &[
        "title",
        "status",
        "call_type",
        "modality",
        "number_of_places",
        "estimated_start_date",
        "published_at",
        "created_at",
    ],
    default_field: "created_at",
    default_direction: SortDirection::Desc,
};

/// One call with its related names resolved, for spreadsheet export.
#[derive(Debug, Clone, FromRow)]
pub struct CallExportRow {
    pub id: DbId,
    pub title: String,
    pub program_name: Option<String>,
    pub academic_year: Option<String>,
    pub call_type: String,
    pub modality: String,
    pub number_of_places: i32,
    pub destinations: Value,
    pub status: String,
    pub estimated_start_date: Option<Date>,
    pub estimated_end_date: Option<Date>,
    pub published_at: Option<Timestamp>,
    pub closed_at: Option<Timestamp>,
    pub creator_name: Option<String>,
    pub created_at: Timestamp,
}
