//! Resolution model, DTOs and export projection.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use erasmus_core::audit::{subject_types, Auditable};
use erasmus_core::listing::{SortDirection, SortSpec};
use erasmus_core::types::{nullable, Date, DbId, Timestamp};

/// A row from the `resolutions` table. Published when `published_at` is set.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Resolution {
    pub id: DbId,
    pub call_id: DbId,
    pub call_phase_id: Option<DbId>,
    pub resolution_type: String,
    pub title: String,
    pub description: Option<String>,
    pub evaluation_procedure: Option<String>,
    pub official_date: Option<Date>,
    pub published_at: Option<Timestamp>,
    pub created_by: Option<DbId>,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Auditable for Resolution {
    const SUBJECT_TYPE: &'static str = subject_types::RESOLUTION;
    const LOGGED_FIELDS: &'static [&'static str] = &[
        "call_id",
        "call_phase_id",
        "resolution_type",
        "title",
        "description",
        "evaluation_procedure",
        "official_date",
        "published_at",
    ];

    fn subject_id(&self) -> DbId {
        self.id
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateResolution {
    pub call_id: DbId,
    pub call_phase_id: Option<DbId>,
    pub resolution_type: String,
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    pub description: Option<String>,
    pub evaluation_procedure: Option<String>,
    pub official_date: Option<Date>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateResolution {
    pub call_id: Option<DbId>,
    /// `null` detaches the resolution from its phase.
    #[serde(default, deserialize_with = "nullable")]
    pub call_phase_id: Option<Option<DbId>>,
    pub resolution_type: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub evaluation_procedure: Option<String>,
    pub official_date: Option<Date>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResolutionFilter {
    pub call_id: Option<DbId>,
    pub call_phase_id: Option<DbId>,
    pub resolution_type: Option<String>,
    pub published: Option<bool>,
}

pub const RESOLUTION_SORT: SortSpec = SortSpec {
    allowed: &["title", "resolution_type", "official_date", "published_at", "created_at"],
    default_field: "created_at",
    default_direction: SortDirection::Desc,
};

#[derive(Debug, Clone, FromRow)]
pub struct ResolutionExportRow {
    pub id: DbId,
    pub title: String,
    pub call_title: Option<String>,
    pub phase_name: Option<String>,
    pub resolution_type: String,
    pub official_date: Option<Date>,
    pub published_at: Option<Timestamp>,
    pub creator_name: Option<String>,
    pub created_at: Timestamp,
}
