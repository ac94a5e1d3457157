//! Academic year model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use erasmus_core::audit::{subject_types, Auditable};
use erasmus_core::listing::{SortDirection, SortSpec};
use erasmus_core::types::{Date, DbId, Timestamp};

/// A row from the `academic_years` table. `year` has the form `2024-2025`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AcademicYear {
    pub id: DbId,
    pub year: String,
    pub start_date: Date,
    pub end_date: Date,
    pub is_current: bool,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Auditable for AcademicYear {
    const SUBJECT_TYPE: &'static str = subject_types::ACADEMIC_YEAR;
    const LOGGED_FIELDS: &'static [&'static str] = &["year", "start_date", "end_date", "is_current"];

    fn subject_id(&self) -> DbId {
        self.id
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateAcademicYear {
    #[validate(length(equal = 9))]
    pub year: String,
    pub start_date: Date,
    pub end_date: Date,
    pub is_current: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateAcademicYear {
    #[validate(length(equal = 9))]
    pub year: Option<String>,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AcademicYearFilter {
    pub is_current: Option<bool>,
}

pub const ACADEMIC_YEAR_SORT: SortSpec = SortSpec {
    allowed: &["year", "start_date", "end_date", "created_at"],
    default_field: "year",
    default_direction: SortDirection::Desc,
};
