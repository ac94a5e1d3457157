//! Erasmus+ program (KA1, KA2 actions) model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use erasmus_core::audit::{subject_types, Auditable};
use erasmus_core::listing::{SortDirection, SortSpec};
use erasmus_core::types::{DbId, Timestamp};

/// A row from the `programs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Program {
    pub id: DbId,
    pub code: String,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub sort_order: i32,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Auditable for Program {
    const SUBJECT_TYPE: &'static str = subject_types::PROGRAM;
    const LOGGED_FIELDS: &'static [&'static str] =
        &["code", "name", "slug", "description", "is_active", "sort_order"];

    fn subject_id(&self) -> DbId {
        self.id
    }
}

/// DTO for creating a program. The slug is derived from the name when
/// omitted.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateProgram {
    #[validate(length(min = 1, max = 50))]
    pub code: String,
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(max = 180))]
    pub slug: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
    #[validate(range(min = 0))]
    pub sort_order: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateProgram {
    #[validate(length(min = 1, max = 50))]
    pub code: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 180))]
    pub slug: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
    #[validate(range(min = 0))]
    pub sort_order: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProgramFilter {
    pub is_active: Option<bool>,
}

pub const PROGRAM_SORT: SortSpec = SortSpec {
    allowed: &["code", "name", "sort_order", "is_active", "created_at"],
    default_field: "sort_order",
    default_direction: SortDirection::Asc,
};
