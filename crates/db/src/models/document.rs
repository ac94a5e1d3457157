//! Document model, DTOs and export projection.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use erasmus_core::audit::{subject_types, Auditable};
use erasmus_core::listing::{SortDirection, SortSpec};
use erasmus_core::types::{DbId, Timestamp};

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Document {
    pub id: DbId,
    pub category_id: DbId,
    pub program_id: Option<DbId>,
    pub academic_year_id: Option<DbId>,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub document_type: String,
    pub version: Option<String>,
    pub is_active: bool,
    pub download_count: i64,
    pub created_by: Option<DbId>,
    pub updated_by: Option<DbId>,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Auditable for Document {
    const SUBJECT_TYPE: &'static str = subject_types::DOCUMENT;
    // download_count is excluded.
    const LOGGED_FIELDS: &'static [&'static str] = &[
        "category_id",
        "program_id",
        "academic_year_id",
        "title",
        "slug",
        "description",
        "document_type",
        "version",
        "is_active",
    ];

    fn subject_id(&self) -> DbId {
        self.id
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateDocument {
    pub category_id: DbId,
    pub program_id: Option<DbId>,
    pub academic_year_id: Option<DbId>,
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(max = 180))]
    pub slug: Option<String>,
    pub description: Option<String>,
    pub document_type: String,
    #[validate(length(max = 20))]
    pub version: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateDocument {
    pub category_id: Option<DbId>,
    pub program_id: Option<DbId>,
    pub academic_year_id: Option<DbId>,
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 180))]
    pub slug: Option<String>,
    pub description: Option<String>,
    pub document_type: Option<String>,
    #[validate(length(max = 20))]
    pub version: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DocumentFilter {
    pub category_id: Option<DbId>,
    pub program_id: Option<DbId>,
    pub academic_year_id: Option<DbId>,
    pub document_type: Option<String>,
    pub is_active: Option<bool>,
}

pub const DOCUMENT_SORT: SortSpec = SortSpec {
    allowed: &["title", "document_type", "download_count", "is_active", "created_at"],
    default_field: "created_at",
    default_direction: SortDirection::Desc,
};

#[derive(Debug, Clone, FromRow)]
pub struct DocumentExportRow {
    pub id: DbId,
    pub title: String,
    pub category_name: Option<String>,
    pub program_name: Option<String>,
    pub academic_year: Option<String>,
    pub document_type: String,
    pub version: Option<String>,
    pub is_active: bool,
    pub download_count: i64,
    pub created_at: Timestamp,
}
