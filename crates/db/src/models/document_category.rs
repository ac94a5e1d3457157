//! Document category model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use erasmus_core::audit::{subject_types, Auditable};
use erasmus_core::listing::{SortDirection, SortSpec};
use erasmus_core::types::{DbId, Timestamp};

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DocumentCategory {
    pub id: DbId,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub sort_order: i32,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Auditable for DocumentCategory {
    const SUBJECT_TYPE: &'static str = subject_types::DOCUMENT_CATEGORY;
    const LOGGED_FIELDS: &'static [&'static str] = &["name", "slug", "description", "sort_order"];

    fn subject_id(&self) -> DbId {
        self.id
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateDocumentCategory {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(max = 180))]
    pub slug: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 0))]
    pub sort_order: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateDocumentCategory {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 180))]
    pub slug: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 0))]
    pub sort_order: Option<i32>,
}

pub const DOCUMENT_CATEGORY_SORT: SortSpec = SortSpec {
    allowed: &["name", "sort_order", "created_at"],
    default_field: "sort_order",
    default_direction: SortDirection::Asc,
};
