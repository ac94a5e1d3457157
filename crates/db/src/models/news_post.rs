//! News post model, DTOs and export projection.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use erasmus_core::audit::{subject_types, Auditable};
use erasmus_core::listing::{SortDirection, SortSpec};
use erasmus_core::types::{DbId, Timestamp};

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct NewsPost {
    pub id: DbId,
    pub program_id: Option<DbId>,
    pub academic_year_id: DbId,
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub content: String,
    pub country: Option<String>,
    pub city: Option<String>,
    pub host_entity: Option<String>,
    pub mobility_type: Option<String>,
    pub mobility_category: Option<String>,
    pub status: String,
    pub published_at: Option<Timestamp>,
    pub author_id: Option<DbId>,
    pub reviewed_by: Option<DbId>,
    pub reviewed_at: Option<Timestamp>,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Auditable for NewsPost {
    const SUBJECT_TYPE: &'static str = subject_types::NEWS_POST;
    const LOGGED_FIELDS: &'static [&'static str] = &[
        "program_id",
        "academic_year_id",
        "title",
        "slug",
        "excerpt",
        "content",
        "country",
        "city",
        "host_entity",
        "mobility_type",
        "mobility_category",
        "status",
        "published_at",
        "reviewed_by",
        "reviewed_at",
    ];

    fn subject_id(&self) -> DbId {
        self.id
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateNewsPost {
    pub program_id: Option<DbId>,
    pub academic_year_id: DbId,
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(max = 180))]
    pub slug: Option<String>,
    #[validate(length(max = 500))]
    pub excerpt: Option<String>,
    #[validate(length(min = 1))]
    pub content: String,
    #[validate(length(max = 100))]
    pub country: Option<String>,
    #[validate(length(max = 100))]
    pub city: Option<String>,
    #[validate(length(max = 255))]
    pub host_entity: Option<String>,
    pub mobility_type: Option<String>,
    pub mobility_category: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateNewsPost {
    pub program_id: Option<DbId>,
    pub academic_year_id: Option<DbId>,
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 180))]
    pub slug: Option<String>,
    #[validate(length(max = 500))]
    pub excerpt: Option<String>,
    #[validate(length(min = 1))]
    pub content: Option<String>,
    #[validate(length(max = 100))]
    pub country: Option<String>,
    #[validate(length(max = 100))]
    pub city: Option<String>,
    #[validate(length(max = 255))]
    pub host_entity: Option<String>,
    pub mobility_type: Option<String>,
    pub mobility_category: Option<String>,
    /// Direct status edits; `published_at` follows the status.
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewsPostFilter {
    pub program_id: Option<DbId>,
    pub academic_year_id: Option<DbId>,
    pub status: Option<String>,
    pub mobility_type: Option<String>,
}

pub const NEWS_POST_SORT: SortSpec = SortSpec {
    allowed: &["title", "status", "country", "published_at", "created_at"],
    default_field: "created_at",
    default_direction: SortDirection::Desc,
};

#[derive(Debug, Clone, FromRow)]
pub struct NewsPostExportRow {
    pub id: DbId,
    pub title: String,
    pub program_name: Option<String>,
    pub academic_year: Option<String>,
    pub mobility_type: Option<String>,
    pub mobility_category: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub status: String,
    pub author_name: Option<String>,
    pub published_at: Option<Timestamp>,
    pub created_at: Timestamp,
}
