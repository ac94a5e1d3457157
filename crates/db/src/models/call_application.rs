//! Applications submitted to a call.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use erasmus_core::audit::{subject_types, Auditable};
use erasmus_core::listing::{SortDirection, SortSpec};
use erasmus_core::types::{DbId, Timestamp};

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CallApplication {
    pub id: DbId,
    pub call_id: DbId,
    pub applicant_name: String,
    pub applicant_email: String,
    pub applicant_phone: Option<String>,
    pub status: String,
    pub score: Option<f64>,
    pub notes: Option<String>,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Auditable for CallApplication {
    const SUBJECT_TYPE: &'static str = subject_types::CALL_APPLICATION;
    const LOGGED_FIELDS: &'static [&'static str] = &[
        "call_id",
        "applicant_name",
        "applicant_email",
        "applicant_phone",
        "status",
        "score",
        "notes",
    ];

    fn subject_id(&self) -> DbId {
        self.id
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCallApplication {
    #[validate(length(min = 1, max = 255))]
    pub applicant_name: String,
    #[validate(email)]
    pub applicant_email: String,
    #[validate(length(max = 30))]
    pub applicant_phone: Option<String>,
    pub status: Option<String>,
    #[validate(range(min = 0.0))]
    pub score: Option<f64>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateCallApplication {
    #[validate(length(min = 1, max = 255))]
    pub applicant_name: Option<String>,
    #[validate(email)]
    pub applicant_email: Option<String>,
    #[validate(length(max = 30))]
    pub applicant_phone: Option<String>,
    #[validate(range(min = 0.0))]
    pub score: Option<f64>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SetApplicationStatus {
    pub status: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallApplicationFilter {
    pub status: Option<String>,
}

pub const CALL_APPLICATION_SORT: SortSpec = SortSpec {
    allowed: &["applicant_name", "applicant_email", "status", "score", "created_at"],
    default_field: "created_at",
    default_direction: SortDirection::Desc,
};
