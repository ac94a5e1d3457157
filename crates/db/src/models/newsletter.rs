//! Newsletter subscription model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use erasmus_core::audit::{subject_types, Auditable};
use erasmus_core::listing::{SortDirection, SortSpec};
use erasmus_core::types::{DbId, Timestamp};

/// A row from `newsletter_subscriptions`. `programs` holds program codes;
/// an empty list means every program.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct NewsletterSubscription {
    pub id: DbId,
    pub email: String,
    pub name: Option<String>,
    pub programs: Vec<String>,
    pub is_active: bool,
    pub subscribed_at: Timestamp,
    pub unsubscribed_at: Option<Timestamp>,
    /// SHA-256 of the token mailed to the subscriber.
    #[serde(skip_serializing)]
    pub verification_token: Option<String>,
    pub verified_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl NewsletterSubscription {
    pub fn is_verified(&self) -> bool {
        self.verified_at.is_some()
    }
}

impl Auditable for NewsletterSubscription {
    const SUBJECT_TYPE: &'static str = subject_types::NEWSLETTER_SUBSCRIPTION;
    const LOGGED_FIELDS: &'static [&'static str] = &[
        "email",
        "name",
        "programs",
        "is_active",
        "unsubscribed_at",
        "verified_at",
    ];

    fn subject_id(&self) -> DbId {
        self.id
    }
}

/// Public subscription request.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct Subscribe {
    #[validate(email, length(max = 255))]
    pub email: String,
    #[validate(length(max = 255))]
    pub name: Option<String>,
    pub programs: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewsletterFilter {
    /// Program code; matches subscribers of that program and of all programs.
    pub program: Option<String>,
    pub is_active: Option<bool>,
    pub verified: Option<bool>,
}

pub const NEWSLETTER_SORT: SortSpec = SortSpec {
    allowed: &["email", "name", "subscribed_at", "verified_at"],
    default_field: "subscribed_at",
    default_direction: SortDirection::Desc,
};
