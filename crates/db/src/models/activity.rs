//! Activity log models.
//!
//! Entries are immutable once written (no `updated_at`).

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use erasmus_core::listing::{SortDirection, SortSpec};
use erasmus_core::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Activity entity
// ---------------------------------------------------------------------------

/// A single activity log entry with its causer's name resolved.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ActivityLog {
    pub id: DbId,
    pub log_name: String,
    pub description: String,
    pub subject_type: Option<String>,
    pub subject_id: Option<DbId>,
    pub event: Option<String>,
    pub causer_id: Option<DbId>,
    pub causer_name: Option<String>,
    pub properties: serde_json::Value,
    pub created_at: Timestamp,
}

impl ActivityLog {
    /// Context value recorded under `key` in `properties`, if any.
    pub fn property_str(&self, key: &str) -> Option<&str> {
        self.properties.get(key).and_then(|v| v.as_str())
    }
}

// ---------------------------------------------------------------------------
// Create DTO
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct CreateActivity {
    pub log_name: String,
    pub description: String,
    pub subject_type: Option<String>,
    pub subject_id: Option<DbId>,
    pub event: Option<String>,
    pub causer_id: Option<DbId>,
    pub properties: serde_json::Value,
}

// ---------------------------------------------------------------------------
// Query parameters
// ---------------------------------------------------------------------------

/// Index filters. Free-text `search` from the shared list parameters is
/// matched against the description and the serialized properties.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActivityFilter {
    pub log_name: Option<String>,
    pub subject_type: Option<String>,
    pub subject_id: Option<DbId>,
    pub causer_id: Option<DbId>,
    pub event: Option<String>,
    pub from: Option<Timestamp>,
    pub to: Option<Timestamp>,
}

pub const ACTIVITY_SORT: SortSpec = SortSpec {
    allowed: &["created_at", "event", "subject_type", "log_name"],
    default_field: "created_at",
    default_direction: SortDirection::Desc,
};
