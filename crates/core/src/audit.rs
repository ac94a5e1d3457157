//! Activity log vocabulary and attribute diffing.
//!
//! Models opt into automatic change logging by implementing [`Auditable`].
//! The API layer computes a [`ChangeSet`] around each mutation and stores it,
//! together with the request context, as the entry's `properties`.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::types::DbId;

// ---------------------------------------------------------------------------
// Event constants
// ---------------------------------------------------------------------------

/// Known activity events.
pub mod events {
    pub const CREATED: &str = "created";
    pub const UPDATED: &str = "updated";
    pub const DELETED: &str = "deleted";
    pub const RESTORED: &str = "restored";
    pub const FORCE_DELETED: &str = "force_deleted";
    pub const PUBLISH: &str = "publish";
    pub const UNPUBLISH: &str = "unpublish";
    pub const STATUS_CHANGED: &str = "status_changed";
    pub const LOGIN: &str = "login";
    pub const LOGOUT: &str = "logout";

    pub const ALL: &[&str] = &[
        CREATED,
        UPDATED,
        DELETED,
        RESTORED,
        FORCE_DELETED,
        PUBLISH,
        UNPUBLISH,
        STATUS_CHANGED,
        LOGIN,
        LOGOUT,
    ];
}

/// Subject type identifiers stored in `activity_log.subject_type` and used
/// by the trash listing.
pub mod subject_types {
    pub const PROGRAM: &str = "program";
    pub const ACADEMIC_YEAR: &str = "academic_year";
    pub const CALL: &str = "call";
    pub const CALL_PHASE: &str = "call_phase";
    pub const CALL_APPLICATION: &str = "call_application";
    pub const RESOLUTION: &str = "resolution";
    pub const NEWS_POST: &str = "news_post";
    pub const DOCUMENT_CATEGORY: &str = "document_category";
    pub const DOCUMENT: &str = "document";
    pub const ERASMUS_EVENT: &str = "erasmus_event";
    pub const NEWSLETTER_SUBSCRIPTION: &str = "newsletter_subscription";
    pub const SETTING: &str = "setting";
    pub const TRANSLATION: &str = "translation";
    pub const USER: &str = "user";
}

/// Property keys with a fixed meaning.
pub mod properties {
    pub const ATTRIBUTES: &str = "attributes";
    pub const OLD: &str = "old";
    pub const IP_ADDRESS: &str = "ip_address";
    pub const USER_AGENT: &str = "user_agent";
    pub const OLD_STATUS: &str = "old_status";
    pub const NEW_STATUS: &str = "new_status";
}

/// Default log name for entries not tied to a specific model log.
pub const DEFAULT_LOG_NAME: &str = "default";

// ---------------------------------------------------------------------------
// Auditable models
// ---------------------------------------------------------------------------

/// A model whose changes are written to the activity log.
pub trait Auditable: Serialize {
    const SUBJECT_TYPE: &'static str;
    const LOG_NAME: &'static str = DEFAULT_LOG_NAME;
    /// Fields included in `attributes` / `old`. Anything else is ignored
    /// when diffing, which keeps bookkeeping columns out of the log.
    const LOGGED_FIELDS: &'static [&'static str];

    fn subject_id(&self) -> DbId;
}

/// The logged fields of `model`, as a JSON object.
pub fn logged_attributes<T: Auditable>(model: &T) -> Map<String, Value> {
    let full = match serde_json::to_value(model) {
        Ok(Value::Object(map)) => map,
        _ => return Map::new(),
    };
    T::LOGGED_FIELDS
        .iter()
        .filter_map(|field| full.get(*field).map(|v| ((*field).to_string(), v.clone())))
        .collect()
}

/// New and previous values of the fields touched by one change.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChangeSet {
    pub attributes: Map<String, Value>,
    pub old: Map<String, Value>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty() && self.old.is_empty()
    }

    /// Render as activity properties (`attributes` / `old`, empty sides
    /// omitted).
    pub fn into_properties(self) -> Map<String, Value> {
        let mut props = Map::new();
        if !self.attributes.is_empty() {
            props.insert(properties::ATTRIBUTES.to_string(), Value::Object(self.attributes));
        }
        if !self.old.is_empty() {
            props.insert(properties::OLD.to_string(), Value::Object(self.old));
        }
        props
    }
}

pub fn changes_on_create<T: Auditable>(created: &T) -> ChangeSet {
    ChangeSet {
        attributes: logged_attributes(created),
        old: Map::new(),
    }
}

/// Dirty logged fields between `before` and `after`. `None` when nothing
/// logged changed, in which case no entry is written.
pub fn changes_on_update<T: Auditable>(before: &T, after: &T) -> Option<ChangeSet> {
    let old_attrs = logged_attributes(before);
    let new_attrs = logged_attributes(after);

    let mut changes = ChangeSet::default();
    for field in T::LOGGED_FIELDS {
        let old_value = old_attrs.get(*field).unwrap_or(&Value::Null);
        let new_value = new_attrs.get(*field).unwrap_or(&Value::Null);
        if old_value != new_value {
            changes.attributes.insert((*field).to_string(), new_value.clone());
            changes.old.insert((*field).to_string(), old_value.clone());
        }
    }

    if changes.is_empty() {
        None
    } else {
        Some(changes)
    }
}

pub fn changes_on_delete<T: Auditable>(deleted: &T) -> ChangeSet {
    ChangeSet {
        attributes: Map::new(),
        old: logged_attributes(deleted),
    }
}

// ---------------------------------------------------------------------------
// Context
// ---------------------------------------------------------------------------

/// Request details recorded with every entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityContext {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl ActivityContext {
    pub fn apply(&self, props: &mut Map<String, Value>) {
        if let Some(ip) = &self.ip_address {
            props.insert(properties::IP_ADDRESS.to_string(), Value::String(ip.clone()));
        }
        if let Some(ua) = &self.user_agent {
            props.insert(properties::USER_AGENT.to_string(), Value::String(ua.clone()));
        }
    }
}

pub fn status_change_properties(old_status: &str, new_status: &str) -> Map<String, Value> {
    let mut props = Map::new();
    props.insert(
        properties::OLD_STATUS.to_string(),
        Value::String(old_status.to_string()),
    );
    props.insert(
        properties::NEW_STATUS.to_string(),
        Value::String(new_status.to_string()),
    );
    props
}

/// Final `properties` value: base map plus context, redacted.
pub fn finalize_properties(mut props: Map<String, Value>, context: &ActivityContext) -> Value {
    context.apply(&mut props);
    redact_sensitive_fields(&Value::Object(props))
}

// ---------------------------------------------------------------------------
// Sensitive field redaction
// ---------------------------------------------------------------------------

pub const SENSITIVE_FIELDS: &[&str] = &[
    "password",
    "token",
    "secret",
    "api_key",
    "private_key",
    "authorization",
    "credential",
];

pub const REDACTED: &str = "[REDACTED]";

/// Replace the value of every key matching [`SENSITIVE_FIELDS`], at any
/// depth.
pub fn redact_sensitive_fields(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut redacted = Map::new();
            for (key, val) in map {
                let lower_key = key.to_lowercase();
                if SENSITIVE_FIELDS.iter().any(|f| lower_key.contains(f)) {
                    redacted.insert(key.clone(), Value::String(REDACTED.to_string()));
                } else {
                    redacted.insert(key.clone(), redact_sensitive_fields(val));
                }
            }
            Value::Object(redacted)
        }
        Value::Array(arr) => Value::Array(arr.iter().map(redact_sensitive_fields).collect()),
        other => other.clone(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Serialize)]
    struct Sample {
        id: DbId,
        title: String,
        status: String,
        updated_at: String,
        password_hash: Option<String>,
    }

    impl Auditable for Sample {
        const SUBJECT_TYPE: &'static str = "sample";
        const LOGGED_FIELDS: &'static [&'static str] = &["title", "status", "password_hash"];

        fn subject_id(&self) -> DbId {
            self.id
        }
    }

    fn sample(title: &str, status: &str, updated_at: &str) -> Sample {
        Sample {
            id: 1,
            title: title.to_string(),
            status: status.to_string(),
            updated_at: updated_at.to_string(),
            password_hash: None,
        }
    }

    #[test]
    fn create_logs_only_logged_fields() {
        let changes = changes_on_create(&sample("A", "borrador", "t1"));
        assert_eq!(changes.attributes.get("title"), Some(&json!("A")));
        assert!(!changes.attributes.contains_key("updated_at"));
        assert!(!changes.attributes.contains_key("id"));
        assert!(changes.old.is_empty());
    }

    #[test]
    fn update_logs_only_dirty_fields() {
        let before = sample("A", "borrador", "t1");
        let after = sample("A", "abierta", "t2");
        let changes = changes_on_update(&before, &after).unwrap();
        assert_eq!(changes.attributes, json!({"status": "abierta"}).as_object().unwrap().clone());
        assert_eq!(changes.old, json!({"status": "borrador"}).as_object().unwrap().clone());
    }

    #[test]
    fn update_without_logged_changes_is_none() {
        let before = sample("A", "borrador", "t1");
        let after = sample("A", "borrador", "t2");
        assert!(changes_on_update(&before, &after).is_none());
    }

    #[test]
    fn delete_logs_old_values() {
        let changes = changes_on_delete(&sample("A", "borrador", "t1"));
        assert!(changes.attributes.is_empty());
        assert_eq!(changes.old.get("status"), Some(&json!("borrador")));
        let props = changes.into_properties();
        assert!(props.contains_key("old"));
        assert!(!props.contains_key("attributes"));
    }

    #[test]
    fn context_and_redaction_are_applied() {
        let mut s = sample("A", "borrador", "t1");
        s.password_hash = Some("argon".to_string());
        let props = changes_on_create(&s).into_properties();
        let ctx = ActivityContext {
            ip_address: Some("10.0.0.1".to_string()),
            user_agent: Some("curl/8".to_string()),
        };
        let value = finalize_properties(props, &ctx);
        assert_eq!(value["ip_address"], json!("10.0.0.1"));
        assert_eq!(value["user_agent"], json!("curl/8"));
        assert_eq!(value["attributes"]["password_hash"], json!(REDACTED));
        assert_eq!(value["attributes"]["title"], json!("A"));
    }

    #[test]
    fn status_properties() {
        let props = status_change_properties("borrador", "abierta");
        assert_eq!(props["old_status"], json!("borrador"));
        assert_eq!(props["new_status"], json!("abierta"));
    }

    #[test]
    fn redaction_is_recursive() {
        let input = json!({
            "user": {"name": "Ana", "api_key": "k"},
            "items": [{"token": "t"}],
        });
        let out = redact_sensitive_fields(&input);
        assert_eq!(out["user"]["name"], json!("Ana"));
        assert_eq!(out["user"]["api_key"], json!(REDACTED));
        assert_eq!(out["items"][0]["token"], json!(REDACTED));
    }
}
