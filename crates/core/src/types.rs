/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Calendar dates (no time component) such as official resolution dates.
pub type Date = chrono::NaiveDate;

/// Deserializer for patch fields that may be cleared.
///
/// Use with `#[serde(default, deserialize_with = "nullable")]` on an
/// `Option<Option<T>>`: an absent field stays `None`, an explicit `null`
/// becomes `Some(None)`.
pub fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: serde::Deserialize<'de>,
{
    <Option<T> as serde::Deserialize>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "nullable")]
        phase: Option<Option<DbId>>,
    }

    #[test]
    fn nullable_tells_absent_from_null() {
        let absent: Patch = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.phase, None);

        let cleared: Patch = serde_json::from_str(r#"{"phase": null}"#).unwrap();
        assert_eq!(cleared.phase, Some(None));

        let set: Patch = serde_json::from_str(r#"{"phase": 4}"#).unwrap();
        assert_eq!(set.phase, Some(Some(4)));
    }
}
