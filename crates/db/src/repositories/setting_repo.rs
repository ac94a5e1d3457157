//! Repository for the `settings` table.

use sqlx::{PgExecutor, PgPool};

use erasmus_core::types::DbId;

use crate::models::setting::Setting;

const COLUMNS: &str = "id, key, value, setting_type, setting_group, description, updated_by, \
                       created_at, updated_at";

pub struct SettingRepo;

impl SettingRepo {
    /// All settings, optionally limited to one group, ordered by group then key.
    pub async fn list(pool: &PgPool, group: Option<&str>) -> Result<Vec<Setting>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM settings
             WHERE ($1::TEXT IS NULL OR setting_group = $1)
             ORDER BY setting_group, key"
        );
        sqlx::query_as::<_, Setting>(&query)
            .bind(group)
            .fetch_all(pool)
            .await
    }

    pub async fn find_by_key<'e>(
        executor: impl PgExecutor<'e>,
        key: &str,
    ) -> Result<Option<Setting>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM settings WHERE key = $1");
        sqlx::query_as::<_, Setting>(&query)
            .bind(key)
            .fetch_optional(executor)
            .await
    }

    /// Store an already-encoded value.
    pub async fn update_value<'e>(
        executor: impl PgExecutor<'e>,
        key: &str,
        value: Option<&str>,
        updated_by: DbId,
    ) -> Result<Option<Setting>, sqlx::Error> {
        let query = format!(
            "UPDATE settings SET value = $2, updated_by = $3 WHERE key = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Setting>(&query)
            .bind(key)
            .bind(value)
            .bind(updated_by)
            .fetch_optional(executor)
            .await
    }
}
