//! Repository for the `translations` table.

use sqlx::{PgExecutor, PgPool};

use erasmus_core::listing::{ListOptions, Page};
use erasmus_core::types::DbId;

use crate::filter::{fetch_page, FilterBuilder};
use crate::models::translation::{CreateTranslation, Translation, TranslationFilter};

const COLUMNS: &str =
    "id, translatable_type, translatable_id, locale, field, value, created_at, updated_at";

pub struct TranslationRepo;

impl TranslationRepo {
    pub async fn create<'e>(
        executor: impl PgExecutor<'e>,
        input: &CreateTranslation,
    ) -> Result<Translation, sqlx::Error> {
        let query = format!(
            "INSERT INTO translations (translatable_type, translatable_id, locale, field, value)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Translation>(&query)
            .bind(&input.translatable_type)
            .bind(input.translatable_id)
            .bind(&input.locale)
            .bind(&input.field)
            .bind(&input.value)
            .fetch_one(executor)
            .await
    }

    /// Insert the translation or overwrite the value of the existing one
    /// for the same target, locale and field.
    pub async fn upsert<'e>(
        executor: impl PgExecutor<'e>,
        input: &CreateTranslation,
    ) -> Result<Translation, sqlx::Error> {
        let query = format!(
            "INSERT INTO translations (translatable_type, translatable_id, locale, field, value)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT ON CONSTRAINT uq_translations_target
             DO UPDATE SET value = EXCLUDED.value
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Translation>(&query)
            .bind(&input.translatable_type)
            .bind(input.translatable_id)
            .bind(&input.locale)
            .bind(&input.field)
            .bind(&input.value)
            .fetch_one(executor)
            .await
    }

    pub async fn find_by_id<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<Option<Translation>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM translations WHERE id = $1");
        sqlx::query_as::<_, Translation>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Every translation of one record in one locale.
    pub async fn for_target<'e>(
        executor: impl PgExecutor<'e>,
        translatable_type: &str,
        translatable_id: DbId,
        locale: &str,
    ) -> Result<Vec<Translation>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM translations
             WHERE translatable_type = $1 AND translatable_id = $2 AND locale = $3
             ORDER BY field"
        );
        sqlx::query_as::<_, Translation>(&query)
            .bind(translatable_type)
            .bind(translatable_id)
            .bind(locale)
            .fetch_all(executor)
            .await
    }

    pub async fn list(
        pool: &PgPool,
        filter: &TranslationFilter,
        options: &ListOptions,
    ) -> Result<Page<Translation>, sqlx::Error> {
        let mut f = FilterBuilder::new();
        f.eq_opt("t.translatable_type", filter.translatable_type.clone());
        f.eq_opt("t.translatable_id", filter.translatable_id);
        f.eq_opt("t.locale", filter.locale.clone());
        f.eq_opt("t.field", filter.field.clone());
        f.search(&["t.value", "t.field"], options.search_pattern());
        fetch_page(
            pool,
            COLUMNS,
            "translations t",
            &f,
            &options.order_by(Some("t")),
            options,
        )
        .await
    }

    pub async fn update_value<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
        value: &str,
    ) -> Result<Option<Translation>, sqlx::Error> {
        let query =
            format!("UPDATE translations SET value = $2 WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Translation>(&query)
            .bind(id)
            .bind(value)
            .fetch_optional(executor)
            .await
    }

    pub async fn delete<'e>(executor: impl PgExecutor<'e>, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM translations WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
