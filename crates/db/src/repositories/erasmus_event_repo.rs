//! Repository for the `erasmus_events` table.

use sqlx::{PgExecutor, PgPool};

use erasmus_core::listing::{ListOptions, Page};
use erasmus_core::types::DbId;

use crate::filter::{fetch_page, FilterBuilder};
use crate::models::erasmus_event::{
    CreateErasmusEvent, ErasmusEvent, ErasmusEventFilter, UpdateErasmusEvent,
};

const COLUMNS: &str = "id, program_id, call_id, title, description, event_type, start_date, \
                       end_date, location, is_public, created_by, deleted_at, created_at, updated_at";

pub struct ErasmusEventRepo;

impl ErasmusEventRepo {
    pub async fn create<'e>(
        executor: impl PgExecutor<'e>,
        input: &CreateErasmusEvent,
        created_by: DbId,
    ) -> Result<ErasmusEvent, sqlx::Error> {
        let query = format!(
            "INSERT INTO erasmus_events (program_id, call_id, title, description, event_type,
                start_date, end_date, location, is_public, created_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, COALESCE($9, TRUE), $10)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ErasmusEvent>(&query)
            .bind(input.program_id)
            .bind(input.call_id)
            .bind(input.title.trim())
            .bind(&input.description)
            .bind(&input.event_type)
            .bind(input.start_date)
            .bind(input.end_date)
            .bind(&input.location)
            .bind(input.is_public)
            .bind(created_by)
            .fetch_one(executor)
            .await
    }

    pub async fn find_by_id<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<Option<ErasmusEvent>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM erasmus_events WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, ErasmusEvent>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    pub async fn find_by_id_include_deleted<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<Option<ErasmusEvent>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM erasmus_events WHERE id = $1");
        sqlx::query_as::<_, ErasmusEvent>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Paginated index. `from`/`to` bound the start date.
    pub async fn list(
        pool: &PgPool,
        filter: &ErasmusEventFilter,
        options: &ListOptions,
    ) -> Result<Page<ErasmusEvent>, sqlx::Error> {
        let mut f = FilterBuilder::new();
        f.trashed(options.trashed, "e.deleted_at");
        f.eq_opt("e.program_id", filter.program_id);
        f.eq_opt("e.call_id", filter.call_id);
        f.eq_opt("e.event_type", filter.event_type.clone());
        f.eq_opt("e.is_public", filter.is_public);
        f.gte_opt("e.start_date", filter.from);
        f.lte_opt("e.start_date", filter.to);
        f.search(
            &["e.title", "e.description", "e.location"],
            options.search_pattern(),
        );
        fetch_page(
            pool,
            COLUMNS,
            "erasmus_events e",
            &f,
            &options.order_by(Some("e")),
            options,
        )
        .await
    }

    pub async fn update<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
        input: &UpdateErasmusEvent,
    ) -> Result<Option<ErasmusEvent>, sqlx::Error> {
        let query = format!(
            "UPDATE erasmus_events SET
                program_id = COALESCE($2, program_id),
                call_id = COALESCE($3, call_id),
                title = COALESCE($4, title),
                description = COALESCE($5, description),
                event_type = COALESCE($6, event_type),
                start_date = COALESCE($7, start_date),
                end_date = COALESCE($8, end_date),
                location = COALESCE($9, location),
                is_public = COALESCE($10, is_public)
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ErasmusEvent>(&query)
            .bind(id)
            .bind(input.program_id)
            .bind(input.call_id)
            .bind(input.title.as_deref().map(str::trim))
            .bind(&input.description)
            .bind(&input.event_type)
            .bind(input.start_date)
            .bind(input.end_date)
            .bind(&input.location)
            .bind(input.is_public)
            .fetch_optional(executor)
            .await
    }

    pub async fn soft_delete<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE erasmus_events SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn restore<'e>(executor: impl PgExecutor<'e>, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE erasmus_events SET deleted_at = NULL WHERE id = $1 AND deleted_at IS NOT NULL",
        )
        .bind(id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn hard_delete<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM erasmus_events WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
