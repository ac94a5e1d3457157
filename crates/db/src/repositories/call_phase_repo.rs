//! Repository for the `call_phases` table. Every lookup is scoped by call.

use sqlx::{Acquire, PgExecutor, PgPool, Postgres};

use erasmus_core::guard::{kinds, Dependents};
use erasmus_core::listing::{ListOptions, Page};
use erasmus_core::types::DbId;

use crate::filter::{fetch_page, FilterBuilder};
use crate::models::call_phase::{CallPhase, CallPhaseFilter, CreateCallPhase, UpdateCallPhase};

const COLUMNS: &str = "id, call_id, phase_type, name, description, start_date, end_date, \
                       is_current, sort_order, deleted_at, created_at, updated_at";

pub struct CallPhaseRepo;

impl CallPhaseRepo {
    /// Insert a phase. A phase created as current takes the flag from its
    /// siblings.
    pub async fn create<'a>(
        conn: impl Acquire<'a, Database = Postgres>,
        call_id: DbId,
        input: &CreateCallPhase,
    ) -> Result<CallPhase, sqlx::Error> {
        let mut tx = conn.begin().await?;
        let is_current = input.is_current.unwrap_or(false);
        if is_current {
            sqlx::query("UPDATE call_phases SET is_current = FALSE WHERE call_id = $1 AND is_current")
                .bind(call_id)
                .execute(&mut *tx)
                .await?;
        }
        let query = format!(
            "INSERT INTO call_phases (call_id, phase_type, name, description, start_date,
                end_date, is_current, sort_order)
             VALUES ($1, $2, $3, $4, $5, $6, $7,
                COALESCE($8, (SELECT COALESCE(MAX(sort_order) + 1, 0) FROM call_phases WHERE call_id = $1)))
             RETURNING {COLUMNS}"
        );
        let phase = sqlx::query_as::<_, CallPhase>(&query)
            .bind(call_id)
            .bind(&input.phase_type)
            .bind(input.name.trim())
            .bind(&input.description)
            .bind(input.start_date)
            .bind(input.end_date)
            .bind(is_current)
            .bind(input.sort_order)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(phase)
    }

    pub async fn find_by_id<'e>(
        executor: impl PgExecutor<'e>,
        call_id: DbId,
        id: DbId,
    ) -> Result<Option<CallPhase>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM call_phases WHERE id = $1 AND call_id = $2 AND deleted_at IS NULL"
        );
        sqlx::query_as::<_, CallPhase>(&query)
            .bind(id)
            .bind(call_id)
            .fetch_optional(executor)
            .await
    }

    /// Find a live phase by ID regardless of its call.
    pub async fn find_any<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<Option<CallPhase>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM call_phases WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, CallPhase>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    pub async fn find_by_id_include_deleted<'e>(
        executor: impl PgExecutor<'e>,
        call_id: DbId,
        id: DbId,
    ) -> Result<Option<CallPhase>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM call_phases WHERE id = $1 AND call_id = $2");
        sqlx::query_as::<_, CallPhase>(&query)
            .bind(id)
            .bind(call_id)
            .fetch_optional(executor)
            .await
    }

    pub async fn list(
        pool: &PgPool,
        call_id: DbId,
        filter: &CallPhaseFilter,
        options: &ListOptions,
    ) -> Result<Page<CallPhase>, sqlx::Error> {
        let mut f = FilterBuilder::new();
        f.eq("ph.call_id", call_id);
        f.trashed(options.trashed, "ph.deleted_at");
        f.eq_opt("ph.phase_type", filter.phase_type.clone());
        f.search(&["ph.name", "ph.description"], options.search_pattern());
        fetch_page(
            pool,
            COLUMNS,
            "call_phases ph",
            &f,
            &options.order_by(Some("ph")),
            options,
        )
        .await
    }

    pub async fn update<'e>(
        executor: impl PgExecutor<'e>,
        call_id: DbId,
        id: DbId,
        input: &UpdateCallPhase,
    ) -> Result<Option<CallPhase>, sqlx::Error> {
        let query = format!(
            "UPDATE call_phases SET
                phase_type = COALESCE($3, phase_type),
                name = COALESCE($4, name),
                description = COALESCE($5, description),
                start_date = COALESCE($6, start_date),
                end_date = COALESCE($7, end_date),
                sort_order = COALESCE($8, sort_order)
             WHERE id = $1 AND call_id = $2 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CallPhase>(&query)
            .bind(id)
            .bind(call_id)
            .bind(&input.phase_type)
            .bind(input.name.as_deref().map(str::trim))
            .bind(&input.description)
            .bind(input.start_date)
            .bind(input.end_date)
            .bind(input.sort_order)
            .fetch_optional(executor)
            .await
    }

    /// Make `id` the call's current phase, clearing the flag on its siblings.
    pub async fn mark_current<'a>(
        conn: impl Acquire<'a, Database = Postgres>,
        call_id: DbId,
        id: DbId,
    ) -> Result<Option<CallPhase>, sqlx::Error> {
        let mut tx = conn.begin().await?;
        sqlx::query(
            "UPDATE call_phases SET is_current = FALSE
             WHERE call_id = $1 AND id <> $2 AND is_current",
        )
        .bind(call_id)
        .bind(id)
        .execute(&mut *tx)
        .await?;
        let query = format!(
            "UPDATE call_phases SET is_current = TRUE
             WHERE id = $1 AND call_id = $2 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        let phase = sqlx::query_as::<_, CallPhase>(&query)
            .bind(id)
            .bind(call_id)
            .fetch_optional(&mut *tx)
            .await?;
        if phase.is_some() {
            tx.commit().await?;
        } else {
            tx.rollback().await?;
        }
        Ok(phase)
    }

    pub async fn dependents<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
        include_trashed: bool,
    ) -> Result<Dependents, sqlx::Error> {
        let live = if include_trashed { "" } else { " AND deleted_at IS NULL" };
        let query =
            format!("SELECT COUNT(*) FROM resolutions WHERE call_phase_id = $1{live}");
        let resolutions: i64 = sqlx::query_scalar(&query).bind(id).fetch_one(executor).await?;
        Ok(Dependents::new("la fase").count(kinds::RESOLUTIONS, resolutions))
    }

    pub async fn soft_delete<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE call_phases SET deleted_at = NOW(), is_current = FALSE
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn restore<'e>(executor: impl PgExecutor<'e>, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE call_phases SET deleted_at = NULL WHERE id = $1 AND deleted_at IS NOT NULL",
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
        let result = sqlx::query("DELETE FROM call_phases WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
