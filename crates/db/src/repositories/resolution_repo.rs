//! Repository for the `resolutions` table.

use sqlx::{PgExecutor, PgPool};

use erasmus_core::listing::{ListOptions, Page};
use erasmus_core::types::{DbId, Timestamp};

use crate::filter::{fetch_all, fetch_page, FilterBuilder};
use crate::models::resolution::{
    CreateResolution, Resolution, ResolutionExportRow, ResolutionFilter, UpdateResolution,
};

const COLUMNS: &str = "id, call_id, call_phase_id, resolution_type, title, description, \
                       evaluation_procedure, official_date, published_at, created_by, deleted_at, \
                       created_at, updated_at";

const EXPORT_SELECT: &str = "r.id, r.title, c.title AS call_title, ph.name AS phase_name, \
                             r.resolution_type, r.official_date, r.published_at, \
                             u.name AS creator_name, r.created_at";

const EXPORT_FROM: &str = "resolutions r \
                           LEFT JOIN calls c ON c.id = r.call_id \
                           LEFT JOIN call_phases ph ON ph.id = r.call_phase_id \
                           LEFT JOIN users u ON u.id = r.created_by";

pub struct ResolutionRepo;

impl ResolutionRepo {
    pub async fn create<'e>(
        executor: impl PgExecutor<'e>,
        input: &CreateResolution,
        created_by: DbId,
    ) -> Result<Resolution, sqlx::Error> {
        let query = format!(
            "INSERT INTO resolutions (call_id, call_phase_id, resolution_type, title, description,
                evaluation_procedure, official_date, created_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Resolution>(&query)
            .bind(input.call_id)
            .bind(input.call_phase_id)
            .bind(&input.resolution_type)
            .bind(input.title.trim())
            .bind(&input.description)
            .bind(&input.evaluation_procedure)
            .bind(input.official_date)
            .bind(created_by)
            .fetch_one(executor)
            .await
    }

    pub async fn find_by_id<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<Option<Resolution>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM resolutions WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, Resolution>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    pub async fn find_by_id_include_deleted<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<Option<Resolution>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM resolutions WHERE id = $1");
        sqlx::query_as::<_, Resolution>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    fn build_filter(filter: &ResolutionFilter, options: &ListOptions) -> FilterBuilder {
        let mut f = FilterBuilder::new();
        f.trashed(options.trashed, "r.deleted_at");
        f.eq_opt("r.call_id", filter.call_id);
        f.eq_opt("r.call_phase_id", filter.call_phase_id);
        f.eq_opt("r.resolution_type", filter.resolution_type.clone());
        match filter.published {
            Some(true) => f.raw("r.published_at IS NOT NULL"),
            Some(false) => f.raw("r.published_at IS NULL"),
            None => {}
        }
        f.search(
            &["r.title", "r.description", "r.evaluation_procedure"],
            options.search_pattern(),
        );
        f
    }

    /// Paginated index. Search matches title, description and procedure.
    pub async fn list(
        pool: &PgPool,
        filter: &ResolutionFilter,
        options: &ListOptions,
    ) -> Result<Page<Resolution>, sqlx::Error> {
        let f = Self::build_filter(filter, options);
        fetch_page(
            pool,
            COLUMNS,
            "resolutions r",
            &f,
            &options.order_by(Some("r")),
            options,
        )
        .await
    }

    pub async fn export(
        pool: &PgPool,
        filter: &ResolutionFilter,
        options: &ListOptions,
    ) -> Result<Vec<ResolutionExportRow>, sqlx::Error> {
        let f = Self::build_filter(filter, options);
        fetch_all(pool, EXPORT_SELECT, EXPORT_FROM, &f, &options.order_by(Some("r"))).await
    }

    /// Absent fields are kept. `call_phase_id` is written whenever the outer
    /// option is set, so `Some(None)` clears it.
    pub async fn update<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
        input: &UpdateResolution,
    ) -> Result<Option<Resolution>, sqlx::Error> {
        let query = format!(
            "UPDATE resolutions SET
                call_id = COALESCE($2, call_id),
                call_phase_id = CASE WHEN $3 THEN $4 ELSE call_phase_id END,
                resolution_type = COALESCE($5, resolution_type),
                title = COALESCE($6, title),
                description = COALESCE($7, description),
                evaluation_procedure = COALESCE($8, evaluation_procedure),
                official_date = COALESCE($9, official_date)
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Resolution>(&query)
            .bind(id)
            .bind(input.call_id)
            .bind(input.call_phase_id.is_some())
            .bind(input.call_phase_id.flatten())
            .bind(&input.resolution_type)
            .bind(input.title.as_deref().map(str::trim))
            .bind(&input.description)
            .bind(&input.evaluation_procedure)
            .bind(input.official_date)
            .fetch_optional(executor)
            .await
    }

    /// Set or clear the publication timestamp.
    pub async fn set_published_at<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
        published_at: Option<Timestamp>,
    ) -> Result<Option<Resolution>, sqlx::Error> {
        let query = format!(
            "UPDATE resolutions SET published_at = $2
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Resolution>(&query)
            .bind(id)
            .bind(published_at)
            .fetch_optional(executor)
            .await
    }

    pub async fn soft_delete<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE resolutions SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn restore<'e>(executor: impl PgExecutor<'e>, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE resolutions SET deleted_at = NULL WHERE id = $1 AND deleted_at IS NOT NULL",
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
        let result = sqlx::query("DELETE FROM resolutions WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
