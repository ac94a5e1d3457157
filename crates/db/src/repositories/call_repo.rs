//! Repository for the `calls` table.

use serde_json::Value;
use sqlx::{PgExecutor, PgPool};

use erasmus_core::call::CallLifecycle;
use erasmus_core::guard::{kinds, Dependents};
use erasmus_core::listing::{ListOptions, Page};
use erasmus_core::types::DbId;

use crate::filter::{fetch_all, fetch_page, FilterBuilder};
use crate::models::call::{Call, CallExportRow, CallFilter, CreateCall, UpdateCall};

const COLUMNS: &str = "id, program_id, academic_year_id, title, slug, call_type, modality, \
                       number_of_places, destinations, estimated_start_date, estimated_end_date, \
                       requirements, documentation, selection_criteria, scoring_table, status, \
                       published_at, closed_at, created_by, updated_by, deleted_at, created_at, \
                       updated_at";

const EXPORT_SELECT: &str = "c.id, c.title, p.name AS program_name, y.year AS academic_year, \
                             c.call_type, c.modality, c.number_of_places, c.destinations, c.status, \
                             c.estimated_start_date, c.estimated_end_date, c.published_at, \
                             c.closed_at, u.name AS creator_name, c.created_at";

const EXPORT_FROM: &str = "calls c \
                           LEFT JOIN programs p ON p.id = c.program_id \
                           LEFT JOIN academic_years y ON y.id = c.academic_year_id \
                           LEFT JOIN users u ON u.id = c.created_by";

/// Values computed by the caller for a new call.
#[derive(Debug, Clone)]
pub struct NewCallFields {
    pub slug: String,
    pub destinations: Value,
    pub lifecycle: CallLifecycle,
    pub created_by: DbId,
}

pub struct CallRepo;

impl CallRepo {
    pub async fn create<'e>(
        executor: impl PgExecutor<'e>,
        input: &CreateCall,
        fields: &NewCallFields,
    ) -> Result<Call, sqlx::Error> {
        let query = format!(
            "INSERT INTO calls (program_id, academic_year_id, title, slug, call_type, modality,
                number_of_places, destinations, estimated_start_date, estimated_end_date,
                requirements, documentation, selection_criteria, scoring_table, status,
                published_at, closed_at, created_by, updated_by)
             VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7, 0), $8, $9, $10, $11, $12, $13, $14,
                $15, $16, $17, $18, $18)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Call>(&query)
            .bind(input.program_id)
            .bind(input.academic_year_id)
            .bind(input.title.trim())
            .bind(&fields.slug)
            .bind(&input.call_type)
            .bind(&input.modality)
            .bind(input.number_of_places)
            .bind(&fields.destinations)
            .bind(input.estimated_start_date)
            .bind(input.estimated_end_date)
            .bind(&input.requirements)
            .bind(&input.documentation)
            .bind(&input.selection_criteria)
            .bind(&input.scoring_table)
            .bind(fields.lifecycle.status.as_str())
            .bind(fields.lifecycle.published_at)
            .bind(fields.lifecycle.closed_at)
            .bind(fields.created_by)
            .fetch_one(executor)
            .await
    }

    pub async fn find_by_id<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<Option<Call>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM calls WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, Call>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    pub async fn find_by_id_include_deleted<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<Option<Call>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM calls WHERE id = $1");
        sqlx::query_as::<_, Call>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    fn build_filter(filter: &CallFilter, options: &ListOptions) -> FilterBuilder {
        let mut f = FilterBuilder::new();
        f.trashed(options.trashed, "c.deleted_at");
        f.eq_opt("c.program_id", filter.program_id);
        f.eq_opt("c.academic_year_id", filter.academic_year_id);
        f.eq_opt("c.call_type", filter.call_type.clone());
        f.eq_opt("c.modality", filter.modality.clone());
        f.eq_opt("c.status", filter.status.clone());
        f.search(&["c.title", "c.requirements"], options.search_pattern());
        f
    }

    /// Paginated index. Search matches title and requirements.
    pub async fn list(
        pool: &PgPool,
        filter: &CallFilter,
        options: &ListOptions,
    ) -> Result<Page<Call>, sqlx::Error> {
        let f = Self::build_filter(filter, options);
        fetch_page(pool, COLUMNS, "calls c", &f, &options.order_by(Some("c")), options).await
    }

    /// Every call matching the index filters, with related names resolved.
    pub async fn export(
        pool: &PgPool,
        filter: &CallFilter,
        options: &ListOptions,
    ) -> Result<Vec<CallExportRow>, sqlx::Error> {
        let f = Self::build_filter(filter, options);
        fetch_all(pool, EXPORT_SELECT, EXPORT_FROM, &f, &options.order_by(Some("c"))).await
    }

    /// Apply a patch. `destinations` is the normalised list when the
    /// patch carries one.
    pub async fn update<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
        input: &UpdateCall,
        destinations: Option<&Value>,
        updated_by: DbId,
    ) -> Result<Option<Call>, sqlx::Error> {
        let query = format!(
            "UPDATE calls SET
                program_id = COALESCE($2, program_id),
                academic_year_id = COALESCE($3, academic_year_id),
                title = COALESCE($4, title),
                slug = COALESCE($5, slug),
                call_type = COALESCE($6, call_type),
                modality = COALESCE($7, modality),
                number_of_places = COALESCE($8, number_of_places),
                destinations = COALESCE($9, destinations),
                estimated_start_date = COALESCE($10, estimated_start_date),
                estimated_end_date = COALESCE($11, estimated_end_date),
                requirements = COALESCE($12, requirements),
                documentation = COALESCE($13, documentation),
                selection_criteria = COALESCE($14, selection_criteria),
                scoring_table = COALESCE($15, scoring_table),
                updated_by = $16
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Call>(&query)
            .bind(id)
            .bind(input.program_id)
            .bind(input.academic_year_id)
            .bind(input.title.as_deref().map(str::trim))
            .bind(&input.slug)
            .bind(&input.call_type)
            .bind(&input.modality)
            .bind(input.number_of_places)
            .bind(destinations)
            .bind(input.estimated_start_date)
            .bind(input.estimated_end_date)
            .bind(&input.requirements)
            .bind(&input.documentation)
            .bind(&input.selection_criteria)
            .bind(&input.scoring_table)
            .bind(updated_by)
            .fetch_optional(executor)
            .await
    }

    /// Persist a status change together with its timestamps.
    pub async fn set_lifecycle<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
        lifecycle: &CallLifecycle,
        updated_by: DbId,
    ) -> Result<Option<Call>, sqlx::Error> {
        let query = format!(
            "UPDATE calls SET status = $2, published_at = $3, closed_at = $4, updated_by = $5
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Call>(&query)
            .bind(id)
            .bind(lifecycle.status.as_str())
            .bind(lifecycle.published_at)
            .bind(lifecycle.closed_at)
            .bind(updated_by)
            .fetch_optional(executor)
            .await
    }

    pub async fn slugs_like<'e>(
        executor: impl PgExecutor<'e>,
        base: &str,
    ) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>(
            "SELECT slug FROM calls WHERE slug = $1 OR slug LIKE $1 || '-%'",
        )
        .bind(base)
        .fetch_all(executor)
        .await
    }

    pub async fn dependents<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
        include_trashed: bool,
    ) -> Result<Dependents, sqlx::Error> {
        let live = if include_trashed { "" } else { " AND deleted_at IS NULL" };
        let query = format!(
            "SELECT
                (SELECT COUNT(*) FROM call_phases WHERE call_id = $1{live}),
                (SELECT COUNT(*) FROM resolutions WHERE call_id = $1{live}),
                (SELECT COUNT(*) FROM call_applications WHERE call_id = $1{live}),
                (SELECT COUNT(*) FROM erasmus_events WHERE call_id = $1{live})"
        );
        let (phases, resolutions, applications, events): (i64, i64, i64, i64) =
            sqlx::query_as(&query).bind(id).fetch_one(executor).await?;
        Ok(Dependents::new("la convocatoria")
            .count(kinds::PHASES, phases)
            .count(kinds::RESOLUTIONS, resolutions)
            .count(kinds::APPLICATIONS, applications)
            .count(kinds::EVENTS, events))
    }

    pub async fn soft_delete<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE calls SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL")
                .bind(id)
                .execute(executor)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn restore<'e>(executor: impl PgExecutor<'e>, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE calls SET deleted_at = NULL WHERE id = $1 AND deleted_at IS NOT NULL",
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
        let result = sqlx::query("DELETE FROM calls WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
