//! Repository for the `programs` table.

use sqlx::{PgExecutor, PgPool};

use erasmus_core::guard::{kinds, Dependents};
use erasmus_core::listing::{ListOptions, Page};
use erasmus_core::types::DbId;

use crate::filter::{fetch_page, FilterBuilder};
use crate::models::program::{CreateProgram, Program, ProgramFilter, UpdateProgram};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, code, name, slug, description, is_active, sort_order, \
                       deleted_at, created_at, updated_at";

/// Provides CRUD operations for programs.
pub struct ProgramRepo;

impl ProgramRepo {
    /// Insert a new program with an already-allocated slug.
    pub async fn create<'e>(
        executor: impl PgExecutor<'e>,
        input: &CreateProgram,
        slug: &str,
    ) -> Result<Program, sqlx::Error> {
        let query = format!(
            "INSERT INTO programs (code, name, slug, description, is_active, sort_order)
             VALUES ($1, $2, $3, $4, COALESCE($5, TRUE), COALESCE($6, 0))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Program>(&query)
            .bind(input.code.trim().to_uppercase())
            .bind(&input.name)
            .bind(slug)
            .bind(&input.description)
            .bind(input.is_active)
            .bind(input.sort_order)
            .fetch_one(executor)
            .await
    }

    /// Find a program by ID. Excludes soft-deleted rows.
    pub async fn find_by_id<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<Option<Program>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM programs WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, Program>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Find a program by ID, including soft-deleted rows.
    pub async fn find_by_id_include_deleted<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<Option<Program>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM programs WHERE id = $1");
        sqlx::query_as::<_, Program>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Codes of every live program, used to validate newsletter filters.
    pub async fn active_codes<'e>(
        executor: impl PgExecutor<'e>,
    ) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>(
            "SELECT code FROM programs WHERE deleted_at IS NULL AND is_active ORDER BY code",
        )
        .fetch_all(executor)
        .await
    }

    /// Paginated index with search over code, name and description.
    pub async fn list(
        pool: &PgPool,
        filter: &ProgramFilter,
        options: &ListOptions,
    ) -> Result<Page<Program>, sqlx::Error> {
        let mut f = FilterBuilder::new();
        f.trashed(options.trashed, "p.deleted_at");
        f.eq_opt("p.is_active", filter.is_active);
        f.search(
            &["p.code", "p.name", "p.description"],
            options.search_pattern(),
        );
        fetch_page(
            pool,
            COLUMNS,
            "programs p",
            &f,
            &options.order_by(Some("p")),
            options,
        )
        .await
    }

    /// Update a program. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no live row with the given `id` exists.
    pub async fn update<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
        input: &UpdateProgram,
    ) -> Result<Option<Program>, sqlx::Error> {
        let query = format!(
            "UPDATE programs SET
                code = COALESCE($2, code),
                name = COALESCE($3, name),
                slug = COALESCE($4, slug),
                description = COALESCE($5, description),
                is_active = COALESCE($6, is_active),
                sort_order = COALESCE($7, sort_order)
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Program>(&query)
            .bind(id)
            .bind(input.code.as_deref().map(|c| c.trim().to_uppercase()))
            .bind(&input.name)
            .bind(&input.slug)
            .bind(&input.description)
            .bind(input.is_active)
            .bind(input.sort_order)
            .fetch_optional(executor)
            .await
    }

    /// Slugs equal to `base` or of the form `base-N`, soft-deleted rows
    /// included.
    pub async fn slugs_like<'e>(
        executor: impl PgExecutor<'e>,
        base: &str,
    ) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>(
            "SELECT slug FROM programs WHERE slug = $1 OR slug LIKE $1 || '-%'",
        )
        .bind(base)
        .fetch_all(executor)
        .await
    }

    /// Records that reference the program. Soft-deleted dependents only
    /// count when `include_trashed` is set (permanent deletion).
    pub async fn dependents<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
        include_trashed: bool,
    ) -> Result<Dependents, sqlx::Error> {
        let live = if include_trashed { "" } else { " AND deleted_at IS NULL" };
        let query = format!(
            "SELECT
                (SELECT COUNT(*) FROM calls WHERE program_id = $1{live}),
                (SELECT COUNT(*) FROM news_posts WHERE program_id = $1{live}),
                (SELECT COUNT(*) FROM documents WHERE program_id = $1{live}),
                (SELECT COUNT(*) FROM erasmus_events WHERE program_id = $1{live})"
        );
        let (calls, news, documents, events): (i64, i64, i64, i64) =
            sqlx::query_as(&query).bind(id).fetch_one(executor).await?;
        Ok(Dependents::new("el programa")
            .count(kinds::CALLS, calls)
            .count(kinds::NEWS_POSTS, news)
            .count(kinds::DOCUMENTS, documents)
            .count(kinds::EVENTS, events))
    }

    /// Soft-delete a program by ID. Returns `true` if a row was marked deleted.
    pub async fn soft_delete<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE programs SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Restore a soft-deleted program. Returns `true` if a row was restored.
    pub async fn restore<'e>(executor: impl PgExecutor<'e>, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE programs SET deleted_at = NULL WHERE id = $1 AND deleted_at IS NOT NULL",
        )
        .bind(id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Permanently delete a program by ID. Returns `true` if a row was removed.
    pub async fn hard_delete<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM programs WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
