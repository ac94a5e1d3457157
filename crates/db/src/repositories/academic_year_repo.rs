//! Repository for the `academic_years` table.

use sqlx::{Acquire, PgExecutor, PgPool, Postgres};

use erasmus_core::guard::{kinds, Dependents};
use erasmus_core::listing::{ListOptions, Page};
use erasmus_core::types::DbId;

use crate::filter::{fetch_page, FilterBuilder};
use crate::models::academic_year::{
    AcademicYear, AcademicYearFilter, CreateAcademicYear, UpdateAcademicYear,
};

const COLUMNS: &str = "id, year, start_date, end_date, is_current, deleted_at, created_at, updated_at";

pub struct AcademicYearRepo;

impl AcademicYearRepo {
    /// Insert a new academic year. When `is_current` is set the flag is
    /// cleared on every other year in the same transaction.
    pub async fn create<'a>(
        conn: impl Acquire<'a, Database = Postgres>,
        input: &CreateAcademicYear,
    ) -> Result<AcademicYear, sqlx::Error> {
        let mut tx = conn.begin().await?;
        let is_current = input.is_current.unwrap_or(false);
        if is_current {
            sqlx::query("UPDATE academic_years SET is_current = FALSE WHERE is_current")
                .execute(&mut *tx)
                .await?;
        }
        let query = format!(
            "INSERT INTO academic_years (year, start_date, end_date, is_current)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        let year = sqlx::query_as::<_, AcademicYear>(&query)
            .bind(input.year.trim())
            .bind(input.start_date)
            .bind(input.end_date)
            .bind(is_current)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(year)
    }

    pub async fn find_by_id<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<Option<AcademicYear>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM academic_years WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, AcademicYear>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    pub async fn find_by_id_include_deleted<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<Option<AcademicYear>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM academic_years WHERE id = $1");
        sqlx::query_as::<_, AcademicYear>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// The year currently flagged as current, if any.
    pub async fn find_current<'e>(
        executor: impl PgExecutor<'e>,
    ) -> Result<Option<AcademicYear>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM academic_years WHERE is_current AND deleted_at IS NULL"
        );
        sqlx::query_as::<_, AcademicYear>(&query)
            .fetch_optional(executor)
            .await
    }

    pub async fn list(
        pool: &PgPool,
        filter: &AcademicYearFilter,
        options: &ListOptions,
    ) -> Result<Page<AcademicYear>, sqlx::Error> {
        let mut f = FilterBuilder::new();
        f.trashed(options.trashed, "y.deleted_at");
        f.eq_opt("y.is_current", filter.is_current);
        f.search(&["y.year"], options.search_pattern());
        fetch_page(
            pool,
            COLUMNS,
            "academic_years y",
            &f,
            &options.order_by(Some("y")),
            options,
        )
        .await
    }

    pub async fn update<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
        input: &UpdateAcademicYear,
    ) -> Result<Option<AcademicYear>, sqlx::Error> {
        let query = format!(
            "UPDATE academic_years SET
                year = COALESCE($2, year),
                start_date = COALESCE($3, start_date),
                end_date = COALESCE($4, end_date)
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AcademicYear>(&query)
            .bind(id)
            .bind(input.year.as_deref().map(str::trim))
            .bind(input.start_date)
            .bind(input.end_date)
            .fetch_optional(executor)
            .await
    }

    /// Flag `id` as the current year and clear the flag everywhere else.
    ///
    /// Returns `None` if no live row with the given `id` exists.
    pub async fn set_current<'a>(
        conn: impl Acquire<'a, Database = Postgres>,
        id: DbId,
    ) -> Result<Option<AcademicYear>, sqlx::Error> {
        let mut tx = conn.begin().await?;
        sqlx::query("UPDATE academic_years SET is_current = FALSE WHERE is_current AND id <> $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let query = format!(
            "UPDATE academic_years SET is_current = TRUE
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        let year = sqlx::query_as::<_, AcademicYear>(&query)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        if year.is_some() {
            tx.commit().await?;
        } else {
            tx.rollback().await?;
        }
        Ok(year)
    }

    pub async fn dependents<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
        include_trashed: bool,
    ) -> Result<Dependents, sqlx::Error> {
        let live = if include_trashed { "" } else { " AND deleted_at IS NULL" };
        let query = format!(
            "SELECT
                (SELECT COUNT(*) FROM calls WHERE academic_year_id = $1{live}),
                (SELECT COUNT(*) FROM news_posts WHERE academic_year_id = $1{live}),
                (SELECT COUNT(*) FROM documents WHERE academic_year_id = $1{live})"
        );
        let (calls, news, documents): (i64, i64, i64) =
            sqlx::query_as(&query).bind(id).fetch_one(executor).await?;
        Ok(Dependents::new("el año académico")
            .count(kinds::CALLS, calls)
            .count(kinds::NEWS_POSTS, news)
            .count(kinds::DOCUMENTS, documents))
    }

    /// Soft-delete a year. A deleted year stops being current.
    pub async fn soft_delete<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE academic_years SET deleted_at = NOW(), is_current = FALSE
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn restore<'e>(executor: impl PgExecutor<'e>, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE academic_years SET deleted_at = NULL WHERE id = $1 AND deleted_at IS NOT NULL",
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
        let result = sqlx::query("DELETE FROM academic_years WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
