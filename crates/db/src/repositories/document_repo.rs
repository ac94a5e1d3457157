//! Repository for the `documents` table.

use sqlx::{PgExecutor, PgPool};

use erasmus_core::listing::{ListOptions, Page};
use erasmus_core::types::DbId;

use crate::filter::{fetch_all, fetch_page, FilterBuilder};
use crate::models::document::{
    CreateDocument, Document, DocumentExportRow, DocumentFilter, UpdateDocument,
};

const COLUMNS: &str = "id, category_id, program_id, academic_year_id, title, slug, description, \
                       document_type, version, is_active, download_count, created_by, updated_by, \
                       deleted_at, created_at, updated_at";

const EXPORT_SELECT: &str = "d.id, d.title, dc.name AS category_name, p.name AS program_name, \
                             y.year AS academic_year, d.document_type, d.version, d.is_active, \
                             d.download_count, d.created_at";

const EXPORT_FROM: &str = "documents d \
                           LEFT JOIN document_categories dc ON dc.id = d.category_id \
                           LEFT JOIN programs p ON p.id = d.program_id \
                           LEFT JOIN academic_years y ON y.id = d.academic_year_id";

pub struct DocumentRepo;

impl DocumentRepo {
    pub async fn create<'e>(
        executor: impl PgExecutor<'e>,
        input: &CreateDocument,
        slug: &str,
        created_by: DbId,
    ) -> Result<Document, sqlx::Error> {
        let query = format!(
            "INSERT INTO documents (category_id, program_id, academic_year_id, title, slug,
                description, document_type, version, is_active, created_by, updated_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, COALESCE($9, TRUE), $10, $10)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Document>(&query)
            .bind(input.category_id)
            .bind(input.program_id)
            .bind(input.academic_year_id)
            .bind(input.title.trim())
            .bind(slug)
            .bind(&input.description)
            .bind(&input.document_type)
            .bind(&input.version)
            .bind(input.is_active)
            .bind(created_by)
            .fetch_one(executor)
            .await
    }

    pub async fn find_by_id<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<Option<Document>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM documents WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, Document>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    pub async fn find_by_id_include_deleted<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<Option<Document>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM documents WHERE id = $1");
        sqlx::query_as::<_, Document>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    fn build_filter(filter: &DocumentFilter, options: &ListOptions) -> FilterBuilder {
        let mut f = FilterBuilder::new();
        f.trashed(options.trashed, "d.deleted_at");
        f.eq_opt("d.category_id", filter.category_id);
        f.eq_opt("d.program_id", filter.program_id);
        f.eq_opt("d.academic_year_id", filter.academic_year_id);
        f.eq_opt("d.document_type", filter.document_type.clone());
        f.eq_opt("d.is_active", filter.is_active);
        f.search(&["d.title", "d.description"], options.search_pattern());
        f
    }

    pub async fn list(
        pool: &PgPool,
        filter: &DocumentFilter,
        options: &ListOptions,
    ) -> Result<Page<Document>, sqlx::Error> {
        let f = Self::build_filter(filter, options);
        fetch_page(pool, COLUMNS, "documents d", &f, &options.order_by(Some("d")), options).await
    }

    pub async fn export(
        pool: &PgPool,
        filter: &DocumentFilter,
        options: &ListOptions,
    ) -> Result<Vec<DocumentExportRow>, sqlx::Error> {
        let f = Self::build_filter(filter, options);
        fetch_all(pool, EXPORT_SELECT, EXPORT_FROM, &f, &options.order_by(Some("d"))).await
    }

    pub async fn update<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
        input: &UpdateDocument,
        updated_by: DbId,
    ) -> Result<Option<Document>, sqlx::Error> {
        let query = format!(
            "UPDATE documents SET
                category_id = COALESCE($2, category_id),
                program_id = COALESCE($3, program_id),
                academic_year_id = COALESCE($4, academic_year_id),
                title = COALESCE($5, title),
                slug = COALESCE($6, slug),
                description = COALESCE($7, description),
                document_type = COALESCE($8, document_type),
                version = COALESCE($9, version),
                is_active = COALESCE($10, is_active),
                updated_by = $11
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Document>(&query)
            .bind(id)
            .bind(input.category_id)
            .bind(input.program_id)
            .bind(input.academic_year_id)
            .bind(input.title.as_deref().map(str::trim))
            .bind(&input.slug)
            .bind(&input.description)
            .bind(&input.document_type)
            .bind(&input.version)
            .bind(input.is_active)
            .bind(updated_by)
            .fetch_optional(executor)
            .await
    }

    /// Bump the download counter of an active document. Returns the new count.
    pub async fn increment_download<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<Option<i64>, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "UPDATE documents SET download_count = download_count + 1
             WHERE id = $1 AND deleted_at IS NULL AND is_active
             RETURNING download_count",
        )
        .bind(id)
        .fetch_optional(executor)
        .await
    }

    pub async fn slugs_like<'e>(
        executor: impl PgExecutor<'e>,
        base: &str,
    ) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>(
            "SELECT slug FROM documents WHERE slug = $1 OR slug LIKE $1 || '-%'",
        )
        .bind(base)
        .fetch_all(executor)
        .await
    }

    pub async fn soft_delete<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE documents SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn restore<'e>(executor: impl PgExecutor<'e>, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE documents SET deleted_at = NULL WHERE id = $1 AND deleted_at IS NOT NULL",
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
        let result = sqlx::query("DELETE FROM documents WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
