//! Repository for the `document_categories` table.

use sqlx::{PgExecutor, PgPool};

use erasmus_core::guard::{kinds, Dependents};
use erasmus_core::listing::{ListOptions, Page};
use erasmus_core::types::DbId;

use crate::filter::{fetch_page, FilterBuilder};
use crate::models::document_category::{
    CreateDocumentCategory, DocumentCategory, UpdateDocumentCategory,
};

const COLUMNS: &str = "id, name, slug, description, sort_order, deleted_at, created_at, updated_at";

pub struct DocumentCategoryRepo;

impl DocumentCategoryRepo {
    pub async fn create<'e>(
        executor: impl PgExecutor<'e>,
        input: &CreateDocumentCategory,
        slug: &str,
    ) -> Result<DocumentCategory, sqlx::Error> {
        let query = format!(
            "INSERT INTO document_categories (name, slug, description, sort_order)
             VALUES ($1, $2, $3, COALESCE($4, 0))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DocumentCategory>(&query)
            .bind(input.name.trim())
            .bind(slug)
            .bind(&input.description)
            .bind(input.sort_order)
            .fetch_one(executor)
            .await
    }

    pub async fn find_by_id<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<Option<DocumentCategory>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM document_categories WHERE id = $1 AND deleted_at IS NULL"
        );
        sqlx::query_as::<_, DocumentCategory>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    pub async fn find_by_id_include_deleted<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<Option<DocumentCategory>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM document_categories WHERE id = $1");
        sqlx::query_as::<_, DocumentCategory>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    pub async fn list(
        pool: &PgPool,
        options: &ListOptions,
    ) -> Result<Page<DocumentCategory>, sqlx::Error> {
        let mut f = FilterBuilder::new();
        f.trashed(options.trashed, "dc.deleted_at");
        f.search(&["dc.name", "dc.description"], options.search_pattern());
        fetch_page(
            pool,
            COLUMNS,
            "document_categories dc",
            &f,
            &options.order_by(Some("dc")),
            options,
        )
        .await
    }

    pub async fn update<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
        input: &UpdateDocumentCategory,
    ) -> Result<Option<DocumentCategory>, sqlx::Error> {
        let query = format!(
            "UPDATE document_categories SET
                name = COALESCE($2, name),
                slug = COALESCE($3, slug),
                description = COALESCE($4, description),
                sort_order = COALESCE($5, sort_order)
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DocumentCategory>(&query)
            .bind(id)
            .bind(input.name.as_deref().map(str::trim))
            .bind(&input.slug)
            .bind(&input.description)
            .bind(input.sort_order)
            .fetch_optional(executor)
            .await
    }

    pub async fn slugs_like<'e>(
        executor: impl PgExecutor<'e>,
        base: &str,
    ) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>(
            "SELECT slug FROM document_categories WHERE slug = $1 OR slug LIKE $1 || '-%'",
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
        let query = format!("SELECT COUNT(*) FROM documents WHERE category_id = $1{live}");
        let documents: i64 = sqlx::query_scalar(&query).bind(id).fetch_one(executor).await?;
        Ok(Dependents::new("la categoría").count(kinds::DOCUMENTS, documents))
    }

    pub async fn soft_delete<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE document_categories SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn restore<'e>(executor: impl PgExecutor<'e>, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE document_categories SET deleted_at = NULL
             WHERE id = $1 AND deleted_at IS NOT NULL",
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
        let result = sqlx::query("DELETE FROM document_categories WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
