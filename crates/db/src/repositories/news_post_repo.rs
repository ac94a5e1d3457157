//! Repository for the `news_posts` table.

use sqlx::{PgExecutor, PgPool};

use erasmus_core::listing::{ListOptions, Page};
use erasmus_core::types::{DbId, Timestamp};

use crate::filter::{fetch_all, fetch_page, FilterBuilder};
use crate::models::news_post::{
    CreateNewsPost, NewsPost, NewsPostExportRow, NewsPostFilter, UpdateNewsPost,
};

const COLUMNS: &str = "id, program_id, academic_year_id, title, slug, excerpt, content, country, \
                       city, host_entity, mobility_type, mobility_category, status, published_at, \
                       author_id, reviewed_by, reviewed_at, deleted_at, created_at, updated_at";

const EXPORT_SELECT: &str = "n.id, n.title, p.name AS program_name, y.year AS academic_year, \
                             n.mobility_type, n.mobility_category, n.country, n.city, n.status, \
                             u.name AS author_name, n.published_at, n.created_at";

const EXPORT_FROM: &str = "news_posts n \
                           LEFT JOIN programs p ON p.id = n.program_id \
                           LEFT JOIN academic_years y ON y.id = n.academic_year_id \
                           LEFT JOIN users u ON u.id = n.author_id";

/// Values computed by the caller for a new post.
#[derive(Debug, Clone)]
pub struct NewNewsPostFields {
    pub slug: String,
    pub status: String,
    pub published_at: Option<Timestamp>,
    pub author_id: DbId,
}

pub struct NewsPostRepo;

impl NewsPostRepo {
    pub async fn create<'e>(
        executor: impl PgExecutor<'e>,
        input: &CreateNewsPost,
        fields: &NewNewsPostFields,
    ) -> Result<NewsPost, sqlx::Error> {
        let query = format!(
            "INSERT INTO news_posts (program_id, academic_year_id, title, slug, excerpt, content,
                country, city, host_entity, mobility_type, mobility_category, status,
                published_at, author_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, NewsPost>(&query)
            .bind(input.program_id)
            .bind(input.academic_year_id)
            .bind(input.title.trim())
            .bind(&fields.slug)
            .bind(&input.excerpt)
            .bind(&input.content)
            .bind(&input.country)
            .bind(&input.city)
            .bind(&input.host_entity)
            .bind(&input.mobility_type)
            .bind(&input.mobility_category)
            .bind(&fields.status)
            .bind(fields.published_at)
            .bind(fields.author_id)
            .fetch_one(executor)
            .await
    }

    pub async fn find_by_id<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<Option<NewsPost>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM news_posts WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, NewsPost>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    pub async fn find_by_id_include_deleted<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<Option<NewsPost>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM news_posts WHERE id = $1");
        sqlx::query_as::<_, NewsPost>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    fn build_filter(filter: &NewsPostFilter, options: &ListOptions) -> FilterBuilder {
        let mut f = FilterBuilder::new();
        f.trashed(options.trashed, "n.deleted_at");
        f.eq_opt("n.program_id", filter.program_id);
        f.eq_opt("n.academic_year_id", filter.academic_year_id);
        f.eq_opt("n.status", filter.status.clone());
        f.eq_opt("n.mobility_type", filter.mobility_type.clone());
        f.search(
            &["n.title", "n.excerpt", "n.content", "n.country", "n.city"],
            options.search_pattern(),
        );
        f
    }

    /// Paginated index. Search matches title, excerpt, body and place.
    pub async fn list(
        pool: &PgPool,
        filter: &NewsPostFilter,
        options: &ListOptions,
    ) -> Result<Page<NewsPost>, sqlx::Error> {
        let f = Self::build_filter(filter, options);
        fetch_page(
            pool,
            COLUMNS,
            "news_posts n",
            &f,
            &options.order_by(Some("n")),
            options,
        )
        .await
    }

    pub async fn export(
        pool: &PgPool,
        filter: &NewsPostFilter,
        options: &ListOptions,
    ) -> Result<Vec<NewsPostExportRow>, sqlx::Error> {
        let f = Self::build_filter(filter, options);
        fetch_all(pool, EXPORT_SELECT, EXPORT_FROM, &f, &options.order_by(Some("n"))).await
    }

    /// Apply a patch. Status and `published_at` are resolved by the caller
    /// and always written.
    pub async fn update<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
        input: &UpdateNewsPost,
        status: &str,
        published_at: Option<Timestamp>,
    ) -> Result<Option<NewsPost>, sqlx::Error> {
        let query = format!(
            "UPDATE news_posts SET
                program_id = COALESCE($2, program_id),
                academic_year_id = COALESCE($3, academic_year_id),
                title = COALESCE($4, title),
                slug = COALESCE($5, slug),
                excerpt = COALESCE($6, excerpt),
                content = COALESCE($7, content),
                country = COALESCE($8, country),
                city = COALESCE($9, city),
                host_entity = COALESCE($10, host_entity),
                mobility_type = COALESCE($11, mobility_type),
                mobility_category = COALESCE($12, mobility_category),
                status = $13,
                published_at = $14
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, NewsPost>(&query)
            .bind(id)
            .bind(input.program_id)
            .bind(input.academic_year_id)
            .bind(input.title.as_deref().map(str::trim))
            .bind(&input.slug)
            .bind(&input.excerpt)
            .bind(&input.content)
            .bind(&input.country)
            .bind(&input.city)
            .bind(&input.host_entity)
            .bind(&input.mobility_type)
            .bind(&input.mobility_category)
            .bind(status)
            .bind(published_at)
            .fetch_optional(executor)
            .await
    }

    /// Persist a publication change. Publishing also records the reviewer.
    pub async fn set_publication<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
        status: &str,
        published_at: Option<Timestamp>,
        reviewed_by: Option<DbId>,
    ) -> Result<Option<NewsPost>, sqlx::Error> {
        let query = format!(
            "UPDATE news_posts SET
                status = $2,
                published_at = $3,
                reviewed_by = COALESCE($4, reviewed_by),
                reviewed_at = CASE WHEN $4::BIGINT IS NULL THEN reviewed_at ELSE NOW() END
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, NewsPost>(&query)
            .bind(id)
            .bind(status)
            .bind(published_at)
            .bind(reviewed_by)
            .fetch_optional(executor)
            .await
    }

    pub async fn slugs_like<'e>(
        executor: impl PgExecutor<'e>,
        base: &str,
    ) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>(
            "SELECT slug FROM news_posts WHERE slug = $1 OR slug LIKE $1 || '-%'",
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
            "UPDATE news_posts SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn restore<'e>(executor: impl PgExecutor<'e>, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE news_posts SET deleted_at = NULL WHERE id = $1 AND deleted_at IS NOT NULL",
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
        let result = sqlx::query("DELETE FROM news_posts WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
