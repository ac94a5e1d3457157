//! Repository for the append-only `activity_log` table.

use sqlx::{PgExecutor, PgPool};

use erasmus_core::listing::{ListOptions, Page};
use erasmus_core::types::DbId;

use crate::filter::{fetch_all, fetch_page, FilterBuilder};
use crate::models::activity::{ActivityFilter, ActivityLog, CreateActivity};

/// Columns selected from `activity_log a LEFT JOIN users u`.
const SELECT: &str = "a.id, a.log_name, a.description, a.subject_type, a.subject_id, a.event, \
                      a.causer_id, u.name AS causer_name, a.properties, a.created_at";

const FROM: &str = "activity_log a LEFT JOIN users u ON u.id = a.causer_id";

pub struct ActivityRepo;

impl ActivityRepo {
    /// Append an entry. Returns the new row ID.
    pub async fn insert<'e>(
        executor: impl PgExecutor<'e>,
        input: &CreateActivity,
    ) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>(
            "INSERT INTO activity_log (log_name, description, subject_type, subject_id, event,
                causer_id, properties)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING id",
        )
        .bind(&input.log_name)
        .bind(&input.description)
        .bind(&input.subject_type)
        .bind(input.subject_id)
        .bind(&input.event)
        .bind(input.causer_id)
        .bind(&input.properties)
        .fetch_one(executor)
        .await
    }

    pub async fn find_by_id<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<Option<ActivityLog>, sqlx::Error> {
        let query = format!("SELECT {SELECT} FROM {FROM} WHERE a.id = $1");
        sqlx::query_as::<_, ActivityLog>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    fn build_filter(filter: &ActivityFilter, options: &ListOptions) -> FilterBuilder {
        let mut f = FilterBuilder::new();
        f.eq_opt("a.log_name", filter.log_name.clone());
        f.eq_opt("a.subject_type", filter.subject_type.clone());
        f.eq_opt("a.subject_id", filter.subject_id);
        f.eq_opt("a.causer_id", filter.causer_id);
        f.eq_opt("a.event", filter.event.clone());
        f.gte_opt("a.created_at", filter.from);
        f.lte_opt("a.created_at", filter.to);
        f.search(
            &["a.description", "a.properties::text"],
            options.search_pattern(),
        );
        f
    }

    /// Paginated index. Search matches the description and the raw
    /// property document.
    pub async fn list(
        pool: &PgPool,
        filter: &ActivityFilter,
        options: &ListOptions,
    ) -> Result<Page<ActivityLog>, sqlx::Error> {
        let f = Self::build_filter(filter, options);
        fetch_page(pool, SELECT, FROM, &f, &options.order_by(Some("a")), options).await
    }

    /// History of one record, newest first.
    pub async fn for_subject(
        pool: &PgPool,
        subject_type: &str,
        subject_id: DbId,
        options: &ListOptions,
    ) -> Result<Page<ActivityLog>, sqlx::Error> {
        let filter = ActivityFilter {
            subject_type: Some(subject_type.to_string()),
            subject_id: Some(subject_id),
            ..ActivityFilter::default()
        };
        Self::list(pool, &filter, options).await
    }

    pub async fn export(
        pool: &PgPool,
        filter: &ActivityFilter,
        options: &ListOptions,
    ) -> Result<Vec<ActivityLog>, sqlx::Error> {
        let f = Self::build_filter(filter, options);
        fetch_all(pool, SELECT, FROM, &f, &options.order_by(Some("a"))).await
    }
}
