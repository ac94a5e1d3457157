//! Repository for the `newsletter_subscriptions` table.
//!
//! Subscriptions are never soft-deleted: unsubscribing flips `is_active`
//! and administrators remove rows outright. Only the SHA-256 hash of the
//! subscriber token is stored.

use sqlx::{PgExecutor, PgPool};

use erasmus_core::listing::{ListOptions, Page};
use erasmus_core::types::DbId;

use crate::filter::{fetch_all, fetch_page, FilterBuilder};
use crate::models::newsletter::{NewsletterFilter, NewsletterSubscription};

const COLUMNS: &str = "id, email, name, programs, is_active, subscribed_at, unsubscribed_at, \
                       verification_token, verified_at, created_at, updated_at";

pub struct NewsletterRepo;

impl NewsletterRepo {
    /// Insert or reactivate the subscription for `email`.
    ///
    /// An existing row keeps its verification state; the token hash is
    /// replaced, the program list overwritten and the row reactivated.
    pub async fn subscribe<'e>(
        executor: impl PgExecutor<'e>,
        email: &str,
        name: Option<&str>,
        programs: &[String],
        token_hash: &str,
    ) -> Result<NewsletterSubscription, sqlx::Error> {
        let query = format!(
            "INSERT INTO newsletter_subscriptions (email, name, programs, verification_token)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (email) DO UPDATE SET
                name = COALESCE(EXCLUDED.name, newsletter_subscriptions.name),
                programs = EXCLUDED.programs,
                verification_token = EXCLUDED.verification_token,
                subscribed_at = CASE WHEN newsletter_subscriptions.is_active
                    THEN newsletter_subscriptions.subscribed_at ELSE NOW() END,
                is_active = TRUE,
                unsubscribed_at = NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, NewsletterSubscription>(&query)
            .bind(email)
            .bind(name)
            .bind(programs)
            .bind(token_hash)
            .fetch_one(executor)
            .await
    }

    pub async fn find_by_id<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<Option<NewsletterSubscription>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM newsletter_subscriptions WHERE id = $1");
        sqlx::query_as::<_, NewsletterSubscription>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    pub async fn find_by_email<'e>(
        executor: impl PgExecutor<'e>,
        email: &str,
    ) -> Result<Option<NewsletterSubscription>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM newsletter_subscriptions WHERE email = $1");
        sqlx::query_as::<_, NewsletterSubscription>(&query)
            .bind(email)
            .fetch_optional(executor)
            .await
    }

    /// Mark the subscription owning `token_hash` as verified. Already
    /// verified rows keep their original timestamp.
    pub async fn verify_by_token_hash<'e>(
        executor: impl PgExecutor<'e>,
        token_hash: &str,
    ) -> Result<Option<NewsletterSubscription>, sqlx::Error> {
        let query = format!(
            "UPDATE newsletter_subscriptions SET verified_at = COALESCE(verified_at, NOW())
             WHERE verification_token = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, NewsletterSubscription>(&query)
            .bind(token_hash)
            .fetch_optional(executor)
            .await
    }

    /// Deactivate the subscription owning `token_hash`.
    pub async fn unsubscribe_by_token_hash<'e>(
        executor: impl PgExecutor<'e>,
        token_hash: &str,
    ) -> Result<Option<NewsletterSubscription>, sqlx::Error> {
        let query = format!(
            "UPDATE newsletter_subscriptions SET
                is_active = FALSE,
                unsubscribed_at = COALESCE(unsubscribed_at, NOW())
             WHERE verification_token = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, NewsletterSubscription>(&query)
            .bind(token_hash)
            .fetch_optional(executor)
            .await
    }

    /// An empty program list means "all programs", so it matches any
    /// program filter.
    fn build_filter(filter: &NewsletterFilter, options: &ListOptions) -> FilterBuilder {
        let mut f = FilterBuilder::new();
        if let Some(code) = &filter.program {
            f.push(code.to_uppercase(), |p| {
                format!("({p} = ANY(s.programs) OR s.programs = '{{}}')")
            });
        }
        f.eq_opt("s.is_active", filter.is_active);
        match filter.verified {
            Some(true) => f.raw("s.verified_at IS NOT NULL"),
            Some(false) => f.raw("s.verified_at IS NULL"),
            None => {}
        }
        f.search(&["s.email", "s.name"], options.search_pattern());
        f
    }

    pub async fn list(
        pool: &PgPool,
        filter: &NewsletterFilter,
        options: &ListOptions,
    ) -> Result<Page<NewsletterSubscription>, sqlx::Error> {
        let f = Self::build_filter(filter, options);
        fetch_page(
            pool,
            COLUMNS,
            "newsletter_subscriptions s",
            &f,
            &options.order_by(Some("s")),
            options,
        )
        .await
    }

    pub async fn export(
        pool: &PgPool,
        filter: &NewsletterFilter,
        options: &ListOptions,
    ) -> Result<Vec<NewsletterSubscription>, sqlx::Error> {
        let f = Self::build_filter(filter, options);
        fetch_all(
            pool,
            COLUMNS,
            "newsletter_subscriptions s",
            &f,
            &options.order_by(Some("s")),
        )
        .await
    }

    pub async fn delete<'e>(executor: impl PgExecutor<'e>, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM newsletter_subscriptions WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
