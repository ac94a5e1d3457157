//! Repository for the `call_applications` table. Scoped by call.

use sqlx::{PgExecutor, PgPool};

use erasmus_core::listing::{ListOptions, Page};
use erasmus_core::types::DbId;

use crate::filter::{fetch_page, FilterBuilder};
use crate::models::call_application::{
    CallApplication, CallApplicationFilter, CreateCallApplication, UpdateCallApplication,
};

const COLUMNS: &str = "id, call_id, applicant_name, applicant_email, applicant_phone, status, \
                       score, notes, deleted_at, created_at, updated_at";

pub struct CallApplicationRepo;

impl CallApplicationRepo {
    pub async fn create<'e>(
        executor: impl PgExecutor<'e>,
        call_id: DbId,
        input: &CreateCallApplication,
    ) -> Result<CallApplication, sqlx::Error> {
        let query = format!(
            "INSERT INTO call_applications (call_id, applicant_name, applicant_email,
                applicant_phone, status, score, notes)
             VALUES ($1, $2, $3, $4, COALESCE($5, 'pendiente'), $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CallApplication>(&query)
            .bind(call_id)
            .bind(input.applicant_name.trim())
            .bind(input.applicant_email.trim().to_lowercase())
            .bind(&input.applicant_phone)
            .bind(&input.status)
            .bind(input.score)
            .bind(&input.notes)
            .fetch_one(executor)
            .await
    }

    pub async fn find_by_id<'e>(
        executor: impl PgExecutor<'e>,
        call_id: DbId,
        id: DbId,
    ) -> Result<Option<CallApplication>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM call_applications
             WHERE id = $1 AND call_id = $2 AND deleted_at IS NULL"
        );
        sqlx::query_as::<_, CallApplication>(&query)
            .bind(id)
            .bind(call_id)
            .fetch_optional(executor)
            .await
    }

    /// Find a live application by ID regardless of its call.
    pub async fn find_any<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<Option<CallApplication>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM call_applications WHERE id = $1 AND deleted_at IS NULL"
        );
        sqlx::query_as::<_, CallApplication>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    pub async fn find_by_id_include_deleted<'e>(
        executor: impl PgExecutor<'e>,
        call_id: DbId,
        id: DbId,
    ) -> Result<Option<CallApplication>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM call_applications WHERE id = $1 AND call_id = $2");
        sqlx::query_as::<_, CallApplication>(&query)
            .bind(id)
            .bind(call_id)
            .fetch_optional(executor)
            .await
    }

    /// Paginated index. Search matches applicant name and email.
    pub async fn list(
        pool: &PgPool,
        call_id: DbId,
        filter: &CallApplicationFilter,
        options: &ListOptions,
    ) -> Result<Page<CallApplication>, sqlx::Error> {
        let mut f = FilterBuilder::new();
        f.eq("a.call_id", call_id);
        f.trashed(options.trashed, "a.deleted_at");
        f.eq_opt("a.status", filter.status.clone());
        f.search(
            &["a.applicant_name", "a.applicant_email"],
            options.search_pattern(),
        );
        fetch_page(
            pool,
            COLUMNS,
            "call_applications a",
            &f,
            &options.order_by(Some("a")),
            options,
        )
        .await
    }

    pub async fn update<'e>(
        executor: impl PgExecutor<'e>,
        call_id: DbId,
        id: DbId,
        input: &UpdateCallApplication,
    ) -> Result<Option<CallApplication>, sqlx::Error> {
        let query = format!(
            "UPDATE call_applications SET
                applicant_name = COALESCE($3, applicant_name),
                applicant_email = COALESCE($4, applicant_email),
                applicant_phone = COALESCE($5, applicant_phone),
                score = COALESCE($6, score),
                notes = COALESCE($7, notes)
             WHERE id = $1 AND call_id = $2 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CallApplication>(&query)
            .bind(id)
            .bind(call_id)
            .bind(input.applicant_name.as_deref().map(str::trim))
            .bind(input.applicant_email.as_deref().map(|e| e.trim().to_lowercase()))
            .bind(&input.applicant_phone)
            .bind(input.score)
            .bind(&input.notes)
            .fetch_optional(executor)
            .await
    }

    pub async fn set_status<'e>(
        executor: impl PgExecutor<'e>,
        call_id: DbId,
        id: DbId,
        status: &str,
    ) -> Result<Option<CallApplication>, sqlx::Error> {
        let query = format!(
            "UPDATE call_applications SET status = $3
             WHERE id = $1 AND call_id = $2 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CallApplication>(&query)
            .bind(id)
            .bind(call_id)
            .bind(status)
            .fetch_optional(executor)
            .await
    }

    pub async fn soft_delete<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE call_applications SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn restore<'e>(executor: impl PgExecutor<'e>, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE call_applications SET deleted_at = NULL
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
        let result = sqlx::query("DELETE FROM call_applications WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
