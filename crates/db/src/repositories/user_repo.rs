//! Repository for the `users` table.

use sqlx::{PgExecutor, PgPool};

use erasmus_core::listing::{ListOptions, Page};
use erasmus_core::types::DbId;

use crate::filter::{fetch_page, FilterBuilder};
use crate::models::user::{CreateUser, UpdateUser, User, UserFilter, UserResponse};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, email, password_hash, role_id, is_active, last_login_at, \
                       deleted_at, created_at, updated_at";

const RESPONSE_SELECT: &str = "u.id, u.name, u.email, r.name AS role, u.role_id, u.is_active, \
                               u.last_login_at, u.deleted_at, u.created_at";

const RESPONSE_FROM: &str = "users u JOIN roles r ON r.id = u.role_id";

/// Provides CRUD operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    pub async fn create<'e>(
        executor: impl PgExecutor<'e>,
        input: &CreateUser,
    ) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (name, email, password_hash, role_id)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(input.name.trim())
            .bind(input.email.trim().to_lowercase())
            .bind(&input.password_hash)
            .bind(input.role_id)
            .fetch_one(executor)
            .await
    }

    /// Find a live user by internal ID.
    pub async fn find_by_id<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    pub async fn find_by_id_include_deleted<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Find a live user by email (stored lowercase).
    pub async fn find_by_email<'e>(
        executor: impl PgExecutor<'e>,
        email: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM users WHERE email = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, User>(&query)
            .bind(email.trim().to_lowercase())
            .fetch_optional(executor)
            .await
    }

    /// Public projection of one user, including trashed ones.
    pub async fn find_response<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<Option<UserResponse>, sqlx::Error> {
        let query = format!("SELECT {RESPONSE_SELECT} FROM {RESPONSE_FROM} WHERE u.id = $1");
        sqlx::query_as::<_, UserResponse>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Paginated index. Search matches name and email.
    pub async fn list(
        pool: &PgPool,
        filter: &UserFilter,
        options: &ListOptions,
    ) -> Result<Page<UserResponse>, sqlx::Error> {
        let mut f = FilterBuilder::new();
        f.trashed(options.trashed, "u.deleted_at");
        f.eq_opt("r.name", filter.role.clone());
        f.eq_opt("u.is_active", filter.is_active);
        f.search(&["u.name", "u.email"], options.search_pattern());
        fetch_page(
            pool,
            RESPONSE_SELECT,
            RESPONSE_FROM,
            &f,
            &options.order_by(Some("u")),
            options,
        )
        .await
    }

    /// Update a user. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no live row with the given `id` exists.
    pub async fn update<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
        input: &UpdateUser,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET
                name = COALESCE($2, name),
                email = COALESCE($3, email),
                password_hash = COALESCE($4, password_hash),
                role_id = COALESCE($5, role_id),
                is_active = COALESCE($6, is_active)
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(input.name.as_deref().map(str::trim))
            .bind(input.email.as_deref().map(|e| e.trim().to_lowercase()))
            .bind(&input.password_hash)
            .bind(input.role_id)
            .bind(input.is_active)
            .fetch_optional(executor)
            .await
    }

    /// Set `last_login_at` to now.
    pub async fn record_login<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(())
    }

    pub async fn soft_delete<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE users SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL")
                .bind(id)
                .execute(executor)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn restore<'e>(executor: impl PgExecutor<'e>, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET deleted_at = NULL WHERE id = $1 AND deleted_at IS NOT NULL",
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
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
