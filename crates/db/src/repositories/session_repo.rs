//! Refresh-token sessions of back-office users.
//!
//! Only the SHA-256 digest of a refresh token is stored. A session is live
//! while it is unrevoked and unexpired; refreshing revokes the presented
//! session and opens a new one, and a password change, deactivation, delete
//! or logout revokes all of a user's sessions at once.

use sqlx::PgExecutor;

use erasmus_core::types::DbId;

use crate::models::session::{CreateSession, UserSession};

const COLUMNS: &str = "id, user_id, refresh_token_hash, expires_at, is_revoked, \
                       user_agent, ip_address, created_at, updated_at";

pub struct SessionRepo;

impl SessionRepo {
    pub async fn open<'e>(
        executor: impl PgExecutor<'e>,
        input: &CreateSession,
    ) -> Result<UserSession, sqlx::Error> {
        let query = format!(
            "INSERT INTO sessions (user_id, refresh_token_hash, expires_at, user_agent, ip_address)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserSession>(&query)
            .bind(input.user_id)
            .bind(&input.refresh_token_hash)
            .bind(input.expires_at)
            .bind(&input.user_agent)
            .bind(&input.ip_address)
            .fetch_one(executor)
            .await
    }

    pub async fn find_live<'e>(
        executor: impl PgExecutor<'e>,
        token_hash: &str,
    ) -> Result<Option<UserSession>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM sessions
             WHERE refresh_token_hash = $1
               AND NOT is_revoked
               AND expires_at > NOW()"
        );
        sqlx::query_as::<_, UserSession>(&query)
            .bind(token_hash)
            .fetch_optional(executor)
            .await
    }

    /// `false` when another request revoked the session first, so a refresh
    /// token can be redeemed once even under concurrent requests.
    pub async fn revoke<'e>(executor: impl PgExecutor<'e>, id: DbId) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE sessions SET is_revoked = TRUE WHERE id = $1 AND NOT is_revoked")
                .bind(id)
                .execute(executor)
                .await?;
        Ok(result.rows_affected() == 1)
    }

    pub async fn revoke_all_for_user<'e>(
        executor: impl PgExecutor<'e>,
        user_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        sqlx::query("UPDATE sessions SET is_revoked = TRUE WHERE user_id = $1 AND NOT is_revoked")
            .bind(user_id)
            .execute(executor)
            .await
            .map(|done| done.rows_affected())
    }

    /// Housekeeping run at startup: drops sessions that can never be used
    /// again.
    pub async fn purge_stale<'e>(executor: impl PgExecutor<'e>) -> Result<u64, sqlx::Error> {
        sqlx::query("DELETE FROM sessions WHERE is_revoked OR expires_at <= NOW()")
            .execute(executor)
            .await
            .map(|done| done.rows_affected())
    }
}
