//! Refresh-token sessions: single redemption, bulk revocation, purging.

mod common;

use chrono::{Duration, Utc};
use sqlx::PgPool;

use erasmus_db::models::session::CreateSession;
use erasmus_db::repositories::SessionRepo;

fn session_for(user_id: i64, token_hash: &str, expires_in: Duration) -> CreateSession {
    CreateSession {
        user_id,
        refresh_token_hash: token_hash.to_string(),
        expires_at: Utc::now() + expires_in,
        user_agent: Some("Mozilla/5.0".to_string()),
        ip_address: Some("10.0.0.7".to_string()),
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn session_is_revoked_only_once(pool: PgPool) {
    let user = common::create_user(&pool, "secretaria@centro.es", "editor").await;
    let session = SessionRepo::open(&pool, &session_for(user.id, "hash-a", Duration::days(7)))
        .await
        .unwrap();

    let live = SessionRepo::find_live(&pool, "hash-a").await.unwrap();
    assert_eq!(live.map(|s| s.id), Some(session.id));

    assert!(SessionRepo::revoke(&pool, session.id).await.unwrap());
    assert!(!SessionRepo::revoke(&pool, session.id).await.unwrap());
    assert!(SessionRepo::find_live(&pool, "hash-a").await.unwrap().is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn expired_session_is_not_live(pool: PgPool) {
    let user = common::create_user(&pool, "secretaria@centro.es", "editor").await;
    SessionRepo::open(&pool, &session_for(user.id, "hash-old", -Duration::hours(1)))
        .await
        .unwrap();

    assert!(SessionRepo::find_live(&pool, "hash-old").await.unwrap().is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn purge_keeps_only_live_sessions(pool: PgPool) {
    let user = common::create_user(&pool, "secretaria@centro.es", "editor").await;
    let other = common::create_user(&pool, "direccion@centro.es", "admin").await;
    SessionRepo::open(&pool, &session_for(user.id, "hash-1", Duration::days(7)))
        .await
        .unwrap();
    SessionRepo::open(&pool, &session_for(user.id, "hash-2", Duration::days(7)))
        .await
        .unwrap();
    SessionRepo::open(&pool, &session_for(user.id, "hash-3", -Duration::days(1)))
        .await
        .unwrap();
    SessionRepo::open(&pool, &session_for(other.id, "hash-4", Duration::days(7)))
        .await
        .unwrap();

    assert_eq!(SessionRepo::revoke_all_for_user(&pool, user.id).await.unwrap(), 3);
    assert_eq!(SessionRepo::purge_stale(&pool).await.unwrap(), 3);
    assert!(SessionRepo::find_live(&pool, "hash-4").await.unwrap().is_some());
}
