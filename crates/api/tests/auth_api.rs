//! Login, refresh-token rotation, logout and `/auth/me`.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, build_test_app, create_user, get_auth, post_auth, post_json, TEST_PASSWORD,
};
use serde_json::{json, Value};
use sqlx::PgPool;

async fn login(pool: &PgPool, email: &str, password: &str) -> (StatusCode, Value) {
    let response = post_json(
        build_test_app(pool.clone()),
        "/api/v1/auth/login",
        json!({ "email": email, "password": password }),
    )
    .await;
    let status = response.status();
    (status, body_json(response).await)
}

#[sqlx::test(migrations = "../db/migrations")]
async fn login_returns_tokens_and_profile(pool: PgPool) {
    let (user, _) = create_user(&pool, "coordinacion@centro.es", "editor").await;

    let (status, json) = login(&pool, "Coordinacion@Centro.es", TEST_PASSWORD).await;

    assert_eq!(status, StatusCode::OK);
    assert!(json["access_token"].is_string());
    assert!(json["refresh_token"].is_string());
    assert_eq!(json["expires_in"], 15 * 60);
    assert_eq!(json["user"]["id"], user.id);
    assert_eq!(json["user"]["email"], "coordinacion@centro.es");
    assert_eq!(json["user"]["role"], "editor");
    assert!(json["user"].get("password_hash").is_none());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn wrong_password_and_unknown_email_look_the_same(pool: PgPool) {
    create_user(&pool, "admin@centro.es", "admin").await;

    let (status_pw, json_pw) = login(&pool, "admin@centro.es", "incorrecta123").await;
    let (status_email, json_email) = login(&pool, "nadie@centro.es", TEST_PASSWORD).await;

    assert_eq!(status_pw, StatusCode::UNAUTHORIZED);
    assert_eq!(status_email, StatusCode::UNAUTHORIZED);
    assert_eq!(json_pw["error"], json_email["error"]);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn deactivated_account_cannot_log_in(pool: PgPool) {
    let (user, _) = create_user(&pool, "baja@centro.es", "viewer").await;
    sqlx::query("UPDATE users SET is_active = false WHERE id = $1")
        .bind(user.id)
        .execute(&pool)
        .await
        .unwrap();

    let (status, _) = login(&pool, "baja@centro.es", TEST_PASSWORD).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn login_is_recorded_in_activity_log(pool: PgPool) {
    let (user, _) = create_user(&pool, "registro@centro.es", "admin").await;
    let (status, _) = login(&pool, "registro@centro.es", TEST_PASSWORD).await;
    assert_eq!(status, StatusCode::OK);

    let (event, causer_id): (Option<String>, Option<i64>) = sqlx::query_as(
        "SELECT event, causer_id FROM activity_log WHERE subject_type = 'user' AND subject_id = $1",
    )
    .bind(user.id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(event.as_deref(), Some("login"));
    assert_eq!(causer_id, Some(user.id));

    let last_login: Option<chrono::DateTime<chrono::Utc>> =
        sqlx::query_scalar("SELECT last_login_at FROM users WHERE id = $1")
            .bind(user.id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert!(last_login.is_some());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn refresh_rotates_the_token(pool: PgPool) {
    create_user(&pool, "rotar@centro.es", "viewer").await;
    let (_, json) = login(&pool, "rotar@centro.es", TEST_PASSWORD).await;
    let first = json["refresh_token"].as_str().unwrap().to_string();

    let response = post_json(
        build_test_app(pool.clone()),
        "/api/v1/auth/refresh",
        json!({ "refresh_token": first }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let refreshed = body_json(response).await;
    assert_ne!(refreshed["refresh_token"].as_str().unwrap(), first);

    let reused = post_json(
        build_test_app(pool.clone()),
        "/api/v1/auth/refresh",
        json!({ "refresh_token": first }),
    )
    .await;
    assert_eq!(reused.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn logout_revokes_every_session(pool: PgPool) {
    create_user(&pool, "salir@centro.es", "editor").await;
    let (_, json) = login(&pool, "salir@centro.es", TEST_PASSWORD).await;
    let access = json["access_token"].as_str().unwrap().to_string();
    let refresh = json["refresh_token"].as_str().unwrap().to_string();

    let response = post_auth(build_test_app(pool.clone()), "/api/v1/auth/logout", &access).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = post_json(
        build_test_app(pool.clone()),
        "/api/v1/auth/refresh",
        json!({ "refresh_token": refresh }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let events: Vec<String> = sqlx::query_scalar(
        "SELECT event FROM activity_log WHERE subject_type = 'user' ORDER BY id",
    )
    .fetch_all(&pool)
    .await
    .unwrap();
    assert_eq!(events, vec!["login".to_string(), "logout".to_string()]);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn me_returns_current_user(pool: PgPool) {
    let (user, token) = create_user(&pool, "yo@centro.es", "viewer").await;

    let response = get_auth(build_test_app(pool), "/api/v1/auth/me", &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["id"], user.id);
    assert_eq!(json["data"]["role"], "viewer");
}
