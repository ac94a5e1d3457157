//! Shared harness for the HTTP integration tests.
//!
//! Requests go straight to the router through `tower::ServiceExt::oneshot`.
//! Tokens are minted with the same JWT settings the test app validates
//! against, so handlers see real `AuthUser`s.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::extract::connect_info::MockConnectInfo;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tower::ServiceExt;

use erasmus_api::auth::jwt::{generate_access_token, JwtConfig};
use erasmus_api::auth::password::hash_password;
use erasmus_api::config::{LogFormat, ServerConfig};
use erasmus_api::router::build_app_router;
use erasmus_api::state::AppState;
use erasmus_db::models::academic_year::{AcademicYear, CreateAcademicYear};
use erasmus_db::models::program::{CreateProgram, Program};
use erasmus_db::models::user::{CreateUser, User};
use erasmus_db::repositories::{AcademicYearRepo, ProgramRepo, RoleRepo, UserRepo};

pub const TEST_PASSWORD: &str = "movilidad2025";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        database_url: "postgres://localhost/erasmus_test".to_string(),
        db_max_connections: 5,
        log_format: LogFormat::Pretty,
        jwt: JwtConfig {
            secret: "integration-test-secret-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 7,
        },
    }
}

/// Peer address every test request appears to come from.
pub const TEST_PEER: ([u8; 4], u16) = ([198, 51, 100, 23], 40123);

/// Full application router over `pool`, with the production middleware stack.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config).layer(MockConnectInfo(SocketAddr::from(TEST_PEER)))
}

/// A pool that never connects until a query runs. Requests rejected before
/// any query (missing token, forbidden role, invalid body) work without a
/// database.
pub fn lazy_pool() -> PgPool {
    PgPoolOptions::new()
        .max_connections(1)
        .acquire_timeout(Duration::from_secs(1))
        .connect_lazy("postgres://nobody@127.0.0.1:1/unreachable")
        .expect("lazy pool construction never connects")
}

/// Bearer token for an arbitrary user id and role.
pub fn token_for(user_id: i64, role: &str) -> String {
    generate_access_token(user_id, role, &test_config().jwt).expect("token generation")
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Insert a user with [`TEST_PASSWORD`] and return it with a matching token.
pub async fn create_user(pool: &PgPool, email: &str, role: &str) -> (User, String) {
    let role_row = RoleRepo::find_by_name(pool, role)
        .await
        .unwrap()
        .expect("seeded role");
    let user = UserRepo::create(
        pool,
        &CreateUser {
            name: format!("Usuario {role}"),
            email: email.to_string(),
            password_hash: hash_password(TEST_PASSWORD).unwrap(),
            role_id: role_row.id,
        },
    )
    .await
    .unwrap();
    let token = token_for(user.id, role);
    (user, token)
}

pub async fn create_program(pool: &PgPool, code: &str, name: &str) -> Program {
    let input = CreateProgram {
        code: code.to_string(),
        name: name.to_string(),
        slug: None,
        description: None,
        is_active: None,
        sort_order: None,
    };
    let slug = erasmus_core::slug::slugify(name);
    ProgramRepo::create(pool, &input, &slug).await.unwrap()
}

pub async fn create_year(pool: &PgPool, year: &str) -> AcademicYear {
    let start: i32 = year[..4].parse().unwrap();
    AcademicYearRepo::create(
        pool,
        &CreateAcademicYear {
            year: year.to_string(),
            start_date: chrono::NaiveDate::from_ymd_opt(start, 9, 1).unwrap(),
            end_date: chrono::NaiveDate::from_ymd_opt(start + 1, 6, 30).unwrap(),
            is_current: Some(false),
        },
    )
    .await
    .unwrap()
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Response<Body> {
    let builder = Request::builder().method(method).uri(uri);
    send_with(app, builder, token, body).await
}

/// Like [`send`], starting from a builder that may carry extra headers.
pub async fn send_with(
    app: Router,
    mut builder: axum::http::request::Builder,
    token: Option<&str>,
    body: Option<Value>,
) -> Response<Body> {
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), None).await
}

pub async fn put_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response<Body> {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(token), None).await
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
