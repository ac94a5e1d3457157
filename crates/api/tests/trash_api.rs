//! Trash listing, per-type summary and parent-aware restore.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, build_test_app, create_program, create_user, create_year, delete_auth, get_auth,
    post_auth, post_json_auth,
};
use serde_json::{json, Value};
use sqlx::PgPool;

async fn trash(pool: &PgPool, token: &str, uri: &str) -> Value {
    let response = get_auth(build_test_app(pool.clone()), uri, token).await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await
}

async fn delete(pool: &PgPool, token: &str, uri: &str) {
    let response = delete_auth(build_test_app(pool.clone()), uri, token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT, "DELETE {uri}");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn trash_starts_empty(pool: PgPool) {
    let (_, token) = create_user(&pool, "admin@centro.es", "admin").await;

    let json = trash(&pool, &token, "/api/v1/trash").await;
    assert_eq!(json["total_count"], 0);
    assert_eq!(json["items"], json!([]));

    let json = trash(&pool, &token, "/api/v1/trash/summary").await;
    assert_eq!(json["total_count"], 0);
    assert_eq!(json["counts_by_type"], json!([]));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn trashed_rows_are_listed_and_counted(pool: PgPool) {
    let (_, token) = create_user(&pool, "admin@centro.es", "admin").await;
    let program = create_program(&pool, "KA121-VET", "Movilidad FP").await;
    let year = create_year(&pool, "2024-2025").await;

    delete(&pool, &token, &format!("/api/v1/programs/{}", program.id)).await;
    delete(&pool, &token, &format!("/api/v1/academic-years/{}", year.id)).await;

    let json = trash(&pool, &token, "/api/v1/trash").await;
    assert_eq!(json["total_count"], 2);

    let json = trash(&pool, &token, "/api/v1/trash?type=programs").await;
    assert_eq!(json["total_count"], 1);
    assert_eq!(json["items"][0]["id"], program.id);
    assert_eq!(json["items"][0]["entity_type"], "programs");
    assert_eq!(json["items"][0]["name_or_label"], "Movilidad FP");

    let json = trash(&pool, &token, "/api/v1/trash/summary").await;
    assert_eq!(json["total_count"], 2);
    let counts = json["counts_by_type"].as_array().unwrap();
    assert_eq!(counts.len(), 2);
    assert!(counts
        .iter()
        .all(|c| c["count"] == 1 && (c["entity_type"] == "programs" || c["entity_type"] == "academic_years")));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn restore_waits_for_trashed_parent(pool: PgPool) {
    let (_, token) = create_user(&pool, "admin@centro.es", "admin").await;
    let program = create_program(&pool, "KA121-VET", "Movilidad FP").await;
    let year = create_year(&pool, "2025-2026").await;

    let response = post_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/calls",
        json!({
            "program_id": program.id,
            "academic_year_id": year.id,
            "title": "Job shadowing Finlandia",
            "call_type": "personal",
            "modality": "corta"
        }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let call_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    delete(&pool, &token, &format!("/api/v1/calls/{call_id}")).await;
    delete(&pool, &token, &format!("/api/v1/programs/{}", program.id)).await;

    let response = post_auth(
        build_test_app(pool.clone()),
        &format!("/api/v1/trash/calls/{call_id}/restore"),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("el programa"));

    let response = post_auth(
        build_test_app(pool.clone()),
        &format!("/api/v1/trash/programs/{}/restore", program.id),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = post_auth(
        build_test_app(pool.clone()),
        &format!("/api/v1/trash/calls/{call_id}/restore"),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["restored"], true);
    assert_eq!(json["entity_type"], "calls");

    let json = trash(&pool, &token, "/api/v1/trash").await;
    assert_eq!(json["total_count"], 0);

    let restored: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM activity_log WHERE event = 'restored' AND subject_type IN ('program', 'call')",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(restored, 2);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn restoring_a_live_row_is_not_found(pool: PgPool) {
    let (_, token) = create_user(&pool, "admin@centro.es", "admin").await;
    let program = create_program(&pool, "KA121-VET", "Movilidad FP").await;

    let response = post_auth(
        build_test_app(pool.clone()),
        &format!("/api/v1/trash/programs/{}/restore", program.id),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
