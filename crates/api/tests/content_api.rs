//! Resource lifecycles through the HTTP surface: slugs, dependents guards,
//! call publication and status changes, typed settings.

mod common;

use axum::http::{Method, Request, StatusCode};
use common::{
    body_json, build_test_app, create_program, create_user, create_year, delete_auth, get_auth,
    post_auth, post_json_auth, put_json_auth, send_with, token_for,
};
use serde_json::{json, Value};
use sqlx::PgPool;

async fn create_call(pool: &PgPool, token: &str, program_id: i64, year_id: i64) -> Value {
    create_titled_call(pool, token, program_id, year_id, "Movilidad FCT Italia").await
}

async fn create_titled_call(
    pool: &PgPool,
    token: &str,
    program_id: i64,
    year_id: i64,
    title: &str,
) -> Value {
    let response = post_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/calls",
        json!({
            "program_id": program_id,
            "academic_year_id": year_id,
            "title": title,
            "call_type": "alumnado",
            "modality": "larga",
            "number_of_places": 12,
            "destinations": ["Italia", "Malta"]
        }),
        token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"].clone()
}

async fn subject_events(pool: &PgPool, token: &str, subject_type: &str, id: i64) -> Vec<Value> {
    let response = get_auth(
        build_test_app(pool.clone()),
        &format!("/api/v1/activity-log/subject/{subject_type}/{id}"),
        token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["data"]
        .as_array()
        .cloned()
        .unwrap_or_default()
}

fn find_event<'a>(entries: &'a [Value], event: &str) -> &'a Value {
    entries
        .iter()
        .find(|e| e["event"] == event)
        .unwrap_or_else(|| panic!("no '{event}' entry in {entries:?}"))
}

#[sqlx::test(migrations = "../db/migrations")]
async fn program_crud_with_slugs_and_activity(pool: PgPool) {
    let (_, token) = create_user(&pool, "admin@centro.es", "admin").await;

    let response = post_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/programs",
        json!({ "code": "KA121-VET", "name": "Movilidad FP" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let first = body_json(response).await["data"].clone();
    assert_eq!(first["slug"], "movilidad-fp");

    let response = post_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/programs",
        json!({ "code": "KA122-VET", "name": "Movilidad FP" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let second = body_json(response).await["data"].clone();
    assert_eq!(second["slug"], "movilidad-fp-2");

    let id = first["id"].as_i64().unwrap();
    let response = put_json_auth(
        build_test_app(pool.clone()),
        &format!("/api/v1/programs/{id}"),
        json!({ "name": "Movilidad Formación Profesional" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await["data"]["name"],
        "Movilidad Formación Profesional"
    );

    let entries = subject_events(&pool, &token, "program", id).await;
    let created = find_event(&entries, "created");
    assert_eq!(created["properties"]["attributes"]["code"], "KA121-VET");
    let updated = find_event(&entries, "updated");
    assert_eq!(
        updated["properties"]["attributes"]["name"],
        "Movilidad Formación Profesional"
    );
    assert_eq!(updated["properties"]["old"]["name"], "Movilidad FP");

    let response = delete_auth(
        build_test_app(pool.clone()),
        &format!("/api/v1/programs/{id}"),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get_auth(
        build_test_app(pool.clone()),
        &format!("/api/v1/programs/{id}"),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = get_auth(
        build_test_app(pool.clone()),
        "/api/v1/programs?trashed=only",
        &token,
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(json["meta"]["total"], 1);
    assert_eq!(json["data"][0]["id"], id);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn program_with_live_call_cannot_be_deleted(pool: PgPool) {
    let (_, token) = create_user(&pool, "admin@centro.es", "admin").await;
    let program = create_program(&pool, "KA121-VET", "Movilidad FP").await;
    let year = create_year(&pool, "2025-2026").await;
    create_call(&pool, &token, program.id, year.id).await;

    let response = delete_auth(
        build_test_app(pool.clone()),
        &format!("/api/v1/programs/{}", program.id),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let json = body_json(response).await;
    let message = json["error"].as_str().unwrap();
    assert!(message.contains("No se puede eliminar el programa"));
    assert!(message.contains("convocatorias"));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn call_publish_unpublish_and_status(pool: PgPool) {
    let (_, token) = create_user(&pool, "admin@centro.es", "admin").await;
    let program = create_program(&pool, "KA121-VET", "Movilidad FP").await;
    let year = create_year(&pool, "2025-2026").await;
    let call = create_call(&pool, &token, program.id, year.id).await;
    let id = call["id"].as_i64().unwrap();
    assert_eq!(call["status"], "borrador");
    assert_eq!(call["slug"], "movilidad-fct-italia");
    assert!(call["published_at"].is_null());

    let publish = Request::builder()
        .method(Method::POST)
        .uri(format!("/api/v1/calls/{id}/publish"))
        .header("User-Agent", "Mozilla/5.0 (Secretaría)");
    let response = send_with(build_test_app(pool.clone()), publish, Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let published = body_json(response).await["data"].clone();
    assert_eq!(published["status"], "abierta");
    assert!(published["published_at"].is_string());

    let response = post_auth(
        build_test_app(pool.clone()),
        &format!("/api/v1/calls/{id}/unpublish"),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let unpublished = body_json(response).await["data"].clone();
    assert_eq!(unpublished["status"], "borrador");
    assert!(unpublished["published_at"].is_null());

    let response = post_json_auth(
        build_test_app(pool.clone()),
        &format!("/api/v1/calls/{id}/status"),
        json!({ "status": "cerrada" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let closed = body_json(response).await["data"].clone();
    assert_eq!(closed["status"], "cerrada");
    assert!(closed["closed_at"].is_string());

    let entries = subject_events(&pool, &token, "call", id).await;
    let publish = find_event(&entries, "publish");
    assert_eq!(publish["properties"]["ip_address"], "198.51.100.23");
    assert_eq!(publish["properties"]["user_agent"], "Mozilla/5.0 (Secretaría)");
    let unpublish = find_event(&entries, "unpublish");
    assert_eq!(unpublish["properties"]["ip_address"], "198.51.100.23");
    let change = find_event(&entries, "status_changed");
    assert_eq!(change["properties"]["old_status"], "borrador");
    assert_eq!(change["properties"]["new_status"], "cerrada");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn editor_cannot_open_or_withdraw_a_call(pool: PgPool) {
    let (_, admin) = create_user(&pool, "admin@centro.es", "admin").await;
    let (_, editor) = create_user(&pool, "editor@centro.es", "editor").await;
    let program = create_program(&pool, "KA121-VET", "Movilidad FP").await;
    let year = create_year(&pool, "2025-2026").await;
    let call = create_call(&pool, &editor, program.id, year.id).await;
    let id = call["id"].as_i64().unwrap();
    let status_uri = format!("/api/v1/calls/{id}/status");

    let response = post_auth(
        build_test_app(pool.clone()),
        &format!("/api/v1/calls/{id}/publish"),
        &editor,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = post_json_auth(
        build_test_app(pool.clone()),
        &status_uri,
        json!({ "status": "abierta" }),
        &editor,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let (status, published_at): (String, Option<chrono::DateTime<chrono::Utc>>) =
        sqlx::query_as("SELECT status, published_at FROM calls WHERE id = $1")
            .bind(id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(status, "borrador");
    assert!(published_at.is_none());

    let response = post_json_auth(
        build_test_app(pool.clone()),
        &status_uri,
        json!({ "status": "abierta" }),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = post_json_auth(
        build_test_app(pool.clone()),
        &status_uri,
        json!({ "status": "borrador" }),
        &editor,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = post_json_auth(
        build_test_app(pool.clone()),
        &status_uri,
        json!({ "status": "cerrada" }),
        &editor,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["status"], "cerrada");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn failed_activity_entry_rolls_back_the_change(pool: PgPool) {
    let program = create_program(&pool, "KA121-VET", "Movilidad FP").await;
    // Valid admin token for a user row that does not exist: the activity
    // insert violates the causer foreign key.
    let token = token_for(999_999, "admin");

    let response = delete_auth(
        build_test_app(pool.clone()),
        &format!("/api/v1/programs/{}", program.id),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let deleted_at: Option<chrono::DateTime<chrono::Utc>> =
        sqlx::query_scalar("SELECT deleted_at FROM programs WHERE id = $1")
            .bind(program.id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert!(deleted_at.is_none());

    let response = post_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/programs",
        json!({ "code": "KA122-SCH", "name": "Movilidad escolar" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let programs: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM programs")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(programs, 1);
    let entries: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM activity_log")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(entries, 0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn resolution_phase_can_be_cleared_or_dropped_with_the_call(pool: PgPool) {
    let (_, token) = create_user(&pool, "admin@centro.es", "admin").await;
    let program = create_program(&pool, "KA121-VET", "Movilidad FP").await;
    let year = create_year(&pool, "2025-2026").await;
    let first = create_call(&pool, &token, program.id, year.id).await["id"]
        .as_i64()
        .unwrap();
    let second = create_titled_call(&pool, &token, program.id, year.id, "Movilidad FCT Malta")
        .await["id"]
        .as_i64()
        .unwrap();

    let response = post_json_auth(
        build_test_app(pool.clone()),
        &format!("/api/v1/calls/{first}/phases"),
        json!({ "phase_type": "provisional", "name": "Listado provisional" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let phase = body_json(response).await["data"]["id"].as_i64().unwrap();

    let response = post_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/resolutions",
        json!({
            "call_id": first,
            "call_phase_id": phase,
            "resolution_type": "provisional",
            "title": "Listado provisional de admitidos"
        }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let id = body_json(response).await["data"]["id"].as_i64().unwrap();
    let uri = format!("/api/v1/resolutions/{id}");

    let response = put_json_auth(
        build_test_app(pool.clone()),
        &uri,
        json!({ "title": "Listado provisional revisado" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["call_phase_id"], phase);

    let response = put_json_auth(
        build_test_app(pool.clone()),
        &uri,
        json!({ "call_phase_id": null }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_json(response).await["data"]["call_phase_id"].is_null());

    let response = put_json_auth(
        build_test_app(pool.clone()),
        &uri,
        json!({ "call_phase_id": phase }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = put_json_auth(
        build_test_app(pool.clone()),
        &uri,
        json!({ "call_id": second, "call_phase_id": phase }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = put_json_auth(
        build_test_app(pool.clone()),
        &uri,
        json!({ "call_id": second, "call_phase_id": null }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let moved = body_json(response).await["data"].clone();
    assert_eq!(moved["call_id"], second);
    assert!(moved["call_phase_id"].is_null());

    let response = put_json_auth(
        build_test_app(pool.clone()),
        &uri,
        json!({ "call_id": first }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let back = body_json(response).await["data"].clone();
    assert_eq!(back["call_id"], first);
    assert!(back["call_phase_id"].is_null());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn unknown_call_status_is_rejected(pool: PgPool) {
    let (_, token) = create_user(&pool, "admin@centro.es", "admin").await;
    let program = create_program(&pool, "KA121-VET", "Movilidad FP").await;
    let year = create_year(&pool, "2025-2026").await;
    let call = create_call(&pool, &token, program.id, year.id).await;

    let response = post_json_auth(
        build_test_app(pool.clone()),
        &format!("/api/v1/calls/{}/status", call["id"]),
        json!({ "status": "cancelada" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn editor_creates_but_cannot_delete(pool: PgPool) {
    let (_, token) = create_user(&pool, "editor@centro.es", "editor").await;

    let response = post_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/document-categories",
        json!({ "name": "Modelos y plantillas" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let response = delete_auth(
        build_test_app(pool.clone()),
        &format!("/api/v1/document-categories/{id}"),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let deleted_at: Option<chrono::DateTime<chrono::Utc>> =
        sqlx::query_scalar("SELECT deleted_at FROM document_categories WHERE id = $1")
            .bind(id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert!(deleted_at.is_none());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn settings_keep_their_type(pool: PgPool) {
    let (admin, token) = create_user(&pool, "admin@centro.es", "admin").await;

    let response = put_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/settings/items_per_page",
        json!({ "value": 20 }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["value"], 20);
    assert_eq!(json["data"]["setting_type"], "integer");
    assert_eq!(json["data"]["updated_by"], admin.id);

    let response = put_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/settings/items_per_page",
        json!({ "value": "muchos" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = get_auth(
        build_test_app(pool.clone()),
        "/api/v1/settings/newsletter_enabled",
        &token,
    )
    .await;
    assert_eq!(body_json(response).await["data"]["value"], true);
}
