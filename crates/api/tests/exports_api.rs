//! CSV exports: byte-order mark, Spanish headers, dated attachment names.

mod common;

use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::StatusCode;
use chrono::Utc;
use common::{
    body_bytes, build_test_app, create_program, create_user, create_year, get_auth,
    post_json_auth,
};
use serde_json::json;
use sqlx::PgPool;

const BOM: &[u8] = b"\xEF\xBB\xBF";

fn csv_text(bytes: &[u8]) -> String {
    assert!(bytes.starts_with(BOM), "missing byte-order mark");
    String::from_utf8(bytes[BOM.len()..].to_vec()).unwrap()
}

#[sqlx::test(migrations = "../db/migrations")]
async fn calls_export_is_a_spanish_csv(pool: PgPool) {
    let (_, token) = create_user(&pool, "admin@centro.es", "admin").await;
    let program = create_program(&pool, "KA121-VET", "Movilidad FP").await;
    let year = create_year(&pool, "2025-2026").await;

    let response = post_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/calls",
        json!({
            "program_id": program.id,
            "academic_year_id": year.id,
            "title": "Movilidad FCT, Italia",
            "call_type": "alumnado",
            "modality": "larga",
            "number_of_places": 8,
            "destinations": ["Roma", "Nápoles"]
        }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = get_auth(build_test_app(pool.clone()), "/api/v1/calls/export", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[CONTENT_TYPE].to_str().unwrap(),
        "text/csv; charset=utf-8"
    );
    let expected = format!(
        "attachment; filename=\"convocatorias-{}.csv\"",
        Utc::now().format("%Y-%m-%d")
    );
    assert_eq!(
        response.headers()[CONTENT_DISPOSITION].to_str().unwrap(),
        expected
    );

    let text = csv_text(&body_bytes(response).await);
    let mut lines = text.lines();
    let header = lines.next().unwrap();
    assert!(header.starts_with("ID,Título,Programa,Año Académico,Tipo,Modalidad"));

    let row = lines.next().unwrap();
    assert!(row.contains("\"Movilidad FCT, Italia\""));
    assert!(row.contains("Movilidad FP"));
    assert!(row.contains("2025-2026"));
    assert!(row.contains("Alumnado"));
    assert!(row.contains("Larga duración"));
    assert!(row.contains("\"Roma, Nápoles\""));
    assert!(row.contains("Borrador"));
    assert!(lines.next().is_none());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn export_honours_filters(pool: PgPool) {
    let (_, token) = create_user(&pool, "admin@centro.es", "admin").await;
    let vet = create_program(&pool, "KA121-VET", "Movilidad FP").await;
    let sch = create_program(&pool, "KA121-SCH", "Educación Escolar").await;
    let year = create_year(&pool, "2025-2026").await;

    for (program_id, title) in [(vet.id, "FCT Portugal"), (sch.id, "Curso Irlanda")] {
        let response = post_json_auth(
            build_test_app(pool.clone()),
            "/api/v1/calls",
            json!({
                "program_id": program_id,
                "academic_year_id": year.id,
                "title": title,
                "call_type": "alumnado",
                "modality": "corta"
            }),
            &token,
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = get_auth(
        build_test_app(pool.clone()),
        &format!("/api/v1/calls/export?program_id={}", sch.id),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let text = csv_text(&body_bytes(response).await);
    assert_eq!(text.lines().count(), 2);
    assert!(text.contains("Curso Irlanda"));
    assert!(!text.contains("FCT Portugal"));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn empty_activity_export_has_only_headers(pool: PgPool) {
    let (_, token) = create_user(&pool, "admin@centro.es", "admin").await;

    let response = get_auth(
        build_test_app(pool.clone()),
        "/api/v1/activity-log/export",
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let disposition = response.headers()[CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.contains("registro-actividad-"));

    let text = csv_text(&body_bytes(response).await);
    assert_eq!(text.lines().count(), 1);
}
