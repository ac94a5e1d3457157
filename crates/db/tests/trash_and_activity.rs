//! Cross-table trash views and the activity log.

mod common;

use serde_json::json;
use sqlx::PgPool;

use erasmus_core::listing::{ListOptions, ListParams};
use erasmus_db::models::activity::{ActivityFilter, CreateActivity, ACTIVITY_SORT};
use erasmus_db::repositories::{ActivityRepo, CallRepo, ProgramRepo, TrashRepo};

use common::{create_call, create_program, create_user, create_year};

fn activity(causer_id: i64, subject_id: i64, description: &str) -> CreateActivity {
    CreateActivity {
        log_name: "default".to_string(),
        description: description.to_string(),
        subject_type: Some("call".to_string()),
        subject_id: Some(subject_id),
        event: Some("updated".to_string()),
        causer_id: Some(causer_id),
        properties: json!({ "attributes": { "title": "Convocatoria FCT" }, "ip_address": "127.0.0.1" }),
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn trash_lists_and_counts_soft_deleted_rows(pool: PgPool) {
    let user = create_user(&pool, "admin@example.org", "admin").await;
    let program = create_program(&pool, "KA131", "Movilidad de estudiantes").await;
    let year = create_year(&pool, "2024-2025", false).await;
    let call = create_call(&pool, program.id, year.id, "Convocatoria FCT", user.id).await;

    CallRepo::soft_delete(&pool, call.id).await.unwrap();
    ProgramRepo::soft_delete(&pool, program.id).await.unwrap();

    let all = TrashRepo::list_trashed(&pool, None).await.unwrap();
    assert_eq!(all.total_count, 2);

    let calls = TrashRepo::list_trashed(&pool, Some("calls")).await.unwrap();
    assert_eq!(calls.total_count, 1);
    assert_eq!(calls.items[0].name_or_label.as_deref(), Some("Convocatoria FCT"));

    let summary = TrashRepo::summary(&pool).await.unwrap();
    assert_eq!(summary.total_count, 2);
    assert_eq!(summary.counts_by_type.len(), 2);
}

#[sqlx::test(migrations = "./migrations")]
async fn restore_is_blocked_while_parent_is_trashed(pool: PgPool) {
    let user = create_user(&pool, "admin@example.org", "admin").await;
    let program = create_program(&pool, "KA131", "Movilidad de estudiantes").await;
    let year = create_year(&pool, "2024-2025", false).await;
    let call = create_call(&pool, program.id, year.id, "Convocatoria FCT", user.id).await;

    CallRepo::soft_delete(&pool, call.id).await.unwrap();
    assert!(TrashRepo::check_parent_trashed(&pool, "calls", call.id)
        .await
        .unwrap()
        .is_none());

    ProgramRepo::soft_delete(&pool, program.id).await.unwrap();
    let message = TrashRepo::check_parent_trashed(&pool, "calls", call.id)
        .await
        .unwrap()
        .unwrap();
    assert!(message.contains("el programa"));
}

#[sqlx::test(migrations = "./migrations")]
async fn activity_list_joins_causer_and_searches_properties(pool: PgPool) {
    let user = create_user(&pool, "admin@example.org", "admin").await;
    let id = ActivityRepo::insert(&pool, &activity(user.id, 7, "updated"))
        .await
        .unwrap();
    ActivityRepo::insert(&pool, &activity(user.id, 8, "created"))
        .await
        .unwrap();

    let entry = ActivityRepo::find_by_id(&pool, id).await.unwrap().unwrap();
    assert_eq!(entry.causer_name.as_deref(), Some("Test User"));
    assert_eq!(entry.property_str("ip_address"), Some("127.0.0.1"));

    let options = ListOptions::resolve(
        &ListParams {
            search: Some("Convocatoria".to_string()),
            ..ListParams::default()
        },
        &ACTIVITY_SORT,
    )
    .unwrap();
    let found = ActivityRepo::list(&pool, &ActivityFilter::default(), &options)
        .await
        .unwrap();
    assert_eq!(found.meta.total, 2);

    let default = ListOptions::resolve(&ListParams::default(), &ACTIVITY_SORT).unwrap();
    let history = ActivityRepo::for_subject(&pool, "call", 7, &default)
        .await
        .unwrap();
    assert_eq!(history.meta.total, 1);
    assert_eq!(history.data[0].id, id);
}

#[sqlx::test(migrations = "./migrations")]
async fn set_current_year_is_exclusive(pool: PgPool) {
    let old = create_year(&pool, "2023-2024", true).await;
    let new = create_year(&pool, "2024-2025", false).await;

    let current = erasmus_db::repositories::AcademicYearRepo::set_current(&pool, new.id)
        .await
        .unwrap()
        .unwrap();
    assert!(current.is_current);

    let previous = erasmus_db::repositories::AcademicYearRepo::find_by_id(&pool, old.id)
        .await
        .unwrap()
        .unwrap();
    assert!(!previous.is_current);
}
