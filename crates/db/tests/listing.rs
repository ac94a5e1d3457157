//! Filtering, search, sorting and pagination of index queries.

mod common;

use sqlx::PgPool;

use erasmus_core::listing::{ListOptions, ListParams};
use erasmus_db::models::call::{CallFilter, CALL_SORT};
use erasmus_db::models::program::{ProgramFilter, PROGRAM_SORT};
use erasmus_db::repositories::{CallRepo, ProgramRepo};

use common::{create_call, create_program, create_user, create_year};

fn options(params: ListParams, spec: &erasmus_core::listing::SortSpec) -> ListOptions {
    ListOptions::resolve(&params, spec).unwrap()
}

#[sqlx::test(migrations = "./migrations")]
async fn search_matches_any_listed_column(pool: PgPool) {
    create_program(&pool, "KA131", "Movilidad de estudiantes").await;
    create_program(&pool, "KA121", "Acreditación de centros").await;

    let by_name = ProgramRepo::list(
        &pool,
        &ProgramFilter::default(),
        &options(
            ListParams {
                search: Some("  estudiantes ".to_string()),
                ..ListParams::default()
            },
            &PROGRAM_SORT,
        ),
    )
    .await
    .unwrap();
    assert_eq!(by_name.meta.total, 1);
    assert_eq!(by_name.data[0].code, "KA131");

    let by_code = ProgramRepo::list(
        &pool,
        &ProgramFilter::default(),
        &options(
            ListParams {
                search: Some("ka12".to_string()),
                ..ListParams::default()
            },
            &PROGRAM_SORT,
        ),
    )
    .await
    .unwrap();
    assert_eq!(by_code.meta.total, 1);
    assert_eq!(by_code.data[0].code, "KA121");
}

#[sqlx::test(migrations = "./migrations")]
async fn search_wildcards_are_literal(pool: PgPool) {
    create_program(&pool, "KA131", "Movilidad de estudiantes").await;

    let page = ProgramRepo::list(
        &pool,
        &ProgramFilter::default(),
        &options(
            ListParams {
                search: Some("%".to_string()),
                ..ListParams::default()
            },
            &PROGRAM_SORT,
        ),
    )
    .await
    .unwrap();
    assert_eq!(page.meta.total, 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn pagination_reports_meta(pool: PgPool) {
    for i in 0..12 {
        create_program(&pool, &format!("P{i:02}"), &format!("Programa {i:02}")).await;
    }

    let page = ProgramRepo::list(
        &pool,
        &ProgramFilter::default(),
        &options(
            ListParams {
                sort_field: Some("code".to_string()),
                sort_direction: Some("asc".to_string()),
                per_page: Some(10),
                page: Some(2),
                ..ListParams::default()
            },
            &PROGRAM_SORT,
        ),
    )
    .await
    .unwrap();

    assert_eq!(page.data.len(), 2);
    assert_eq!(page.meta.total, 12);
    assert_eq!(page.meta.last_page, 2);
    assert_eq!(page.meta.from, Some(11));
    assert_eq!(page.meta.to, Some(12));
    assert_eq!(page.data[0].code, "P10");
}

#[sqlx::test(migrations = "./migrations")]
async fn filters_and_trashed_modes(pool: PgPool) {
    let user = create_user(&pool, "admin@example.org", "admin").await;
    let p1 = create_program(&pool, "KA131", "Movilidad de estudiantes").await;
    let p2 = create_program(&pool, "KA121", "Acreditación").await;
    let year = create_year(&pool, "2024-2025", true).await;

    let kept = create_call(&pool, p1.id, year.id, "Convocatoria FCT", user.id).await;
    let trashed = create_call(&pool, p1.id, year.id, "Convocatoria cursos", user.id).await;
    create_call(&pool, p2.id, year.id, "Convocatoria personal", user.id).await;
    CallRepo::soft_delete(&pool, trashed.id).await.unwrap();

    let filter = CallFilter {
        program_id: Some(p1.id),
        ..CallFilter::default()
    };

    let live = CallRepo::list(&pool, &filter, &options(ListParams::default(), &CALL_SORT))
        .await
        .unwrap();
    assert_eq!(live.meta.total, 1);
    assert_eq!(live.data[0].id, kept.id);

    let only = CallRepo::list(
        &pool,
        &filter,
        &options(
            ListParams {
                trashed: Some("only".to_string()),
                ..ListParams::default()
            },
            &CALL_SORT,
        ),
    )
    .await
    .unwrap();
    assert_eq!(only.meta.total, 1);
    assert_eq!(only.data[0].id, trashed.id);

    let with = CallRepo::list(
        &pool,
        &filter,
        &options(
            ListParams {
                trashed: Some("with".to_string()),
                ..ListParams::default()
            },
            &CALL_SORT,
        ),
    )
    .await
    .unwrap();
    assert_eq!(with.meta.total, 2);
}

#[sqlx::test(migrations = "./migrations")]
async fn export_resolves_related_names(pool: PgPool) {
    let user = create_user(&pool, "admin@example.org", "admin").await;
    let program = create_program(&pool, "KA131", "Movilidad de estudiantes").await;
    let year = create_year(&pool, "2024-2025", true).await;
    create_call(&pool, program.id, year.id, "Convocatoria FCT", user.id).await;

    let rows = CallRepo::export(
        &pool,
        &CallFilter::default(),
        &ListOptions::for_export(&ListParams::default(), &CALL_SORT).unwrap(),
    )
    .await
    .unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].program_name.as_deref(), Some("Movilidad de estudiantes"));
    assert_eq!(rows[0].academic_year.as_deref(), Some("2024-2025"));
    assert_eq!(rows[0].creator_name.as_deref(), Some("Test User"));
}
