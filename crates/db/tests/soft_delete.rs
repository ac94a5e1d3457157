//! Soft delete, restore, hard delete and the dependents guard.

mod common;

use assert_matches::assert_matches;
use sqlx::PgPool;

use erasmus_core::error::CoreError;
use erasmus_db::repositories::{AcademicYearRepo, CallPhaseRepo, CallRepo, ProgramRepo};
use erasmus_db::models::call_phase::CreateCallPhase;

use common::{create_call, create_program, create_user, create_year};

#[sqlx::test(migrations = "./migrations")]
async fn soft_delete_hides_from_find_by_id(pool: PgPool) {
    let program = create_program(&pool, "KA131", "Movilidad de estudiantes").await;

    assert!(ProgramRepo::soft_delete(&pool, program.id).await.unwrap());
    assert!(ProgramRepo::find_by_id(&pool, program.id).await.unwrap().is_none());

    let trashed = ProgramRepo::find_by_id_include_deleted(&pool, program.id)
        .await
        .unwrap()
        .unwrap();
    assert!(trashed.deleted_at.is_some());
}

#[sqlx::test(migrations = "./migrations")]
async fn soft_delete_is_idempotent(pool: PgPool) {
    let program = create_program(&pool, "KA121", "Acreditación").await;

    assert!(ProgramRepo::soft_delete(&pool, program.id).await.unwrap());
    assert!(!ProgramRepo::soft_delete(&pool, program.id).await.unwrap());
}

#[sqlx::test(migrations = "./migrations")]
async fn restore_makes_row_visible_again(pool: PgPool) {
    let program = create_program(&pool, "KA220", "Asociaciones").await;
    ProgramRepo::soft_delete(&pool, program.id).await.unwrap();

    assert!(ProgramRepo::restore(&pool, program.id).await.unwrap());
    assert!(!ProgramRepo::restore(&pool, program.id).await.unwrap());

    let found = ProgramRepo::find_by_id(&pool, program.id).await.unwrap().unwrap();
    assert!(found.deleted_at.is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn hard_delete_removes_row(pool: PgPool) {
    let program = create_program(&pool, "KA210", "Asociaciones a pequeña escala").await;

    assert!(ProgramRepo::hard_delete(&pool, program.id).await.unwrap());
    assert!(ProgramRepo::find_by_id_include_deleted(&pool, program.id)
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn dependents_count_only_live_rows_unless_trashed_included(pool: PgPool) {
    let user = create_user(&pool, "admin@example.org", "admin").await;
    let program = create_program(&pool, "KA131", "Movilidad de estudiantes").await;
    let year = create_year(&pool, "2024-2025", false).await;
    let call = create_call(&pool, program.id, year.id, "Convocatoria FCT", user.id).await;

    let live = ProgramRepo::dependents(&pool, program.id, false).await.unwrap();
    assert!(!live.is_empty());
    assert_eq!(
        live.message(),
        "No se puede eliminar el programa porque tiene convocatorias asociadas."
    );
    assert_matches!(live.ensure_none(), Err(CoreError::Conflict(_)));

    CallRepo::soft_delete(&pool, call.id).await.unwrap();

    let live = ProgramRepo::dependents(&pool, program.id, false).await.unwrap();
    assert!(live.is_empty());

    let all = ProgramRepo::dependents(&pool, program.id, true).await.unwrap();
    assert!(!all.is_empty(), "force delete must still see the trashed call");
}

#[sqlx::test(migrations = "./migrations")]
async fn call_dependents_include_phases(pool: PgPool) {
    let user = create_user(&pool, "admin@example.org", "admin").await;
    let program = create_program(&pool, "KA131", "Movilidad de estudiantes").await;
    let year = create_year(&pool, "2024-2025", false).await;
    let call = create_call(&pool, program.id, year.id, "Convocatoria FCT", user.id).await;

    CallPhaseRepo::create(
        &pool,
        call.id,
        &CreateCallPhase {
            phase_type: "solicitudes".to_string(),
            name: "Plazo de solicitudes".to_string(),
            description: None,
            start_date: None,
            end_date: None,
            is_current: None,
            sort_order: None,
        },
    )
    .await
    .unwrap();

    let deps = CallRepo::dependents(&pool, call.id, false).await.unwrap();
    assert_eq!(
        deps.message(),
        "No se puede eliminar la convocatoria porque tiene fases asociadas."
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn soft_deleting_current_year_clears_the_flag(pool: PgPool) {
    let year = create_year(&pool, "2024-2025", true).await;
    assert!(year.is_current);

    AcademicYearRepo::soft_delete(&pool, year.id).await.unwrap();
    AcademicYearRepo::restore(&pool, year.id).await.unwrap();

    let restored = AcademicYearRepo::find_by_id(&pool, year.id).await.unwrap().unwrap();
    assert!(!restored.is_current);
    assert!(AcademicYearRepo::find_current(&pool).await.unwrap().is_none());
}
