//! Fixtures shared by the repository integration tests.

#![allow(dead_code)]

use chrono::NaiveDate;
use serde_json::json;
use sqlx::PgPool;

use erasmus_core::call::{CallLifecycle, CallStatus};
use erasmus_db::models::academic_year::{AcademicYear, CreateAcademicYear};
use erasmus_db::models::call::{Call, CreateCall};
use erasmus_db::models::program::{CreateProgram, Program};
use erasmus_db::models::user::{CreateUser, User};
use erasmus_db::repositories::call_repo::NewCallFields;
use erasmus_db::repositories::{AcademicYearRepo, CallRepo, ProgramRepo, RoleRepo, UserRepo};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub async fn create_user(pool: &PgPool, email: &str, role: &str) -> User {
    let role = RoleRepo::find_by_name(pool, role).await.unwrap().unwrap();
    UserRepo::create(
        pool,
        &CreateUser {
            name: "Test User".to_string(),
            email: email.to_string(),
            password_hash: "not-a-real-hash".to_string(),
            role_id: role.id,
        },
    )
    .await
    .unwrap()
}

pub async fn create_program(pool: &PgPool, code: &str, name: &str) -> Program {
    let input = CreateProgram {
        code: code.to_string(),
        name: name.to_string(),
        slug: None,
        description: Some("Programa de prueba".to_string()),
        is_active: None,
        sort_order: None,
    };
    let slug = erasmus_core::slug::slugify(name);
    ProgramRepo::create(pool, &input, &slug).await.unwrap()
}

pub async fn create_year(pool: &PgPool, year: &str, is_current: bool) -> AcademicYear {
    let start: i32 = year[..4].parse().unwrap();
    AcademicYearRepo::create(
        pool,
        &CreateAcademicYear {
            year: year.to_string(),
            start_date: date(start, 9, 1),
            end_date: date(start + 1, 6, 30),
            is_current: Some(is_current),
        },
    )
    .await
    .unwrap()
}

pub fn new_call(program_id: i64, academic_year_id: i64, title: &str) -> CreateCall {
    CreateCall {
        program_id,
        academic_year_id,
        title: title.to_string(),
        slug: None,
        call_type: "alumnado".to_string(),
        modality: "corta".to_string(),
        number_of_places: Some(10),
        destinations: Some(vec!["Italia".to_string(), "Francia".to_string()]),
        estimated_start_date: None,
        estimated_end_date: None,
        requirements: Some("Nivel B1 de inglés".to_string()),
        documentation: None,
        selection_criteria: None,
        scoring_table: None,
        status: None,
    }
}

pub async fn create_call(
    pool: &PgPool,
    program_id: i64,
    academic_year_id: i64,
    title: &str,
    created_by: i64,
) -> Call {
    let input = new_call(program_id, academic_year_id, title);
    let fields = NewCallFields {
        slug: erasmus_core::slug::slugify(title),
        destinations: json!(input.destinations.clone().unwrap_or_default()),
        lifecycle: CallLifecycle {
            status: CallStatus::Borrador,
            published_at: None,
            closed_at: None,
        },
        created_by,
    };
    CallRepo::create(pool, &input, &fields).await.unwrap()
}
