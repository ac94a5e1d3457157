//! Handlers for the `/users` resource.
//!
//! Passwords are checked for strength and hashed here; the repository only
//! ever sees the Argon2 hash. Deactivating a user or changing their
//! password revokes their refresh sessions.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use erasmus_core::error::CoreError;
use erasmus_core::listing::{ListOptions, ListParams, Page};
use erasmus_core::policy::{authorize, Ability, Actor, UserPolicy};
use erasmus_core::roles::Role;
use erasmus_core::types::DbId;
use erasmus_db::models::user::{
    CreateUser, CreateUserRequest, UpdateUser, UpdateUserRequest, User, UserFilter, UserResponse,
    USER_SORT,
};
use erasmus_db::repositories::{RoleRepo, SessionRepo, UserRepo};
use sqlx::PgPool;
use validator::Validate;

use super::ensure_parent_not_trashed;
use crate::activity::ActivityLogger;
use crate::auth::password::{hash_password, validate_password_strength, MIN_PASSWORD_LENGTH};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::context::RequestContext;
use crate::response::DataResponse;
use crate::state::AppState;

const ENTITY: &str = "User";

async fn find_user(state: &AppState, id: DbId) -> AppResult<User> {
    UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(ENTITY, id))
}

async fn user_response(state: &AppState, id: DbId) -> AppResult<UserResponse> {
    UserRepo::find_response(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(ENTITY, id))
}

fn hash_checked(password: &str) -> AppResult<String> {
    validate_password_strength(password, MIN_PASSWORD_LENGTH).map_err(CoreError::Validation)?;
    hash_password(password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))
}

/// Parse `role_name`, check the actor may hand it out and resolve its id.
async fn assignable_role_id(pool: &PgPool, actor: &Actor, role_name: &str) -> AppResult<DbId> {
    let role = Role::parse(role_name)?;
    if !UserPolicy.can_assign_role(actor, role) {
        return Err(CoreError::Forbidden(format!("You may not assign the '{role}' role")).into());
    }
    let row = RoleRepo::find_by_name(pool, role.as_str())
        .await?
        .ok_or_else(|| CoreError::Validation(format!("Role '{role}' is not seeded")))?;
    Ok(row.id)
}

/// Only super-admins may modify or remove another super-admin.
async fn ensure_can_manage(pool: &PgPool, actor: &Actor, target: &User) -> AppResult<()> {
    if actor.role.is_super_admin() {
        return Ok(());
    }
    let target_role = RoleRepo::find_by_id(pool, target.role_id).await?;
    if target_role.is_some_and(|r| r.name == Role::SuperAdmin.as_str()) {
        return Err(CoreError::Forbidden("Only a super-admin may manage a super-admin".into()).into());
    }
    Ok(())
}

fn ensure_not_self(actor: &Actor, target_id: DbId) -> AppResult<()> {
    if UserPolicy.can_delete_user(actor, target_id) {
        Ok(())
    } else if actor.user_id == target_id {
        Err(CoreError::Forbidden("No puedes eliminar tu propio usuario".into()).into())
    } else {
        Err(CoreError::Forbidden(format!("Role '{}' is not allowed to delete user", actor.role)).into())
    }
}

/// GET /api/v1/users
pub async fn index(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<ListParams>,
    Query(filter): Query<UserFilter>,
) -> AppResult<Json<Page<UserResponse>>> {
    authorize(&UserPolicy, &auth.actor(), Ability::ViewAny)?;
    let options = ListOptions::resolve(&params, &USER_SORT)?;
    let page = UserRepo::list(&state.pool, &filter, &options).await?;
    Ok(Json(page))
}

/// POST /api/v1/users
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    RequestContext(ctx): RequestContext,
    Json(input): Json<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<UserResponse>>)> {
    let actor = auth.actor();
    authorize(&UserPolicy, &actor, Ability::Create)?;
    input.validate()?;

    let role_id = assignable_role_id(&state.pool, &actor, &input.role).await?;
    let password_hash = hash_checked(&input.password)?;

    let mut tx = state.pool.begin().await?;
    let user = UserRepo::create(
        &mut *tx,
        &CreateUser {
            name: input.name,
            email: input.email,
            password_hash,
            role_id,
        },
    )
    .await?;
    ActivityLogger::new(Some(auth.user_id), &ctx)
        .created(&mut tx, &user)
        .await?;
    tx.commit().await?;

    tracing::info!(new_user_id = user.id, user_id = auth.user_id, "User created");
    let response = user_response(&state, user.id).await?;
    Ok((StatusCode::CREATED, Json(DataResponse::new(response))))
}

/// GET /api/v1/users/{id}
pub async fn show(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    authorize(&UserPolicy, &auth.actor(), Ability::View)?;
    let response = user_response(&state, id).await?;
    Ok(Json(DataResponse::new(response)))
}

/// PUT /api/v1/users/{id}
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    RequestContext(ctx): RequestContext,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateUserRequest>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let actor = auth.actor();
    authorize(&UserPolicy, &actor, Ability::Update)?;
    input.validate()?;

    let before = find_user(&state, id).await?;
    ensure_can_manage(&state.pool, &actor, &before).await?;
    if input.is_active == Some(false) && id == auth.user_id {
        return Err(CoreError::Validation("No puedes desactivar tu propio usuario".into()).into());
    }

    let role_id = match input.role.as_deref() {
        Some(name) => Some(assignable_role_id(&state.pool, &actor, name).await?),
        None => None,
    };
    let password_hash = input.password.as_deref().map(hash_checked).transpose()?;
    let revoke_sessions = password_hash.is_some() || input.is_active == Some(false);

    let patch = UpdateUser {
        name: input.name,
        email: input.email,
        password_hash,
        role_id,
        is_active: input.is_active,
    };
    let mut tx = state.pool.begin().await?;
    let user = UserRepo::update(&mut *tx, id, &patch)
        .await?
        .ok_or_else(|| AppError::not_found(ENTITY, id))?;
    if revoke_sessions {
        let revoked = SessionRepo::revoke_all_for_user(&mut *tx, id).await?;
        tracing::debug!(target_user_id = id, revoked, "Sessions revoked");
    }
    ActivityLogger::new(Some(auth.user_id), &ctx)
        .updated(&mut tx, &before, &user)
        .await?;
    tx.commit().await?;

    tracing::info!(target_user_id = id, user_id = auth.user_id, "User updated");
    let response = user_response(&state, id).await?;
    Ok(Json(DataResponse::new(response)))
}

/// DELETE /api/v1/users/{id}
pub async fn destroy(
    State(state): State<AppState>,
    auth: AuthUser,
    RequestContext(ctx): RequestContext,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let actor = auth.actor();
    authorize(&UserPolicy, &actor, Ability::Delete)?;
    ensure_not_self(&actor, id)?;
    let user = find_user(&state, id).await?;
    ensure_can_manage(&state.pool, &actor, &user).await?;

    let mut tx = state.pool.begin().await?;
    UserRepo::soft_delete(&mut *tx, id).await?;
    SessionRepo::revoke_all_for_user(&mut *tx, id).await?;
    ActivityLogger::new(Some(auth.user_id), &ctx)
        .deleted(&mut tx, &user)
        .await?;
    tx.commit().await?;

    tracing::info!(target_user_id = id, user_id = auth.user_id, "User deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/users/{id}/restore
pub async fn restore(
    State(state): State<AppState>,
    auth: AuthUser,
    RequestContext(ctx): RequestContext,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    authorize(&UserPolicy, &auth.actor(), Ability::Restore)?;
    UserRepo::find_by_id_include_deleted(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(ENTITY, id))?;
    ensure_parent_not_trashed(&state.pool, "users", id).await?;

    let mut tx = state.pool.begin().await?;
    if !UserRepo::restore(&mut *tx, id).await? {
        return Err(AppError::not_found(ENTITY, id));
    }
    let user = UserRepo::find_by_id(&mut *tx, id)
        .await?
        .ok_or_else(|| AppError::not_found(ENTITY, id))?;
    ActivityLogger::new(Some(auth.user_id), &ctx)
        .restored(&mut tx, &user)
        .await?;
    tx.commit().await?;

    tracing::info!(target_user_id = id, user_id = auth.user_id, "User restored");
    let response = user_response(&state, id).await?;
    Ok(Json(DataResponse::new(response)))
}

/// DELETE /api/v1/users/{id}/force
pub async fn force_delete(
    State(state): State<AppState>,
    auth: AuthUser,
    RequestContext(ctx): RequestContext,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let actor = auth.actor();
    authorize(&UserPolicy, &actor, Ability::ForceDelete)?;
    ensure_not_self(&actor, id)?;
    let user = UserRepo::find_by_id_include_deleted(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(ENTITY, id))?;
    ensure_can_manage(&state.pool, &actor, &user).await?;

    let mut tx = state.pool.begin().await?;
    UserRepo::hard_delete(&mut *tx, id).await?;
    ActivityLogger::new(Some(auth.user_id), &ctx)
        .force_deleted(&mut tx, &user)
        .await?;
    tx.commit().await?;

    tracing::info!(target_user_id = id, user_id = auth.user_id, "User permanently deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn self_delete_is_forbidden_even_for_super_admin() {
        let actor = Actor::new(7, Role::SuperAdmin);
        assert_matches!(
            ensure_not_self(&actor, 7),
            Err(AppError::Core(CoreError::Forbidden(msg))) if msg.contains("propio")
        );
        assert!(ensure_not_self(&actor, 8).is_ok());
    }

    #[test]
    fn editors_cannot_delete_users() {
        let actor = Actor::new(7, Role::Editor);
        assert_matches!(ensure_not_self(&actor, 8), Err(AppError::Core(CoreError::Forbidden(_))));
    }

    #[test]
    fn weak_password_is_rejected_before_hashing() {
        assert_matches!(
            hash_checked("short"),
            Err(AppError::Core(CoreError::Validation(_)))
        );
    }
}
