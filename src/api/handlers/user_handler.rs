//! User management handlers.

use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::{get, post},
    Extension, Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::config::is_valid_role;
use crate::domain::{UserResponse, UserRole};
use crate::errors::{AppError, AppResult};
use crate::infra::repositories::UserChanges;
use crate::types::{NoContent, Paginated, PaginationParams};

/// User update request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateUserRequest {
    /// New display name
    #[validate(length(min = 1, message = "Name must not be empty"))]
    #[schema(example = "Jane Doe")]
    pub name: Option<String>,
    /// New role (admin only)
    #[schema(example = "admin")]
    pub role: Option<String>,
}

/// Create user management routes
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users))
        .route("/me", get(get_current_user))
        .route("/:id", get(get_user).put(update_user).delete(delete_user))
        .route("/:id/restore", post(restore_user))
}

/// Get the authenticated user's own profile
#[utoipa::path(
    get,
    path = "/users/me",
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn get_current_user(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<Json<UserResponse>> {
    let actor = current_user.actor();
    let user = state.user_service.get_user(&actor, current_user.id).await?;
    Ok(Json(UserResponse::from(user)))
}

/// List users (admin only)
#[utoipa::path(
    get,
    path = "/users",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(PaginationParams),
    responses(
        (status = 200, description = "Paginated users"),
        (status = 403, description = "Admin role required")
    )
)]
pub async fn list_users(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Query(page): Query<PaginationParams>,
) -> AppResult<Json<Paginated<UserResponse>>> {
    let actor = current_user.actor();
    let (users, total) = state.user_service.list_users(&actor, &page).await?;

    let data = users.into_iter().map(UserResponse::from).collect();
    Ok(Json(Paginated::new(data, &page, total)))
}

/// Get a user by id (self or admin)
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 403, description = "Access denied"),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<UserResponse>> {
    let actor = current_user.actor();
    let user = state.user_service.get_user(&actor, id).await?;
    Ok(Json(UserResponse::from(user)))
}

/// Update a user (self; role changes require admin)
#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "User id")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Access denied"),
        (status = 404, description = "User not found")
    )
)]
pub async fn update_user(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateUserRequest>,
) -> AppResult<Json<UserResponse>> {
    let role = match payload.role {
        Some(role) => {
            if !is_valid_role(&role) {
                return Err(AppError::validation("Unknown role"));
            }
            Some(UserRole::from(role.as_str()))
        }
        None => None,
    };

    let actor = current_user.actor();
    let changes = UserChanges {
        name: payload.name,
        role,
    };
    let user = state.user_service.update_user(&actor, id, changes).await?;
    Ok(Json(UserResponse::from(user)))
}

/// Soft delete a user (self or admin)
#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 403, description = "Access denied"),
        (status = 404, description = "User not found"),
        (status = 409, description = "User still owns accounts")
    )
)]
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<NoContent> {
    let actor = current_user.actor();
    state.user_service.delete_user(&actor, id).await?;
    Ok(NoContent)
}

/// Restore a soft-deleted user (admin only)
#[utoipa::path(
    post,
    path = "/users/{id}/restore",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "User restored", body = UserResponse),
        (status = 400, description = "User is not deleted"),
        (status = 403, description = "Admin role required")
    )
)]
pub async fn restore_user(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<UserResponse>> {
    let actor = current_user.actor();
    let user = state.user_service.restore_user(&actor, id).await?;
    Ok(Json(UserResponse::from(user)))
}
