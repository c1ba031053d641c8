//! Account type handlers.

use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::get,
    Extension, Router,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::AccountTypeResponse;
use crate::errors::AppResult;
use crate::infra::repositories::{AccountTypeChanges, AccountTypeFilter};
use crate::types::{Created, NoContent, Paginated, PaginationParams};

/// Account type creation request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateAccountTypeRequest {
    /// Short unique code
    #[validate(length(min = 2, max = 16, message = "Code must be 2-16 characters"))]
    #[schema(example = "CHK")]
    pub code: String,
    #[validate(length(min = 1, message = "Name is required"))]
    #[schema(example = "Checking")]
    pub name: String,
    #[schema(example = "Everyday checking account")]
    pub description: Option<String>,
}

/// Account type update request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateAccountTypeRequest {
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

/// Account type list filter
#[derive(Debug, Deserialize, IntoParams)]
pub struct AccountTypeFilterQuery {
    /// Only account types with this active flag
    pub is_active: Option<bool>,
}

/// Create account type routes
pub fn account_type_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_account_types).post(create_account_type))
        .route(
            "/:id",
            get(get_account_type)
                .put(update_account_type)
                .delete(delete_account_type),
        )
}

/// Create an account type (admin only)
#[utoipa::path(
    post,
    path = "/account-types",
    tag = "Account Types",
    security(("bearer_auth" = [])),
    request_body = CreateAccountTypeRequest,
    responses(
        (status = 201, description = "Account type created", body = AccountTypeResponse),
        (status = 403, description = "Admin role required"),
        (status = 409, description = "Code already exists")
    )
)]
pub async fn create_account_type(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<CreateAccountTypeRequest>,
) -> AppResult<Created<AccountTypeResponse>> {
    let actor = current_user.actor();
    let account_type = state
        .account_type_service
        .create_account_type(&actor, payload.code, payload.name, payload.description)
        .await?;

    Ok(Created(AccountTypeResponse::from(account_type)))
}

/// List account types
#[utoipa::path(
    get,
    path = "/account-types",
    tag = "Account Types",
    security(("bearer_auth" = [])),
    params(PaginationParams, AccountTypeFilterQuery),
    responses((status = 200, description = "Paginated account types"))
)]
pub async fn list_account_types(
    State(state): State<AppState>,
    Query(page): Query<PaginationParams>,
    Query(filter): Query<AccountTypeFilterQuery>,
) -> AppResult<Json<Paginated<AccountTypeResponse>>> {
    let filter = AccountTypeFilter {
        is_active: filter.is_active,
    };
    let (account_types, total) = state
        .account_type_service
        .list_account_types(filter, &page)
        .await?;

    let data = account_types
        .into_iter()
        .map(AccountTypeResponse::from)
        .collect();
    Ok(Json(Paginated::new(data, &page, total)))
}

/// Get an account type by id
#[utoipa::path(
    get,
    path = "/account-types/{id}",
    tag = "Account Types",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Account type id")),
    responses(
        (status = 200, description = "Account type found", body = AccountTypeResponse),
        (status = 404, description = "Account type not found")
    )
)]
pub async fn get_account_type(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<AccountTypeResponse>> {
    let account_type = state.account_type_service.get_account_type(id).await?;
    Ok(Json(AccountTypeResponse::from(account_type)))
}

/// Update an account type (admin only)
#[utoipa::path(
    put,
    path = "/account-types/{id}",
    tag = "Account Types",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Account type id")),
    request_body = UpdateAccountTypeRequest,
    responses(
        (status = 200, description = "Account type updated", body = AccountTypeResponse),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Account type not found")
    )
)]
pub async fn update_account_type(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateAccountTypeRequest>,
) -> AppResult<Json<AccountTypeResponse>> {
    let actor = current_user.actor();
    let changes = AccountTypeChanges {
        name: payload.name,
        description: payload.description.map(Some),
        is_active: payload.is_active,
    };
    let account_type = state
        .account_type_service
        .update_account_type(&actor, id, changes)
        .await?;
    Ok(Json(AccountTypeResponse::from(account_type)))
}

/// Soft delete an account type (admin only)
#[utoipa::path(
    delete,
    path = "/account-types/{id}",
    tag = "Account Types",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Account type id")),
    responses(
        (status = 204, description = "Account type deleted"),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Account type not found"),
        (status = 409, description = "Account type still used by accounts")
    )
)]
pub async fn delete_account_type(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<NoContent> {
    let actor = current_user.actor();
    state
        .account_type_service
        .delete_account_type(&actor, id)
        .await?;
    Ok(NoContent)
}
