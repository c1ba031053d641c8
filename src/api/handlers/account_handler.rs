//! Account handlers.

use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::get,
    Extension, Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::{AccountResponse, AccountStatus};
use crate::errors::AppResult;
use crate::infra::repositories::{AccountChanges, AccountFilter};
use crate::types::{Created, NoContent, Paginated, PaginationParams};

/// Account creation request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateAccountRequest {
    /// Institution holding the account
    pub institution_id: Uuid,
    /// Account type
    pub account_type_id: Uuid,
    #[validate(length(min = 1, message = "Name is required"))]
    #[schema(example = "Everyday checking")]
    pub name: String,
    /// ISO-4217 currency code
    #[validate(length(equal = 3, message = "Currency must be a 3-letter code"))]
    #[schema(example = "USD")]
    pub currency: String,
}

/// Account update request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateAccountRequest {
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: Option<String>,
    pub status: Option<AccountStatus>,
    /// Exact decimal amount, e.g. "1234.56"
    #[schema(value_type = Option<String>, example = "1234.56")]
    pub balance: Option<Decimal>,
}

/// Account list filter
#[derive(Debug, Deserialize, IntoParams)]
pub struct AccountFilterQuery {
    pub institution_id: Option<Uuid>,
    pub account_type_id: Option<Uuid>,
    pub status: Option<AccountStatus>,
}

/// Create account routes
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_accounts).post(create_account))
        .route(
            "/:id",
            get(get_account).put(update_account).delete(delete_account),
        )
}

/// Open an account for the authenticated user
#[utoipa::path(
    post,
    path = "/accounts",
    tag = "Accounts",
    security(("bearer_auth" = [])),
    request_body = CreateAccountRequest,
    responses(
        (status = 201, description = "Account created", body = AccountResponse),
        (status = 400, description = "Validation error or inactive reference"),
        (status = 409, description = "Account name already taken")
    )
)]
pub async fn create_account(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<CreateAccountRequest>,
) -> AppResult<Created<AccountResponse>> {
    let actor = current_user.actor();
    let account = state
        .account_service
        .create_account(
            &actor,
            payload.institution_id,
            payload.account_type_id,
            payload.name,
            payload.currency,
        )
        .await?;

    Ok(Created(AccountResponse::from(account)))
}

/// List accounts (own accounts; admins see all)
#[utoipa::path(
    get,
    path = "/accounts",
    tag = "Accounts",
    security(("bearer_auth" = [])),
    params(PaginationParams, AccountFilterQuery),
    responses((status = 200, description = "Paginated accounts"))
)]
pub async fn list_accounts(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Query(page): Query<PaginationParams>,
    Query(filter): Query<AccountFilterQuery>,
) -> AppResult<Json<Paginated<AccountResponse>>> {
    let actor = current_user.actor();
    let filter = AccountFilter {
        user_id: None,
        institution_id: filter.institution_id,
        account_type_id: filter.account_type_id,
        status: filter.status,
    };
    let (accounts, total) = state
        .account_service
        .list_accounts(&actor, filter, &page)
        .await?;

    let data = accounts.into_iter().map(AccountResponse::from).collect();
    Ok(Json(Paginated::new(data, &page, total)))
}

/// Get an account by id
#[utoipa::path(
    get,
    path = "/accounts/{id}",
    tag = "Accounts",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Account id")),
    responses(
        (status = 200, description = "Account found", body = AccountResponse),
        (status = 404, description = "Account not found")
    )
)]
pub async fn get_account(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<AccountResponse>> {
    let actor = current_user.actor();
    let account = state.account_service.get_account(&actor, id).await?;
    Ok(Json(AccountResponse::from(account)))
}

/// Update an account
#[utoipa::path(
    put,
    path = "/accounts/{id}",
    tag = "Accounts",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Account id")),
    request_body = UpdateAccountRequest,
    responses(
        (status = 200, description = "Account updated", body = AccountResponse),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Account not found"),
        (status = 409, description = "Account name already taken")
    )
)]
pub async fn update_account(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateAccountRequest>,
) -> AppResult<Json<AccountResponse>> {
    let actor = current_user.actor();
    let changes = AccountChanges {
        name: payload.name,
        status: payload.status,
        balance: payload.balance,
    };
    let account = state
        .account_service
        .update_account(&actor, id, changes)
        .await?;
    Ok(Json(AccountResponse::from(account)))
}

/// Soft delete an account
#[utoipa::path(
    delete,
    path = "/accounts/{id}",
    tag = "Accounts",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Account id")),
    responses(
        (status = 204, description = "Account deleted"),
        (status = 404, description = "Account not found"),
        (status = 409, description = "Account still has cards")
    )
)]
pub async fn delete_account(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<NoContent> {
    let actor = current_user.actor();
    state.account_service.delete_account(&actor, id).await?;
    Ok(NoContent)
}
