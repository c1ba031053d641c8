//! Integration tests for API endpoints.
//!
//! These tests use hand-written mock services so the HTTP layer - routing,
//! extraction, validation, error mapping - is exercised without a real
//! persistence stack behind it (the in-memory database only backs the
//! health endpoint).

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use chrono::Utc;
use rust_decimal::Decimal;
use tower::ServiceExt;
use uuid::Uuid;

use fintrack_api::api::{create_router, AppState};
use fintrack_api::config::Config;
use fintrack_api::domain::{
    Account, AccountType, Actor, Card, FinancialInstitution, User, UserRole,
};
use fintrack_api::errors::{AppError, AppResult};
use fintrack_api::infra::repositories::{
    AccountChanges, AccountFilter, AccountTypeChanges, AccountTypeFilter, CardChanges,
    CardFilter, InstitutionChanges, InstitutionFilter, UserChanges,
};
use fintrack_api::infra::Database;
use fintrack_api::services::{
    AccountService, AccountTypeService, AuthService, CardService, Claims, InstitutionService,
    TokenResponse, UserService,
};
use fintrack_api::types::PaginationParams;
use fintrack_api::domain::CardType;

const VALID_TOKEN: &str = "valid-test-token";

fn test_user(id: Uuid) -> User {
    User {
        id,
        email: "test@example.com".to_string(),
        password_hash: "hashed".to_string(),
        name: "Test User".to_string(),
        role: UserRole::User,
        created_at: Utc::now(),
        updated_at: Utc::now(),
        deleted_at: None,
    }
}

fn test_account(id: Uuid, user_id: Uuid) -> Account {
    Account {
        id,
        user_id,
        institution_id: Uuid::new_v4(),
        account_type_id: Uuid::new_v4(),
        name: "Checking".to_string(),
        currency: "USD".to_string(),
        balance: Decimal::ZERO,
        status: fintrack_api::domain::AccountStatus::Active,
        created_at: Utc::now(),
        updated_at: Utc::now(),
        deleted_at: None,
    }
}

// =============================================================================
// Mock services
// =============================================================================

struct MockAuthService {
    user_id: Uuid,
}

#[async_trait]
impl AuthService for MockAuthService {
    async fn register(&self, email: String, _password: String, name: String) -> AppResult<User> {
        if email == "taken@example.com" {
            return Err(AppError::conflict("A user with this email already exists"));
        }
        let mut user = test_user(self.user_id);
        user.email = email;
        user.name = name;
        Ok(user)
    }

    async fn login(&self, _email: String, password: String) -> AppResult<TokenResponse> {
        if password != "SecurePass123!" {
            return Err(AppError::InvalidCredentials);
        }
        Ok(TokenResponse {
            access_token: VALID_TOKEN.to_string(),
            token_type: "Bearer".to_string(),
            expires_in: 86400,
        })
    }

    fn verify_token(&self, token: &str) -> AppResult<Claims> {
        if token == VALID_TOKEN {
            Ok(Claims {
                sub: self.user_id,
                email: "test@example.com".to_string(),
                role: "user".to_string(),
                exp: Utc::now().timestamp() + 3600,
                iat: Utc::now().timestamp(),
            })
        } else {
            Err(AppError::Unauthorized)
        }
    }
}

struct MockUserService;

#[async_trait]
impl UserService for MockUserService {
    async fn get_user(&self, _actor: &Actor, id: Uuid) -> AppResult<User> {
        Ok(test_user(id))
    }

    async fn get_user_with_deleted(&self, _actor: &Actor, id: Uuid) -> AppResult<User> {
        Ok(test_user(id))
    }

    async fn list_users(
        &self,
        _actor: &Actor,
        _page: &PaginationParams,
    ) -> AppResult<(Vec<User>, u64)> {
        Err(AppError::Forbidden)
    }

    async fn update_user(
        &self,
        _actor: &Actor,
        id: Uuid,
        _changes: UserChanges,
    ) -> AppResult<User> {
        Ok(test_user(id))
    }

    async fn delete_user(&self, _actor: &Actor, _id: Uuid) -> AppResult<()> {
        Ok(())
    }

    async fn restore_user(&self, _actor: &Actor, id: Uuid) -> AppResult<User> {
        Ok(test_user(id))
    }
}

struct UnusedInstitutionService;

#[async_trait]
impl InstitutionService for UnusedInstitutionService {
    async fn create_institution(
        &self,
        _actor: &Actor,
        _code: String,
        _name: String,
        _website: Option<String>,
    ) -> AppResult<FinancialInstitution> {
        Err(AppError::internal("not wired in this test"))
    }

    async fn get_institution(&self, _id: Uuid) -> AppResult<FinancialInstitution> {
        Err(AppError::NotFound)
    }

    async fn get_institution_by_code(&self, _code: &str) -> AppResult<FinancialInstitution> {
        Err(AppError::NotFound)
    }

    async fn list_institutions(
        &self,
        _filter: InstitutionFilter,
        _page: &PaginationParams,
    ) -> AppResult<(Vec<FinancialInstitution>, u64)> {
        Ok((vec![], 0))
    }

    async fn update_institution(
        &self,
        _actor: &Actor,
        _id: Uuid,
        _changes: InstitutionChanges,
    ) -> AppResult<FinancialInstitution> {
        Err(AppError::internal("not wired in this test"))
    }

    async fn delete_institution(&self, _actor: &Actor, _id: Uuid) -> AppResult<()> {
        Err(AppError::internal("not wired in this test"))
    }
}

struct UnusedAccountTypeService;

#[async_trait]
impl AccountTypeService for UnusedAccountTypeService {
    async fn create_account_type(
        &self,
        _actor: &Actor,
        _code: String,
        _name: String,
        _description: Option<String>,
    ) -> AppResult<AccountType> {
        Err(AppError::internal("not wired in this test"))
    }

    async fn get_account_type(&self, _id: Uuid) -> AppResult<AccountType> {
        Err(AppError::NotFound)
    }

    async fn list_account_types(
        &self,
        _filter: AccountTypeFilter,
        _page: &PaginationParams,
    ) -> AppResult<(Vec<AccountType>, u64)> {
        Ok((vec![], 0))
    }

    async fn update_account_type(
        &self,
        _actor: &Actor,
        _id: Uuid,
        _changes: AccountTypeChanges,
    ) -> AppResult<AccountType> {
        Err(AppError::internal("not wired in this test"))
    }

    async fn delete_account_type(&self, _actor: &Actor, _id: Uuid) -> AppResult<()> {
        Err(AppError::internal("not wired in this test"))
    }
}

struct MockAccountService {
    user_id: Uuid,
    account_id: Uuid,
}

#[async_trait]
impl AccountService for MockAccountService {
    async fn create_account(
        &self,
        actor: &Actor,
        institution_id: Uuid,
        account_type_id: Uuid,
        name: String,
        currency: String,
    ) -> AppResult<Account> {
        if name == "Duplicate" {
            return Err(AppError::conflict("An account with this name already exists"));
        }
        let mut account = test_account(self.account_id, actor.id);
        account.institution_id = institution_id;
        account.account_type_id = account_type_id;
        account.name = name;
        account.currency = currency;
        Ok(account)
    }

    async fn get_account(&self, _actor: &Actor, id: Uuid) -> AppResult<Account> {
        if id == self.account_id {
            Ok(test_account(id, self.user_id))
        } else {
            Err(AppError::NotFound)
        }
    }

    async fn list_accounts(
        &self,
        actor: &Actor,
        _filter: AccountFilter,
        _page: &PaginationParams,
    ) -> AppResult<(Vec<Account>, u64)> {
        Ok((vec![test_account(self.account_id, actor.id)], 1))
    }

    async fn update_account(
        &self,
        _actor: &Actor,
        id: Uuid,
        _changes: AccountChanges,
    ) -> AppResult<Account> {
        Ok(test_account(id, self.user_id))
    }

    async fn delete_account(&self, _actor: &Actor, _id: Uuid) -> AppResult<()> {
        Ok(())
    }
}

struct UnusedCardService;

#[async_trait]
impl CardService for UnusedCardService {
    async fn create_card(
        &self,
        _actor: &Actor,
        _account_id: Uuid,
        _institution_id: Option<Uuid>,
        _last_four_digits: String,
        _card_type: CardType,
        _expires: Option<String>,
    ) -> AppResult<Card> {
        Err(AppError::internal("not wired in this test"))
    }

    async fn get_card(&self, _actor: &Actor, _id: Uuid) -> AppResult<Card> {
        Err(AppError::NotFound)
    }

    async fn list_cards(
        &self,
        _actor: &Actor,
        _filter: CardFilter,
        _page: &PaginationParams,
    ) -> AppResult<(Vec<Card>, u64)> {
        Ok((vec![], 0))
    }

    async fn update_card(
        &self,
        _actor: &Actor,
        _id: Uuid,
        _changes: CardChanges,
    ) -> AppResult<Card> {
        Err(AppError::internal("not wired in this test"))
    }

    async fn delete_card(&self, _actor: &Actor, _id: Uuid) -> AppResult<()> {
        Ok(())
    }
}

// =============================================================================
// Harness
// =============================================================================

async fn test_app() -> (axum::Router, Uuid, Uuid) {
    let user_id = Uuid::new_v4();
    let account_id = Uuid::new_v4();

    let config = Config::for_database("sqlite::memory:");
    let database = Arc::new(Database::connect(&config).await);

    let state = AppState::new(
        Arc::new(MockAuthService { user_id }),
        Arc::new(MockUserService),
        Arc::new(UnusedInstitutionService),
        Arc::new(UnusedAccountTypeService),
        Arc::new(MockAccountService {
            user_id,
            account_id,
        }),
        Arc::new(UnusedCardService),
        database,
    );

    (create_router(state), user_id, account_id)
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn authed_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", VALID_TOKEN))
        .body(Body::empty())
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn health_endpoint_reports_database_status() {
    let (app, _, _) = test_app().await;

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn register_returns_created_user() {
    let (app, _, _) = test_app().await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/auth/register",
            serde_json::json!({
                "email": "new@example.com",
                "password": "SecurePass123!",
                "name": "New User"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["email"], "new@example.com");
    assert!(body.get("password_hash").is_none(), "hash must never leak");
}

#[tokio::test]
async fn register_rejects_malformed_email() {
    let (app, _, _) = test_app().await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/auth/register",
            serde_json::json!({
                "email": "not-an-email",
                "password": "SecurePass123!",
                "name": "New User"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn register_conflict_maps_to_409() {
    let (app, _, _) = test_app().await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/auth/register",
            serde_json::json!({
                "email": "taken@example.com",
                "password": "SecurePass123!",
                "name": "New User"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "CONFLICT");
}

#[tokio::test]
async fn login_with_wrong_password_is_unauthorized() {
    let (app, _, _) = test_app().await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/auth/login",
            serde_json::json!({
                "email": "test@example.com",
                "password": "wrong-password"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn protected_routes_require_a_token() {
    let (app, _, _) = test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/accounts")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn listing_accounts_with_a_valid_token_succeeds() {
    let (app, _, account_id) = test_app().await;

    let response = app
        .oneshot(authed_request("GET", "/accounts"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["meta"]["total"], 1);
    assert_eq!(body["data"][0]["id"], account_id.to_string());
}

#[tokio::test]
async fn missing_account_maps_to_404() {
    let (app, _, _) = test_app().await;

    let response = app
        .oneshot(authed_request(
            "GET",
            &format!("/accounts/{}", Uuid::new_v4()),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn account_name_conflict_maps_to_409() {
    let (app, _, _) = test_app().await;

    let mut request = json_request(
        "POST",
        "/accounts",
        serde_json::json!({
            "institution_id": Uuid::new_v4(),
            "account_type_id": Uuid::new_v4(),
            "name": "Duplicate",
            "currency": "USD"
        }),
    );
    request.headers_mut().insert(
        header::AUTHORIZATION,
        format!("Bearer {}", VALID_TOKEN).parse().unwrap(),
    );

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn create_account_validates_currency_shape() {
    let (app, _, _) = test_app().await;

    let mut request = json_request(
        "POST",
        "/accounts",
        serde_json::json!({
            "institution_id": Uuid::new_v4(),
            "account_type_id": Uuid::new_v4(),
            "name": "Checking",
            "currency": "DOLLARS"
        }),
    );
    request.headers_mut().insert(
        header::AUTHORIZATION,
        format!("Bearer {}", VALID_TOKEN).parse().unwrap(),
    );

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
