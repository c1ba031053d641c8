//! OpenAPI documentation configuration.
//!
//! Provides Swagger UI for API exploration and testing.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{
    account_handler, account_type_handler, auth_handler, card_handler, institution_handler,
    user_handler,
};
use crate::domain::{
    AccountResponse, AccountStatus, AccountTypeResponse, CardResponse, CardStatus, CardType,
    InstitutionResponse, UserResponse, UserRole,
};
use crate::services::TokenResponse;

/// OpenAPI documentation for the fintrack API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "fintrack API",
        version = "0.1.0",
        description = "Personal finance backend: users, institutions, account types, accounts and cards",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    paths(
        // Authentication endpoints
        auth_handler::register,
        auth_handler::login,
        // User endpoints
        user_handler::get_current_user,
        user_handler::list_users,
        user_handler::get_user,
        user_handler::update_user,
        user_handler::delete_user,
        user_handler::restore_user,
        // Institution endpoints
        institution_handler::create_institution,
        institution_handler::list_institutions,
        institution_handler::get_institution,
        institution_handler::get_institution_by_code,
        institution_handler::update_institution,
        institution_handler::delete_institution,
        // Account type endpoints
        account_type_handler::create_account_type,
        account_type_handler::list_account_types,
        account_type_handler::get_account_type,
        account_type_handler::update_account_type,
        account_type_handler::delete_account_type,
        // Account endpoints
        account_handler::create_account,
        account_handler::list_accounts,
        account_handler::get_account,
        account_handler::update_account,
        account_handler::delete_account,
        // Card endpoints
        card_handler::create_card,
        card_handler::list_cards,
        card_handler::get_card,
        card_handler::update_card,
        card_handler::delete_card,
    ),
    components(
        schemas(
            // Domain types
            UserRole,
            UserResponse,
            InstitutionResponse,
            AccountTypeResponse,
            AccountResponse,
            AccountStatus,
            CardResponse,
            CardStatus,
            CardType,
            // Auth types
            auth_handler::RegisterRequest,
            auth_handler::LoginRequest,
            TokenResponse,
            // Request types
            user_handler::UpdateUserRequest,
            institution_handler::CreateInstitutionRequest,
            institution_handler::UpdateInstitutionRequest,
            account_type_handler::CreateAccountTypeRequest,
            account_type_handler::UpdateAccountTypeRequest,
            account_handler::CreateAccountRequest,
            account_handler::UpdateAccountRequest,
            card_handler::CreateCardRequest,
            card_handler::UpdateCardRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "User registration and login"),
        (name = "Users", description = "User management operations"),
        (name = "Institutions", description = "Financial institution management"),
        (name = "Account Types", description = "Account type management"),
        (name = "Accounts", description = "Account operations"),
        (name = "Cards", description = "Card operations")
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for JWT Bearer authentication
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT token obtained from /auth/login"))
                        .build(),
                ),
            );
        }
    }
}
