//! Card handlers.

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
use crate::domain::{CardResponse, CardStatus, CardType};
use crate::errors::AppResult;
use crate::infra::repositories::{CardChanges, CardFilter};
use crate::types::{Created, NoContent, Paginated, PaginationParams};

/// Card creation request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCardRequest {
    /// Account the card draws on
    pub account_id: Uuid,
    /// Optional issuing institution
    pub institution_id: Option<Uuid>,
    /// Last four digits of the card number
    #[validate(length(equal = 4, message = "last_four_digits must be exactly 4 digits"))]
    #[schema(example = "4242")]
    pub last_four_digits: String,
    pub card_type: CardType,
    /// Expiration in MM/YY form
    #[schema(example = "12/27")]
    pub expires: Option<String>,
}

/// Card update request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateCardRequest {
    /// New issuing institution; explicit null clears the reference
    #[serde(
        default,
        deserialize_with = "crate::api::handlers::card_handler::double_option"
    )]
    #[schema(value_type = Option<Uuid>)]
    pub institution_id: Option<Option<Uuid>>,
    /// Expiration in MM/YY form
    pub expires: Option<String>,
    pub status: Option<CardStatus>,
}

/// Distinguish an absent field from an explicit null.
pub(crate) fn double_option<'de, D>(de: D) -> Result<Option<Option<Uuid>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    serde::Deserialize::deserialize(de).map(Some)
}

/// Card list filter
#[derive(Debug, Deserialize, IntoParams)]
pub struct CardFilterQuery {
    /// Account to list cards for (required for non-admins)
    pub account_id: Option<Uuid>,
    pub institution_id: Option<Uuid>,
    pub card_type: Option<CardType>,
    pub status: Option<CardStatus>,
}

/// Create card routes
pub fn card_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_cards).post(create_card))
        .route("/:id", get(get_card).put(update_card).delete(delete_card))
}

/// Issue a card against one of the authenticated user's accounts
#[utoipa::path(
    post,
    path = "/cards",
    tag = "Cards",
    security(("bearer_auth" = [])),
    request_body = CreateCardRequest,
    responses(
        (status = 201, description = "Card created", body = CardResponse),
        (status = 400, description = "Validation error or inactive reference"),
        (status = 404, description = "Account not found"),
        (status = 409, description = "Card digits already used on this account")
    )
)]
pub async fn create_card(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<CreateCardRequest>,
) -> AppResult<Created<CardResponse>> {
    let actor = current_user.actor();
    let card = state
        .card_service
        .create_card(
            &actor,
            payload.account_id,
            payload.institution_id,
            payload.last_four_digits,
            payload.card_type,
            payload.expires,
        )
        .await?;

    Ok(Created(CardResponse::from(card)))
}

/// List cards for an account
#[utoipa::path(
    get,
    path = "/cards",
    tag = "Cards",
    security(("bearer_auth" = [])),
    params(PaginationParams, CardFilterQuery),
    responses(
        (status = 200, description = "Paginated cards"),
        (status = 400, description = "Missing account_id filter")
    )
)]
pub async fn list_cards(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Query(page): Query<PaginationParams>,
    Query(filter): Query<CardFilterQuery>,
) -> AppResult<Json<Paginated<CardResponse>>> {
    let actor = current_user.actor();
    let filter = CardFilter {
        account_id: filter.account_id,
        institution_id: filter.institution_id,
        card_type: filter.card_type,
        status: filter.status,
    };
    let (cards, total) = state.card_service.list_cards(&actor, filter, &page).await?;

    let data = cards.into_iter().map(CardResponse::from).collect();
    Ok(Json(Paginated::new(data, &page, total)))
}

/// Get a card by id
#[utoipa::path(
    get,
    path = "/cards/{id}",
    tag = "Cards",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Card id")),
    responses(
        (status = 200, description = "Card found", body = CardResponse),
        (status = 404, description = "Card not found")
    )
)]
pub async fn get_card(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<CardResponse>> {
    let actor = current_user.actor();
    let card = state.card_service.get_card(&actor, id).await?;
    Ok(Json(CardResponse::from(card)))
}

/// Update a card
#[utoipa::path(
    put,
    path = "/cards/{id}",
    tag = "Cards",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Card id")),
    request_body = UpdateCardRequest,
    responses(
        (status = 200, description = "Card updated", body = CardResponse),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Card not found")
    )
)]
pub async fn update_card(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateCardRequest>,
) -> AppResult<Json<CardResponse>> {
    let actor = current_user.actor();
    let changes = CardChanges {
        institution_id: payload.institution_id,
        expires: payload.expires.map(Some),
        status: payload.status,
    };
    let card = state.card_service.update_card(&actor, id, changes).await?;
    Ok(Json(CardResponse::from(card)))
}

/// Soft delete a card
#[utoipa::path(
    delete,
    path = "/cards/{id}",
    tag = "Cards",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Card id")),
    responses(
        (status = 204, description = "Card deleted"),
        (status = 404, description = "Card not found")
    )
)]
pub async fn delete_card(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<NoContent> {
    let actor = current_user.actor();
    state.card_service.delete_card(&actor, id).await?;
    Ok(NoContent)
}
