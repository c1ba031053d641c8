//! Financial institution handlers.

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
use crate::domain::InstitutionResponse;
use crate::errors::AppResult;
use crate::infra::repositories::{InstitutionChanges, InstitutionFilter};
use crate::types::{Created, NoContent, Paginated, PaginationParams};

/// Institution creation request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateInstitutionRequest {
    /// Short unique code
    #[validate(length(min = 2, max = 16, message = "Code must be 2-16 characters"))]
    #[schema(example = "BOFA")]
    pub code: String,
    #[validate(length(min = 1, message = "Name is required"))]
    #[schema(example = "Bank of America")]
    pub name: String,
    #[validate(url(message = "Website must be a valid URL"))]
    #[schema(example = "https://bankofamerica.com")]
    pub website: Option<String>,
}

/// Institution update request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateInstitutionRequest {
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: Option<String>,
    #[validate(url(message = "Website must be a valid URL"))]
    pub website: Option<String>,
    pub is_active: Option<bool>,
}

/// Institution list filter
#[derive(Debug, Deserialize, IntoParams)]
pub struct InstitutionFilterQuery {
    /// Only institutions with this active flag
    pub is_active: Option<bool>,
}

/// Create institution routes
pub fn institution_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_institutions).post(create_institution))
        .route(
            "/:id",
            get(get_institution)
                .put(update_institution)
                .delete(delete_institution),
        )
        .route("/code/:code", get(get_institution_by_code))
}

/// Create an institution (admin only)
#[utoipa::path(
    post,
    path = "/institutions",
    tag = "Institutions",
    security(("bearer_auth" = [])),
    request_body = CreateInstitutionRequest,
    responses(
        (status = 201, description = "Institution created", body = InstitutionResponse),
        (status = 403, description = "Admin role required"),
        (status = 409, description = "Code already exists")
    )
)]
pub async fn create_institution(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<CreateInstitutionRequest>,
) -> AppResult<Created<InstitutionResponse>> {
    let actor = current_user.actor();
    let institution = state
        .institution_service
        .create_institution(&actor, payload.code, payload.name, payload.website)
        .await?;

    Ok(Created(InstitutionResponse::from(institution)))
}

/// List institutions
#[utoipa::path(
    get,
    path = "/institutions",
    tag = "Institutions",
    security(("bearer_auth" = [])),
    params(PaginationParams, InstitutionFilterQuery),
    responses((status = 200, description = "Paginated institutions"))
)]
pub async fn list_institutions(
    State(state): State<AppState>,
    Query(page): Query<PaginationParams>,
    Query(filter): Query<InstitutionFilterQuery>,
) -> AppResult<Json<Paginated<InstitutionResponse>>> {
    let filter = InstitutionFilter {
        is_active: filter.is_active,
    };
    let (institutions, total) = state
        .institution_service
        .list_institutions(filter, &page)
        .await?;

    let data = institutions
        .into_iter()
        .map(InstitutionResponse::from)
        .collect();
    Ok(Json(Paginated::new(data, &page, total)))
}

/// Get an institution by id
#[utoipa::path(
    get,
    path = "/institutions/{id}",
    tag = "Institutions",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Institution id")),
    responses(
        (status = 200, description = "Institution found", body = InstitutionResponse),
        (status = 404, description = "Institution not found")
    )
)]
pub async fn get_institution(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<InstitutionResponse>> {
    let institution = state.institution_service.get_institution(id).await?;
    Ok(Json(InstitutionResponse::from(institution)))
}

/// Get an institution by its unique code
#[utoipa::path(
    get,
    path = "/institutions/code/{code}",
    tag = "Institutions",
    security(("bearer_auth" = [])),
    params(("code" = String, Path, description = "Institution code")),
    responses(
        (status = 200, description = "Institution found", body = InstitutionResponse),
        (status = 404, description = "Institution not found")
    )
)]
pub async fn get_institution_by_code(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> AppResult<Json<InstitutionResponse>> {
    let institution = state
        .institution_service
        .get_institution_by_code(&code)
        .await?;
    Ok(Json(InstitutionResponse::from(institution)))
}

/// Update an institution (admin only)
#[utoipa::path(
    put,
    path = "/institutions/{id}",
    tag = "Institutions",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Institution id")),
    request_body = UpdateInstitutionRequest,
    responses(
        (status = 200, description = "Institution updated", body = InstitutionResponse),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Institution not found")
    )
)]
pub async fn update_institution(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateInstitutionRequest>,
) -> AppResult<Json<InstitutionResponse>> {
    let actor = current_user.actor();
    let changes = InstitutionChanges {
        name: payload.name,
        website: payload.website.map(Some),
        is_active: payload.is_active,
    };
    let institution = state
        .institution_service
        .update_institution(&actor, id, changes)
        .await?;
    Ok(Json(InstitutionResponse::from(institution)))
}

/// Soft delete an institution (admin only)
#[utoipa::path(
    delete,
    path = "/institutions/{id}",
    tag = "Institutions",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Institution id")),
    responses(
        (status = 204, description = "Institution deleted"),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Institution not found"),
        (status = 409, description = "Institution still referenced by accounts")
    )
)]
pub async fn delete_institution(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<NoContent> {
    let actor = current_user.actor();
    state
        .institution_service
        .delete_institution(&actor, id)
        .await?;
    Ok(NoContent)
}
