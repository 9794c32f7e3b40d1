use crate::controller::ApiResponse;
use crate::extractors::{
    authenticated_user::AuthenticatedUser, compare_api_version::CompareApiVersion,
};
use crate::params::organization::UpdateParams;
use crate::{AppState, Error};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domain::{organization as OrganizationApi, organizations, Id};
use log::*;
use service::config::ApiVersion;

/// GET all Organizations visible to the authenticated user
#[utoipa::path(
    get,
    path = "/api/core/organizations",
    params(ApiVersion),
    responses(
        (status = 200, description = "Successfully retrieved all Organizations", body = [organizations::Model]),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn index(
    CompareApiVersion(_v): CompareApiVersion,
    AuthenticatedUser(session): AuthenticatedUser,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET all Organizations for user {}", session.user.id);

    let organizations =
        OrganizationApi::find_for_user(app_state.db_conn_ref(), &session.user).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), organizations)))
}

/// GET a particular Organization specified by its id.
#[utoipa::path(
    get,
    path = "/api/core/organizations/{id}",
    params(
        ApiVersion,
        ("id" = String, Path, description = "Organization id to retrieve")
    ),
    responses(
        (status = 200, description = "Successfully retrieved a certain Organization by its id", body = organizations::Model),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Organization not found"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn read(
    CompareApiVersion(_v): CompareApiVersion,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET Organization by id: {id}");

    let organization = OrganizationApi::find_by_id(app_state.db_conn_ref(), id).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), organization)))
}

/// CREATE a new Organization
#[utoipa::path(
    post,
    path = "/api/core/organizations",
    params(ApiVersion),
    request_body = organizations::Model,
    responses(
        (status = 201, description = "Successfully created a new Organization", body = organizations::Model),
        (status = 400, description = "Invalid organization"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "An organization with the same slug exists"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn create(
    CompareApiVersion(_v): CompareApiVersion,
    State(app_state): State<AppState>,
    Json(organization_model): Json<organizations::Model>,
) -> Result<impl IntoResponse, Error> {
    debug!("CREATE new Organization: {:?}", organization_model.name);

    let organization = OrganizationApi::create(app_state.db_conn_ref(), organization_model).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(StatusCode::CREATED.into(), organization)),
    ))
}

/// PATCH an Organization's name or logo. The slug never changes.
#[utoipa::path(
    patch,
    path = "/api/core/organizations/{id}",
    params(
        ApiVersion,
        ("id" = String, Path, description = "Id of organization to update"),
    ),
    request_body = UpdateParams,
    responses(
        (status = 200, description = "Successfully updated a certain Organization", body = organizations::Model),
        (status = 400, description = "Invalid organization"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Organization not found"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn update(
    CompareApiVersion(_v): CompareApiVersion,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
    Json(params): Json<UpdateParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("PATCH Organization with id: {id}");

    let organization = OrganizationApi::update(app_state.db_conn_ref(), id, params).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), organization)))
}

/// DELETE an Organization and everything it owns.
#[utoipa::path(
    delete,
    path = "/api/core/organizations/{id}",
    params(
        ApiVersion,
        ("id" = String, Path, description = "Organization id to delete")
    ),
    responses(
        (status = 200, description = "Successfully deleted a certain Organization by its id"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Organization not found"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete(
    CompareApiVersion(_v): CompareApiVersion,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    debug!("DELETE Organization by id: {id}");

    OrganizationApi::delete_by_id(app_state.db_conn_ref(), id).await?;
    info!("Deleted Organization {id}");

    Ok(Json(ApiResponse::<()>::no_content(StatusCode::NO_CONTENT.into())))
}
