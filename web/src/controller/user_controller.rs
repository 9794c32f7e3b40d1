use crate::controller::ApiResponse;
use crate::extractors::{
    authenticated_user::AuthenticatedUser, compare_api_version::CompareApiVersion, tenant::Tenant,
};
use crate::params::user::{CreateParams, RoleParams, UpdateParams, UpdatePasswordParams};
use crate::{AppState, Error};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domain::{user as UserApi, users, Id};
use log::*;
use service::config::ApiVersion;

/// GET all Users of the active organization
#[utoipa::path(
    get,
    path = "/api/core/users",
    params(ApiVersion),
    responses(
        (status = 200, description = "Successfully retrieved all Users", body = [users::Model]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn index(
    CompareApiVersion(_v): CompareApiVersion,
    Tenant(organization_id): Tenant,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET all Users in organization {organization_id}");

    let users = UserApi::find_by_organization(app_state.db_conn_ref(), organization_id).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), users)))
}

/// GET a particular User of the active organization
#[utoipa::path(
    get,
    path = "/api/core/users/{id}",
    params(
        ApiVersion,
        ("id" = String, Path, description = "User id to retrieve")
    ),
    responses(
        (status = 200, description = "Successfully retrieved a User", body = users::Model),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User not found"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn read(
    CompareApiVersion(_v): CompareApiVersion,
    Tenant(organization_id): Tenant,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET User by id: {id}");

    let user = UserApi::find_in_organization(app_state.db_conn_ref(), organization_id, id).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), user)))
}

/// CREATE a new User in the active organization
#[utoipa::path(
    post,
    path = "/api/core/users",
    params(ApiVersion),
    request_body = CreateParams,
    responses(
        (status = 201, description = "Successfully created a new User", body = users::Model),
        (status = 400, description = "Invalid user"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "A user with this email already exists"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn create(
    CompareApiVersion(_v): CompareApiVersion,
    AuthenticatedUser(session): AuthenticatedUser,
    Tenant(organization_id): Tenant,
    State(app_state): State<AppState>,
    Json(params): Json<CreateParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("CREATE new User in organization {organization_id}");

    let user = UserApi::create(
        app_state.db_conn_ref(),
        &session.user,
        organization_id,
        params.user,
        params.role,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(StatusCode::CREATED.into(), user)),
    ))
}

/// PATCH a User's profile
#[utoipa::path(
    patch,
    path = "/api/core/users/{id}",
    params(
        ApiVersion,
        ("id" = String, Path, description = "Id of user to update"),
    ),
    request_body = UpdateParams,
    responses(
        (status = 200, description = "Successfully updated a User", body = users::Model),
        (status = 400, description = "Invalid user"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "User not found"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn update(
    CompareApiVersion(_v): CompareApiVersion,
    AuthenticatedUser(session): AuthenticatedUser,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
    Json(params): Json<UpdateParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("PATCH User with id: {id}");

    if id != session.user.id {
        let organization_id = session.require_organization()?;
        UserApi::find_in_organization(app_state.db_conn_ref(), organization_id, id).await?;
    }

    let user = UserApi::update(app_state.db_conn_ref(), id, params).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), user)))
}

/// DELETE a User from the active organization. Users left without any
/// organization are deleted.
#[utoipa::path(
    delete,
    path = "/api/core/users/{id}",
    params(
        ApiVersion,
        ("id" = String, Path, description = "User id to remove")
    ),
    responses(
        (status = 200, description = "Successfully removed the User"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "User not found"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete(
    CompareApiVersion(_v): CompareApiVersion,
    AuthenticatedUser(session): AuthenticatedUser,
    Tenant(organization_id): Tenant,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    debug!("DELETE User {id} from organization {organization_id}");

    UserApi::remove_from_organization(app_state.db_conn_ref(), &session.user, organization_id, id)
        .await?;

    Ok(Json(ApiResponse::<()>::no_content(StatusCode::NO_CONTENT.into())))
}

/// PUT a new password for the authenticated user
#[utoipa::path(
    put,
    path = "/api/core/users/{id}/password",
    params(
        ApiVersion,
        ("id" = String, Path, description = "User id"),
    ),
    request_body = UpdatePasswordParams,
    responses(
        (status = 200, description = "Successfully updated the password"),
        (status = 400, description = "Wrong current password or too weak a new one"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_password(
    CompareApiVersion(_v): CompareApiVersion,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
    Json(params): Json<UpdatePasswordParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("PUT password for User {id}");

    UserApi::change_password(
        app_state.db_conn_ref(),
        id,
        &params.current_password,
        params.new_password,
    )
    .await?;
    info!("Password changed for User {id}");

    Ok(Json(ApiResponse::<()>::no_content(StatusCode::NO_CONTENT.into())))
}

/// PUT a User's role in the active organization
#[utoipa::path(
    put,
    path = "/api/core/users/{id}/role",
    params(
        ApiVersion,
        ("id" = String, Path, description = "User id"),
    ),
    request_body = RoleParams,
    responses(
        (status = 200, description = "Successfully changed the role", body = users::Model),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "User not found"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_role(
    CompareApiVersion(_v): CompareApiVersion,
    AuthenticatedUser(session): AuthenticatedUser,
    Tenant(organization_id): Tenant,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
    Json(params): Json<RoleParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("PUT role {} for User {id}", params.role);

    let user = UserApi::set_role(
        app_state.db_conn_ref(),
        &session.user,
        organization_id,
        id,
        params.role,
    )
    .await?;
    info!(
        "User {} set role {} for User {id} in organization {organization_id}",
        session.user.id, params.role
    );

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), user)))
}
