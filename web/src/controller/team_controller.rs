use crate::controller::ApiResponse;
use crate::extractors::{compare_api_version::CompareApiVersion, tenant::Tenant};
use crate::params::team::{AddMemberParams, IndexParams, SortField, UpdateParams};
use crate::params::WithSortDefaults;
use crate::{AppState, Error};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domain::{team as TeamApi, team_members, teams, users, Id};
use log::*;
use service::config::ApiVersion;

/// GET all Teams of the active organization
#[utoipa::path(
    get,
    path = "/api/core/teams",
    params(
        ApiVersion,
        ("lead_id" = Option<String>, Query, description = "Filter by team lead"),
        ("sort_by" = Option<crate::params::team::SortField>, Query, description = "Sort by field. Valid values: 'name', 'created_at'.", example = "name"),
        ("sort_order" = Option<crate::params::sort::SortOrder>, Query, description = "Sort order. Valid values: 'asc' (ascending), 'desc' (descending).", example = "asc")
    ),
    responses(
        (status = 200, description = "Successfully retrieved all Teams", body = [teams::Model]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn index(
    CompareApiVersion(_v): CompareApiVersion,
    Tenant(organization_id): Tenant,
    State(app_state): State<AppState>,
    Query(params): Query<IndexParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET all Teams with params: {params:?}");

    let mut params = params;
    IndexParams::apply_sort_defaults(&mut params.sort_by, &mut params.sort_order, SortField::Name);

    let teams = TeamApi::find_by(app_state.db_conn_ref(), organization_id, params).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), teams)))
}

/// GET a particular Team specified by its id.
#[utoipa::path(
    get,
    path = "/api/core/teams/{id}",
    params(
        ApiVersion,
        ("id" = String, Path, description = "Team id to retrieve")
    ),
    responses(
        (status = 200, description = "Successfully retrieved a Team", body = teams::Model),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Team not found"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn read(
    CompareApiVersion(_v): CompareApiVersion,
    Tenant(organization_id): Tenant,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET Team by id: {id}");

    let team = TeamApi::find_by_id(app_state.db_conn_ref(), organization_id, id).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), team)))
}

/// CREATE a new Team
#[utoipa::path(
    post,
    path = "/api/core/teams",
    params(ApiVersion),
    request_body = teams::Model,
    responses(
        (status = 201, description = "Successfully created a new Team", body = teams::Model),
        (status = 400, description = "Invalid team"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "A team with this name already exists"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn create(
    CompareApiVersion(_v): CompareApiVersion,
    Tenant(organization_id): Tenant,
    State(app_state): State<AppState>,
    Json(team_model): Json<teams::Model>,
) -> Result<impl IntoResponse, Error> {
    debug!("CREATE new Team: {:?}", team_model.name);

    let team = TeamApi::create(app_state.db_conn_ref(), organization_id, team_model).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(StatusCode::CREATED.into(), team)),
    ))
}

/// PATCH a Team
#[utoipa::path(
    patch,
    path = "/api/core/teams/{id}",
    params(
        ApiVersion,
        ("id" = String, Path, description = "Id of team to update"),
    ),
    request_body = UpdateParams,
    responses(
        (status = 200, description = "Successfully updated a Team", body = teams::Model),
        (status = 400, description = "Invalid team"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Team not found"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn update(
    CompareApiVersion(_v): CompareApiVersion,
    Tenant(organization_id): Tenant,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
    Json(params): Json<UpdateParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("PATCH Team with id: {id}");

    let team = TeamApi::update(app_state.db_conn_ref(), organization_id, id, params).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), team)))
}

/// DELETE a Team
#[utoipa::path(
    delete,
    path = "/api/core/teams/{id}",
    params(
        ApiVersion,
        ("id" = String, Path, description = "Team id to delete")
    ),
    responses(
        (status = 200, description = "Successfully deleted a Team"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Team not found"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete(
    CompareApiVersion(_v): CompareApiVersion,
    Tenant(organization_id): Tenant,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    debug!("DELETE Team by id: {id}");

    TeamApi::delete_by_id(app_state.db_conn_ref(), organization_id, id).await?;

    Ok(Json(ApiResponse::<()>::no_content(StatusCode::NO_CONTENT.into())))
}

/// GET the members of a Team
#[utoipa::path(
    get,
    path = "/api/core/teams/{id}/members",
    params(
        ApiVersion,
        ("id" = String, Path, description = "Team id")
    ),
    responses(
        (status = 200, description = "Successfully retrieved the Team's members", body = [users::Model]),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Team not found"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn members(
    CompareApiVersion(_v): CompareApiVersion,
    Tenant(organization_id): Tenant,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET members of Team {id}");

    let members = TeamApi::find_members(app_state.db_conn_ref(), organization_id, id).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), members)))
}

/// POST add an organization member to a Team
#[utoipa::path(
    post,
    path = "/api/core/teams/{id}/members",
    params(
        ApiVersion,
        ("id" = String, Path, description = "Team id")
    ),
    request_body = AddMemberParams,
    responses(
        (status = 201, description = "Successfully added the member", body = team_members::Model),
        (status = 400, description = "User is not a member of the organization"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Team not found"),
        (status = 409, description = "User is already on the team"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn add_member(
    CompareApiVersion(_v): CompareApiVersion,
    Tenant(organization_id): Tenant,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
    Json(params): Json<AddMemberParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("POST User {} to Team {id}", params.user_id);

    let membership =
        TeamApi::add_member(app_state.db_conn_ref(), organization_id, id, params.user_id).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(StatusCode::CREATED.into(), membership)),
    ))
}

/// DELETE a member from a Team
#[utoipa::path(
    delete,
    path = "/api/core/teams/{id}/members/{user_id}",
    params(
        ApiVersion,
        ("id" = String, Path, description = "Team id"),
        ("user_id" = String, Path, description = "User id to remove"),
    ),
    responses(
        (status = 200, description = "Successfully removed the member"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Team or membership not found"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn remove_member(
    CompareApiVersion(_v): CompareApiVersion,
    Tenant(organization_id): Tenant,
    State(app_state): State<AppState>,
    Path((id, user_id)): Path<(Id, Id)>,
) -> Result<impl IntoResponse, Error> {
    debug!("DELETE User {user_id} from Team {id}");

    TeamApi::remove_member(app_state.db_conn_ref(), organization_id, id, user_id).await?;

    Ok(Json(ApiResponse::<()>::no_content(StatusCode::NO_CONTENT.into())))
}
