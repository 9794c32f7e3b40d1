use crate::controller::ApiResponse;
use crate::extractors::{compare_api_version::CompareApiVersion, tenant::Tenant};
use crate::params::objective::{IndexParams, SortField, UpdateParams};
use crate::params::WithSortDefaults;
use crate::{AppState, Error};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domain::objective::{KeyResultWithProgress, ObjectiveWithKeyResults};
use domain::{key_results, objective as ObjectiveApi, objectives, Id};
use log::*;
use service::config::ApiVersion;

/// GET all Objectives of the active organization with their key results
#[utoipa::path(
    get,
    path = "/api/strategy/objectives",
    params(
        ApiVersion,
        ("status" = Option<String>, Query, description = "Filter by status"),
        ("period" = Option<String>, Query, description = "Filter by planning period, e.g. 2026-Q4"),
        ("owner_id" = Option<String>, Query, description = "Filter by owner"),
        ("team_id" = Option<String>, Query, description = "Filter by team"),
        ("sort_by" = Option<crate::params::objective::SortField>, Query, description = "Sort by field. Valid values: 'title', 'period', 'created_at', 'updated_at'.", example = "created_at"),
        ("sort_order" = Option<crate::params::sort::SortOrder>, Query, description = "Sort order. Valid values: 'asc' (ascending), 'desc' (descending).", example = "asc")
    ),
    responses(
        (status = 200, description = "Successfully retrieved all Objectives", body = [ObjectiveWithKeyResults]),
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
    debug!("GET all Objectives with params: {params:?}");

    let mut params = params;
    IndexParams::apply_sort_defaults(
        &mut params.sort_by,
        &mut params.sort_order,
        SortField::CreatedAt,
    );

    let objectives = ObjectiveApi::find_by(app_state.db_conn_ref(), organization_id, params).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), objectives)))
}

/// GET an Objective with its key results and progress
#[utoipa::path(
    get,
    path = "/api/strategy/objectives/{id}",
    params(
        ApiVersion,
        ("id" = String, Path, description = "Objective id to retrieve")
    ),
    responses(
        (status = 200, description = "Successfully retrieved an Objective", body = ObjectiveWithKeyResults),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Objective not found"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn read(
    CompareApiVersion(_v): CompareApiVersion,
    Tenant(organization_id): Tenant,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET Objective by id: {id}");

    let objective =
        ObjectiveApi::find_with_key_results(app_state.db_conn_ref(), organization_id, id).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), objective)))
}

/// CREATE a new Objective
#[utoipa::path(
    post,
    path = "/api/strategy/objectives",
    params(ApiVersion),
    request_body = objectives::Model,
    responses(
        (status = 201, description = "Successfully created a new Objective", body = objectives::Model),
        (status = 400, description = "Invalid objective"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn create(
    CompareApiVersion(_v): CompareApiVersion,
    Tenant(organization_id): Tenant,
    State(app_state): State<AppState>,
    Json(objective_model): Json<objectives::Model>,
) -> Result<impl IntoResponse, Error> {
    debug!("CREATE new Objective: {:?}", objective_model.title);

    let objective =
        ObjectiveApi::create(app_state.db_conn_ref(), organization_id, objective_model).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(StatusCode::CREATED.into(), objective)),
    ))
}

/// PATCH an Objective
#[utoipa::path(
    patch,
    path = "/api/strategy/objectives/{id}",
    params(
        ApiVersion,
        ("id" = String, Path, description = "Id of objective to update"),
    ),
    request_body = UpdateParams,
    responses(
        (status = 200, description = "Successfully updated an Objective", body = objectives::Model),
        (status = 400, description = "Invalid objective"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Objective not found"),
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
    debug!("PATCH Objective with id: {id}");

    let objective =
        ObjectiveApi::update(app_state.db_conn_ref(), organization_id, id, params).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), objective)))
}

/// DELETE an Objective and its key results
#[utoipa::path(
    delete,
    path = "/api/strategy/objectives/{id}",
    params(
        ApiVersion,
        ("id" = String, Path, description = "Objective id to delete")
    ),
    responses(
        (status = 200, description = "Successfully deleted an Objective"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Objective not found"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete(
    CompareApiVersion(_v): CompareApiVersion,
    Tenant(organization_id): Tenant,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    debug!("DELETE Objective by id: {id}");

    ObjectiveApi::delete_by_id(app_state.db_conn_ref(), organization_id, id).await?;

    Ok(Json(ApiResponse::<()>::no_content(StatusCode::NO_CONTENT.into())))
}

/// GET the key results of an Objective
#[utoipa::path(
    get,
    path = "/api/strategy/objectives/{id}/key-results",
    params(
        ApiVersion,
        ("id" = String, Path, description = "Objective id")
    ),
    responses(
        (status = 200, description = "Successfully retrieved the key results", body = [KeyResultWithProgress]),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Objective not found"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn key_results_index(
    CompareApiVersion(_v): CompareApiVersion,
    Tenant(organization_id): Tenant,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET key results of Objective {id}");

    let key_results =
        ObjectiveApi::find_key_results(app_state.db_conn_ref(), organization_id, id).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), key_results)))
}

/// CREATE a key result under an Objective
#[utoipa::path(
    post,
    path = "/api/strategy/objectives/{id}/key-results",
    params(
        ApiVersion,
        ("id" = String, Path, description = "Objective id")
    ),
    request_body = key_results::Model,
    responses(
        (status = 201, description = "Successfully created a key result", body = KeyResultWithProgress),
        (status = 400, description = "Invalid key result"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Objective not found"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_key_result(
    CompareApiVersion(_v): CompareApiVersion,
    Tenant(organization_id): Tenant,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
    Json(key_result_model): Json<key_results::Model>,
) -> Result<impl IntoResponse, Error> {
    debug!("CREATE key result for Objective {id}");

    let key_result = ObjectiveApi::create_key_result(
        app_state.db_conn_ref(),
        organization_id,
        id,
        key_result_model,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(StatusCode::CREATED.into(), key_result)),
    ))
}
