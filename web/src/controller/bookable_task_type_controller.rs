use crate::controller::ApiResponse;
use crate::extractors::{compare_api_version::CompareApiVersion, tenant::Tenant};
use crate::params::bookable_task_type::{IndexParams, SortField, UpdateParams};
use crate::params::WithSortDefaults;
use crate::{AppState, Error};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domain::{bookable_task_type as BookableTaskTypeApi, bookable_task_types, Id};
use log::*;
use service::config::ApiVersion;

/// GET all Bookable Task Types of the active organization
#[utoipa::path(
    get,
    path = "/api/bookings/bookable-task-types",
    params(
        ApiVersion,
        ("active" = Option<bool>, Query, description = "Filter by whether the type can be booked"),
        ("sort_by" = Option<crate::params::bookable_task_type::SortField>, Query, description = "Sort by field. Valid values: 'name', 'duration_minutes', 'created_at'.", example = "name"),
        ("sort_order" = Option<crate::params::sort::SortOrder>, Query, description = "Sort order. Valid values: 'asc' (ascending), 'desc' (descending).", example = "asc")
    ),
    responses(
        (status = 200, description = "Successfully retrieved all Bookable Task Types", body = [bookable_task_types::Model]),
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
    debug!("GET all Bookable Task Types with params: {params:?}");

    let mut params = params;
    IndexParams::apply_sort_defaults(&mut params.sort_by, &mut params.sort_order, SortField::Name);

    let task_types =
        BookableTaskTypeApi::find_by(app_state.db_conn_ref(), organization_id, params).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), task_types)))
}

/// GET a particular Bookable Task Type specified by its id.
#[utoipa::path(
    get,
    path = "/api/bookings/bookable-task-types/{id}",
    params(
        ApiVersion,
        ("id" = String, Path, description = "Bookable Task Type id to retrieve")
    ),
    responses(
        (status = 200, description = "Successfully retrieved a Bookable Task Type", body = bookable_task_types::Model),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Bookable Task Type not found"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn read(
    CompareApiVersion(_v): CompareApiVersion,
    Tenant(organization_id): Tenant,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET Bookable Task Type by id: {id}");

    let task_type =
        BookableTaskTypeApi::find_by_id(app_state.db_conn_ref(), organization_id, id).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), task_type)))
}

/// CREATE a new Bookable Task Type
#[utoipa::path(
    post,
    path = "/api/bookings/bookable-task-types",
    params(ApiVersion),
    request_body = bookable_task_types::Model,
    responses(
        (status = 201, description = "Successfully created a new Bookable Task Type", body = bookable_task_types::Model),
        (status = 400, description = "Invalid duration, buffer or color"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "A task type with this name already exists"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn create(
    CompareApiVersion(_v): CompareApiVersion,
    Tenant(organization_id): Tenant,
    State(app_state): State<AppState>,
    Json(task_type_model): Json<bookable_task_types::Model>,
) -> Result<impl IntoResponse, Error> {
    debug!("CREATE new Bookable Task Type: {:?}", task_type_model.name);

    let task_type =
        BookableTaskTypeApi::create(app_state.db_conn_ref(), organization_id, task_type_model)
            .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(StatusCode::CREATED.into(), task_type)),
    ))
}

/// PATCH a Bookable Task Type
#[utoipa::path(
    patch,
    path = "/api/bookings/bookable-task-types/{id}",
    params(
        ApiVersion,
        ("id" = String, Path, description = "Id of bookable task type to update"),
    ),
    request_body = UpdateParams,
    responses(
        (status = 200, description = "Successfully updated a Bookable Task Type", body = bookable_task_types::Model),
        (status = 400, description = "Invalid duration, buffer or color"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Bookable Task Type not found"),
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
    debug!("PATCH Bookable Task Type with id: {id}");

    let task_type =
        BookableTaskTypeApi::update(app_state.db_conn_ref(), organization_id, id, params).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), task_type)))
}

/// DELETE a Bookable Task Type
#[utoipa::path(
    delete,
    path = "/api/bookings/bookable-task-types/{id}",
    params(
        ApiVersion,
        ("id" = String, Path, description = "Bookable Task Type id to delete")
    ),
    responses(
        (status = 200, description = "Successfully deleted a Bookable Task Type"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Bookable Task Type not found"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete(
    CompareApiVersion(_v): CompareApiVersion,
    Tenant(organization_id): Tenant,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    debug!("DELETE Bookable Task Type by id: {id}");

    BookableTaskTypeApi::delete_by_id(app_state.db_conn_ref(), organization_id, id).await?;

    Ok(Json(ApiResponse::<()>::no_content(StatusCode::NO_CONTENT.into())))
}
