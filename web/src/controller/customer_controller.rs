use crate::controller::ApiResponse;
use crate::extractors::{compare_api_version::CompareApiVersion, tenant::Tenant};
use crate::params::customer::{IndexParams, SortField, UpdateParams};
use crate::params::WithSortDefaults;
use crate::{AppState, Error};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domain::{customer as CustomerApi, customers, Id};
use log::*;
use service::config::ApiVersion;

/// GET all Customers of the active organization
#[utoipa::path(
    get,
    path = "/api/crm/customers",
    params(
        ApiVersion,
        ("status" = Option<String>, Query, description = "Filter by customer status"),
        ("sort_by" = Option<crate::params::customer::SortField>, Query, description = "Sort by field. Valid values: 'name', 'company', 'created_at', 'updated_at'.", example = "name"),
        ("sort_order" = Option<crate::params::sort::SortOrder>, Query, description = "Sort order. Valid values: 'asc' (ascending), 'desc' (descending).", example = "asc")
    ),
    responses(
        (status = 200, description = "Successfully retrieved all Customers", body = [customers::Model]),
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
    debug!("GET all Customers with params: {params:?}");

    let mut params = params;
    IndexParams::apply_sort_defaults(&mut params.sort_by, &mut params.sort_order, SortField::Name);

    let customers = CustomerApi::find_by(app_state.db_conn_ref(), organization_id, params).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), customers)))
}

/// GET a particular Customer specified by its id.
#[utoipa::path(
    get,
    path = "/api/crm/customers/{id}",
    params(
        ApiVersion,
        ("id" = String, Path, description = "Customer id to retrieve")
    ),
    responses(
        (status = 200, description = "Successfully retrieved a Customer", body = customers::Model),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Customer not found"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn read(
    CompareApiVersion(_v): CompareApiVersion,
    Tenant(organization_id): Tenant,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET Customer by id: {id}");

    let customer = CustomerApi::find_by_id(app_state.db_conn_ref(), organization_id, id).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), customer)))
}

/// CREATE a new Customer
#[utoipa::path(
    post,
    path = "/api/crm/customers",
    params(ApiVersion),
    request_body = customers::Model,
    responses(
        (status = 201, description = "Successfully created a new Customer", body = customers::Model),
        (status = 400, description = "Invalid customer"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "A customer with this external reference already exists"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn create(
    CompareApiVersion(_v): CompareApiVersion,
    Tenant(organization_id): Tenant,
    State(app_state): State<AppState>,
    Json(customer_model): Json<customers::Model>,
) -> Result<impl IntoResponse, Error> {
    debug!("CREATE new Customer: {:?}", customer_model.name);

    let customer =
        CustomerApi::create(app_state.db_conn_ref(), organization_id, customer_model).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(StatusCode::CREATED.into(), customer)),
    ))
}

/// PATCH a Customer
#[utoipa::path(
    patch,
    path = "/api/crm/customers/{id}",
    params(
        ApiVersion,
        ("id" = String, Path, description = "Id of customer to update"),
    ),
    request_body = UpdateParams,
    responses(
        (status = 200, description = "Successfully updated a Customer", body = customers::Model),
        (status = 400, description = "Invalid customer"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Customer not found"),
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
    debug!("PATCH Customer with id: {id}");

    let customer = CustomerApi::update(app_state.db_conn_ref(), organization_id, id, params).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), customer)))
}

/// DELETE a Customer. Tickets keep existing without the customer reference.
#[utoipa::path(
    delete,
    path = "/api/crm/customers/{id}",
    params(
        ApiVersion,
        ("id" = String, Path, description = "Customer id to delete")
    ),
    responses(
        (status = 200, description = "Successfully deleted a Customer"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Customer not found"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete(
    CompareApiVersion(_v): CompareApiVersion,
    Tenant(organization_id): Tenant,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    debug!("DELETE Customer by id: {id}");

    CustomerApi::delete_by_id(app_state.db_conn_ref(), organization_id, id).await?;

    Ok(Json(ApiResponse::<()>::no_content(StatusCode::NO_CONTENT.into())))
}
