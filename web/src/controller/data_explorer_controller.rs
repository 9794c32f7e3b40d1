use crate::controller::ApiResponse;
use crate::extractors::{compare_api_version::CompareApiVersion, tenant::Tenant};
use crate::{AppState, Error};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domain::data_explorer::{self as DataExplorerApi, QueryRequest, QueryResult, TableDescription};
use log::*;
use service::config::ApiVersion;

/// GET the explorable tables and their fields
#[utoipa::path(
    get,
    path = "/api/data-explorer/tables",
    params(ApiVersion),
    responses(
        (status = 200, description = "Successfully retrieved the explorable tables", body = [TableDescription]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn tables(CompareApiVersion(_v): CompareApiVersion) -> Result<impl IntoResponse, Error> {
    debug!("GET explorable tables");

    Ok(Json(ApiResponse::new(
        StatusCode::OK.into(),
        DataExplorerApi::list_tables(),
    )))
}

/// GET one table's fields, types and supported operators
#[utoipa::path(
    get,
    path = "/api/data-explorer/tables/{table}",
    params(
        ApiVersion,
        ("table" = String, Path, description = "Table name, e.g. 'tickets'")
    ),
    responses(
        (status = 200, description = "Successfully described the table", body = TableDescription),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Unknown table"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn describe(
    CompareApiVersion(_v): CompareApiVersion,
    Path(table): Path<String>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET explorable table {table}");

    let description = DataExplorerApi::describe_table(&table)?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), description)))
}

/// POST a filtered, sorted and paginated query against a table
#[utoipa::path(
    post,
    path = "/api/data-explorer/tables/{table}/query",
    params(
        ApiVersion,
        ("table" = String, Path, description = "Table name, e.g. 'tickets'")
    ),
    request_body = QueryRequest,
    responses(
        (status = 200, description = "Successfully ran the query", body = QueryResult),
        (status = 400, description = "Unknown field, unsupported operator or a value of the wrong type"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Unknown table"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn query(
    CompareApiVersion(_v): CompareApiVersion,
    Tenant(organization_id): Tenant,
    State(app_state): State<AppState>,
    Path(table): Path<String>,
    Json(request): Json<QueryRequest>,
) -> Result<impl IntoResponse, Error> {
    debug!(
        "POST query on {table} with {} filters",
        request.filters.len()
    );

    let result =
        DataExplorerApi::query(app_state.db_conn_ref(), organization_id, &table, &request).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), result)))
}
