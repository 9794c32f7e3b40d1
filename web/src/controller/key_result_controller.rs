use crate::controller::ApiResponse;
use crate::extractors::{compare_api_version::CompareApiVersion, tenant::Tenant};
use crate::params::objective::{CheckInParams, UpdateKeyResultParams};
use crate::{AppState, Error};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domain::objective::KeyResultWithProgress;
use domain::{objective as ObjectiveApi, Id};
use log::*;
use service::config::ApiVersion;

/// PATCH a key result
#[utoipa::path(
    patch,
    path = "/api/strategy/key-results/{id}",
    params(
        ApiVersion,
        ("id" = String, Path, description = "Id of key result to update"),
    ),
    request_body = UpdateKeyResultParams,
    responses(
        (status = 200, description = "Successfully updated a key result", body = KeyResultWithProgress),
        (status = 400, description = "Invalid key result"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Key result not found"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn update(
    CompareApiVersion(_v): CompareApiVersion,
    Tenant(organization_id): Tenant,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
    Json(params): Json<UpdateKeyResultParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("PATCH key result with id: {id}");

    let key_result =
        ObjectiveApi::update_key_result(app_state.db_conn_ref(), organization_id, id, params)
            .await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), key_result)))
}

/// PUT a new current value on a key result
#[utoipa::path(
    put,
    path = "/api/strategy/key-results/{id}/check-in",
    params(
        ApiVersion,
        ("id" = String, Path, description = "Key result id"),
    ),
    request_body = CheckInParams,
    responses(
        (status = 200, description = "Successfully checked in", body = KeyResultWithProgress),
        (status = 400, description = "Invalid value"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Key result not found"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn check_in(
    CompareApiVersion(_v): CompareApiVersion,
    Tenant(organization_id): Tenant,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
    Json(params): Json<CheckInParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("PUT check-in {} for key result {id}", params.current_value);

    let key_result = ObjectiveApi::check_in(
        app_state.db_conn_ref(),
        organization_id,
        id,
        params.current_value,
    )
    .await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), key_result)))
}

/// DELETE a key result
#[utoipa::path(
    delete,
    path = "/api/strategy/key-results/{id}",
    params(
        ApiVersion,
        ("id" = String, Path, description = "Key result id to delete")
    ),
    responses(
        (status = 200, description = "Successfully deleted a key result"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Key result not found"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete(
    CompareApiVersion(_v): CompareApiVersion,
    Tenant(organization_id): Tenant,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    debug!("DELETE key result by id: {id}");

    ObjectiveApi::delete_key_result(app_state.db_conn_ref(), organization_id, id).await?;

    Ok(Json(ApiResponse::<()>::no_content(StatusCode::NO_CONTENT.into())))
}
