use crate::controller::ApiResponse;
use crate::extractors::{compare_api_version::CompareApiVersion, tenant::Tenant};
use crate::{AppState, Error};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domain::integration::{self as IntegrationApi, IntegrationSettings, IntegrationStatus};
use log::*;
use service::config::ApiVersion;

/// GET every catalog provider with the organization's connection state
#[utoipa::path(
    get,
    path = "/api/integrations",
    params(ApiVersion),
    responses(
        (status = 200, description = "Successfully retrieved all Integrations", body = [IntegrationStatus]),
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
    debug!("GET all Integrations for organization {organization_id}");

    let statuses = IntegrationApi::find_statuses(app_state.db_conn_ref(), organization_id).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), statuses)))
}

/// GET one provider's connection state
#[utoipa::path(
    get,
    path = "/api/integrations/{provider}",
    params(
        ApiVersion,
        ("provider" = String, Path, description = "Provider key, e.g. 'splynx'")
    ),
    responses(
        (status = 200, description = "Successfully retrieved the Integration", body = IntegrationStatus),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Unknown provider"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn read(
    CompareApiVersion(_v): CompareApiVersion,
    Tenant(organization_id): Tenant,
    State(app_state): State<AppState>,
    Path(provider): Path<String>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET Integration {provider}");

    let provider = IntegrationApi::parse_provider(&provider)?;
    let status =
        IntegrationApi::find_status(app_state.db_conn_ref(), organization_id, provider).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), status)))
}

/// PUT credentials for a provider, replacing any stored ones
#[utoipa::path(
    put,
    path = "/api/integrations/{provider}",
    params(
        ApiVersion,
        ("provider" = String, Path, description = "Provider key, e.g. 'splynx'")
    ),
    request_body = IntegrationSettings,
    responses(
        (status = 200, description = "Successfully stored the Integration", body = IntegrationStatus),
        (status = 400, description = "Missing required credentials"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Unknown provider"),
        (status = 500, description = "Credential encryption is not configured"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn upsert(
    CompareApiVersion(_v): CompareApiVersion,
    Tenant(organization_id): Tenant,
    State(app_state): State<AppState>,
    Path(provider): Path<String>,
    Json(settings): Json<IntegrationSettings>,
) -> Result<impl IntoResponse, Error> {
    debug!("PUT Integration {provider}");

    let provider = IntegrationApi::parse_provider(&provider)?;
    let status = IntegrationApi::upsert(
        app_state.db_conn_ref(),
        &app_state.config,
        organization_id,
        provider,
        settings,
    )
    .await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), status)))
}

/// DELETE a provider's stored credentials
#[utoipa::path(
    delete,
    path = "/api/integrations/{provider}",
    params(
        ApiVersion,
        ("provider" = String, Path, description = "Provider key, e.g. 'splynx'")
    ),
    responses(
        (status = 200, description = "Successfully deleted the Integration"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Unknown provider or nothing stored"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete(
    CompareApiVersion(_v): CompareApiVersion,
    Tenant(organization_id): Tenant,
    State(app_state): State<AppState>,
    Path(provider): Path<String>,
) -> Result<impl IntoResponse, Error> {
    debug!("DELETE Integration {provider}");

    let provider = IntegrationApi::parse_provider(&provider)?;
    IntegrationApi::delete(app_state.db_conn_ref(), organization_id, provider).await?;
    info!("Removed {provider} integration from organization {organization_id}");

    Ok(Json(ApiResponse::<()>::no_content(StatusCode::NO_CONTENT.into())))
}
