use crate::controller::ApiResponse;
use crate::extractors::{compare_api_version::CompareApiVersion, tenant::Tenant};
use crate::params::email_template::{IndexParams, RenderParams, SortField, UpdateParams};
use crate::params::WithSortDefaults;
use crate::{AppState, Error};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domain::email_template::RenderedEmail;
use domain::{email_template as EmailTemplateApi, email_templates, Id};
use log::*;
use service::config::ApiVersion;

/// GET all Email Templates of the active organization
#[utoipa::path(
    get,
    path = "/api/email/templates",
    params(
        ApiVersion,
        ("sort_by" = Option<crate::params::email_template::SortField>, Query, description = "Sort by field. Valid values: 'name', 'created_at', 'updated_at'.", example = "name"),
        ("sort_order" = Option<crate::params::sort::SortOrder>, Query, description = "Sort order. Valid values: 'asc' (ascending), 'desc' (descending).", example = "asc")
    ),
    responses(
        (status = 200, description = "Successfully retrieved all Email Templates", body = [email_templates::Model]),
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
    debug!("GET all Email Templates with params: {params:?}");

    let mut params = params;
    IndexParams::apply_sort_defaults(&mut params.sort_by, &mut params.sort_order, SortField::Name);

    let templates =
        EmailTemplateApi::find_by(app_state.db_conn_ref(), organization_id, params).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), templates)))
}

/// GET a particular Email Template specified by its id.
#[utoipa::path(
    get,
    path = "/api/email/templates/{id}",
    params(
        ApiVersion,
        ("id" = String, Path, description = "Email Template id to retrieve")
    ),
    responses(
        (status = 200, description = "Successfully retrieved an Email Template", body = email_templates::Model),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Email Template not found"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn read(
    CompareApiVersion(_v): CompareApiVersion,
    Tenant(organization_id): Tenant,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET Email Template by id: {id}");

    let template =
        EmailTemplateApi::find_by_id(app_state.db_conn_ref(), organization_id, id).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), template)))
}

/// CREATE a new Email Template. Every part must compile as Handlebars.
#[utoipa::path(
    post,
    path = "/api/email/templates",
    params(ApiVersion),
    request_body = email_templates::Model,
    responses(
        (status = 201, description = "Successfully created a new Email Template", body = email_templates::Model),
        (status = 400, description = "Invalid template syntax"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "A template with this name already exists"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn create(
    CompareApiVersion(_v): CompareApiVersion,
    Tenant(organization_id): Tenant,
    State(app_state): State<AppState>,
    Json(template_model): Json<email_templates::Model>,
) -> Result<impl IntoResponse, Error> {
    debug!("CREATE new Email Template: {:?}", template_model.name);

    let template =
        EmailTemplateApi::create(app_state.db_conn_ref(), organization_id, template_model).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(StatusCode::CREATED.into(), template)),
    ))
}

/// PATCH an Email Template
#[utoipa::path(
    patch,
    path = "/api/email/templates/{id}",
    params(
        ApiVersion,
        ("id" = String, Path, description = "Id of email template to update"),
    ),
    request_body = UpdateParams,
    responses(
        (status = 200, description = "Successfully updated an Email Template", body = email_templates::Model),
        (status = 400, description = "Invalid template syntax"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Email Template not found"),
        (status = 409, description = "A template with this name already exists"),
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
    debug!("PATCH Email Template with id: {id}");

    let template =
        EmailTemplateApi::update(app_state.db_conn_ref(), organization_id, id, params).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), template)))
}

/// DELETE an Email Template
#[utoipa::path(
    delete,
    path = "/api/email/templates/{id}",
    params(
        ApiVersion,
        ("id" = String, Path, description = "Email Template id to delete")
    ),
    responses(
        (status = 200, description = "Successfully deleted an Email Template"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Email Template not found"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete(
    CompareApiVersion(_v): CompareApiVersion,
    Tenant(organization_id): Tenant,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    debug!("DELETE Email Template by id: {id}");

    EmailTemplateApi::delete_by_id(app_state.db_conn_ref(), organization_id, id).await?;

    Ok(Json(ApiResponse::<()>::no_content(StatusCode::NO_CONTENT.into())))
}

/// POST variables to render an Email Template
#[utoipa::path(
    post,
    path = "/api/email/templates/{id}/render",
    params(
        ApiVersion,
        ("id" = String, Path, description = "Email Template id to render")
    ),
    request_body = RenderParams,
    responses(
        (status = 200, description = "Successfully rendered the Email Template", body = RenderedEmail),
        (status = 400, description = "A variable used by the template is missing"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Email Template not found"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn render(
    CompareApiVersion(_v): CompareApiVersion,
    Tenant(organization_id): Tenant,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
    Json(params): Json<RenderParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("POST render Email Template {id}");

    let rendered = EmailTemplateApi::render(
        app_state.db_conn_ref(),
        organization_id,
        id,
        &params.variables,
    )
    .await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), rendered)))
}
