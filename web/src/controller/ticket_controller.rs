use crate::controller::ApiResponse;
use crate::extractors::{
    authenticated_user::AuthenticatedUser, compare_api_version::CompareApiVersion, tenant::Tenant,
};
use crate::params::ticket::{IndexParams, SortField, UpdateParams};
use crate::params::WithSortDefaults;
use crate::{AppState, Error};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domain::{ticket as TicketApi, ticket_comments, tickets, Id};
use log::*;
use service::config::ApiVersion;

/// GET all Tickets of the active organization
#[utoipa::path(
    get,
    path = "/api/crm/tickets",
    params(
        ApiVersion,
        ("status" = Option<String>, Query, description = "Filter by status"),
        ("priority" = Option<String>, Query, description = "Filter by priority"),
        ("assignee_id" = Option<String>, Query, description = "Filter by assignee"),
        ("customer_id" = Option<String>, Query, description = "Filter by customer"),
        ("team_id" = Option<String>, Query, description = "Filter by team"),
        ("sort_by" = Option<crate::params::ticket::SortField>, Query, description = "Sort by field. Valid values: 'created_at', 'updated_at', 'due_at', 'title'.", example = "created_at"),
        ("sort_order" = Option<crate::params::sort::SortOrder>, Query, description = "Sort order. Valid values: 'asc' (ascending), 'desc' (descending).", example = "desc")
    ),
    responses(
        (status = 200, description = "Successfully retrieved all Tickets", body = [tickets::Model]),
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
    debug!("GET all Tickets with params: {params:?}");

    let mut params = params;
    IndexParams::apply_sort_defaults(
        &mut params.sort_by,
        &mut params.sort_order,
        SortField::CreatedAt,
    );

    let tickets = TicketApi::find_by(app_state.db_conn_ref(), organization_id, params).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), tickets)))
}

/// GET a particular Ticket specified by its id.
#[utoipa::path(
    get,
    path = "/api/crm/tickets/{id}",
    params(
        ApiVersion,
        ("id" = String, Path, description = "Ticket id to retrieve")
    ),
    responses(
        (status = 200, description = "Successfully retrieved a Ticket", body = tickets::Model),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Ticket not found"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn read(
    CompareApiVersion(_v): CompareApiVersion,
    Tenant(organization_id): Tenant,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET Ticket by id: {id}");

    let ticket = TicketApi::find_by_id(app_state.db_conn_ref(), organization_id, id).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), ticket)))
}

/// CREATE a new Ticket reported by the authenticated user
#[utoipa::path(
    post,
    path = "/api/crm/tickets",
    params(ApiVersion),
    request_body = tickets::Model,
    responses(
        (status = 201, description = "Successfully created a new Ticket", body = tickets::Model),
        (status = 400, description = "Invalid ticket or a reference outside the organization"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn create(
    CompareApiVersion(_v): CompareApiVersion,
    AuthenticatedUser(session): AuthenticatedUser,
    Tenant(organization_id): Tenant,
    State(app_state): State<AppState>,
    Json(ticket_model): Json<tickets::Model>,
) -> Result<impl IntoResponse, Error> {
    debug!("CREATE new Ticket: {:?}", ticket_model.title);

    let ticket = TicketApi::create(
        app_state.db_conn_ref(),
        organization_id,
        session.user.id,
        ticket_model,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(StatusCode::CREATED.into(), ticket)),
    ))
}

/// PATCH a Ticket. Moving it to resolved or closed stamps `resolved_at`.
#[utoipa::path(
    patch,
    path = "/api/crm/tickets/{id}",
    params(
        ApiVersion,
        ("id" = String, Path, description = "Id of ticket to update"),
    ),
    request_body = UpdateParams,
    responses(
        (status = 200, description = "Successfully updated a Ticket", body = tickets::Model),
        (status = 400, description = "Invalid ticket"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Ticket not found"),
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
    debug!("PATCH Ticket with id: {id}");

    let ticket = TicketApi::update(app_state.db_conn_ref(), organization_id, id, params).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), ticket)))
}

/// DELETE a Ticket and its comments
#[utoipa::path(
    delete,
    path = "/api/crm/tickets/{id}",
    params(
        ApiVersion,
        ("id" = String, Path, description = "Ticket id to delete")
    ),
    responses(
        (status = 200, description = "Successfully deleted a Ticket"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Ticket not found"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete(
    CompareApiVersion(_v): CompareApiVersion,
    Tenant(organization_id): Tenant,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    debug!("DELETE Ticket by id: {id}");

    TicketApi::delete_by_id(app_state.db_conn_ref(), organization_id, id).await?;

    Ok(Json(ApiResponse::<()>::no_content(StatusCode::NO_CONTENT.into())))
}

/// GET the comments on a Ticket, oldest first
#[utoipa::path(
    get,
    path = "/api/crm/tickets/{id}/comments",
    params(
        ApiVersion,
        ("id" = String, Path, description = "Ticket id")
    ),
    responses(
        (status = 200, description = "Successfully retrieved the comments", body = [ticket_comments::Model]),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Ticket not found"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn comments(
    CompareApiVersion(_v): CompareApiVersion,
    Tenant(organization_id): Tenant,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET comments for Ticket {id}");

    let comments = TicketApi::find_comments(app_state.db_conn_ref(), organization_id, id).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), comments)))
}

/// POST a comment on a Ticket as the authenticated user
#[utoipa::path(
    post,
    path = "/api/crm/tickets/{id}/comments",
    params(
        ApiVersion,
        ("id" = String, Path, description = "Ticket id")
    ),
    request_body = ticket_comments::Model,
    responses(
        (status = 201, description = "Successfully added a comment", body = ticket_comments::Model),
        (status = 400, description = "Empty comment"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Ticket not found"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn add_comment(
    CompareApiVersion(_v): CompareApiVersion,
    AuthenticatedUser(session): AuthenticatedUser,
    Tenant(organization_id): Tenant,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
    Json(comment_model): Json<ticket_comments::Model>,
) -> Result<impl IntoResponse, Error> {
    debug!("POST comment on Ticket {id}");

    let comment = TicketApi::add_comment(
        app_state.db_conn_ref(),
        organization_id,
        id,
        session.user.id,
        comment_model,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(StatusCode::CREATED.into(), comment)),
    ))
}
