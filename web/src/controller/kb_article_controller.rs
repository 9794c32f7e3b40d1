use crate::controller::ApiResponse;
use crate::extractors::{
    authenticated_user::AuthenticatedUser, compare_api_version::CompareApiVersion, tenant::Tenant,
};
use crate::params::kb_article::{IndexParams, SortField, UpdateParams};
use crate::params::WithSortDefaults;
use crate::{AppState, Error};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domain::{auth::Session, kb_article as KbArticleApi, kb_articles, roles::Role, Id};
use log::*;
use service::config::ApiVersion;

/// Team members only ever see published articles.
fn published_only(session: &Session) -> bool {
    !session.has_role_at_least(Role::Manager)
}

/// GET all knowledge base Articles of the active organization
#[utoipa::path(
    get,
    path = "/api/kb/articles",
    params(
        ApiVersion,
        ("status" = Option<String>, Query, description = "Filter by status (managers and above)"),
        ("category" = Option<String>, Query, description = "Filter by category"),
        ("sort_by" = Option<crate::params::kb_article::SortField>, Query, description = "Sort by field. Valid values: 'title', 'published_at', 'created_at', 'updated_at'.", example = "title"),
        ("sort_order" = Option<crate::params::sort::SortOrder>, Query, description = "Sort order. Valid values: 'asc' (ascending), 'desc' (descending).", example = "asc")
    ),
    responses(
        (status = 200, description = "Successfully retrieved all Articles", body = [kb_articles::Model]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn index(
    CompareApiVersion(_v): CompareApiVersion,
    AuthenticatedUser(session): AuthenticatedUser,
    Tenant(organization_id): Tenant,
    State(app_state): State<AppState>,
    Query(params): Query<IndexParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET all KB Articles with params: {params:?}");

    let mut params = params;
    IndexParams::apply_sort_defaults(&mut params.sort_by, &mut params.sort_order, SortField::Title);

    let articles = KbArticleApi::find_by(
        app_state.db_conn_ref(),
        organization_id,
        published_only(&session),
        params,
    )
    .await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), articles)))
}

/// GET a particular Article specified by its id.
#[utoipa::path(
    get,
    path = "/api/kb/articles/{id}",
    params(
        ApiVersion,
        ("id" = String, Path, description = "Article id to retrieve")
    ),
    responses(
        (status = 200, description = "Successfully retrieved an Article", body = kb_articles::Model),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Article not found or not visible"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn read(
    CompareApiVersion(_v): CompareApiVersion,
    AuthenticatedUser(session): AuthenticatedUser,
    Tenant(organization_id): Tenant,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET KB Article by id: {id}");

    let article = KbArticleApi::find_by_id(
        app_state.db_conn_ref(),
        organization_id,
        published_only(&session),
        id,
    )
    .await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), article)))
}

/// CREATE a new Article authored by the authenticated user
#[utoipa::path(
    post,
    path = "/api/kb/articles",
    params(ApiVersion),
    request_body = kb_articles::Model,
    responses(
        (status = 201, description = "Successfully created a new Article", body = kb_articles::Model),
        (status = 400, description = "Invalid article"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "An article with this slug already exists"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn create(
    CompareApiVersion(_v): CompareApiVersion,
    AuthenticatedUser(session): AuthenticatedUser,
    Tenant(organization_id): Tenant,
    State(app_state): State<AppState>,
    Json(article_model): Json<kb_articles::Model>,
) -> Result<impl IntoResponse, Error> {
    debug!("CREATE new KB Article: {:?}", article_model.title);

    let article = KbArticleApi::create(
        app_state.db_conn_ref(),
        organization_id,
        session.user.id,
        article_model,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(StatusCode::CREATED.into(), article)),
    ))
}

/// PATCH an Article. Publishing it for the first time stamps `published_at`.
#[utoipa::path(
    patch,
    path = "/api/kb/articles/{id}",
    params(
        ApiVersion,
        ("id" = String, Path, description = "Id of article to update"),
    ),
    request_body = UpdateParams,
    responses(
        (status = 200, description = "Successfully updated an Article", body = kb_articles::Model),
        (status = 400, description = "Invalid article"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Article not found"),
        (status = 409, description = "An article with this slug already exists"),
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
    debug!("PATCH KB Article with id: {id}");

    let article =
        KbArticleApi::update(app_state.db_conn_ref(), organization_id, id, params).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), article)))
}

/// DELETE an Article
#[utoipa::path(
    delete,
    path = "/api/kb/articles/{id}",
    params(
        ApiVersion,
        ("id" = String, Path, description = "Article id to delete")
    ),
    responses(
        (status = 200, description = "Successfully deleted an Article"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Article not found"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete(
    CompareApiVersion(_v): CompareApiVersion,
    Tenant(organization_id): Tenant,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    debug!("DELETE KB Article by id: {id}");

    KbArticleApi::delete_by_id(app_state.db_conn_ref(), organization_id, id).await?;

    Ok(Json(ApiResponse::<()>::no_content(StatusCode::NO_CONTENT.into())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protect::test_support::session;

    #[test]
    fn team_members_only_see_published_articles() {
        let organization_id = Id::new_v4();
        let member = session(&[(Some(organization_id), Role::TeamMember)], Some(organization_id));
        let manager = session(&[(Some(organization_id), Role::Manager)], Some(organization_id));
        let super_admin = session(&[(None, Role::SuperAdmin)], Some(organization_id));

        assert!(published_only(&member));
        assert!(!published_only(&manager));
        assert!(!published_only(&super_admin));
    }
}
