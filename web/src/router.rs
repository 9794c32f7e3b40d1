use crate::{
    controller::health_check_controller, error::error_response, middleware::auth::require_auth,
    params, protect, AppState,
};
use axum::{
    http::StatusCode,
    middleware::{from_fn, from_fn_with_state},
    response::IntoResponse,
    routing::{delete, get, patch, post, put},
    Router,
};

use crate::controller::{
    auth_controller, bookable_task_type_controller, customer_controller,
    data_explorer_controller, email_template_controller, integration_controller,
    kb_article_controller, key_result_controller, objective_controller, organization_controller,
    team_controller, ticket_controller, user_controller,
};

use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_rapidoc::RapiDoc;

// This is the global definition of our OpenAPI spec. To be a part
// of the rendered spec, a path and schema must be listed here.
#[derive(OpenApi)]
#[openapi(
        info(
            title = "BizOps Platform API"
        ),
        paths(
            auth_controller::login,
            auth_controller::me,
            health_check_controller::health_check,
            organization_controller::index,
            organization_controller::read,
            organization_controller::create,
            organization_controller::update,
            organization_controller::delete,
            user_controller::index,
            user_controller::read,
            user_controller::create,
            user_controller::update,
            user_controller::delete,
            user_controller::update_password,
            user_controller::update_role,
            team_controller::index,
            team_controller::read,
            team_controller::create,
            team_controller::update,
            team_controller::delete,
            team_controller::members,
            team_controller::add_member,
            team_controller::remove_member,
            customer_controller::index,
            customer_controller::read,
            customer_controller::create,
            customer_controller::update,
            customer_controller::delete,
            ticket_controller::index,
            ticket_controller::read,
            ticket_controller::create,
            ticket_controller::update,
            ticket_controller::delete,
            ticket_controller::comments,
            ticket_controller::add_comment,
            objective_controller::index,
            objective_controller::read,
            objective_controller::create,
            objective_controller::update,
            objective_controller::delete,
            objective_controller::key_results_index,
            objective_controller::create_key_result,
            key_result_controller::update,
            key_result_controller::check_in,
            key_result_controller::delete,
            kb_article_controller::index,
            kb_article_controller::read,
            kb_article_controller::create,
            kb_article_controller::update,
            kb_article_controller::delete,
            email_template_controller::index,
            email_template_controller::read,
            email_template_controller::create,
            email_template_controller::update,
            email_template_controller::delete,
            email_template_controller::render,
            bookable_task_type_controller::index,
            bookable_task_type_controller::read,
            bookable_task_type_controller::create,
            bookable_task_type_controller::update,
            bookable_task_type_controller::delete,
            integration_controller::index,
            integration_controller::read,
            integration_controller::upsert,
            integration_controller::delete,
            data_explorer_controller::tables,
            data_explorer_controller::describe,
            data_explorer_controller::query,
        ),
        components(
            schemas(
                domain::organizations::Model,
                domain::users::Model,
                domain::user_roles::Model,
                domain::teams::Model,
                domain::team_members::Model,
                domain::customers::Model,
                domain::tickets::Model,
                domain::ticket_comments::Model,
                domain::objectives::Model,
                domain::key_results::Model,
                domain::kb_articles::Model,
                domain::email_templates::Model,
                domain::bookable_task_types::Model,
                domain::objective::ObjectiveWithKeyResults,
                domain::objective::KeyResultWithProgress,
                domain::email_template::RenderedEmail,
                domain::integration::IntegrationSettings,
                domain::integration::IntegrationStatus,
                domain::data_explorer::TableDescription,
                domain::data_explorer::FieldDescription,
                domain::data_explorer::QueryRequest,
                domain::data_explorer::FilterRequest,
                domain::data_explorer::QueryResult,
                auth_controller::LoginParams,
                auth_controller::LoginResponse,
                auth_controller::SessionResponse,
                params::organization::UpdateParams,
                params::user::CreateParams,
                params::user::UpdateParams,
                params::user::UpdatePasswordParams,
                params::user::RoleParams,
                params::team::UpdateParams,
                params::team::AddMemberParams,
                params::customer::UpdateParams,
                params::ticket::UpdateParams,
                params::objective::UpdateParams,
                params::objective::UpdateKeyResultParams,
                params::objective::CheckInParams,
                params::kb_article::UpdateParams,
                params::email_template::UpdateParams,
                params::email_template::RenderParams,
                params::bookable_task_type::UpdateParams,
            )
        ),
        modifiers(&SecurityAddon),
        tags(
            (name = "bizops_platform", description = "Multi-tenant business operations API")
        )
    )]
struct ApiDoc;

struct SecurityAddon;

// Every /api route except login expects `Authorization: Bearer <jwt>`.
impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Token returned by POST /api/auth/login"))
                        .build(),
                ),
            )
        }
    }
}

pub fn define_routes(app_state: AppState) -> Router {
    Router::new()
        .merge(health_routes())
        .merge(auth_routes(app_state.clone()))
        .merge(organization_routes(app_state.clone()))
        .merge(user_routes(app_state.clone()))
        .merge(team_routes(app_state.clone()))
        .merge(customer_routes(app_state.clone()))
        .merge(ticket_routes(app_state.clone()))
        .merge(objective_routes(app_state.clone()))
        .merge(kb_article_routes(app_state.clone()))
        .merge(email_template_routes(app_state.clone()))
        .merge(bookable_task_type_routes(app_state.clone()))
        .merge(integration_routes(app_state.clone()))
        .merge(data_explorer_routes(app_state))
        .merge(RapiDoc::with_openapi("/api-docs/openapi.json", ApiDoc::openapi()).path("/rapidoc"))
        .fallback(not_found)
}

async fn not_found() -> impl IntoResponse {
    error_response(StatusCode::NOT_FOUND, None)
}

fn health_routes() -> Router {
    Router::new().route("/health", get(health_check_controller::health_check))
}

fn auth_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/api/auth/me", get(auth_controller::me))
        .route_layer(from_fn_with_state(app_state.clone(), require_auth))
        // POST /api/auth/login
        .route("/api/auth/login", post(auth_controller::login))
        .with_state(app_state)
}

fn organization_routes(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/api/core/organizations",
            get(organization_controller::index),
        )
        .merge(
            // GET /api/core/organizations/:id
            Router::new()
                .route(
                    "/api/core/organizations/:id",
                    get(organization_controller::read),
                )
                .route_layer(from_fn(protect::organizations::read)),
        )
        .merge(
            // PATCH /api/core/organizations/:id
            Router::new()
                .route(
                    "/api/core/organizations/:id",
                    patch(organization_controller::update),
                )
                .route_layer(from_fn(protect::organizations::update)),
        )
        .merge(
            // POST /api/core/organizations, DELETE /api/core/organizations/:id
            Router::new()
                .route(
                    "/api/core/organizations",
                    post(organization_controller::create),
                )
                .route(
                    "/api/core/organizations/:id",
                    delete(organization_controller::delete),
                )
                .route_layer(from_fn(protect::super_admin)),
        )
        .route_layer(from_fn_with_state(app_state.clone(), require_auth))
        .with_state(app_state)
}

fn user_routes(app_state: AppState) -> Router {
    Router::new()
        .merge(
            Router::new()
                .route("/api/core/users", get(user_controller::index))
                .route("/api/core/users/:id", get(user_controller::read))
                .route_layer(from_fn(protect::team_member)),
        )
        .merge(
            Router::new()
                .route("/api/core/users", post(user_controller::create))
                .route("/api/core/users/:id/role", put(user_controller::update_role))
                .route_layer(from_fn(protect::admin)),
        )
        .merge(
            // PATCH /api/core/users/:id
            Router::new()
                .route("/api/core/users/:id", patch(user_controller::update))
                .route_layer(from_fn(protect::users::update)),
        )
        .merge(
            // DELETE /api/core/users/:id
            Router::new()
                .route("/api/core/users/:id", delete(user_controller::delete))
                .route_layer(from_fn(protect::users::remove)),
        )
        .merge(
            // PUT /api/core/users/:id/password
            Router::new()
                .route(
                    "/api/core/users/:id/password",
                    put(user_controller::update_password),
                )
                .route_layer(from_fn(protect::users::password)),
        )
        .route_layer(from_fn_with_state(app_state.clone(), require_auth))
        .with_state(app_state)
}

fn team_routes(app_state: AppState) -> Router {
    Router::new()
        .merge(
            Router::new()
                .route("/api/core/teams", get(team_controller::index))
                .route("/api/core/teams/:id", get(team_controller::read))
                .route("/api/core/teams/:id/members", get(team_controller::members))
                .route_layer(from_fn(protect::team_member)),
        )
        .merge(
            Router::new()
                .route("/api/core/teams", post(team_controller::create))
                .route(
                    "/api/core/teams/:id",
                    patch(team_controller::update).delete(team_controller::delete),
                )
                .route(
                    "/api/core/teams/:id/members",
                    post(team_controller::add_member),
                )
                .route(
                    "/api/core/teams/:id/members/:user_id",
                    delete(team_controller::remove_member),
                )
                .route_layer(from_fn(protect::manager)),
        )
        .route_layer(from_fn_with_state(app_state.clone(), require_auth))
        .with_state(app_state)
}

fn customer_routes(app_state: AppState) -> Router {
    Router::new()
        .merge(
            Router::new()
                .route(
                    "/api/crm/customers",
                    get(customer_controller::index).post(customer_controller::create),
                )
                .route(
                    "/api/crm/customers/:id",
                    get(customer_controller::read).patch(customer_controller::update),
                )
                .route_layer(from_fn(protect::team_member)),
        )
        .merge(
            // DELETE /api/crm/customers/:id
            Router::new()
                .route(
                    "/api/crm/customers/:id",
                    delete(customer_controller::delete),
                )
                .route_layer(from_fn(protect::manager)),
        )
        .route_layer(from_fn_with_state(app_state.clone(), require_auth))
        .with_state(app_state)
}

fn ticket_routes(app_state: AppState) -> Router {
    Router::new()
        .merge(
            Router::new()
                .route(
                    "/api/crm/tickets",
                    get(ticket_controller::index).post(ticket_controller::create),
                )
                .route(
                    "/api/crm/tickets/:id",
                    get(ticket_controller::read).patch(ticket_controller::update),
                )
                .route(
                    "/api/crm/tickets/:id/comments",
                    get(ticket_controller::comments).post(ticket_controller::add_comment),
                )
                .route_layer(from_fn(protect::team_member)),
        )
        .merge(
            // DELETE /api/crm/tickets/:id
            Router::new()
                .route("/api/crm/tickets/:id", delete(ticket_controller::delete))
                .route_layer(from_fn(protect::manager)),
        )
        .route_layer(from_fn_with_state(app_state.clone(), require_auth))
        .with_state(app_state)
}

fn objective_routes(app_state: AppState) -> Router {
    Router::new()
        .merge(
            Router::new()
                .route("/api/strategy/objectives", get(objective_controller::index))
                .route(
                    "/api/strategy/objectives/:id",
                    get(objective_controller::read),
                )
                .route(
                    "/api/strategy/objectives/:id/key-results",
                    get(objective_controller::key_results_index),
                )
                .route(
                    "/api/strategy/key-results/:id/check-in",
                    put(key_result_controller::check_in),
                )
                .route_layer(from_fn(protect::team_member)),
        )
        .merge(
            Router::new()
                .route(
                    "/api/strategy/objectives",
                    post(objective_controller::create),
                )
                .route(
                    "/api/strategy/objectives/:id",
                    patch(objective_controller::update).delete(objective_controller::delete),
                )
                .route(
                    "/api/strategy/objectives/:id/key-results",
                    post(objective_controller::create_key_result),
                )
                .route(
                    "/api/strategy/key-results/:id",
                    patch(key_result_controller::update).delete(key_result_controller::delete),
                )
                .route_layer(from_fn(protect::manager)),
        )
        .route_layer(from_fn_with_state(app_state.clone(), require_auth))
        .with_state(app_state)
}

fn kb_article_routes(app_state: AppState) -> Router {
    Router::new()
        .merge(
            Router::new()
                .route("/api/kb/articles", get(kb_article_controller::index))
                .route("/api/kb/articles/:id", get(kb_article_controller::read))
                .route_layer(from_fn(protect::team_member)),
        )
        .merge(
            Router::new()
                .route("/api/kb/articles", post(kb_article_controller::create))
                .route(
                    "/api/kb/articles/:id",
                    patch(kb_article_controller::update),
                )
                .route_layer(from_fn(protect::manager)),
        )
        .merge(
            // DELETE /api/kb/articles/:id
            Router::new()
                .route(
                    "/api/kb/articles/:id",
                    delete(kb_article_controller::delete),
                )
                .route_layer(from_fn(protect::admin)),
        )
        .route_layer(from_fn_with_state(app_state.clone(), require_auth))
        .with_state(app_state)
}

fn email_template_routes(app_state: AppState) -> Router {
    Router::new()
        .merge(
            Router::new()
                .route("/api/email/templates", get(email_template_controller::index))
                .route(
                    "/api/email/templates/:id",
                    get(email_template_controller::read),
                )
                .route(
                    "/api/email/templates/:id/render",
                    post(email_template_controller::render),
                )
                .route_layer(from_fn(protect::team_member)),
        )
        .merge(
            Router::new()
                .route(
                    "/api/email/templates",
                    post(email_template_controller::create),
                )
                .route(
                    "/api/email/templates/:id",
                    patch(email_template_controller::update)
                        .delete(email_template_controller::delete),
                )
                .route_layer(from_fn(protect::admin)),
        )
        .route_layer(from_fn_with_state(app_state.clone(), require_auth))
        .with_state(app_state)
}

fn bookable_task_type_routes(app_state: AppState) -> Router {
    Router::new()
        .merge(
            Router::new()
                .route(
                    "/api/bookings/bookable-task-types",
                    get(bookable_task_type_controller::index),
                )
                .route(
                    "/api/bookings/bookable-task-types/:id",
                    get(bookable_task_type_controller::read),
                )
                .route_layer(from_fn(protect::team_member)),
        )
        .merge(
            Router::new()
                .route(
                    "/api/bookings/bookable-task-types",
                    post(bookable_task_type_controller::create),
                )
                .route(
                    "/api/bookings/bookable-task-types/:id",
                    patch(bookable_task_type_controller::update)
                        .delete(bookable_task_type_controller::delete),
                )
                .route_layer(from_fn(protect::manager)),
        )
        .route_layer(from_fn_with_state(app_state.clone(), require_auth))
        .with_state(app_state)
}

fn integration_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/api/integrations", get(integration_controller::index))
        .route(
            "/api/integrations/:provider",
            get(integration_controller::read)
                .put(integration_controller::upsert)
                .delete(integration_controller::delete),
        )
        .route_layer(from_fn(protect::admin))
        .route_layer(from_fn_with_state(app_state.clone(), require_auth))
        .with_state(app_state)
}

fn data_explorer_routes(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/api/data-explorer/tables",
            get(data_explorer_controller::tables),
        )
        .route(
            "/api/data-explorer/tables/:table",
            get(data_explorer_controller::describe),
        )
        .route(
            "/api/data-explorer/tables/:table/query",
            post(data_explorer_controller::query),
        )
        .route_layer(from_fn(protect::admin))
        .route_layer(from_fn_with_state(app_state.clone(), require_auth))
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_every_area() {
        let openapi = ApiDoc::openapi();

        for path in [
            "/api/auth/login",
            "/api/core/organizations/{id}",
            "/api/core/teams/{id}/members/{user_id}",
            "/api/crm/tickets/{id}/comments",
            "/api/strategy/key-results/{id}/check-in",
            "/api/kb/articles",
            "/api/email/templates/{id}/render",
            "/api/bookings/bookable-task-types",
            "/api/integrations/{provider}",
            "/api/data-explorer/tables/{table}/query",
        ] {
            assert!(openapi.paths.paths.contains_key(path), "missing {path}");
        }

        let components = openapi.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}

#[cfg(test)]
#[cfg(feature = "mock")]
mod mock_tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header::AUTHORIZATION, Method, Request},
    };
    use chrono::Utc;
    use domain::{customers, jwt, roles::Role, user_roles, users, Id};
    use sea_orm::{DatabaseBackend, MockDatabase};
    use serde_json::Value;
    use service::config::{ApiVersion, Config};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn config() -> Config {
        Config::from_env().set_jwt_signing_key("router-test-key".to_string())
    }

    fn app(config: Config, db: MockDatabase) -> Router {
        define_routes(AppState::new(config, &Arc::new(db.into_connection())))
    }

    fn user_row(
        organization_id: Id,
        role: Role,
    ) -> (users::Model, Option<user_roles::Model>) {
        let now = Utc::now();
        let user_id = Id::new_v4();
        (
            users::Model {
                id: user_id,
                email: "jordan@northwind.dev".to_string(),
                first_name: "Jordan".to_string(),
                last_name: "Reyes".to_string(),
                display_name: None,
                password: String::new(),
                timezone: "UTC".to_string(),
                created_at: now.into(),
                updated_at: now.into(),
                roles: vec![],
            },
            Some(user_roles::Model {
                id: Id::new_v4(),
                user_id,
                organization_id: Some(organization_id),
                role,
                created_at: now.into(),
                updated_at: now.into(),
            }),
        )
    }

    fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(ApiVersion::field_name(), ApiVersion::default_version());
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_is_public() {
        let app = app(config(), MockDatabase::new(DatabaseBackend::Postgres));

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn api_routes_require_a_bearer_token() {
        let app = app(config(), MockDatabase::new(DatabaseBackend::Postgres));

        let response = app
            .oneshot(request(Method::GET, "/api/crm/tickets", None, None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = json_body(response).await;
        assert_eq!(body["status_code"], 401);
        assert_eq!(body["error"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn unsupported_api_versions_are_rejected() {
        let config = config();
        let organization_id = Id::new_v4();
        let row = user_row(organization_id, Role::TeamMember);
        let jwt = jwt::issue(&config, row.0.id, Some(organization_id)).unwrap();
        let app = app(
            config,
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([vec![row]]),
        );

        let mut request = request(Method::GET, "/api/auth/me", Some(&jwt.token), None);
        request
            .headers_mut()
            .insert(ApiVersion::field_name(), "0.9.0".parse().unwrap());
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn team_members_cannot_create_teams() {
        let config = config();
        let organization_id = Id::new_v4();
        let row = user_row(organization_id, Role::TeamMember);
        let jwt = jwt::issue(&config, row.0.id, Some(organization_id)).unwrap();
        let app = app(
            config,
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([vec![row]]),
        );

        let response = app
            .oneshot(request(
                Method::POST,
                "/api/core/teams",
                Some(&jwt.token),
                Some(serde_json::json!({"name": "Support"})),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn managers_cannot_reach_the_data_explorer() {
        let config = config();
        let organization_id = Id::new_v4();
        let row = user_row(organization_id, Role::Manager);
        let jwt = jwt::issue(&config, row.0.id, Some(organization_id)).unwrap();
        let app = app(
            config,
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([vec![row]]),
        );

        let response = app
            .oneshot(request(
                Method::GET,
                "/api/data-explorer/tables",
                Some(&jwt.token),
                None,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn admins_list_explorable_tables() {
        let config = config();
        let organization_id = Id::new_v4();
        let row = user_row(organization_id, Role::Admin);
        let jwt = jwt::issue(&config, row.0.id, Some(organization_id)).unwrap();
        let app = app(
            config,
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([vec![row]]),
        );

        let response = app
            .oneshot(request(
                Method::GET,
                "/api/data-explorer/tables",
                Some(&jwt.token),
                None,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        let tables = body["data"].as_array().unwrap();
        assert!(tables.iter().any(|table| table["name"] == "tickets"));
    }

    #[tokio::test]
    async fn team_members_list_customers_of_their_organization() {
        let config = config();
        let organization_id = Id::new_v4();
        let row = user_row(organization_id, Role::TeamMember);
        let jwt = jwt::issue(&config, row.0.id, Some(organization_id)).unwrap();
        let now = Utc::now();
        let customer = customers::Model {
            id: Id::new_v4(),
            organization_id,
            name: "Harbor Freight Co".to_string(),
            email: Some("ops@harborfreight.example".to_string()),
            phone: None,
            company: None,
            external_ref: None,
            status: Default::default(),
            created_at: now.into(),
            updated_at: now.into(),
        };
        let app = app(
            config,
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![row]])
                .append_query_results([vec![customer.clone()]]),
        );

        let response = app
            .oneshot(request(
                Method::GET,
                "/api/crm/customers",
                Some(&jwt.token),
                None,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status_code"], 200);
        assert_eq!(body["data"][0]["name"], "Harbor Freight Co");
    }

    #[tokio::test]
    async fn unknown_routes_answer_with_a_json_not_found() {
        let app = app(config(), MockDatabase::new(DatabaseBackend::Postgres));

        let response = app
            .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = json_body(response).await;
        assert_eq!(body["error"], "NOT FOUND");
    }
}
