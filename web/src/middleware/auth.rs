use crate::{AppState, Error, X_ORGANIZATION_ID};
use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use domain::{auth as AuthApi, error::Error as DomainError, Id};
use log::*;

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

fn organization_override(headers: &HeaderMap) -> Result<Option<Id>, Error> {
    match headers.get(X_ORGANIZATION_ID) {
        None => Ok(None),
        Some(value) => value
            .to_str()
            .ok()
            .and_then(|value| Id::parse_str(value.trim()).ok())
            .map(Some)
            .ok_or_else(|| {
                DomainError::validation(format!("{X_ORGANIZATION_ID} must be a UUID")).into()
            }),
    }
}

/// Authentication middleware for every protected route.
///
/// Resolves the `Authorization: Bearer` token into a [`domain::auth::Session`]
/// and stores it in the request extensions for the extractors. Requests without
/// a valid token are answered with 401 before reaching a handler.
pub async fn require_auth(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = match bearer_token(request.headers()) {
        Some(token) => token.to_string(),
        None => {
            debug!("Rejecting request to {} without a bearer token", request.uri().path());
            return Error::from(DomainError::unauthenticated()).into_response();
        }
    };

    let organization_id = match organization_override(request.headers()) {
        Ok(organization_id) => organization_id,
        Err(err) => return err.into_response(),
    };

    match AuthApi::authenticate(
        app_state.db_conn_ref(),
        &app_state.config,
        &token,
        organization_id,
    )
    .await
    {
        Ok(session) => {
            trace!("Authenticated user {}", session.user.id);
            request.extensions_mut().insert(session);
            next.run(request).await
        }
        Err(err) => Error::from(err).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn bearer_tokens_are_read_from_the_authorization_header() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwdw=="));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&headers), Some("abc.def.ghi"));
    }

    #[test]
    fn organization_header_must_be_a_uuid() {
        let mut headers = HeaderMap::new();
        assert!(matches!(organization_override(&headers), Ok(None)));

        headers.insert(X_ORGANIZATION_ID, HeaderValue::from_static("acme"));
        assert!(organization_override(&headers).is_err());

        let id = Id::new_v4();
        headers.insert(
            X_ORGANIZATION_ID,
            HeaderValue::from_str(&id.to_string()).unwrap(),
        );
        assert!(matches!(organization_override(&headers), Ok(Some(parsed)) if parsed == id));
    }
}

#[cfg(test)]
#[cfg(feature = "mock")]
mod mock_tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        middleware::from_fn_with_state,
        routing::get,
        Router,
    };
    use chrono::Utc;
    use domain::{jwt, roles::Role, user_roles, users};
    use sea_orm::{DatabaseBackend, MockDatabase};
    use service::config::Config;
    use std::sync::Arc;
    use tower::ServiceExt;

    async fn test_handler() -> &'static str {
        "authenticated"
    }

    fn config() -> Config {
        Config::from_env().set_jwt_signing_key("middleware-test-key".to_string())
    }

    fn app(config: Config, db: MockDatabase) -> Router {
        let app_state = AppState::new(config, &Arc::new(db.into_connection()));
        Router::new()
            .route("/test", get(test_handler))
            .route_layer(from_fn_with_state(app_state.clone(), require_auth))
            .with_state(app_state)
    }

    fn member(organization_id: Id) -> (users::Model, Option<user_roles::Model>) {
        let now = Utc::now();
        let user_id = Id::new_v4();
        (
            users::Model {
                id: user_id,
                email: "agent@northwind.dev".to_string(),
                first_name: "Avery".to_string(),
                last_name: "Stone".to_string(),
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
                role: Role::TeamMember,
                created_at: now.into(),
                updated_at: now.into(),
            }),
        )
    }

    #[tokio::test]
    async fn requests_without_a_token_are_unauthorized() {
        let app = app(config(), MockDatabase::new(DatabaseBackend::Postgres));

        let request = Request::builder().uri("/test").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn tokens_signed_with_another_key_are_unauthorized() {
        let other = Config::from_env().set_jwt_signing_key("someone-elses-key".to_string());
        let jwt = jwt::issue(&other, Id::new_v4(), None).unwrap();
        let app = app(config(), MockDatabase::new(DatabaseBackend::Postgres));

        let request = Request::builder()
            .uri("/test")
            .header(AUTHORIZATION, format!("Bearer {}", jwt.token))
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn valid_tokens_reach_the_handler() {
        let config = config();
        let organization_id = Id::new_v4();
        let row = member(organization_id);
        let jwt = jwt::issue(&config, row.0.id, Some(organization_id)).unwrap();
        let app = app(
            config,
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([vec![row]]),
        );

        let request = Request::builder()
            .uri("/test")
            .header(AUTHORIZATION, format!("Bearer {}", jwt.token))
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
