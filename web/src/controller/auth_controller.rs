use crate::controller::ApiResponse;
use crate::extractors::{
    authenticated_user::AuthenticatedUser, compare_api_version::CompareApiVersion,
};
use crate::{AppState, Error};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domain::{auth as AuthApi, auth::Session, roles::Role, users, Id};
use log::*;
use serde::{Deserialize, Serialize};
use service::config::ApiVersion;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginParams {
    pub email: String,
    pub password: String,
    /// Organization to act within. Defaults to the user's first organization.
    #[schema(value_type = Option<String>, format = Uuid)]
    pub organization_id: Option<Id>,
}

/// The authenticated user and the organization their requests act within.
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    pub user: users::Model,
    #[schema(value_type = Option<String>, format = Uuid)]
    pub organization_id: Option<Id>,
    pub role: Option<Role>,
}

impl From<Session> for SessionResponse {
    fn from(session: Session) -> Self {
        let role = session.role();
        Self {
            user: session.user,
            organization_id: session.organization_id,
            role,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    /// Bearer token for the `Authorization` header.
    pub token: String,
    /// Expiry as seconds since the Unix epoch.
    pub expires_at: i64,
    #[serde(flatten)]
    pub session: SessionResponse,
}

/// POST exchange credentials for a bearer token
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginParams,
    responses(
        (status = 200, description = "Logged in successfully", body = LoginResponse),
        (status = 401, description = "Unknown email or wrong password"),
        (status = 403, description = "Requested organization is not available to the user"),
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    Json(params): Json<LoginParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("POST login");

    let (jwt, session) = AuthApi::login(
        app_state.db_conn_ref(),
        &app_state.config,
        &params.email,
        &params.password,
        params.organization_id,
    )
    .await?;

    Ok(Json(ApiResponse::new(
        StatusCode::OK.into(),
        LoginResponse {
            token: jwt.token,
            expires_at: jwt.expires_at,
            session: session.into(),
        },
    )))
}

/// GET the authenticated user
#[utoipa::path(
    get,
    path = "/api/auth/me",
    params(ApiVersion),
    responses(
        (status = 200, description = "The authenticated user", body = SessionResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn me(
    CompareApiVersion(_v): CompareApiVersion,
    AuthenticatedUser(session): AuthenticatedUser,
) -> Result<impl IntoResponse, Error> {
    Ok(Json(ApiResponse::new(
        StatusCode::OK.into(),
        SessionResponse::from(session),
    )))
}
