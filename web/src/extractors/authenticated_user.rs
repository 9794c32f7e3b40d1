use crate::Error;
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use domain::{auth::Session, error::Error as DomainError};
use log::*;

/// The session `require_auth` resolved from the bearer token.
pub(crate) struct AuthenticatedUser(pub Session);

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<Session>() {
            Some(session) => Ok(AuthenticatedUser(session.clone())),
            None => {
                // Only reachable when a route was mounted without require_auth.
                warn!("No session on request to {}", parts.uri.path());
                Err(DomainError::unauthenticated().into())
            }
        }
    }
}
