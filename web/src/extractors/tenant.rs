use crate::Error;
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use domain::{auth::Session, error::Error as DomainError, Id};

/// The organization the request acts within. Rejects with 403 when the
/// caller has no active organization.
pub(crate) struct Tenant(pub Id);

#[async_trait]
impl<S> FromRequestParts<S> for Tenant
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or_else(DomainError::unauthenticated)?;
        Ok(Tenant(session.require_organization()?))
    }
}
