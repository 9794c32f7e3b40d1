use crate::error::error_response;
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::Response,
};
use log::*;
use service::config::ApiVersion;

/// Requires the `x-version` header to name a supported API version.
pub(crate) struct CompareApiVersion(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for CompareApiVersion
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let requested = parts
            .headers
            .get(ApiVersion::field_name())
            .and_then(|value| value.to_str().ok());

        match requested {
            Some(version) if ApiVersion::is_supported(version) => {
                Ok(CompareApiVersion(version.to_string()))
            }
            Some(version) => {
                debug!("Unsupported API version requested: {version}");
                Err(error_response(
                    StatusCode::BAD_REQUEST,
                    Some(format!(
                        "unsupported API version {version}, expected one of {}",
                        ApiVersion::versions().join(", ")
                    )),
                ))
            }
            None => Err(error_response(
                StatusCode::BAD_REQUEST,
                Some(format!("missing {} header", ApiVersion::field_name())),
            )),
        }
    }
}
