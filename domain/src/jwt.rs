//! Bearer tokens for API authentication.
//!
//! Tokens are HS256 JWTs signed with the configured `jwt_signing_key`. The
//! claims name the user (`sub`) and, optionally, the organization the caller
//! acts within (`org`).

use crate::error::Error;
use crate::Id;
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use log::*;
use serde::{Deserialize, Serialize};
use service::config::Config;

// re-export the Jwt struct from the entity module
pub use entity_api::jwt::Jwt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Id,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org: Option<Id>,
    pub iat: i64,
    pub exp: i64,
}

fn signing_key(config: &Config) -> Result<String, Error> {
    config.jwt_signing_key().ok_or_else(|| {
        warn!("No JWT signing key configured");
        Error::config()
    })
}

/// Issues a token for `user_id` acting within `organization_id`.
pub fn issue(config: &Config, user_id: Id, organization_id: Option<Id>) -> Result<Jwt, Error> {
    let key = signing_key(config)?;
    let iat = Utc::now().timestamp();
    let exp = iat + config.jwt_expiry_seconds as i64;

    let claims = Claims {
        sub: user_id,
        org: organization_id,
        iat,
        exp,
    };

    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(key.as_bytes()),
    )?;

    Ok(Jwt {
        token,
        sub: user_id.to_string(),
        expires_at: exp,
    })
}

/// Checks the signature and expiry of `token` and returns its claims.
pub fn verify(config: &Config, token: &str) -> Result<Claims, Error> {
    let key = signing_key(config)?;
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_required_spec_claims(&["exp", "sub"]);

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(key.as_bytes()),
        &validation,
    )?;
    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DomainErrorKind, EntityErrorKind, InternalErrorKind};

    fn config() -> Config {
        Config::from_env().set_jwt_signing_key("test-signing-key".to_string())
    }

    #[test]
    fn issued_tokens_verify() {
        let config = config();
        let user_id = Id::new_v4();
        let organization_id = Id::new_v4();

        let jwt = issue(&config, user_id, Some(organization_id)).unwrap();
        let claims = verify(&config, &jwt.token).unwrap();

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.org, Some(organization_id));
        assert_eq!(claims.exp, jwt.expires_at);
        assert_eq!(jwt.sub, user_id.to_string());
    }

    #[test]
    fn tokens_signed_with_another_key_are_unauthenticated() {
        let jwt = issue(
            &Config::from_env().set_jwt_signing_key("other-key".to_string()),
            Id::new_v4(),
            None,
        )
        .unwrap();

        let err = verify(&config(), &jwt.token).unwrap_err();
        assert_eq!(
            err.error_kind,
            DomainErrorKind::Internal(InternalErrorKind::Entity(EntityErrorKind::Unauthenticated))
        );
    }

    #[test]
    fn expired_tokens_are_rejected() {
        let config = config();
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: Id::new_v4(),
            org: None,
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"test-signing-key"),
        )
        .unwrap();

        assert!(verify(&config, &token).is_err());
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(verify(&config(), "not.a.token").is_err());
    }
}
