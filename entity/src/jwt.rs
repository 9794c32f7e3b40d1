use serde::Serialize;
use utoipa::ToSchema;

/// A signed bearer token returned by a successful login.
/// Note: This struct does not have a corresponding entity in the database.
///
/// - `token`: the encoded JWT to send as `Authorization: Bearer <token>`.
/// - `sub`: the authenticated user's id, for convenience.
/// - `expires_at`: unix timestamp after which the token is rejected.
#[derive(Serialize, Debug, ToSchema)]
#[schema(as = jwt::Jwt)]
pub struct Jwt {
    pub token: String,
    pub sub: String,
    pub expires_at: i64,
}
