use sea_orm::Value;
use serde::Deserialize;
use utoipa::ToSchema;

use super::nullable;
use domain::{roles::Role, users, IntoUpdateMap, UpdateMap};

/// Body of `POST /api/core/users`: the new user plus their role in the
/// active organization.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateParams {
    #[serde(flatten)]
    pub user: users::Model,
    #[serde(default)]
    pub role: Role,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateParams {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub display_name: Option<Option<String>>,
    pub timezone: Option<String>,
}

impl IntoUpdateMap for UpdateParams {
    fn into_update_map(self) -> UpdateMap {
        let mut update_map = UpdateMap::new();
        for (column, value) in [
            ("email", self.email),
            ("first_name", self.first_name),
            ("last_name", self.last_name),
            ("timezone", self.timezone),
        ] {
            update_map.insert(
                column.to_string(),
                value.map(|value| Value::String(Some(Box::new(value)))),
            );
        }
        update_map.insert(
            "display_name".to_string(),
            self.display_name
                .map(|display_name| Value::String(display_name.map(Box::new))),
        );
        update_map
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdatePasswordParams {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RoleParams {
    pub role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_params_default_to_team_member() {
        let params: CreateParams = serde_json::from_str(
            r#"{"email": "new@northwind.dev", "first_name": "Sam", "last_name": "Ito", "password": "correct horse"}"#,
        )
        .unwrap();

        assert_eq!(params.role, Role::TeamMember);
        assert_eq!(params.user.email, "new@northwind.dev");
        assert_eq!(params.user.timezone, "UTC");
    }

    #[test]
    fn password_is_not_an_updatable_profile_field() {
        let params: UpdateParams =
            serde_json::from_str(r#"{"first_name": "Sam", "password": "hunter22"}"#).unwrap();
        let update_map = params.into_update_map();

        assert!(update_map.contains_key("first_name"));
        assert!(!update_map.contains_key("password"));
    }
}
