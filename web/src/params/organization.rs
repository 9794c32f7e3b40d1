use sea_orm::Value;
use serde::Deserialize;
use utoipa::ToSchema;

use super::nullable;
use domain::{IntoUpdateMap, UpdateMap};

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateParams {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub logo: Option<Option<String>>,
}

impl IntoUpdateMap for UpdateParams {
    fn into_update_map(self) -> UpdateMap {
        let mut update_map = UpdateMap::new();
        update_map.insert(
            "name".to_string(),
            self.name.map(|name| Value::String(Some(Box::new(name)))),
        );
        update_map.insert(
            "logo".to_string(),
            self.logo.map(|logo| Value::String(logo.map(Box::new))),
        );
        update_map
    }
}
