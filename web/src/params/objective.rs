use sea_orm::{ActiveEnum, Order, Value};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use super::sort::SortOrder;
use super::{nullable, WithSortDefaults};
use domain::{
    objectives, status::Status, Id, IntoQueryFilterMap, IntoUpdateMap, QueryFilterMap,
    QuerySort, UpdateMap,
};

/// Sortable fields for objectives
#[derive(Debug, Deserialize, ToSchema)]
#[schema(example = "created_at")]
pub(crate) enum SortField {
    #[serde(rename = "title")]
    Title,
    #[serde(rename = "period")]
    Period,
    #[serde(rename = "created_at")]
    CreatedAt,
    #[serde(rename = "updated_at")]
    UpdatedAt,
}

#[derive(Debug, Deserialize, IntoParams)]
pub(crate) struct IndexParams {
    pub(crate) status: Option<Status>,
    pub(crate) period: Option<String>,
    #[param(value_type = Option<String>, format = Uuid)]
    pub(crate) owner_id: Option<Id>,
    #[param(value_type = Option<String>, format = Uuid)]
    pub(crate) team_id: Option<Id>,
    pub(crate) sort_by: Option<SortField>,
    pub(crate) sort_order: Option<SortOrder>,
}

impl IntoQueryFilterMap for IndexParams {
    fn into_query_filter_map(self) -> QueryFilterMap {
        let mut query_filter_map = QueryFilterMap::new();
        query_filter_map.insert(
            "status".to_string(),
            self.status
                .map(|status| Value::String(Some(Box::new(status.to_value())))),
        );
        query_filter_map.insert(
            "period".to_string(),
            self.period.map(|period| Value::String(Some(Box::new(period)))),
        );
        query_filter_map.insert(
            "owner_id".to_string(),
            self.owner_id.map(|id| Value::Uuid(Some(Box::new(id)))),
        );
        query_filter_map.insert(
            "team_id".to_string(),
            self.team_id.map(|id| Value::Uuid(Some(Box::new(id)))),
        );
        query_filter_map
    }
}

impl QuerySort<objectives::Column> for IndexParams {
    fn get_sort_column(&self) -> Option<objectives::Column> {
        self.sort_by.as_ref().map(|field| match field {
            SortField::Title => objectives::Column::Title,
            SortField::Period => objectives::Column::Period,
            SortField::CreatedAt => objectives::Column::CreatedAt,
            SortField::UpdatedAt => objectives::Column::UpdatedAt,
        })
    }

    fn get_sort_order(&self) -> Option<Order> {
        self.sort_order.as_ref().map(Order::from)
    }
}

impl WithSortDefaults for IndexParams {
    type SortField = SortField;
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateParams {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    pub period: Option<String>,
    pub status: Option<Status>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>, format = Uuid)]
    pub owner_id: Option<Option<Id>>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>, format = Uuid)]
    pub team_id: Option<Option<Id>>,
}

impl IntoUpdateMap for UpdateParams {
    fn into_update_map(self) -> UpdateMap {
        let mut update_map = UpdateMap::new();
        update_map.insert(
            "title".to_string(),
            self.title.map(|title| Value::String(Some(Box::new(title)))),
        );
        update_map.insert(
            "description".to_string(),
            self.description
                .map(|description| Value::String(description.map(Box::new))),
        );
        update_map.insert(
            "period".to_string(),
            self.period.map(|period| Value::String(Some(Box::new(period)))),
        );
        update_map.insert(
            "status".to_string(),
            self.status
                .map(|status| Value::String(Some(Box::new(status.to_value())))),
        );
        update_map.insert(
            "owner_id".to_string(),
            self.owner_id.map(|id| Value::Uuid(id.map(Box::new))),
        );
        update_map.insert(
            "team_id".to_string(),
            self.team_id.map(|id| Value::Uuid(id.map(Box::new))),
        );
        update_map
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateKeyResultParams {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub unit: Option<Option<String>>,
    pub start_value: Option<f64>,
    pub target_value: Option<f64>,
    pub current_value: Option<f64>,
    pub status: Option<Status>,
}

impl IntoUpdateMap for UpdateKeyResultParams {
    fn into_update_map(self) -> UpdateMap {
        let mut update_map = UpdateMap::new();
        update_map.insert(
            "title".to_string(),
            self.title.map(|title| Value::String(Some(Box::new(title)))),
        );
        update_map.insert(
            "unit".to_string(),
            self.unit.map(|unit| Value::String(unit.map(Box::new))),
        );
        for (column, value) in [
            ("start_value", self.start_value),
            ("target_value", self.target_value),
            ("current_value", self.current_value),
        ] {
            update_map.insert(column.to_string(), value.map(|value| Value::Double(Some(value))));
        }
        update_map.insert(
            "status".to_string(),
            self.status
                .map(|status| Value::String(Some(Box::new(status.to_value())))),
        );
        update_map
    }
}

/// Body of `PUT /api/strategy/key-results/:id/check-in`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckInParams {
    pub current_value: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_result_values_are_doubles() {
        let params: UpdateKeyResultParams =
            serde_json::from_str(r#"{"target_value": 120, "current_value": 42.5}"#).unwrap();
        let update_map = params.into_update_map();

        assert_eq!(update_map.get("target_value"), Some(&Value::Double(Some(120.0))));
        assert_eq!(update_map.get("current_value"), Some(&Value::Double(Some(42.5))));
        assert!(!update_map.contains_key("start_value"));
    }
}
