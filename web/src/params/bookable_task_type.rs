use sea_orm::{Order, Value};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use super::sort::SortOrder;
use super::{nullable, WithSortDefaults};
use domain::{
    bookable_task_types, IntoQueryFilterMap, IntoUpdateMap, QueryFilterMap, QuerySort,
    UpdateMap,
};

/// Sortable fields for bookable task types
#[derive(Debug, Deserialize, ToSchema)]
#[schema(example = "name")]
pub(crate) enum SortField {
    #[serde(rename = "name")]
    Name,
    #[serde(rename = "duration_minutes")]
    DurationMinutes,
    #[serde(rename = "created_at")]
    CreatedAt,
}

#[derive(Debug, Deserialize, IntoParams)]
pub(crate) struct IndexParams {
    pub(crate) active: Option<bool>,
    pub(crate) sort_by: Option<SortField>,
    pub(crate) sort_order: Option<SortOrder>,
}

impl IntoQueryFilterMap for IndexParams {
    fn into_query_filter_map(self) -> QueryFilterMap {
        let mut query_filter_map = QueryFilterMap::new();
        query_filter_map.insert(
            "active".to_string(),
            self.active.map(|active| Value::Bool(Some(active))),
        );
        query_filter_map
    }
}

impl QuerySort<bookable_task_types::Column> for IndexParams {
    fn get_sort_column(&self) -> Option<bookable_task_types::Column> {
        self.sort_by.as_ref().map(|field| match field {
            SortField::Name => bookable_task_types::Column::Name,
            SortField::DurationMinutes => bookable_task_types::Column::DurationMinutes,
            SortField::CreatedAt => bookable_task_types::Column::CreatedAt,
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
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    pub duration_minutes: Option<i32>,
    pub buffer_minutes: Option<i32>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub color: Option<Option<String>>,
    pub active: Option<bool>,
}

impl IntoUpdateMap for UpdateParams {
    fn into_update_map(self) -> UpdateMap {
        let mut update_map = UpdateMap::new();
        update_map.insert(
            "name".to_string(),
            self.name.map(|name| Value::String(Some(Box::new(name)))),
        );
        update_map.insert(
            "description".to_string(),
            self.description
                .map(|description| Value::String(description.map(Box::new))),
        );
        update_map.insert(
            "duration_minutes".to_string(),
            self.duration_minutes.map(|minutes| Value::Int(Some(minutes))),
        );
        update_map.insert(
            "buffer_minutes".to_string(),
            self.buffer_minutes.map(|minutes| Value::Int(Some(minutes))),
        );
        update_map.insert(
            "color".to_string(),
            self.color.map(|color| Value::String(color.map(Box::new))),
        );
        update_map.insert(
            "active".to_string(),
            self.active.map(|active| Value::Bool(Some(active))),
        );
        update_map
    }
}
