use sea_orm::{Order, Value};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use super::sort::SortOrder;
use super::{nullable, WithSortDefaults};
use domain::{teams, Id, IntoQueryFilterMap, IntoUpdateMap, QueryFilterMap, QuerySort, UpdateMap};

/// Sortable fields for teams
#[derive(Debug, Deserialize, ToSchema)]
#[schema(example = "name")]
pub(crate) enum SortField {
    #[serde(rename = "name")]
    Name,
    #[serde(rename = "created_at")]
    CreatedAt,
}

#[derive(Debug, Deserialize, IntoParams)]
pub(crate) struct IndexParams {
    #[param(value_type = Option<String>, format = Uuid)]
    pub(crate) lead_id: Option<Id>,
    pub(crate) sort_by: Option<SortField>,
    pub(crate) sort_order: Option<SortOrder>,
}

impl IntoQueryFilterMap for IndexParams {
    fn into_query_filter_map(self) -> QueryFilterMap {
        let mut query_filter_map = QueryFilterMap::new();
        query_filter_map.insert(
            "lead_id".to_string(),
            self.lead_id.map(|id| Value::Uuid(Some(Box::new(id)))),
        );
        query_filter_map
    }
}

impl QuerySort<teams::Column> for IndexParams {
    fn get_sort_column(&self) -> Option<teams::Column> {
        self.sort_by.as_ref().map(|field| match field {
            SortField::Name => teams::Column::Name,
            SortField::CreatedAt => teams::Column::CreatedAt,
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
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>, format = Uuid)]
    pub lead_id: Option<Option<Id>>,
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
            "lead_id".to_string(),
            self.lead_id.map(|id| Value::Uuid(id.map(Box::new))),
        );
        update_map
    }
}

/// Body of `POST /api/core/teams/:id/members`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AddMemberParams {
    #[schema(value_type = String, format = Uuid)]
    pub user_id: Id,
}
