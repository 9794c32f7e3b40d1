use sea_orm::{ActiveEnum, Order, Value};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use super::sort::SortOrder;
use super::{nullable, WithSortDefaults};
use domain::{
    customer_status::CustomerStatus, customers, IntoQueryFilterMap, IntoUpdateMap,
    QueryFilterMap, QuerySort, UpdateMap,
};

/// Sortable fields for customers
#[derive(Debug, Deserialize, ToSchema)]
#[schema(example = "name")]
pub(crate) enum SortField {
    #[serde(rename = "name")]
    Name,
    #[serde(rename = "company")]
    Company,
    #[serde(rename = "created_at")]
    CreatedAt,
    #[serde(rename = "updated_at")]
    UpdatedAt,
}

#[derive(Debug, Deserialize, IntoParams)]
pub(crate) struct IndexParams {
    pub(crate) status: Option<CustomerStatus>,
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
        query_filter_map
    }
}

impl QuerySort<customers::Column> for IndexParams {
    fn get_sort_column(&self) -> Option<customers::Column> {
        self.sort_by.as_ref().map(|field| match field {
            SortField::Name => customers::Column::Name,
            SortField::Company => customers::Column::Company,
            SortField::CreatedAt => customers::Column::CreatedAt,
            SortField::UpdatedAt => customers::Column::UpdatedAt,
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
    pub email: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub company: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub external_ref: Option<Option<String>>,
    pub status: Option<CustomerStatus>,
}

impl IntoUpdateMap for UpdateParams {
    fn into_update_map(self) -> UpdateMap {
        let mut update_map = UpdateMap::new();
        update_map.insert(
            "name".to_string(),
            self.name.map(|name| Value::String(Some(Box::new(name)))),
        );
        for (column, value) in [
            ("email", self.email),
            ("phone", self.phone),
            ("company", self.company),
            ("external_ref", self.external_ref),
        ] {
            update_map.insert(
                column.to_string(),
                value.map(|value| Value::String(value.map(Box::new))),
            );
        }
        update_map.insert(
            "status".to_string(),
            self.status
                .map(|status| Value::String(Some(Box::new(status.to_value())))),
        );
        update_map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_named_fields_are_updated() {
        let params: UpdateParams =
            serde_json::from_str(r#"{"status": "churned", "phone": null}"#).unwrap();
        let update_map = params.into_update_map();

        assert_eq!(
            update_map.get("status"),
            Some(&Value::String(Some(Box::new("churned".to_string()))))
        );
        assert_eq!(update_map.get("phone"), Some(&Value::String(None)));
        assert!(!update_map.contains_key("name"));
        assert!(!update_map.contains_key("email"));
    }

    #[test]
    fn unknown_statuses_are_rejected() {
        assert!(serde_json::from_str::<IndexParams>(r#"{"status": "vip"}"#).is_err());
    }
}
