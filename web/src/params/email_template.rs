use sea_orm::{Order, Value};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use super::sort::SortOrder;
use super::{nullable, WithSortDefaults};
use domain::{
    email_templates, IntoQueryFilterMap, IntoUpdateMap, QueryFilterMap, QuerySort, UpdateMap,
};

/// Sortable fields for email templates
#[derive(Debug, Deserialize, ToSchema)]
#[schema(example = "name")]
pub(crate) enum SortField {
    #[serde(rename = "name")]
    Name,
    #[serde(rename = "created_at")]
    CreatedAt,
    #[serde(rename = "updated_at")]
    UpdatedAt,
}

#[derive(Debug, Deserialize, IntoParams)]
pub(crate) struct IndexParams {
    pub(crate) sort_by: Option<SortField>,
    pub(crate) sort_order: Option<SortOrder>,
}

impl IntoQueryFilterMap for IndexParams {
    fn into_query_filter_map(self) -> QueryFilterMap {
        QueryFilterMap::new()
    }
}

impl QuerySort<email_templates::Column> for IndexParams {
    fn get_sort_column(&self) -> Option<email_templates::Column> {
        self.sort_by.as_ref().map(|field| match field {
            SortField::Name => email_templates::Column::Name,
            SortField::CreatedAt => email_templates::Column::CreatedAt,
            SortField::UpdatedAt => email_templates::Column::UpdatedAt,
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
    pub subject: Option<String>,
    pub html_body: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub text_body: Option<Option<String>>,
}

impl IntoUpdateMap for UpdateParams {
    fn into_update_map(self) -> UpdateMap {
        let mut update_map = UpdateMap::new();
        for (column, value) in [
            ("name", self.name),
            ("subject", self.subject),
            ("html_body", self.html_body),
        ] {
            update_map.insert(
                column.to_string(),
                value.map(|value| Value::String(Some(Box::new(value)))),
            );
        }
        update_map.insert(
            "text_body".to_string(),
            self.text_body
                .map(|text_body| Value::String(text_body.map(Box::new))),
        );
        update_map
    }
}

/// Body of `POST /api/email/templates/:id/render`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RenderParams {
    #[serde(default = "empty_object")]
    #[schema(value_type = Object)]
    pub variables: serde_json::Value,
}

fn empty_object() -> serde_json::Value {
    serde_json::Value::Object(Default::default())
}
