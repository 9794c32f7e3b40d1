use sea_orm::{ActiveEnum, Order, Value};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use super::sort::SortOrder;
use super::{nullable, WithSortDefaults};
use domain::{
    article_status::ArticleStatus, kb_articles, IntoQueryFilterMap, IntoUpdateMap,
    QueryFilterMap, QuerySort, UpdateMap,
};

/// Sortable fields for knowledge base articles
#[derive(Debug, Deserialize, ToSchema)]
#[schema(example = "title")]
pub(crate) enum SortField {
    #[serde(rename = "title")]
    Title,
    #[serde(rename = "published_at")]
    PublishedAt,
    #[serde(rename = "created_at")]
    CreatedAt,
    #[serde(rename = "updated_at")]
    UpdatedAt,
}

#[derive(Debug, Deserialize, IntoParams)]
pub(crate) struct IndexParams {
    pub(crate) status: Option<ArticleStatus>,
    pub(crate) category: Option<String>,
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
            "category".to_string(),
            self.category
                .map(|category| Value::String(Some(Box::new(category)))),
        );
        query_filter_map
    }
}

impl QuerySort<kb_articles::Column> for IndexParams {
    fn get_sort_column(&self) -> Option<kb_articles::Column> {
        self.sort_by.as_ref().map(|field| match field {
            SortField::Title => kb_articles::Column::Title,
            SortField::PublishedAt => kb_articles::Column::PublishedAt,
            SortField::CreatedAt => kb_articles::Column::CreatedAt,
            SortField::UpdatedAt => kb_articles::Column::UpdatedAt,
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
    pub slug: Option<String>,
    pub body: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub category: Option<Option<String>>,
    pub status: Option<ArticleStatus>,
}

impl IntoUpdateMap for UpdateParams {
    fn into_update_map(self) -> UpdateMap {
        let mut update_map = UpdateMap::new();
        for (column, value) in [
            ("title", self.title),
            ("slug", self.slug),
            ("body", self.body),
        ] {
            update_map.insert(
                column.to_string(),
                value.map(|value| Value::String(Some(Box::new(value)))),
            );
        }
        update_map.insert(
            "category".to_string(),
            self.category
                .map(|category| Value::String(category.map(Box::new))),
        );
        update_map.insert(
            "status".to_string(),
            self.status
                .map(|status| Value::String(Some(Box::new(status.to_value())))),
        );
        update_map
    }
}
