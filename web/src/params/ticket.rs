use chrono::{DateTime, FixedOffset};
use sea_orm::{ActiveEnum, Order, Value};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use super::sort::SortOrder;
use super::{nullable, WithSortDefaults};
use domain::{
    ticket_priority::TicketPriority, ticket_status::TicketStatus, tickets, Id,
    IntoQueryFilterMap, IntoUpdateMap, QueryFilterMap, QuerySort, UpdateMap,
};

/// Sortable fields for tickets
#[derive(Debug, Deserialize, ToSchema)]
#[schema(example = "created_at")]
pub(crate) enum SortField {
    #[serde(rename = "created_at")]
    CreatedAt,
    #[serde(rename = "updated_at")]
    UpdatedAt,
    #[serde(rename = "due_at")]
    DueAt,
    #[serde(rename = "title")]
    Title,
}

#[derive(Debug, Deserialize, IntoParams)]
pub(crate) struct IndexParams {
    pub(crate) status: Option<TicketStatus>,
    pub(crate) priority: Option<TicketPriority>,
    #[param(value_type = Option<String>, format = Uuid)]
    pub(crate) assignee_id: Option<Id>,
    #[param(value_type = Option<String>, format = Uuid)]
    pub(crate) customer_id: Option<Id>,
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
            "priority".to_string(),
            self.priority
                .map(|priority| Value::String(Some(Box::new(priority.to_value())))),
        );
        query_filter_map.insert(
            "assignee_id".to_string(),
            self.assignee_id.map(|id| Value::Uuid(Some(Box::new(id)))),
        );
        query_filter_map.insert(
            "customer_id".to_string(),
            self.customer_id.map(|id| Value::Uuid(Some(Box::new(id)))),
        );
        query_filter_map.insert(
            "team_id".to_string(),
            self.team_id.map(|id| Value::Uuid(Some(Box::new(id)))),
        );

        query_filter_map
    }
}

impl QuerySort<tickets::Column> for IndexParams {
    fn get_sort_column(&self) -> Option<tickets::Column> {
        self.sort_by.as_ref().map(|field| match field {
            SortField::CreatedAt => tickets::Column::CreatedAt,
            SortField::UpdatedAt => tickets::Column::UpdatedAt,
            SortField::DueAt => tickets::Column::DueAt,
            SortField::Title => tickets::Column::Title,
        })
    }

    fn get_sort_order(&self) -> Option<Order> {
        self.sort_order.as_ref().map(Order::from)
    }
}

impl WithSortDefaults for IndexParams {
    type SortField = SortField;

    fn default_sort_order() -> SortOrder {
        SortOrder::Desc
    }
}

/// Partial ticket update. Nullable references may be cleared with `null`.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateParams {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    pub status: Option<TicketStatus>,
    pub priority: Option<TicketPriority>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>, format = Uuid)]
    pub customer_id: Option<Option<Id>>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>, format = Uuid)]
    pub team_id: Option<Option<Id>>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>, format = Uuid)]
    pub assignee_id: Option<Option<Id>>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub due_at: Option<Option<DateTime<FixedOffset>>>,
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
            "status".to_string(),
            self.status
                .map(|status| Value::String(Some(Box::new(status.to_value())))),
        );
        update_map.insert(
            "priority".to_string(),
            self.priority
                .map(|priority| Value::String(Some(Box::new(priority.to_value())))),
        );
        update_map.insert(
            "customer_id".to_string(),
            self.customer_id.map(|id| Value::Uuid(id.map(Box::new))),
        );
        update_map.insert(
            "team_id".to_string(),
            self.team_id.map(|id| Value::Uuid(id.map(Box::new))),
        );
        update_map.insert(
            "assignee_id".to_string(),
            self.assignee_id.map(|id| Value::Uuid(id.map(Box::new))),
        );
        update_map.insert(
            "due_at".to_string(),
            self.due_at
                .map(|due_at| Value::ChronoDateTimeWithTimeZone(due_at.map(Box::new))),
        );
        update_map
    }
}
