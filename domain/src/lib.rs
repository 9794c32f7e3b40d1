//! This module re-exports various items from the `entity_api` crate.
//!
//! The purpose of this re-export is to ensure that consumers of the `domain` crate do not need to
//! directly depend on the `entity_api` crate. By re-exporting these items, we provide a clear and
//! consistent interface for working with query filters and partial updates within the domain layer,
//! while the underlying implementation details remain in the `entity_api` crate.
pub use entity_api::{
    mutate::{IntoUpdateMap, UpdateMap},
    query::{IntoQueryFilterMap, QueryFilterMap, QuerySort},
};

// Re-exports from `entity` crate via `entity_api`
pub use entity_api::{
    article_status, bookable_task_types, customer_status, customers, email_templates,
    integrations, kb_articles, key_results, objectives, organizations, provider, roles, status,
    team_members, teams, ticket_comments, ticket_priority, ticket_status, tickets, user_roles,
    users, Id,
};

pub mod auth;
pub mod bookable_task_type;
pub mod customer;
pub mod data_explorer;
pub mod email_template;
pub mod encryption;
pub mod error;
pub mod integration;
pub mod jwt;
pub mod kb_article;
pub mod objective;
pub mod organization;
pub mod team;
pub mod ticket;
pub mod user;

use entity_api::query;
use error::Error;
use sea_orm::strum::IntoEnumIterator;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, Value};

/// Columns a client may never change through a PATCH body.
const IMMUTABLE_COLUMNS: [&str; 3] = ["id", "organization_id", "created_at"];

pub(crate) fn strip_immutable(mut update_map: UpdateMap) -> UpdateMap {
    for column in IMMUTABLE_COLUMNS {
        update_map.remove(column);
    }
    update_map
}

/// Returns the string held by `column` in `update_map`, if any.
pub(crate) fn string_value<'a>(update_map: &'a UpdateMap, column: &str) -> Option<&'a str> {
    match update_map.get(column) {
        Some(Value::String(Some(value))) => Some(value.as_str()),
        _ => None,
    }
}

/// Lists the organization's rows of `E` matching `params`, in the requested order.
pub(crate) async fn find_scoped<E, C, P>(
    db: &DatabaseConnection,
    organization_id: Id,
    params: P,
) -> Result<Vec<E::Model>, Error>
where
    E: EntityTrait<Column = C>,
    C: ColumnTrait + IntoEnumIterator,
    P: IntoQueryFilterMap + QuerySort<C>,
{
    let sort_column = params.get_sort_column();
    let sort_order = params.get_sort_order();
    let query_filter_map = params.into_query_filter_map().scoped_to(organization_id);

    Ok(query::find_by_sorted::<E, C>(db, query_filter_map, sort_column, sort_order).await?)
}

pub(crate) fn uuid_value(update_map: &UpdateMap, column: &str) -> Option<Id> {
    match update_map.get(column) {
        Some(Value::Uuid(Some(id))) => Some(**id),
        _ => None,
    }
}

/// Reports a dangling reference to another record as invalid input rather
/// than as a missing resource.
pub(crate) fn invalid_reference(err: Error, field: &str, id: Id) -> Error {
    if err.error_kind == Error::not_found().error_kind {
        Error::validation(format!("{field} {id} does not exist in this organization"))
    } else {
        err
    }
}

/// Rejects blank values for a required text column.
pub(crate) fn require_text(field: &str, value: &str) -> Result<(), Error> {
    if value.trim().is_empty() {
        return Err(Error::validation(format!("{field} must not be blank")));
    }
    Ok(())
}
