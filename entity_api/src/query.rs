use crate::error::Error;
use sea_orm::strum::IntoEnumIterator;
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, Order, QueryFilter, QueryOrder, Select, Value,
};
use std::collections::HashMap;

/// `QueryFilterMap` carries equality filters from typed request parameters down
/// to the database query layer. Keys are column names, values are optional
/// SeaORM `Value`s; a `None` value means "don't filter on this column".
///
/// # Example
///
/// ```
/// use sea_orm::Value;
/// use entity_api::QueryFilterMap;
///
/// let mut query_filter_map = QueryFilterMap::new();
/// query_filter_map.insert("status".to_string(), Some(Value::String(Some(Box::new("open".to_string())))));
/// assert!(query_filter_map.get("status").is_some());
/// ```
#[derive(Debug)]
pub struct QueryFilterMap {
    map: HashMap<String, Option<Value>>,
}

impl QueryFilterMap {
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        // HashMap.get returns an Option and so we need to "flatten" this to a single Option
        self.map
            .get(key)
            .and_then(|inner_option| inner_option.clone())
    }

    pub fn insert(&mut self, key: String, value: Option<Value>) {
        self.map.insert(key, value);
    }

    /// Restricts the query to rows owned by `organization_id`, overriding any
    /// caller supplied value.
    pub fn scoped_to(mut self, organization_id: entity::Id) -> Self {
        self.insert(
            "organization_id".to_string(),
            Some(Value::Uuid(Some(Box::new(organization_id)))),
        );
        self
    }
}

impl Default for QueryFilterMap {
    fn default() -> Self {
        Self::new()
    }
}

/// Converts typed parameters into a `QueryFilterMap`.
pub trait IntoQueryFilterMap {
    fn into_query_filter_map(self) -> QueryFilterMap;
}

/// Exposes an optional sort column and direction from typed index parameters.
pub trait QuerySort<C> {
    fn get_sort_column(&self) -> Option<C>;
    fn get_sort_order(&self) -> Option<Order>;
}

/// Find all records of an entity by the given query filter map.
pub async fn find_by<E, C>(
    db: &impl ConnectionTrait,
    query_filter_map: QueryFilterMap,
) -> Result<Vec<E::Model>, Error>
where
    E: EntityTrait<Column = C>,
    C: ColumnTrait + IntoEnumIterator,
{
    find_by_sorted::<E, C>(db, query_filter_map, None, None).await
}

/// Find all records of an entity by the given query filter map, ordered by
/// `sort_column`. A missing order defaults to ascending.
pub async fn find_by_sorted<E, C>(
    db: &impl ConnectionTrait,
    query_filter_map: QueryFilterMap,
    sort_column: Option<C>,
    sort_order: Option<Order>,
) -> Result<Vec<E::Model>, Error>
where
    E: EntityTrait<Column = C>,
    C: ColumnTrait + IntoEnumIterator,
{
    let mut query = filtered::<E, C>(&query_filter_map);

    if let Some(column) = sort_column {
        query = query.order_by(column, sort_order.unwrap_or(Order::Asc));
    }

    Ok(query.all(db).await?)
}

/// Builds a `SELECT` over `E` with an equality predicate per filter entry.
pub(crate) fn filtered<E, C>(query_filter_map: &QueryFilterMap) -> Select<E>
where
    E: EntityTrait<Column = C>,
    C: ColumnTrait + IntoEnumIterator,
{
    let mut query = E::find();

    // We iterate through the entity's defined columns so that we only attempt
    // to filter by columns that exist.
    for column in C::iter() {
        if let Some(value) = query_filter_map.get(&column.to_string()) {
            query = query.filter(column.eq(value));
        }
    }

    query
}
