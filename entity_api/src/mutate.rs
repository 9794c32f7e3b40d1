use crate::error::Error;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait,
    IntoActiveModel, Value,
};
use std::collections::HashMap;

const UPDATED_AT: &str = "updated_at";

/// Updates an existing record in the database using a map of column names to values.
///
/// Only the fields present in `update_map` are modified; columns the entity
/// doesn't define are ignored. When the entity has an `updated_at` column it is
/// always set to the current time.
///
/// # Type Parameters
///
/// * `A` - The ActiveModel type that implements ActiveModelTrait and ActiveModelBehavior
/// * `C` - The Column type that implements ColumnTrait
pub async fn update<A, C>(
    db: &impl ConnectionTrait,
    mut active_model: A,
    update_map: UpdateMap,
) -> Result<<A::Entity as EntityTrait>::Model, Error>
where
    A: ActiveModelTrait + ActiveModelBehavior + Send,
    C: ColumnTrait,
    A::Entity: EntityTrait<Column = C>,
    <A::Entity as EntityTrait>::Model: IntoActiveModel<A>,
{
    apply::<A, C>(&mut active_model, &update_map);
    Ok(active_model.update(db).await?)
}

/// Copies the map's values onto the active model and bumps `updated_at`.
pub(crate) fn apply<A, C>(active_model: &mut A, update_map: &UpdateMap)
where
    A: ActiveModelTrait,
    C: ColumnTrait,
    A::Entity: EntityTrait<Column = C>,
{
    for column in C::iter() {
        let name = column.to_string();
        if name == UPDATED_AT {
            let now: sea_orm::prelude::DateTimeWithTimeZone = chrono::Utc::now().into();
            active_model.set(column, now.into());
        } else if let Some(value) = update_map.get(&name) {
            active_model.set(column, value.clone());
        }
    }
}

/// A map structure that holds column names and their corresponding values for updates.
///
/// Values are SeaORM `Value`s; a `None` entry is treated as absent so callers
/// can insert optional fields unconditionally.
#[derive(Default, Debug)]
pub struct UpdateMap {
    map: HashMap<String, Option<Value>>,
}

impl UpdateMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.map.get(key).and_then(|opt| opt.as_ref())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.map.remove(key).and_then(|opt| opt)
    }

    pub fn insert(&mut self, key: String, value: Option<Value>) {
        self.map.insert(key, value);
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.map.values().all(Option::is_none)
    }
}

/// A trait that allows types to be converted into an UpdateMap.
pub trait IntoUpdateMap {
    fn into_update_map(self) -> UpdateMap;
}
