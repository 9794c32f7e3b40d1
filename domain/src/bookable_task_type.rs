use crate::error::Error;
use crate::{
    bookable_task_types, find_scoped, strip_immutable, string_value, Id, IntoQueryFilterMap,
    IntoUpdateMap, QuerySort, UpdateMap,
};
use entity_api::{bookable_task_type, mutate};
use log::*;
use sea_orm::{DatabaseConnection, IntoActiveModel, Value};

pub use entity_api::bookable_task_type::{delete_by_id, find_by_id};

fn validate_duration(duration_minutes: i32) -> Result<(), Error> {
    if duration_minutes <= 0 {
        return Err(Error::validation("duration_minutes must be greater than 0"));
    }
    Ok(())
}

fn validate_buffer(buffer_minutes: i32) -> Result<(), Error> {
    if buffer_minutes < 0 {
        return Err(Error::validation("buffer_minutes must not be negative"));
    }
    Ok(())
}

/// Accepts `#rgb` and `#rrggbb` colors.
fn validate_color(color: &str) -> Result<(), Error> {
    let valid = color
        .strip_prefix('#')
        .map(|hex| (hex.len() == 3 || hex.len() == 6) && hex.chars().all(|c| c.is_ascii_hexdigit()))
        .unwrap_or(false);
    if !valid {
        return Err(Error::validation(format!("{color} is not a hex color")));
    }
    Ok(())
}

fn int_value(update_map: &UpdateMap, column: &str) -> Option<i32> {
    match update_map.get(column) {
        Some(Value::Int(Some(value))) => Some(*value),
        _ => None,
    }
}

pub async fn find_by<P>(
    db: &DatabaseConnection,
    organization_id: Id,
    params: P,
) -> Result<Vec<bookable_task_types::Model>, Error>
where
    P: IntoQueryFilterMap + QuerySort<bookable_task_types::Column>,
{
    find_scoped::<bookable_task_types::Entity, bookable_task_types::Column, P>(
        db,
        organization_id,
        params,
    )
    .await
}

pub async fn create(
    db: &DatabaseConnection,
    organization_id: Id,
    task_type_model: bookable_task_types::Model,
) -> Result<bookable_task_types::Model, Error> {
    crate::require_text("name", &task_type_model.name)?;
    validate_duration(task_type_model.duration_minutes)?;
    validate_buffer(task_type_model.buffer_minutes)?;
    if let Some(color) = task_type_model.color.as_deref() {
        validate_color(color)?;
    }

    let task_type = bookable_task_type::create(db, organization_id, task_type_model).await?;
    info!(
        "Created bookable task type {} ({} minutes)",
        task_type.id, task_type.duration_minutes
    );
    Ok(task_type)
}

pub async fn update(
    db: &DatabaseConnection,
    organization_id: Id,
    id: Id,
    params: impl IntoUpdateMap,
) -> Result<bookable_task_types::Model, Error> {
    let update_map = strip_immutable(params.into_update_map());

    if let Some(name) = string_value(&update_map, "name") {
        crate::require_text("name", name)?;
    }
    if let Some(duration_minutes) = int_value(&update_map, "duration_minutes") {
        validate_duration(duration_minutes)?;
    }
    if let Some(buffer_minutes) = int_value(&update_map, "buffer_minutes") {
        validate_buffer(buffer_minutes)?;
    }
    if let Some(color) = string_value(&update_map, "color") {
        validate_color(color)?;
    }

    let existing = find_by_id(db, organization_id, id).await?;
    Ok(
        mutate::update::<bookable_task_types::ActiveModel, bookable_task_types::Column>(
            db,
            existing.into_active_model(),
            update_map,
        )
        .await?,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn durations_must_be_positive() {
        assert!(validate_duration(0).is_err());
        assert!(validate_duration(-15).is_err());
        assert!(validate_duration(45).is_ok());
    }

    #[test]
    fn buffers_may_be_zero() {
        assert!(validate_buffer(0).is_ok());
        assert!(validate_buffer(-1).is_err());
    }

    #[test]
    fn colors_are_hex() {
        assert!(validate_color("#1e88e5").is_ok());
        assert!(validate_color("#fff").is_ok());
        assert!(validate_color("blue").is_err());
        assert!(validate_color("#12345").is_err());
    }

    #[test]
    fn update_maps_expose_integer_columns() {
        let mut update_map = UpdateMap::new();
        update_map.insert("duration_minutes".to_string(), Some(Value::Int(Some(0))));
        assert_eq!(int_value(&update_map, "duration_minutes"), Some(0));
        assert_eq!(int_value(&update_map, "buffer_minutes"), None);
    }
}
