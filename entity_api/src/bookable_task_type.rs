use super::error::Error;
use chrono::Utc;
use entity::bookable_task_types::{ActiveModel, Column, Entity, Model};
use entity::Id;
use sea_orm::{entity::prelude::*, ActiveValue::Set, ConnectionTrait};

use log::*;

pub async fn create(
    db: &impl ConnectionTrait,
    organization_id: Id,
    task_type_model: Model,
) -> Result<Model, Error> {
    debug!("New Bookable Task Type to be inserted: {task_type_model:?}");

    let now = Utc::now();
    let active_model = ActiveModel {
        organization_id: Set(organization_id),
        name: Set(task_type_model.name),
        description: Set(task_type_model.description),
        duration_minutes: Set(task_type_model.duration_minutes),
        buffer_minutes: Set(task_type_model.buffer_minutes),
        color: Set(task_type_model.color),
        active: Set(task_type_model.active),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    };

    Ok(active_model.insert(db).await?)
}

pub async fn find_by_id(
    db: &impl ConnectionTrait,
    organization_id: Id,
    id: Id,
) -> Result<Model, Error> {
    Entity::find_by_id(id)
        .filter(Column::OrganizationId.eq(organization_id))
        .one(db)
        .await?
        .ok_or_else(Error::not_found)
}

pub async fn delete_by_id(
    db: &impl ConnectionTrait,
    organization_id: Id,
    id: Id,
) -> Result<(), Error> {
    let task_type = find_by_id(db, organization_id, id).await?;
    task_type.delete(db).await?;
    Ok(())
}
