use super::error::Error;
use chrono::Utc;
use entity::customers::{ActiveModel, Column, Entity, Model};
use entity::Id;
use sea_orm::{entity::prelude::*, ActiveValue::Set, ConnectionTrait};

use log::*;

pub async fn create(
    db: &impl ConnectionTrait,
    organization_id: Id,
    customer_model: Model,
) -> Result<Model, Error> {
    debug!("New Customer Model to be inserted: {customer_model:?}");

    let now = Utc::now();
    let active_model = ActiveModel {
        organization_id: Set(organization_id),
        name: Set(customer_model.name),
        email: Set(customer_model.email),
        phone: Set(customer_model.phone),
        company: Set(customer_model.company),
        external_ref: Set(customer_model.external_ref),
        status: Set(customer_model.status),
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
    let customer = find_by_id(db, organization_id, id).await?;
    customer.delete(db).await?;
    Ok(())
}
