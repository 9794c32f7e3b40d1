use super::error::Error;
use chrono::Utc;
use entity::email_templates::{ActiveModel, Column, Entity, Model};
use entity::Id;
use sea_orm::{entity::prelude::*, ActiveValue::Set, ConnectionTrait};

pub async fn create(
    db: &impl ConnectionTrait,
    organization_id: Id,
    template_model: Model,
) -> Result<Model, Error> {
    let now = Utc::now();
    let active_model = ActiveModel {
        organization_id: Set(organization_id),
        name: Set(template_model.name),
        subject: Set(template_model.subject),
        html_body: Set(template_model.html_body),
        text_body: Set(template_model.text_body),
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
    let template = find_by_id(db, organization_id, id).await?;
    template.delete(db).await?;
    Ok(())
}
