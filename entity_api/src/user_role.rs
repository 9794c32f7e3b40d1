use super::error::Error;
use chrono::Utc;
use entity::roles::Role;
use entity::user_roles::{ActiveModel, Column, Entity, Model};
use entity::Id;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, ConnectionTrait, EntityTrait,
    QueryFilter, TransactionTrait,
};

use log::*;

pub async fn find_by_user_id(db: &impl ConnectionTrait, user_id: Id) -> Result<Vec<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::UserId.eq(user_id))
        .all(db)
        .await?)
}

pub async fn create(
    db: &impl ConnectionTrait,
    user_id: Id,
    organization_id: Option<Id>,
    role: Role,
) -> Result<Model, Error> {
    let now = Utc::now();
    let active_model = ActiveModel {
        user_id: Set(user_id),
        organization_id: Set(organization_id),
        role: Set(role),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    };

    Ok(active_model.insert(db).await?)
}

/// Replaces the user's role within `organization_id` with `role`. A `SuperAdmin`
/// grant is stored without an organization and leaves organization roles alone.
pub async fn assign(
    db: &impl TransactionTrait,
    user_id: Id,
    organization_id: Id,
    role: Role,
) -> Result<Model, Error> {
    let txn = db.begin().await?;

    let assigned = if role == Role::SuperAdmin {
        match Entity::find()
            .filter(Column::UserId.eq(user_id))
            .filter(Column::Role.eq(Role::SuperAdmin))
            .filter(Column::OrganizationId.is_null())
            .one(&txn)
            .await?
        {
            Some(existing) => existing,
            None => create(&txn, user_id, None, Role::SuperAdmin).await?,
        }
    } else {
        delete_by_user_and_organization(&txn, user_id, organization_id).await?;
        create(&txn, user_id, Some(organization_id), role).await?
    };

    txn.commit().await?;

    info!("Assigned role {role} to user {user_id} in organization {organization_id}");
    Ok(assigned)
}

pub async fn delete_by_user_and_organization(
    db: &impl ConnectionTrait,
    user_id: Id,
    organization_id: Id,
) -> Result<(), Error> {
    Entity::delete_many()
        .filter(
            Condition::all()
                .add(Column::UserId.eq(user_id))
                .add(Column::OrganizationId.eq(organization_id)),
        )
        .exec(db)
        .await?;
    Ok(())
}

pub async fn delete_by_user_id(db: &impl ConnectionTrait, user_id: Id) -> Result<(), Error> {
    Entity::delete_many()
        .filter(Condition::all().add(Column::UserId.eq(user_id)))
        .exec(db)
        .await?;
    Ok(())
}
