use super::error::Error;
use crate::mutate::{self, UpdateMap};
use chrono::Utc;
use entity::ticket_status::TicketStatus;
use entity::tickets::{ActiveModel, Column, Entity, Model};
use entity::Id;
use sea_orm::{
    entity::prelude::*, ActiveValue::Set, ConnectionTrait, IntoActiveModel, Value,
};

use log::*;

pub async fn create(
    db: &impl ConnectionTrait,
    organization_id: Id,
    reporter_id: Id,
    ticket_model: Model,
) -> Result<Model, Error> {
    debug!("New Ticket Model to be inserted: {ticket_model:?}");

    let now = Utc::now();
    let resolved_at: Option<DateTimeWithTimeZone> =
        ticket_model.status.is_terminal().then(|| now.into());

    let active_model = ActiveModel {
        organization_id: Set(organization_id),
        customer_id: Set(ticket_model.customer_id),
        team_id: Set(ticket_model.team_id),
        assignee_id: Set(ticket_model.assignee_id),
        reporter_id: Set(reporter_id),
        title: Set(ticket_model.title),
        description: Set(ticket_model.description),
        status: Set(ticket_model.status),
        priority: Set(ticket_model.priority),
        due_at: Set(ticket_model.due_at),
        resolved_at: Set(resolved_at),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    };

    Ok(active_model.insert(db).await?)
}

/// Applies a partial update. Moving into a resolved or closed status stamps
/// `resolved_at`; reopening clears it.
pub async fn update(
    db: &impl ConnectionTrait,
    existing: Model,
    mut update_map: UpdateMap,
) -> Result<Model, Error> {
    if let Some(Value::String(Some(status))) = update_map.get("status").cloned() {
        let new_status = TicketStatus::try_from_value(&status.to_string())?;
        if new_status.is_terminal() && !existing.status.is_terminal() {
            debug!("Ticket {} resolved, stamping resolved_at", existing.id);
            let now: DateTimeWithTimeZone = Utc::now().into();
            update_map.insert("resolved_at".to_string(), Some(now.into()));
        } else if !new_status.is_terminal() && existing.resolved_at.is_some() {
            update_map.insert(
                "resolved_at".to_string(),
                Some(Value::ChronoDateTimeWithTimeZone(None)),
            );
        }
    }

    mutate::update::<ActiveModel, Column>(db, existing.into_active_model(), update_map).await
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
    let ticket = find_by_id(db, organization_id, id).await?;
    ticket.delete(db).await?;
    Ok(())
}
