use super::error::Error;
use chrono::Utc;
use entity::ticket_comments::{ActiveModel, Column, Entity, Model};
use entity::Id;
use sea_orm::{entity::prelude::*, ActiveValue::Set, ConnectionTrait, QueryOrder};

pub async fn create(
    db: &impl ConnectionTrait,
    ticket_id: Id,
    author_id: Id,
    comment_model: Model,
) -> Result<Model, Error> {
    let active_model = ActiveModel {
        ticket_id: Set(ticket_id),
        author_id: Set(author_id),
        body: Set(comment_model.body),
        internal: Set(comment_model.internal),
        created_at: Set(Utc::now().into()),
        ..Default::default()
    };

    Ok(active_model.insert(db).await?)
}

/// Comments on the ticket, oldest first.
pub async fn find_by_ticket_id(
    db: &impl ConnectionTrait,
    ticket_id: Id,
) -> Result<Vec<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::TicketId.eq(ticket_id))
        .order_by_asc(Column::CreatedAt)
        .all(db)
        .await?)
}
