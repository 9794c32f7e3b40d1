use crate::error::Error;
use crate::{
    customer, find_scoped, strip_immutable, string_value, team, ticket_comments, tickets, user,
    uuid_value, Id, IntoQueryFilterMap, IntoUpdateMap, QuerySort,
};
use entity_api::{ticket, ticket_comment};
use log::*;
use sea_orm::DatabaseConnection;

pub use entity_api::ticket::{delete_by_id, find_by_id};

pub async fn find_by<P>(
    db: &DatabaseConnection,
    organization_id: Id,
    params: P,
) -> Result<Vec<tickets::Model>, Error>
where
    P: IntoQueryFilterMap + QuerySort<tickets::Column>,
{
    find_scoped::<tickets::Entity, tickets::Column, P>(db, organization_id, params).await
}

/// Checks that every record the ticket points at lives in the organization.
async fn ensure_references(
    db: &DatabaseConnection,
    organization_id: Id,
    customer_id: Option<Id>,
    team_id: Option<Id>,
    assignee_id: Option<Id>,
) -> Result<(), Error> {
    if let Some(customer_id) = customer_id {
        customer::ensure_in_organization(db, organization_id, customer_id).await?;
    }
    if let Some(team_id) = team_id {
        team::ensure_in_organization(db, organization_id, team_id).await?;
    }
    if let Some(assignee_id) = assignee_id {
        user::ensure_member(db, organization_id, "assignee", assignee_id).await?;
    }
    Ok(())
}

pub async fn create(
    db: &DatabaseConnection,
    organization_id: Id,
    reporter_id: Id,
    ticket_model: tickets::Model,
) -> Result<tickets::Model, Error> {
    crate::require_text("title", &ticket_model.title)?;
    ensure_references(
        db,
        organization_id,
        ticket_model.customer_id,
        ticket_model.team_id,
        ticket_model.assignee_id,
    )
    .await?;

    let ticket = ticket::create(db, organization_id, reporter_id, ticket_model).await?;
    info!(
        "Ticket {} opened by {reporter_id} with priority {}",
        ticket.id, ticket.priority
    );
    Ok(ticket)
}

pub async fn update(
    db: &DatabaseConnection,
    organization_id: Id,
    id: Id,
    params: impl IntoUpdateMap,
) -> Result<tickets::Model, Error> {
    let mut update_map = strip_immutable(params.into_update_map());
    update_map.remove("reporter_id");
    update_map.remove("resolved_at");

    if let Some(title) = string_value(&update_map, "title") {
        crate::require_text("title", title)?;
    }
    ensure_references(
        db,
        organization_id,
        uuid_value(&update_map, "customer_id"),
        uuid_value(&update_map, "team_id"),
        uuid_value(&update_map, "assignee_id"),
    )
    .await?;

    let existing = find_by_id(db, organization_id, id).await?;
    Ok(ticket::update(db, existing, update_map).await?)
}

/// Comments on a ticket of the organization, oldest first.
pub async fn find_comments(
    db: &DatabaseConnection,
    organization_id: Id,
    ticket_id: Id,
) -> Result<Vec<ticket_comments::Model>, Error> {
    let ticket = find_by_id(db, organization_id, ticket_id).await?;
    Ok(ticket_comment::find_by_ticket_id(db, ticket.id).await?)
}

pub async fn add_comment(
    db: &DatabaseConnection,
    organization_id: Id,
    ticket_id: Id,
    author_id: Id,
    comment_model: ticket_comments::Model,
) -> Result<ticket_comments::Model, Error> {
    crate::require_text("body", &comment_model.body)?;

    let ticket = find_by_id(db, organization_id, ticket_id).await?;
    let comment = ticket_comment::create(db, ticket.id, author_id, comment_model).await?;
    debug!("User {author_id} commented on ticket {ticket_id}");
    Ok(comment)
}

#[cfg(test)]
#[cfg(feature = "mock")]
mod tests {
    use super::*;
    use crate::error::{DomainErrorKind, InternalErrorKind};
    use crate::ticket_priority::TicketPriority;
    use crate::ticket_status::TicketStatus;
    use crate::{customers, UpdateMap};
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, Value};

    fn ticket_model(organization_id: Id, customer_id: Option<Id>) -> tickets::Model {
        let now = Utc::now();
        tickets::Model {
            id: Id::new_v4(),
            organization_id,
            customer_id,
            team_id: None,
            assignee_id: None,
            reporter_id: Id::new_v4(),
            title: "Intermittent dropouts".to_string(),
            description: None,
            status: TicketStatus::Open,
            priority: TicketPriority::High,
            due_at: None,
            resolved_at: None,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    struct Resolve;

    impl IntoUpdateMap for Resolve {
        fn into_update_map(self) -> UpdateMap {
            let mut update_map = UpdateMap::new();
            update_map.insert(
                "status".to_string(),
                Some(Value::String(Some(Box::new("resolved".to_string())))),
            );
            update_map
        }
    }

    #[tokio::test]
    async fn customers_of_other_tenants_cannot_be_referenced() {
        let organization_id = Id::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<customers::Model>::new()])
            .into_connection();

        let err = create(
            &db,
            organization_id,
            Id::new_v4(),
            ticket_model(organization_id, Some(Id::new_v4())),
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err.error_kind,
            DomainErrorKind::Internal(InternalErrorKind::Validation(_))
        ));
    }

    #[tokio::test]
    async fn resolving_a_ticket_stamps_resolved_at() -> Result<(), Error> {
        let organization_id = Id::new_v4();
        let existing = ticket_model(organization_id, None);
        let mut resolved = existing.clone();
        resolved.status = TicketStatus::Resolved;
        resolved.resolved_at = Some(Utc::now().into());

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![existing.clone()], vec![resolved]])
            .into_connection();

        let updated = update(&db, organization_id, existing.id, Resolve).await?;
        assert_eq!(updated.status, TicketStatus::Resolved);

        let update_sql = db
            .into_transaction_log()
            .iter()
            .flat_map(|transaction| transaction.statements().iter().map(|s| s.sql.clone()))
            .find(|sql| sql.starts_with("UPDATE"))
            .unwrap();
        assert!(update_sql.contains(r#""resolved_at" = $"#));
        Ok(())
    }

    #[tokio::test]
    async fn blank_comments_are_rejected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let comment = ticket_comments::Model {
            id: Id::new_v4(),
            ticket_id: Id::new_v4(),
            author_id: Id::new_v4(),
            body: "   ".to_string(),
            internal: false,
            created_at: Utc::now().into(),
        };

        let err = add_comment(&db, Id::new_v4(), Id::new_v4(), Id::new_v4(), comment)
            .await
            .unwrap_err();

        assert!(matches!(
            err.error_kind,
            DomainErrorKind::Internal(InternalErrorKind::Validation(_))
        ));
    }
}
