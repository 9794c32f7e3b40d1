use super::error::Error;
use chrono::Utc;
use entity::teams::{ActiveModel, Column, Entity, Model};
use entity::Id;
use sea_orm::{entity::prelude::*, ActiveValue::Set, ConnectionTrait};

use log::*;

pub async fn create(
    db: &impl ConnectionTrait,
    organization_id: Id,
    team_model: Model,
) -> Result<Model, Error> {
    debug!("New Team Model to be inserted: {team_model:?}");

    let now = Utc::now();
    let active_model = ActiveModel {
        organization_id: Set(organization_id),
        name: Set(team_model.name),
        description: Set(team_model.description),
        lead_id: Set(team_model.lead_id),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    };

    Ok(active_model.insert(db).await?)
}

/// Finds a team owned by the organization. Teams of other organizations are
/// reported as not found.
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
    let team = find_by_id(db, organization_id, id).await?;
    team.delete(db).await?;
    Ok(())
}

#[cfg(test)]
#[cfg(feature = "mock")]
mod tests {
    use super::*;
    use crate::error::EntityApiErrorKind;
    use sea_orm::{DatabaseBackend, MockDatabase, Transaction};

    #[tokio::test]
    async fn find_by_id_is_scoped_to_the_organization() -> Result<(), Error> {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<Model>::new()])
            .into_connection();

        let organization_id = Id::new_v4();
        let team_id = Id::new_v4();
        let result = find_by_id(&db, organization_id, team_id).await;

        assert_eq!(
            result.unwrap_err().error_kind,
            EntityApiErrorKind::RecordNotFound
        );
        assert_eq!(
            db.into_transaction_log(),
            [Transaction::from_sql_and_values(
                DatabaseBackend::Postgres,
                r#"SELECT "teams"."id", "teams"."organization_id", "teams"."name", "teams"."description", "teams"."lead_id", "teams"."created_at", "teams"."updated_at" FROM "bizops"."teams" WHERE "teams"."id" = $1 AND "teams"."organization_id" = $2 LIMIT $3"#,
                [team_id.into(), organization_id.into(), 1u64.into()]
            )]
        );

        Ok(())
    }
}
