use super::error::Error;
use chrono::Utc;
use entity::objectives::{ActiveModel, Column, Entity, Model};
use entity::{key_results, Id};
use sea_orm::{entity::prelude::*, ActiveValue::Set, ConnectionTrait, QueryOrder};

use log::*;

pub async fn create(
    db: &impl ConnectionTrait,
    organization_id: Id,
    objective_model: Model,
) -> Result<Model, Error> {
    debug!("New Objective Model to be inserted: {objective_model:?}");

    let now = Utc::now();
    let active_model = ActiveModel {
        organization_id: Set(organization_id),
        title: Set(objective_model.title),
        description: Set(objective_model.description),
        period: Set(objective_model.period),
        owner_id: Set(objective_model.owner_id),
        team_id: Set(objective_model.team_id),
        status: Set(objective_model.status),
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

/// Finds an objective together with its key results, oldest key result first.
pub async fn find_with_key_results(
    db: &impl ConnectionTrait,
    organization_id: Id,
    id: Id,
) -> Result<(Model, Vec<key_results::Model>), Error> {
    let objective = find_by_id(db, organization_id, id).await?;
    let key_results = objective
        .find_related(key_results::Entity)
        .order_by_asc(key_results::Column::CreatedAt)
        .all(db)
        .await?;
    Ok((objective, key_results))
}

pub async fn delete_by_id(
    db: &impl ConnectionTrait,
    organization_id: Id,
    id: Id,
) -> Result<(), Error> {
    let objective = find_by_id(db, organization_id, id).await?;
    objective.delete(db).await?;
    Ok(())
}

#[cfg(test)]
#[cfg(feature = "mock")]
mod tests {
    use super::*;
    use entity::status::Status;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn find_with_key_results_returns_both() -> Result<(), Error> {
        let now = Utc::now();
        let organization_id = Id::new_v4();
        let objective = Model {
            id: Id::new_v4(),
            organization_id,
            title: "Grow recurring revenue".to_string(),
            description: None,
            period: "2026-Q4".to_string(),
            owner_id: None,
            team_id: None,
            status: Status::OnTrack,
            created_at: now.into(),
            updated_at: now.into(),
        };
        let key_result = key_results::Model {
            id: Id::new_v4(),
            objective_id: objective.id,
            title: "Sign 40 new fibre customers".to_string(),
            unit: Some("customers".to_string()),
            start_value: 0.0,
            target_value: 40.0,
            current_value: 10.0,
            status: Status::OnTrack,
            created_at: now.into(),
            updated_at: now.into(),
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[objective.clone()]])
            .append_query_results([[key_result.clone()]])
            .into_connection();

        let (found, key_results) =
            find_with_key_results(&db, organization_id, objective.id).await?;

        assert_eq!(found, objective);
        assert_eq!(key_results, vec![key_result]);

        Ok(())
    }
}
