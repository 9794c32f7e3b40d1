use super::error::Error;
use chrono::Utc;
use entity::key_results::{ActiveModel, Column, Entity, Model};
use entity::{objectives, Id};
use sea_orm::{
    entity::prelude::*, ActiveValue::Set, ActiveValue::Unchanged, ConnectionTrait, JoinType,
    QueryOrder, QuerySelect,
};

use log::*;

pub async fn create(
    db: &impl ConnectionTrait,
    objective_id: Id,
    key_result_model: Model,
) -> Result<Model, Error> {
    debug!("New Key Result Model to be inserted: {key_result_model:?}");

    let now = Utc::now();
    let active_model = ActiveModel {
        objective_id: Set(objective_id),
        title: Set(key_result_model.title),
        unit: Set(key_result_model.unit),
        start_value: Set(key_result_model.start_value),
        target_value: Set(key_result_model.target_value),
        current_value: Set(key_result_model.current_value),
        status: Set(key_result_model.status),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    };

    Ok(active_model.insert(db).await?)
}

/// Finds a key result whose objective belongs to the organization.
pub async fn find_by_id(
    db: &impl ConnectionTrait,
    organization_id: Id,
    id: Id,
) -> Result<Model, Error> {
    Entity::find_by_id(id)
        .join(JoinType::InnerJoin, entity::key_results::Relation::Objectives.def())
        .filter(objectives::Column::OrganizationId.eq(organization_id))
        .one(db)
        .await?
        .ok_or_else(Error::not_found)
}

/// Key results for each of the given objectives, oldest first.
pub async fn find_by_objective_ids(
    db: &impl ConnectionTrait,
    objective_ids: Vec<Id>,
) -> Result<Vec<Model>, Error> {
    if objective_ids.is_empty() {
        return Ok(Vec::new());
    }

    Ok(Entity::find()
        .filter(Column::ObjectiveId.is_in(objective_ids))
        .order_by_asc(Column::CreatedAt)
        .all(db)
        .await?)
}

/// Records a new current value for the key result.
pub async fn check_in(
    db: &impl ConnectionTrait,
    key_result: Model,
    current_value: f64,
) -> Result<Model, Error> {
    let active_model = ActiveModel {
        id: Unchanged(key_result.id),
        current_value: Set(current_value),
        updated_at: Set(Utc::now().into()),
        ..Default::default()
    };

    let updated = active_model.update(db).await?;
    info!(
        "Key result {} checked in at {current_value} (was {})",
        key_result.id, key_result.current_value
    );
    Ok(updated)
}

pub async fn delete_by_id(
    db: &impl ConnectionTrait,
    organization_id: Id,
    id: Id,
) -> Result<(), Error> {
    let key_result = find_by_id(db, organization_id, id).await?;
    key_result.delete(db).await?;
    Ok(())
}

#[cfg(test)]
#[cfg(feature = "mock")]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, Transaction};

    #[tokio::test]
    async fn find_by_id_joins_the_objective_for_tenant_scope() -> Result<(), Error> {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<Model>::new()])
            .into_connection();

        let organization_id = Id::new_v4();
        let id = Id::new_v4();
        let _ = find_by_id(&db, organization_id, id).await;

        assert_eq!(
            db.into_transaction_log(),
            [Transaction::from_sql_and_values(
                DatabaseBackend::Postgres,
                r#"SELECT "key_results"."id", "key_results"."objective_id", "key_results"."title", "key_results"."unit", "key_results"."start_value", "key_results"."target_value", "key_results"."current_value", "key_results"."status", "key_results"."created_at", "key_results"."updated_at" FROM "bizops"."key_results" INNER JOIN "bizops"."objectives" ON "key_results"."objective_id" = "objectives"."id" WHERE "key_results"."id" = $1 AND "objectives"."organization_id" = $2 LIMIT $3"#,
                [id.into(), organization_id.into(), 1u64.into()]
            )]
        );

        Ok(())
    }

    #[tokio::test]
    async fn find_by_objective_ids_skips_the_query_when_empty() -> Result<(), Error> {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        assert!(find_by_objective_ids(&db, vec![]).await?.is_empty());
        assert!(db.into_transaction_log().is_empty());

        Ok(())
    }
}
