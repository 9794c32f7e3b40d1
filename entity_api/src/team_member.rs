use super::error::Error;
use chrono::Utc;
use entity::team_members::{ActiveModel, Column, Entity, Model};
use entity::{users, Id};
use sea_orm::{
    entity::prelude::*, sea_query::Query, ActiveValue::Set, ConnectionTrait, QueryOrder,
};

use log::*;

pub async fn create(db: &impl ConnectionTrait, team_id: Id, user_id: Id) -> Result<Model, Error> {
    let now = Utc::now();
    let active_model = ActiveModel {
        team_id: Set(team_id),
        user_id: Set(user_id),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    };

    let member = active_model.insert(db).await?;
    info!("Added user {user_id} to team {team_id}");
    Ok(member)
}

/// Users that belong to the team, ordered by last name.
pub async fn find_users_by_team(
    db: &impl ConnectionTrait,
    team_id: Id,
) -> Result<Vec<users::Model>, Error> {
    let members = Query::select()
        .column(Column::UserId)
        .from(Entity)
        .and_where(Column::TeamId.eq(team_id))
        .to_owned();

    Ok(users::Entity::find()
        .filter(users::Column::Id.in_subquery(members))
        .order_by_asc(users::Column::LastName)
        .all(db)
        .await?)
}

/// Removes the membership. Returns not found when the user wasn't a member.
pub async fn delete(db: &impl ConnectionTrait, team_id: Id, user_id: Id) -> Result<(), Error> {
    let result = Entity::delete_many()
        .filter(Column::TeamId.eq(team_id))
        .filter(Column::UserId.eq(user_id))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(Error::not_found());
    }
    Ok(())
}

#[cfg(test)]
#[cfg(feature = "mock")]
mod tests {
    use super::*;
    use crate::error::EntityApiErrorKind;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    #[tokio::test]
    async fn delete_reports_missing_membership_as_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();

        let result = delete(&db, Id::new_v4(), Id::new_v4()).await;
        assert_eq!(
            result.unwrap_err().error_kind,
            EntityApiErrorKind::RecordNotFound
        );
    }
}
