use crate::error::Error;
use crate::{
    find_scoped, strip_immutable, string_value, teams, user, users, uuid_value, Id, IntoQueryFilterMap,
    IntoUpdateMap, QuerySort,
};
use entity_api::{mutate, team, team_member, team_members};
use log::*;
use sea_orm::{DatabaseConnection, IntoActiveModel};

pub use entity_api::team::{delete_by_id, find_by_id};

pub async fn find_by<P>(
    db: &DatabaseConnection,
    organization_id: Id,
    params: P,
) -> Result<Vec<teams::Model>, Error>
where
    P: IntoQueryFilterMap + QuerySort<teams::Column>,
{
    find_scoped::<teams::Entity, teams::Column, P>(db, organization_id, params).await
}

/// Fails validation unless the team belongs to the organization.
pub(crate) async fn ensure_in_organization(
    db: &DatabaseConnection,
    organization_id: Id,
    team_id: Id,
) -> Result<(), Error> {
    team::find_by_id(db, organization_id, team_id)
        .await
        .map(|_| ())
        .map_err(|err| crate::invalid_reference(err.into(), "team", team_id))
}

pub async fn create(
    db: &DatabaseConnection,
    organization_id: Id,
    team_model: teams::Model,
) -> Result<teams::Model, Error> {
    crate::require_text("name", &team_model.name)?;
    if let Some(lead_id) = team_model.lead_id {
        user::ensure_member(db, organization_id, "lead", lead_id).await?;
    }

    let team = team::create(db, organization_id, team_model).await?;
    info!("Created team {} in organization {organization_id}", team.id);
    Ok(team)
}

pub async fn update(
    db: &DatabaseConnection,
    organization_id: Id,
    id: Id,
    params: impl IntoUpdateMap,
) -> Result<teams::Model, Error> {
    let update_map = strip_immutable(params.into_update_map());

    if let Some(name) = string_value(&update_map, "name") {
        crate::require_text("name", name)?;
    }
    if let Some(lead_id) = uuid_value(&update_map, "lead_id") {
        user::ensure_member(db, organization_id, "lead", lead_id).await?;
    }

    let existing = find_by_id(db, organization_id, id).await?;
    Ok(mutate::update::<teams::ActiveModel, teams::Column>(
        db,
        existing.into_active_model(),
        update_map,
    )
    .await?)
}

pub async fn find_members(
    db: &DatabaseConnection,
    organization_id: Id,
    team_id: Id,
) -> Result<Vec<users::Model>, Error> {
    let team = find_by_id(db, organization_id, team_id).await?;
    Ok(team_member::find_users_by_team(db, team.id).await?)
}

/// Adds an organization member to the team.
pub async fn add_member(
    db: &DatabaseConnection,
    organization_id: Id,
    team_id: Id,
    user_id: Id,
) -> Result<team_members::Model, Error> {
    let team = find_by_id(db, organization_id, team_id).await?;
    user::ensure_member(db, organization_id, "user", user_id).await?;

    Ok(team_member::create(db, team.id, user_id).await?)
}

pub async fn remove_member(
    db: &DatabaseConnection,
    organization_id: Id,
    team_id: Id,
    user_id: Id,
) -> Result<(), Error> {
    let team = find_by_id(db, organization_id, team_id).await?;
    team_member::delete(db, team.id, user_id).await?;
    info!("Removed user {user_id} from team {team_id}");
    Ok(())
}

#[cfg(test)]
#[cfg(feature = "mock")]
mod tests {
    use super::*;
    use crate::error::{DomainErrorKind, InternalErrorKind};
    use crate::user_roles;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn team(organization_id: Id, lead_id: Option<Id>) -> teams::Model {
        let now = Utc::now();
        teams::Model {
            id: Id::new_v4(),
            organization_id,
            name: "Field Support".to_string(),
            description: None,
            lead_id,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[tokio::test]
    async fn leads_must_belong_to_the_organization() {
        let organization_id = Id::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<(users::Model, Option<user_roles::Model>)>::new()])
            .into_connection();

        let err = create(&db, organization_id, team(organization_id, Some(Id::new_v4())))
            .await
            .unwrap_err();

        assert!(matches!(
            err.error_kind,
            DomainErrorKind::Internal(InternalErrorKind::Validation(_))
        ));
    }

    #[tokio::test]
    async fn members_of_another_tenants_team_are_not_listed() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<teams::Model>::new()])
            .into_connection();

        let err = find_members(&db, Id::new_v4(), Id::new_v4())
            .await
            .unwrap_err();

        assert_eq!(err.error_kind, Error::not_found().error_kind);
    }

    #[tokio::test]
    async fn create_without_a_lead_inserts_directly() -> Result<(), Error> {
        let organization_id = Id::new_v4();
        let created = team(organization_id, None);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![created.clone()]])
            .into_connection();

        let team = create(&db, organization_id, team(organization_id, None)).await?;

        assert_eq!(team.id, created.id);
        Ok(())
    }
}
