use super::error::{EntityApiErrorKind, Error};
use crate::user_role;
use chrono::Utc;

use entity::users::{ActiveModel, Column, Entity, Model};
use entity::{roles::Role, user_roles, Id};
use log::*;
use sea_orm::{
    entity::prelude::*, sea_query::Query, ActiveValue::Set, ActiveValue::Unchanged,
    ConnectionTrait, QueryOrder, TransactionTrait,
};

pub async fn create(db: &impl ConnectionTrait, user_model: Model) -> Result<Model, Error> {
    debug!("New User Model to be inserted: {}", user_model.email);

    let now = Utc::now();
    let user_active_model: ActiveModel = ActiveModel {
        email: Set(user_model.email.trim().to_lowercase()),
        first_name: Set(user_model.first_name),
        last_name: Set(user_model.last_name),
        display_name: Set(user_model.display_name),
        password: Set(generate_hash(user_model.password)),
        timezone: Set(user_model.timezone),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    };

    let mut created_user = user_active_model.insert(db).await?;

    // Newly created users will not have roles at this point so we will add an empty vec manually
    created_user.roles = Vec::new();
    Ok(created_user)
}

/// Creates a user and grants them `role` in the organization in one transaction.
pub async fn create_by_organization(
    db: &impl TransactionTrait,
    organization_id: Id,
    user_model: Model,
    role: Role,
) -> Result<Model, Error> {
    let txn = db.begin().await?;

    let mut user = create(&txn, user_model).await?;
    let grant = user_role::create(&txn, user.id, Some(organization_id), role).await?;
    user.roles = vec![grant];

    txn.commit().await?;

    Ok(user)
}

pub async fn find_by_email(db: &impl ConnectionTrait, email: &str) -> Result<Option<Model>, Error> {
    let results = Entity::find()
        .filter(Column::Email.eq(email.trim().to_lowercase()))
        .find_with_related(user_roles::Entity)
        .all(db)
        .await?;
    match results.into_iter().next() {
        Some((mut user, roles)) => {
            user.roles = roles;
            Ok(Some(user))
        }
        None => Ok(None),
    }
}

pub async fn find_by_id(db: &impl ConnectionTrait, id: Id) -> Result<Model, Error> {
    let results = Entity::find_by_id(id)
        .find_with_related(user_roles::Entity)
        .all(db)
        .await?;

    match results.into_iter().next() {
        Some((mut user, roles)) => {
            user.roles = roles;
            Ok(user)
        }
        None => Err(Error::not_found()),
    }
}

/// Users holding a role in the organization. Each user's `roles` holds all of
/// their grants, including those for other organizations.
pub async fn find_by_organization(
    db: &impl ConnectionTrait,
    organization_id: Id,
) -> Result<Vec<Model>, Error> {
    let members = Query::select()
        .column(user_roles::Column::UserId)
        .from(user_roles::Entity)
        .and_where(user_roles::Column::OrganizationId.eq(organization_id))
        .to_owned();

    let results = Entity::find()
        .filter(Column::Id.in_subquery(members))
        .order_by_asc(Column::LastName)
        .find_with_related(user_roles::Entity)
        .all(db)
        .await?;

    Ok(results
        .into_iter()
        .map(|(mut user, roles)| {
            user.roles = roles;
            user
        })
        .collect())
}

pub async fn update_password(
    db: &impl ConnectionTrait,
    user: Model,
    new_password: String,
) -> Result<(), Error> {
    let active_model = ActiveModel {
        id: Unchanged(user.id),
        password: Set(generate_hash(new_password)),
        updated_at: Set(Utc::now().into()),
        ..Default::default()
    };
    active_model.update(db).await?;
    info!("Password updated for user {}", user.id);
    Ok(())
}

pub async fn delete(db: &impl ConnectionTrait, user_id: Id) -> Result<(), Error> {
    Entity::delete_by_id(user_id).exec(db).await?;
    Ok(())
}

pub fn verify_password(password_to_verify: &str, password_hash: &str) -> Result<(), Error> {
    match password_auth::verify_password(password_to_verify, password_hash) {
        Ok(_) => Ok(()),
        Err(_) => Err(Error {
            source: None,
            error_kind: EntityApiErrorKind::RecordUnauthenticated,
        }),
    }
}

pub fn generate_hash(password: String) -> String {
    password_auth::generate_hash(password)
}

#[cfg(test)]
mod password_tests {
    use super::*;

    #[test]
    fn verify_password_accepts_the_hashed_password_only() {
        let hash = generate_hash("correct horse".to_string());
        assert!(verify_password("correct horse", &hash).is_ok());
        assert_eq!(
            verify_password("battery staple", &hash)
                .unwrap_err()
                .error_kind,
            EntityApiErrorKind::RecordUnauthenticated
        );
    }
}

#[cfg(test)]
// We need to gate seaORM's mock feature behind conditional compilation because
// the feature removes the Clone trait implementation from seaORM's DatabaseConnection.
// see https://github.com/SeaQL/sea-orm/issues/830
#[cfg(feature = "mock")]
mod test {
    use super::*;
    use entity::Id;
    use sea_orm::{DatabaseBackend, MockDatabase, Transaction};

    fn user_model(id: Id) -> Model {
        let now = Utc::now();
        Model {
            id,
            email: "test@test.com".to_owned(),
            first_name: "Test".to_owned(),
            last_name: "User".to_owned(),
            display_name: None,
            password: "password123".to_owned(),
            timezone: "UTC".to_string(),
            created_at: now.into(),
            updated_at: now.into(),
            roles: vec![],
        }
    }

    #[tokio::test]
    async fn find_by_email_normalizes_and_joins_roles() -> Result<(), Error> {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let _ = find_by_email(&db, "  Test@Test.com ").await;

        assert_eq!(
            db.into_transaction_log(),
            [Transaction::from_sql_and_values(
                DatabaseBackend::Postgres,
                r#"SELECT "users"."id" AS "A_id", "users"."email" AS "A_email", "users"."first_name" AS "A_first_name", "users"."last_name" AS "A_last_name", "users"."display_name" AS "A_display_name", "users"."password" AS "A_password", "users"."timezone" AS "A_timezone", "users"."created_at" AS "A_created_at", "users"."updated_at" AS "A_updated_at", "user_roles"."id" AS "B_id", "user_roles"."user_id" AS "B_user_id", "user_roles"."organization_id" AS "B_organization_id", "user_roles"."role" AS "B_role", "user_roles"."created_at" AS "B_created_at", "user_roles"."updated_at" AS "B_updated_at" FROM "bizops"."users" LEFT JOIN "bizops"."user_roles" ON "users"."id" = "user_roles"."user_id" WHERE "users"."email" = $1 ORDER BY "users"."id" ASC"#,
                ["test@test.com".into()]
            )]
        );

        Ok(())
    }

    #[tokio::test]
    async fn find_by_id_returns_the_user_with_roles() -> Result<(), Error> {
        let user_id = Id::new_v4();
        let now = Utc::now();
        let role = user_roles::Model {
            id: Id::new_v4(),
            user_id,
            organization_id: Some(Id::new_v4()),
            role: Role::Manager,
            created_at: now.into(),
            updated_at: now.into(),
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[(user_model(user_id), Some(role.clone()))]])
            .into_connection();

        let user = find_by_id(&db, user_id).await?;
        assert_eq!(user.id, user_id);
        assert_eq!(user.roles, vec![role]);

        Ok(())
    }

    #[tokio::test]
    async fn find_by_id_returns_not_found_when_missing() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<(Model, Option<user_roles::Model>)>::new()])
            .into_connection();

        let result = find_by_id(&db, Id::new_v4()).await;
        assert_eq!(
            result.unwrap_err().error_kind,
            EntityApiErrorKind::RecordNotFound
        );
    }

    #[tokio::test]
    async fn create_by_organization_grants_the_requested_role() -> Result<(), Error> {
        let now = Utc::now();
        let user_id = Id::new_v4();
        let organization_id = Id::new_v4();
        let user = user_model(user_id);

        let user_role_model = user_roles::Model {
            id: Id::new_v4(),
            user_id,
            organization_id: Some(organization_id),
            role: Role::TeamMember,
            created_at: now.into(),
            updated_at: now.into(),
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[user.clone()]])
            .append_query_results([[user_role_model.clone()]])
            .into_connection();

        let created =
            create_by_organization(&db, organization_id, user.clone(), Role::TeamMember).await?;

        assert_eq!(created.id, user.id);
        assert_eq!(created.roles.len(), 1);
        assert_eq!(created.roles[0].role, Role::TeamMember);

        Ok(())
    }

    #[tokio::test]
    async fn create_by_organization_returns_error_on_duplicate_email() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_errors([sea_orm::DbErr::Custom("Duplicate email".to_string())])
            .into_connection();

        let result =
            create_by_organization(&db, Id::new_v4(), user_model(Id::new_v4()), Role::Admin).await;
        assert!(result.is_err());
    }
}
