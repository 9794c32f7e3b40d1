use super::error::Error;
use chrono::Utc;
use entity::{organizations::*, prelude::Organizations, user_roles, Id};
use sea_orm::{
    entity::prelude::*, ActiveValue::Set, ConnectionTrait, JoinType, QueryOrder, QuerySelect,
};
use slugify::slugify;

use log::*;

pub async fn create(db: &impl ConnectionTrait, organization_model: Model) -> Result<Model, Error> {
    debug!("New Organization Model to be inserted: {organization_model:?}");

    let now = Utc::now();
    let name = organization_model.name;

    let organization_active_model: ActiveModel = ActiveModel {
        logo: Set(organization_model.logo),
        slug: Set(slugify!(name.as_str())),
        name: Set(name),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    };

    Ok(organization_active_model.insert(db).await?)
}

pub async fn delete_by_id(db: &impl ConnectionTrait, id: Id) -> Result<(), Error> {
    let organization_model = find_by_id(db, id).await?;
    organization_model.delete(db).await?;
    Ok(())
}

pub async fn find_all(db: &impl ConnectionTrait) -> Result<Vec<Model>, Error> {
    Ok(Entity::find().order_by_asc(Column::Name).all(db).await?)
}

pub async fn find_by_id(db: &impl ConnectionTrait, id: Id) -> Result<Model, Error> {
    Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(Error::not_found)
}

/// Organizations in which the user holds at least one role.
pub async fn find_by_user(db: &impl ConnectionTrait, user_id: Id) -> Result<Vec<Model>, Error> {
    let organizations = by_user(Entity::find(), user_id)
        .order_by_asc(Column::Name)
        .all(db)
        .await?;

    Ok(organizations)
}

fn by_user(query: Select<Organizations>, user_id: Id) -> Select<Organizations> {
    query
        .join(JoinType::InnerJoin, Relation::UserRoles.def())
        .filter(user_roles::Column::UserId.eq(user_id))
        .distinct()
}

#[cfg(test)]
// We need to gate seaORM's mock feature behind conditional compilation because
// the feature removes the Clone trait implementation from seaORM's DatabaseConnection.
// see https://github.com/SeaQL/sea-orm/issues/830
#[cfg(feature = "mock")]
mod tests {
    use super::*;
    use entity::{organizations, Id};
    use sea_orm::{DatabaseBackend, MockDatabase, Transaction};

    #[tokio::test]
    async fn find_all_returns_a_list_of_records_when_present() -> Result<(), Error> {
        let now = Utc::now();
        let organizations = vec![vec![
            organizations::Model {
                id: Id::new_v4(),
                name: "Northwind Fibre".to_owned(),
                slug: "northwind-fibre".to_owned(),
                created_at: now.into(),
                updated_at: now.into(),
                logo: None,
            },
            organizations::Model {
                id: Id::new_v4(),
                name: "Southgate Wireless".to_owned(),
                slug: "southgate-wireless".to_owned(),
                created_at: now.into(),
                updated_at: now.into(),
                logo: None,
            },
        ]];
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(organizations.clone())
            .into_connection();

        assert_eq!(find_all(&db).await?, organizations[0]);

        Ok(())
    }

    #[tokio::test]
    async fn create_derives_the_slug_from_the_name() -> Result<(), Error> {
        let now = Utc::now();
        let model = organizations::Model {
            id: Id::new_v4(),
            name: "Northwind Fibre".to_owned(),
            slug: String::new(),
            logo: None,
            created_at: now.into(),
            updated_at: now.into(),
        };
        let stored = organizations::Model {
            slug: "northwind-fibre".to_owned(),
            ..model.clone()
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[stored.clone()]])
            .into_connection();

        let organization = create(&db, model).await?;
        assert_eq!(organization.slug, "northwind-fibre");

        let log = db.into_transaction_log();
        assert!(format!("{log:?}").contains("northwind-fibre"));

        Ok(())
    }

    #[tokio::test]
    async fn find_by_user_joins_through_user_roles() -> Result<(), Error> {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<organizations::Model>::new()])
            .into_connection();

        let user_id = Id::new_v4();
        find_by_user(&db, user_id).await?;

        assert_eq!(
            db.into_transaction_log(),
            [Transaction::from_sql_and_values(
                DatabaseBackend::Postgres,
                r#"SELECT DISTINCT "organizations"."id", "organizations"."name", "organizations"."logo", "organizations"."slug", "organizations"."created_at", "organizations"."updated_at" FROM "bizops"."organizations" INNER JOIN "bizops"."user_roles" ON "organizations"."id" = "user_roles"."organization_id" WHERE "user_roles"."user_id" = $1 ORDER BY "organizations"."name" ASC"#,
                [user_id.into()]
            )]
        );

        Ok(())
    }
}
