use crate::error::Error;
use crate::{organizations, strip_immutable, string_value, users, IntoUpdateMap};
use crate::{user, Id};
use entity_api::{mutate, organization};
use log::*;
use sea_orm::{DatabaseConnection, IntoActiveModel};

pub use entity_api::organization::{delete_by_id, find_by_id};

/// Organizations visible to the user: every organization for a super admin,
/// otherwise those the user holds a role in.
pub async fn find_for_user(
    db: &DatabaseConnection,
    user: &users::Model,
) -> Result<Vec<organizations::Model>, Error> {
    let organizations = if user::is_super_admin(user) {
        organization::find_all(db).await?
    } else {
        organization::find_by_user(db, user.id).await?
    };
    Ok(organizations)
}

pub async fn create(
    db: &DatabaseConnection,
    organization_model: organizations::Model,
) -> Result<organizations::Model, Error> {
    crate::require_text("name", &organization_model.name)?;

    let organization = organization::create(db, organization_model).await?;
    info!(
        "Created organization {} ({})",
        organization.id, organization.slug
    );
    Ok(organization)
}

/// Renames or re-brands the organization. The slug is fixed at creation.
pub async fn update(
    db: &DatabaseConnection,
    id: Id,
    params: impl IntoUpdateMap,
) -> Result<organizations::Model, Error> {
    let mut update_map = strip_immutable(params.into_update_map());
    update_map.remove("slug");

    if let Some(name) = string_value(&update_map, "name") {
        crate::require_text("name", name)?;
    }

    let existing = find_by_id(db, id).await?;
    Ok(
        mutate::update::<organizations::ActiveModel, organizations::Column>(
            db,
            existing.into_active_model(),
            update_map,
        )
        .await?,
    )
}

#[cfg(test)]
#[cfg(feature = "mock")]
mod tests {
    use super::*;
    use crate::UpdateMap;
    use sea_orm::Value;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    struct Rename(&'static str);

    impl IntoUpdateMap for Rename {
        fn into_update_map(self) -> UpdateMap {
            let mut update_map = UpdateMap::new();
            update_map.insert(
                "name".to_string(),
                Some(Value::String(Some(Box::new(self.0.to_string())))),
            );
            update_map.insert(
                "slug".to_string(),
                Some(Value::String(Some(Box::new("hijacked".to_string())))),
            );
            update_map
        }
    }

    fn organization(name: &str, slug: &str) -> organizations::Model {
        let now = Utc::now();
        organizations::Model {
            id: Id::new_v4(),
            name: name.to_string(),
            logo: None,
            slug: slug.to_string(),
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[tokio::test]
    async fn blank_names_are_rejected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let err = create(&db, organization("  ", "")).await.unwrap_err();
        assert!(matches!(
            err.error_kind,
            crate::error::DomainErrorKind::Internal(
                crate::error::InternalErrorKind::Validation(_)
            )
        ));
    }

    #[tokio::test]
    async fn renaming_keeps_the_slug() -> Result<(), Error> {
        let existing = organization("Northwind", "northwind");
        let mut renamed = existing.clone();
        renamed.name = "Northwind Fibre".to_string();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![existing.clone()], vec![renamed.clone()]])
            .into_connection();

        let updated = update(&db, existing.id, Rename("Northwind Fibre")).await?;
        assert_eq!(updated.slug, "northwind");

        let log = db.into_transaction_log();
        let update_sql = format!("{:?}", log[1]);
        assert!(!update_sql.contains("hijacked"));
        Ok(())
    }
}
