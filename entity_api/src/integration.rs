use super::error::Error;
use chrono::Utc;
use entity::integrations::{ActiveModel, Column, Entity, Model};
use entity::{provider::Provider, Id};
use sea_orm::{
    entity::prelude::*, ActiveValue::Set, ActiveValue::Unchanged, ConnectionTrait, QueryOrder,
};

use log::*;

/// Values to store for a provider. `credentials` must already be encrypted.
#[derive(Debug, Clone)]
pub struct IntegrationUpsert {
    pub credentials: String,
    pub credential_keys: Vec<String>,
    pub base_url: Option<String>,
    pub enabled: bool,
}

pub async fn find_by_organization(
    db: &impl ConnectionTrait,
    organization_id: Id,
) -> Result<Vec<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::OrganizationId.eq(organization_id))
        .order_by_asc(Column::Provider)
        .all(db)
        .await?)
}

pub async fn find_by_provider(
    db: &impl ConnectionTrait,
    organization_id: Id,
    provider: Provider,
) -> Result<Option<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::OrganizationId.eq(organization_id))
        .filter(Column::Provider.eq(provider))
        .one(db)
        .await?)
}

/// Inserts or replaces the organization's settings for `provider`.
pub async fn upsert(
    db: &impl ConnectionTrait,
    organization_id: Id,
    provider: Provider,
    values: IntegrationUpsert,
) -> Result<Model, Error> {
    let now = Utc::now();
    let credential_keys = serde_json::json!(values.credential_keys);

    match find_by_provider(db, organization_id, provider).await? {
        Some(existing) => {
            debug!("Replacing {provider} integration for organization {organization_id}");
            let active_model = ActiveModel {
                id: Unchanged(existing.id),
                organization_id: Unchanged(existing.organization_id),
                provider: Unchanged(existing.provider),
                credentials: Set(values.credentials),
                credential_keys: Set(credential_keys),
                base_url: Set(values.base_url),
                enabled: Set(values.enabled),
                created_at: Unchanged(existing.created_at),
                updated_at: Set(now.into()),
            };
            Ok(active_model.update(db).await?)
        }
        None => {
            debug!("Creating {provider} integration for organization {organization_id}");
            let active_model = ActiveModel {
                id: Set(Id::new_v4()),
                organization_id: Set(organization_id),
                provider: Set(provider),
                credentials: Set(values.credentials),
                credential_keys: Set(credential_keys),
                base_url: Set(values.base_url),
                enabled: Set(values.enabled),
                created_at: Set(now.into()),
                updated_at: Set(now.into()),
            };
            Ok(active_model.insert(db).await?)
        }
    }
}

pub async fn delete(
    db: &impl ConnectionTrait,
    organization_id: Id,
    provider: Provider,
) -> Result<(), Error> {
    match find_by_provider(db, organization_id, provider).await? {
        Some(existing) => {
            existing.delete(db).await?;
            info!("Removed {provider} integration for organization {organization_id}");
            Ok(())
        }
        None => Err(Error::not_found()),
    }
}

#[cfg(test)]
#[cfg(feature = "mock")]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn stored(organization_id: Id) -> Model {
        let now = Utc::now();
        Model {
            id: Id::new_v4(),
            organization_id,
            provider: Provider::Xero,
            credentials: "ciphertext".to_string(),
            credential_keys: serde_json::json!(["client_id", "client_secret", "tenant_id"]),
            base_url: None,
            enabled: true,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[tokio::test]
    async fn upsert_updates_an_existing_integration() -> Result<(), Error> {
        let organization_id = Id::new_v4();
        let existing = stored(organization_id);
        let replaced = Model {
            credentials: "new ciphertext".to_string(),
            ..existing.clone()
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[existing.clone()]])
            .append_query_results([[replaced.clone()]])
            .into_connection();

        let model = upsert(
            &db,
            organization_id,
            Provider::Xero,
            IntegrationUpsert {
                credentials: "new ciphertext".to_string(),
                credential_keys: vec!["client_id".to_string()],
                base_url: None,
                enabled: true,
            },
        )
        .await?;

        assert_eq!(model.id, existing.id);
        let log = format!("{:?}", db.into_transaction_log());
        assert!(log.contains("UPDATE"));

        Ok(())
    }

    #[tokio::test]
    async fn delete_reports_missing_integration_as_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<Model>::new()])
            .into_connection();

        let result = delete(&db, Id::new_v4(), Provider::Vapi).await;
        assert_eq!(
            result.unwrap_err().error_kind,
            crate::error::EntityApiErrorKind::RecordNotFound
        );
    }
}
