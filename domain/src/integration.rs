//! The integrations hub: which external providers an organization has
//! connected, with their credentials sealed at rest.

use crate::encryption::Cipher;
use crate::error::Error;
use crate::provider::Provider;
use crate::{integrations, Id};
use chrono::{DateTime, FixedOffset};
use entity_api::integration::{self, IntegrationUpsert};
use log::*;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use service::config::Config;
use std::collections::BTreeMap;
use std::str::FromStr;
use utoipa::ToSchema;

/// What a provider needs before it can be used.
#[derive(Debug)]
pub struct ProviderDefinition {
    pub provider: Provider,
    pub display_name: &'static str,
    pub required_keys: &'static [&'static str],
    pub requires_base_url: bool,
}

pub static CATALOG: &[ProviderDefinition] = &[
    ProviderDefinition {
        provider: Provider::Splynx,
        display_name: "Splynx",
        required_keys: &["api_key", "api_secret"],
        requires_base_url: true,
    },
    ProviderDefinition {
        provider: Provider::Firebase,
        display_name: "Firebase",
        required_keys: &["project_id", "service_account_json"],
        requires_base_url: false,
    },
    ProviderDefinition {
        provider: Provider::Xero,
        display_name: "Xero",
        required_keys: &["client_id", "client_secret", "tenant_id"],
        requires_base_url: false,
    },
    ProviderDefinition {
        provider: Provider::GoogleMaps,
        display_name: "Google Maps",
        required_keys: &["api_key"],
        requires_base_url: false,
    },
    ProviderDefinition {
        provider: Provider::Airtable,
        display_name: "Airtable",
        required_keys: &["api_key", "base_id"],
        requires_base_url: false,
    },
    ProviderDefinition {
        provider: Provider::Vapi,
        display_name: "Vapi",
        required_keys: &["api_key"],
        requires_base_url: false,
    },
];

pub fn definition(provider: Provider) -> &'static ProviderDefinition {
    CATALOG
        .iter()
        .find(|definition| definition.provider == provider)
        .unwrap_or(&CATALOG[0])
}

/// Parses a provider path segment. Unknown providers are reported as not found.
pub fn parse_provider(value: &str) -> Result<Provider, Error> {
    Provider::from_str(value).map_err(|_| {
        debug!("Unknown integration provider {value}");
        Error::not_found()
    })
}

/// Credentials and settings submitted for a provider.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct IntegrationSettings {
    /// Secret values keyed by name, e.g. `api_key`.
    pub credentials: BTreeMap<String, String>,
    pub base_url: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

/// A provider's connection state. Never carries secret values.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct IntegrationStatus {
    pub provider: Provider,
    pub display_name: String,
    pub required_keys: Vec<String>,
    pub configured: bool,
    pub enabled: bool,
    /// Names of the stored credentials.
    pub credential_keys: Vec<String>,
    pub base_url: Option<String>,
    #[schema(value_type = Option<String>, format = DateTime)]
    pub created_at: Option<DateTime<FixedOffset>>,
    #[schema(value_type = Option<String>, format = DateTime)]
    pub updated_at: Option<DateTime<FixedOffset>>,
}

impl IntegrationStatus {
    fn unconfigured(definition: &ProviderDefinition) -> Self {
        Self {
            provider: definition.provider,
            display_name: definition.display_name.to_string(),
            required_keys: definition
                .required_keys
                .iter()
                .map(|key| key.to_string())
                .collect(),
            configured: false,
            enabled: false,
            credential_keys: Vec::new(),
            base_url: None,
            created_at: None,
            updated_at: None,
        }
    }

    fn from_model(model: integrations::Model) -> Self {
        let credential_keys: Vec<String> =
            serde_json::from_value(model.credential_keys).unwrap_or_default();
        Self {
            configured: true,
            enabled: model.enabled,
            credential_keys,
            base_url: model.base_url,
            created_at: Some(model.created_at),
            updated_at: Some(model.updated_at),
            ..Self::unconfigured(definition(model.provider))
        }
    }
}

/// Checks the submitted settings against the provider's requirements.
pub fn validate(provider: Provider, settings: &IntegrationSettings) -> Result<(), Error> {
    let definition = definition(provider);

    let missing: Vec<&str> = definition
        .required_keys
        .iter()
        .copied()
        .filter(|key| {
            settings
                .credentials
                .get(*key)
                .map(|value| value.trim().is_empty())
                .unwrap_or(true)
        })
        .collect();
    if !missing.is_empty() {
        return Err(Error::validation(format!(
            "{} requires credentials: {}",
            definition.display_name,
            missing.join(", ")
        )));
    }

    match settings.base_url.as_deref().map(str::trim) {
        Some(url) if !url.is_empty() => {
            if !(url.starts_with("https://") || url.starts_with("http://")) {
                return Err(Error::validation("base_url must be an http(s) URL"));
            }
        }
        _ if definition.requires_base_url => {
            return Err(Error::validation(format!(
                "{} requires a base_url",
                definition.display_name
            )));
        }
        _ => {}
    }

    Ok(())
}

/// Every provider in the catalog with the organization's connection state.
pub async fn find_statuses(
    db: &DatabaseConnection,
    organization_id: Id,
) -> Result<Vec<IntegrationStatus>, Error> {
    let mut stored: Vec<integrations::Model> =
        integration::find_by_organization(db, organization_id).await?;

    Ok(CATALOG
        .iter()
        .map(|definition| {
            match stored
                .iter()
                .position(|model| model.provider == definition.provider)
            {
                Some(index) => IntegrationStatus::from_model(stored.swap_remove(index)),
                None => IntegrationStatus::unconfigured(definition),
            }
        })
        .collect())
}

pub async fn find_status(
    db: &DatabaseConnection,
    organization_id: Id,
    provider: Provider,
) -> Result<IntegrationStatus, Error> {
    Ok(
        match integration::find_by_provider(db, organization_id, provider).await? {
            Some(model) => IntegrationStatus::from_model(model),
            None => IntegrationStatus::unconfigured(definition(provider)),
        },
    )
}

/// Validates, seals and stores the provider's settings, replacing any
/// previous ones.
pub async fn upsert(
    db: &DatabaseConnection,
    config: &Config,
    organization_id: Id,
    provider: Provider,
    settings: IntegrationSettings,
) -> Result<IntegrationStatus, Error> {
    validate(provider, &settings)?;

    let cipher = Cipher::from_config(config).map_err(|err| {
        error!("Cannot store {provider} credentials: {err}");
        Error::from(err)
    })?;
    let credentials = cipher.seal_json(&settings.credentials)?;

    let model = integration::upsert(
        db,
        organization_id,
        provider,
        IntegrationUpsert {
            credentials,
            credential_keys: settings.credentials.keys().cloned().collect(),
            base_url: settings
                .base_url
                .map(|url| url.trim().trim_end_matches('/').to_string())
                .filter(|url| !url.is_empty()),
            enabled: settings.enabled,
        },
    )
    .await?;

    info!("Stored {provider} integration for organization {organization_id}");
    Ok(IntegrationStatus::from_model(model))
}

pub async fn delete(
    db: &DatabaseConnection,
    organization_id: Id,
    provider: Provider,
) -> Result<(), Error> {
    Ok(integration::delete(db, organization_id, provider).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DomainErrorKind, InternalErrorKind};

    fn settings(pairs: &[(&str, &str)], base_url: Option<&str>) -> IntegrationSettings {
        IntegrationSettings {
            credentials: pairs
                .iter()
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .collect(),
            base_url: base_url.map(str::to_string),
            enabled: true,
        }
    }

    fn validation_message(err: Error) -> String {
        match err.error_kind {
            DomainErrorKind::Internal(InternalErrorKind::Validation(message)) => message,
            other => panic!("expected a validation error, got {other:?}"),
        }
    }

    #[test]
    fn every_provider_is_in_the_catalog() {
        use sea_orm::strum::IntoEnumIterator;
        for provider in Provider::iter() {
            assert_eq!(definition(provider).provider, provider);
        }
    }

    #[test]
    fn missing_keys_are_listed() {
        let err = validate(Provider::Xero, &settings(&[("client_id", "abc")], None)).unwrap_err();
        assert_eq!(
            validation_message(err),
            "Xero requires credentials: client_secret, tenant_id"
        );
    }

    #[test]
    fn blank_values_count_as_missing() {
        assert!(validate(Provider::Vapi, &settings(&[("api_key", "  ")], None)).is_err());
        assert!(validate(Provider::Vapi, &settings(&[("api_key", "k")], None)).is_ok());
    }

    #[test]
    fn splynx_needs_a_base_url() {
        let credentials = [("api_key", "k"), ("api_secret", "s")];
        assert!(validate(Provider::Splynx, &settings(&credentials, None)).is_err());
        assert!(validate(
            Provider::Splynx,
            &settings(&credentials, Some("isp.splynx.example"))
        )
        .is_err());
        assert!(validate(
            Provider::Splynx,
            &settings(&credentials, Some("https://isp.splynx.example"))
        )
        .is_ok());
    }

    #[test]
    fn unknown_providers_are_not_found() {
        assert_eq!(parse_provider("google-maps").unwrap(), Provider::GoogleMaps);
        let err = parse_provider("salesforce").unwrap_err();
        assert_eq!(err.error_kind, Error::not_found().error_kind);
    }

    #[test]
    fn statuses_never_serialize_secrets() {
        let mut status = IntegrationStatus::unconfigured(definition(Provider::Airtable));
        status.credential_keys = vec!["api_key".to_string(), "base_id".to_string()];
        let json = serde_json::to_string(&status).unwrap();

        assert!(json.contains("\"required_keys\":[\"api_key\",\"base_id\"]"));
        assert!(!json.contains("credentials\""));
    }
}

#[cfg(test)]
#[cfg(feature = "mock")]
mod mock_tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    const TEST_KEY: &str = "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";

    fn stored(organization_id: Id, provider: Provider) -> integrations::Model {
        let now = Utc::now();
        integrations::Model {
            id: Id::new_v4(),
            organization_id,
            provider,
            credentials: "sealed".to_string(),
            credential_keys: serde_json::json!(["api_key"]),
            base_url: None,
            enabled: true,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[tokio::test]
    async fn statuses_cover_the_whole_catalog() -> Result<(), Error> {
        let organization_id = Id::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![stored(organization_id, Provider::Vapi)]])
            .into_connection();

        let statuses = find_statuses(&db, organization_id).await?;

        assert_eq!(statuses.len(), CATALOG.len());
        let vapi = statuses
            .iter()
            .find(|status| status.provider == Provider::Vapi)
            .unwrap();
        assert!(vapi.configured);
        assert_eq!(vapi.credential_keys, vec!["api_key".to_string()]);
        assert_eq!(
            statuses.iter().filter(|status| status.configured).count(),
            1
        );
        Ok(())
    }

    #[tokio::test]
    async fn upsert_stores_sealed_credentials() -> Result<(), Error> {
        let organization_id = Id::new_v4();
        let config = Config::from_env().set_encryption_key(TEST_KEY.to_string());
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<integrations::Model>::new()])
            .append_query_results([vec![stored(organization_id, Provider::Vapi)]])
            .into_connection();

        let status = upsert(
            &db,
            &config,
            organization_id,
            Provider::Vapi,
            IntegrationSettings {
                credentials: BTreeMap::from([("api_key".to_string(), "vapi-secret".to_string())]),
                base_url: None,
                enabled: true,
            },
        )
        .await?;

        assert!(status.configured);
        let log = format!("{:?}", db.into_transaction_log());
        assert!(!log.contains("vapi-secret"));
        Ok(())
    }
}
