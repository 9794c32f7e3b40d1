use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;

/// External platforms an organization can connect.
#[derive(
    Debug,
    Clone,
    Copy,
    Eq,
    PartialEq,
    Hash,
    EnumIter,
    Deserialize,
    Serialize,
    DeriveActiveEnum,
    ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum Provider {
    #[sea_orm(string_value = "splynx")]
    Splynx,
    #[sea_orm(string_value = "firebase")]
    Firebase,
    #[sea_orm(string_value = "xero")]
    Xero,
    #[sea_orm(string_value = "google_maps")]
    GoogleMaps,
    #[sea_orm(string_value = "airtable")]
    Airtable,
    #[sea_orm(string_value = "vapi")]
    Vapi,
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Splynx => write!(f, "splynx"),
            Self::Firebase => write!(f, "firebase"),
            Self::Xero => write!(f, "xero"),
            Self::GoogleMaps => write!(f, "google_maps"),
            Self::Airtable => write!(f, "airtable"),
            Self::Vapi => write!(f, "vapi"),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct ProviderParseError;

impl FromStr for Provider {
    type Err = ProviderParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().replace('-', "_").as_str() {
            "splynx" => Ok(Self::Splynx),
            "firebase" => Ok(Self::Firebase),
            "xero" => Ok(Self::Xero),
            "google_maps" => Ok(Self::GoogleMaps),
            "airtable" => Ok(Self::Airtable),
            "vapi" => Ok(Self::Vapi),
            _ => Err(ProviderParseError),
        }
    }
}
