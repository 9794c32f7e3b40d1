//! Stored connection settings for an external provider.

use crate::{provider::Provider, Id};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// `credentials` holds the AES-GCM encrypted JSON object of secrets, so this
/// model is never serialized to clients directly.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(schema_name = "bizops", table_name = "integrations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Id,
    pub organization_id: Id,
    pub provider: Provider,
    #[serde(skip_serializing)]
    pub credentials: String,
    /// Names of the stored credential keys, kept in the clear for display.
    pub credential_keys: Json,
    pub base_url: Option<String>,
    pub enabled: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::organizations::Entity",
        from = "Column::OrganizationId",
        to = "super::organizations::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Organizations,
}

impl Related<super::organizations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Organizations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
