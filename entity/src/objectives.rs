use crate::{status::Status, Id};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize, ToSchema)]
#[schema(as = entity::objectives::Model)]
#[sea_orm(schema_name = "bizops", table_name = "objectives")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key)]
    pub id: Id,
    #[serde(skip_deserializing)]
    pub organization_id: Id,
    pub title: String,
    pub description: Option<String>,
    /// Free-form planning period label, e.g. `2026-Q4`.
    pub period: String,
    #[schema(value_type = Option<String>, format = Uuid)]
    pub owner_id: Option<Id>,
    #[schema(value_type = Option<String>, format = Uuid)]
    pub team_id: Option<Id>,
    #[serde(default)]
    pub status: Status,
    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTimeWithTimeZone,
    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
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
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::OwnerId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Owner,
    #[sea_orm(
        belongs_to = "super::teams::Entity",
        from = "Column::TeamId",
        to = "super::teams::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Teams,
    #[sea_orm(has_many = "super::key_results::Entity")]
    KeyResults,
}

impl Related<super::organizations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Organizations.def()
    }
}

impl Related<super::key_results::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::KeyResults.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
