use crate::{status::Status, Id};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = entity::key_results::Model)]
#[sea_orm(schema_name = "bizops", table_name = "key_results")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key)]
    pub id: Id,
    #[serde(skip_deserializing)]
    pub objective_id: Id,
    pub title: String,
    /// Display unit for the values, e.g. `%`, `customers`, `USD`.
    pub unit: Option<String>,
    #[serde(default)]
    pub start_value: f64,
    pub target_value: f64,
    #[serde(default)]
    pub current_value: f64,
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
        belongs_to = "super::objectives::Entity",
        from = "Column::ObjectiveId",
        to = "super::objectives::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Objectives,
}

impl Related<super::objectives::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Objectives.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
