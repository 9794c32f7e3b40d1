use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize, ToSchema)]
#[schema(as = entity::organizations::Model)]
#[sea_orm(schema_name = "bizops", table_name = "organizations")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key)]
    pub id: Id,
    pub name: String,
    pub logo: Option<String>,
    #[serde(skip_deserializing)]
    #[sea_orm(unique)]
    pub slug: String,
    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTimeWithTimeZone,
    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::user_roles::Entity")]
    UserRoles,
    #[sea_orm(has_many = "super::teams::Entity")]
    Teams,
    #[sea_orm(has_many = "super::customers::Entity")]
    Customers,
    #[sea_orm(has_many = "super::tickets::Entity")]
    Tickets,
    #[sea_orm(has_many = "super::objectives::Entity")]
    Objectives,
    #[sea_orm(has_many = "super::kb_articles::Entity")]
    KbArticles,
    #[sea_orm(has_many = "super::email_templates::Entity")]
    EmailTemplates,
    #[sea_orm(has_many = "super::bookable_task_types::Entity")]
    BookableTaskTypes,
    #[sea_orm(has_many = "super::integrations::Entity")]
    Integrations,
}

impl Related<super::user_roles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserRoles.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        super::user_roles::Relation::Users.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::user_roles::Relation::Organizations.def().rev())
    }
}

impl Related<super::teams::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Teams.def()
    }
}

impl Related<super::customers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customers.def()
    }
}

impl Related<super::tickets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tickets.def()
    }
}

impl Related<super::objectives::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Objectives.def()
    }
}

impl Related<super::kb_articles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::KbArticles.def()
    }
}

impl Related<super::email_templates::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EmailTemplates.def()
    }
}

impl Related<super::bookable_task_types::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BookableTaskTypes.def()
    }
}

impl Related<super::integrations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Integrations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
