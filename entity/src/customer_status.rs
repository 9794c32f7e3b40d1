use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, Eq, PartialEq, EnumIter, Deserialize, Default, Serialize, DeriveActiveEnum, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum CustomerStatus {
    #[sea_orm(string_value = "lead")]
    #[default]
    Lead,
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "inactive")]
    Inactive,
    #[sea_orm(string_value = "churned")]
    Churned,
}

impl std::fmt::Display for CustomerStatus {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CustomerStatus::Lead => write!(fmt, "lead"),
            CustomerStatus::Active => write!(fmt, "active"),
            CustomerStatus::Inactive => write!(fmt, "inactive"),
            CustomerStatus::Churned => write!(fmt, "churned"),
        }
    }
}
