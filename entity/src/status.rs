use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Health of an objective or key result.
#[derive(
    Debug, Clone, Copy, Eq, PartialEq, EnumIter, Deserialize, Default, Serialize, DeriveActiveEnum, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum Status {
    #[sea_orm(string_value = "not_started")]
    #[default]
    NotStarted,
    #[sea_orm(string_value = "on_track")]
    OnTrack,
    #[sea_orm(string_value = "at_risk")]
    AtRisk,
    #[sea_orm(string_value = "off_track")]
    OffTrack,
    #[sea_orm(string_value = "completed")]
    Completed,
}

impl std::fmt::Display for Status {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::NotStarted => write!(fmt, "not_started"),
            Status::OnTrack => write!(fmt, "on_track"),
            Status::AtRisk => write!(fmt, "at_risk"),
            Status::OffTrack => write!(fmt, "off_track"),
            Status::Completed => write!(fmt, "completed"),
        }
    }
}
