use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Platform roles, from most to least privileged.
///
/// `SuperAdmin` is platform-wide and is stored without an organization. Every
/// other role is granted per organization.
#[derive(
    Debug,
    Clone,
    Copy,
    Eq,
    PartialEq,
    Hash,
    EnumIter,
    Deserialize,
    Default,
    Serialize,
    DeriveActiveEnum,
    ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum Role {
    #[sea_orm(string_value = "super_admin")]
    SuperAdmin,
    #[sea_orm(string_value = "admin")]
    Admin,
    #[sea_orm(string_value = "manager")]
    Manager,
    #[sea_orm(string_value = "team_member")]
    #[default]
    TeamMember,
}

impl Role {
    /// Numeric privilege level; higher outranks lower.
    pub fn rank(&self) -> u8 {
        match self {
            Role::SuperAdmin => 4,
            Role::Admin => 3,
            Role::Manager => 2,
            Role::TeamMember => 1,
        }
    }

    pub fn is_at_least(&self, other: Role) -> bool {
        self.rank() >= other.rank()
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::SuperAdmin => write!(fmt, "super_admin"),
            Role::Admin => write!(fmt, "admin"),
            Role::Manager => write!(fmt, "manager"),
            Role::TeamMember => write!(fmt, "team_member"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_rank_from_super_admin_down() {
        assert!(Role::SuperAdmin.is_at_least(Role::Admin));
        assert!(Role::Admin.is_at_least(Role::Manager));
        assert!(Role::Manager.is_at_least(Role::TeamMember));
        assert!(Role::Manager.is_at_least(Role::Manager));
        assert!(!Role::TeamMember.is_at_least(Role::Manager));
        assert!(!Role::Admin.is_at_least(Role::SuperAdmin));
    }

    #[test]
    fn role_serializes_as_snake_case() {
        assert_eq!(
            serde_json::to_string(&Role::SuperAdmin).unwrap(),
            "\"super_admin\""
        );
        assert_eq!(
            serde_json::from_str::<Role>("\"team_member\"").unwrap(),
            Role::TeamMember
        );
    }
}
