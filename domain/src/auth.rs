//! Login and bearer token authentication.

use crate::error::{DomainErrorKind, EntityErrorKind, Error, InternalErrorKind};
use crate::jwt::{self, Jwt};
use crate::roles::Role;
use crate::{user, users, Id};
use entity_api::organization;
use log::*;
use sea_orm::DatabaseConnection;
use service::config::Config;

/// The authenticated caller and the organization the request acts within.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: users::Model,
    pub organization_id: Option<Id>,
}

impl Session {
    pub fn is_super_admin(&self) -> bool {
        user::is_super_admin(&self.user)
    }

    pub fn has_role_at_least(&self, role: Role) -> bool {
        user::has_role_at_least(&self.user, self.organization_id, role)
    }

    /// The caller's role in the active organization. Super admins report
    /// `super_admin` regardless of their organization seat.
    pub fn role(&self) -> Option<Role> {
        if self.is_super_admin() {
            return Some(Role::SuperAdmin);
        }
        self.organization_id
            .and_then(|organization_id| user::role_in(&self.user, organization_id))
    }

    /// The active organization, or forbidden when the caller has none.
    pub fn require_organization(&self) -> Result<Id, Error> {
        self.organization_id.ok_or_else(|| {
            debug!("User {} has no active organization", self.user.id);
            Error::forbidden()
        })
    }
}

fn unauthenticated_on_missing_user(err: Error) -> Error {
    match err.error_kind {
        DomainErrorKind::Internal(InternalErrorKind::Entity(EntityErrorKind::NotFound)) => {
            Error::unauthenticated()
        }
        _ => err,
    }
}

/// Picks the organization a session acts within. An explicit choice must be
/// one of the user's organizations unless they are a super admin; otherwise
/// the user's oldest organization is used.
async fn resolve_organization(
    db: &DatabaseConnection,
    user: &users::Model,
    requested: Option<Id>,
) -> Result<Option<Id>, Error> {
    match requested {
        Some(organization_id) if user::belongs_to(user, organization_id) => {
            Ok(Some(organization_id))
        }
        Some(organization_id) if user::is_super_admin(user) => {
            organization::find_by_id(db, organization_id).await?;
            Ok(Some(organization_id))
        }
        Some(organization_id) => {
            warn!(
                "User {} requested organization {organization_id} without a role in it",
                user.id
            );
            Err(Error::forbidden())
        }
        None => Ok(user::organization_ids(user).into_iter().next()),
    }
}

/// Verifies the credentials and issues a bearer token.
pub async fn login(
    db: &DatabaseConnection,
    config: &Config,
    email: &str,
    password: &str,
    organization_id: Option<Id>,
) -> Result<(Jwt, Session), Error> {
    let user = match user::find_by_email(db, email).await? {
        Some(user) => user,
        None => {
            info!("Login attempt for unknown email");
            return Err(Error::unauthenticated());
        }
    };

    if user::verify_password(password, &user.password).is_err() {
        info!("Login attempt with a wrong password for user {}", user.id);
        return Err(Error::unauthenticated());
    }

    let organization_id = resolve_organization(db, &user, organization_id).await?;
    let jwt = jwt::issue(config, user.id, organization_id)?;

    info!("User {} logged in", user.id);
    Ok((
        jwt,
        Session {
            user,
            organization_id,
        },
    ))
}

/// Resolves a bearer token into a session. `organization_override` comes from
/// the `x-organization-id` header and replaces the token's organization.
pub async fn authenticate(
    db: &DatabaseConnection,
    config: &Config,
    token: &str,
    organization_override: Option<Id>,
) -> Result<Session, Error> {
    let claims = jwt::verify(config, token)?;

    let user = user::find_by_id(db, claims.sub)
        .await
        .map_err(|err| unauthenticated_on_missing_user(err.into()))?;

    let organization_id = match organization_override {
        Some(_) => resolve_organization(db, &user, organization_override).await?,
        // A revoked seat silently drops the organization from the session.
        None => claims.org.filter(|organization_id| {
            user::belongs_to(&user, *organization_id) || user::is_super_admin(&user)
        }),
    };

    Ok(Session {
        user,
        organization_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user_roles;
    use chrono::Utc;

    fn session(roles: Vec<(Option<Id>, Role)>, organization_id: Option<Id>) -> Session {
        let now = Utc::now();
        let user_id = Id::new_v4();
        Session {
            user: users::Model {
                id: user_id,
                email: "manager@northwind.dev".to_string(),
                first_name: "Morgan".to_string(),
                last_name: "Lee".to_string(),
                display_name: None,
                password: String::new(),
                timezone: "UTC".to_string(),
                created_at: now.into(),
                updated_at: now.into(),
                roles: roles
                    .into_iter()
                    .map(|(organization_id, role)| user_roles::Model {
                        id: Id::new_v4(),
                        user_id,
                        organization_id,
                        role,
                        created_at: now.into(),
                        updated_at: now.into(),
                    })
                    .collect(),
            },
            organization_id,
        }
    }

    #[test]
    fn sessions_without_an_organization_are_forbidden_on_tenant_routes() {
        let session = session(vec![], None);
        let err = session.require_organization().unwrap_err();
        assert_eq!(
            err.error_kind,
            DomainErrorKind::Internal(InternalErrorKind::Forbidden)
        );
    }

    #[test]
    fn session_role_reflects_the_active_organization() {
        let organization_id = Id::new_v4();
        let session = session(
            vec![(Some(organization_id), Role::Manager)],
            Some(organization_id),
        );

        assert_eq!(session.role(), Some(Role::Manager));
        assert!(session.has_role_at_least(Role::TeamMember));
        assert!(!session.has_role_at_least(Role::Admin));
    }

    #[test]
    fn super_admin_sessions_report_super_admin() {
        let session = session(vec![(None, Role::SuperAdmin)], None);
        assert_eq!(session.role(), Some(Role::SuperAdmin));
        assert!(session.has_role_at_least(Role::Admin));
    }
}

#[cfg(test)]
#[cfg(feature = "mock")]
mod mock_tests {
    use super::*;
    use crate::user_roles;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn config() -> Config {
        Config::from_env().set_jwt_signing_key("test-signing-key".to_string())
    }

    fn stored_user(password: &str) -> users::Model {
        let now = Utc::now();
        users::Model {
            id: Id::new_v4(),
            email: "tech@northwind.dev".to_string(),
            first_name: "Taylor".to_string(),
            last_name: "Nguyen".to_string(),
            display_name: None,
            password: entity_api::user::generate_hash(password.to_string()),
            timezone: "UTC".to_string(),
            created_at: now.into(),
            updated_at: now.into(),
            roles: vec![],
        }
    }

    fn grant(user_id: Id, organization_id: Id, role: Role) -> user_roles::Model {
        let now = Utc::now();
        user_roles::Model {
            id: Id::new_v4(),
            user_id,
            organization_id: Some(organization_id),
            role,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[tokio::test]
    async fn login_issues_a_token_for_the_users_organization() -> Result<(), Error> {
        let user = stored_user("password");
        let organization_id = Id::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![(
                user.clone(),
                Some(grant(user.id, organization_id, Role::TeamMember)),
            )]])
            .into_connection();
        let config = config();

        let (jwt, session) = login(&db, &config, "Tech@Northwind.dev", "password", None).await?;

        assert_eq!(session.organization_id, Some(organization_id));
        let claims = jwt::verify(&config, &jwt.token)?;
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.org, Some(organization_id));
        Ok(())
    }

    #[tokio::test]
    async fn login_rejects_a_wrong_password() {
        let user = stored_user("password");
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![(user, None::<user_roles::Model>)]])
            .into_connection();

        let err = login(&db, &config(), "tech@northwind.dev", "nope", None)
            .await
            .unwrap_err();

        assert_eq!(err.error_kind, Error::unauthenticated().error_kind);
    }

    #[tokio::test]
    async fn login_rejects_an_unknown_email() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<(users::Model, Option<user_roles::Model>)>::new()])
            .into_connection();

        let err = login(&db, &config(), "nobody@northwind.dev", "password", None)
            .await
            .unwrap_err();

        assert_eq!(err.error_kind, Error::unauthenticated().error_kind);
    }

    #[tokio::test]
    async fn tokens_for_deleted_users_are_unauthenticated() {
        let config = config();
        let jwt = jwt::issue(&config, Id::new_v4(), None).unwrap();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<(users::Model, Option<user_roles::Model>)>::new()])
            .into_connection();

        let err = authenticate(&db, &config, &jwt.token, None)
            .await
            .unwrap_err();

        assert_eq!(err.error_kind, Error::unauthenticated().error_kind);
    }

    #[tokio::test]
    async fn members_cannot_switch_into_foreign_organizations() {
        let config = config();
        let user = stored_user("password");
        let home = Id::new_v4();
        let jwt = jwt::issue(&config, user.id, Some(home)).unwrap();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![(
                user.clone(),
                Some(grant(user.id, home, Role::Admin)),
            )]])
            .into_connection();

        let err = authenticate(&db, &config, &jwt.token, Some(Id::new_v4()))
            .await
            .unwrap_err();

        assert_eq!(err.error_kind, Error::forbidden().error_kind);
    }
}
