//! Authorization guards for the routes in [`crate::router`].
//!
//! Each guard is an axum middleware that runs after
//! [`crate::middleware::auth::require_auth`] and evaluates one or more
//! [`Predicate`]s against the request's [`Session`]. Any failing predicate
//! aborts the request with 403 before the handler runs. The generic role
//! guards in this module cover most routes; the submodules hold guards that
//! also depend on path parameters.

pub(crate) mod organizations;
pub(crate) mod users;

use crate::extractors::authenticated_user::AuthenticatedUser;
use crate::Error;
use axum::{extract::Request, middleware::Next, response::IntoResponse, response::Response};
use domain::{auth::Session, error::Error as DomainError, roles::Role, user as UserApi, Id};
use log::*;

/// Trait representing a single authorization rule.
///
/// Implementors answer **"is the authenticated user allowed to proceed?"**
/// given the request's [`Session`] and any [`Id`] arguments supplied by the
/// guard, usually taken from the path.
///
/// Example:
/// ```rust,ignore
/// impl Check for IsSuperAdmin {
///     fn eval(&self, session: &Session, _args: &[Id]) -> bool {
///         session.is_super_admin()
///     }
/// }
/// ```
pub trait Check: Send + Sync {
    fn eval(&self, session: &Session, args: &[Id]) -> bool;
}

/// Pairs a [`Check`] implementation with the concrete arguments that the rule
/// should receive when evaluated.
/// ```rust,ignore
/// let checks = vec![
///     Predicate::new(HasActiveOrganization, vec![]),
///     Predicate::new(HasRoleAtLeast(Role::Manager), vec![]),
/// ];
/// ```
pub(crate) struct Predicate {
    predicate: Box<dyn Check>,
    args: Vec<Id>,
}

impl Predicate {
    pub(crate) fn new<C: Check + 'static>(predicate: C, args: Vec<Id>) -> Self {
        Self {
            predicate: Box::new(predicate),
            args,
        }
    }

    pub(crate) fn check(&self, session: &Session) -> bool {
        self.predicate.eval(session, &self.args)
    }
}

/// Runs `next` when every predicate passes, otherwise answers 403.
pub(crate) async fn authorize(
    session: &Session,
    request: Request,
    next: Next,
    checks: Vec<Predicate>,
) -> Response {
    for check in checks {
        if !check.check(session) {
            info!(
                "User {} denied {} {}",
                session.user.id,
                request.method(),
                request.uri().path()
            );
            return Error::from(DomainError::forbidden()).into_response();
        }
    }
    next.run(request).await
}

/// The session acts within an organization.
pub struct HasActiveOrganization;

impl Check for HasActiveOrganization {
    fn eval(&self, session: &Session, _args: &[Id]) -> bool {
        session.organization_id.is_some()
    }
}

/// The user holds at least the given role in the active organization.
pub struct HasRoleAtLeast(pub Role);

impl Check for HasRoleAtLeast {
    fn eval(&self, session: &Session, _args: &[Id]) -> bool {
        session.has_role_at_least(self.0)
    }
}

/// The user holds at least the given role in the organization `args[0]`.
pub struct HasRoleInOrganization(pub Role);

impl Check for HasRoleInOrganization {
    fn eval(&self, session: &Session, args: &[Id]) -> bool {
        args.first().is_some_and(|organization_id| {
            UserApi::has_role_at_least(&session.user, Some(*organization_id), self.0)
        })
    }
}

pub struct IsSuperAdmin;

impl Check for IsSuperAdmin {
    fn eval(&self, session: &Session, _args: &[Id]) -> bool {
        session.is_super_admin()
    }
}

/// The user is `args[0]`.
pub struct UserIsSelf;

impl Check for UserIsSelf {
    fn eval(&self, session: &Session, args: &[Id]) -> bool {
        args.first() == Some(&session.user.id)
    }
}

pub struct UserIsNotSelf;

impl Check for UserIsNotSelf {
    fn eval(&self, session: &Session, args: &[Id]) -> bool {
        args.first() != Some(&session.user.id)
    }
}

/// Passes when any of the wrapped predicates pass.
pub struct AnyOf(pub Vec<Predicate>);

impl Check for AnyOf {
    fn eval(&self, session: &Session, _args: &[Id]) -> bool {
        self.0.iter().any(|predicate| predicate.check(session))
    }
}

fn tenant_role(role: Role) -> Vec<Predicate> {
    vec![
        Predicate::new(HasActiveOrganization, vec![]),
        Predicate::new(HasRoleAtLeast(role), vec![]),
    ]
}

/// Guards tenant routes open to every organization member.
pub(crate) async fn team_member(
    AuthenticatedUser(session): AuthenticatedUser,
    request: Request,
    next: Next,
) -> impl IntoResponse {
    authorize(&session, request, next, tenant_role(Role::TeamMember)).await
}

pub(crate) async fn manager(
    AuthenticatedUser(session): AuthenticatedUser,
    request: Request,
    next: Next,
) -> impl IntoResponse {
    authorize(&session, request, next, tenant_role(Role::Manager)).await
}

pub(crate) async fn admin(
    AuthenticatedUser(session): AuthenticatedUser,
    request: Request,
    next: Next,
) -> impl IntoResponse {
    authorize(&session, request, next, tenant_role(Role::Admin)).await
}

pub(crate) async fn super_admin(
    AuthenticatedUser(session): AuthenticatedUser,
    request: Request,
    next: Next,
) -> impl IntoResponse {
    authorize(
        &session,
        request,
        next,
        vec![Predicate::new(IsSuperAdmin, vec![])],
    )
    .await
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::Utc;
    use domain::{auth::Session, roles::Role, user_roles, users, Id};

    pub(crate) fn session(roles: &[(Option<Id>, Role)], organization_id: Option<Id>) -> Session {
        let now = Utc::now();
        let user_id = Id::new_v4();
        Session {
            user: users::Model {
                id: user_id,
                email: "casey@northwind.dev".to_string(),
                first_name: "Casey".to_string(),
                last_name: "Moore".to_string(),
                display_name: None,
                password: String::new(),
                timezone: "UTC".to_string(),
                created_at: now.into(),
                updated_at: now.into(),
                roles: roles
                    .iter()
                    .map(|(organization_id, role)| user_roles::Model {
                        id: Id::new_v4(),
                        user_id,
                        organization_id: *organization_id,
                        role: *role,
                        created_at: now.into(),
                        updated_at: now.into(),
                    })
                    .collect(),
            },
            organization_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::session;
    use super::*;

    #[test]
    fn role_checks_use_the_active_organization() {
        let home = Id::new_v4();
        let elsewhere = Id::new_v4();
        let session = session(
            &[(Some(home), Role::Manager), (Some(elsewhere), Role::TeamMember)],
            Some(elsewhere),
        );

        assert!(HasRoleAtLeast(Role::TeamMember).eval(&session, &[]));
        assert!(!HasRoleAtLeast(Role::Manager).eval(&session, &[]));
        assert!(HasRoleInOrganization(Role::Manager).eval(&session, &[home]));
    }

    #[test]
    fn super_admins_pass_every_role_check() {
        let session = session(&[(None, Role::SuperAdmin)], Some(Id::new_v4()));

        assert!(IsSuperAdmin.eval(&session, &[]));
        assert!(HasRoleAtLeast(Role::Admin).eval(&session, &[]));
        assert!(HasRoleInOrganization(Role::Admin).eval(&session, &[Id::new_v4()]));
    }

    #[test]
    fn sessions_without_an_organization_fail_tenant_checks() {
        let session = session(&[(Some(Id::new_v4()), Role::Admin)], None);

        assert!(!HasActiveOrganization.eval(&session, &[]));
        assert!(!tenant_role(Role::TeamMember)
            .iter()
            .all(|predicate| predicate.check(&session)));
    }

    #[test]
    fn self_checks_compare_against_the_argument() {
        let session = session(&[], None);
        let me = session.user.id;
        let other = Id::new_v4();

        assert!(UserIsSelf.eval(&session, &[me]));
        assert!(!UserIsSelf.eval(&session, &[other]));
        assert!(UserIsNotSelf.eval(&session, &[other]));
        assert!(!UserIsNotSelf.eval(&session, &[me]));
    }

    #[test]
    fn any_of_passes_when_one_predicate_does() {
        let organization_id = Id::new_v4();
        let session = session(&[(Some(organization_id), Role::TeamMember)], Some(organization_id));
        let other = Id::new_v4();

        let self_or_admin = AnyOf(vec![
            Predicate::new(UserIsSelf, vec![other]),
            Predicate::new(HasRoleAtLeast(Role::Admin), vec![]),
        ]);
        assert!(!self_or_admin.eval(&session, &[]));

        let self_or_member = AnyOf(vec![
            Predicate::new(UserIsSelf, vec![session.user.id]),
            Predicate::new(HasRoleAtLeast(Role::Admin), vec![]),
        ]);
        assert!(self_or_member.eval(&session, &[]));
    }
}
