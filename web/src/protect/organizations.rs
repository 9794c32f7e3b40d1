use super::{authorize, AnyOf, HasRoleInOrganization, IsSuperAdmin, Predicate};
use crate::extractors::authenticated_user::AuthenticatedUser;
use axum::{
    extract::{Path, Request},
    middleware::Next,
    response::IntoResponse,
};
use domain::{roles::Role, Id};

/// Members of the organization and super admins may read it.
pub(crate) async fn read(
    AuthenticatedUser(session): AuthenticatedUser,
    Path(organization_id): Path<Id>,
    request: Request,
    next: Next,
) -> impl IntoResponse {
    let checks = vec![Predicate::new(
        AnyOf(vec![
            Predicate::new(HasRoleInOrganization(Role::TeamMember), vec![organization_id]),
            Predicate::new(IsSuperAdmin, vec![]),
        ]),
        vec![],
    )];
    authorize(&session, request, next, checks).await
}

/// Admins of the organization may change it.
pub(crate) async fn update(
    AuthenticatedUser(session): AuthenticatedUser,
    Path(organization_id): Path<Id>,
    request: Request,
    next: Next,
) -> impl IntoResponse {
    let checks = vec![Predicate::new(
        HasRoleInOrganization(Role::Admin),
        vec![organization_id],
    )];
    authorize(&session, request, next, checks).await
}
