use super::{
    authorize, AnyOf, HasActiveOrganization, HasRoleAtLeast, Predicate, UserIsNotSelf, UserIsSelf,
};
use crate::extractors::authenticated_user::AuthenticatedUser;
use axum::{
    extract::{Path, Request},
    middleware::Next,
    response::IntoResponse,
};
use domain::{roles::Role, Id};

/// A user may edit their own profile; admins may edit anyone's in their organization.
pub(crate) async fn update(
    AuthenticatedUser(session): AuthenticatedUser,
    Path(user_id): Path<Id>,
    request: Request,
    next: Next,
) -> impl IntoResponse {
    let checks = vec![Predicate::new(
        AnyOf(vec![
            Predicate::new(UserIsSelf, vec![user_id]),
            Predicate::new(HasRoleAtLeast(Role::Admin), vec![]),
        ]),
        vec![],
    )];
    authorize(&session, request, next, checks).await
}

/// Only the user themselves may change their password.
pub(crate) async fn password(
    AuthenticatedUser(session): AuthenticatedUser,
    Path(user_id): Path<Id>,
    request: Request,
    next: Next,
) -> impl IntoResponse {
    let checks = vec![Predicate::new(UserIsSelf, vec![user_id])];
    authorize(&session, request, next, checks).await
}

/// Admins remove other users from the organization, never themselves.
pub(crate) async fn remove(
    AuthenticatedUser(session): AuthenticatedUser,
    Path(user_id): Path<Id>,
    request: Request,
    next: Next,
) -> impl IntoResponse {
    let checks = vec![
        Predicate::new(HasActiveOrganization, vec![]),
        Predicate::new(HasRoleAtLeast(Role::Admin), vec![]),
        Predicate::new(UserIsNotSelf, vec![user_id]),
    ];
    authorize(&session, request, next, checks).await
}
