use crate::error::Error;
use crate::roles::Role;
use crate::{strip_immutable, string_value, users, Id, IntoUpdateMap};
use chrono_tz::Tz;
use email_address::EmailAddress;
use entity_api::error::Error as EntityApiError;
use entity_api::{mutate, user, user_role};
use log::*;
use sea_orm::{DatabaseConnection, IntoActiveModel, TransactionTrait, Value};

pub use entity_api::user::{find_by_email, find_by_id, verify_password};

const MIN_PASSWORD_LENGTH: usize = 8;

/// Whether the user holds the platform-wide `super_admin` role.
pub fn is_super_admin(user: &users::Model) -> bool {
    user.roles
        .iter()
        .any(|grant| grant.role == Role::SuperAdmin && grant.organization_id.is_none())
}

/// The user's highest role within the organization, ignoring platform grants.
pub fn role_in(user: &users::Model, organization_id: Id) -> Option<Role> {
    user.roles
        .iter()
        .filter(|grant| grant.organization_id == Some(organization_id))
        .map(|grant| grant.role)
        .max_by_key(|role| role.rank())
}

/// A super admin satisfies every check. Anyone else needs a role in the
/// organization that ranks at least `role`.
pub fn has_role_at_least(user: &users::Model, organization_id: Option<Id>, role: Role) -> bool {
    if is_super_admin(user) {
        return true;
    }
    match organization_id.and_then(|organization_id| role_in(user, organization_id)) {
        Some(held) => held.is_at_least(role),
        None => false,
    }
}

pub fn belongs_to(user: &users::Model, organization_id: Id) -> bool {
    role_in(user, organization_id).is_some()
}

/// Organizations the user holds a role in, oldest grant first.
pub fn organization_ids(user: &users::Model) -> Vec<Id> {
    let mut grants: Vec<_> = user
        .roles
        .iter()
        .filter_map(|grant| grant.organization_id.map(|id| (grant.created_at, id)))
        .collect();
    grants.sort_by_key(|(created_at, _)| *created_at);

    let mut ids: Vec<Id> = Vec::new();
    for (_, id) in grants {
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    ids
}

pub(crate) fn validate_email(email: &str) -> Result<(), Error> {
    if !EmailAddress::is_valid(email.trim()) {
        return Err(Error::validation(format!("{email} is not a valid email address")));
    }
    Ok(())
}

pub(crate) fn validate_timezone(timezone: &str) -> Result<(), Error> {
    timezone
        .parse::<Tz>()
        .map_err(|_| Error::validation(format!("{timezone} is not a known IANA timezone")))?;
    Ok(())
}

pub(crate) fn validate_password(password: &str) -> Result<(), Error> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(Error::validation(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

fn validate_new_user(user_model: &users::Model) -> Result<(), Error> {
    validate_email(&user_model.email)?;
    crate::require_text("first_name", &user_model.first_name)?;
    crate::require_text("last_name", &user_model.last_name)?;
    validate_password(&user_model.password)?;
    validate_timezone(&user_model.timezone)
}

/// Users holding any role in the organization.
pub async fn find_by_organization(
    db: &DatabaseConnection,
    organization_id: Id,
) -> Result<Vec<users::Model>, Error> {
    Ok(user::find_by_organization(db, organization_id).await?)
}

/// Finds a user that belongs to the organization. Users outside it are
/// reported as not found.
pub async fn find_in_organization(
    db: &DatabaseConnection,
    organization_id: Id,
    user_id: Id,
) -> Result<users::Model, Error> {
    let user = find_by_id(db, user_id).await?;
    if belongs_to(&user, organization_id) {
        Ok(user)
    } else {
        Err(Error::not_found())
    }
}

/// Fails validation unless `user_id` names a member of the organization.
pub(crate) async fn ensure_member(
    db: &DatabaseConnection,
    organization_id: Id,
    field: &str,
    user_id: Id,
) -> Result<(), Error> {
    find_in_organization(db, organization_id, user_id)
        .await
        .map(|_| ())
        .map_err(|err| crate::invalid_reference(err, field, user_id))
}

/// Creates a user inside the organization with `role`. Only super admins may
/// create another super admin, who also receives a team member seat in the
/// organization so they are listed with it.
pub async fn create(
    db: &DatabaseConnection,
    actor: &users::Model,
    organization_id: Id,
    user_model: users::Model,
    role: Role,
) -> Result<users::Model, Error> {
    validate_new_user(&user_model)?;

    if role == Role::SuperAdmin {
        if !is_super_admin(actor) {
            warn!("User {} attempted to create a super admin", actor.id);
            return Err(Error::forbidden());
        }
        let txn = db.begin().await.map_err(EntityApiError::from)?;
        let created =
            user::create_by_organization(&txn, organization_id, user_model, Role::TeamMember)
                .await?;
        user_role::assign(&txn, created.id, organization_id, Role::SuperAdmin).await?;
        txn.commit().await.map_err(EntityApiError::from)?;
        info!(
            "Created super admin {} with a seat in organization {organization_id}",
            created.id
        );
        return Ok(find_by_id(db, created.id).await?);
    }

    let created = user::create_by_organization(db, organization_id, user_model, role).await?;
    info!(
        "Created user {} with role {role} in organization {organization_id}",
        created.id
    );
    Ok(created)
}

/// Applies a profile update. Passwords change only through
/// [`change_password`]; emails are normalized and validated.
pub async fn update(
    db: &DatabaseConnection,
    user_id: Id,
    params: impl IntoUpdateMap,
) -> Result<users::Model, Error> {
    let mut update_map = strip_immutable(params.into_update_map());
    update_map.remove("password");

    if let Some(email) = string_value(&update_map, "email").map(str::to_owned) {
        validate_email(&email)?;
        update_map.insert(
            "email".to_string(),
            Some(Value::String(Some(Box::new(email.trim().to_lowercase())))),
        );
    }
    if let Some(timezone) = string_value(&update_map, "timezone") {
        validate_timezone(timezone)?;
    }
    for column in ["first_name", "last_name"] {
        if let Some(value) = string_value(&update_map, column) {
            crate::require_text(column, value)?;
        }
    }

    let existing = find_by_id(db, user_id).await?;
    mutate::update::<users::ActiveModel, users::Column>(
        db,
        existing.into_active_model(),
        update_map,
    )
    .await?;

    Ok(find_by_id(db, user_id).await?)
}

/// Replaces the user's password after checking the current one.
pub async fn change_password(
    db: &DatabaseConnection,
    user_id: Id,
    current_password: &str,
    new_password: String,
) -> Result<(), Error> {
    let user = find_by_id(db, user_id).await?;

    if verify_password(current_password, &user.password).is_err() {
        warn!("Rejected password change for user {user_id}: wrong current password");
        return Err(Error::validation("current password is incorrect"));
    }
    validate_password(&new_password)?;

    Ok(user::update_password(db, user, new_password).await?)
}

/// Changes the target user's role in the organization.
///
/// Granting `super_admin` requires a super admin. Nobody but a super admin may
/// change their own role.
pub async fn set_role(
    db: &DatabaseConnection,
    actor: &users::Model,
    organization_id: Id,
    target_id: Id,
    role: Role,
) -> Result<users::Model, Error> {
    let actor_is_super_admin = is_super_admin(actor);

    if role == Role::SuperAdmin && !actor_is_super_admin {
        warn!("User {} attempted to grant super_admin", actor.id);
        return Err(Error::forbidden());
    }
    if actor.id == target_id && !actor_is_super_admin {
        warn!("User {} attempted to change their own role", actor.id);
        return Err(Error::forbidden());
    }

    let target = find_in_organization(db, organization_id, target_id).await?;
    user_role::assign(db, target.id, organization_id, role).await?;

    Ok(find_by_id(db, target_id).await?)
}

/// Removes the user from the organization. A user left without any role is
/// deleted outright.
pub async fn remove_from_organization(
    db: &DatabaseConnection,
    actor: &users::Model,
    organization_id: Id,
    target_id: Id,
) -> Result<(), Error> {
    if actor.id == target_id {
        warn!("User {} attempted to remove themselves", actor.id);
        return Err(Error::forbidden());
    }

    let target = find_in_organization(db, organization_id, target_id).await?;

    let txn = db.begin().await.map_err(EntityApiError::from)?;
    user_role::delete_by_user_and_organization(&txn, target.id, organization_id).await?;
    let remaining = user_role::find_by_user_id(&txn, target.id).await?;
    if remaining.is_empty() {
        user::delete(&txn, target.id).await?;
        info!("Deleted user {} after removing their last role", target.id);
    } else {
        info!(
            "Removed user {} from organization {organization_id}",
            target.id
        );
    }
    txn.commit().await.map_err(EntityApiError::from)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user_roles;
    use chrono::{Duration, Utc};

    fn grant(organization_id: Option<Id>, role: Role, age_days: i64) -> user_roles::Model {
        let created_at = Utc::now() - Duration::days(age_days);
        user_roles::Model {
            id: Id::new_v4(),
            user_id: Id::new_v4(),
            organization_id,
            role,
            created_at: created_at.into(),
            updated_at: created_at.into(),
        }
    }

    fn user_with(roles: Vec<user_roles::Model>) -> users::Model {
        let now = Utc::now();
        users::Model {
            id: Id::new_v4(),
            email: "tech@northwind.dev".to_string(),
            first_name: "Taylor".to_string(),
            last_name: "Nguyen".to_string(),
            display_name: None,
            password: "password".to_string(),
            timezone: "UTC".to_string(),
            created_at: now.into(),
            updated_at: now.into(),
            roles,
        }
    }

    #[test]
    fn super_admins_pass_every_role_check() {
        let user = user_with(vec![grant(None, Role::SuperAdmin, 0)]);

        assert!(is_super_admin(&user));
        assert!(has_role_at_least(&user, None, Role::Admin));
        assert!(has_role_at_least(&user, Some(Id::new_v4()), Role::Admin));
    }

    #[test]
    fn org_roles_only_apply_to_their_org() {
        let organization_id = Id::new_v4();
        let user = user_with(vec![grant(Some(organization_id), Role::Manager, 0)]);

        assert!(has_role_at_least(&user, Some(organization_id), Role::TeamMember));
        assert!(has_role_at_least(&user, Some(organization_id), Role::Manager));
        assert!(!has_role_at_least(&user, Some(organization_id), Role::Admin));
        assert!(!has_role_at_least(&user, Some(Id::new_v4()), Role::TeamMember));
        assert!(!has_role_at_least(&user, None, Role::TeamMember));
    }

    #[test]
    fn a_super_admin_row_with_an_org_is_not_platform_wide() {
        let organization_id = Id::new_v4();
        let user = user_with(vec![grant(Some(organization_id), Role::SuperAdmin, 0)]);

        assert!(!is_super_admin(&user));
        assert!(!has_role_at_least(&user, Some(Id::new_v4()), Role::TeamMember));
    }

    #[test]
    fn role_in_picks_the_highest_grant() {
        let organization_id = Id::new_v4();
        let user = user_with(vec![
            grant(Some(organization_id), Role::TeamMember, 2),
            grant(Some(organization_id), Role::Admin, 1),
        ]);

        assert_eq!(role_in(&user, organization_id), Some(Role::Admin));
    }

    #[test]
    fn organization_ids_are_ordered_by_grant_age() {
        let older = Id::new_v4();
        let newer = Id::new_v4();
        let user = user_with(vec![
            grant(Some(newer), Role::TeamMember, 1),
            grant(None, Role::SuperAdmin, 10),
            grant(Some(older), Role::Admin, 5),
        ]);

        assert_eq!(organization_ids(&user), vec![older, newer]);
    }

    #[test]
    fn validation_rejects_bad_profile_values() {
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("ops@northwind.dev").is_ok());
        assert!(validate_timezone("Mars/Olympus_Mons").is_err());
        assert!(validate_timezone("Australia/Brisbane").is_ok());
        assert!(validate_password("short").is_err());
        assert!(validate_password("long enough").is_ok());
    }

    #[test]
    fn new_users_need_names() {
        let mut user = user_with(vec![]);
        user.first_name = " ".to_string();
        assert!(validate_new_user(&user).is_err());
    }
}

#[cfg(test)]
#[cfg(feature = "mock")]
mod mock_tests {
    use super::*;
    use crate::error::{DomainErrorKind, InternalErrorKind};
    use crate::user_roles;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn user(id: Id) -> users::Model {
        let now = Utc::now();
        users::Model {
            id,
            email: "admin@northwind.dev".to_string(),
            first_name: "Alex".to_string(),
            last_name: "Admin".to_string(),
            display_name: None,
            password: "password".to_string(),
            timezone: "UTC".to_string(),
            created_at: now.into(),
            updated_at: now.into(),
            roles: vec![],
        }
    }

    fn grant(user_id: Id, organization_id: Option<Id>, role: Role) -> user_roles::Model {
        let now = Utc::now();
        user_roles::Model {
            id: Id::new_v4(),
            user_id,
            organization_id,
            role,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[tokio::test]
    async fn admins_cannot_grant_super_admin() {
        let organization_id = Id::new_v4();
        let mut admin = user(Id::new_v4());
        admin.roles = vec![grant(admin.id, Some(organization_id), Role::Admin)];
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let err = set_role(&db, &admin, organization_id, Id::new_v4(), Role::SuperAdmin)
            .await
            .unwrap_err();

        assert_eq!(
            err.error_kind,
            DomainErrorKind::Internal(InternalErrorKind::Forbidden)
        );
    }

    #[tokio::test]
    async fn admins_cannot_change_their_own_role() {
        let organization_id = Id::new_v4();
        let mut admin = user(Id::new_v4());
        admin.roles = vec![grant(admin.id, Some(organization_id), Role::Admin)];
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let err = set_role(&db, &admin, organization_id, admin.id, Role::Manager)
            .await
            .unwrap_err();

        assert_eq!(
            err.error_kind,
            DomainErrorKind::Internal(InternalErrorKind::Forbidden)
        );
    }

    #[tokio::test]
    async fn users_of_other_organizations_are_not_found() {
        let organization_id = Id::new_v4();
        let outsider_id = Id::new_v4();
        let outsider = user(outsider_id);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![(
                outsider.clone(),
                Some(grant(outsider_id, Some(Id::new_v4()), Role::Admin)),
            )]])
            .into_connection();

        let err = find_in_organization(&db, organization_id, outsider_id)
            .await
            .unwrap_err();

        assert_eq!(err.error_kind, Error::not_found().error_kind);
    }

    #[tokio::test]
    async fn failed_super_admin_grant_rolls_back_the_new_user() {
        let organization_id = Id::new_v4();
        let mut platform_admin = user(Id::new_v4());
        platform_admin.roles = vec![grant(platform_admin.id, None, Role::SuperAdmin)];
        let new_id = Id::new_v4();
        let mut new_user = user(new_id);
        new_user.email = "ops@northwind.dev".to_string();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[new_user.clone()]])
            .append_query_results([[grant(new_id, Some(organization_id), Role::TeamMember)]])
            .append_query_errors([sea_orm::DbErr::Custom("connection reset".to_string())])
            .into_connection();

        let result = create(
            &db,
            &platform_admin,
            organization_id,
            new_user,
            Role::SuperAdmin,
        )
        .await;
        assert!(result.is_err());

        let log = db.into_transaction_log();
        assert_eq!(log.len(), 1);
        let statements: Vec<&str> = log[0]
            .statements()
            .iter()
            .map(|statement| statement.sql.as_str())
            .collect();
        assert_eq!(statements.first(), Some(&"BEGIN"));
        assert_eq!(statements.last(), Some(&"ROLLBACK"));
        assert!(!statements.contains(&"COMMIT"));
    }

    #[tokio::test]
    async fn wrong_current_password_is_a_validation_error() {
        let user_id = Id::new_v4();
        let mut stored = user(user_id);
        stored.password = entity_api::user::generate_hash("password".to_string());
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![(stored, None::<user_roles::Model>)]])
            .into_connection();

        let err = change_password(&db, user_id, "guess-again", "new-password".to_string())
            .await
            .unwrap_err();

        assert!(matches!(
            err.error_kind,
            DomainErrorKind::Internal(InternalErrorKind::Validation(_))
        ));
    }
}
