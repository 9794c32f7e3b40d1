use chrono::{Duration, Utc};
use sea_orm::DatabaseConnection;

pub use entity::{
    article_status, bookable_task_types, customer_status, customers, email_templates,
    integrations, jwt, kb_articles, key_results, objectives, organizations, provider, roles,
    status, team_members, teams, ticket_comments, ticket_priority, ticket_status, tickets,
    user_roles, users, Id,
};
pub use query::{IntoQueryFilterMap, QueryFilterMap};

pub mod bookable_task_type;
pub mod customer;
pub mod data_explorer;
pub mod email_template;
pub mod error;
pub mod integration;
pub mod kb_article;
pub mod key_result;
pub mod mutate;
pub mod objective;
pub mod organization;
pub mod query;
pub mod team;
pub mod team_member;
pub mod ticket;
pub mod ticket_comment;
pub mod user;
pub mod user_role;

use article_status::ArticleStatus;
use customer_status::CustomerStatus;
use roles::Role;
use status::Status;
use ticket_priority::TicketPriority;
use ticket_status::TicketStatus;

fn demo_user(email: &str, first_name: &str, last_name: &str, password: &str) -> users::Model {
    let now = Utc::now();
    users::Model {
        id: Id::nil(),
        email: email.to_owned(),
        first_name: first_name.to_owned(),
        last_name: last_name.to_owned(),
        display_name: Some(format!("{first_name} {last_name}")),
        password: password.to_owned(),
        timezone: "Australia/Brisbane".to_owned(),
        created_at: now.into(),
        updated_at: now.into(),
        roles: vec![],
    }
}

/// Populates an empty database with a demo organization and one user per role.
/// Every demo account uses the password `password`.
pub async fn seed_database(db: &DatabaseConnection) -> Result<(), error::Error> {
    let now = Utc::now();

    let organization = organization::create(
        db,
        organizations::Model {
            id: Id::nil(),
            name: "Northwind Fibre".to_owned(),
            logo: None,
            slug: String::new(),
            created_at: now.into(),
            updated_at: now.into(),
        },
    )
    .await?;

    let super_admin = user::create(
        db,
        demo_user("superadmin@bizops.dev", "Sam", "Root", "password"),
    )
    .await?;
    user_role::create(db, super_admin.id, None, Role::SuperAdmin).await?;

    let admin = user::create_by_organization(
        db,
        organization.id,
        demo_user("admin@northwind.dev", "Alex", "Admin", "password"),
        Role::Admin,
    )
    .await?;
    let manager = user::create_by_organization(
        db,
        organization.id,
        demo_user("manager@northwind.dev", "Morgan", "Lee", "password"),
        Role::Manager,
    )
    .await?;
    let member = user::create_by_organization(
        db,
        organization.id,
        demo_user("tech@northwind.dev", "Taylor", "Nguyen", "password"),
        Role::TeamMember,
    )
    .await?;

    let support = team::create(
        db,
        organization.id,
        teams::Model {
            id: Id::nil(),
            organization_id: organization.id,
            name: "Field Support".to_owned(),
            description: Some("On-site installs and fault repair".to_owned()),
            lead_id: Some(manager.id),
            created_at: now.into(),
            updated_at: now.into(),
        },
    )
    .await?;
    team_member::create(db, support.id, manager.id).await?;
    team_member::create(db, support.id, member.id).await?;

    let cafe = customer::create(
        db,
        organization.id,
        customers::Model {
            id: Id::nil(),
            organization_id: organization.id,
            name: "Harbour Cafe".to_owned(),
            email: Some("owner@harbourcafe.example".to_owned()),
            phone: Some("+61 7 5555 0101".to_owned()),
            company: Some("Harbour Cafe Pty Ltd".to_owned()),
            external_ref: Some("1042".to_owned()),
            status: CustomerStatus::Active,
            created_at: now.into(),
            updated_at: now.into(),
        },
    )
    .await?;
    customer::create(
        db,
        organization.id,
        customers::Model {
            id: Id::nil(),
            organization_id: organization.id,
            name: "Ridge Vineyards".to_owned(),
            email: Some("ops@ridgevineyards.example".to_owned()),
            phone: None,
            company: None,
            external_ref: None,
            status: CustomerStatus::Lead,
            created_at: now.into(),
            updated_at: now.into(),
        },
    )
    .await?;

    for (title, status, priority) in [
        (
            "Intermittent dropouts at front counter",
            TicketStatus::Open,
            TicketPriority::High,
        ),
        (
            "Upgrade plan to 500/50",
            TicketStatus::Resolved,
            TicketPriority::Low,
        ),
    ] {
        ticket::create(
            db,
            organization.id,
            admin.id,
            tickets::Model {
                id: Id::nil(),
                organization_id: organization.id,
                customer_id: Some(cafe.id),
                team_id: Some(support.id),
                assignee_id: Some(member.id),
                reporter_id: admin.id,
                title: title.to_owned(),
                description: None,
                status,
                priority,
                due_at: Some((now + Duration::days(3)).into()),
                resolved_at: None,
                created_at: now.into(),
                updated_at: now.into(),
            },
        )
        .await?;
    }

    let objective = objective::create(
        db,
        organization.id,
        objectives::Model {
            id: Id::nil(),
            organization_id: organization.id,
            title: "Grow the fibre customer base".to_owned(),
            description: None,
            period: "2026-Q4".to_owned(),
            owner_id: Some(manager.id),
            team_id: Some(support.id),
            status: Status::OnTrack,
            created_at: now.into(),
            updated_at: now.into(),
        },
    )
    .await?;
    for (title, unit, start, target, current) in [
        ("Sign new business customers", "customers", 0.0, 40.0, 12.0),
        ("Reduce mean time to resolve", "hours", 24.0, 8.0, 14.0),
    ] {
        key_result::create(
            db,
            objective.id,
            key_results::Model {
                id: Id::nil(),
                objective_id: objective.id,
                title: title.to_owned(),
                unit: Some(unit.to_owned()),
                start_value: start,
                target_value: target,
                current_value: current,
                status: Status::OnTrack,
                created_at: now.into(),
                updated_at: now.into(),
            },
        )
        .await?;
    }

    kb_article::create(
        db,
        organization.id,
        manager.id,
        kb_articles::Model {
            id: Id::nil(),
            organization_id: organization.id,
            author_id: manager.id,
            title: "Power cycling an ONT".to_owned(),
            slug: String::new(),
            body: "Switch the ONT off at the wall, wait 30 seconds, then switch it back on."
                .to_owned(),
            category: Some("Troubleshooting".to_owned()),
            status: ArticleStatus::Published,
            published_at: None,
            created_at: now.into(),
            updated_at: now.into(),
        },
    )
    .await?;

    email_template::create(
        db,
        organization.id,
        email_templates::Model {
            id: Id::nil(),
            organization_id: organization.id,
            name: "ticket_resolved".to_owned(),
            subject: "Your ticket \"{{ticket.title}}\" has been resolved".to_owned(),
            html_body: "<p>Hi {{customer.name}},</p><p>We've resolved <b>{{ticket.title}}</b>.</p>"
                .to_owned(),
            text_body: Some(
                "Hi {{customer.name}}, we've resolved \"{{ticket.title}}\".".to_owned(),
            ),
            created_at: now.into(),
            updated_at: now.into(),
        },
    )
    .await?;

    bookable_task_type::create(
        db,
        organization.id,
        bookable_task_types::Model {
            id: Id::nil(),
            organization_id: organization.id,
            name: "Site survey".to_owned(),
            description: Some("Assess cabling and equipment placement".to_owned()),
            duration_minutes: 60,
            buffer_minutes: 15,
            color: Some("#1e88e5".to_owned()),
            active: true,
            created_at: now.into(),
            updated_at: now.into(),
        },
    )
    .await?;

    Ok(())
}
