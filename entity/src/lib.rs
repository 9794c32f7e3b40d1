use uuid::Uuid;

pub mod prelude;

// Core entities
pub mod jwt;
pub mod organizations;
pub mod roles;
pub mod team_members;
pub mod teams;
pub mod user_roles;
pub mod users;

// CRM
pub mod customer_status;
pub mod customers;
pub mod ticket_comments;
pub mod ticket_priority;
pub mod ticket_status;
pub mod tickets;

// Strategy (OKRs)
pub mod key_results;
pub mod objectives;
pub mod status;

// Knowledge base, email and bookings
pub mod article_status;
pub mod bookable_task_types;
pub mod email_templates;
pub mod kb_articles;

// Integrations hub
pub mod integrations;
pub mod provider;

/// PostgreSQL schema holding every table.
pub const SCHEMA: &str = "bizops";

/// A type alias that represents any Entity's internal id field data type.
/// Aliased so that it's easy to change the underlying type if necessary.
pub type Id = Uuid;
