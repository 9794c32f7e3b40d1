pub use super::bookable_task_types::Entity as BookableTaskTypes;
pub use super::customers::Entity as Customers;
pub use super::email_templates::Entity as EmailTemplates;
pub use super::integrations::Entity as Integrations;
pub use super::kb_articles::Entity as KbArticles;
pub use super::key_results::Entity as KeyResults;
pub use super::objectives::Entity as Objectives;
pub use super::organizations::Entity as Organizations;
pub use super::team_members::Entity as TeamMembers;
pub use super::teams::Entity as Teams;
pub use super::ticket_comments::Entity as TicketComments;
pub use super::tickets::Entity as Tickets;
pub use super::user_roles::Entity as UserRoles;
pub use super::users::Entity as Users;
