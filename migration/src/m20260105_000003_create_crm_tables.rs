use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

const UP: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS bizops.customers (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        organization_id UUID NOT NULL,
        name VARCHAR(255) NOT NULL,
        email VARCHAR(255),
        phone VARCHAR(64),
        company VARCHAR(255),
        external_ref VARCHAR(255),
        status VARCHAR(32) NOT NULL DEFAULT 'lead',
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        CONSTRAINT customers_status_check
            CHECK (status IN ('lead', 'active', 'inactive', 'churned')),
        CONSTRAINT fk_customers_organization
            FOREIGN KEY (organization_id)
            REFERENCES bizops.organizations(id)
            ON DELETE CASCADE
    )",
    // One local record per external system id
    "CREATE UNIQUE INDEX IF NOT EXISTS customers_organization_external_ref_unique
        ON bizops.customers(organization_id, external_ref)
        WHERE external_ref IS NOT NULL",
    "CREATE TABLE IF NOT EXISTS bizops.tickets (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        organization_id UUID NOT NULL,
        customer_id UUID,
        team_id UUID,
        assignee_id UUID,
        reporter_id UUID NOT NULL,
        title VARCHAR(255) NOT NULL,
        description TEXT,
        status VARCHAR(32) NOT NULL DEFAULT 'open',
        priority VARCHAR(32) NOT NULL DEFAULT 'medium',
        due_at TIMESTAMPTZ,
        resolved_at TIMESTAMPTZ,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        CONSTRAINT tickets_status_check
            CHECK (status IN ('open', 'in_progress', 'pending', 'resolved', 'closed')),
        CONSTRAINT tickets_priority_check
            CHECK (priority IN ('low', 'medium', 'high', 'urgent')),
        CONSTRAINT fk_tickets_organization
            FOREIGN KEY (organization_id)
            REFERENCES bizops.organizations(id)
            ON DELETE CASCADE,
        CONSTRAINT fk_tickets_customer
            FOREIGN KEY (customer_id)
            REFERENCES bizops.customers(id)
            ON DELETE SET NULL,
        CONSTRAINT fk_tickets_team
            FOREIGN KEY (team_id)
            REFERENCES bizops.teams(id)
            ON DELETE SET NULL,
        CONSTRAINT fk_tickets_assignee
            FOREIGN KEY (assignee_id)
            REFERENCES bizops.users(id)
            ON DELETE SET NULL,
        CONSTRAINT fk_tickets_reporter
            FOREIGN KEY (reporter_id)
            REFERENCES bizops.users(id)
            ON DELETE CASCADE
    )",
    "CREATE INDEX IF NOT EXISTS tickets_organization_status
        ON bizops.tickets(organization_id, status)",
    "CREATE INDEX IF NOT EXISTS tickets_assignee_id ON bizops.tickets(assignee_id)",
    "CREATE INDEX IF NOT EXISTS tickets_customer_id ON bizops.tickets(customer_id)",
    "CREATE TABLE IF NOT EXISTS bizops.ticket_comments (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        ticket_id UUID NOT NULL,
        author_id UUID NOT NULL,
        body TEXT NOT NULL,
        internal BOOLEAN NOT NULL DEFAULT false,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        CONSTRAINT fk_ticket_comments_ticket
            FOREIGN KEY (ticket_id)
            REFERENCES bizops.tickets(id)
            ON DELETE CASCADE,
        CONSTRAINT fk_ticket_comments_author
            FOREIGN KEY (author_id)
            REFERENCES bizops.users(id)
            ON DELETE CASCADE
    )",
    "CREATE INDEX IF NOT EXISTS ticket_comments_ticket_id
        ON bizops.ticket_comments(ticket_id, created_at)",
];

const DOWN: &[&str] = &[
    "DROP TABLE IF EXISTS bizops.ticket_comments",
    "DROP TABLE IF EXISTS bizops.tickets",
    "DROP TABLE IF EXISTS bizops.customers",
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for sql in UP {
            manager.get_connection().execute_unprepared(sql).await?;
        }
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for sql in DOWN {
            manager.get_connection().execute_unprepared(sql).await?;
        }
        Ok(())
    }
}
