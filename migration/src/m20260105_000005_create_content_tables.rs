use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

const UP: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS bizops.kb_articles (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        organization_id UUID NOT NULL,
        author_id UUID NOT NULL,
        title VARCHAR(255) NOT NULL,
        slug VARCHAR(255) NOT NULL,
        body TEXT NOT NULL,
        category VARCHAR(128),
        status VARCHAR(32) NOT NULL DEFAULT 'draft',
        published_at TIMESTAMPTZ,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        CONSTRAINT kb_articles_organization_slug_unique UNIQUE (organization_id, slug),
        CONSTRAINT kb_articles_status_check
            CHECK (status IN ('draft', 'published', 'archived')),
        CONSTRAINT fk_kb_articles_organization
            FOREIGN KEY (organization_id)
            REFERENCES bizops.organizations(id)
            ON DELETE CASCADE,
        CONSTRAINT fk_kb_articles_author
            FOREIGN KEY (author_id)
            REFERENCES bizops.users(id)
            ON DELETE CASCADE
    )",
    "CREATE INDEX IF NOT EXISTS kb_articles_organization_status
        ON bizops.kb_articles(organization_id, status)",
    "CREATE TABLE IF NOT EXISTS bizops.email_templates (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        organization_id UUID NOT NULL,
        name VARCHAR(255) NOT NULL,
        subject TEXT NOT NULL,
        html_body TEXT NOT NULL,
        text_body TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        CONSTRAINT email_templates_organization_name_unique UNIQUE (organization_id, name),
        CONSTRAINT fk_email_templates_organization
            FOREIGN KEY (organization_id)
            REFERENCES bizops.organizations(id)
            ON DELETE CASCADE
    )",
    "CREATE TABLE IF NOT EXISTS bizops.bookable_task_types (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        organization_id UUID NOT NULL,
        name VARCHAR(255) NOT NULL,
        description TEXT,
        duration_minutes INTEGER NOT NULL,
        buffer_minutes INTEGER NOT NULL DEFAULT 0,
        color VARCHAR(16),
        active BOOLEAN NOT NULL DEFAULT true,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        CONSTRAINT bookable_task_types_organization_name_unique UNIQUE (organization_id, name),
        CONSTRAINT bookable_task_types_duration_check CHECK (duration_minutes > 0),
        CONSTRAINT bookable_task_types_buffer_check CHECK (buffer_minutes >= 0),
        CONSTRAINT fk_bookable_task_types_organization
            FOREIGN KEY (organization_id)
            REFERENCES bizops.organizations(id)
            ON DELETE CASCADE
    )",
];

const DOWN: &[&str] = &[
    "DROP TABLE IF EXISTS bizops.bookable_task_types",
    "DROP TABLE IF EXISTS bizops.email_templates",
    "DROP TABLE IF EXISTS bizops.kb_articles",
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
