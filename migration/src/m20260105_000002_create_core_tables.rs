use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// Raw SQL keeps the schema qualification and CHECK constraints explicit.
const UP: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS bizops.organizations (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        name VARCHAR(255) NOT NULL,
        logo TEXT,
        slug VARCHAR(255) NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        CONSTRAINT organizations_slug_unique UNIQUE (slug)
    )",
    "CREATE TABLE IF NOT EXISTS bizops.users (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        email VARCHAR(255) NOT NULL,
        first_name VARCHAR(255) NOT NULL,
        last_name VARCHAR(255) NOT NULL,
        display_name VARCHAR(255),
        password VARCHAR(255) NOT NULL,
        timezone VARCHAR(64) NOT NULL DEFAULT 'UTC',
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        CONSTRAINT users_email_unique UNIQUE (email)
    )",
    "CREATE TABLE IF NOT EXISTS bizops.user_roles (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        user_id UUID NOT NULL,
        organization_id UUID,
        role VARCHAR(32) NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        CONSTRAINT user_roles_role_check
            CHECK (role IN ('super_admin', 'admin', 'manager', 'team_member')),
        CONSTRAINT user_roles_scope_check
            CHECK ((role = 'super_admin') = (organization_id IS NULL)),
        CONSTRAINT fk_user_roles_user
            FOREIGN KEY (user_id)
            REFERENCES bizops.users(id)
            ON DELETE CASCADE
            ON UPDATE CASCADE,
        CONSTRAINT fk_user_roles_organization
            FOREIGN KEY (organization_id)
            REFERENCES bizops.organizations(id)
            ON DELETE CASCADE
            ON UPDATE CASCADE
    )",
    "CREATE UNIQUE INDEX IF NOT EXISTS user_roles_user_org_role_unique
        ON bizops.user_roles(user_id, organization_id, role)",
    // NULL organizations never collide in the index above
    "CREATE UNIQUE INDEX IF NOT EXISTS user_roles_user_platform_role_unique
        ON bizops.user_roles(user_id, role)
        WHERE organization_id IS NULL",
    "CREATE INDEX IF NOT EXISTS user_roles_organization_id
        ON bizops.user_roles(organization_id)",
    "CREATE TABLE IF NOT EXISTS bizops.teams (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        organization_id UUID NOT NULL,
        name VARCHAR(255) NOT NULL,
        description TEXT,
        lead_id UUID,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        CONSTRAINT teams_organization_name_unique UNIQUE (organization_id, name),
        CONSTRAINT fk_teams_organization
            FOREIGN KEY (organization_id)
            REFERENCES bizops.organizations(id)
            ON DELETE CASCADE,
        CONSTRAINT fk_teams_lead
            FOREIGN KEY (lead_id)
            REFERENCES bizops.users(id)
            ON DELETE SET NULL
    )",
    "CREATE TABLE IF NOT EXISTS bizops.team_members (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        team_id UUID NOT NULL,
        user_id UUID NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        CONSTRAINT team_members_team_user_unique UNIQUE (team_id, user_id),
        CONSTRAINT fk_team_members_team
            FOREIGN KEY (team_id)
            REFERENCES bizops.teams(id)
            ON DELETE CASCADE,
        CONSTRAINT fk_team_members_user
            FOREIGN KEY (user_id)
            REFERENCES bizops.users(id)
            ON DELETE CASCADE
    )",
];

const DOWN: &[&str] = &[
    "DROP TABLE IF EXISTS bizops.team_members",
    "DROP TABLE IF EXISTS bizops.teams",
    "DROP TABLE IF EXISTS bizops.user_roles",
    "DROP TABLE IF EXISTS bizops.users",
    "DROP TABLE IF EXISTS bizops.organizations",
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
