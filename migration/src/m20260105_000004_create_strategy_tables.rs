use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

const UP: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS bizops.objectives (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        organization_id UUID NOT NULL,
        title VARCHAR(255) NOT NULL,
        description TEXT,
        period VARCHAR(32) NOT NULL,
        owner_id UUID,
        team_id UUID,
        status VARCHAR(32) NOT NULL DEFAULT 'not_started',
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        CONSTRAINT objectives_status_check
            CHECK (status IN ('not_started', 'on_track', 'at_risk', 'off_track', 'completed')),
        CONSTRAINT fk_objectives_organization
            FOREIGN KEY (organization_id)
            REFERENCES bizops.organizations(id)
            ON DELETE CASCADE,
        CONSTRAINT fk_objectives_owner
            FOREIGN KEY (owner_id)
            REFERENCES bizops.users(id)
            ON DELETE SET NULL,
        CONSTRAINT fk_objectives_team
            FOREIGN KEY (team_id)
            REFERENCES bizops.teams(id)
            ON DELETE CASCADE
    )",
    "CREATE INDEX IF NOT EXISTS objectives_organization_period
        ON bizops.objectives(organization_id, period)",
    "CREATE TABLE IF NOT EXISTS bizops.key_results (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        objective_id UUID NOT NULL,
        title VARCHAR(255) NOT NULL,
        unit VARCHAR(32),
        start_value DOUBLE PRECISION NOT NULL DEFAULT 0,
        target_value DOUBLE PRECISION NOT NULL,
        current_value DOUBLE PRECISION NOT NULL DEFAULT 0,
        status VARCHAR(32) NOT NULL DEFAULT 'not_started',
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        CONSTRAINT key_results_status_check
            CHECK (status IN ('not_started', 'on_track', 'at_risk', 'off_track', 'completed')),
        CONSTRAINT fk_key_results_objective
            FOREIGN KEY (objective_id)
            REFERENCES bizops.objectives(id)
            ON DELETE CASCADE
    )",
    "CREATE INDEX IF NOT EXISTS key_results_objective_id
        ON bizops.key_results(objective_id)",
];

const DOWN: &[&str] = &[
    "DROP TABLE IF EXISTS bizops.key_results",
    "DROP TABLE IF EXISTS bizops.objectives",
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
