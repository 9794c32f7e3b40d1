use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // credentials holds base64 AES-256-GCM ciphertext, never plaintext secrets
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE TABLE IF NOT EXISTS bizops.integrations (
                    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                    organization_id UUID NOT NULL,
                    provider VARCHAR(32) NOT NULL,
                    credentials TEXT NOT NULL,
                    credential_keys JSONB NOT NULL DEFAULT '[]'::jsonb,
                    base_url TEXT,
                    enabled BOOLEAN NOT NULL DEFAULT true,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                    CONSTRAINT integrations_organization_provider_unique
                        UNIQUE (organization_id, provider),
                    CONSTRAINT integrations_provider_check
                        CHECK (provider IN ('splynx', 'firebase', 'xero', 'google_maps', 'airtable', 'vapi')),
                    CONSTRAINT fk_integrations_organization
                        FOREIGN KEY (organization_id)
                        REFERENCES bizops.organizations(id)
                        ON DELETE CASCADE
                )",
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP TABLE IF EXISTS bizops.integrations")
            .await?;

        Ok(())
    }
}
