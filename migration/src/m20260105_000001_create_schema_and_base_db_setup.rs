use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create the platform's schema
        manager
            .get_connection()
            .execute_unprepared("CREATE SCHEMA IF NOT EXISTS bizops;")
            .await?;

        manager
            .get_connection()
            .execute_unprepared("SET search_path TO bizops, public;")
            .await?;

        // gen_random_uuid() is built in from PostgreSQL 13 but pgcrypto keeps older servers working
        manager
            .get_connection()
            .execute_unprepared("CREATE EXTENSION IF NOT EXISTS pgcrypto;")
            .await?;

        // Grant the application role access when it exists
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                DO $$ BEGIN
                    IF EXISTS (SELECT FROM pg_roles WHERE rolname = 'bizops') THEN
                        GRANT ALL ON SCHEMA bizops TO bizops;

                        ALTER DEFAULT PRIVILEGES IN SCHEMA bizops GRANT ALL ON TABLES TO bizops;
                        ALTER DEFAULT PRIVILEGES IN SCHEMA bizops GRANT ALL ON SEQUENCES TO bizops;
                        ALTER DEFAULT PRIVILEGES IN SCHEMA bizops GRANT ALL ON FUNCTIONS TO bizops;
                    END IF;
                END $$;
            "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                DO $$ BEGIN
                    IF EXISTS (SELECT FROM pg_roles WHERE rolname = 'bizops') THEN
                        ALTER DEFAULT PRIVILEGES IN SCHEMA bizops REVOKE ALL ON FUNCTIONS FROM bizops;
                        ALTER DEFAULT PRIVILEGES IN SCHEMA bizops REVOKE ALL ON SEQUENCES FROM bizops;
                        ALTER DEFAULT PRIVILEGES IN SCHEMA bizops REVOKE ALL ON TABLES FROM bizops;
                        REVOKE ALL ON SCHEMA bizops FROM bizops;
                    END IF;
                END $$;
            "#,
            )
            .await?;

        // CASCADE removes every table in the schema
        manager
            .get_connection()
            .execute_unprepared("DROP SCHEMA IF EXISTS bizops CASCADE;")
            .await?;

        Ok(())
    }
}
