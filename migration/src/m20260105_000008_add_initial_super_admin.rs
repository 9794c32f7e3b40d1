use password_auth::generate_hash;
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::{DbBackend, Statement, Value};
use service::config::RustEnv;
use std::env;
use std::str::FromStr;

#[derive(DeriveMigrationName)]
pub struct Migration;

const ADMIN_EMAIL: &str = "admin@bizops.local";

fn runtime_env() -> RustEnv {
    env::var("RUST_ENV")
        .ok()
        .and_then(|value| RustEnv::from_str(&value).ok())
        .unwrap_or(RustEnv::Development)
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        match runtime_env() {
            RustEnv::Development | RustEnv::Staging => insert_super_admin(manager).await,
            // Production super admins are provisioned out of band
            RustEnv::Production => Ok(()),
        }
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        match runtime_env() {
            RustEnv::Development | RustEnv::Staging => delete_super_admin(manager).await,
            RustEnv::Production => Ok(()),
        }
    }
}

// Raw SQL stays valid when the entities gain fields in later migrations.
// An existing admin row makes the CTE empty, so no role is inserted twice.
async fn insert_super_admin(manager: &SchemaManager<'_>) -> Result<(), DbErr> {
    let password = env::var("BIZOPS_ADMIN_PASSWORD").unwrap_or_else(|_| "password".to_string());

    manager
        .get_connection()
        .execute(Statement::from_sql_and_values(
            DbBackend::Postgres,
            r#"
                WITH new_user AS (
                    INSERT INTO bizops.users (email, first_name, last_name, display_name, password)
                    VALUES ($1, $2, $3, $4, $5)
                    ON CONFLICT (email) DO NOTHING
                    RETURNING id
                )
                INSERT INTO bizops.user_roles (user_id, organization_id, role)
                SELECT id, NULL, 'super_admin' FROM new_user
            "#,
            vec![
                Value::String(Some(Box::new(ADMIN_EMAIL.to_owned()))),
                Value::String(Some(Box::new("Platform".to_owned()))),
                Value::String(Some(Box::new("Admin".to_owned()))),
                Value::String(Some(Box::new("Platform Admin".to_owned()))),
                Value::String(Some(Box::new(generate_hash(password)))),
            ],
        ))
        .await?;

    Ok(())
}

async fn delete_super_admin(manager: &SchemaManager<'_>) -> Result<(), DbErr> {
    manager
        .get_connection()
        .execute(Statement::from_sql_and_values(
            DbBackend::Postgres,
            "DELETE FROM bizops.users WHERE email = $1",
            vec![Value::String(Some(Box::new(ADMIN_EMAIL.to_owned())))],
        ))
        .await?;

    Ok(())
}
