pub use sea_orm_migration::prelude::*;

mod m20260105_000001_create_schema_and_base_db_setup;
mod m20260105_000002_create_core_tables;
mod m20260105_000003_create_crm_tables;
mod m20260105_000004_create_strategy_tables;
mod m20260105_000005_create_content_tables;
mod m20260105_000006_create_integrations_table;
mod m20260105_000007_add_sorting_indexes;
mod m20260105_000008_add_initial_super_admin;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260105_000001_create_schema_and_base_db_setup::Migration),
            Box::new(m20260105_000002_create_core_tables::Migration),
            Box::new(m20260105_000003_create_crm_tables::Migration),
            Box::new(m20260105_000004_create_strategy_tables::Migration),
            Box::new(m20260105_000005_create_content_tables::Migration),
            Box::new(m20260105_000006_create_integrations_table::Migration),
            Box::new(m20260105_000007_add_sorting_indexes::Migration),
            Box::new(m20260105_000008_add_initial_super_admin::Migration),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn migration_names_are_unique_and_ordered() {
        let names: Vec<String> = Migrator::migrations()
            .iter()
            .map(|migration| migration.name().to_string())
            .collect();

        let unique: HashSet<&String> = names.iter().collect();
        assert_eq!(unique.len(), names.len());

        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(sorted, names);
    }
}
