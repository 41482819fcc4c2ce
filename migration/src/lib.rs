pub use sea_orm_migration::prelude::*;

pub mod entities;
mod m20250301_000001_initial_tables;
mod m20250315_000001_click_logs;
mod m20250402_000001_user_profiles;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_initial_tables::Migration),
            Box::new(m20250315_000001_click_logs::Migration),
            Box::new(m20250402_000001_user_profiles::Migration),
        ]
    }
}
