pub use sea_orm_migration::prelude::*;

mod m20260301_000001_create_schedules;
mod m20260301_000002_create_transactions;
mod m20260301_000003_create_jobs;
mod m20260301_000004_create_logs;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260301_000001_create_schedules::Migration),
            Box::new(m20260301_000002_create_transactions::Migration),
            Box::new(m20260301_000003_create_jobs::Migration),
            Box::new(m20260301_000004_create_logs::Migration),
        ]
    }
}
