pub use sea_orm_migration::prelude::*;

mod m20241014_102311_players_table;
mod m20241014_114020_players_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20241014_102311_players_table::Migration),
            Box::new(m20241014_114020_players_indexes::Migration),
        ]
    }
}
