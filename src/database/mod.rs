use log::{error, info, warn};
use migration::{Migrator, MigratorTrait};
use sea_orm::{Database as SeaDatabase, EntityTrait, PaginatorTrait};
use std::{
    fs::{create_dir_all, File},
    path::Path,
};

pub mod entities;
pub mod import;
mod migration;

/// Seeding helpers for tests
#[cfg(test)]
pub mod seed;

// Re-exports of database types
pub use sea_orm::DatabaseConnection;
pub use sea_orm::DbErr;

use self::entities::players;
use crate::config::Config;

/// Database error result type
pub type DbResult<T> = Result<T, DbErr>;

/// Connects to the database and runs the one-time bulk import if the
/// players table is still empty, returning the database connection
pub async fn init(config: &Config) -> DatabaseConnection {
    let connection = connect_database(&config.database.path).await;

    info!("Connected to database..");

    if !config.import.is_empty() {
        init_import(&connection, config).await;
    }

    connection
}

/// Connects to the sqlite database stored at the provided path
async fn connect_database(database_path: &str) -> DatabaseConnection {
    let path = Path::new(database_path);

    // Create path to database file if missing
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            create_dir_all(parent).expect("Unable to create parent directory for sqlite database");
        }
    }

    // Create the database if file is missing
    if !path.exists() {
        File::create(path).expect("Unable to create sqlite database file");
    }

    let url = format!("sqlite:{database_path}");

    // Connect to database
    let connection = SeaDatabase::connect(&url)
        .await
        .expect("Unable to create database connection");

    run_migrations(&connection).await;

    connection
}

/// Applies any pending migrations to the provided connection
async fn run_migrations(connection: &DatabaseConnection) {
    if let Err(err) = Migrator::up(connection, None).await {
        if let DbErr::Custom(custom_err) = err {
            if custom_err
                .contains("is missing, this migration has been applied but its file is missing")
            {
                // Forward migrations are not always a failure, so its just a warning
                warn!(
                    "It looks like your app.db has been used with a newer version \
                of the server, you may encounter unexpected issues or bugs its \
                recommended that you backup your database before trying a new version: {}",
                    custom_err
                )
            }
        } else {
            // Other errors should be considered fatal
            panic!("Failed to run database migrations: {}", err);
        }
    }
}

/// Imports the configured CSV sources when no player cards exist
/// yet, existing data is never replaced
///
/// `db`     The database connection
/// `config` The config containing the import sources
async fn init_import(db: &DatabaseConnection, config: &Config) {
    let existing = match players::Entity::find().count(db).await {
        Ok(value) => value,
        Err(err) => {
            error!("Failed to count existing players before import: {:?}", err);
            return;
        }
    };

    if existing > 0 {
        info!("Skipping player import, {existing} cards already present");
        return;
    }

    for source in &config.import {
        match import::import_file(db, source).await {
            Ok(imported) => info!(
                "Imported {} cards from {}",
                imported,
                source.path.display()
            ),
            Err(err) => error!(
                "Failed to import players from {}: {}",
                source.path.display(),
                err
            ),
        }
    }
}
