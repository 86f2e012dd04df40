pub mod active_index;
pub mod activity;
pub mod clock;
pub mod constants;
pub mod db;
pub mod engine;
pub mod error;
pub mod host;
pub mod models;
pub mod native_host;
pub mod policy;
pub mod scheduler;
#[cfg(test)]
mod test_utils;
pub mod validation;

use crate::db::{migrations, Database};
use crate::native_host::{spawn_reader, NativeBridge, NativeHost};
use directories::ProjectDirs;
use log::{error, info};
use std::io;
use std::path::PathBuf;

/// Error type for native host startup failures
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("Could not determine project directories")]
    NoProjectDirs,
    #[error("Could not create data directory: {0}")]
    DataDirCreation(io::Error),
    #[error("Failed to open database: {0}")]
    DatabaseOpen(rusqlite::Error),
    #[error("Failed to run database migrations: {0}")]
    Migration(rusqlite::Error),
    #[error("Failed to start stdin reader: {0}")]
    Reader(io::Error),
}

/// Get the database path, creating the data directory if needed.
pub fn get_db_path() -> Result<PathBuf, InitError> {
    let proj_dirs =
        ProjectDirs::from("com", "closetabs", "CloseTabs").ok_or(InitError::NoProjectDirs)?;
    let data_dir = proj_dirs.data_dir();
    std::fs::create_dir_all(data_dir).map_err(InitError::DataDirCreation)?;
    Ok(data_dir.join("closetabs.db"))
}

/// Open the settings database and bring its schema up to date.
pub fn open_database() -> Result<Database, InitError> {
    let db_path = get_db_path()?;
    let db = Database::open(&db_path).map_err(InitError::DatabaseOpen)?;
    migrations::run(db.connection()).map_err(InitError::Migration)?;
    info!("Using settings database at {}", db_path.display());
    Ok(db)
}

/// Serve the extension over stdin/stdout until it disconnects.
pub fn run_native_host() -> Result<(), InitError> {
    let db = open_database()?;
    let (inbox, reader) = spawn_reader(io::stdin()).map_err(InitError::Reader)?;

    let mut host = NativeHost::new(NativeBridge::new(io::stdout(), inbox), db);
    host.run();

    // The reader has already hit EOF or a fatal frame error once the loop ends
    if reader.join().is_err() {
        error!("Stdin reader thread panicked");
    }
    Ok(())
}
