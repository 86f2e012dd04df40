pub mod migrations;
pub mod schema;

use crate::error::Result as AppResult;
use crate::models::settings::{ProtectedDomains, Settings, SettingsStore};
use rusqlite::{Connection, Result};
use std::path::Path;

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl SettingsStore for Database {
    fn load_settings(&self) -> AppResult<Settings> {
        Ok(Settings::load(&self.conn)?)
    }

    fn load_protected_domains(&self) -> AppResult<ProtectedDomains> {
        Ok(Settings::load_protected_domains(&self.conn)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_database_opens() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let _db = Database::open(&db_path).unwrap();
        assert!(db_path.exists());
    }

    #[test]
    fn test_migrations_run() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(&db_path).unwrap();
        migrations::run(db.connection()).unwrap();

        let count: i32 = db
            .connection()
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='settings'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_migrations_are_idempotent() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(&db_path).unwrap();

        migrations::run(db.connection()).unwrap();
        Settings::save_timeout_minutes(db.connection(), 30).unwrap();
        migrations::run(db.connection()).unwrap();

        // Rerunning must keep stored settings
        let settings = db.load_settings().unwrap();
        assert_eq!(settings.timeout_minutes, 30);
    }

    #[test]
    fn test_settings_survive_reopen() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        {
            let db = Database::open(&db_path).unwrap();
            migrations::run(db.connection()).unwrap();
            let domains = ProtectedDomains::from_entries(["example.com"]);
            Settings::save_protected_domains(db.connection(), &domains).unwrap();
        }

        let db = Database::open(&db_path).unwrap();
        migrations::run(db.connection()).unwrap();
        let domains = db.load_protected_domains().unwrap();
        assert_eq!(domains.as_slice(), &["example.com"]);
    }
}
