use crate::constants::{
    DEFAULT_TIMEOUT_MINUTES, MILLIS_PER_MINUTE, STORAGE_KEY_INACTIVITY_TIMEOUT_MINUTES,
    STORAGE_KEY_PROTECTED_DOMAINS,
};
use crate::error::Result;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;

/// Read access to persisted settings, as the engine needs it.
pub trait SettingsStore {
    fn load_settings(&self) -> Result<Settings>;

    fn load_protected_domains(&self) -> Result<ProtectedDomains> {
        self.load_settings().map(|s| s.protected_domains)
    }
}

/// Normalized set of protected hostname suffixes.
///
/// Entries are trimmed, lower-cased, stripped of a leading `*.` or `.`, and
/// deduplicated keeping the first occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProtectedDomains(Vec<String>);

impl ProtectedDomains {
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut domains: Vec<String> = Vec::new();
        for entry in entries {
            if let Some(domain) = normalize_domain(entry.as_ref()) {
                if !domains.contains(&domain) {
                    domains.push(domain);
                }
            }
        }
        Self(domains)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn normalize_domain(raw: &str) -> Option<String> {
    let lowered = raw.trim().to_lowercase();
    let domain = lowered
        .strip_prefix("*.")
        .unwrap_or(lowered.as_str())
        .trim_start_matches('.');
    if domain.is_empty() {
        None
    } else {
        Some(domain.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub timeout_minutes: i64,
    pub protected_domains: ProtectedDomains,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            timeout_minutes: DEFAULT_TIMEOUT_MINUTES,
            protected_domains: ProtectedDomains::default(),
        }
    }
}

impl Settings {
    pub fn inactivity_limit_ms(&self) -> i64 {
        inactivity_limit_ms(self.timeout_minutes)
    }

    pub fn load(conn: &Connection) -> rusqlite::Result<Self> {
        Ok(Self {
            timeout_minutes: Self::load_timeout_minutes(conn)?,
            protected_domains: Self::load_protected_domains(conn)?,
        })
    }

    /// Stored limit, or the default when absent, non-numeric, or not positive.
    pub fn load_timeout_minutes(conn: &Connection) -> rusqlite::Result<i64> {
        let stored = read_value(conn, STORAGE_KEY_INACTIVITY_TIMEOUT_MINUTES)?;
        Ok(stored
            .as_ref()
            .and_then(Value::as_i64)
            .filter(|minutes| *minutes > 0)
            .unwrap_or(DEFAULT_TIMEOUT_MINUTES))
    }

    /// Stored domains, or an empty set when absent or not a list.
    /// Non-string list items are skipped.
    pub fn load_protected_domains(conn: &Connection) -> rusqlite::Result<ProtectedDomains> {
        let stored = read_value(conn, STORAGE_KEY_PROTECTED_DOMAINS)?;
        let domains = stored
            .as_ref()
            .and_then(Value::as_array)
            .map(|items| ProtectedDomains::from_entries(items.iter().filter_map(Value::as_str)))
            .unwrap_or_default();
        Ok(domains)
    }

    pub fn save_timeout_minutes(conn: &Connection, minutes: i64) -> rusqlite::Result<()> {
        write_value(conn, STORAGE_KEY_INACTIVITY_TIMEOUT_MINUTES, &Value::from(minutes))
    }

    pub fn save_protected_domains(
        conn: &Connection,
        domains: &ProtectedDomains,
    ) -> rusqlite::Result<()> {
        let list = Value::from(domains.as_slice().to_vec());
        write_value(conn, STORAGE_KEY_PROTECTED_DOMAINS, &list)
    }
}

pub fn inactivity_limit_ms(minutes: i64) -> i64 {
    minutes.saturating_mul(MILLIS_PER_MINUTE)
}

fn read_value(conn: &Connection, key: &str) -> rusqlite::Result<Option<Value>> {
    let raw: Option<String> = conn
        .query_row("SELECT value FROM settings WHERE key = ?1", [key], |row| {
            row.get(0)
        })
        .optional()?;

    // Unparseable values count as absent
    Ok(raw.and_then(|text| serde_json::from_str(&text).ok()))
}

fn write_value(conn: &Connection, key: &str, value: &Value) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO settings (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        params![key, value.to_string()],
    )?;
    Ok(())
}
