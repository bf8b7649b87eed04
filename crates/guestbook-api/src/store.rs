use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use tracing::warn;
use uuid::Uuid;

use guestbook_db::Database;
use guestbook_db::models::EntryRow;
use guestbook_types::Entry;

/// Persistence collaborator behind the HTTP handlers. Calls may block.
pub trait EntryStore: Send + Sync + 'static {
    fn list_entries(&self) -> Result<Vec<Entry>>;

    /// Assigns a fresh id and creation time.
    fn create_entry(&self, name: &str, message: &str) -> Result<Entry>;

    /// `None` when the id is unknown.
    fn update_entry(&self, id: Uuid, name: &str, message: &str) -> Result<Option<Entry>>;

    /// `false` when the id is unknown.
    fn delete_entry(&self, id: Uuid) -> Result<bool>;
}

pub type AppState = Arc<dyn EntryStore>;

impl EntryStore for Database {
    fn list_entries(&self) -> Result<Vec<Entry>> {
        Ok(Database::list_entries(self)?
            .into_iter()
            .filter_map(entry_from_row)
            .collect())
    }

    fn create_entry(&self, name: &str, message: &str) -> Result<Entry> {
        let entry = Entry {
            id: Uuid::new_v4(),
            name: name.to_string(),
            message: message.to_string(),
            created_at: now_millis(),
        };
        self.insert_entry(
            &entry.id.to_string(),
            &entry.name,
            &entry.message,
            &entry.created_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        )?;
        Ok(entry)
    }

    fn update_entry(&self, id: Uuid, name: &str, message: &str) -> Result<Option<Entry>> {
        Ok(Database::update_entry(self, &id.to_string(), name, message)?.and_then(entry_from_row))
    }

    fn delete_entry(&self, id: Uuid) -> Result<bool> {
        Database::delete_entry(self, &id.to_string())
    }
}

/// Stored timestamps carry millisecond precision, so the value handed back
/// on create must too or a later list would disagree with it.
fn now_millis() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now)
}

/// Rows whose id is not a UUID cannot be addressed by the update and delete
/// routes, so they are skipped rather than served under a made-up id.
fn entry_from_row(row: EntryRow) -> Option<Entry> {
    let id = match row.id.parse::<Uuid>() {
        Ok(id) => id,
        Err(e) => {
            warn!("Skipping entry with corrupt id '{}': {}", row.id, e);
            return None;
        }
    };

    Some(Entry {
        id,
        created_at: DateTime::parse_from_rfc3339(&row.created_at)
            .map(|dt| dt.with_timezone(&Utc))
            .or_else(|_| {
                // Rows written outside the API may use SQLite's "YYYY-MM-DD HH:MM:SS".
                chrono::NaiveDateTime::parse_from_str(&row.created_at, "%Y-%m-%d %H:%M:%S")
                    .map(|ndt| ndt.and_utc())
            })
            .unwrap_or_else(|e| {
                warn!("Corrupt created_at '{}' on entry '{}': {}", row.created_at, row.id, e);
                DateTime::default()
            }),
        name: row.name,
        message: row.message,
    })
}
