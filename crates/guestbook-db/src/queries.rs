use crate::Database;
use crate::models::EntryRow;
use anyhow::Result;
use rusqlite::{Connection, Row};

const ENTRY_COLUMNS: &str = "id, name, message, created_at";

impl Database {
    // -- Entries --

    pub fn insert_entry(&self, id: &str, name: &str, message: &str, created_at: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO entries (id, name, message, created_at) VALUES (?1, ?2, ?3, ?4)",
                (id, name, message, created_at),
            )?;
            Ok(())
        })
    }

    /// All entries, newest first. Ties on `created_at` fall back to insertion order.
    /// Timestamps are compared as instants, so RFC 3339 and SQLite's
    /// `YYYY-MM-DD HH:MM:SS` rows interleave correctly.
    pub fn list_entries(&self) -> Result<Vec<EntryRow>> {
        self.with_conn(query_entries)
    }

    /// Rewrites name and message in place. Returns the updated row, or
    /// `None` when no entry has this id.
    pub fn update_entry(&self, id: &str, name: &str, message: &str) -> Result<Option<EntryRow>> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let changed = tx.execute(
                "UPDATE entries SET name = ?2, message = ?3 WHERE id = ?1",
                (id, name, message),
            )?;
            if changed == 0 {
                return Ok(None);
            }
            let row = query_entry_by_id(&tx, id)?;
            tx.commit()?;
            Ok(row)
        })
    }

    /// Returns false when nothing was deleted.
    pub fn delete_entry(&self, id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute("DELETE FROM entries WHERE id = ?1", [id])?;
            Ok(changed > 0)
        })
    }
}

fn entry_from_row(row: &Row<'_>) -> rusqlite::Result<EntryRow> {
    Ok(EntryRow {
        id: row.get(0)?,
        name: row.get(1)?,
        message: row.get(2)?,
        created_at: row.get(3)?,
    })
}

fn query_entries(conn: &Connection) -> Result<Vec<EntryRow>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {ENTRY_COLUMNS} FROM entries ORDER BY julianday(created_at) DESC, rowid DESC"
    ))?;

    let rows = stmt
        .query_map([], entry_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

fn query_entry_by_id(conn: &Connection, id: &str) -> Result<Option<EntryRow>> {
    let mut stmt = conn.prepare(&format!("SELECT {ENTRY_COLUMNS} FROM entries WHERE id = ?1"))?;

    let row = stmt.query_row([id], entry_from_row).optional()?;

    Ok(row)
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
