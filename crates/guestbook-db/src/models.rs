/// Database row types. These map directly to SQLite rows and are kept
/// separate from the wire types so the storage layer has no serde coupling.

pub struct EntryRow {
    pub id: String,
    pub name: String,
    pub message: String,
    pub created_at: String,
}
