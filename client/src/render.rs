use std::fmt::Write;

use chrono::Local;

use guestbook_types::Entry;

use crate::view::ViewState;

pub const TITLE: &str = "My Profile & Guestbook";
pub const NO_ENTRIES: &str = "No guestbook entries yet. Be the first to sign!";
pub const LOADING: &str = "Loading entries...";

pub fn submit_label(state: &ViewState) -> &'static str {
    if state.loading {
        "Saving..."
    } else if state.editing_id.is_some() {
        "Update Entry"
    } else {
        "Sign Guestbook"
    }
}

/// Creation time in the viewer's local zone.
pub fn display_time(entry: &Entry) -> String {
    entry
        .created_at
        .with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

/// Plain-text rendition of the whole page. Entries are numbered from 1 in
/// the order the server returned them.
pub fn render(state: &ViewState) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", TITLE);
    let _ = writeln!(out, "{}", "=".repeat(TITLE.len()));

    if let Some(message) = state.error_message() {
        let _ = writeln!(out, "! {}", message);
    }

    let _ = writeln!(out, "Name:    {}", state.draft.name);
    let _ = writeln!(out, "Message: {}", state.draft.message);
    let _ = write!(out, "[{}]", submit_label(state));
    if state.editing_id.is_some() {
        let _ = write!(out, " [Cancel]");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "---");

    if state.loading {
        let _ = writeln!(out, "{}", LOADING);
    }

    for (i, entry) in state.entries.iter().enumerate() {
        let _ = writeln!(out, "{:>3}. {}  ({})", i + 1, entry.name, display_time(entry));
        let _ = writeln!(out, "     {}", entry.message);
    }

    if state.entries.is_empty() && !state.loading {
        let _ = writeln!(out, "{}", NO_ENTRIES);
    }

    out
}
