use serde::{Deserialize, Serialize};

// -- Entries --

/// Body of both create (POST) and update (PUT) requests. Other keys, such as
/// a full `Entry` echoed back by a client, are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryRequest {
    pub name: String,
    pub message: String,
}

impl EntryRequest {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Returns the first required field that is blank, if any.
    pub fn missing_field(&self) -> Option<&'static str> {
        if self.name.trim().is_empty() {
            Some("name")
        } else if self.message.trim().is_empty() {
            Some("message")
        } else {
            None
        }
    }

    pub fn is_complete(&self) -> bool {
        self.missing_field().is_none()
    }
}
