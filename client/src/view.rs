//! Form view-model: entry list, draft, edit target, loading flag and the
//! last error, published through a `watch` channel for whatever UI renders it.
//!
//! Every successful mutation is followed by one full reload of the list.
//! `loading` tells the UI to disable its inputs; it does not stop a second
//! call from being issued while one is in flight.

use tokio::sync::watch;
use tracing::error;
use uuid::Uuid;

use guestbook_types::{Entry, EntryRequest};

use crate::api::ApiClient;
use crate::error::ClientError;

pub const DELETE_PROMPT: &str = "Are you sure you want to delete this entry?";

/// Interactive yes/no question asked before a destructive action.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Form values not yet submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    pub name: String,
    pub message: String,
}

impl Draft {
    pub fn to_request(&self) -> EntryRequest {
        EntryRequest::new(self.name.clone(), self.message.clone())
    }

    /// Both fields are required.
    pub fn is_complete(&self) -> bool {
        self.to_request().is_complete()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ViewState {
    pub entries: Vec<Entry>,
    pub draft: Draft,
    pub editing_id: Option<Uuid>,
    pub loading: bool,
    pub error: Option<ClientError>,
}

impl ViewState {
    pub fn error_message(&self) -> Option<&'static str> {
        self.error.as_ref().map(ClientError::message)
    }
}

/// Result of [`Guestbook::submit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submit {
    /// A required field was blank; nothing was sent.
    Incomplete,
    Saved,
    Failed,
}

pub struct Guestbook {
    api: ApiClient,
    state: watch::Sender<ViewState>,
}

impl Guestbook {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            state: watch::Sender::new(ViewState::default()),
        }
    }

    /// Creates the view-model and performs the initial load.
    pub async fn init(api: ApiClient) -> Self {
        let guestbook = Self::new(api);
        guestbook.load_entries().await;
        guestbook
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> ViewState {
        self.state.borrow().clone()
    }

    pub fn set_name(&self, name: impl Into<String>) {
        let name = name.into();
        self.state.send_modify(|s| s.draft.name = name);
    }

    pub fn set_message(&self, message: impl Into<String>) {
        let message = message.into();
        self.state.send_modify(|s| s.draft.message = message);
    }

    fn set_loading(&self, loading: bool) {
        self.state.send_modify(|s| s.loading = loading);
    }

    fn fail(&self, err: ClientError) {
        self.state.send_modify(|s| s.error = Some(err));
    }

    /// Replaces the list with the server's. On failure the previous list
    /// stays and the error is set. Returns whether the load succeeded.
    pub async fn load_entries(&self) -> bool {
        self.set_loading(true);

        let ok = match self.api.list().await {
            Ok(entries) => {
                self.state.send_modify(|s| {
                    s.entries = entries;
                    s.error = None;
                });
                true
            }
            Err(e) => {
                error!("Error loading entries: {}", e);
                self.fail(ClientError::LoadFailed { detail: e.to_string() });
                false
            }
        };

        self.set_loading(false);
        ok
    }

    /// Creates an entry from the draft, or updates the entry being edited.
    /// The draft and edit target survive a failed attempt.
    pub async fn submit(&self) -> Submit {
        let (req, editing_id) = {
            let state = self.state.borrow();
            (state.draft.to_request(), state.editing_id)
        };
        if !req.is_complete() {
            return Submit::Incomplete;
        }

        self.set_loading(true);

        let sent = match editing_id {
            Some(id) => self.api.update(id, &req).await.map(drop),
            None => self.api.create(&req).await.map(drop),
        };

        let outcome = match sent {
            Ok(()) => {
                self.state.send_modify(|s| {
                    s.draft = Draft::default();
                    s.editing_id = None;
                });
                self.load_entries().await;
                Submit::Saved
            }
            Err(e) => {
                error!("Error submitting entry: {}", e);
                self.fail(ClientError::SubmitFailed { detail: e.to_string() });
                Submit::Failed
            }
        };

        self.set_loading(false);
        outcome
    }

    /// Deletes after the user confirms. Returns whether the entry was deleted.
    pub async fn delete(&self, id: Uuid, confirm: &impl Confirm) -> bool {
        if !confirm.confirm(DELETE_PROMPT) {
            return false;
        }

        self.set_loading(true);

        let deleted = match self.api.delete(id).await {
            Ok(()) => {
                self.load_entries().await;
                true
            }
            Err(e) => {
                error!("Error deleting entry: {}", e);
                self.fail(ClientError::DeleteFailed { detail: e.to_string() });
                false
            }
        };

        self.set_loading(false);
        deleted
    }

    pub fn start_edit(&self, entry: &Entry) {
        self.state.send_modify(|s| {
            s.editing_id = Some(entry.id);
            s.draft = Draft {
                name: entry.name.clone(),
                message: entry.message.clone(),
            };
        });
    }

    pub fn cancel_edit(&self) {
        self.state.send_modify(|s| {
            s.editing_id = None;
            s.draft = Draft::default();
        });
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use chrono::{TimeZone, Utc};
    use mockito::{Matcher, Mock, Server, ServerGuard};
    use serde_json::json;

    use super::*;
    use crate::config::ClientConfig;
    use crate::error::{DELETE_FAILED, LOAD_FAILED, SUBMIT_FAILED};

    const BASE: &str = "/api/guestbook";

    fn entry(name: &str, message: &str) -> Entry {
        Entry {
            id: Uuid::new_v4(),
            name: name.into(),
            message: message.into(),
            created_at: Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap(),
        }
    }

    fn guestbook(server: &ServerGuard) -> Guestbook {
        Guestbook::new(ApiClient::new(ClientConfig::new(BASE, &server.url()).unwrap()))
    }

    fn entry_path(id: Uuid) -> String {
        format!("{}/{}", BASE, id)
    }

    async fn list_mock(server: &mut ServerGuard, entries: &[Entry]) -> Mock {
        server
            .mock("GET", BASE)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(serde_json::to_string(entries).unwrap())
            .create_async()
            .await
    }

    async fn failing_list_mock(server: &mut ServerGuard) -> Mock {
        server.mock("GET", BASE).with_status(500).create_async().await
    }

    /// One mock per method that must never be hit.
    async fn forbid_all(server: &mut ServerGuard) -> Vec<Mock> {
        let mut mocks = Vec::new();
        for method in ["GET", "POST", "PUT", "DELETE"] {
            mocks.push(server.mock(method, Matcher::Any).expect(0).create_async().await);
        }
        mocks
    }

    #[tokio::test]
    async fn init_loads_entries() {
        let mut server = Server::new_async().await;
        let entries = vec![entry("Alice", "Hi"), entry("Bob", "Hey")];
        let mock = list_mock(&mut server, &entries).await;

        let gb = Guestbook::init(ApiClient::new(ClientConfig::new(BASE, &server.url()).unwrap())).await;
        mock.assert_async().await;

        let state = gb.snapshot();
        assert_eq!(state.entries, entries);
        assert!(state.error.is_none());
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn load_failure_keeps_entries_and_shows_generic_message() {
        let mut server = Server::new_async().await;
        let entries = vec![entry("Alice", "Hi")];
        let ok = list_mock(&mut server, &entries).await;

        let gb = guestbook(&server);
        assert!(gb.load_entries().await);
        ok.remove_async().await;

        let _failing = failing_list_mock(&mut server).await;
        assert!(!gb.load_entries().await);

        let state = gb.snapshot();
        assert_eq!(state.error_message(), Some(LOAD_FAILED));
        assert!(matches!(state.error, Some(ClientError::LoadFailed { .. })));
        assert_eq!(state.entries, entries);
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn successful_load_clears_error() {
        let mut server = Server::new_async().await;
        let failing = failing_list_mock(&mut server).await;

        let gb = guestbook(&server);
        gb.load_entries().await;
        assert!(gb.snapshot().error.is_some());
        failing.remove_async().await;

        let _list = list_mock(&mut server, &[]).await;
        gb.load_entries().await;
        assert!(gb.snapshot().error.is_none());
    }

    #[tokio::test]
    async fn create_resets_form_and_reloads_once() {
        let mut server = Server::new_async().await;
        let created = entry("Alice", "Hi");
        let post = server
            .mock("POST", BASE)
            .match_body(Matcher::Json(json!({ "name": "Alice", "message": "Hi" })))
            .with_status(201)
            .with_body(serde_json::to_string(&created).unwrap())
            .create_async()
            .await;
        let list = server
            .mock("GET", BASE)
            .with_body(serde_json::to_string(&[&created]).unwrap())
            .expect(1)
            .create_async()
            .await;

        let gb = guestbook(&server);
        gb.set_name("Alice");
        gb.set_message("Hi");
        assert_eq!(gb.submit().await, Submit::Saved);

        post.assert_async().await;
        list.assert_async().await;

        let state = gb.snapshot();
        assert_eq!(state.draft, Draft::default());
        assert_eq!(state.editing_id, None);
        assert_eq!(state.entries, vec![created]);
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn editing_submits_an_update() {
        let mut server = Server::new_async().await;
        let original = entry("Alice", "Hi");
        let updated = Entry {
            name: "Bob".into(),
            message: "Updated".into(),
            ..original.clone()
        };
        let put = server
            .mock("PUT", entry_path(original.id).as_str())
            .match_body(Matcher::Json(json!({ "name": "Bob", "message": "Updated" })))
            .with_body(serde_json::to_string(&updated).unwrap())
            .create_async()
            .await;
        let _list = list_mock(&mut server, &[updated.clone()]).await;

        let gb = guestbook(&server);
        gb.start_edit(&original);
        assert_eq!(gb.snapshot().editing_id, Some(original.id));
        gb.set_name("Bob");
        gb.set_message("Updated");

        assert_eq!(gb.submit().await, Submit::Saved);
        put.assert_async().await;

        let state = gb.snapshot();
        assert_eq!(state.editing_id, None);
        assert_eq!(state.entries, vec![updated]);
    }

    #[tokio::test]
    async fn failed_submit_keeps_draft_for_retry() {
        let mut server = Server::new_async().await;
        let original = entry("Alice", "Hi");
        let _put = server
            .mock("PUT", entry_path(original.id).as_str())
            .with_status(500)
            .create_async()
            .await;
        let list = server.mock("GET", BASE).expect(0).create_async().await;

        let gb = guestbook(&server);
        gb.start_edit(&original);
        gb.set_message("Edited");

        assert_eq!(gb.submit().await, Submit::Failed);
        list.assert_async().await;

        let state = gb.snapshot();
        assert_eq!(state.error_message(), Some(SUBMIT_FAILED));
        assert_eq!(state.editing_id, Some(original.id));
        assert_eq!(state.draft, Draft { name: "Alice".into(), message: "Edited".into() });
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn empty_message_never_reaches_the_network() {
        let mut server = Server::new_async().await;
        let forbidden = forbid_all(&mut server).await;

        let gb = guestbook(&server);
        gb.set_name("Alice");
        assert_eq!(gb.submit().await, Submit::Incomplete);

        gb.set_message("   ");
        assert_eq!(gb.submit().await, Submit::Incomplete);

        for mock in forbidden {
            mock.assert_async().await;
        }
        let state = gb.snapshot();
        assert_eq!(state.draft.name, "Alice");
        assert!(state.error.is_none());
    }

    #[tokio::test]
    async fn edit_then_cancel_sends_nothing() {
        let mut server = Server::new_async().await;
        let forbidden = forbid_all(&mut server).await;

        let gb = guestbook(&server);
        let target = entry("Alice", "Hi");
        gb.start_edit(&target);
        assert_eq!(gb.snapshot().draft, Draft { name: "Alice".into(), message: "Hi".into() });

        gb.cancel_edit();

        for mock in forbidden {
            mock.assert_async().await;
        }
        let state = gb.snapshot();
        assert_eq!(state.draft, Draft::default());
        assert_eq!(state.editing_id, None);
    }

    #[tokio::test]
    async fn declined_delete_sends_nothing() {
        let mut server = Server::new_async().await;
        let forbidden = forbid_all(&mut server).await;

        let gb = guestbook(&server);
        let asked = RefCell::new(None);
        let deleted = gb
            .delete(Uuid::new_v4(), &|prompt: &str| {
                *asked.borrow_mut() = Some(prompt.to_string());
                false
            })
            .await;

        assert!(!deleted);
        assert_eq!(asked.into_inner().as_deref(), Some(DELETE_PROMPT));
        for mock in forbidden {
            mock.assert_async().await;
        }
    }

    #[tokio::test]
    async fn confirmed_delete_reloads() {
        let mut server = Server::new_async().await;
        let gone = entry("Alice", "Hi");
        let delete = server
            .mock("DELETE", entry_path(gone.id).as_str())
            .with_status(204)
            .create_async()
            .await;
        let list = list_mock(&mut server, &[]).await;

        let gb = guestbook(&server);
        assert!(gb.delete(gone.id, &|_: &str| true).await);

        delete.assert_async().await;
        list.assert_async().await;
        assert!(gb.snapshot().entries.is_empty());
    }

    #[tokio::test]
    async fn delete_error_replaces_previous_error() {
        let mut server = Server::new_async().await;
        let _failing = failing_list_mock(&mut server).await;
        let id = Uuid::new_v4();
        let _delete = server
            .mock("DELETE", entry_path(id).as_str())
            .with_status(404)
            .create_async()
            .await;

        let gb = guestbook(&server);
        gb.load_entries().await;
        assert_eq!(gb.snapshot().error_message(), Some(LOAD_FAILED));

        assert!(!gb.delete(id, &|_: &str| true).await);
        let state = gb.snapshot();
        assert_eq!(state.error_message(), Some(DELETE_FAILED));
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn subscribers_see_updates() {
        let mut server = Server::new_async().await;
        let _list = list_mock(&mut server, &[entry("Alice", "Hi")]).await;

        let gb = guestbook(&server);
        let mut rx = gb.subscribe();
        assert!(!rx.has_changed().unwrap());

        gb.load_entries().await;
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().entries.len(), 1);
    }
}
