//! Client side of the guestbook: an HTTP client for the four entry
//! endpoints and the form view-model that drives it.

pub mod api;
pub mod config;
pub mod error;
pub mod render;
pub mod view;

pub use api::ApiClient;
pub use config::ClientConfig;
pub use error::{ApiError, ClientError};
pub use view::{Confirm, Draft, Guestbook, Submit, ViewState};
