pub mod api;
pub mod models;

pub use api::EntryRequest;
pub use models::Entry;
