use reqwest::Url;

use crate::error::ApiError;

pub const DEFAULT_API_URL: &str = "/api/guestbook";
pub const DEFAULT_ORIGIN: &str = "http://localhost:3000";

/// Where the entry endpoints live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Absolute collection URL without a trailing slash,
    /// e.g. `http://localhost:3000/api/guestbook`.
    pub base_url: String,
}

impl ClientConfig {
    /// `api_url` may be absolute, or relative to `origin`.
    pub fn new(api_url: &str, origin: &str) -> Result<Self, ApiError> {
        let url = if api_url.starts_with("http://") || api_url.starts_with("https://") {
            Url::parse(api_url)
        } else {
            Url::parse(origin).and_then(|o| o.join(api_url))
        }
        .map_err(|e| ApiError::InvalidUrl(format!("{} ({})", api_url, e)))?;

        Ok(Self {
            base_url: url.as_str().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_env() -> Result<Self, ApiError> {
        let api_url = std::env::var("GUESTBOOK_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.into());
        let origin = std::env::var("GUESTBOOK_ORIGIN").unwrap_or_else(|_| DEFAULT_ORIGIN.into());
        Self::new(&api_url, &origin)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: format!("{}{}", DEFAULT_ORIGIN, DEFAULT_API_URL),
        }
    }
}
