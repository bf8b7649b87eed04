use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Result, anyhow};

/// How the server process lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Build once at startup, listen until shutdown.
    Standalone,
    /// Build lazily on the first request and reuse for every later one.
    OnDemand,
}

impl FromStr for Mode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standalone" => Ok(Mode::Standalone),
            "on-demand" | "ondemand" | "serverless" => Ok(Mode::OnDemand),
            other => Err(anyhow!("unknown GUESTBOOK_MODE '{}'", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    /// Global route prefix, always `/`-led and without a trailing slash.
    /// Empty means routes are mounted at the root.
    pub api_prefix: String,
    pub mode: Mode,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let host = std::env::var("GUESTBOOK_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port: u16 = std::env::var("GUESTBOOK_PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()?;
        let db_path: PathBuf = std::env::var("GUESTBOOK_DB_PATH")
            .unwrap_or_else(|_| "guestbook.db".into())
            .into();
        let api_prefix = std::env::var("GUESTBOOK_API_PREFIX").unwrap_or_else(|_| "/api".into());
        let mode = std::env::var("GUESTBOOK_MODE")
            .map(|m| m.parse::<Mode>())
            .unwrap_or(Ok(Mode::Standalone))?;

        Ok(Self {
            host,
            port,
            db_path,
            api_prefix: normalize_prefix(&api_prefix),
            mode,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// `api/`, `/api` and `/api/` all become `/api`; `/` and `` become ``.
pub fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}
