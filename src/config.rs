//! Runtime configuration, read from the environment.

use std::env;
use std::path::PathBuf;

use crate::error::{PollError, PollResult};
use crate::models::DEFAULT_AUTHOR;

pub const STORE_PATH_VAR: &str = "POLLBOX_STORE_PATH";
pub const SHARE_ORIGIN_VAR: &str = "POLLBOX_SHARE_ORIGIN";
pub const DEFAULT_AUTHOR_VAR: &str = "POLLBOX_DEFAULT_AUTHOR";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// JSON file backing the key-value store.
    pub store_path: PathBuf,
    /// Origin prefixed to `/poll/{id}` share links, without a trailing slash.
    pub share_origin: String,
    /// Author recorded on comments submitted without a name.
    pub default_author: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from("data/pollbox.json"),
            share_origin: "http://localhost:3000".to_string(),
            default_author: DEFAULT_AUTHOR.to_string(),
        }
    }
}

impl Config {
    /// Load `.env` if present, then read `POLLBOX_*` variables over the
    /// defaults.
    pub fn from_env() -> PollResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> PollResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = lookup(STORE_PATH_VAR) {
            if path.trim().is_empty() {
                return Err(PollError::Config(format!("{STORE_PATH_VAR} is empty")));
            }
            config.store_path = PathBuf::from(path);
        }

        if let Some(origin) = lookup(SHARE_ORIGIN_VAR) {
            let origin = origin.trim().trim_end_matches('/');
            if !(origin.starts_with("http://") || origin.starts_with("https://")) {
                return Err(PollError::Config(format!(
                    "{SHARE_ORIGIN_VAR} must be an http(s) origin, got {origin:?}"
                )));
            }
            config.share_origin = origin.to_string();
        }

        if let Some(author) = lookup(DEFAULT_AUTHOR_VAR) {
            let author = author.trim();
            if !author.is_empty() {
                config.default_author = author.to_string();
            }
        }

        Ok(config)
    }
}
