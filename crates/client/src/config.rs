//! Client configuration from the environment.

use std::path::PathBuf;

pub const API_URL_VAR: &str = "ROCKETSHOES_API_URL";
pub const AUTH_TOKEN_VAR: &str = "ROCKETSHOES_AUTH_TOKEN";
pub const DB_PATH_VAR: &str = "ROCKETSHOES_DB_PATH";

pub const DEFAULT_API_URL: &str = "http://localhost:3333";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the catalog/stock API.
    pub api_url: String,
    pub auth_token: Option<String>,
    /// SQLite file holding the cart slot; `None` means the platform data dir.
    pub db_path: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            auth_token: None,
            db_path: None,
        }
    }
}

impl ClientConfig {
    /// Read configuration from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            api_url: get(API_URL_VAR).unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            auth_token: get(AUTH_TOKEN_VAR),
            db_path: get(DB_PATH_VAR).map(PathBuf::from),
        }
    }
}
