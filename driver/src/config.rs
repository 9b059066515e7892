//! Driver configuration.
//!
//! A driver needs three values: a collection name, the API host, and a
//! bearer token. All three are validated and normalized at load time; a
//! driver cannot function without them, so loading is the single fatal path
//! in the crate (see [`crate::store::StorageDriver::open_or_exit`]).

use depot_engine::{normalize_collection_name, resolve_token_from_env, CollectionName};
use std::env;

/// Environment variable names used by [`Config::from_env`].
pub const ENV_COLLECTION: &str = "DEPOT_COLLECTION";
pub const ENV_HOST: &str = "DEPOT_HOST";
pub const ENV_TOKEN: &str = "DEPOT_TOKEN";

/// Validated driver configuration.
///
/// Held values are already normalized: the collection name is in its remote
/// form, the host has no trailing slash, and token templates are resolved.
#[derive(Debug, Clone)]
pub struct Config {
    /// Normalized remote collection name
    pub collection: CollectionName,
    /// API base URL, trailing slash stripped
    pub host: String,
    /// Resolved bearer token
    pub token: String,
}

impl Config {
    /// Validate and normalize a configuration.
    ///
    /// The collection name is normalized per
    /// [`normalize_collection_name`]; the token may contain
    /// `{{ ENV_VAR_NAME }}` placeholders, resolved against the process
    /// environment (missing variables substitute the empty string).
    pub fn new(
        collection: impl AsRef<str>,
        host: impl AsRef<str>,
        token: impl AsRef<str>,
    ) -> Result<Self, ConfigError> {
        let raw = collection.as_ref();
        let collection = normalize_collection_name(raw);
        if !collection.chars().any(|c| c.is_ascii_alphanumeric()) {
            return Err(ConfigError::InvalidCollection(raw.to_string()));
        }

        let host = host.as_ref().trim_end_matches('/').to_string();
        if host.is_empty() {
            return Err(ConfigError::EmptyHost);
        }

        let token = resolve_token_from_env(token.as_ref());
        if token.is_empty() {
            return Err(ConfigError::EmptyToken);
        }

        Ok(Self {
            collection,
            host,
            token,
        })
    }

    /// Load configuration from the environment.
    ///
    /// Reads `DEPOT_COLLECTION`, `DEPOT_HOST` and `DEPOT_TOKEN`, honoring a
    /// `.env` file if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let collection = env::var(ENV_COLLECTION).map_err(|_| ConfigError::Missing(ENV_COLLECTION))?;
        let host = env::var(ENV_HOST).map_err(|_| ConfigError::Missing(ENV_HOST))?;
        let token = env::var(ENV_TOKEN).map_err(|_| ConfigError::Missing(ENV_TOKEN))?;

        Self::new(collection, host, token)
    }
}

/// Configuration errors. All of these are fatal for a driver process.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),

    #[error("collection name {0:?} normalizes to nothing usable")]
    InvalidCollection(String),

    #[error("host must not be empty")]
    EmptyHost,

    #[error("token resolves to an empty string")]
    EmptyToken,
}
