//! Connection parameters and default headers.
//!
//! # Design
//! `ConfigStore` is an ordinary value: build it with [`ConfigStore::load`] or
//! [`ConfigStore::from_properties`] and hand an `Arc` of it to the client.
//! [`ConfigStore::shared`] is a convenience for suites that want one store per
//! process; it loads `resources/config.properties` exactly once, even when
//! several test threads race on first access.
//!
//! Values resolve from three layers: built-in defaults, then the property
//! file, then runtime [`ConfigStore::set_property`] overrides.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::OnceCell;
use parking_lot::RwLock;

use crate::error::ConfigError;
use crate::properties::{self, Properties};

pub const BASE_URL_KEY: &str = "api.base.url";
pub const TIMEOUT_KEY: &str = "api.timeout";
pub const PREVIEW_LENGTH_KEY: &str = "api.log.preview.length";

pub const DEFAULT_BASE_URL: &str = "https://jsonplaceholder.typicode.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_PREVIEW_LENGTH: usize = 200;
pub const DEFAULT_USER_AGENT: &str = "API-Test-Framework/1.0";

/// Where [`ConfigStore::shared`] looks for its property file.
pub const DEFAULT_CONFIG_PATH: &str = "resources/config.properties";

pub type Headers = HashMap<String, String>;

static SHARED: OnceCell<Arc<ConfigStore>> = OnceCell::new();

#[derive(Debug)]
pub struct ConfigStore {
    properties: RwLock<Properties>,
    headers: RwLock<Headers>,
    source: Option<PathBuf>,
}

impl ConfigStore {
    /// Process-wide store loaded from [`DEFAULT_CONFIG_PATH`].
    ///
    /// The first caller performs the load while concurrent callers block;
    /// everyone gets a clone of the same `Arc`. A failed load is returned to
    /// the caller and is retried on the next access.
    pub fn shared() -> Result<Arc<ConfigStore>, ConfigError> {
        init_once(&SHARED, || Self::load(DEFAULT_CONFIG_PATH))
    }

    /// Load from a property file. A missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let mut store = match properties::read(path)? {
            Some(props) => {
                tracing::debug!(path = %path.display(), keys = props.len(), "loaded configuration");
                Self::from_properties(props)
            }
            None => {
                tracing::debug!(path = %path.display(), "no configuration file, using defaults");
                Self::default()
            }
        };
        store.source = Some(path.to_path_buf());
        store.validate()?;
        Ok(store)
    }

    /// Build from in-memory properties layered over the defaults.
    pub fn from_properties(overrides: Properties) -> Self {
        let mut props = Properties::new();
        props.insert(BASE_URL_KEY.to_string(), DEFAULT_BASE_URL.to_string());
        props.insert(TIMEOUT_KEY.to_string(), DEFAULT_TIMEOUT_SECS.to_string());
        props.extend(overrides);

        let headers = Headers::from([
            ("Content-Type".to_string(), "application/json".to_string()),
            ("Accept".to_string(), "application/json".to_string()),
            ("User-Agent".to_string(), DEFAULT_USER_AGENT.to_string()),
        ]);

        Self {
            properties: RwLock::new(props),
            headers: RwLock::new(headers),
            source: None,
        }
    }

    /// Fail fast on numeric keys that can never be read back.
    fn validate(&self) -> Result<(), ConfigError> {
        self.timeout_seconds()?;
        self.preview_length()?;
        Ok(())
    }

    /// The property file this store was loaded from, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn base_url(&self) -> String {
        self.get_property_or(BASE_URL_KEY, DEFAULT_BASE_URL)
    }

    pub fn timeout_seconds(&self) -> Result<u64, ConfigError> {
        self.parse_number(TIMEOUT_KEY, DEFAULT_TIMEOUT_SECS)
    }

    /// Response timeout, `None` when configured as `0`.
    pub fn timeout(&self) -> Result<Option<Duration>, ConfigError> {
        let secs = self.timeout_seconds()?;
        Ok((secs > 0).then(|| Duration::from_secs(secs)))
    }

    /// How many characters of a response body the client logs.
    pub fn preview_length(&self) -> Result<usize, ConfigError> {
        self.parse_number(PREVIEW_LENGTH_KEY, DEFAULT_PREVIEW_LENGTH)
    }

    /// A copy of the default headers. Changing it does not touch the store.
    pub fn default_headers(&self) -> Headers {
        self.headers.read().clone()
    }

    /// Insert or replace one default header for every later request.
    pub fn add_header(&self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.write().insert(name.into(), value.into());
    }

    pub fn get_property(&self, key: &str) -> Option<String> {
        self.properties.read().get(key).cloned()
    }

    pub fn get_property_or(&self, key: &str, default: &str) -> String {
        self.get_property(key).unwrap_or_else(|| default.to_string())
    }

    pub fn set_property(&self, key: impl Into<String>, value: impl Into<String>) {
        self.properties.write().insert(key.into(), value.into());
    }

    fn parse_number<T: std::str::FromStr>(&self, key: &str, default: T) -> Result<T, ConfigError> {
        match self.get_property(key) {
            None => Ok(default),
            Some(value) => value.trim().parse().map_err(|_| ConfigError::InvalidNumber {
                key: key.to_string(),
                value,
            }),
        }
    }
}

/// Run `load` at most once per successful initialisation of `cell`.
fn init_once<F>(cell: &OnceCell<Arc<ConfigStore>>, load: F) -> Result<Arc<ConfigStore>, ConfigError>
where
    F: FnOnce() -> Result<ConfigStore, ConfigError>,
{
    cell.get_or_try_init(|| load().map(Arc::new)).map(Arc::clone)
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::from_properties(Properties::new())
    }
}
