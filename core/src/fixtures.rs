//! Symbolic endpoints, expected status codes and JSON payloads for scenarios.
//!
//! # Design
//! A `FixtureStore` is rooted at a directory holding `test.properties` (the
//! catalog) and the payload files. The catalog is read on first use and kept
//! for the lifetime of the store; concurrent first lookups block on a single
//! load. Payloads are read from disk on every call so each scenario owns an
//! independent copy.
//!
//! Catalog misses never fall back to a default: an unknown key is an
//! authoring mistake in the scenario.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use once_cell::sync::OnceCell;
use serde_json::Value;

use crate::error::FixtureError;
use crate::properties::{self, Properties};

/// Root used by [`FixtureStore::shared`].
pub const DEFAULT_FIXTURE_ROOT: &str = "resources";

/// Catalog file name inside the fixture root.
pub const CATALOG_FILE: &str = "test.properties";

static SHARED: OnceCell<FixtureStore> = OnceCell::new();

#[derive(Debug)]
pub struct FixtureStore {
    root: PathBuf,
    catalog: OnceCell<Properties>,
}

impl FixtureStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            catalog: OnceCell::new(),
        }
    }

    /// Process-wide store rooted at [`DEFAULT_FIXTURE_ROOT`].
    pub fn shared() -> &'static FixtureStore {
        SHARED.get_or_init(|| FixtureStore::new(DEFAULT_FIXTURE_ROOT))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn catalog(&self) -> Result<&Properties, FixtureError> {
        self.catalog.get_or_try_init(|| -> Result<Properties, FixtureError> {
            let path = self.root.join(CATALOG_FILE);
            let catalog = properties::read(&path)
                .map_err(FixtureError::Catalog)?
                .ok_or_else(|| FixtureError::CatalogMissing(path.clone()))?;
            tracing::debug!(path = %path.display(), keys = catalog.len(), "loaded fixture catalog");
            Ok(catalog)
        })
    }

    fn lookup(&self, key: &str) -> Result<&str, FixtureError> {
        self.catalog()?
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| FixtureError::KeyNotFound(key.to_string()))
    }

    /// Endpoint path registered under `key`, e.g. `posts.base` -> `/posts`.
    pub fn endpoint(&self, key: &str) -> Result<String, FixtureError> {
        self.lookup(key).map(str::to_string)
    }

    /// Expected status code registered under `key`, e.g. `status.success` -> 200.
    pub fn status_code(&self, key: &str) -> Result<u16, FixtureError> {
        let value = self.lookup(key)?;
        value
            .trim()
            .parse()
            .map_err(|_| FixtureError::InvalidStatusCode {
                key: key.to_string(),
                value: value.to_string(),
            })
    }

    /// All catalog keys, sorted.
    pub fn catalog_keys(&self) -> Result<Vec<String>, FixtureError> {
        let mut keys: Vec<String> = self.catalog()?.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }

    /// Read and parse the JSON file at `<root>/<resource>`.
    pub fn load_payload(&self, resource: &str) -> Result<Value, FixtureError> {
        let path = self.root.join(resource);
        let text = fs::read_to_string(&path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => FixtureError::ResourceNotFound(path.clone()),
            _ => FixtureError::Io {
                path: path.clone(),
                source,
            },
        })?;
        serde_json::from_str(&text).map_err(|source| FixtureError::Parse { path, source })
    }

    /// Load one of the canned request data sets.
    pub fn dataset(&self, dataset: Dataset) -> Result<Value, FixtureError> {
        self.load_payload(&dataset.path())
    }
}

/// Element `index` of an array payload.
///
/// Fails for non-arrays, negative indices and indices past the end.
pub fn item(payload: &Value, index: i64) -> Result<&Value, FixtureError> {
    let items = payload.as_array();
    usize::try_from(index)
        .ok()
        .and_then(|i| items?.get(i))
        .ok_or(FixtureError::Index {
            index,
            len: items.map(Vec::len),
        })
}

/// API resource a data set belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Posts,
    Users,
    Todos,
}

impl Resource {
    pub fn as_str(self) -> &'static str {
        match self {
            Resource::Posts => "posts",
            Resource::Users => "users",
            Resource::Todos => "todos",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Update,
}

/// Whether the data set holds well-formed bodies or deliberately broken ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validity {
    Valid,
    Invalid,
}

/// Address of a bundled payload file such as `testdata/posts-create-invalid.json`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dataset {
    pub resource: Resource,
    pub operation: Operation,
    pub validity: Validity,
}

impl Dataset {
    pub fn new(resource: Resource, operation: Operation, validity: Validity) -> Self {
        Self {
            resource,
            operation,
            validity,
        }
    }

    /// Path relative to the fixture root.
    pub fn path(&self) -> String {
        format!("testdata/{self}.json")
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self.operation {
            Operation::Create => "create",
            Operation::Update => "update",
        };
        write!(f, "{}-{op}", self.resource.as_str())?;
        if self.validity == Validity::Invalid {
            f.write_str("-invalid")?;
        }
        Ok(())
    }
}
