//! Storage collaborators that receive encoded snapshots.
//!
//! The controller only relies on one contract: given a name, bytes and an
//! access level, a store either returns a reachable address for the object or
//! fails with an error.

use crate::{Error, Result};
use futures::future::BoxFuture;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use url::Url;

/// Access level requested for a stored object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Access {
    Public,
    Private,
}

impl Access {
    pub fn as_str(&self) -> &'static str {
        match self {
            Access::Public => "public",
            Access::Private => "private",
        }
    }
}

/// Metadata about an object a store accepted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Name the object was submitted under
    pub name: String,
    /// Address the object can be fetched from
    pub url: String,
    /// Size in bytes
    pub size: usize,
}

/// An object store that accepts snapshot uploads.
pub trait BlobStore: Send + Sync {
    /// Store `data` under `name` and return where it can be reached.
    fn put<'a>(&'a self, name: &'a str, data: Vec<u8>, access: Access) -> BoxFuture<'a, Result<StoredObject>>;
}

/// Timeout applied to each HTTP upload
pub const DEFAULT_HTTP_TIMEOUT_MS: u64 = 30_000;

/// Response body returned by the HTTP blob endpoint
#[derive(Debug, Deserialize)]
struct PutResponse {
    url: String,
}

/// Uploads objects with `PUT <endpoint>/<name>`.
///
/// The requested access level travels in the `x-access` header and the
/// optional token as a bearer credential. A 2xx response must carry a JSON
/// body with a `url` field.
#[derive(Debug, Clone)]
pub struct HttpBlobStore {
    client: reqwest::Client,
    endpoint: Url,
    token: Option<String>,
}

impl HttpBlobStore {
    pub fn new(endpoint: &str, token: Option<String>) -> Result<Self> {
        Self::with_timeout(endpoint, token, DEFAULT_HTTP_TIMEOUT_MS)
    }

    pub fn with_timeout(endpoint: &str, token: Option<String>, timeout_ms: u64) -> Result<Self> {
        let mut endpoint = Url::parse(endpoint)
            .map_err(|e| Error::ConfigError(format!("invalid storage endpoint '{}': {}", endpoint, e)))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(Error::ConfigError(format!(
                "storage endpoint must be http(s), got '{}'",
                endpoint.scheme()
            )));
        }
        // `Url::join` replaces the last path segment unless the path ends in '/'
        if !endpoint.path().ends_with('/') {
            let path = format!("{}/", endpoint.path());
            endpoint.set_path(&path);
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .map_err(|e| Error::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint,
            token: token.filter(|t| !t.is_empty()),
        })
    }

    /// Address an object named `name` is uploaded to.
    pub fn object_url(&self, name: &str) -> Result<Url> {
        self.endpoint
            .join(name)
            .map_err(|e| Error::ConfigError(format!("invalid object name '{}': {}", name, e)))
    }
}

impl BlobStore for HttpBlobStore {
    fn put<'a>(&'a self, name: &'a str, data: Vec<u8>, access: Access) -> BoxFuture<'a, Result<StoredObject>> {
        Box::pin(async move {
            let target = self.object_url(name)?;
            let size = data.len();

            let mut req = self
                .client
                .put(target)
                .header("content-type", "image/png")
                .header("x-access", access.as_str())
                .body(data);
            if let Some(token) = &self.token {
                req = req.bearer_auth(token);
            }

            let res = req.send().await?;
            let status = res.status();
            if !status.is_success() {
                let body = res.text().await.unwrap_or_default();
                return Err(Error::StorageError(format!(
                    "upload of '{}' rejected with {}: {}",
                    name,
                    status,
                    body.trim()
                )));
            }

            let parsed: PutResponse = res
                .json()
                .await
                .map_err(|e| Error::StorageError(format!("malformed upload response: {}", e)))?;

            Ok(StoredObject {
                name: name.to_string(),
                url: parsed.url,
                size,
            })
        })
    }
}

/// Writes objects into a local directory.
///
/// Useful for offline runs; the returned address is a `file://` URL.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl BlobStore for FsBlobStore {
    fn put<'a>(&'a self, name: &'a str, data: Vec<u8>, _access: Access) -> BoxFuture<'a, Result<StoredObject>> {
        Box::pin(async move {
            if name.is_empty() || name.contains(['/', '\\']) || name == ".." {
                return Err(Error::StorageError(format!("refusing object name '{}'", name)));
            }
            tokio::fs::create_dir_all(&self.root).await?;
            let path = self.root.join(name);
            let size = data.len();
            tokio::fs::write(&path, data).await?;

            let abs = std::path::absolute(&path)?;
            let url = Url::from_file_path(&abs)
                .map(|u| u.to_string())
                .unwrap_or_else(|_| abs.display().to_string());

            Ok(StoredObject {
                name: name.to_string(),
                url,
                size,
            })
        })
    }
}

/// An object held by [`MemoryBlobStore`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryObject {
    pub data: Vec<u8>,
    pub access: Access,
}

/// Keeps objects in memory; used in tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    objects: Mutex<HashMap<String, MemoryObject>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.objects.lock().map(|o| o.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Names of all stored objects, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .objects
            .lock()
            .map(|o| o.keys().cloned().collect())
            .unwrap_or_default();
        names.sort();
        names
    }

    pub fn get(&self, name: &str) -> Option<MemoryObject> {
        self.objects.lock().ok()?.get(name).cloned()
    }
}

impl BlobStore for MemoryBlobStore {
    fn put<'a>(&'a self, name: &'a str, data: Vec<u8>, access: Access) -> BoxFuture<'a, Result<StoredObject>> {
        Box::pin(async move {
            let size = data.len();
            let mut objects = self
                .objects
                .lock()
                .map_err(|_| Error::StorageError("memory store poisoned".into()))?;
            objects.insert(name.to_string(), MemoryObject { data, access });
            Ok(StoredObject {
                name: name.to_string(),
                url: format!("memory://{}", name),
                size,
            })
        })
    }
}
