//! In-process blob service.
//!
//! Containers keep their public access level and an ordered map of blob
//! names to bytes. Addresses are formed as `{base_url}/{container}/{name}`.
//! Intended for tests and local development; nothing is persisted.

use crate::client::{BlobServiceClient, PublicAccess};
use crate::error::{BlobStoreError, BlobStoreResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;
use tracing::{debug, info};
use url::Url;

const MAX_BLOB_NAME_LEN: usize = 1024;

/// In-memory blob service configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlobServiceConfig {
    /// Account endpoint that blob addresses are built on.
    pub base_url: String,
}

impl Default for BlobServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:10000/devstoreaccount1".to_string(),
        }
    }
}

#[derive(Debug, Default)]
struct Container {
    access: PublicAccess,
    blobs: BTreeMap<String, Vec<u8>>,
}

/// Blob service backed by process memory.
#[derive(Debug, Default)]
pub struct InMemoryBlobService {
    config: BlobServiceConfig,
    containers: RwLock<HashMap<String, Container>>,
}

impl InMemoryBlobService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: BlobServiceConfig) -> Self {
        Self {
            config,
            containers: RwLock::new(HashMap::new()),
        }
    }

    /// Adds an empty private container while building the service.
    #[must_use]
    pub fn with_container(mut self, name: impl Into<String>) -> Self {
        self.containers.get_mut().entry(name.into()).or_default();
        self
    }

    pub fn config(&self) -> &BlobServiceConfig {
        &self.config
    }

    /// Public access level of `container`, or `None` if it does not exist.
    pub async fn public_access(&self, container: &str) -> Option<PublicAccess> {
        self.containers.read().await.get(container).map(|c| c.access)
    }

    /// Blob names in `container` in lexical order, or `None` if it does not exist.
    pub async fn blob_names(&self, container: &str) -> Option<Vec<String>> {
        self.containers
            .read()
            .await
            .get(container)
            .map(|c| c.blobs.keys().cloned().collect())
    }

    fn container_not_found(container: &str) -> BlobStoreError {
        BlobStoreError::ContainerNotFound(container.to_string())
    }

    fn blob_not_found(container: &str, name: &str) -> BlobStoreError {
        BlobStoreError::BlobNotFound {
            container: container.to_string(),
            name: name.to_string(),
        }
    }
}

/// Lowercase letters, digits and single hyphens, 3 to 63 characters,
/// starting and ending with a letter or digit.
fn validate_container_name(name: &str) -> BlobStoreResult<()> {
    let valid = (3..=63).contains(&name.len())
        && name
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
        && !name.starts_with('-')
        && !name.ends_with('-')
        && !name.contains("--");
    if valid {
        Ok(())
    } else {
        Err(BlobStoreError::InvalidName(format!("container name {name:?}")))
    }
}

fn validate_blob_name(name: &str) -> BlobStoreResult<()> {
    if name.is_empty() || name.chars().count() > MAX_BLOB_NAME_LEN {
        return Err(BlobStoreError::InvalidName(format!("blob name {name:?}")));
    }
    Ok(())
}

#[async_trait]
impl BlobServiceClient for InMemoryBlobService {
    async fn container_exists(&self, container: &str) -> BlobStoreResult<bool> {
        Ok(self.containers.read().await.contains_key(container))
    }

    async fn create_container(&self, container: &str, access: PublicAccess) -> BlobStoreResult<()> {
        validate_container_name(container)?;
        let mut containers = self.containers.write().await;
        if containers.contains_key(container) {
            return Err(BlobStoreError::ContainerAlreadyExists(container.to_string()));
        }
        containers.insert(
            container.to_string(),
            Container {
                access,
                blobs: BTreeMap::new(),
            },
        );
        info!(container, ?access, "created in-memory blob container");
        Ok(())
    }

    async fn set_public_access(
        &self,
        container: &str,
        access: PublicAccess,
    ) -> BlobStoreResult<()> {
        let mut containers = self.containers.write().await;
        let state = containers
            .get_mut(container)
            .ok_or_else(|| Self::container_not_found(container))?;
        state.access = access;
        debug!(container, ?access, "set public access");
        Ok(())
    }

    async fn blob_exists(&self, container: &str, name: &str) -> BlobStoreResult<bool> {
        let containers = self.containers.read().await;
        let state = containers
            .get(container)
            .ok_or_else(|| Self::container_not_found(container))?;
        Ok(state.blobs.contains_key(name))
    }

    async fn upload(
        &self,
        container: &str,
        name: &str,
        content: Vec<u8>,
        overwrite: bool,
    ) -> BlobStoreResult<()> {
        validate_blob_name(name)?;
        let mut containers = self.containers.write().await;
        let state = containers
            .get_mut(container)
            .ok_or_else(|| Self::container_not_found(container))?;
        if !overwrite && state.blobs.contains_key(name) {
            return Err(BlobStoreError::BlobAlreadyExists {
                container: container.to_string(),
                name: name.to_string(),
            });
        }
        state.blobs.insert(name.to_string(), content);
        Ok(())
    }

    async fn download(&self, container: &str, name: &str) -> BlobStoreResult<Vec<u8>> {
        let containers = self.containers.read().await;
        let state = containers
            .get(container)
            .ok_or_else(|| Self::container_not_found(container))?;
        state
            .blobs
            .get(name)
            .cloned()
            .ok_or_else(|| Self::blob_not_found(container, name))
    }

    async fn delete_blob(&self, container: &str, name: &str) -> BlobStoreResult<()> {
        let mut containers = self.containers.write().await;
        let state = containers
            .get_mut(container)
            .ok_or_else(|| Self::container_not_found(container))?;
        state
            .blobs
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| Self::blob_not_found(container, name))
    }

    fn blob_url(&self, container: &str, name: &str) -> BlobStoreResult<Url> {
        validate_blob_name(name)?;
        let base = self.config.base_url.as_str();
        let mut url = Url::parse(base)?;
        url.path_segments_mut()
            .map_err(|()| BlobStoreError::InvalidName(format!("base url {base:?}")))?
            .pop_if_empty()
            .push(container)
            .extend(name.split('/'));
        Ok(url)
    }
}
