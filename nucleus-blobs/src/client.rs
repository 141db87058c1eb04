//! Blob service boundary.

use crate::error::BlobStoreResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

/// Anonymous read access granted on a container.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublicAccess {
    /// No anonymous access.
    #[default]
    None,
    /// Anonymous reads of individual blobs; listing stays private.
    Blob,
    /// Anonymous reads and listing.
    Container,
}

/// Connection to a blob service, shared by every repository.
#[async_trait]
pub trait BlobServiceClient: Send + Sync {
    async fn container_exists(&self, container: &str) -> BlobStoreResult<bool>;

    /// Fails with `ContainerAlreadyExists` if the container is present.
    async fn create_container(&self, container: &str, access: PublicAccess) -> BlobStoreResult<()>;

    async fn set_public_access(&self, container: &str, access: PublicAccess) -> BlobStoreResult<()>;

    async fn blob_exists(&self, container: &str, name: &str) -> BlobStoreResult<bool>;

    /// Stores `content` under `name`. Without `overwrite`, an existing blob
    /// fails with `BlobAlreadyExists`.
    async fn upload(
        &self,
        container: &str,
        name: &str,
        content: Vec<u8>,
        overwrite: bool,
    ) -> BlobStoreResult<()>;

    async fn download(&self, container: &str, name: &str) -> BlobStoreResult<Vec<u8>>;

    async fn delete_blob(&self, container: &str, name: &str) -> BlobStoreResult<()>;

    /// Address of a blob. Computed locally; the blob need not exist.
    fn blob_url(&self, container: &str, name: &str) -> BlobStoreResult<Url>;
}
