//! Blob repository contract and its client-backed implementation.

use crate::client::{BlobServiceClient, PublicAccess};
use crate::error::{BlobRepositoryResult, BlobStoreError};
use async_trait::async_trait;
use nucleus_types::Cancellation;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};
use url::Url;

/// Named text blobs in one container.
///
/// Every operation checks `cancel` on entry and races each service round
/// trip against it.
#[async_trait]
pub trait BlobRepository: Send + Sync {
    /// False when either the container or the blob is missing.
    async fn exists(&self, name: &str, cancel: &Cancellation) -> BlobRepositoryResult<bool>;

    /// Full content decoded as UTF-8, replacing invalid sequences. Absent
    /// when either the container or the blob is missing.
    async fn get(&self, name: &str, cancel: &Cancellation) -> BlobRepositoryResult<Option<String>>;

    /// Address of the blob, absent when either the container or the blob is
    /// missing.
    ///
    /// When the container exists this sets its public access to
    /// [`PublicAccess::Blob`] on every call, whether or not the blob exists.
    async fn get_uri(&self, name: &str, cancel: &Cancellation) -> BlobRepositoryResult<Option<Url>>;

    /// Uploads a new blob; an existing one fails with `BlobAlreadyExists`.
    async fn add(
        &self,
        name: &str,
        content: &str,
        cancel: &Cancellation,
    ) -> BlobRepositoryResult<()>;

    /// Uploads a blob, replacing any existing content.
    async fn update(
        &self,
        name: &str,
        content: &str,
        cancel: &Cancellation,
    ) -> BlobRepositoryResult<()>;

    async fn delete(&self, name: &str, cancel: &Cancellation) -> BlobRepositoryResult<()>;
}

/// Gives a specialized repository the [`BlobRepository`] contract by
/// pointing at the base it wraps.
pub trait AsBlobRepository {
    fn as_base(&self) -> &BlobRepositoryBase;
}

/// Client-backed repository bound to one container.
#[derive(Clone)]
pub struct BlobRepositoryBase {
    client: Arc<dyn BlobServiceClient>,
    container: String,
}

impl fmt::Debug for BlobRepositoryBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlobRepositoryBase")
            .field("container", &self.container)
            .finish_non_exhaustive()
    }
}

impl BlobRepositoryBase {
    pub fn new(client: Arc<dyn BlobServiceClient>, container: impl Into<String>) -> Self {
        Self {
            client,
            container: container.into(),
        }
    }

    pub fn container(&self) -> &str {
        &self.container
    }

    pub fn client(&self) -> &Arc<dyn BlobServiceClient> {
        &self.client
    }

    /// Creates the container with private access if it is missing. Returns
    /// true if this call created it.
    pub async fn ensure_container(&self, cancel: &Cancellation) -> BlobRepositoryResult<bool> {
        cancel.check()?;
        if self.container_exists(cancel).await? {
            return Ok(false);
        }

        let created = cancel
            .run(self.client.create_container(&self.container, PublicAccess::None))
            .await?;
        match created {
            Ok(()) => {
                info!(container = %self.container, "created blob container");
                Ok(true)
            }
            Err(BlobStoreError::ContainerAlreadyExists(_)) => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn exists(&self, name: &str, cancel: &Cancellation) -> BlobRepositoryResult<bool> {
        cancel.check()?;
        if !self.container_exists(cancel).await? {
            return Ok(false);
        }
        self.blob_exists(name, cancel).await
    }

    pub async fn get(
        &self,
        name: &str,
        cancel: &Cancellation,
    ) -> BlobRepositoryResult<Option<String>> {
        cancel.check()?;
        if !self.container_exists(cancel).await? || !self.blob_exists(name, cancel).await? {
            debug!(container = %self.container, name, "blob not found");
            return Ok(None);
        }

        debug!(container = %self.container, name, "downloading blob");
        let downloaded = cancel
            .run(self.client.download(&self.container, name))
            .await?;
        match downloaded {
            Ok(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
            // Removed between the existence check and the download.
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn get_uri(
        &self,
        name: &str,
        cancel: &Cancellation,
    ) -> BlobRepositoryResult<Option<Url>> {
        cancel.check()?;
        if !self.container_exists(cancel).await? {
            return Ok(None);
        }

        debug!(container = %self.container, "setting public access to blob");
        let updated = cancel
            .run(self.client.set_public_access(&self.container, PublicAccess::Blob))
            .await?;
        match updated {
            Ok(()) => {}
            Err(BlobStoreError::ContainerNotFound(_)) => return Ok(None),
            Err(err) => return Err(err.into()),
        }

        if !self.blob_exists(name, cancel).await? {
            return Ok(None);
        }
        Ok(Some(self.client.blob_url(&self.container, name)?))
    }

    pub async fn add(
        &self,
        name: &str,
        content: &str,
        cancel: &Cancellation,
    ) -> BlobRepositoryResult<()> {
        self.upload(name, content, false, cancel).await
    }

    pub async fn update(
        &self,
        name: &str,
        content: &str,
        cancel: &Cancellation,
    ) -> BlobRepositoryResult<()> {
        self.upload(name, content, true, cancel).await
    }

    pub async fn delete(&self, name: &str, cancel: &Cancellation) -> BlobRepositoryResult<()> {
        cancel.check()?;
        debug!(container = %self.container, name, "deleting blob");
        cancel
            .run(self.client.delete_blob(&self.container, name))
            .await??;
        Ok(())
    }

    async fn upload(
        &self,
        name: &str,
        content: &str,
        overwrite: bool,
        cancel: &Cancellation,
    ) -> BlobRepositoryResult<()> {
        cancel.check()?;
        debug!(
            container = %self.container,
            name,
            bytes = content.len(),
            overwrite,
            "uploading blob"
        );
        cancel
            .run(
                self.client
                    .upload(&self.container, name, content.as_bytes().to_vec(), overwrite),
            )
            .await??;
        Ok(())
    }

    async fn container_exists(&self, cancel: &Cancellation) -> BlobRepositoryResult<bool> {
        Ok(cancel
            .run(self.client.container_exists(&self.container))
            .await??)
    }

    /// A container removed since the caller's container check reads as a
    /// missing blob.
    async fn blob_exists(&self, name: &str, cancel: &Cancellation) -> BlobRepositoryResult<bool> {
        let found = cancel
            .run(self.client.blob_exists(&self.container, name))
            .await?;
        match found {
            Ok(found) => Ok(found),
            Err(BlobStoreError::ContainerNotFound(_)) => Ok(false),
            Err(err) => Err(err.into()),
        }
    }
}

impl AsBlobRepository for BlobRepositoryBase {
    fn as_base(&self) -> &BlobRepositoryBase {
        self
    }
}

#[async_trait]
impl<R> BlobRepository for R
where
    R: AsBlobRepository + Send + Sync,
{
    async fn exists(&self, name: &str, cancel: &Cancellation) -> BlobRepositoryResult<bool> {
        self.as_base().exists(name, cancel).await
    }

    async fn get(&self, name: &str, cancel: &Cancellation) -> BlobRepositoryResult<Option<String>> {
        self.as_base().get(name, cancel).await
    }

    async fn get_uri(
        &self,
        name: &str,
        cancel: &Cancellation,
    ) -> BlobRepositoryResult<Option<Url>> {
        self.as_base().get_uri(name, cancel).await
    }

    async fn add(
        &self,
        name: &str,
        content: &str,
        cancel: &Cancellation,
    ) -> BlobRepositoryResult<()> {
        self.as_base().add(name, content, cancel).await
    }

    async fn update(
        &self,
        name: &str,
        content: &str,
        cancel: &Cancellation,
    ) -> BlobRepositoryResult<()> {
        self.as_base().update(name, content, cancel).await
    }

    async fn delete(&self, name: &str, cancel: &Cancellation) -> BlobRepositoryResult<()> {
        self.as_base().delete(name, cancel).await
    }
}
