//! Shared fixtures for blob repository tests.

#![allow(dead_code)]

use async_trait::async_trait;
use nucleus_blobs::{
    AsBlobRepository, BlobRepositoryBase, BlobServiceClient, BlobStoreError, BlobStoreResult,
    PublicAccess, Url,
};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

pub const CONTAINER: &str = "assets";

/// A specialized repository, built the way downstream crates build theirs.
pub struct AssetRepository(BlobRepositoryBase);

impl AssetRepository {
    pub fn new(client: Arc<dyn BlobServiceClient>) -> Self {
        Self(BlobRepositoryBase::new(client, CONTAINER))
    }

    pub fn base(&self) -> &BlobRepositoryBase {
        &self.0
    }
}

impl AsBlobRepository for AssetRepository {
    fn as_base(&self) -> &BlobRepositoryBase {
        &self.0
    }
}

/// One recorded service call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ContainerExists,
    CreateContainer(PublicAccess),
    SetPublicAccess(PublicAccess),
    BlobExists(String),
    Upload {
        name: String,
        content: Vec<u8>,
        overwrite: bool,
    },
    Download(String),
    DeleteBlob(String),
    BlobUrl(String),
}

type CallMatcher = Box<dyn Fn(&Call) -> bool + Send>;

/// Service double with a fixed view of which container and blobs exist.
///
/// Records every call. An async call fails with the first scripted error
/// whose matcher accepts it; each scripted error fires once.
#[derive(Default)]
pub struct ScriptedBlobClient {
    container_present: Mutex<bool>,
    blobs: Mutex<HashSet<String>>,
    calls: Mutex<Vec<Call>>,
    errors: Mutex<Vec<(CallMatcher, BlobStoreError)>>,
    stalled: Mutex<bool>,
}

impl ScriptedBlobClient {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// A client whose container exists and holds `blobs`.
    pub fn with_blobs(blobs: &[&str]) -> Arc<Self> {
        let client = Self::new();
        *client.container_present.lock().unwrap() = true;
        client
            .blobs
            .lock()
            .unwrap()
            .extend(blobs.iter().map(|b| b.to_string()));
        client
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Fails the next async call, whatever it is.
    pub fn fail_next(&self, err: BlobStoreError) {
        self.fail_on(|_| true, err);
    }

    /// Fails the next call accepted by `matcher`.
    pub fn fail_on(&self, matcher: impl Fn(&Call) -> bool + Send + 'static, err: BlobStoreError) {
        self.errors.lock().unwrap().push((Box::new(matcher), err));
    }

    /// Makes every later async call wait forever after recording itself.
    pub fn stall(&self) {
        *self.stalled.lock().unwrap() = true;
    }

    async fn answer(&self, call: Call) -> BlobStoreResult<()> {
        let scripted = {
            let mut errors = self.errors.lock().unwrap();
            errors
                .iter()
                .position(|(matcher, _)| matcher(&call))
                .map(|index| errors.remove(index).1)
        };
        self.calls.lock().unwrap().push(call);
        let stalled = *self.stalled.lock().unwrap();
        if stalled {
            std::future::pending::<()>().await;
        }
        match scripted {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl BlobServiceClient for ScriptedBlobClient {
    async fn container_exists(&self, _container: &str) -> BlobStoreResult<bool> {
        self.answer(Call::ContainerExists).await?;
        Ok(*self.container_present.lock().unwrap())
    }

    async fn create_container(
        &self,
        _container: &str,
        access: PublicAccess,
    ) -> BlobStoreResult<()> {
        self.answer(Call::CreateContainer(access)).await?;
        *self.container_present.lock().unwrap() = true;
        Ok(())
    }

    async fn set_public_access(
        &self,
        _container: &str,
        access: PublicAccess,
    ) -> BlobStoreResult<()> {
        self.answer(Call::SetPublicAccess(access)).await
    }

    async fn blob_exists(&self, _container: &str, name: &str) -> BlobStoreResult<bool> {
        self.answer(Call::BlobExists(name.to_string())).await?;
        Ok(self.blobs.lock().unwrap().contains(name))
    }

    async fn upload(
        &self,
        _container: &str,
        name: &str,
        content: Vec<u8>,
        overwrite: bool,
    ) -> BlobStoreResult<()> {
        self.answer(Call::Upload {
            name: name.to_string(),
            content,
            overwrite,
        })
        .await
    }

    async fn download(&self, _container: &str, name: &str) -> BlobStoreResult<Vec<u8>> {
        self.answer(Call::Download(name.to_string())).await?;
        Ok(format!("content of {name}").into_bytes())
    }

    async fn delete_blob(&self, _container: &str, name: &str) -> BlobStoreResult<()> {
        self.answer(Call::DeleteBlob(name.to_string())).await
    }

    fn blob_url(&self, container: &str, name: &str) -> BlobStoreResult<Url> {
        self.calls.lock().unwrap().push(Call::BlobUrl(name.to_string()));
        Ok(Url::parse(&format!("https://blobs.test/{container}/{name}"))?)
    }
}
