//! In-process document store.
//!
//! Keeps every container as an ordered map of `(partition key, id)` to JSON
//! and evaluates a small SQL subset: `SELECT *` or `SELECT VALUE <path>`
//! with an optional `WHERE` of comparisons joined by `AND`/`OR`/`NOT`.
//! Intended for tests and local development; nothing is persisted.

mod query;

use crate::error::{DocumentStoreError, StoreResult};
use crate::model::{PartitionKey, QueryDefinition, QueryPage};
use crate::store::DocumentStore;
use async_trait::async_trait;
use query::CompiledQuery;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;
use tracing::{debug, info};

type Container = BTreeMap<(String, String), Value>;

/// In-memory store configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InMemoryDocumentStoreConfig {
    /// Page size used when the caller gives no `max_item_count`.
    pub default_page_size: u32,
    /// Create containers on first write instead of failing with
    /// `ContainerNotFound`.
    pub auto_create_containers: bool,
}

impl Default for InMemoryDocumentStoreConfig {
    fn default() -> Self {
        Self {
            default_page_size: 100,
            auto_create_containers: false,
        }
    }
}

/// Document store backed by process memory.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    config: InMemoryDocumentStoreConfig,
    containers: RwLock<HashMap<String, Container>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: InMemoryDocumentStoreConfig) -> Self {
        Self {
            config,
            containers: RwLock::new(HashMap::new()),
        }
    }

    /// Adds an empty container while building the store.
    #[must_use]
    pub fn with_container(mut self, name: impl Into<String>) -> Self {
        self.containers.get_mut().entry(name.into()).or_default();
        self
    }

    /// Creates `name` if it does not exist yet. Returns true if it was created.
    pub async fn create_container_if_not_exists(&self, name: &str) -> bool {
        let mut containers = self.containers.write().await;
        if containers.contains_key(name) {
            return false;
        }
        containers.insert(name.to_string(), Container::new());
        info!(container = name, "created in-memory container");
        true
    }

    /// Number of documents in `container`, or `None` if it does not exist.
    pub async fn document_count(&self, container: &str) -> Option<usize> {
        self.containers.read().await.get(container).map(BTreeMap::len)
    }

    fn key(partition_key: &PartitionKey, id: &str) -> (String, String) {
        (partition_key.as_str().to_string(), id.to_string())
    }

    fn not_found(partition_key: &PartitionKey, id: &str) -> DocumentStoreError {
        DocumentStoreError::NotFound {
            partition_key: partition_key.to_string(),
            id: id.to_string(),
        }
    }

    /// Runs `f` against a writable container, honouring auto-creation.
    async fn write_container<R>(
        &self,
        container: &str,
        f: impl FnOnce(&mut Container) -> StoreResult<R>,
    ) -> StoreResult<R> {
        let mut containers = self.containers.write().await;
        if self.config.auto_create_containers {
            return f(containers.entry(container.to_string()).or_default());
        }
        match containers.get_mut(container) {
            Some(docs) => f(docs),
            None => Err(DocumentStoreError::ContainerNotFound(container.to_string())),
        }
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn read_item(
        &self,
        container: &str,
        partition_key: &PartitionKey,
        id: &str,
    ) -> StoreResult<Value> {
        let containers = self.containers.read().await;
        let docs = containers
            .get(container)
            .ok_or_else(|| DocumentStoreError::ContainerNotFound(container.to_string()))?;
        docs.get(&Self::key(partition_key, id))
            .cloned()
            .ok_or_else(|| Self::not_found(partition_key, id))
    }

    async fn create_item(
        &self,
        container: &str,
        partition_key: &PartitionKey,
        id: &str,
        item: Value,
    ) -> StoreResult<()> {
        self.write_container(container, |docs| {
            let key = Self::key(partition_key, id);
            if docs.contains_key(&key) {
                return Err(DocumentStoreError::Conflict {
                    partition_key: partition_key.to_string(),
                    id: id.to_string(),
                });
            }
            docs.insert(key, item);
            Ok(())
        })
        .await
    }

    async fn upsert_item(
        &self,
        container: &str,
        partition_key: &PartitionKey,
        id: &str,
        item: Value,
    ) -> StoreResult<()> {
        self.write_container(container, |docs| {
            docs.insert(Self::key(partition_key, id), item);
            Ok(())
        })
        .await
    }

    async fn delete_item(
        &self,
        container: &str,
        partition_key: &PartitionKey,
        id: &str,
    ) -> StoreResult<()> {
        let mut containers = self.containers.write().await;
        let docs = containers
            .get_mut(container)
            .ok_or_else(|| DocumentStoreError::ContainerNotFound(container.to_string()))?;
        docs.remove(&Self::key(partition_key, id))
            .map(|_| ())
            .ok_or_else(|| Self::not_found(partition_key, id))
    }

    async fn query_page(
        &self,
        container: &str,
        query: &QueryDefinition,
        continuation: Option<&str>,
        max_item_count: Option<u32>,
    ) -> StoreResult<QueryPage> {
        let compiled = CompiledQuery::compile(query).map_err(DocumentStoreError::BadRequest)?;
        let offset = match continuation {
            Some(token) => token.parse::<usize>().map_err(|_| {
                DocumentStoreError::BadRequest(format!("invalid continuation token `{token}`"))
            })?,
            None => 0,
        };
        let page_size = max_item_count
            .unwrap_or(self.config.default_page_size)
            .max(1) as usize;

        let containers = self.containers.read().await;
        let docs = containers
            .get(container)
            .ok_or_else(|| DocumentStoreError::ContainerNotFound(container.to_string()))?;

        let mut matches = docs.values().filter_map(|doc| compiled.apply(doc)).skip(offset);
        let items: Vec<Value> = matches.by_ref().take(page_size).collect();
        let continuation = if matches.next().is_some() {
            Some((offset + items.len()).to_string())
        } else {
            None
        };

        debug!(
            container,
            offset,
            items = items.len(),
            more = continuation.is_some(),
            "served query page"
        );
        Ok(QueryPage {
            items,
            continuation,
        })
    }
}
