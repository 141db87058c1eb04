//! Generic repository contract and its store-backed implementation.

use crate::error::RepositoryResult;
use crate::model::{Document, PartitionKey, QueryDefinition};
use crate::store::DocumentStore;
use async_trait::async_trait;
use nucleus_types::Cancellation;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Query selecting every document of a container.
pub const SELECT_ALL: &str = "SELECT * FROM c";

/// Repository tuning shared by every operation of one instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentRepositoryConfig {
    /// Page size hint passed to the store while draining queries.
    pub max_item_count: Option<u32>,
}

/// Partitioned CRUD and query over one container, for one entity type.
///
/// Every operation checks `cancel` on entry and races each store round trip
/// against it, failing with [`RepositoryError::Canceled`] when it fires.
///
/// [`RepositoryError::Canceled`]: crate::RepositoryError::Canceled
#[async_trait]
pub trait DocumentRepository<T: Document>: Send + Sync {
    /// Executes a read-only query and drains every result page.
    async fn query(
        &self,
        query: QueryDefinition,
        cancel: &Cancellation,
    ) -> RepositoryResult<Vec<T>>;

    /// Lists the container, optionally filtered by a `WHERE` clause body
    /// written against the `c` alias.
    async fn list(
        &self,
        filter_clause: Option<&str>,
        cancel: &Cancellation,
    ) -> RepositoryResult<Vec<T>>;

    /// Point read. A store not-found becomes `Ok(None)`.
    async fn get(
        &self,
        partition_key: PartitionKey,
        id: &str,
        cancel: &Cancellation,
    ) -> RepositoryResult<Option<T>>;

    /// Executes a query projecting scalar strings.
    async fn get_values(
        &self,
        query: QueryDefinition,
        cancel: &Cancellation,
    ) -> RepositoryResult<Vec<String>>;

    /// Creates a document; an existing key surfaces the store's conflict.
    async fn add(
        &self,
        partition_key: PartitionKey,
        entity: &T,
        cancel: &Cancellation,
    ) -> RepositoryResult<()>;

    /// Creates or overwrites a document.
    async fn upsert(
        &self,
        partition_key: PartitionKey,
        entity: &T,
        cancel: &Cancellation,
    ) -> RepositoryResult<()>;

    /// Deletes a document; a missing key surfaces the store's not-found.
    async fn delete(
        &self,
        partition_key: PartitionKey,
        id: &str,
        cancel: &Cancellation,
    ) -> RepositoryResult<()>;
}

/// Gives a specialized repository the [`DocumentRepository`] contract by
/// pointing at the base it wraps.
pub trait AsDocumentRepository<T: Document> {
    fn as_base(&self) -> &DocumentRepositoryBase<T>;
}

/// Store-backed repository bound to one container.
pub struct DocumentRepositoryBase<T> {
    store: Arc<dyn DocumentStore>,
    container: String,
    config: DocumentRepositoryConfig,
    _entity: PhantomData<fn() -> T>,
}

impl<T> Clone for DocumentRepositoryBase<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            container: self.container.clone(),
            config: self.config.clone(),
            _entity: PhantomData,
        }
    }
}

impl<T> fmt::Debug for DocumentRepositoryBase<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentRepositoryBase")
            .field("container", &self.container)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<T: Document> DocumentRepositoryBase<T> {
    /// Binds a repository to `container` on the shared `store`.
    pub fn new(store: Arc<dyn DocumentStore>, container: impl Into<String>) -> Self {
        Self::with_config(store, container, DocumentRepositoryConfig::default())
    }

    pub fn with_config(
        store: Arc<dyn DocumentStore>,
        container: impl Into<String>,
        config: DocumentRepositoryConfig,
    ) -> Self {
        Self {
            store,
            container: container.into(),
            config,
            _entity: PhantomData,
        }
    }

    pub fn container(&self) -> &str {
        &self.container
    }

    pub fn config(&self) -> &DocumentRepositoryConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    pub async fn query(
        &self,
        query: QueryDefinition,
        cancel: &Cancellation,
    ) -> RepositoryResult<Vec<T>> {
        cancel.check()?;
        self.execute_query(&query, cancel).await
    }

    pub async fn list(
        &self,
        filter_clause: Option<&str>,
        cancel: &Cancellation,
    ) -> RepositoryResult<Vec<T>> {
        cancel.check()?;
        let query = list_query(filter_clause);
        self.execute_query(&query, cancel).await
    }

    pub async fn get(
        &self,
        partition_key: PartitionKey,
        id: &str,
        cancel: &Cancellation,
    ) -> RepositoryResult<Option<T>> {
        cancel.check()?;
        debug!(container = %self.container, %partition_key, id, "reading document");

        let read = cancel
            .run(self.store.read_item(&self.container, &partition_key, id))
            .await?;

        match read {
            Ok(value) => Ok(Some(serde_json::from_value(value)?)),
            Err(err) if err.is_not_found() => {
                debug!(container = %self.container, %partition_key, id, "document not found");
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }

    pub async fn get_values(
        &self,
        query: QueryDefinition,
        cancel: &Cancellation,
    ) -> RepositoryResult<Vec<String>> {
        cancel.check()?;
        self.execute_query(&query, cancel).await
    }

    pub async fn add(
        &self,
        partition_key: PartitionKey,
        entity: &T,
        cancel: &Cancellation,
    ) -> RepositoryResult<()> {
        cancel.check()?;
        let item = serde_json::to_value(entity)?;
        debug!(container = %self.container, %partition_key, id = entity.id(), "creating document");

        cancel
            .run(
                self.store
                    .create_item(&self.container, &partition_key, entity.id(), item),
            )
            .await??;
        Ok(())
    }

    pub async fn upsert(
        &self,
        partition_key: PartitionKey,
        entity: &T,
        cancel: &Cancellation,
    ) -> RepositoryResult<()> {
        cancel.check()?;
        let item = serde_json::to_value(entity)?;
        debug!(container = %self.container, %partition_key, id = entity.id(), "upserting document");

        cancel
            .run(
                self.store
                    .upsert_item(&self.container, &partition_key, entity.id(), item),
            )
            .await??;
        Ok(())
    }

    pub async fn delete(
        &self,
        partition_key: PartitionKey,
        id: &str,
        cancel: &Cancellation,
    ) -> RepositoryResult<()> {
        cancel.check()?;
        debug!(container = %self.container, %partition_key, id, "deleting document");

        cancel
            .run(self.store.delete_item(&self.container, &partition_key, id))
            .await??;
        Ok(())
    }

    /// Drains all pages of `query`, checking `cancel` before each round trip.
    async fn execute_query<R: DeserializeOwned>(
        &self,
        query: &QueryDefinition,
        cancel: &Cancellation,
    ) -> RepositoryResult<Vec<R>> {
        let mut results = Vec::new();
        let mut continuation: Option<String> = None;
        let mut pages = 0usize;

        loop {
            cancel.check()?;
            let page = cancel
                .run(self.store.query_page(
                    &self.container,
                    query,
                    continuation.as_deref(),
                    self.config.max_item_count,
                ))
                .await??;
            pages += 1;
            trace!(
                container = %self.container,
                page = pages,
                items = page.items.len(),
                "query page"
            );

            if page.items.is_empty() && page.has_more() {
                warn!(container = %self.container, page = pages, "empty page with continuation");
            }

            for item in page.items {
                results.push(serde_json::from_value(item)?);
            }

            match page.continuation {
                Some(token) => continuation = Some(token),
                None => break,
            }
        }

        debug!(
            container = %self.container,
            query = query.text(),
            pages,
            results = results.len(),
            "query drained"
        );
        Ok(results)
    }
}

fn list_query(filter_clause: Option<&str>) -> QueryDefinition {
    match filter_clause.map(str::trim).filter(|clause| !clause.is_empty()) {
        Some(clause) => QueryDefinition::new(format!("{SELECT_ALL} WHERE {clause}")),
        None => QueryDefinition::new(SELECT_ALL),
    }
}

impl<T: Document> AsDocumentRepository<T> for DocumentRepositoryBase<T> {
    fn as_base(&self) -> &DocumentRepositoryBase<T> {
        self
    }
}

#[async_trait]
impl<T, R> DocumentRepository<T> for R
where
    T: Document,
    R: AsDocumentRepository<T> + Send + Sync,
{
    async fn query(
        &self,
        query: QueryDefinition,
        cancel: &Cancellation,
    ) -> RepositoryResult<Vec<T>> {
        <R as AsDocumentRepository<T>>::as_base(self).query(query, cancel).await
    }

    async fn list(
        &self,
        filter_clause: Option<&str>,
        cancel: &Cancellation,
    ) -> RepositoryResult<Vec<T>> {
        <R as AsDocumentRepository<T>>::as_base(self).list(filter_clause, cancel).await
    }

    async fn get(
        &self,
        partition_key: PartitionKey,
        id: &str,
        cancel: &Cancellation,
    ) -> RepositoryResult<Option<T>> {
        <R as AsDocumentRepository<T>>::as_base(self).get(partition_key, id, cancel).await
    }

    async fn get_values(
        &self,
        query: QueryDefinition,
        cancel: &Cancellation,
    ) -> RepositoryResult<Vec<String>> {
        <R as AsDocumentRepository<T>>::as_base(self).get_values(query, cancel).await
    }

    async fn add(
        &self,
        partition_key: PartitionKey,
        entity: &T,
        cancel: &Cancellation,
    ) -> RepositoryResult<()> {
        <R as AsDocumentRepository<T>>::as_base(self).add(partition_key, entity, cancel).await
    }

    async fn upsert(
        &self,
        partition_key: PartitionKey,
        entity: &T,
        cancel: &Cancellation,
    ) -> RepositoryResult<()> {
        <R as AsDocumentRepository<T>>::as_base(self).upsert(partition_key, entity, cancel).await
    }

    async fn delete(
        &self,
        partition_key: PartitionKey,
        id: &str,
        cancel: &Cancellation,
    ) -> RepositoryResult<()> {
        <R as AsDocumentRepository<T>>::as_base(self).delete(partition_key, id, cancel).await
    }
}
