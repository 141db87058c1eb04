//! Document store client boundary.
//!
//! Implemented by vendor SDK adapters (and by [`InMemoryDocumentStore`]).
//! One client instance is shared by every repository; implementations must
//! be safe for concurrent use.
//!
//! [`InMemoryDocumentStore`]: crate::InMemoryDocumentStore

use crate::error::StoreResult;
use crate::model::{PartitionKey, QueryDefinition, QueryPage};
use async_trait::async_trait;
use serde_json::Value;

/// Container-scoped document operations.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Point read. Must fail with a 404-classified error when the document
    /// is absent.
    async fn read_item(
        &self,
        container: &str,
        partition_key: &PartitionKey,
        id: &str,
    ) -> StoreResult<Value>;

    /// Creates a document, failing with a conflict if the key is taken.
    async fn create_item(
        &self,
        container: &str,
        partition_key: &PartitionKey,
        id: &str,
        item: Value,
    ) -> StoreResult<()>;

    /// Creates or replaces a document.
    async fn upsert_item(
        &self,
        container: &str,
        partition_key: &PartitionKey,
        id: &str,
        item: Value,
    ) -> StoreResult<()>;

    /// Removes a document, failing with not-found if it is absent.
    async fn delete_item(
        &self,
        container: &str,
        partition_key: &PartitionKey,
        id: &str,
    ) -> StoreResult<()>;

    /// Reads one page of query results.
    ///
    /// `continuation` is the token returned by the previous page, `None` for
    /// the first. `max_item_count` is a page-size hint; `None` leaves it to
    /// the store.
    async fn query_page(
        &self,
        container: &str,
        query: &QueryDefinition,
        continuation: Option<&str>,
        max_item_count: Option<u32>,
    ) -> StoreResult<QueryPage>;
}
