//! Generic partitioned document repository.
//!
//! A [`DocumentRepositoryBase<T>`] binds one entity type to one container of
//! a shared [`DocumentStore`] client and exposes partitioned CRUD plus
//! paged-and-drained querying through the [`DocumentRepository`] contract.
//!
//! # Specializing a repository
//!
//! Per-entity repositories wrap the base and implement
//! [`AsDocumentRepository`]; the contract is then provided for them, and a
//! marker trait can name the specialization for dependency injection:
//!
//! ```
//! use nucleus_documents::{
//!     AsDocumentRepository, Document, DocumentRepository, DocumentRepositoryBase,
//!     DocumentStore, InMemoryDocumentStore,
//! };
//! use serde::{Deserialize, Serialize};
//! use std::sync::Arc;
//!
//! #[derive(Debug, Clone, Serialize, Deserialize)]
//! struct Reading {
//!     id: String,
//!     celsius: f64,
//! }
//!
//! impl Document for Reading {
//!     fn id(&self) -> &str {
//!         &self.id
//!     }
//! }
//!
//! trait ReadingRepository: DocumentRepository<Reading> {}
//!
//! struct CosmosReadingRepository(DocumentRepositoryBase<Reading>);
//!
//! impl CosmosReadingRepository {
//!     fn new(store: Arc<dyn DocumentStore>) -> Self {
//!         Self(DocumentRepositoryBase::new(store, "readings"))
//!     }
//! }
//!
//! impl AsDocumentRepository<Reading> for CosmosReadingRepository {
//!     fn as_base(&self) -> &DocumentRepositoryBase<Reading> {
//!         &self.0
//!     }
//! }
//!
//! impl ReadingRepository for CosmosReadingRepository {}
//!
//! let store = Arc::new(InMemoryDocumentStore::new().with_container("readings"));
//! let repo: Arc<dyn ReadingRepository> = Arc::new(CosmosReadingRepository::new(store));
//! ```

mod error;
pub mod memory;
mod model;
mod repository;
mod store;

pub use error::{DocumentStoreError, RepositoryError, RepositoryResult, StoreResult};
pub use memory::{InMemoryDocumentStore, InMemoryDocumentStoreConfig};
pub use model::{Document, PartitionKey, QueryDefinition, QueryPage};
pub use repository::{
    AsDocumentRepository, DocumentRepository, DocumentRepositoryBase, DocumentRepositoryConfig,
    SELECT_ALL,
};
pub use store::DocumentStore;
