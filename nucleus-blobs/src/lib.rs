//! Generic blob repository.
//!
//! A [`BlobRepositoryBase`] is bound to one container of a shared
//! [`BlobServiceClient`] and reads and writes named text blobs. A missing
//! container reads the same as a missing blob: `exists` is false and `get`
//! and `get_uri` are absent.
//!
//! [`BlobRepository::get_uri`] has a side effect: it opens the container to
//! anonymous blob-level reads ([`PublicAccess::Blob`]) on every call before
//! resolving the address. Use it only for containers that hold public assets.

mod client;
mod error;
mod memory;
mod repository;

pub use client::{BlobServiceClient, PublicAccess};
pub use error::{BlobRepositoryError, BlobRepositoryResult, BlobStoreError, BlobStoreResult};
pub use memory::{BlobServiceConfig, InMemoryBlobService};
pub use repository::{AsBlobRepository, BlobRepository, BlobRepositoryBase};
pub use url::Url;
