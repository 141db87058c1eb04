//! Shared fixtures for repository tests.

#![allow(dead_code)]

use async_trait::async_trait;
use nucleus_documents::{
    AsDocumentRepository, Document, DocumentRepositoryBase, DocumentStore, DocumentStoreError,
    PartitionKey, QueryDefinition, QueryPage, StoreResult,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

pub const CONTAINER: &str = "testContainer";
pub const PARTITION: &str = "Temperature";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestDao {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub celsius: Option<f64>,
}

impl TestDao {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            kind: None,
            celsius: None,
        }
    }

    pub fn with_kind(mut self, kind: &str) -> Self {
        self.kind = Some(kind.to_string());
        self
    }

    pub fn with_celsius(mut self, celsius: f64) -> Self {
        self.celsius = Some(celsius);
        self
    }
}

impl Document for TestDao {
    fn id(&self) -> &str {
        &self.id
    }
}

/// A specialized repository, built the way downstream crates build theirs.
pub struct TestRepository(DocumentRepositoryBase<TestDao>);

impl TestRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self(DocumentRepositoryBase::new(store, CONTAINER))
    }
}

impl AsDocumentRepository<TestDao> for TestRepository {
    fn as_base(&self) -> &DocumentRepositoryBase<TestDao> {
        &self.0
    }
}

/// One recorded store call.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Read {
        container: String,
        partition_key: String,
        id: String,
    },
    Create {
        container: String,
        partition_key: String,
        id: String,
        item: Value,
    },
    Upsert {
        container: String,
        partition_key: String,
        id: String,
        item: Value,
    },
    Delete {
        container: String,
        partition_key: String,
        id: String,
    },
    Query {
        container: String,
        text: String,
        continuation: Option<String>,
        max_item_count: Option<u32>,
    },
}

/// Store double that records every call and answers from a script.
///
/// Point operations fail with the next queued error and otherwise succeed,
/// reads answering `{"id": <id>}`. Queries pop from `pages`.
#[derive(Default)]
pub struct ScriptedStore {
    calls: Mutex<Vec<Call>>,
    errors: Mutex<VecDeque<DocumentStoreError>>,
    pages: Mutex<VecDeque<StoreResult<QueryPage>>>,
    /// Fired when the store serves the page with this index (0-based).
    on_page: Mutex<Option<(usize, Box<dyn Fn() + Send>)>>,
}

impl ScriptedStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn fail_next(&self, err: DocumentStoreError) {
        self.errors.lock().unwrap().push_back(err);
    }

    pub fn push_page(&self, items: Vec<Value>, continuation: Option<&str>) {
        self.pages.lock().unwrap().push_back(Ok(QueryPage {
            items,
            continuation: continuation.map(str::to_string),
        }));
    }

    pub fn push_page_error(&self, err: DocumentStoreError) {
        self.pages.lock().unwrap().push_back(Err(err));
    }

    pub fn on_page(&self, index: usize, hook: impl Fn() + Send + 'static) {
        *self.on_page.lock().unwrap() = Some((index, Box::new(hook)));
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn scripted_error(&self) -> StoreResult<()> {
        match self.errors.lock().unwrap().pop_front() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl DocumentStore for ScriptedStore {
    async fn read_item(
        &self,
        container: &str,
        partition_key: &PartitionKey,
        id: &str,
    ) -> StoreResult<Value> {
        self.record(Call::Read {
            container: container.to_string(),
            partition_key: partition_key.to_string(),
            id: id.to_string(),
        });
        self.scripted_error()?;
        Ok(serde_json::json!({ "id": id }))
    }

    async fn create_item(
        &self,
        container: &str,
        partition_key: &PartitionKey,
        id: &str,
        item: Value,
    ) -> StoreResult<()> {
        self.record(Call::Create {
            container: container.to_string(),
            partition_key: partition_key.to_string(),
            id: id.to_string(),
            item,
        });
        self.scripted_error()
    }

    async fn upsert_item(
        &self,
        container: &str,
        partition_key: &PartitionKey,
        id: &str,
        item: Value,
    ) -> StoreResult<()> {
        self.record(Call::Upsert {
            container: container.to_string(),
            partition_key: partition_key.to_string(),
            id: id.to_string(),
            item,
        });
        self.scripted_error()
    }

    async fn delete_item(
        &self,
        container: &str,
        partition_key: &PartitionKey,
        id: &str,
    ) -> StoreResult<()> {
        self.record(Call::Delete {
            container: container.to_string(),
            partition_key: partition_key.to_string(),
            id: id.to_string(),
        });
        self.scripted_error()
    }

    async fn query_page(
        &self,
        container: &str,
        query: &QueryDefinition,
        continuation: Option<&str>,
        max_item_count: Option<u32>,
    ) -> StoreResult<QueryPage> {
        let index = self
            .calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| matches!(c, Call::Query { .. }))
            .count();
        self.record(Call::Query {
            container: container.to_string(),
            text: query.text().to_string(),
            continuation: continuation.map(str::to_string),
            max_item_count,
        });

        if let Some((at, hook)) = self.on_page.lock().unwrap().as_ref() {
            if *at == index {
                hook();
            }
        }

        self.pages
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(QueryPage::default()))
    }
}
