//! Property tests for the repository contract over the in-memory store.

mod common;

use common::{CONTAINER, TestDao, TestRepository};
use nucleus_documents::{DocumentRepository, InMemoryDocumentStore};
use nucleus_types::Cancellation;
use proptest::prelude::*;
use std::sync::Arc;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
}

fn fresh_repo() -> TestRepository {
    TestRepository::new(Arc::new(InMemoryDocumentStore::new().with_container(CONTAINER)))
}

fn key_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z0-9:_-]{1,24}"
}

fn dao_strategy() -> impl Strategy<Value = TestDao> {
    (
        key_strategy(),
        proptest::option::of("[a-z]{1,8}"),
        proptest::option::of((-200i32..240).prop_map(|quarters| f64::from(quarters) / 4.0)),
    )
        .prop_map(|(id, kind, celsius)| TestDao { id, kind, celsius })
}

proptest! {
    /// `add` followed by `get` returns the entity that was added.
    #[test]
    fn add_then_get_round_trips(partition in key_strategy(), entity in dao_strategy()) {
        let rt = runtime();
        let fetched = rt.block_on(async {
            let repo = fresh_repo();
            let cancel = Cancellation::none();
            repo.add(partition.clone().into(), &entity, &cancel).await.unwrap();
            repo.get(partition.into(), &entity.id, &cancel).await.unwrap()
        });
        prop_assert_eq!(fetched, Some(entity));
    }

    /// `get` on an empty container is absent, never an error.
    #[test]
    fn get_missing_is_absent(partition in key_strategy(), id in key_strategy()) {
        let rt = runtime();
        let fetched = rt.block_on(async {
            fresh_repo().get(partition.into(), &id, &Cancellation::none()).await
        });
        prop_assert!(matches!(fetched, Ok(None)));
    }

    /// The second of two upserts with the same id wins.
    #[test]
    fn last_upsert_wins(
        partition in key_strategy(),
        first in dao_strategy(),
        second in dao_strategy(),
    ) {
        let second = TestDao { id: first.id.clone(), ..second };
        let rt = runtime();
        let fetched = rt.block_on(async {
            let repo = fresh_repo();
            let cancel = Cancellation::none();
            repo.upsert(partition.clone().into(), &first, &cancel).await.unwrap();
            repo.upsert(partition.clone().into(), &second, &cancel).await.unwrap();
            repo.get(partition.into(), &second.id, &cancel).await.unwrap()
        });
        prop_assert_eq!(fetched, Some(second));
    }

    /// `delete` followed by `get` is absent.
    #[test]
    fn delete_then_get_is_absent(partition in key_strategy(), entity in dao_strategy()) {
        let rt = runtime();
        let fetched = rt.block_on(async {
            let repo = fresh_repo();
            let cancel = Cancellation::none();
            repo.add(partition.clone().into(), &entity, &cancel).await.unwrap();
            repo.delete(partition.clone().into(), &entity.id, &cancel).await.unwrap();
            repo.get(partition.into(), &entity.id, &cancel).await.unwrap()
        });
        prop_assert_eq!(fetched, None);
    }
}
