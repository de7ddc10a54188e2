// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Integration tests for `Group::get()` without peers.

use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use futures_util::future::join_all;
use peercache::{BoxError, ByteView, Error, Getter, Registry, getter_fn};
use peercache_store::testing::{MockStore, StoreOp};
use tokio::sync::Notify;

/// A getter backed by a fixed table that counts how often it is consulted.
struct Scores {
    table: HashMap<&'static str, &'static str>,
    calls: Arc<AtomicUsize>,
}

impl Scores {
    fn new(calls: &Arc<AtomicUsize>) -> Self {
        Self {
            table: HashMap::from([("Tom", "630"), ("Jack", "589"), ("Sam", "567")]),
            calls: Arc::clone(calls),
        }
    }
}

impl Getter for Scores {
    async fn get(&self, key: &str) -> Result<Vec<u8>, BoxError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(20)).await;
        self.table
            .get(key)
            .map(|score| score.as_bytes().to_vec())
            .ok_or_else(|| format!("{key} not exist").into())
    }
}

struct Exploding;

impl Getter for Exploding {
    async fn get(&self, _key: &str) -> Result<Vec<u8>, BoxError> {
        panic!("getter exploded");
    }
}

#[tokio::test]
async fn second_get_is_served_from_the_store() {
    let calls = Arc::new(AtomicUsize::new(0));
    let registry = Registry::new();
    let group = registry.new_group("scores", 2 << 10, Scores::new(&calls)).expect("register");

    for (name, score) in [("Tom", "630"), ("Jack", "589"), ("Sam", "567")] {
        assert_eq!(group.get(name).await.expect("first get").as_string(), score);
        assert_eq!(group.get(name).await.expect("second get").as_string(), score);
    }

    assert_eq!(calls.load(Ordering::SeqCst), 3);
    let stats = group.stats();
    assert_eq!(stats.gets, 6);
    assert_eq!(stats.cache_hits, 3);
    assert_eq!(stats.local_loads, 3);
}

#[tokio::test]
async fn mutating_a_returned_copy_leaves_the_cached_value_intact() {
    let calls = Arc::new(AtomicUsize::new(0));
    let registry = Registry::new();
    let group = registry.new_group("scores", 0, Scores::new(&calls)).expect("register");

    let mut copy = group.get("Tom").await.expect("first get").bytes();
    copy.fill(b'0');

    let cached = group.get("Tom").await.expect("second get");
    assert_eq!(cached.bytes(), b"630");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(group.stats().cache_hits, 1);
}

#[tokio::test]
async fn concurrent_misses_share_one_getter_call() {
    let calls = Arc::new(AtomicUsize::new(0));
    let registry = Registry::new();
    let group = registry.new_group("scores", 0, Scores::new(&calls)).expect("register");

    let results = join_all((0..10).map(|_| group.get("Tom"))).await;

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    for result in results {
        assert_eq!(result.expect("every caller gets the value"), ByteView::from("630"));
    }
    let stats = group.stats();
    assert_eq!(stats.loads, 10);
    assert_eq!(stats.loads_executed, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_misses_across_threads_share_one_getter_call() {
    let calls = Arc::new(AtomicUsize::new(0));
    let gate = Arc::new(Notify::new());
    let registry = Registry::new();
    let group = registry
        .new_group("scores", 0, {
            let calls = Arc::clone(&calls);
            let gate = Arc::clone(&gate);
            getter_fn(move |key: String| {
                let calls = Arc::clone(&calls);
                let gate = Arc::clone(&gate);
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    gate.notified().await;
                    Ok::<_, BoxError>(format!("value of {key}").into_bytes())
                }
            })
        })
        .expect("register");

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let group = Arc::clone(&group);
            tokio::spawn(async move { group.get("Tom").await })
        })
        .collect();

    // Every caller has joined the load once it has been counted.
    while group.stats().loads < 8 {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
    gate.notify_one();

    for task in tasks {
        let value = task.await.expect("task should not panic").expect("get should succeed");
        assert_eq!(value.as_string(), "value of Tom");
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn getter_errors_are_shared_but_not_cached() {
    let calls = Arc::new(AtomicUsize::new(0));
    let store = MockStore::new();
    let registry = Registry::new();
    let group = registry
        .group("scores")
        .getter(Scores::new(&calls))
        .store(store.clone())
        .build()
        .expect("register");

    let results = join_all((0..5).map(|_| group.get("unknown"))).await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    for result in results {
        let error = result.expect_err("unknown keys fail");
        assert!(matches!(error, Error::Getter(_)));
        assert_eq!(error.to_string(), "unknown not exist");
    }

    // The failure is not remembered; the next miss asks the getter again.
    let error = group.get("unknown").await.expect_err("still unknown");
    assert_eq!(error.getter_error().map(ToString::to_string).as_deref(), Some("unknown not exist"));
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    assert!(store.additions().is_empty());
    assert_eq!(group.stats().local_load_errors, 2);
}

#[tokio::test]
async fn empty_key_never_reaches_the_getter() {
    let calls = Arc::new(AtomicUsize::new(0));
    let store = MockStore::new();
    let registry = Registry::new();
    let group = registry
        .group("scores")
        .getter(Scores::new(&calls))
        .store(store.clone())
        .build()
        .expect("register");

    let error = group.get("").await.expect_err("empty key is rejected");
    assert!(matches!(error, Error::EmptyKey));
    assert_eq!(error.to_string(), "key is required");
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(store.operations().is_empty());
}

#[tokio::test]
async fn loaded_values_are_added_to_the_store() {
    let calls = Arc::new(AtomicUsize::new(0));
    let store = MockStore::new();
    let registry = Registry::new();
    let group = registry
        .group("scores")
        .getter(Scores::new(&calls))
        .store(store.clone())
        .build()
        .expect("register");

    group.get("Sam").await.expect("Sam has a score");

    assert_eq!(
        store.operations(),
        vec![
            StoreOp::Get("Sam".to_owned()),
            StoreOp::Add {
                key: "Sam".to_owned(),
                value: ByteView::from("567"),
            },
        ]
    );
}

#[tokio::test]
async fn prepopulated_store_skips_the_getter() {
    let calls = Arc::new(AtomicUsize::new(0));
    let registry = Registry::new();
    let group = registry
        .group("scores")
        .getter(Scores::new(&calls))
        .store(MockStore::with_data([("Tom", "999")]))
        .build()
        .expect("register");

    assert_eq!(group.get("Tom").await.expect("cached").as_string(), "999");
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn panicking_getter_is_reported_to_the_caller() {
    let registry = Registry::new();
    let group = registry.new_group("scores", 0, Exploding).expect("register");

    let error = group.get("Tom").await.expect_err("getter panicked");
    let Error::Panicked(panicked) = &error else {
        panic!("expected a panic error, got {error:?}");
    };
    assert_eq!(panicked.message(), "getter exploded");

    // The group stays usable and tries again.
    assert!(matches!(group.get("Tom").await, Err(Error::Panicked(_))));
    assert_eq!(group.stats().loads_executed, 2);
}

#[tokio::test]
async fn groups_do_not_share_values() {
    let registry = Registry::new();
    let upper = registry
        .new_group(
            "upper",
            0,
            getter_fn(|key: String| async move { Ok::<_, BoxError>(key.to_uppercase().into_bytes()) }),
        )
        .expect("register upper");
    let lower = registry
        .new_group(
            "lower",
            0,
            getter_fn(|key: String| async move { Ok::<_, BoxError>(key.to_lowercase().into_bytes()) }),
        )
        .expect("register lower");

    assert_eq!(upper.get("Key").await.expect("upper").as_string(), "KEY");
    assert_eq!(lower.get("Key").await.expect("lower").as_string(), "key");
}
