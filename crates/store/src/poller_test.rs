use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use pipestorm_routing::{Pipe, RoutingRule, RoutingTable};

use crate::error::{Result, StoreError};
use crate::poller::{TableEvent, TablePoller};
use crate::{ConfigStore, MemoryStore};

/// Store that can be flipped into a failing state mid-test
struct FlakyStore {
    inner: MemoryStore,
    failing: AtomicBool,
}

impl FlakyStore {
    fn new() -> Self {
        Self {
            inner: MemoryStore::new(),
            failing: AtomicBool::new(false),
        }
    }

    fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl ConfigStore for FlakyStore {
    async fn list(&self) -> Result<Vec<RoutingRule>> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::unavailable("injected outage"));
        }
        self.inner.list().await
    }

    async fn get(&self, source_topic: &str) -> Result<Option<RoutingRule>> {
        self.inner.get(source_topic).await
    }

    async fn upsert(
        &self,
        source_topic: &str,
        pipes: Vec<Pipe>,
        parse_as_json: bool,
    ) -> Result<RoutingRule> {
        self.inner.upsert(source_topic, pipes, parse_as_json).await
    }

    async fn delete(&self, source_topic: &str) -> Result<()> {
        self.inner.delete(source_topic).await
    }
}

fn poller_over(
    store: Arc<dyn ConfigStore>,
    table: Arc<RoutingTable>,
) -> (TablePoller, mpsc::Receiver<TableEvent>) {
    let (tx, rx) = mpsc::channel(8);
    let poller = TablePoller::new(store, table, Duration::from_secs(15), tx);
    (poller, rx)
}

#[tokio::test]
async fn test_first_poll_populates_table_and_signals() {
    let store = Arc::new(MemoryStore::new());
    store
        .upsert("orders", vec![Pipe::new("orders-out")], true)
        .await
        .unwrap();

    let table = Arc::new(RoutingTable::new());
    let (poller, mut rx) = poller_over(store, Arc::clone(&table));

    poller.poll_once().await.unwrap();

    assert!(table.lookup("orders").is_some());
    assert_eq!(
        rx.try_recv().unwrap(),
        TableEvent::TopicSetChanged(vec!["orders".to_string()])
    );
}

#[tokio::test]
async fn test_unchanged_topic_set_is_silent() {
    let store = Arc::new(MemoryStore::new());
    store
        .upsert("orders", vec![Pipe::new("v1")], true)
        .await
        .unwrap();

    let table = Arc::new(RoutingTable::new());
    let (poller, mut rx) = poller_over(Arc::clone(&store) as Arc<dyn ConfigStore>, Arc::clone(&table));

    poller.poll_once().await.unwrap();
    rx.try_recv().unwrap();

    // same topic, different pipes: swapped in but no event
    store
        .upsert("orders", vec![Pipe::new("v2")], true)
        .await
        .unwrap();
    poller.poll_once().await.unwrap();

    assert!(rx.try_recv().is_err());
    let rule = table.lookup("orders").unwrap();
    assert_eq!(rule.pipes[0].target_topic, "v2");
}

#[tokio::test]
async fn test_store_failure_keeps_previous_snapshot() {
    let store = Arc::new(FlakyStore::new());
    store
        .upsert("orders", vec![Pipe::new("out")], true)
        .await
        .unwrap();

    let table = Arc::new(RoutingTable::new());
    let (poller, _rx) = poller_over(Arc::clone(&store) as Arc<dyn ConfigStore>, Arc::clone(&table));

    poller.poll_once().await.unwrap();
    assert!(table.lookup("orders").is_some());

    store.set_failing(true);
    let err = poller.poll_once().await.unwrap_err();
    assert!(matches!(err, StoreError::Unavailable(_)));
    assert!(table.lookup("orders").is_some());
}

#[tokio::test]
async fn test_topic_removal_signals_empty_set() {
    let store = Arc::new(MemoryStore::new());
    store
        .upsert("orders", vec![Pipe::new("out")], true)
        .await
        .unwrap();

    let table = Arc::new(RoutingTable::new());
    let (poller, mut rx) = poller_over(Arc::clone(&store) as Arc<dyn ConfigStore>, Arc::clone(&table));

    poller.poll_once().await.unwrap();
    rx.try_recv().unwrap();

    store.delete("orders").await.unwrap();
    poller.poll_once().await.unwrap();

    assert_eq!(rx.try_recv().unwrap(), TableEvent::TopicSetChanged(Vec::new()));
    assert!(table.lookup("orders").is_none());
}

/// Store whose list call never resolves
struct HangingStore;

#[async_trait]
impl ConfigStore for HangingStore {
    async fn list(&self) -> Result<Vec<RoutingRule>> {
        std::future::pending().await
    }

    async fn get(&self, _source_topic: &str) -> Result<Option<RoutingRule>> {
        Ok(None)
    }

    async fn upsert(
        &self,
        _source_topic: &str,
        _pipes: Vec<Pipe>,
        _parse_as_json: bool,
    ) -> Result<RoutingRule> {
        unreachable!("test store never upserts")
    }

    async fn delete(&self, _source_topic: &str) -> Result<()> {
        Ok(())
    }
}

#[tokio::test(start_paused = true)]
async fn test_slow_store_request_counts_as_unavailable() {
    let table = Arc::new(RoutingTable::new());
    let (tx, _rx) = mpsc::channel(8);
    let poller = TablePoller::new(
        Arc::new(HangingStore),
        Arc::clone(&table),
        Duration::from_secs(15),
        tx,
    )
    .with_request_timeout(Duration::from_millis(200));
    let metrics = poller.metrics();

    let err = poller.poll_once().await.unwrap_err();

    assert!(matches!(err, StoreError::Unavailable(_)));
    assert_eq!(metrics.snapshot().polls_success, 0);
    assert_eq!(metrics.snapshot().polls_failed, 1);
}

#[tokio::test(start_paused = true)]
async fn test_run_does_not_repeat_the_startup_poll() {
    let store = Arc::new(MemoryStore::new());
    store
        .upsert("orders", vec![Pipe::new("out")], true)
        .await
        .unwrap();

    let table = Arc::new(RoutingTable::new());
    let (poller, _rx) = poller_over(Arc::clone(&store) as Arc<dyn ConfigStore>, table);
    let metrics = poller.metrics();

    poller.poll_once().await.unwrap();

    let shutdown = CancellationToken::new();
    let handle = tokio::spawn(poller.run(shutdown.clone()));

    // no second fetch at startup, only the interval continues
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(metrics.snapshot().polls, 1);

    tokio::time::sleep(Duration::from_secs(15)).await;
    assert_eq!(metrics.snapshot().polls, 2);

    shutdown.cancel();
    handle.await.unwrap();
}

#[tokio::test]
async fn test_poll_metrics_track_successes_and_failures() {
    let store = Arc::new(FlakyStore::new());
    let table = Arc::new(RoutingTable::new());
    let (poller, _rx) = poller_over(Arc::clone(&store) as Arc<dyn ConfigStore>, table);
    let metrics = poller.metrics();

    poller.poll_once().await.unwrap();
    store.set_failing(true);
    assert!(poller.poll_once().await.is_err());

    let snap = metrics.snapshot();
    assert_eq!(snap.polls, 2);
    assert_eq!(snap.polls_success, 1);
    assert_eq!(snap.polls_failed, 1);
}
