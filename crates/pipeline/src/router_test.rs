use std::sync::Arc;

use pipestorm_protocol::SortedMessageBatch;
use pipestorm_routing::{Pipe, RoutingRule, RoutingTable};

use crate::error::PipelineError;
use crate::metrics::PipelineMetrics;
use crate::publisher::ChunkedPublisher;
use crate::router::BatchRouter;
use crate::testutil::{raw_text, RecordingSink};

struct Fixture {
    sink: Arc<RecordingSink>,
    table: Arc<RoutingTable>,
    router: BatchRouter,
    metrics: Arc<PipelineMetrics>,
}

fn fixture(rules: Vec<RoutingRule>) -> Fixture {
    let sink = RecordingSink::new();
    let table = Arc::new(RoutingTable::new());
    table.apply(rules);

    let metrics = Arc::new(PipelineMetrics::new());
    let publisher = ChunkedPublisher::new(Arc::clone(&sink) as _, Arc::clone(&metrics));
    let router = BatchRouter::new(Arc::clone(&table), publisher, Arc::clone(&metrics));

    Fixture {
        sink,
        table,
        router,
        metrics,
    }
}

fn rule(source_topic: &str, pipes: Vec<Pipe>) -> RoutingRule {
    RoutingRule {
        source_topic: source_topic.to_string(),
        created_at: 1_700_000_000_000,
        parse_as_json: true,
        pipes,
    }
}

fn wide(target: &str) -> Pipe {
    let mut pipe = Pipe::new(target);
    pipe.chunk_size = 100;
    pipe
}

#[tokio::test]
async fn test_empty_batch_is_a_no_op() {
    let fx = fixture(vec![rule("orders", vec![wide("out")])]);

    fx.router.route(&SortedMessageBatch::new()).await.unwrap();

    assert!(fx.sink.published().is_empty());
    assert_eq!(fx.metrics.snapshot().batches_routed, 0);
}

#[tokio::test]
async fn test_missing_rule_fails_the_batch() {
    let fx = fixture(Vec::new());
    let mut batch = SortedMessageBatch::new();
    batch.push("orders", 0, raw_text("orders", 0, 1, "{\"a\":1}"));

    let err = fx.router.route(&batch).await.unwrap_err();

    assert!(matches!(err, PipelineError::MissingRule { ref topic } if topic == "orders"));
    assert_eq!(fx.metrics.snapshot().missing_rule_failures, 1);
    assert_eq!(fx.metrics.snapshot().batches_failed, 1);
    assert!(fx.sink.published().is_empty());
}

#[tokio::test]
async fn test_pipes_fan_out_independently() {
    let mut filtered = wide("sales-out");
    filtered
        .filter
        .insert("value.type".to_string(), serde_json::json!("sale"));
    let fx = fixture(vec![rule("orders", vec![wide("all-out"), filtered])]);

    let mut batch = SortedMessageBatch::new();
    batch.push("orders", 0, raw_text("orders", 0, 1, "{\"type\":\"sale\"}"));
    batch.push("orders", 0, raw_text("orders", 0, 2, "{\"type\":\"refund\"}"));

    let receipts = fx.router.route(&batch).await.unwrap();

    let all = fx.sink.chunks_for("all-out");
    assert_eq!(all[0].as_array().unwrap().len(), 2);

    let sales = fx.sink.chunks_for("sales-out");
    assert_eq!(sales[0].as_array().unwrap().len(), 1);
    assert_eq!(sales[0][0]["value"]["type"], "sale");

    assert_eq!(receipts.len(), 2);
    let mut targets: Vec<&str> = receipts.iter().map(|r| r.target_topic.as_str()).collect();
    targets.sort_unstable();
    assert_eq!(targets, vec!["all-out", "sales-out"]);
    assert_eq!(fx.metrics.snapshot().batches_routed, 1);
}

#[tokio::test]
async fn test_partition_order_survives_into_chunks() {
    let fx = fixture(vec![rule("orders", vec![wide("out")])]);

    let mut batch = SortedMessageBatch::new();
    for offset in [3, 7, 9] {
        batch.push(
            "orders",
            0,
            raw_text("orders", 0, offset, "{\"ok\":true}"),
        );
    }

    fx.router.route(&batch).await.unwrap();

    let chunk = fx.sink.chunks_for("out").remove(0);
    let offsets: Vec<i64> = chunk
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["offset"].as_i64().unwrap())
        .collect();
    assert_eq!(offsets, vec![3, 7, 9]);
}

#[tokio::test]
async fn test_tombstones_skipped_unless_opted_in() {
    let mut keeper = wide("with-tombstones");
    keeper.publish_tombstones = true;
    let fx = fixture(vec![rule("orders", vec![wide("plain"), keeper])]);

    let mut batch = SortedMessageBatch::new();
    batch.push("orders", 0, raw_text("orders", 0, 1, "null"));
    batch.push("orders", 0, raw_text("orders", 0, 2, "{\"a\":1}"));

    fx.router.route(&batch).await.unwrap();

    assert_eq!(fx.sink.chunks_for("plain")[0].as_array().unwrap().len(), 1);
    assert_eq!(
        fx.sink.chunks_for("with-tombstones")[0]
            .as_array()
            .unwrap()
            .len(),
        2
    );
}

#[tokio::test]
async fn test_malformed_message_is_dropped_not_fatal() {
    let fx = fixture(vec![rule("orders", vec![wide("out")])]);

    let mut broken = raw_text("orders", 0, 1, "{\"a\":1}");
    broken.partition = None;

    let mut batch = SortedMessageBatch::new();
    batch.push("orders", 0, broken);
    batch.push("orders", 0, raw_text("orders", 0, 2, "{\"b\":2}"));

    fx.router.route(&batch).await.unwrap();

    assert_eq!(fx.sink.chunks_for("out")[0].as_array().unwrap().len(), 1);
    let snap = fx.metrics.snapshot();
    assert_eq!(snap.messages_processed, 2);
    assert_eq!(snap.messages_dropped, 1);
    assert_eq!(fx.metrics.dropped_by_topic()["orders"], 1);
}

#[tokio::test]
async fn test_sibling_topics_settle_before_failure_surfaces() {
    let fx = fixture(vec![
        rule("orders", vec![wide("orders-out")]),
        rule("payments", vec![wide("payments-out")]),
    ]);
    fx.sink.fail_topic("orders-out");

    let mut batch = SortedMessageBatch::new();
    batch.push("orders", 0, raw_text("orders", 0, 1, "{\"a\":1}"));
    batch.push("payments", 0, raw_text("payments", 0, 5, "{\"b\":2}"));

    let err = fx.router.route(&batch).await.unwrap_err();

    assert!(matches!(err, PipelineError::Sink(_)));
    // the healthy sibling still published
    assert_eq!(fx.sink.chunks_for("payments-out").len(), 1);
    assert_eq!(fx.metrics.snapshot().batches_failed, 1);
}

#[tokio::test]
async fn test_new_snapshot_is_picked_up_between_batches() {
    let fx = fixture(Vec::new());
    let mut batch = SortedMessageBatch::new();
    batch.push("orders", 0, raw_text("orders", 0, 1, "{\"a\":1}"));

    assert!(fx.router.route(&batch).await.is_err());

    fx.table.apply(vec![rule("orders", vec![wide("out")])]);
    fx.router.route(&batch).await.unwrap();

    assert_eq!(fx.sink.chunks_for("out").len(), 1);
}
