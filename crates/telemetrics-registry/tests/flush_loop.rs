#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use telemetrics_core::{AggregationScope, ErrorCode, MetricIdentifier};
use telemetrics_registry::{flush::spawn_flush_loop, InMemoryChannel, TelemetryClient, TelemetryConfiguration};

fn setup() -> (Arc<InMemoryChannel>, TelemetryClient) {
    let channel = Arc::new(InMemoryChannel::new());
    let configuration = TelemetryConfiguration::builder()
        .channel(channel.clone())
        .build()
        .unwrap();
    (channel, TelemetryClient::new(&configuration))
}

#[tokio::test]
async fn periodic_flush_sends_pending_values() {
    let (channel, client) = setup();
    let m = client.get_metric(&MetricIdentifier::new("Ticks").unwrap(), None, None).unwrap();
    m.track_value(1.0, &[]).unwrap();

    let (tx, rx) = watch::channel(false);
    let task = spawn_flush_loop(client.clone(), Duration::from_millis(20), rx).unwrap();

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(channel.aggregates().len(), 1);

    tx.send(true).unwrap();
    task.await.unwrap();
}

#[tokio::test]
async fn shutdown_performs_final_flush() {
    let (channel, client) = setup();
    let (tx, rx) = watch::channel(false);
    let task = spawn_flush_loop(client.clone(), Duration::from_secs(3600), rx).unwrap();

    let id = MetricIdentifier::new("Late").unwrap();
    client.get_metric(&id, None, None).unwrap().track_value(2.0, &[]).unwrap();
    client
        .get_metric(&id, None, Some(AggregationScope::PerTelemetryClient))
        .unwrap()
        .track_value(3.0, &[])
        .unwrap();

    tx.send(true).unwrap();
    task.await.unwrap();

    let mut sums: Vec<f64> = channel.aggregates().iter().filter_map(|a| a.sum).collect();
    sums.sort_by(|a, b| a.partial_cmp(b).unwrap());
    assert_eq!(sums, vec![2.0, 3.0]);
}

#[tokio::test]
async fn dropped_sender_stops_loop() {
    let (_channel, client) = setup();
    let (tx, rx) = watch::channel(false);
    let task = spawn_flush_loop(client, Duration::from_secs(3600), rx).unwrap();
    drop(tx);
    tokio::time::timeout(Duration::from_secs(5), task).await.unwrap().unwrap();
}

#[tokio::test]
async fn zero_interval_is_rejected() {
    let (_channel, client) = setup();
    let (_tx, rx) = watch::channel(false);
    let err = spawn_flush_loop(client, Duration::ZERO, rx).err().expect("zero interval must fail");
    assert_eq!(err.code(), ErrorCode::InvalidArgument);
}
