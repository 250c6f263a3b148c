//! Integration tests for the telemetry pipeline.
//!
//! These tests exercise the complete flow over a real UDP socket:
//! - datagram → receiver → track store → snapshot frame
//! - malformed-input resilience of the receive loop
//! - field-level merge across multiple datagrams
//! - snapshot ordering at the published boundary
//!
//! Run with: `cargo test --test pipeline_integration`

use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::UdpSocket;

use tacplot::{PipelineConfig, TelemetryPipeline};

// ============================================================================
// Helper Functions
// ============================================================================

/// Pipeline config bound to an ephemeral localhost port, eviction off so
/// slow test runs cannot race the pruner.
fn test_config() -> PipelineConfig {
    PipelineConfig::default()
        .with_bind_addr(SocketAddr::from(([127, 0, 0, 1], 0)))
        .with_eviction_ttl(None)
}

/// A sender socket plus the pipeline's telemetry address.
async fn sender_for(pipeline: &TelemetryPipeline) -> (UdpSocket, SocketAddr) {
    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    (socket, pipeline.local_addr())
}

/// Give the receive and tick tasks time to settle.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(150)).await;
}

// ============================================================================
// Integration Tests
// ============================================================================

/// The spec's canonical end-to-end flow: one datagram in, normalized state
/// observable in the store.
#[tokio::test]
async fn test_end_to_end_datagram_to_store() {
    let pipeline = TelemetryPipeline::start(test_config()).await.unwrap();
    let (sender, addr) = sender_for(&pipeline).await;

    sender
        .send_to(
            br#"{"msg_type":"EntityState","entity_id":1,"x":100,"y":100,"heading_deg":-10,"speed":1,"seq":1}"#,
            addr,
        )
        .await
        .unwrap();
    settle().await;

    let track = pipeline.store().get(1).expect("track should exist");
    assert_eq!(track.heading_deg, 350.0);
    assert_eq!(track.x, 100.0);
    assert_eq!(track.y, 100.0);
    assert_eq!(track.speed, 1.0);
    assert_eq!(track.seq, 1);

    pipeline.shutdown().await;
}

/// Malformed datagrams leave the store untouched and the loop alive.
#[tokio::test]
async fn test_malformed_input_resilience() {
    let pipeline = TelemetryPipeline::start(test_config()).await.unwrap();
    let (sender, addr) = sender_for(&pipeline).await;

    let garbage: &[&[u8]] = &[
        &[0xff, 0xfe, 0x00, 0x80],                          // not UTF-8
        b"definitely not json",                             // not JSON
        br#"{"entity_id":1}"#,                              // no msg_type
        br#"{"msg_type":"Heartbeat","entity_id":1}"#,       // wrong msg_type
        br#"{"msg_type":"EntityState"}"#,                   // no entity_id
        br#"{"msg_type":"EntityState","entity_id":1.5}"#,   // non-integral id
        br#"{"msg_type":"EntityState","entity_id":"1"}"#,   // string id
        b"",                                                // empty datagram
    ];
    for payload in garbage {
        sender.send_to(payload, addr).await.unwrap();
    }
    settle().await;

    assert!(
        pipeline.store().is_empty(),
        "malformed datagrams must not create tracks"
    );

    // The loop is still running: a valid datagram goes through afterwards.
    sender
        .send_to(br#"{"msg_type":"EntityState","entity_id":2,"x":5.0}"#, addr)
        .await
        .unwrap();
    settle().await;

    assert_eq!(pipeline.store().len(), 1);
    assert_eq!(pipeline.store().get(2).unwrap().x, 5.0);

    pipeline.shutdown().await;
}

/// Field-level merge across datagrams: absent fields survive.
#[tokio::test]
async fn test_partial_update_over_the_wire() {
    let pipeline = TelemetryPipeline::start(test_config()).await.unwrap();
    let (sender, addr) = sender_for(&pipeline).await;

    sender
        .send_to(
            br#"{"msg_type":"EntityState","entity_id":4,"x":10.0,"y":20.0,"speed":5.0,"status":"OK"}"#,
            addr,
        )
        .await
        .unwrap();
    settle().await;

    sender
        .send_to(br#"{"msg_type":"EntityState","entity_id":4,"x":11.0}"#, addr)
        .await
        .unwrap();
    settle().await;

    let track = pipeline.store().get(4).unwrap();
    assert_eq!(track.x, 11.0);
    assert_eq!(track.y, 20.0);
    assert_eq!(track.speed, 5.0, "speed absent from second message must survive");
    assert_eq!(track.status, "OK");
    assert_eq!(track.history.len(), 2);

    pipeline.shutdown().await;
}

/// Published frames are ordered by entity id regardless of arrival order.
#[tokio::test]
async fn test_published_frame_ordering() {
    let pipeline = TelemetryPipeline::start(test_config()).await.unwrap();
    let (sender, addr) = sender_for(&pipeline).await;

    for id in [5, 1, 3] {
        sender
            .send_to(
                format!(r#"{{"msg_type":"EntityState","entity_id":{id}}}"#).as_bytes(),
                addr,
            )
            .await
            .unwrap();
    }
    settle().await;

    let frame = pipeline.latest();
    let ids: Vec<_> = frame.iter().map(|s| s.entity_id).collect();
    assert_eq!(ids, vec![1, 3, 5]);

    pipeline.shutdown().await;
}

/// A burst of updates for one entity coalesces: the store ends at the
/// final committed state, never a queue.
#[tokio::test]
async fn test_burst_coalesces_to_latest_state() {
    let pipeline = TelemetryPipeline::start(test_config()).await.unwrap();
    let (sender, addr) = sender_for(&pipeline).await;

    for i in 0..50 {
        sender
            .send_to(
                format!(r#"{{"msg_type":"EntityState","entity_id":9,"x":{i}.0,"seq":{i}}}"#)
                    .as_bytes(),
                addr,
            )
            .await
            .unwrap();
    }
    settle().await;

    let track = pipeline.store().get(9).expect("track should exist");
    // Localhost UDP may still drop under burst; whatever arrived last won.
    assert_eq!(track.x, track.seq as f64);
    assert_eq!(pipeline.store().len(), 1);

    pipeline.shutdown().await;
}

/// Tracks flagged stale once updates stop, while fresh tracks stay live.
#[tokio::test]
async fn test_staleness_flag_at_published_boundary() {
    let config = test_config().with_stale_threshold(Duration::from_millis(500));
    let pipeline = TelemetryPipeline::start(config).await.unwrap();
    let (sender, addr) = sender_for(&pipeline).await;

    sender
        .send_to(br#"{"msg_type":"EntityState","entity_id":1}"#, addr)
        .await
        .unwrap();
    settle().await;

    let frame = pipeline.latest();
    assert!(!frame[0].is_stale, "freshly updated track must be live");

    // Let it go silent well past the threshold.
    tokio::time::sleep(Duration::from_millis(1200)).await;

    let frame = pipeline.latest();
    assert!(frame[0].is_stale, "silent track must be flagged stale");

    pipeline.shutdown().await;
}
