//! Telemetry pipeline orchestration.
//!
//! [`TelemetryPipeline`] coordinates the startup, operation, and shutdown
//! of the two concurrency domains over the shared track store:
//!
//! # Startup Sequence
//!
//! 1. The track store is created (shared, no global lock).
//! 2. The receiver binds its socket and starts the receive task (sole
//!    writer). Bind failure aborts startup.
//! 3. The tick task starts (sole reader): every tick interval it produces
//!    an ordered snapshot frame and publishes it into the shared slot; on
//!    a slower cadence it prunes idle tracks when eviction is enabled.
//!
//! The domains communicate only through the store's read/write contract
//! and the published snapshot. Bursts of input coalesce in the store; the
//! tick task always reads the latest committed state, at most one tick
//! interval behind.
//!
//! # Example
//!
//! ```ignore
//! use tacplot::{PipelineConfig, TelemetryPipeline};
//!
//! let pipeline = TelemetryPipeline::start(PipelineConfig::default()).await?;
//!
//! // Render domain: read the latest published frame at its own pace.
//! let frame = pipeline.latest();
//!
//! // Graceful shutdown.
//! pipeline.shutdown().await;
//! ```

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::{EvictionConfig, PipelineConfig};
use crate::receiver::{ReceiverError, TelemetryReceiver};
use crate::snapshot::{SharedSnapshot, SnapshotProducer, TrackSnapshot};
use crate::track::TrackStore;

/// Errors that can occur during pipeline startup.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The telemetry receiver failed to start.
    #[error("failed to start telemetry receiver")]
    ReceiverStart(#[from] ReceiverError),
}

/// Coordinates the receive task, the tick task, and the shared store.
pub struct TelemetryPipeline {
    store: Arc<TrackStore>,
    shared: SharedSnapshot,
    receiver: TelemetryReceiver,
    tick_handle: JoinHandle<()>,
    cancellation: CancellationToken,
}

impl TelemetryPipeline {
    /// Start the full pipeline.
    pub async fn start(config: PipelineConfig) -> Result<Self, PipelineError> {
        info!("starting telemetry pipeline");

        let store = Arc::new(TrackStore::with_config(config.store.clone()));
        let receiver = TelemetryReceiver::start(config.receiver.clone(), Arc::clone(&store)).await?;

        let producer = SnapshotProducer::new(Arc::clone(&store), config.snapshot.stale_threshold);
        let shared = SharedSnapshot::new();
        let cancellation = CancellationToken::new();
        let tick_handle = tokio::spawn(tick_loop(
            producer,
            shared.clone(),
            Arc::clone(&store),
            config.snapshot.tick_interval,
            config.eviction.clone(),
            cancellation.clone(),
        ));

        Ok(Self {
            store,
            shared,
            receiver,
            tick_handle,
            cancellation,
        })
    }

    /// The shared track store (receive task is the sole writer).
    pub fn store(&self) -> &Arc<TrackStore> {
        &self.store
    }

    /// Address the telemetry socket bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.receiver.local_addr()
    }

    /// The most recently published snapshot frame.
    pub fn latest(&self) -> Arc<Vec<TrackSnapshot>> {
        self.shared.latest()
    }

    /// A clone of the publication slot, for handing to a render-side
    /// consumer that outlives borrowing the pipeline.
    pub fn shared_snapshot(&self) -> SharedSnapshot {
        self.shared.clone()
    }

    /// Stop both domains: cancel, stop the receiver within its bound,
    /// await the tick task.
    pub async fn shutdown(self) {
        info!("shutting down telemetry pipeline");
        self.cancellation.cancel();
        self.receiver.stop().await;
        let _ = self.tick_handle.await;
        info!("telemetry pipeline stopped");
    }
}

/// The tick domain: snapshot production on a fixed cadence, prune on a
/// slower one, both independent of telemetry arrival rate.
async fn tick_loop(
    producer: SnapshotProducer,
    shared: SharedSnapshot,
    store: Arc<TrackStore>,
    tick_interval: std::time::Duration,
    eviction: EvictionConfig,
    cancellation: CancellationToken,
) {
    let mut ticker = tokio::time::interval(tick_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut pruner = tokio::time::interval(eviction.prune_interval);
    pruner.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;

            _ = cancellation.cancelled() => {
                info!("tick task shutting down");
                break;
            }

            _ = ticker.tick() => {
                shared.publish(producer.tick(Instant::now()));
            }

            _ = pruner.tick() => {
                if let Some(ttl) = eviction.ttl {
                    let evicted = store.prune(Instant::now(), ttl);
                    if evicted > 0 {
                        debug!(evicted, "pruned idle tracks");
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::SocketAddr;
    use std::time::Duration;
    use tokio::net::UdpSocket;

    fn test_config() -> PipelineConfig {
        PipelineConfig::default().with_bind_addr(SocketAddr::from(([127, 0, 0, 1], 0)))
    }

    #[tokio::test]
    async fn test_start_and_shutdown() {
        let pipeline = TelemetryPipeline::start(test_config()).await.unwrap();
        assert!(pipeline.latest().is_empty());
        pipeline.shutdown().await;
    }

    #[tokio::test]
    async fn test_tick_task_publishes_frames() {
        let pipeline = TelemetryPipeline::start(test_config()).await.unwrap();

        let sender = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        sender
            .send_to(
                br#"{"msg_type":"EntityState","entity_id":3,"x":1.0}"#,
                pipeline.local_addr(),
            )
            .await
            .unwrap();

        // A couple of tick intervals is enough for publication.
        tokio::time::sleep(Duration::from_millis(200)).await;

        let frame = pipeline.latest();
        assert_eq!(frame.len(), 1);
        assert_eq!(frame[0].entity_id, 3);

        pipeline.shutdown().await;
    }

    #[tokio::test]
    async fn test_eviction_removes_idle_tracks() {
        let config = test_config()
            .with_eviction_ttl(Some(Duration::from_millis(200)))
            .with_prune_interval(Duration::from_millis(50));
        let pipeline = TelemetryPipeline::start(config).await.unwrap();

        let sender = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        sender
            .send_to(
                br#"{"msg_type":"EntityState","entity_id":8}"#,
                pipeline.local_addr(),
            )
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(pipeline.store().len(), 1);

        // Idle past the TTL: the prune cadence must evict it.
        tokio::time::sleep(Duration::from_millis(600)).await;
        assert!(pipeline.store().is_empty());

        pipeline.shutdown().await;
    }
}
