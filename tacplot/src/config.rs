//! Pipeline configuration.
//!
//! This module defines [`PipelineConfig`], which combines everything needed
//! to start a [`TelemetryPipeline`](crate::pipeline::TelemetryPipeline):
//! receiver, store, snapshot, and eviction settings. Component configs live
//! with their components; this is the unified surface that keeps them
//! consistent.

use std::net::SocketAddr;
use std::time::Duration;

use crate::receiver::ReceiverConfig;
use crate::snapshot::SnapshotConfig;
use crate::track::TrackStoreConfig;

/// Default time-to-live for idle tracks before eviction (in seconds).
///
/// The source data model this pipeline descends from never removed tracks,
/// which grows the store without bound under churn of transient entities.
/// 60 seconds keeps a track visible long past its stale flag (2 s) while
/// still reclaiming entities that have genuinely gone away.
pub const DEFAULT_TRACK_TTL_SECS: u64 = 60;

/// Default interval between eviction passes (in seconds).
pub const DEFAULT_PRUNE_INTERVAL_SECS: u64 = 5;

/// Eviction policy for idle tracks.
#[derive(Debug, Clone)]
pub struct EvictionConfig {
    /// Silence duration after which a track is evicted; `None` disables
    /// eviction entirely (tracks then persist for the process lifetime).
    pub ttl: Option<Duration>,

    /// Cadence of eviction passes.
    pub prune_interval: Duration,
}

impl Default for EvictionConfig {
    fn default() -> Self {
        Self {
            ttl: Some(Duration::from_secs(DEFAULT_TRACK_TTL_SECS)),
            prune_interval: Duration::from_secs(DEFAULT_PRUNE_INTERVAL_SECS),
        }
    }
}

/// Top-level configuration for the telemetry pipeline.
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    /// Receiver configuration (bind address, stop timeout).
    pub receiver: ReceiverConfig,

    /// Track store configuration (history depth).
    pub store: TrackStoreConfig,

    /// Snapshot configuration (stale threshold, tick cadence).
    pub snapshot: SnapshotConfig,

    /// Eviction policy for idle tracks.
    pub eviction: EvictionConfig,
}

impl PipelineConfig {
    /// Set the UDP bind address.
    pub fn with_bind_addr(mut self, bind_addr: SocketAddr) -> Self {
        self.receiver.bind_addr = bind_addr;
        self
    }

    /// Set the staleness threshold.
    pub fn with_stale_threshold(mut self, threshold: Duration) -> Self {
        self.snapshot.stale_threshold = threshold;
        self
    }

    /// Set the snapshot tick interval.
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.snapshot.tick_interval = interval;
        self
    }

    /// Set the per-track history depth.
    pub fn with_history_max(mut self, history_max: usize) -> Self {
        self.store.history_max = history_max;
        self
    }

    /// Set (or disable) the idle-track TTL.
    pub fn with_eviction_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.eviction.ttl = ttl;
        self
    }

    /// Set the eviction pass cadence.
    pub fn with_prune_interval(mut self, interval: Duration) -> Self {
        self.eviction.prune_interval = interval;
        self
    }
}
