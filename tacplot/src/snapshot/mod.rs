//! Periodic snapshot production and staleness classification.
//!
//! Once per tick the [`SnapshotProducer`] takes a read-only pass over the
//! track store and turns it into an ordered, immutable frame of
//! [`TrackSnapshot`] values with staleness computed against the tick's
//! `now`. The frame is published into a [`SharedSnapshot`], which is the
//! only hand-off between the receive domain and any render-side consumer:
//! the consumer reads the latest published frame at its own pace and the
//! receive task never calls across the boundary.
//!
//! Staleness is a transient classification recomputed every tick from
//! `last_rx_time`; it is never written back to the store.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;

use crate::track::TrackStore;

/// Default staleness threshold: a track is stale once more than this long
/// has passed since its last applied update (strictly greater-than).
pub const DEFAULT_STALE_THRESHOLD: Duration = Duration::from_secs(2);

/// Default snapshot cadence (~30 Hz).
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(33);

/// Configuration for snapshot production.
#[derive(Debug, Clone)]
pub struct SnapshotConfig {
    /// Silence duration beyond which a track classifies as stale.
    pub stale_threshold: Duration,

    /// Cadence of the tick task driving snapshot production.
    pub tick_interval: Duration,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            stale_threshold: DEFAULT_STALE_THRESHOLD,
            tick_interval: DEFAULT_TICK_INTERVAL,
        }
    }
}

/// Immutable, point-in-time view of one track, produced fresh every tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackSnapshot {
    /// Reporting entity's unique id.
    pub entity_id: i64,
    /// Free-form category label.
    pub entity_type: String,
    /// World-space x coordinate.
    pub x: f64,
    /// World-space y coordinate.
    pub y: f64,
    /// Heading in degrees, `[0, 360)`.
    pub heading_deg: f64,
    /// Speed in demo units per second.
    pub speed: f64,
    /// Last reported status code.
    pub status: String,
    /// True once no update has been applied within the stale threshold.
    pub is_stale: bool,
}

/// Produces ordered snapshot frames from the track store.
pub struct SnapshotProducer {
    store: Arc<TrackStore>,
    stale_threshold: Duration,
}

impl SnapshotProducer {
    /// Create a producer reading from `store`.
    pub fn new(store: Arc<TrackStore>, stale_threshold: Duration) -> Self {
        Self {
            store,
            stale_threshold,
        }
    }

    /// Produce one frame: every track, staleness computed against `now`,
    /// sorted ascending by `entity_id`.
    ///
    /// Read-only with respect to the store; safe to run while the receive
    /// task keeps writing.
    pub fn tick(&self, now: Instant) -> Vec<TrackSnapshot> {
        let mut frame: Vec<TrackSnapshot> = self
            .store
            .snapshot_all()
            .into_iter()
            .map(|(_, track)| TrackSnapshot {
                entity_id: track.entity_id,
                entity_type: track.entity_type,
                x: track.x,
                y: track.y,
                heading_deg: track.heading_deg,
                speed: track.speed,
                status: track.status,
                is_stale: match track.last_rx_time {
                    Some(last_rx) => now.duration_since(last_rx) > self.stale_threshold,
                    None => true,
                },
            })
            .collect();

        frame.sort_by_key(|snapshot| snapshot.entity_id);
        frame
    }
}

/// Atomically published latest frame.
///
/// Written only by the tick task, read by any number of consumers. Clones
/// share the same slot. Readers get an `Arc` to the frame, so a slow
/// consumer never blocks publication for longer than the pointer swap.
#[derive(Clone)]
pub struct SharedSnapshot {
    inner: Arc<RwLock<Arc<Vec<TrackSnapshot>>>>,
}

impl Default for SharedSnapshot {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedSnapshot {
    /// Create an empty publication slot.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(Vec::new()))),
        }
    }

    /// Replace the published frame.
    pub fn publish(&self, frame: Vec<TrackSnapshot>) {
        *self.inner.write() = Arc::new(frame);
    }

    /// The most recently published frame (empty before the first tick).
    pub fn latest(&self) -> Arc<Vec<TrackSnapshot>> {
        Arc::clone(&self.inner.read())
    }
}
