//! Concurrent per-entity track store.
//!
//! The store is the single shared resource between the receive domain
//! (sole writer) and the tick domain (sole reader). It is keyed by
//! `entity_id` over a sharded concurrent map, so updates to unrelated
//! entities never contend on a global lock, while each individual merge
//! runs under its entry's shard lock and is therefore atomic with respect
//! to readers: `get`/`snapshot_all` always observe a fully-applied update.

use std::time::{Duration, Instant};

use dashmap::DashMap;

use crate::track::history::DEFAULT_MAX_POSITIONS;
use crate::track::TrackState;
use crate::wire::EntityState;

/// Configuration for the track store.
#[derive(Debug, Clone)]
pub struct TrackStoreConfig {
    /// Maximum positions retained per track's breadcrumb trail.
    pub history_max: usize,
}

impl Default for TrackStoreConfig {
    fn default() -> Self {
        Self {
            history_max: DEFAULT_MAX_POSITIONS,
        }
    }
}

/// Concurrent keyed store of per-entity [`TrackState`].
///
/// Tracks are created lazily on the first message referencing an unseen
/// `entity_id` and persist until [`TrackStore::prune`] evicts them.
#[derive(Debug)]
pub struct TrackStore {
    tracks: DashMap<i64, TrackState>,
    history_max: usize,
}

impl Default for TrackStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TrackStore {
    /// Create a store with default configuration.
    pub fn new() -> Self {
        Self::with_config(TrackStoreConfig::default())
    }

    /// Create a store with custom configuration.
    pub fn with_config(config: TrackStoreConfig) -> Self {
        Self {
            tracks: DashMap::new(),
            history_max: config.history_max,
        }
    }

    /// Fetch a copy of the track for `entity_id`, creating it with default
    /// state if absent.
    pub fn get_or_create(&self, entity_id: i64) -> TrackState {
        self.tracks
            .entry(entity_id)
            .or_insert_with(|| TrackState::new(entity_id, self.history_max))
            .value()
            .clone()
    }

    /// Fetch a copy of the track for `entity_id`, if it exists.
    pub fn get(&self, entity_id: i64) -> Option<TrackState> {
        self.tracks.get(&entity_id).map(|track| track.value().clone())
    }

    /// Merge one decoded message into its entity's track.
    pub fn apply_update(&self, msg: &EntityState) {
        self.apply_update_at(msg, Instant::now());
    }

    /// Merge one decoded message with an explicit receive time.
    ///
    /// The entry guard holds the shard lock for the whole merge, which is
    /// what makes the field-level update atomic for concurrent readers.
    pub fn apply_update_at(&self, msg: &EntityState, now: Instant) {
        let mut entry = self
            .tracks
            .entry(msg.entity_id)
            .or_insert_with(|| TrackState::new(msg.entity_id, self.history_max));
        entry.apply(msg, now);
    }

    /// Copy out every track for a read-only pass.
    ///
    /// Safe to call while the writer keeps applying updates; each entity is
    /// read coherently. No ordering is guaranteed here — consumers that
    /// need deterministic order sort the result (see
    /// [`SnapshotProducer`](crate::snapshot::SnapshotProducer)).
    pub fn snapshot_all(&self) -> Vec<(i64, TrackState)> {
        self.tracks
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect()
    }

    /// Number of tracks currently stored.
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// True if no tracks are stored.
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Evict tracks that have not received an update within `ttl`.
    ///
    /// Tracks that never received an update are evicted unconditionally.
    /// Returns the number of evicted tracks.
    pub fn prune(&self, now: Instant, ttl: Duration) -> usize {
        let before = self.tracks.len();
        self.tracks.retain(|_, track| match track.last_rx_time {
            Some(last_rx) => now.duration_since(last_rx) <= ttl,
            None => false,
        });
        before - self.tracks.len()
    }
}
