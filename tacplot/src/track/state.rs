//! Per-entity track state and merge semantics.

use std::time::Instant;

use chrono::{DateTime, Utc};

use crate::coord::wrap360;
use crate::track::PositionHistory;
use crate::wire::EntityState;

/// Status code reported until the first update carrying one arrives.
pub const STATUS_NO_DATA: &str = "NO_DATA";

/// The persisted state maintained for one entity across received messages.
///
/// Owned exclusively by the [`TrackStore`](crate::track::TrackStore); all
/// mutation goes through [`TrackState::apply`] under the store's per-entry
/// lock, so a reader never observes fields from two different messages.
#[derive(Debug, Clone)]
pub struct TrackState {
    /// Unique key; immutable once created.
    pub entity_id: i64,

    /// Free-form category label.
    pub entity_type: String,

    /// World-space x coordinate.
    pub x: f64,

    /// World-space y coordinate.
    pub y: f64,

    /// Heading in degrees, always in `[0, 360)`.
    pub heading_deg: f64,

    /// Speed in demo units per second.
    pub speed: f64,

    /// Last reported status code; [`STATUS_NO_DATA`] until set.
    pub status: String,

    /// Last-seen sender sequence number. The counter namespace is shared
    /// across all entities, so it is never used for per-entity ordering
    /// or rejection.
    pub seq: i64,

    /// When the last update was applied; `None` for a track that has never
    /// received one (such a track always classifies as stale).
    pub last_rx_time: Option<Instant>,

    /// Informational sender-side timestamp from the last update that
    /// carried a parseable one.
    pub reported_at: Option<DateTime<Utc>>,

    /// Bounded breadcrumb trail of past positions.
    pub history: PositionHistory,
}

impl TrackState {
    /// Create a track with default state, before any update applies.
    pub fn new(entity_id: i64, history_max: usize) -> Self {
        Self {
            entity_id,
            entity_type: String::new(),
            x: 0.0,
            y: 0.0,
            heading_deg: 0.0,
            speed: 0.0,
            status: STATUS_NO_DATA.to_owned(),
            seq: 0,
            last_rx_time: None,
            reported_at: None,
            history: PositionHistory::with_max(history_max),
        }
    }

    /// Merge one message into this track.
    ///
    /// Each field is overwritten only if present in the message; absent
    /// fields keep their previous value. Heading is normalized to
    /// `[0, 360)` on the way in. The (possibly unchanged) position is
    /// appended to the history and `last_rx_time` advances to `now`.
    pub fn apply(&mut self, msg: &EntityState, now: Instant) {
        if let Some(entity_type) = &msg.entity_type {
            self.entity_type = entity_type.clone();
        }
        if let Some(x) = msg.x {
            self.x = x;
        }
        if let Some(y) = msg.y {
            self.y = y;
        }
        if let Some(heading) = msg.heading_deg {
            self.heading_deg = wrap360(heading);
        }
        if let Some(speed) = msg.speed {
            self.speed = speed;
        }
        if let Some(status) = &msg.status {
            self.status = status.clone();
        }
        if let Some(seq) = msg.seq {
            self.seq = seq;
        }
        if let Some(reported_at) = msg.reported_at() {
            self.reported_at = Some(reported_at);
        }

        self.history.push(self.x, self.y);
        self.last_rx_time = Some(now);
    }

    /// Current world position.
    pub fn position(&self) -> (f64, f64) {
        (self.x, self.y)
    }
}
