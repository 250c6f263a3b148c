//! Per-entity track state and the concurrent store that owns it.
//!
//! A *track* is the persisted state maintained for one entity across
//! received messages: latest telemetry fields, receive bookkeeping, and a
//! bounded breadcrumb trail. The [`TrackStore`] keys tracks by `entity_id`
//! and carries the two semantics everything else depends on:
//!
//! - **Merge, not replace**: each message overwrites only the fields it
//!   carries; absent fields retain their previous value.
//! - **Per-entity atomicity**: a merge is applied under the entry's shard
//!   lock, so concurrent readers never observe a half-applied message.
//!
//! Tracks are created lazily on first reference and evicted only by the
//! explicit TTL policy in [`TrackStore::prune`].

mod history;
mod state;
mod store;

pub use history::{PositionHistory, DEFAULT_MAX_POSITIONS};
pub use state::{TrackState, STATUS_NO_DATA};
pub use store::{TrackStore, TrackStoreConfig};
