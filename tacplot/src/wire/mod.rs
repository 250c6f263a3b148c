//! Wire protocol for entity telemetry.
//!
//! One UTF-8 encoded JSON object per UDP datagram. The only message type is
//! `EntityState`, which reports one entity's current telemetry. All fields
//! other than `msg_type` and `entity_id` are optional; absent fields mean
//! "no change" and are merged field-by-field by the track store.
//!
//! Decoding is deliberately strict about the envelope (`msg_type` must be
//! exactly `"EntityState"`, `entity_id` must be an integer) and tolerant of
//! everything else: unknown fields are ignored and a malformed
//! `timestamp_utc` is simply dropped. Senders cannot crash the receiver; a
//! bad datagram costs one [`WireError`] and nothing more.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

/// The only accepted value for the `msg_type` field.
pub const ENTITY_STATE_MSG_TYPE: &str = "EntityState";

/// Errors produced while decoding a single datagram.
///
/// Every variant is recoverable: the datagram is dropped and the receive
/// loop continues. None of these are ever surfaced to the end user.
#[derive(Debug, Error)]
pub enum WireError {
    /// Datagram bytes are not valid UTF-8.
    #[error("datagram is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// Datagram text is not valid JSON (or fields have the wrong shape).
    #[error("datagram is not a valid message: {0}")]
    Json(#[from] serde_json::Error),

    /// The `msg_type` field is absent or not a string.
    #[error("message has no msg_type field")]
    MissingMsgType,

    /// The `msg_type` field holds an unsupported value.
    #[error("unsupported msg_type {0:?}")]
    UnexpectedMsgType(String),

    /// The `entity_id` field is absent or not an integer.
    #[error("message has no integral entity_id field")]
    MissingEntityId,
}

/// A decoded `EntityState` message.
///
/// Mirrors the wire schema: required envelope plus optional telemetry
/// fields. `Option` encodes field presence for the merge in
/// [`crate::track::TrackState::apply`].
#[derive(Debug, Clone, Deserialize)]
pub struct EntityState {
    /// Message discriminator; always [`ENTITY_STATE_MSG_TYPE`] after decode.
    pub msg_type: String,

    /// Reporting entity's unique id (store key).
    pub entity_id: i64,

    /// Free-form category label (e.g. "CONTACT").
    #[serde(default)]
    pub entity_type: Option<String>,

    /// World-space x coordinate.
    #[serde(default)]
    pub x: Option<f64>,

    /// World-space y coordinate.
    #[serde(default)]
    pub y: Option<f64>,

    /// Heading in degrees; normalized to `[0, 360)` on ingestion.
    #[serde(default)]
    pub heading_deg: Option<f64>,

    /// Speed in demo units per second.
    #[serde(default)]
    pub speed: Option<f64>,

    /// Status code (e.g. "OK").
    #[serde(default)]
    pub status: Option<String>,

    /// Sender sequence number, shared across all entities.
    #[serde(default)]
    pub seq: Option<i64>,

    /// Informational ISO-8601 send timestamp.
    #[serde(default)]
    pub timestamp_utc: Option<String>,
}

impl EntityState {
    /// Parse the informational `timestamp_utc` field, if present and
    /// well-formed. A malformed timestamp is ignored, not an error.
    pub fn reported_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.timestamp_utc.as_deref()?;
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|ts| ts.with_timezone(&Utc))
    }
}

/// Decode one datagram into an [`EntityState`].
///
/// Validation order matches the receive loop's taxonomy: UTF-8, then JSON,
/// then envelope (`msg_type` present and equal to `"EntityState"`,
/// `entity_id` present and integral), then field extraction. Any failure
/// means the datagram is discarded by the caller.
pub fn decode(datagram: &[u8]) -> Result<EntityState, WireError> {
    let text = std::str::from_utf8(datagram)?;
    let value: serde_json::Value = serde_json::from_str(text)?;

    let msg_type = value
        .get("msg_type")
        .and_then(serde_json::Value::as_str)
        .ok_or(WireError::MissingMsgType)?;
    if msg_type != ENTITY_STATE_MSG_TYPE {
        return Err(WireError::UnexpectedMsgType(msg_type.to_owned()));
    }

    // as_i64 rejects floats like 5.0; the key must be a true integer.
    if value.get("entity_id").and_then(serde_json::Value::as_i64).is_none() {
        return Err(WireError::MissingEntityId);
    }

    Ok(serde_json::from_value(value)?)
}
