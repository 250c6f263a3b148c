//! Tacplot - live tactical track display fed by UDP entity telemetry
//!
//! This library ingests `EntityState` datagrams over UDP and maintains a
//! live, queryable view of every reporting entity, flagging tracks whose
//! updates have stopped arriving.
//!
//! # Architecture
//!
//! ```text
//! UDP datagrams ──► receiver ──► track store ◄── snapshot tick ──► SharedSnapshot ──► renderer
//!                  (writer)    (concurrent)      (reader)          (published frame)
//! ```
//!
//! Two independently-paced domains share the store: the receive task
//! merge-applies updates per entity, the tick task reads everything at a
//! fixed cadence and publishes ordered, staleness-annotated frames for a
//! render-side consumer. See [`pipeline::TelemetryPipeline`] for the wiring.

pub mod config;
pub mod coord;
pub mod log;
pub mod pipeline;
pub mod receiver;
pub mod snapshot;
pub mod track;
pub mod wire;

pub use config::PipelineConfig;
pub use pipeline::{PipelineError, TelemetryPipeline};
pub use snapshot::TrackSnapshot;
