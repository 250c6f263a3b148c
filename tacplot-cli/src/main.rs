//! Tacplot CLI - console front-end for the telemetry pipeline.
//!
//! Starts the pipeline and stands in at the renderer boundary: once per
//! second it reads the latest published snapshot frame and prints a
//! compact track table. A graphical display would consume the same frames
//! the same way.

use std::net::SocketAddr;
use std::process;
use std::time::Duration;

use clap::Parser;
use tracing::error;

use tacplot::coord::heading_vector;
use tacplot::{PipelineConfig, TelemetryPipeline, TrackSnapshot};

/// Console display cadence. Snapshot production keeps its own (faster)
/// cadence inside the pipeline; this only paces the printout.
const DISPLAY_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Parser)]
#[command(name = "tacplot")]
#[command(about = "Live tactical track display fed by UDP entity telemetry", long_about = None)]
struct Args {
    /// UDP address to listen on for EntityState datagrams
    #[arg(long, default_value = "127.0.0.1:30001")]
    listen: SocketAddr,

    /// Seconds without an update before a track is flagged stale
    #[arg(long, default_value_t = 2.0)]
    stale_after: f64,

    /// Positions retained per track for the breadcrumb trail
    #[arg(long, default_value_t = 25)]
    history: usize,

    /// Snapshot ticks per second
    #[arg(long, default_value_t = 30)]
    tick_hz: u32,

    /// Seconds before an idle track is evicted (0 disables eviction)
    #[arg(long, default_value_t = 60)]
    evict_after: u64,

    /// Default log filter (tracing env-filter syntax; RUST_LOG overrides)
    #[arg(long, default_value = "info")]
    log: String,
}

impl Args {
    fn pipeline_config(&self) -> PipelineConfig {
        let ttl = match self.evict_after {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };
        PipelineConfig::default()
            .with_bind_addr(self.listen)
            .with_stale_threshold(Duration::from_secs_f64(self.stale_after))
            .with_tick_interval(Duration::from_secs(1) / self.tick_hz.max(1))
            .with_history_max(self.history)
            .with_eviction_ttl(ttl)
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    tacplot::log::init(&args.log);

    let pipeline = match TelemetryPipeline::start(args.pipeline_config()).await {
        Ok(pipeline) => pipeline,
        Err(err) => {
            error!(%err, "failed to start pipeline");
            process::exit(1);
        }
    };

    println!("tacplot listening on {} (ctrl-c to stop)", pipeline.local_addr());

    let mut display = tokio::time::interval(DISPLAY_INTERVAL);
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = display.tick() => print_frame(&pipeline.latest()),
        }
    }

    println!();
    pipeline.shutdown().await;
}

/// Print one snapshot frame as a compact track table.
fn print_frame(frame: &[TrackSnapshot]) {
    if frame.is_empty() {
        println!("-- no tracks --");
        return;
    }

    println!(
        "{:>8}  {:<10} {:>9} {:>9} {:>5} {:>6}  {:<10} {}",
        "ID", "TYPE", "X", "Y", "CRS", "SPD", "STATUS", "STATE"
    );
    for track in frame {
        let state = if track.is_stale { "STALE" } else { "LIVE" };
        println!(
            "{:>8}  {:<10} {:>9.1} {:>9.1} {:>4}\u{b0} {:>6.1}  {:<10} {}",
            track.entity_id,
            track.entity_type,
            track.x,
            track.y,
            track.heading_deg as i64,
            track.speed,
            track.status,
            state
        );
    }

    // Direction glyph for the first live track.
    if let Some(track) = frame.iter().find(|t| !t.is_stale) {
        let (vx, vy) = heading_vector(track.heading_deg, 1.0);
        let glyph = direction_glyph(vx, vy);
        println!("lead contact {} heading {}", track.entity_id, glyph);
    }
    println!();
}

/// Eight-way arrow for a unit direction vector (y-down convention).
fn direction_glyph(vx: f64, vy: f64) -> char {
    match (vx.round() as i8, vy.round() as i8) {
        (0, -1) => '\u{2191}',  // up
        (1, -1) => '\u{2197}',
        (1, 0) => '\u{2192}',   // right
        (1, 1) => '\u{2198}',
        (0, 1) => '\u{2193}',   // down
        (-1, 1) => '\u{2199}',
        (-1, 0) => '\u{2190}',  // left
        (-1, -1) => '\u{2196}',
        _ => '\u{00b7}',
    }
}
