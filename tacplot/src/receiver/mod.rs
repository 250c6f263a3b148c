//! UDP telemetry receiver.
//!
//! The [`TelemetryReceiver`] owns the datagram socket and runs the
//! decode-and-dispatch loop as a long-lived background task:
//!
//! ```text
//! datagram ──► UTF-8 ──► JSON ──► envelope check ──► TrackStore merge
//!                 │         │           │
//!                 └─────────┴───────────┴──► dropped silently, loop continues
//! ```
//!
//! The loop is built to survive adversarial input indefinitely. The only
//! fatal failure is the initial socket bind; after that, malformed
//! datagrams and transient receive errors are swallowed and the next
//! iteration is the de facto retry. Shutdown is cooperative: cancellation
//! is observed once per iteration via the biased select arm, interrupting
//! a pending receive promptly, and [`TelemetryReceiver::stop`] waits a
//! bounded timeout before aborting the task and releasing the socket.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::net::UdpSocket;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::track::TrackStore;
use crate::wire;

/// Largest datagram we will receive. UDP cannot carry more.
pub const MAX_DATAGRAM_SIZE: usize = 65535;

/// Default UDP port for entity telemetry.
pub const DEFAULT_TELEMETRY_PORT: u16 = 30001;

/// Default bound on how long [`TelemetryReceiver::stop`] waits for the
/// loop to exit before aborting it.
pub const DEFAULT_STOP_TIMEOUT: Duration = Duration::from_millis(250);

/// Configuration for the telemetry receiver.
#[derive(Debug, Clone)]
pub struct ReceiverConfig {
    /// Address the UDP socket binds to.
    pub bind_addr: SocketAddr,

    /// Bound on graceful shutdown before the task is aborted.
    pub stop_timeout: Duration,
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], DEFAULT_TELEMETRY_PORT)),
            stop_timeout: DEFAULT_STOP_TIMEOUT,
        }
    }
}

/// Errors that can occur starting the receiver.
#[derive(Debug, Error)]
pub enum ReceiverError {
    /// The socket could not be bound. Fatal; surfaced synchronously from
    /// [`TelemetryReceiver::start`].
    #[error("failed to bind telemetry socket on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
}

/// Handle to the running receive loop.
#[derive(Debug)]
pub struct TelemetryReceiver {
    cancellation: CancellationToken,
    handle: JoinHandle<()>,
    local_addr: SocketAddr,
    stop_timeout: Duration,
}

impl TelemetryReceiver {
    /// Bind the socket and launch the receive loop.
    ///
    /// Bind failure is the pipeline's one fatal transport error and is
    /// returned synchronously; once this returns `Ok`, the loop runs until
    /// [`stop`](Self::stop).
    pub async fn start(
        config: ReceiverConfig,
        store: Arc<TrackStore>,
    ) -> Result<Self, ReceiverError> {
        let socket = UdpSocket::bind(config.bind_addr)
            .await
            .map_err(|source| ReceiverError::Bind {
                addr: config.bind_addr,
                source,
            })?;
        let local_addr = socket.local_addr().map_err(|source| ReceiverError::Bind {
            addr: config.bind_addr,
            source,
        })?;

        let cancellation = CancellationToken::new();
        let handle = tokio::spawn(run_loop(socket, store, cancellation.clone()));

        info!(%local_addr, "telemetry receiver started");
        Ok(Self {
            cancellation,
            handle,
            local_addr,
            stop_timeout: config.stop_timeout,
        })
    }

    /// Address the socket actually bound to (useful with port 0).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Request cooperative cancellation and wait up to the configured
    /// timeout; if the loop has not exited by then, abort the task, which
    /// drops and releases the socket.
    pub async fn stop(mut self) {
        self.cancellation.cancel();

        if tokio::time::timeout(self.stop_timeout, &mut self.handle)
            .await
            .is_err()
        {
            warn!(
                timeout_ms = self.stop_timeout.as_millis() as u64,
                "receive loop did not exit in time; aborting"
            );
            self.handle.abort();
        }

        info!("telemetry receiver stopped");
    }
}

/// The receive loop: one datagram per iteration, cancellation checked
/// between iterations.
async fn run_loop(socket: UdpSocket, store: Arc<TrackStore>, cancellation: CancellationToken) {
    let mut buf = vec![0u8; MAX_DATAGRAM_SIZE];

    loop {
        tokio::select! {
            biased;

            _ = cancellation.cancelled() => {
                info!("telemetry receive loop shutting down");
                break;
            }

            received = socket.recv_from(&mut buf) => match received {
                Ok((len, peer)) => match wire::decode(&buf[..len]) {
                    Ok(msg) => {
                        trace!(entity_id = msg.entity_id, bytes = len, "applying entity state");
                        store.apply_update(&msg);
                    }
                    Err(err) => {
                        // Silent by design: one bad datagram is never
                        // surfaced past this trace event.
                        trace!(%err, %peer, bytes = len, "dropping malformed datagram");
                    }
                },
                Err(err) => {
                    debug!(%err, "transient receive error; continuing");
                }
            },
        }
    }
}
