//! Connection supervisor: accept, serve, re-accept.
//!
//! ```text
//!            bind
//!             │
//!             ▼
//!   ┌── AwaitingConnection ◄────────────┐
//!   │         │ accept                  │ client closed / I/O error
//!   │         ▼                         │
//!   │      Serving ─────────────────────┘
//!   │         │ 'Q'
//!   │         ▼
//!   │     Terminated
//!   │
//!   └─► Stopped   (shutdown flag cleared, from either state)
//! ```
//!
//! Exactly one debugger is served at a time.  Connections that arrive while
//! a session is active wait in the listen backlog until it ends.

use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use bitbang_core::DeviceAdapter;
use thiserror::Error;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::{sleep, timeout};
use tracing::{info, warn};

use crate::application::BridgeContext;
use crate::infrastructure::session::{serve_session, SessionEnd, POLL_INTERVAL};

/// Pause after a failed `accept` so a persistent error (e.g. `EMFILE`) does
/// not spin the loop.
pub const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(50);

/// Errors that prevent the supervisor from starting.
#[derive(Debug, Error)]
pub enum SupervisorError {
    /// The listening socket could not be created.
    #[error("failed to bind remote-bitbang listener on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
}

/// How [`Supervisor::run`] finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorExit {
    /// A client sent `'Q'`.
    Terminated,
    /// The shutdown flag was cleared.
    Stopped,
}

enum SupervisorState {
    AwaitingConnection,
    Serving(TcpStream, SocketAddr),
    Finished(SupervisorExit),
}

/// Owns the listener and the bridge context for the lifetime of the server.
pub struct Supervisor<D: DeviceAdapter> {
    listener: TcpListener,
    local_addr: SocketAddr,
    context: BridgeContext<D>,
    running: Arc<AtomicBool>,
    connections: u64,
}

impl<D: DeviceAdapter> Supervisor<D> {
    /// Binds the listener on `addr`.
    ///
    /// Port `0` picks an ephemeral port; see [`Supervisor::local_addr`].
    ///
    /// # Errors
    ///
    /// Returns [`SupervisorError::Bind`] if the address is in use or cannot
    /// be bound.
    pub async fn bind(
        addr: SocketAddr,
        context: BridgeContext<D>,
        running: Arc<AtomicBool>,
    ) -> Result<Self, SupervisorError> {
        let bind_err = |source| SupervisorError::Bind { addr, source };
        let listener = TcpListener::bind(addr).await.map_err(bind_err)?;
        let local_addr = listener.local_addr().map_err(bind_err)?;
        Ok(Self {
            listener,
            local_addr,
            context,
            running,
            connections: 0,
        })
    }

    /// The address actually bound.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn context(&self) -> &BridgeContext<D> {
        &self.context
    }

    /// Runs the accept/serve cycle until a client quits or the shutdown flag
    /// is cleared.
    ///
    /// Consumes the supervisor so the listener is closed on return; the
    /// context is handed back for finalization.
    pub async fn run(mut self) -> (SupervisorExit, BridgeContext<D>) {
        info!("waiting for debugger connection on {}", self.local_addr);

        let mut state = SupervisorState::AwaitingConnection;
        let exit = loop {
            state = match state {
                SupervisorState::AwaitingConnection => self.accept_next().await,
                SupervisorState::Serving(stream, peer) => self.serve(stream, peer).await,
                SupervisorState::Finished(exit) => break exit,
            };
        };

        info!(connections = self.connections, "listener closed");
        (exit, self.context)
    }

    async fn accept_next(&mut self) -> SupervisorState {
        if !self.running.load(Ordering::Relaxed) {
            return SupervisorState::Finished(SupervisorExit::Stopped);
        }

        // Short timeout so the shutdown flag is re-checked while idle.
        match timeout(POLL_INTERVAL, self.listener.accept()).await {
            Ok(Ok((stream, peer))) => {
                if let Err(e) = stream.set_nodelay(true) {
                    warn!("could not disable Nagle on {peer}: {e}");
                }
                self.connections += 1;
                if self.connections == 1 {
                    info!("debugger connected from {peer}");
                } else {
                    info!("debugger re-connected from {peer}");
                }
                SupervisorState::Serving(stream, peer)
            }
            Ok(Err(e)) => {
                warn!("accept error: {e}");
                sleep(ACCEPT_ERROR_BACKOFF).await;
                SupervisorState::AwaitingConnection
            }
            Err(_) => SupervisorState::AwaitingConnection,
        }
    }

    async fn serve(&mut self, mut stream: TcpStream, peer: SocketAddr) -> SupervisorState {
        let end = serve_session(&mut stream, &mut self.context, &self.running).await;
        drop(stream);

        match end {
            SessionEnd::Disconnected => {
                info!("connection from {peer} closed, waiting for new connection");
                SupervisorState::AwaitingConnection
            }
            SessionEnd::Failed(e) => {
                warn!("connection from {peer} failed: {e}");
                info!("waiting for new connection");
                SupervisorState::AwaitingConnection
            }
            SessionEnd::Terminated => {
                info!("quit received from {peer}, terminating");
                SupervisorState::Finished(SupervisorExit::Terminated)
            }
            SessionEnd::Stopped => {
                info!("shutdown requested, closing connection from {peer}");
                SupervisorState::Finished(SupervisorExit::Stopped)
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
