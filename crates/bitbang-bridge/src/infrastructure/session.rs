//! The serve loop for one connected debugger.
//!
//! Reads exactly one byte at a time, decodes it, executes it against the
//! [`BridgeContext`] and writes the reply (if any) before reading the next
//! byte.  There is no buffering of commands beyond what the socket does:
//! a `'R'` is always answered with the `TDO` level produced by every byte
//! that preceded it.
//!
//! The loop is generic over the stream so it can be tested against
//! `tokio_test::io::Mock` without opening a socket.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use bitbang_core::{decode_command, DeviceAdapter};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;
use tracing::debug;

use crate::application::{BridgeContext, Step};

/// How often an idle session re-checks the shutdown flag.
pub const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Result of one blocking single-byte read.
#[derive(Debug)]
pub enum ReadOutcome {
    Byte(u8),
    /// The peer closed its side (zero-length read).
    Disconnected,
    Error(io::Error),
}

/// Why a session ended.
#[derive(Debug)]
pub enum SessionEnd {
    /// The client closed the connection.
    Disconnected,
    /// A read or write on the connection failed.
    Failed(io::Error),
    /// The client sent `'Q'`.
    Terminated,
    /// The process-wide shutdown flag was cleared.
    Stopped,
}

impl SessionEnd {
    /// `true` when the bridge should go back to accepting connections.
    pub fn allows_reconnect(&self) -> bool {
        matches!(self, SessionEnd::Disconnected | SessionEnd::Failed(_))
    }
}

/// Reads exactly one byte from `stream`.
///
/// Cancel safe: if the future is dropped before completion no byte has been
/// consumed.
pub async fn read_command_byte<S>(stream: &mut S) -> ReadOutcome
where
    S: AsyncRead + Unpin,
{
    let mut buf = [0u8; 1];
    loop {
        match stream.read(&mut buf).await {
            Ok(0) => return ReadOutcome::Disconnected,
            Ok(_) => return ReadOutcome::Byte(buf[0]),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return ReadOutcome::Error(e),
        }
    }
}

async fn write_reply<S>(stream: &mut S, byte: u8) -> io::Result<()>
where
    S: AsyncWrite + Unpin,
{
    stream.write_all(&[byte]).await?;
    stream.flush().await
}

/// Serves one connection until the client leaves, the I/O fails, a `'Q'`
/// arrives or `running` is cleared.
///
/// The context is borrowed, never consumed: whatever the outcome, device
/// state survives for the next session.
pub async fn serve_session<S, D>(
    stream: &mut S,
    context: &mut BridgeContext<D>,
    running: &AtomicBool,
) -> SessionEnd
where
    S: AsyncRead + AsyncWrite + Unpin,
    D: DeviceAdapter,
{
    let mut commands: u64 = 0;

    let end = loop {
        if !running.load(Ordering::Relaxed) {
            break SessionEnd::Stopped;
        }

        // The timeout only exists so the shutdown flag is noticed on an idle
        // connection; the debugger itself may pause for as long as it likes.
        let byte = match timeout(POLL_INTERVAL, read_command_byte(stream)).await {
            Err(_) => continue,
            Ok(ReadOutcome::Byte(byte)) => byte,
            Ok(ReadOutcome::Disconnected) => break SessionEnd::Disconnected,
            Ok(ReadOutcome::Error(e)) => break SessionEnd::Failed(e),
        };
        commands += 1;

        match context.execute(decode_command(byte)) {
            Step::Continue => {}
            Step::Reply(reply) => {
                if let Err(e) = write_reply(stream, reply).await {
                    break SessionEnd::Failed(e);
                }
            }
            Step::Terminate => break SessionEnd::Terminated,
        }
    };

    debug!(commands, ?end, "session finished");
    end
}

// ── Tests ─────────────────────────────────────────────────────────────────────
