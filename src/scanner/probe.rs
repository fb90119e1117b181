//! Connection prober.
//!
//! One bounded connect attempt per call, classified into open, closed or
//! filtered. No retries: a caller that wants them wraps this.

use crate::types::Port;
use std::io::ErrorKind;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::trace;

/// Outcome of a single connect attempt.
#[derive(Debug)]
pub enum ConnectionOutcome {
    /// Handshake completed. The stream stays open for banner grabbing.
    Open(TcpStream),
    /// Refused (RST) by the peer.
    Closed,
    /// Timed out or unreachable.
    Filtered,
}

impl ConnectionOutcome {
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open(_))
    }
}

/// Attempt a TCP connect to `(ip, port)` bounded by `limit`.
///
/// On any outcome other than [`ConnectionOutcome::Open`] the socket is already
/// released when this returns.
pub async fn probe(ip: IpAddr, port: Port, limit: Duration) -> ConnectionOutcome {
    let addr = SocketAddr::new(ip, port.as_u16());

    match timeout(limit, TcpStream::connect(addr)).await {
        Ok(Ok(stream)) => ConnectionOutcome::Open(stream),
        Ok(Err(e)) => {
            trace!(%addr, error = %e, "connect failed");
            classify_error(e.kind())
        }
        Err(_) => ConnectionOutcome::Filtered,
    }
}

fn classify_error(kind: ErrorKind) -> ConnectionOutcome {
    match kind {
        ErrorKind::ConnectionRefused | ErrorKind::ConnectionReset => ConnectionOutcome::Closed,
        _ => ConnectionOutcome::Filtered,
    }
}
