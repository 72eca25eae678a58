//! UDP query exchange with the lookup backend.
//!
//! Wire contract: one datagram carrying the raw term goes out. The backend
//! answers with any number of payload datagrams followed by a single
//! zero-length datagram meaning "done". There is no length header, no
//! acknowledgement and no retransmission.
//!
//! ```text
//!   AwaitingFirstDatagram ──payload──▶ Accumulating ──payload──┐
//!          │      │                        │  ▲                 │
//!          │      └──────empty─────┐       │  └─────────────────┘
//!          │                       ▼       │
//!          │                      Done ◀───┘ empty
//!          └── wait lapses ──▶ TimedOut ◀── wait lapses
//! ```
//!
//! The wait deadline starts when the query is sent and moves forward only
//! when a datagram from the backend arrives. Datagrams from any other
//! source are dropped without extending it.

use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use tokio::net::{UdpSocket, lookup_host};
use tokio::time::{Instant, timeout_at};

/// Largest payload a single UDP datagram can carry.
const DATAGRAM_SIZE: usize = 65_536;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReassemblyState {
    AwaitingFirstDatagram,
    Accumulating,
    Done,
    TimedOut,
    Failed,
}

impl ReassemblyState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ReassemblyState::Done | ReassemblyState::TimedOut | ReassemblyState::Failed
        )
    }
}

/// Accumulates backend datagrams into one reply, capped at `limit` bytes.
#[derive(Debug)]
pub struct Reassembly {
    state: ReassemblyState,
    buffer: BytesMut,
    limit: usize,
    truncated: bool,
    error: Option<io::Error>,
}

impl Reassembly {
    pub fn new(limit: usize) -> Self {
        Self {
            state: ReassemblyState::AwaitingFirstDatagram,
            buffer: BytesMut::new(),
            limit,
            truncated: false,
            error: None,
        }
    }

    pub fn state(&self) -> ReassemblyState {
        self.state
    }

    /// True once payload beyond the limit has been discarded.
    pub fn truncated(&self) -> bool {
        self.truncated
    }

    /// Feeds one received datagram. Ignored once a terminal state is reached.
    pub fn on_datagram(&mut self, data: &[u8]) {
        if self.state.is_terminal() {
            return;
        }

        if data.is_empty() {
            self.state = ReassemblyState::Done;
            return;
        }

        let room = self.limit.saturating_sub(self.buffer.len());
        if data.len() > room {
            if !self.truncated {
                tracing::warn!(limit = self.limit, "backend reply exceeds limit, truncating");
            }
            self.truncated = true;
        }
        self.buffer.extend_from_slice(&data[..data.len().min(room)]);
        self.state = ReassemblyState::Accumulating;
    }

    pub fn on_timeout(&mut self) {
        if !self.state.is_terminal() {
            self.state = ReassemblyState::TimedOut;
        }
    }

    pub fn on_error(&mut self, error: io::Error) {
        if !self.state.is_terminal() {
            self.state = ReassemblyState::Failed;
            self.error = Some(error);
        }
    }

    /// Maps the final state onto a lookup result. A reassembly that never
    /// reached a terminal state counts as timed out.
    pub fn into_outcome(self) -> QueryOutcome {
        match self.state {
            ReassemblyState::Done => QueryOutcome::Reply(self.buffer.freeze()),
            ReassemblyState::Failed => QueryOutcome::Failed(
                self.error
                    .unwrap_or_else(|| io::Error::other("backend exchange failed")),
            ),
            _ => QueryOutcome::TimedOut,
        }
    }
}

/// How a lookup ended.
#[derive(Debug)]
pub enum QueryOutcome {
    /// The backend signalled completion; holds the assembled payload
    Reply(Bytes),
    /// A wait for the next datagram lapsed
    TimedOut,
    /// A socket operation failed; the client connection should be dropped
    Failed(io::Error),
}

/// Sends lookups to the backend, one fresh socket per query.
#[derive(Debug, Clone)]
pub struct QueryProxy {
    backend_addr: String,
    wait: Duration,
    max_reply_bytes: usize,
}

impl QueryProxy {
    pub fn new(backend_addr: impl Into<String>, wait: Duration, max_reply_bytes: usize) -> Self {
        Self {
            backend_addr: backend_addr.into(),
            wait,
            max_reply_bytes,
        }
    }

    pub fn backend_addr(&self) -> &str {
        &self.backend_addr
    }

    /// Runs one lookup for `term`. The socket is dropped on every return path.
    pub async fn query(&self, term: &[u8]) -> QueryOutcome {
        let (socket, backend) = match self.open().await {
            Ok(pair) => pair,
            Err(e) => return QueryOutcome::Failed(e),
        };

        if let Err(e) = socket.send_to(term, backend).await {
            return QueryOutcome::Failed(e);
        }

        tracing::debug!(backend = %backend, term = %String::from_utf8_lossy(term), "query sent");
        self.collect(&socket, backend).await
    }

    async fn open(&self) -> io::Result<(UdpSocket, SocketAddr)> {
        let backend = lookup_host(&self.backend_addr).await?.next().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::AddrNotAvailable,
                format!("backend address {} did not resolve", self.backend_addr),
            )
        })?;

        let local = if backend.is_ipv4() { "0.0.0.0:0" } else { "[::]:0" };
        let socket = UdpSocket::bind(local).await?;
        Ok((socket, backend))
    }

    async fn collect(&self, socket: &UdpSocket, backend: SocketAddr) -> QueryOutcome {
        let mut reassembly = Reassembly::new(self.max_reply_bytes);
        let mut datagram = vec![0u8; DATAGRAM_SIZE];
        let mut deadline = Instant::now() + self.wait;

        while !reassembly.state().is_terminal() {
            match timeout_at(deadline, socket.recv_from(&mut datagram)).await {
                Err(_elapsed) => reassembly.on_timeout(),
                Ok(Err(e)) => reassembly.on_error(e),
                Ok(Ok((_, from))) if from != backend => {
                    tracing::debug!(%from, "ignoring datagram from unexpected peer");
                }
                Ok(Ok((n, _))) => {
                    reassembly.on_datagram(&datagram[..n]);
                    deadline = Instant::now() + self.wait;
                }
            }
        }

        reassembly.into_outcome()
    }
}
