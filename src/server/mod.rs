//! The connection multiplexer.
//!
//! One task owns the listening socket and every client socket. Each turn of
//! the loop waits until the listener or some clients are readable, then
//! either accepts one client or reads one chunk from every readable client
//! in slot order. The listener always wins when both are ready.
//!
//! When the table is full, the oldest connection is dropped to make room for
//! the incoming one. A client that never sends anything keeps its slot until
//! it is pushed out this way.

pub mod listener;
pub mod table;

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::task::Poll;

use bytes::Bytes;
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, warn};

use crate::config::Config;
use crate::http::connection::{Connection, ReadEvent};
use crate::http::parser::{Mode, Verdict};
use crate::http::response::Response;
use crate::http::writer::serialize_response;
use crate::redirect::Redirector;

pub use table::{ConnectionTable, Full};

enum Event {
    Incoming(io::Result<(TcpStream, SocketAddr)>),
    Readable(Vec<usize>),
}

pub struct Server {
    listener: TcpListener,
    table: ConnectionTable<Connection>,
    redirector: Redirector,
    mode: Mode,
    buffer_size: usize,
    bad_request: Bytes,
}

impl Server {
    /// The parser mode follows the redirector: rules mean per-request
    /// routing, no rules mean the fixed destination.
    pub fn new(
        listener: TcpListener,
        redirector: Redirector,
        max_connections: usize,
        buffer_size: usize,
    ) -> Self {
        let mode = if redirector.is_routing() {
            Mode::Routing
        } else {
            Mode::Boundary
        };

        Self {
            listener,
            table: ConnectionTable::new(max_connections),
            redirector,
            mode,
            buffer_size,
            bad_request: serialize_response(&Response::bad_request()),
        }
    }

    pub fn with_config(listener: TcpListener, redirector: Redirector, cfg: &Config) -> Self {
        Self::new(listener, redirector, cfg.max_connections, cfg.buffer_size)
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Serves forever.
    pub async fn run(mut self) {
        let mut scratch = vec![0u8; self.buffer_size];

        loop {
            let event = tokio::select! {
                biased;
                accepted = self.listener.accept() => Event::Incoming(accepted),
                ready = readable_slots(&self.table) => Event::Readable(ready),
            };

            match event {
                Event::Incoming(accepted) => self.on_incoming(accepted),
                Event::Readable(slots) => self.on_readable(&slots, &mut scratch).await,
            }
        }
    }

    fn on_incoming(&mut self, accepted: io::Result<(TcpStream, SocketAddr)>) {
        if self.table.is_full() {
            if let Some(evicted) = self.table.evict_oldest() {
                warn!(
                    peer = %evicted.peer(),
                    capacity = self.table.capacity(),
                    "Connection table full, evicting oldest connection"
                );
            }
        }

        let (stream, peer) = match accepted {
            Ok(accepted) => accepted,
            Err(e) => {
                debug!(error = %e, "Accept failed");
                return;
            }
        };

        let conn = Connection::new(stream, peer, self.mode, self.buffer_size);
        match self.table.insert(conn) {
            Ok(slot) => debug!(%peer, slot, "Accepted connection"),
            Err((Full, conn)) => debug!(peer = %conn.peer(), "No free slot, dropping connection"),
        }
    }

    async fn on_readable(&mut self, slots: &[usize], scratch: &mut [u8]) {
        let mut finished = Vec::new();

        for &slot in slots {
            let Some(conn) = self.table.get_mut(slot) else {
                continue;
            };

            let response = match conn.read_chunk(scratch) {
                ReadEvent::Spurious | ReadEvent::Parsed(Verdict::NeedMoreData) => continue,
                ReadEvent::Closed => None,
                ReadEvent::Parsed(Verdict::Malformed(reason)) => {
                    debug!(peer = %conn.peer(), ?reason, "Malformed request");
                    Some(self.bad_request.clone())
                }
                ReadEvent::Parsed(Verdict::Complete(head)) => {
                    let destination = self.redirector.resolve(head.as_ref());
                    debug!(
                        peer = %conn.peer(),
                        destination = destination.location(),
                        "Redirecting"
                    );
                    Some(destination.response())
                }
            };

            if let Some(response) = response {
                if let Err(e) = conn.respond(response).await {
                    debug!(peer = %conn.peer(), error = %e, "Failed to send response");
                }
            }
            finished.push(slot);
        }

        // Highest slot first so compaction does not shift pending ones.
        for slot in finished.into_iter().rev() {
            if let Some(conn) = self.table.remove(slot) {
                debug!(peer = %conn.peer(), slot, "Connection closed");
            }
        }
    }
}

/// Resolves with every slot whose socket is readable, in slot order.
fn readable_slots(table: &ConnectionTable<Connection>) -> impl Future<Output = Vec<usize>> + '_ {
    std::future::poll_fn(move |cx| {
        let ready: Vec<usize> = table
            .iter()
            .enumerate()
            .filter(|(_, conn)| conn.poll_read_ready(cx).is_ready())
            .map(|(slot, _)| slot)
            .collect();

        if ready.is_empty() {
            Poll::Pending
        } else {
            Poll::Ready(ready)
        }
    })
}
