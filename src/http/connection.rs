use std::io;
use std::net::SocketAddr;
use std::task::{Context, Poll};

use bytes::Bytes;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

use crate::http::parser::{Mode, RequestParser, Verdict};
use crate::http::writer::ResponseWriter;

/// What a single read on a ready socket produced.
#[derive(Debug)]
pub enum ReadEvent {
    /// Readiness was stale; nothing to do until the next wakeup.
    Spurious,
    /// Peer hung up or the read failed.
    Closed,
    Parsed(Verdict),
}

/// One accepted client and its parser state.
///
/// The connection never reads on its own; the event loop calls
/// [`Connection::read_chunk`] when the socket is reported readable.
#[derive(Debug)]
pub struct Connection {
    stream: TcpStream,
    peer: SocketAddr,
    parser: RequestParser,
}

impl Connection {
    pub fn new(stream: TcpStream, peer: SocketAddr, mode: Mode, buffer_size: usize) -> Self {
        Self {
            stream,
            peer,
            parser: RequestParser::new(mode, buffer_size),
        }
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// Ready when the socket has data, has hung up, or has failed.
    pub fn poll_read_ready(&self, cx: &mut Context<'_>) -> Poll<()> {
        self.stream.poll_read_ready(cx).map(|_| ())
    }

    /// Reads one chunk without blocking and hands it to the parser. The read
    /// is bounded by what the parser can still hold.
    pub fn read_chunk(&mut self, scratch: &mut [u8]) -> ReadEvent {
        let limit = self.parser.read_limit().min(scratch.len());

        match self.stream.try_read(&mut scratch[..limit]) {
            Ok(0) => ReadEvent::Closed,
            Ok(n) => ReadEvent::Parsed(self.parser.feed(&scratch[..n])),
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => ReadEvent::Spurious,
            Err(e) => {
                tracing::debug!(peer = %self.peer, error = %e, "Read failed");
                ReadEvent::Closed
            }
        }
    }

    /// Sends a complete response and shuts down the write side.
    pub async fn respond(&mut self, response: Bytes) -> anyhow::Result<()> {
        let mut writer = ResponseWriter::new(response);
        writer.write_to_stream(&mut self.stream).await?;
        self.stream.shutdown().await?;
        Ok(())
    }
}
