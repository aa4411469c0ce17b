//! Incremental request parser.
//!
//! Bytes arrive in arbitrary fragments; the parser keeps just enough state
//! per connection to decide when the request head is over. Two modes share
//! the same driver:
//!
//! - [`Mode::Boundary`] only tracks the `CR LF CR LF` terminator. Nothing is
//!   buffered, and the input can never be malformed.
//! - [`Mode::Routing`] accumulates header lines in a bounded buffer and pulls
//!   the URI out of the request line and the value out of `Host: `.
//!
//! ```text
//! Boundary mode:
//!          \r          \n          \r          \n
//!   Start ----> Cr ---------> Lf ----> LfCr ---------> Done
//!     \                     ^  \                     ^
//!      \-------------------/    \-------------------/
//!               \n                       \n
//!   (any other byte goes back to Start, a stray \r goes to Cr)
//!
//! Routing mode:
//!               request line          Host:           blank line
//!   RequestLine -----------> Headers ------> HostSeen -----------> Complete
//!                               \________________________________^
//!                                          blank line
//! ```

use bytes::{BufMut, Bytes, BytesMut};

use crate::http::request::{Method, RequestHead};

const CR: u8 = b'\r';
const LF: u8 = b'\n';
const HOST_PREFIX: &[u8] = b"Host: ";

/// Why a request was rejected. Never shown to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    /// First line is not `GET `, `POST ` or `HEAD ` followed by a URI.
    UnknownRequestLine,
    /// Request line has no space after the URI.
    MissingUri,
    /// A second request line after the first one.
    UnexpectedRequestLine,
    /// Blank line before any request line.
    BlankBeforeRequestLine,
    /// A second `Host: ` line.
    DuplicateHost,
    /// Line buffer filled up before a line terminator showed up.
    LineTooLong,
}

/// Outcome of feeding a chunk to the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    NeedMoreData,
    /// Respond 400 and close.
    Malformed(ParseError),
    /// Respond with a redirect and close. Routing mode carries the request
    /// head, boundary mode carries nothing.
    Complete(Option<RequestHead>),
}

impl Verdict {
    pub fn is_final(&self) -> bool {
        !matches!(self, Verdict::NeedMoreData)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Boundary,
    Routing,
}

/// Progress towards the end of the header block in boundary mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminator {
    Start,
    Cr,
    /// A line just ended.
    Lf,
    LfCr,
    Done,
}

impl Terminator {
    fn step(self, byte: u8) -> Self {
        match (self, byte) {
            (Terminator::Lf, CR) => Terminator::LfCr,
            (_, CR) => Terminator::Cr,
            (Terminator::Start | Terminator::Cr, LF) => Terminator::Lf,
            (Terminator::Lf | Terminator::LfCr, LF) => Terminator::Done,
            _ => Terminator::Start,
        }
    }
}

/// Line-level state in routing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    RequestLine,
    Headers,
    HostSeen,
    Complete,
    Failed(ParseError),
}

#[derive(Debug)]
pub struct RequestParser {
    mode: Mode,
    capacity: usize,
    terminator: Terminator,
    phase: Phase,
    line: BytesMut,
    method: Option<Method>,
    uri: Bytes,
    host: Option<Bytes>,
}

impl RequestParser {
    /// `capacity` bounds a single header line in routing mode and the read
    /// size in both modes.
    pub fn new(mode: Mode, capacity: usize) -> Self {
        let line = match mode {
            Mode::Boundary => BytesMut::new(),
            Mode::Routing => BytesMut::with_capacity(capacity),
        };
        Self {
            mode,
            capacity,
            terminator: Terminator::Start,
            phase: Phase::RequestLine,
            line,
            method: None,
            uri: Bytes::new(),
            host: None,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn terminator(&self) -> Terminator {
        self.terminator
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// How many bytes the next read may deliver without overrunning the
    /// line buffer.
    pub fn read_limit(&self) -> usize {
        match self.mode {
            Mode::Boundary => self.capacity,
            Mode::Routing => self.capacity.saturating_sub(self.line.len()).max(1),
        }
    }

    /// Consumes one chunk. Bytes after the end of the request head are
    /// ignored. Once a final verdict is returned, feeding again returns the
    /// same verdict without looking at the input.
    pub fn feed(&mut self, chunk: &[u8]) -> Verdict {
        match self.mode {
            Mode::Boundary => self.feed_boundary(chunk),
            Mode::Routing => self.feed_routing(chunk),
        }
    }

    fn feed_boundary(&mut self, chunk: &[u8]) -> Verdict {
        for &byte in chunk {
            if self.terminator == Terminator::Done {
                break;
            }
            self.terminator = self.terminator.step(byte);
        }

        if self.terminator == Terminator::Done {
            Verdict::Complete(None)
        } else {
            Verdict::NeedMoreData
        }
    }

    fn feed_routing(&mut self, chunk: &[u8]) -> Verdict {
        for &byte in chunk {
            if let Some(verdict) = self.settled() {
                return verdict;
            }

            if byte == LF {
                let mut line = self.line.split().freeze();
                if line.last() == Some(&CR) {
                    line.truncate(line.len() - 1);
                }
                self.on_line(line);
            } else {
                self.line.put_u8(byte);
                if self.line.len() >= self.capacity {
                    self.phase = Phase::Failed(ParseError::LineTooLong);
                }
            }
        }

        self.settled().unwrap_or(Verdict::NeedMoreData)
    }

    fn settled(&self) -> Option<Verdict> {
        match self.phase {
            Phase::Complete => Some(Verdict::Complete(Some(RequestHead {
                method: self.method.unwrap_or(Method::GET),
                uri: self.uri.clone(),
                host: self.host.clone(),
            }))),
            Phase::Failed(error) => Some(Verdict::Malformed(error)),
            _ => None,
        }
    }

    fn on_line(&mut self, line: Bytes) {
        let waiting_for_request = self.phase == Phase::RequestLine;

        if let Some((method, rest)) = Method::strip_from(&line) {
            if !waiting_for_request {
                self.phase = Phase::Failed(ParseError::UnexpectedRequestLine);
                return;
            }
            let Some(uri_len) = rest.iter().position(|&b| b == b' ') else {
                self.phase = Phase::Failed(ParseError::MissingUri);
                return;
            };
            let start = line.len() - rest.len();
            self.method = Some(method);
            self.uri = line.slice(start..start + uri_len);
            self.phase = Phase::Headers;
        } else if waiting_for_request {
            self.phase = Phase::Failed(if line.is_empty() {
                ParseError::BlankBeforeRequestLine
            } else {
                ParseError::UnknownRequestLine
            });
        } else if line.starts_with(HOST_PREFIX) {
            if self.phase == Phase::HostSeen {
                self.phase = Phase::Failed(ParseError::DuplicateHost);
                return;
            }
            self.host = Some(line.slice(HOST_PREFIX.len()..));
            self.phase = Phase::HostSeen;
        } else if line.is_empty() {
            self.phase = Phase::Complete;
        }
    }
}
