//! HTTP protocol handling.
//!
//! Only as much HTTP as a redirector needs: find the end of the request
//! head, optionally pull out the URI and Host, answer, hang up.
//!
//! # Architecture
//!
//! - **`connection`**: one accepted client socket plus its parser
//! - **`parser`**: incremental, byte-at-a-time request head state machine
//! - **`request`**: recognized methods and the extracted request head
//! - **`response`**: 301/400 response representation with builder pattern
//! - **`writer`**: serializes and writes responses to the client
//!
//! # Connection Lifecycle
//!
//! ```text
//!        ┌─────────────┐
//!        │   Reading   │ ← fed by the event loop on readiness
//!        └──────┬──────┘
//!               │ verdict
//!               ├─ NeedMoreData → Reading
//!               ├─ Complete → 301 → Closed
//!               ├─ Malformed → 400 → Closed
//!               └─ peer closed → Closed
//! ```
//!
//! There is no keep-alive: every connection carries exactly one request.

pub mod connection;
pub mod parser;
pub mod request;
pub mod response;
pub mod writer;
