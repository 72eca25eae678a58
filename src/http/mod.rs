//! HTTP/1.0 request handling.
//!
//! One connection carries one request. There is no keep-alive, and response
//! bodies are delimited by closing the connection, so no entity headers are
//! ever written.
//!
//! # Architecture
//!
//! - **`connection`**: per-connection pipeline driving the state machine below
//! - **`parser`**: turns the request line into a [`request::Request`]
//! - **`request`**: request representation and static/lookup routing
//! - **`resolve`**: maps static URIs onto the document root
//! - **`static_files`**: opens resolved files for streaming
//! - **`response`**: status codes and buffered responses
//! - **`writer`**: serializes responses and streams file bodies
//! - **`access_log`**: one line per answered request
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌─────────────┐
//!        │   Reading   │ ← Buffer until the request line ends
//!        └──────┬──────┘
//!               │ Request line parsed       (malformed → 400, straight to Writing)
//!               ▼
//!        ┌──────────────────┐
//!        │   Processing     │ ← Lookup via UDP, or resolve + open a file
//!        └──────┬───────────┘
//!               │ Reply ready               (backend failure → Closed, no reply)
//!               ▼
//!        ┌──────────────────┐
//!        │    Writing       │ ← Send head and body, log the request
//!        └──────┬───────────┘
//!               ▼
//!            Closed
//! ```

pub mod access_log;
pub mod connection;
pub mod parser;
pub mod request;
pub mod resolve;
pub mod response;
pub mod static_files;
pub mod writer;
