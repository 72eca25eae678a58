//! Lookup forwarding.
//!
//! Requests carrying `?key=` are not served from disk. Their term is sent
//! to a UDP backend and the datagrams it answers with are stitched back
//! together into the response body.

pub mod udp;

pub use udp::{QueryOutcome, QueryProxy, Reassembly, ReassemblyState};
