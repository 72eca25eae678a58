//! keyhttpd - static file server with a UDP key lookup backend
//!
//! Core library for request handling and backend forwarding.

pub mod config;
pub mod http;
pub mod proxy;
pub mod server;
