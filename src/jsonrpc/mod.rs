//! Minimal JSON-RPC 2.0 over HTTP, just enough for the handful of `eth_` methods the
//! ledger needs.
pub mod client;
pub mod message;

pub use client::HttpClient;
