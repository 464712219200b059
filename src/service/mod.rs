//! Network render service and its client.
//!
//! Transport is TCP with length-prefixed JSON frames (see [`wire`]). Every operation except
//! `polyline` is a unary call answered by one acknowledgment; `polyline` is client-streaming.

/// Async client issuing the remote procedures.
pub mod client;
/// Server accept loop and per-connection protocol handling.
pub mod server;
/// Frame codec and message types.
pub mod wire;
