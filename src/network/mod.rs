//! Network Module
//!
//! TCP server and client handling.
//!
//! ## Architecture
//! - Single acceptor thread with a non-blocking listener
//! - One OS thread per connection, capped by `max_connections`
//! - Requests executed through the shared Engine

mod server;
mod connection;
mod client;

pub use server::{bind_and_accept_forever, Server, ShutdownHandle};
pub use connection::Connection;
pub use client::Client;
