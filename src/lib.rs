//! Courier — transactional messaging tools behind a small RPC surface.

pub mod config;
pub mod error;
pub mod generate;
pub mod server;
pub mod tools;
pub mod transport;
