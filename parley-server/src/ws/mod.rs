//! WebSocket module for real-time communication

mod connection;

pub use connection::ws_handler;
