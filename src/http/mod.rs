//! Application socket handling.
//!
//! The bootstrap binds sockets; what is spoken on them lives here.

pub mod websocket;

pub use websocket::socket_router;
