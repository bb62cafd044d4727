//! WebSocket gateway: protocol, sessions and fan-out

pub mod handler;
pub mod hub;
pub mod protocol;
pub mod session;

pub use handler::ws_handler;
