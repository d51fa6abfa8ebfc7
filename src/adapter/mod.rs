//! Concrete adapters for the external systems the daemon talks to.

pub mod http;
pub mod websocket;

pub use http::HttpClusterApi;
pub use websocket::WsEventSource;
