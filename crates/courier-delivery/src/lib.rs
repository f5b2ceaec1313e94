//! The delivery side channel: a WebSocket client registry keyed by user,
//! the concrete [`DeliveryChannel`](courier_core::channel::DeliveryChannel)
//! implementation, and the axum server exposing the client socket, the
//! batch intake endpoint, and a health check.

pub mod channel;
pub mod client;
pub mod server;

pub use channel::WsDelivery;
pub use client::{ClientId, ClientRegistry};
pub use server::{build_router, start, AppState, ServerConfig, ServerHandle};
