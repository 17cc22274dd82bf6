//! Browser-facing transport.
//!
//! Clients connect over WebSocket and exchange the JSON events defined in
//! [`protocol`]. A plain `GET /` returns a small status page.
//!
//! ```sh
//! ./target/debug/moondust              # Default port 3000
//! ./target/debug/moondust --port=8080  # Custom port
//! ```

pub mod protocol;
mod server;

pub use protocol::{ClientMessage, PlayerView, ServerMessage};
pub use server::{serve, Connection, GameServer};
