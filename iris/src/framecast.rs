//! Frame broadcast demo: one image, JPEG-encoded on a fixed cadence and pushed to every WebSocket client.
//! Provides `FramecastServer` (HTTP + WebSocket), `ConnectionSet` (single-owner connection registry),
//! `FrameSource` (image → JPEG), the cancellable broadcast loop, and `FrameClient` (auto-reconnecting receiver).

mod client;
mod frame;
mod registry;
mod server;
mod ticker;

pub use client::FrameClient;
pub use frame::FrameSource;
pub use registry::{BroadcastReport, ConnectionId, ConnectionInfo, ConnectionSet};
pub use server::FramecastServer;
pub use ticker::{broadcast_once, spawn_broadcast_loop};
