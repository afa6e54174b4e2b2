//! Telemetry table: a tarpc key-value service holding one typed array entry per topic.
//! Provides the RPC server (`TableServer`), client (`TableClient`), unit-testable state (`TableState`), and value types.

mod server;
pub use server::{TableServer, TableServerHandle};

mod client;
pub use client::TableClient;
pub(crate) use client::connect;

mod protocol;
pub use protocol::{TelemetryTable, TelemetryTableClient};

mod state;
pub use state::TableState;

mod value;
pub use value::{TableValue, TopicInfo, ValueKind};
