pub mod config;
pub mod constants;
pub mod framecast;
pub mod rotations;
mod sender;
pub mod table;
pub mod utils;

// Re-export the publisher types at the top level for easy access
pub use config::{BroadcastConfig, SenderConfig};
pub use sender::{ArrayElement, ArraySender, DoubleArraySender, IntegerArraySender};
