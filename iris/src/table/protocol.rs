use super::value::{TableValue, TopicInfo};
use crate::utils::OrError;

#[tarpc::service]
pub trait TelemetryTable {
    /// Overwrites the current value of `topic`, creating the topic on first write.
    async fn set(topic: String, value: TableValue) -> OrError<()>;
    /// Sets the value readers see until a value is set.
    async fn set_default(topic: String, value: TableValue) -> OrError<()>;
    /// Current value, falling back to the default.
    async fn get(topic: String) -> OrError<Option<TableValue>>;
    /// All known topics, sorted by name.
    async fn topics() -> Vec<TopicInfo>;
}
