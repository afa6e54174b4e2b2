use super::protocol::TelemetryTableClient;
use super::value::{TableValue, TopicInfo};
use crate::constants::TABLE_MAX_FRAME_LENGTH;
use crate::sender::ArrayElement;
use crate::utils::{OrError, topic_name};
use crate::{iris_error, iris_error_cause};
use tarpc::{client, context, tokio_serde::formats::Bincode};

/// Opens a TARPC connection to the table server at `host:port`. `host` may be a name or an address.
pub(crate) async fn connect(host: &str, port: u16) -> OrError<TelemetryTableClient> {
    let mut transport = tarpc::serde_transport::tcp::connect((host, port), Bincode::default);
    transport.config_mut().max_frame_length(TABLE_MAX_FRAME_LENGTH);
    let transport = transport.await.map_err(|e| {
        iris_error_cause!("table", "connect", &format!("failed to connect to {}:{}", host, port), e)
    })?;
    Ok(TelemetryTableClient::new(client::Config::default(), transport).spawn())
}

/// Reader-side wrapper around the tarpc-generated `TelemetryTableClient` with a persistent connection.
pub struct TableClient {
    client: TelemetryTableClient,
}

impl TableClient {
    pub async fn new(host: &str, port: u16) -> OrError<Self> {
        let client = connect(host, port).await?;
        Ok(Self { client })
    }

    pub async fn get(&self, topic: &str) -> OrError<Option<TableValue>> {
        self.client
            .get(context::current(), topic.to_string())
            .await
            .map_err(|e| iris_error_cause!("table::TableClient", "get", "RPC failed", e))?
    }

    /// Reads entry `key` of table `table_path`.
    pub async fn get_entry(&self, table_path: &str, key: &str) -> OrError<Option<TableValue>> {
        let topic = topic_name(table_path, key)?;
        self.get(&topic).await
    }

    /// Typed read. Error: the entry holds another element type.
    pub async fn get_array<T: ArrayElement>(
        &self,
        table_path: &str,
        key: &str,
    ) -> OrError<Option<Vec<T>>> {
        match self.get_entry(table_path, key).await? {
            None => Ok(None),
            Some(value) => {
                let kind = value.kind();
                T::from_value(value).map(Some).ok_or_else(|| {
                    iris_error!("table::TableClient", "get_array", &format!(
                        "entry '{}' holds {} values, expected {}", key, kind, T::KIND
                    ))
                })
            }
        }
    }

    pub async fn set(&self, topic: &str, value: TableValue) -> OrError<()> {
        self.client
            .set(context::current(), topic.to_string(), value)
            .await
            .map_err(|e| iris_error_cause!("table::TableClient", "set", "RPC failed", e))?
    }

    pub async fn topics(&self) -> OrError<Vec<TopicInfo>> {
        self.client
            .topics(context::current())
            .await
            .map_err(|e| iris_error_cause!("table::TableClient", "topics", "RPC failed", e))
    }
}
