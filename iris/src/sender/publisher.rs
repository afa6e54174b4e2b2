//! Typed array sender: `ArraySender<T>` publishes one named entry of the telemetry table.
//! The caller only records the latest value; a background task owns the connection and pushes it.

use super::ArrayElement;
use crate::config::SenderConfig;
use crate::iris_error_cause;
use crate::table::{self, TelemetryTableClient};
use crate::utils::OrError;
use std::time::Duration;
use tarpc::client::RpcError;
use tarpc::context;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

pub type DoubleArraySender = ArraySender<f64>;
pub type IntegerArraySender = ArraySender<i64>;

/// Latest state recorded by the caller. Intermediate values are overwritten, never queued.
#[derive(Debug, Clone)]
struct PendingState<T> {
    default: Option<Vec<T>>,
    value: Option<Vec<T>>,
    revision: u64,
}

impl<T> Default for PendingState<T> {
    fn default() -> Self {
        Self {
            default: None,
            value: None,
            revision: 0,
        }
    }
}

enum PushOutcome {
    Applied,
    Rejected(String),
}

/// Publishes one array-valued entry `{table_path}/{key}` on a telemetry table server.
///
/// Best effort: `send_value` and `set_default_value` never fail. While the server is unreachable
/// the sender retries every `reconnect_every_ms` and pushes the latest state once connected.
/// Rejections by the server (the topic holds another element type) are logged, not retried.
pub struct ArraySender<T: ArrayElement> {
    topic: String,
    pending: watch::Sender<PendingState<T>>,
    acked: watch::Receiver<u64>,
    bg_handle: JoinHandle<()>,
}

impl<T: ArrayElement> ArraySender<T> {
    /// Validates the topic and starts the background sync task.
    /// Error: invalid table path or key, or called outside a tokio runtime.
    pub fn new(config: SenderConfig) -> OrError<Self> {
        let topic = config.topic()?;
        let runtime = Handle::try_current().map_err(|e| {
            iris_error_cause!("sender::ArraySender", "new", "must be created inside a tokio runtime", e)
        })?;

        let (pending_tx, pending_rx) = watch::channel(PendingState::default());
        let (acked_tx, acked_rx) = watch::channel(0u64);

        let bg_handle = runtime.spawn(sync_loop(
            config.host,
            config.port,
            topic.clone(),
            Duration::from_millis(config.reconnect_every_ms),
            pending_rx,
            acked_tx,
        ));

        Ok(Self {
            topic,
            pending: pending_tx,
            acked: acked_rx,
            bg_handle,
        })
    }

    /// Entry `key` under the default table on the default robot host.
    pub fn with_key(key: impl Into<String>) -> OrError<Self> {
        Self::new(SenderConfig::new(key))
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Overwrites the entry's current value.
    pub fn send_value(&self, value: Vec<T>) {
        self.pending.send_modify(|state| {
            state.value = Some(value);
            state.revision += 1;
        });
    }

    /// Sets the value readers see before any value was sent. Idempotent.
    pub fn set_default_value(&self, value: Vec<T>) {
        self.pending.send_modify(|state| {
            state.default = Some(value);
            state.revision += 1;
        });
    }

    /// Waits until everything recorded so far was handled by the server (applied or rejected).
    /// Never returns while the server stays unreachable; wrap in a timeout where that matters.
    pub async fn flush(&self) {
        let target = self.pending.borrow().revision;
        let mut acked = self.acked.clone();
        let _ = acked.wait_for(|revision| *revision >= target).await;
    }
}

impl<T: ArrayElement> Drop for ArraySender<T> {
    fn drop(&mut self) {
        self.bg_handle.abort();
    }
}

/// Outer loop: connection retry, runs until the sender is dropped.
/// Inner loop: push latest state, wait for the next change.
async fn sync_loop<T: ArrayElement>(
    host: String,
    port: u16,
    topic: String,
    reconnect_every: Duration,
    mut pending: watch::Receiver<PendingState<T>>,
    acked: watch::Sender<u64>,
) {
    loop {
        match table::connect(&host, port).await {
            Ok(client) => {
                debug!(%topic, %host, port, "connected to telemetry table");
                loop {
                    let snapshot = pending.borrow_and_update().clone();
                    match push_state(&client, &topic, &snapshot).await {
                        Ok(PushOutcome::Applied) => {
                            acked.send_replace(snapshot.revision);
                        }
                        Ok(PushOutcome::Rejected(reason)) => {
                            error!(%topic, %reason, "telemetry table rejected value");
                            acked.send_replace(snapshot.revision);
                        }
                        Err(e) => {
                            warn!(%topic, error = %e, "lost telemetry table connection");
                            break;
                        }
                    }
                    if pending.changed().await.is_err() {
                        return; // Sender dropped
                    }
                }
            }
            Err(e) => {
                warn!(%topic, error = %e, "telemetry table unreachable");
            }
        }
        debug!(%topic, "retrying in {}ms", reconnect_every.as_millis());
        tokio::time::sleep(reconnect_every).await;
    }
}

async fn push_state<T: ArrayElement>(
    client: &TelemetryTableClient,
    topic: &str,
    state: &PendingState<T>,
) -> Result<PushOutcome, RpcError> {
    if let Some(default) = &state.default {
        let result = client
            .set_default(context::current(), topic.to_string(), T::into_value(default.clone()))
            .await?;
        if let Err(reason) = result {
            return Ok(PushOutcome::Rejected(reason));
        }
    }
    if let Some(value) = &state.value {
        let result = client
            .set(context::current(), topic.to_string(), T::into_value(value.clone()))
            .await?;
        if let Err(reason) = result {
            return Ok(PushOutcome::Rejected(reason));
        }
    }
    Ok(PushOutcome::Applied)
}
