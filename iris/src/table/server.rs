//! TARPC-based telemetry table server with shared state.
//! `TableServer` implements the `TelemetryTable` RPC trait and guards one `TableState` with a `RwLock`.

use super::TableState;
use super::protocol::TelemetryTable;
use super::value::{TableValue, TopicInfo};
use crate::constants::TABLE_MAX_FRAME_LENGTH;
use crate::iris_error_cause;
use crate::utils::OrError;
use futures::{future, prelude::*};
use std::net::SocketAddr;
use std::sync::Arc;
use tarpc::{
    context,
    server::{self, Channel},
    tokio_serde::formats::Bincode,
};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Concurrent client connections served at once.
const MAX_CONNECTIONS: usize = 1024;

/// Architecture: Single `TableState` protected by `RwLock`, many concurrent TARPC connections.
#[derive(Clone)]
pub struct TableServer {
    state: Arc<RwLock<TableState>>,
}

impl TelemetryTable for TableServer {
    async fn set(self, _: context::Context, topic: String, value: TableValue) -> OrError<()> {
        let mut state = self.state.write().await;
        state.set(&topic, value).inspect_err(|e| debug!(%topic, error = %e, "set rejected"))
    }

    async fn set_default(self, _: context::Context, topic: String, value: TableValue) -> OrError<()> {
        let mut state = self.state.write().await;
        state
            .set_default(&topic, value)
            .inspect_err(|e| debug!(%topic, error = %e, "set_default rejected"))
    }

    async fn get(self, _: context::Context, topic: String) -> OrError<Option<TableValue>> {
        let state = self.state.read().await;
        state.get(&topic)
    }

    async fn topics(self, _: context::Context) -> Vec<TopicInfo> {
        let state = self.state.read().await;
        state.topics()
    }
}

/// Running server: its bound address and shared state. Dropping the handle stops accepting connections.
pub struct TableServerHandle {
    local_addr: SocketAddr,
    state: Arc<RwLock<TableState>>,
    task: Option<JoinHandle<()>>,
}

impl TableServerHandle {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn state(&self) -> Arc<RwLock<TableState>> {
        Arc::clone(&self.state)
    }

    /// Serves until the accept loop ends.
    pub async fn join(mut self) -> OrError<()> {
        if let Some(task) = self.task.take() {
            task.await.map_err(|e| {
                iris_error_cause!("table::TableServerHandle", "join", "server task failed", e)
            })?;
        }
        Ok(())
    }
}

impl Drop for TableServerHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl TableServer {
    fn new(shared_state: Arc<RwLock<TableState>>) -> Self {
        Self {
            state: shared_state,
        }
    }

    /// Binds the TARPC listener and serves in a background task.
    /// Network: TCP with bincode framing, so non-finite doubles survive the round trip.
    /// Error: bind fails → propagates to caller.
    /// Called by: `run_server`, tests
    pub async fn bind(address: SocketAddr) -> OrError<TableServerHandle> {
        let shared_state = Arc::new(RwLock::new(TableState::new()));

        let mut listener = tarpc::serde_transport::tcp::listen(address, Bincode::default)
            .await
            .map_err(|e| {
                iris_error_cause!("table::TableServer", "bind",
                    &format!("failed to listen on {}", address), e)
            })?;
        listener.config_mut().max_frame_length(TABLE_MAX_FRAME_LENGTH);
        let local_addr = listener.local_addr();
        info!(%local_addr, "telemetry table listening");

        let serving_state = Arc::clone(&shared_state);
        let task = tokio::spawn(async move {
            listener
                .filter_map(|r| future::ready(r.ok())) // Ignore accept errors
                .map(server::BaseChannel::with_defaults)
                .map(|channel| {
                    // Each channel = one client connection, all sharing the same TableState
                    let server = TableServer::new(Arc::clone(&serving_state));
                    channel.execute(server.serve()).for_each(|fut| async {
                        tokio::spawn(fut);
                    })
                })
                .buffer_unordered(MAX_CONNECTIONS)
                .for_each(|_| async {})
                .await;
        });

        Ok(TableServerHandle {
            local_addr,
            state: shared_state,
            task: Some(task),
        })
    }

    /// Starts the server and serves forever.
    pub async fn run_server(address: SocketAddr) -> OrError<()> {
        Self::bind(address).await?.join().await
    }
}
