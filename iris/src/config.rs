//! Explicit configuration for array senders and the frame broadcast server.
//! Defaults come from `constants`; binaries override fields from their `clap` arguments.

use crate::constants::{
    FRAMECAST_ASSET_DIR, FRAMECAST_CLIENT_QUEUE, FRAMECAST_IMAGE_PATH, FRAMECAST_INTERVAL_MS,
    FRAMECAST_JPEG_QUALITY, FRAMECAST_PORT, FRAMECAST_WS_PATH, SENDER_RECONNECT_EVERY_MS,
    TABLE_HOST, TABLE_PATH, TABLE_PORT,
};
use crate::iris_error;
use crate::utils::{OrError, topic_name};
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use std::time::Duration;

/// Where an `ArraySender` publishes: `{host, port}` of the table server plus `{table_path, key}` of the entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SenderConfig {
    pub host: String,
    pub port: u16,
    pub table_path: String,
    pub key: String,
    pub reconnect_every_ms: u64,
}

impl SenderConfig {
    /// Entry `key` under the default table on the default robot host.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            host: TABLE_HOST.to_string(),
            port: TABLE_PORT,
            table_path: TABLE_PATH.to_string(),
            key: key.into(),
            reconnect_every_ms: SENDER_RECONNECT_EVERY_MS,
        }
    }

    pub fn with_server(mut self, host: impl Into<String>, port: u16) -> Self {
        self.host = host.into();
        self.port = port;
        self
    }

    pub fn with_table_path(mut self, table_path: impl Into<String>) -> Self {
        self.table_path = table_path.into();
        self
    }

    pub fn with_reconnect_every_ms(mut self, reconnect_every_ms: u64) -> Self {
        self.reconnect_every_ms = reconnect_every_ms;
        self
    }

    /// Full topic name, validated.
    pub fn topic(&self) -> OrError<String> {
        topic_name(&self.table_path, &self.key)
    }
}

/// Frame broadcast server settings: `{port, ws_path, asset_dir, image_path}` plus cadence and encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastConfig {
    pub host: IpAddr,
    pub port: u16,
    pub ws_path: String,
    pub asset_dir: PathBuf,
    pub image_path: PathBuf,
    pub interval: Duration,
    pub jpeg_quality: u8,
    pub client_queue: usize,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: FRAMECAST_PORT,
            ws_path: FRAMECAST_WS_PATH.to_string(),
            asset_dir: PathBuf::from(FRAMECAST_ASSET_DIR),
            image_path: PathBuf::from(FRAMECAST_IMAGE_PATH),
            interval: Duration::from_millis(FRAMECAST_INTERVAL_MS),
            jpeg_quality: FRAMECAST_JPEG_QUALITY,
            client_queue: FRAMECAST_CLIENT_QUEUE,
        }
    }
}

impl BroadcastConfig {
    /// Rejects values the server cannot run with.
    /// `interval` and `client_queue` must be non-zero: tokio panics on a zero period or zero-capacity channel.
    pub fn validate(&self) -> OrError<()> {
        if !self.ws_path.starts_with('/') || self.ws_path.len() < 2 {
            return Err(iris_error!("config::BroadcastConfig", "validate",
                &format!("ws_path '{}' must start with '/' and name a route", self.ws_path)));
        }
        if self.interval.is_zero() {
            return Err(iris_error!("config::BroadcastConfig", "validate", "interval must be non-zero"));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(iris_error!("config::BroadcastConfig", "validate",
                &format!("jpeg_quality {} outside 1..=100", self.jpeg_quality)));
        }
        if self.client_queue == 0 {
            return Err(iris_error!("config::BroadcastConfig", "validate", "client_queue must be non-zero"));
        }
        Ok(())
    }
}
