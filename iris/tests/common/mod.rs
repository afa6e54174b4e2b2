#![allow(dead_code)]

use image::{DynamicImage, Rgb, RgbImage};
use iris::framecast::{ConnectionSet, FrameSource, FramecastServer};
use iris::table::{TableServer, TableServerHandle};
use iris::{BroadcastConfig, SenderConfig};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub const LOCALHOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

/// Upper bound for anything a test waits on.
pub const WAIT: Duration = Duration::from_secs(5);

/// Creates a deterministic gradient image of the given size.
pub fn test_image(width: u32, height: u32) -> DynamicImage {
    let image = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 255 / width.max(1)) as u8, (y * 255 / height.max(1)) as u8, 128])
    });
    DynamicImage::ImageRgb8(image)
}

pub fn test_source() -> FrameSource {
    FrameSource::from_image(test_image(64, 48), 90).unwrap()
}

/// Starts a table server on an ephemeral localhost port.
pub async fn start_table() -> TableServerHandle {
    TableServer::bind(SocketAddr::new(LOCALHOST, 0)).await.unwrap()
}

/// Sender config pointing at a test table server, retrying quickly.
pub fn sender_config(table: &TableServerHandle, key: &str) -> SenderConfig {
    SenderConfig::new(key)
        .with_server("127.0.0.1", table.local_addr().port())
        .with_reconnect_every_ms(20)
}

/// Returns a localhost port that was free a moment ago.
pub fn free_port() -> u16 {
    let listener = std::net::TcpListener::bind((LOCALHOST, 0)).unwrap();
    listener.local_addr().unwrap().port()
}

pub struct RunningFramecast {
    pub addr: SocketAddr,
    pub connections: ConnectionSet,
    pub source: Arc<FrameSource>,
    pub cancel: CancellationToken,
    pub task: JoinHandle<Result<(), String>>,
}

impl RunningFramecast {
    pub fn ws_url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }
}

/// Starts a framecast server on an ephemeral localhost port serving `asset_dir`.
pub async fn start_framecast(interval: Duration, asset_dir: &Path) -> RunningFramecast {
    let config = BroadcastConfig {
        host: LOCALHOST,
        port: 0,
        asset_dir: asset_dir.to_path_buf(),
        interval,
        ..BroadcastConfig::default()
    };
    let server = FramecastServer::bind_with_source(config, test_source()).await.unwrap();
    let cancel = CancellationToken::new();
    let running = RunningFramecast {
        addr: server.local_addr(),
        connections: server.connections(),
        source: server.source(),
        cancel: cancel.clone(),
        task: tokio::spawn(server.serve(cancel)),
    };
    running
}

/// Polls until the set has exactly `expected` members.
pub async fn wait_for_members(connections: &ConnectionSet, expected: usize) {
    tokio::time::timeout(WAIT, async {
        while connections.len().await.unwrap() != expected {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap_or_else(|_| panic!("connection set never reached {} members", expected));
}
