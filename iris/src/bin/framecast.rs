use clap::Parser;
use iris::constants::{
    FRAMECAST_ASSET_DIR, FRAMECAST_IMAGE_PATH, FRAMECAST_INTERVAL_MS, FRAMECAST_JPEG_QUALITY,
    FRAMECAST_PORT, FRAMECAST_WS_PATH,
};
use iris::framecast::FramecastServer;
use iris::utils::init_tracing;
use iris::BroadcastConfig;
use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(version, about = "Frame broadcast server - pushes a JPEG of one image to every WebSocket client", long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = FRAMECAST_PORT)]
    port: u16,

    #[arg(long, default_value = "0.0.0.0")]
    host: IpAddr,

    #[arg(long, default_value = FRAMECAST_WS_PATH)]
    ws_path: String,

    #[arg(long, default_value = FRAMECAST_ASSET_DIR)]
    assets: PathBuf,

    #[arg(long, default_value = FRAMECAST_IMAGE_PATH)]
    image: PathBuf,

    #[arg(long, default_value_t = FRAMECAST_INTERVAL_MS)]
    interval_ms: u64,

    #[arg(long, default_value_t = FRAMECAST_JPEG_QUALITY)]
    quality: u8,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();

    let config = BroadcastConfig {
        host: args.host,
        port: args.port,
        ws_path: args.ws_path,
        asset_dir: args.assets,
        image_path: args.image,
        interval: Duration::from_millis(args.interval_ms),
        jpeg_quality: args.quality,
        ..BroadcastConfig::default()
    };

    let server = FramecastServer::bind(config.clone())
        .await
        .map_err(|e| anyhow::anyhow!(e))?;

    println!("🚀 Broadcasting {} on ws://{}{}", config.image_path.display(), server.local_addr(), config.ws_path);
    println!("🌐 Page served from {} at http://{}/", config.asset_dir.display(), server.local_addr());
    println!("💡 Press Ctrl+C to stop\n");

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        println!("👋 Shutting down framecast...");
        on_signal.cancel();
    });

    server.serve(cancel).await.map_err(|e| anyhow::anyhow!(e))
}
