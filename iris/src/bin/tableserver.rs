use clap::Parser;
use iris::constants::TABLE_PORT;
use iris::table::TableServer;
use iris::utils::init_tracing;
use std::net::{IpAddr, SocketAddr};

#[derive(Parser)]
#[command(version, about = "Telemetry table server - holds array entries published by ArraySenders", long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = TABLE_PORT)]
    port: u16,

    #[arg(long, default_value = "0.0.0.0")]
    host: IpAddr,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();
    let address = SocketAddr::new(args.host, args.port);

    println!("🚀 Starting telemetry table on {}", address);
    tokio::select! {
        result = TableServer::run_server(address) => result.map_err(|e| anyhow::anyhow!(e)),
        _ = tokio::signal::ctrl_c() => {
            println!("👋 Shutting down table server...");
            Ok(())
        }
    }
}
