use clap::Parser;
use iris::constants::{TABLE_HOST, TABLE_PATH, TABLE_PORT};
use iris::rotations::{CameraMount, flatten, mount_rotations_json};
use iris::utils::init_tracing;
use iris::{DoubleArraySender, SenderConfig};
use std::time::Duration;

#[derive(Parser)]
#[command(version, about = "Prints camera-to-robot rotations, optionally publishing them to the telemetry table", long_about = None)]
struct Args {
    /// Publish each mount's matrix (row-major) as `camera/<mount>/rotation`
    #[arg(long)]
    publish: bool,

    #[arg(long, default_value = TABLE_HOST)]
    host: String,

    #[arg(short, long, default_value_t = TABLE_PORT)]
    port: u16,

    #[arg(long, default_value = TABLE_PATH)]
    table: String,

    #[arg(long, default_value_t = 5000)]
    timeout_ms: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();

    println!("{}", mount_rotations_json().map_err(|e| anyhow::anyhow!(e))?);
    if !args.publish {
        return Ok(());
    }

    let mut senders = Vec::new();
    for mount in CameraMount::ALL {
        let config = SenderConfig::new(format!("camera/{}/rotation", mount.name))
            .with_server(args.host.clone(), args.port)
            .with_table_path(args.table.clone());
        let sender = DoubleArraySender::new(config).map_err(|e| anyhow::anyhow!(e))?;
        sender.send_value(flatten(&mount.rotation()));
        senders.push(sender);
    }

    let flushed = tokio::time::timeout(Duration::from_millis(args.timeout_ms), async {
        for sender in &senders {
            sender.flush().await;
        }
    })
    .await;

    match flushed {
        Ok(()) => {
            println!("✅ Published {} rotations to {}:{}", senders.len(), args.host, args.port);
            Ok(())
        }
        Err(_) => anyhow::bail!("table server {}:{} did not acknowledge within {}ms",
            args.host, args.port, args.timeout_ms),
    }
}
