use clap::Parser;
use iris::constants::{TABLE_HOST, TABLE_PATH, TABLE_PORT};
use iris::utils::init_tracing;
use iris::{DoubleArraySender, IntegerArraySender, SenderConfig};
use std::time::Duration;

#[derive(Parser)]
#[command(version, about = "Publishes test arrays to the telemetry table", long_about = None)]
struct Args {
    #[arg(long, default_value = TABLE_HOST)]
    host: String,

    #[arg(short, long, default_value_t = TABLE_PORT)]
    port: u16,

    #[arg(long, default_value = TABLE_PATH)]
    table: String,

    #[arg(long, default_value = "NVIDIA ORIN ARRAY TEST")]
    key: String,

    #[arg(long, default_value = "NVIDIA ORIN INT ARRAY TEST")]
    int_key: String,

    #[arg(long, default_value_t = 20)]
    every_ms: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();

    let config = |key: &str| {
        SenderConfig::new(key)
            .with_server(args.host.clone(), args.port)
            .with_table_path(args.table.clone())
    };
    let doubles = DoubleArraySender::new(config(&args.key)).map_err(|e| anyhow::anyhow!(e))?;
    let integers = IntegerArraySender::new(config(&args.int_key)).map_err(|e| anyhow::anyhow!(e))?;

    doubles.set_default_value(vec![0.0, 0.0, 0.0]);
    integers.set_default_value(vec![0]);

    println!("📡 Publishing {} and {} to {}:{} (Ctrl+C to exit)",
        doubles.topic(), integers.topic(), args.host, args.port);

    let mut ticker = tokio::time::interval(Duration::from_millis(args.every_ms.max(1)));
    let mut count: i64 = 0;
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = ticker.tick() => {}
        }
        doubles.send_value(vec![1.0, 2.0, 3.0]);
        integers.send_value(vec![count, count * 2, count * 3]);
        count += 1;
    }

    println!("👋 Sent {} updates per entry", count);
    Ok(())
}
