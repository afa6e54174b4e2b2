use clap::{Parser, Subcommand};
use iris::constants::{TABLE_PATH, TABLE_PORT};
use iris::table::TableClient;
use iris::utils::topic_name;
use std::time::Duration;

#[derive(Parser)]
#[command(version, about = "Inspect a running telemetry table", long_about = None)]
struct Args {
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    #[arg(short, long, default_value_t = TABLE_PORT)]
    port: u16,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List every topic
    List,
    /// Print the current value of one entry
    Get {
        key: String,
        #[arg(long, default_value = TABLE_PATH)]
        table: String,
    },
    /// Print an entry whenever it changes (Ctrl+C to exit)
    Watch {
        key: String,
        #[arg(long, default_value = TABLE_PATH)]
        table: String,
        #[arg(long, default_value_t = 100)]
        every_ms: u64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let client = match TableClient::new(&args.host, args.port).await {
        Ok(client) => client,
        Err(e) => {
            eprintln!("❌ Failed to connect to table server: {}", e);
            eprintln!("Make sure the table server is running with: cargo run --bin tableserver");
            return Ok(());
        }
    };

    match args.command {
        Command::List => {
            let topics = client.topics().await.map_err(|e| anyhow::anyhow!(e))?;
            if topics.is_empty() {
                println!("(no topics)");
            }
            for topic in topics {
                println!("{}", topic);
            }
        }
        Command::Get { key, table } => {
            match client.get_entry(&table, &key).await.map_err(|e| anyhow::anyhow!(e))? {
                Some(value) => println!("{}", value),
                None => println!("(unset)"),
            }
        }
        Command::Watch { key, table, every_ms } => {
            let topic = topic_name(&table, &key).map_err(|e| anyhow::anyhow!(e))?;
            println!("👀 Watching {} (Ctrl+C to exit)", topic);
            let mut ticker = tokio::time::interval(Duration::from_millis(every_ms.max(1)));
            let mut last = None;
            loop {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => break,
                    _ = ticker.tick() => {}
                }
                let value = client.get(&topic).await.map_err(|e| anyhow::anyhow!(e))?;
                if value != last {
                    let now = chrono::Local::now().format("%H:%M:%S%.3f");
                    match &value {
                        Some(value) => println!("[{}] {}", now, value),
                        None => println!("[{}] (unset)", now),
                    }
                    last = value;
                }
            }
        }
    }

    Ok(())
}
