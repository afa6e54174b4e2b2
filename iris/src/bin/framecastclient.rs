use clap::Parser;
use futures_util::StreamExt;
use iris::framecast::FrameClient;
use iris::utils::init_tracing;

#[derive(Parser)]
#[command(version, about = "Framecast client - prints one line per received frame", long_about = None)]
struct Args {
    #[arg(long, default_value = "ws://127.0.0.1:9090/ws")]
    url: String,

    /// Exit after this many frames
    #[arg(short, long)]
    count: Option<usize>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();

    println!("🔌 Connecting to {} (Ctrl+C to exit)", args.url);
    let client = FrameClient::new(&args.url, None, None);
    let mut frames = client.subscribe();
    let mut received = 0usize;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            frame = frames.next() => match frame {
                Some(Ok(frame)) => {
                    received += 1;
                    let now = chrono::Local::now().format("%H:%M:%S%.3f");
                    println!("[{}] frame {} - {} bytes", now, received, frame.len());
                    if args.count.is_some_and(|count| received >= count) {
                        break;
                    }
                }
                Some(Err(lagged)) => eprintln!("⚠️ {}", lagged),
                None => break,
            }
        }
    }

    println!("📥 Received {} frames", received);
    Ok(())
}
