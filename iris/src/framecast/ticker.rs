use super::frame::FrameSource;
use super::registry::{BroadcastReport, ConnectionSet};
use crate::iris_error_cause;
use crate::utils::OrError;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// Encodes one frame and queues it for every current member.
/// Skips encoding when nobody is connected. Encoding runs on the blocking pool.
pub async fn broadcast_once(
    source: &Arc<FrameSource>,
    connections: &ConnectionSet,
) -> OrError<BroadcastReport> {
    if connections.len().await? == 0 {
        return Ok(BroadcastReport::default());
    }
    let source = Arc::clone(source);
    let frame = tokio::task::spawn_blocking(move || source.encode_jpeg())
        .await
        .map_err(|e| iris_error_cause!("framecast", "broadcast_once", "encoder task failed", e))??;
    connections.broadcast(frame).await
}

/// Broadcasts a frame every `period` until `cancel` fires. The first frame goes out immediately.
/// A failed tick is logged and the loop carries on; a closed registry ends the loop.
pub fn spawn_broadcast_loop(
    source: Arc<FrameSource>,
    connections: ConnectionSet,
    period: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }
            match broadcast_once(&source, &connections).await {
                Ok(report) if report.delivered + report.dropped > 0 => {
                    debug!(delivered = report.delivered, dropped = report.dropped, "frame broadcast");
                }
                Ok(_) => {}
                Err(e) => {
                    error!(error = %e, "frame broadcast failed");
                    if connections.len().await.is_err() {
                        break;
                    }
                }
            }
        }
        info!("broadcast loop stopped");
    })
}
