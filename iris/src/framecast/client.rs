use bytes::Bytes;
use futures_util::StreamExt;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::BroadcastStream;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, warn};

/// WebSocket client that connects to a framecast server and receives JPEG frames.
pub struct FrameClient {
    receiver: broadcast::Receiver<Bytes>,
    bg_handle: JoinHandle<()>,
}

impl FrameClient {
    /// Creates client with auto-reconnect to `url` (e.g. `ws://127.0.0.1:9090/ws`).
    /// Errors never propagate after creation - client retries connection every `poll_connection_every_ms` (default 100ms) indefinitely.
    /// Must be called inside a tokio runtime.
    pub fn new(url: &str, poll_connection_every_ms: Option<u64>, buffer_size: Option<usize>) -> Self {
        let poll_interval = poll_connection_every_ms.unwrap_or(100);
        let buffer_capacity = buffer_size.unwrap_or(16);
        let (tx, rx) = broadcast::channel::<Bytes>(buffer_capacity);
        let url = url.to_string();

        let bg_handle = tokio::spawn(async move {
            loop {
                // Outer loop: Connection retry - runs forever
                match connect_async(&url).await {
                    Ok((ws_stream, _)) => {
                        debug!(%url, "framecast connected");
                        let (_, mut ws_receiver) = ws_stream.split();
                        // Inner loop: Message processing - runs until disconnect
                        loop {
                            match ws_receiver.next().await {
                                Some(Ok(Message::Binary(frame))) => {
                                    // Never fails: `self.receiver` keeps the channel open
                                    let _ = tx.send(frame);
                                }
                                Some(Ok(Message::Close(_))) | None => {
                                    warn!(%url, "connection closed by server");
                                    break;
                                }
                                Some(Ok(_)) => {} // Text, ping, pong: not part of the stream
                                Some(Err(e)) => {
                                    warn!(%url, error = %e, "WebSocket protocol error");
                                    break;
                                }
                            }
                        }
                    }
                    Err(e) => {
                        debug!(%url, error = %e, "framecast connect failed");
                    }
                }
                tokio::time::sleep(tokio::time::Duration::from_millis(poll_interval)).await;
            }
        });

        Self {
            receiver: rx,
            bg_handle,
        }
    }

    /// Creates independent stream of frames received from now on.
    /// Frames arriving while nobody is subscribed are discarded; the connection stays up.
    pub fn subscribe(&self) -> BroadcastStream<Bytes> {
        BroadcastStream::new(self.receiver.resubscribe())
    }
}

impl Drop for FrameClient {
    fn drop(&mut self) {
        self.bg_handle.abort();
    }
}
