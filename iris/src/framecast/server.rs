//! HTTP + WebSocket server for the frame broadcast.
//! `ws_path` upgrades to a send-only WebSocket; every other request is served from `asset_dir`.

use super::frame::FrameSource;
use super::registry::{ConnectionInfo, ConnectionSet};
use super::ticker::spawn_broadcast_loop;
use crate::config::BroadcastConfig;
use crate::iris_error_cause;
use crate::utils::OrError;
use axum::extract::ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade, close_code};
use axum::extract::{ConnectInfo, OriginalUri, State};
use axum::http::{HeaderMap, header};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};

#[derive(Clone)]
struct AppState {
    connections: ConnectionSet,
    cancel: CancellationToken,
}

/// Bound but not yet serving. `serve` runs the HTTP loop and the broadcast loop until cancelled.
pub struct FramecastServer {
    config: BroadcastConfig,
    listener: TcpListener,
    local_addr: SocketAddr,
    source: Arc<FrameSource>,
    connections: ConnectionSet,
}

impl FramecastServer {
    /// Loads `config.image_path` and binds `config.host:config.port`.
    /// Error: invalid config, unreadable image, or bind failure.
    pub async fn bind(config: BroadcastConfig) -> OrError<Self> {
        config.validate()?;
        let source = FrameSource::open(&config.image_path, config.jpeg_quality)?;
        Self::bind_with_source(config, source).await
    }

    /// Same as `bind` with an already loaded image; `config.image_path` is ignored.
    pub async fn bind_with_source(config: BroadcastConfig, source: FrameSource) -> OrError<Self> {
        config.validate()?;
        let address = SocketAddr::new(config.host, config.port);
        let listener = TcpListener::bind(address).await.map_err(|e| {
            iris_error_cause!("framecast::FramecastServer", "bind",
                &format!("failed to bind {}", address), e)
        })?;
        let local_addr = listener.local_addr().map_err(|e| {
            iris_error_cause!("framecast::FramecastServer", "bind", "failed to read local address", e)
        })?;
        let (width, height) = source.dimensions();
        info!(%local_addr, ws_path = %config.ws_path, width, height, "framecast bound");

        let connections = ConnectionSet::new(config.client_queue);
        Ok(Self {
            config,
            listener,
            local_addr,
            source: Arc::new(source),
            connections,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn connections(&self) -> ConnectionSet {
        self.connections.clone()
    }

    pub fn source(&self) -> Arc<FrameSource> {
        Arc::clone(&self.source)
    }

    fn router(&self, cancel: CancellationToken) -> Router {
        let state = AppState {
            connections: self.connections.clone(),
            cancel,
        };
        Router::new()
            .route(&self.config.ws_path, get(ws_handler))
            .fallback_service(ServeDir::new(&self.config.asset_dir))
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }

    /// Serves HTTP and broadcasts frames until `cancel` fires, then shuts down gracefully.
    /// Open WebSockets are sent a Close frame and leave the connection set.
    pub async fn serve(self, cancel: CancellationToken) -> OrError<()> {
        let router = self.router(cancel.clone());
        let ticker = spawn_broadcast_loop(
            Arc::clone(&self.source),
            self.connections.clone(),
            self.config.interval,
            cancel.clone(),
        );

        let result = axum::serve(
            self.listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(cancel.clone().cancelled_owned())
        .await;

        cancel.cancel();
        let _ = ticker.await;
        result.map_err(|e| iris_error_cause!("framecast::FramecastServer", "serve", "http server failed", e))
    }
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    ConnectInfo(remote_addr): ConnectInfo<SocketAddr>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let info = ConnectionInfo {
        request_uri: uri.to_string(),
        remote_addr,
        credentials: credentials_from_headers(&headers),
    };
    ws.on_upgrade(move |socket| handle_socket(socket, info, state.connections, state.cancel))
}

/// Per-client task: forwards queued frames, discards anything the client sends.
/// Ends on client close, socket error, or server shutdown (the client then gets a Close frame).
async fn handle_socket(
    socket: WebSocket,
    info: ConnectionInfo,
    connections: ConnectionSet,
    cancel: CancellationToken,
) {
    let (id, mut frames) = match connections.connect(info.clone()).await {
        Ok(member) => member,
        Err(e) => {
            error!(%info, error = %e, "failed to register connection");
            return;
        }
    };
    info!(
        id,
        uri = %info.request_uri,
        remote = %info.remote_addr,
        credentials = info.credentials.as_deref().unwrap_or("none"),
        "client connected"
    );

    let (mut ws_tx, mut ws_rx) = socket.split();
    let writer = async {
        while let Some(frame) = frames.recv().await {
            if ws_tx.send(Message::Binary(frame)).await.is_err() {
                break;
            }
        }
    };
    let reader = async {
        while let Some(message) = ws_rx.next().await {
            match message {
                Ok(Message::Close(_)) | Err(_) => break,
                Ok(_) => {} // send-only protocol
            }
        }
    };
    let shutting_down = tokio::select! {
        _ = writer => false,
        _ = reader => false,
        _ = cancel.cancelled() => true,
    };
    if shutting_down {
        let close = CloseFrame {
            code: close_code::AWAY,
            reason: "server shutting down".into(),
        };
        if let Err(e) = ws_tx.send(Message::Close(Some(close))).await {
            debug!(id, error = %e, "close frame not delivered");
        }
    }

    if let Err(e) = connections.disconnect(id).await {
        error!(id, error = %e, "failed to deregister connection");
    }
    info!(id, uri = %info.request_uri, remote = %info.remote_addr, "client disconnected");
}

/// User name from `Authorization: Basic`, or the scheme name for other schemes. Secrets are dropped.
fn credentials_from_headers(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ').unwrap_or((value, ""));
    if !scheme.eq_ignore_ascii_case("basic") {
        return Some(scheme.to_ascii_lowercase());
    }
    let decoded = STANDARD.decode(token.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let user = decoded.split(':').next().unwrap_or_default();
    if user.is_empty() { None } else { Some(user.to_string()) }
}
