//! Connection registry owned by a single task.
//! Socket handlers and the broadcast loop send `Command`s over a channel; membership changes and
//! broadcast iteration never overlap.

use crate::iris_error;
use crate::utils::OrError;
use bytes::Bytes;
use std::collections::BTreeMap;
use std::fmt::{self, Display};
use std::net::SocketAddr;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot};
use tracing::trace;

pub type ConnectionId = u64;

/// What the server knows about a client at upgrade time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionInfo {
    pub request_uri: String,
    pub remote_addr: SocketAddr,
    /// User name from an `Authorization` header, if any. Secrets are never kept.
    pub credentials: Option<String>,
}

impl Display for ConnectionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} : {}", self.request_uri, self.remote_addr)
    }
}

/// Outcome of one broadcast: clients that got the frame queued, and clients that missed it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    pub delivered: usize,
    pub dropped: usize,
}

enum Command {
    Connect {
        info: ConnectionInfo,
        reply: oneshot::Sender<(ConnectionId, mpsc::Receiver<Bytes>)>,
    },
    Disconnect {
        id: ConnectionId,
        reply: oneshot::Sender<Option<ConnectionInfo>>,
    },
    Broadcast {
        frame: Bytes,
        reply: oneshot::Sender<BroadcastReport>,
    },
    Snapshot {
        reply: oneshot::Sender<Vec<(ConnectionId, ConnectionInfo)>>,
    },
    Len {
        reply: oneshot::Sender<usize>,
    },
}

struct Member {
    info: ConnectionInfo,
    outbound: mpsc::Sender<Bytes>,
}

struct Registry {
    next_id: ConnectionId,
    queue_capacity: usize,
    members: BTreeMap<ConnectionId, Member>,
}

impl Registry {
    fn handle(&mut self, command: Command) {
        match command {
            Command::Connect { info, reply } => {
                let id = self.next_id;
                self.next_id += 1;
                let (outbound, frames) = mpsc::channel(self.queue_capacity);
                self.members.insert(id, Member { info, outbound });
                if reply.send((id, frames)).is_err() {
                    // Caller went away before learning its id
                    self.members.remove(&id);
                }
            }
            Command::Disconnect { id, reply } => {
                let removed = self.members.remove(&id).map(|member| member.info);
                let _ = reply.send(removed);
            }
            Command::Broadcast { frame, reply } => {
                let mut report = BroadcastReport::default();
                for (id, member) in &self.members {
                    match member.outbound.try_send(frame.clone()) {
                        Ok(()) => report.delivered += 1,
                        Err(TrySendError::Full(_)) => {
                            trace!(id, "client queue full, frame dropped");
                            report.dropped += 1;
                        }
                        Err(TrySendError::Closed(_)) => {
                            trace!(id, "client closing, frame dropped");
                            report.dropped += 1;
                        }
                    }
                }
                let _ = reply.send(report);
            }
            Command::Snapshot { reply } => {
                let members = self
                    .members
                    .iter()
                    .map(|(id, member)| (*id, member.info.clone()))
                    .collect();
                let _ = reply.send(members);
            }
            Command::Len { reply } => {
                let _ = reply.send(self.members.len());
            }
        }
    }
}

/// Handle to the set of currently open client connections. Cheap to clone.
/// The owner task exits once every handle is dropped.
#[derive(Clone)]
pub struct ConnectionSet {
    commands: mpsc::UnboundedSender<Command>,
}

impl ConnectionSet {
    /// Spawns the owner task. Each member gets an outbound queue of `queue_capacity` frames.
    /// Must be called inside a tokio runtime.
    pub fn new(queue_capacity: usize) -> Self {
        let (commands, mut rx) = mpsc::unbounded_channel();
        let mut registry = Registry {
            next_id: 0,
            queue_capacity: queue_capacity.max(1),
            members: BTreeMap::new(),
        };
        tokio::spawn(async move {
            while let Some(command) = rx.recv().await {
                registry.handle(command);
            }
        });
        Self { commands }
    }

    /// Adds a connection. Returns its id and the queue its frames arrive on.
    pub async fn connect(&self, info: ConnectionInfo) -> OrError<(ConnectionId, mpsc::Receiver<Bytes>)> {
        let (reply, response) = oneshot::channel();
        self.request(Command::Connect { info, reply }, response, "connect").await
    }

    /// Removes a connection. `None` if `id` is not a member (already removed or never added).
    pub async fn disconnect(&self, id: ConnectionId) -> OrError<Option<ConnectionInfo>> {
        let (reply, response) = oneshot::channel();
        self.request(Command::Disconnect { id, reply }, response, "disconnect").await
    }

    /// Queues `frame` for every member at the time the command is handled. Never waits on a client.
    pub async fn broadcast(&self, frame: Bytes) -> OrError<BroadcastReport> {
        let (reply, response) = oneshot::channel();
        self.request(Command::Broadcast { frame, reply }, response, "broadcast").await
    }

    /// Current members, ordered by id.
    pub async fn snapshot(&self) -> OrError<Vec<(ConnectionId, ConnectionInfo)>> {
        let (reply, response) = oneshot::channel();
        self.request(Command::Snapshot { reply }, response, "snapshot").await
    }

    /// Member count. Checked by the broadcast loop every tick.
    pub async fn len(&self) -> OrError<usize> {
        let (reply, response) = oneshot::channel();
        self.request(Command::Len { reply }, response, "len").await
    }

    async fn request<R>(
        &self,
        command: Command,
        response: oneshot::Receiver<R>,
        method: &str,
    ) -> OrError<R> {
        self.commands.send(command).map_err(|_| {
            iris_error!("framecast::ConnectionSet", "request", &format!("{}: registry closed", method))
        })?;
        response.await.map_err(|_| {
            iris_error!("framecast::ConnectionSet", "request", &format!("{}: registry dropped reply", method))
        })
    }
}
