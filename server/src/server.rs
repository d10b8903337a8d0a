//! Bancho TCP server
//!
//! Accepts connections, frames the packets each peer sends and publishes
//! them through an [`EventManager`]. Packets are not interpreted here.

use std::future::Future;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use bytes::BytesMut;
use thiserror::Error;
use tokio::io::AsyncReadExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use wire::{Frame, FrameDecoder, FrameError, Limits};

use crate::cache::LruCache;
use crate::config::Config;
use crate::events::EventManager;

/// Server errors
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Bind failed on {addr}: {source}")]
    BindFailed {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Frame(#[from] FrameError),

    #[error("Connection closed with {0} bytes of an unfinished packet")]
    Truncated(usize),
}

pub type ServerResult<T> = Result<T, ServerError>;

/// Events emitted by the server
#[derive(Debug, Clone)]
pub enum ServerEvent {
    /// A peer has connected
    Connected { addr: SocketAddr },
    /// A complete packet arrived from a peer
    Packet { addr: SocketAddr, frame: Frame },
    /// A peer has disconnected
    Disconnected { addr: SocketAddr, reason: String },
}

impl ServerEvent {
    pub const CONNECTED: &'static str = "connected";
    pub const PACKET: &'static str = "packet";
    pub const DISCONNECTED: &'static str = "disconnected";

    /// Name the event is emitted under
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Connected { .. } => Self::CONNECTED,
            Self::Packet { .. } => Self::PACKET,
            Self::Disconnected { .. } => Self::DISCONNECTED,
        }
    }

    /// Address of the peer the event concerns
    pub const fn addr(&self) -> SocketAddr {
        match self {
            Self::Connected { addr }
            | Self::Packet { addr, .. }
            | Self::Disconnected { addr, .. } => *addr,
        }
    }
}

/// Traffic counters kept per peer host
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PeerStats {
    /// Connections opened
    pub connections: u64,
    /// Packets received
    pub packets: u64,
    /// Bytes received
    pub bytes_received: u64,
}

/// Shared table of per-host traffic counters
pub type PeerTable = Arc<Mutex<LruCache<IpAddr, PeerStats>>>;

#[derive(Clone)]
struct Shared {
    limits: Limits,
    events: Arc<EventManager<ServerEvent>>,
    peers: PeerTable,
}

impl Shared {
    async fn record(&self, ip: IpAddr, update: impl FnOnce(&mut PeerStats)) {
        let mut peers = self.peers.lock().await;
        if let Some(stats) = peers.get_mut(&ip) {
            update(stats);
            return;
        }
        let mut stats = PeerStats::default();
        update(&mut stats);
        if let Some((evicted, _)) = peers.insert(ip, stats) {
            tracing::trace!(%evicted, "peer stats evicted");
        }
    }

    /// Runs the handlers for `event` to completion, so one peer's events are
    /// handled in the order they happened.
    async fn dispatch(&self, event: ServerEvent) {
        let name = event.name();
        if let Some(task) = self.events.emit(name, event) {
            if let Err(e) = task.await {
                tracing::error!(event = name, error = %e, "event handler failed");
            }
        }
    }
}

/// Bancho TCP server
pub struct Server {
    listener: TcpListener,
    config: Config,
    shared: Shared,
}

impl Server {
    /// Binds the listener described by `config`.
    pub async fn bind(config: Config, events: EventManager<ServerEvent>) -> ServerResult<Self> {
        let addr = config.bind_addr();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| ServerError::BindFailed {
                addr: addr.clone(),
                source,
            })?;
        tracing::info!(
            addr = %listener.local_addr()?,
            name = %config.server_name,
            "server listening"
        );

        let shared = Shared {
            limits: config.limits(),
            events: Arc::new(events),
            peers: Arc::new(Mutex::new(LruCache::new(config.cache_capacity))),
        };
        Ok(Self {
            listener,
            config,
            shared,
        })
    }

    /// Address the listener is bound to
    pub fn local_addr(&self) -> ServerResult<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Handle to the per-host traffic counters
    pub fn peers(&self) -> PeerTable {
        self.shared.peers.clone()
    }

    /// Accepts connections until `shutdown` completes.
    ///
    /// Connections already accepted keep running on their own tasks.
    pub async fn run<F>(self, shutdown: F) -> ServerResult<()>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                result = self.listener.accept() => {
                    match result {
                        Ok((stream, addr)) => {
                            tracing::info!(%addr, "new connection");
                            let shared = self.shared.clone();
                            tokio::spawn(serve_connection(stream, addr, shared));
                        }
                        Err(e) => {
                            tracing::error!(error = %e, "accept failed");
                        }
                    }
                }
                () = &mut shutdown => {
                    tracing::info!("server shutdown requested");
                    break;
                }
            }
        }
        Ok(())
    }
}

async fn serve_connection(stream: TcpStream, addr: SocketAddr, shared: Shared) {
    shared
        .record(addr.ip(), |stats| stats.connections += 1)
        .await;
    shared.dispatch(ServerEvent::Connected { addr }).await;

    let reason = match read_frames(stream, addr, &shared).await {
        Ok(()) => "connection closed".to_string(),
        Err(e) => {
            tracing::warn!(%addr, error = %e, "dropping connection");
            e.to_string()
        }
    };

    tracing::info!(%addr, %reason, "peer disconnected");
    shared
        .dispatch(ServerEvent::Disconnected { addr, reason })
        .await;
}

async fn read_frames(mut stream: TcpStream, addr: SocketAddr, shared: &Shared) -> ServerResult<()> {
    let mut decoder = FrameDecoder::new(shared.limits.clone());
    let mut buf = BytesMut::with_capacity(4096);

    loop {
        let read = stream.read_buf(&mut buf).await?;
        if read == 0 {
            if decoder.is_mid_frame() || !buf.is_empty() {
                return Err(ServerError::Truncated(buf.len()));
            }
            return Ok(());
        }
        shared
            .record(addr.ip(), |stats| stats.bytes_received += read as u64)
            .await;

        while let Some(frame) = decoder.decode(&mut buf)? {
            tracing::debug!(%addr, id = frame.id, len = frame.len(), "packet received");
            shared.record(addr.ip(), |stats| stats.packets += 1).await;
            shared.dispatch(ServerEvent::Packet { addr, frame }).await;
        }
    }
}
