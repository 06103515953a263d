use std::io;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::net::UdpSocket;
use tokio::task;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use slipway_frame::{encode, FrameDecoder, FrameStatus, END};

use crate::error::{BridgeError, Result};
use crate::probe::StatusProbe;
use crate::queue::SendQueue;
use crate::serial::{SerialConnector, SerialLink};

/// Receive buffer size for both channels.
const RECV_BUFFER_SIZE: usize = 4096;

/// Bridge endpoint configuration.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Local address to bind the UDP socket on.
    pub local: SocketAddr,
    /// Fixed remote endpoint all UDP traffic is sent to.
    pub remote: SocketAddr,
    /// Optional liveness-probe responder.
    pub probe: Option<StatusProbe>,
}

impl BridgeConfig {
    /// Configuration binding the given local port on all interfaces.
    pub fn on_port(local_port: u16, remote: SocketAddr) -> Self {
        Self {
            local: (Ipv4Addr::UNSPECIFIED, local_port).into(),
            remote,
            probe: None,
        }
    }
}

/// One UDP ⇄ serial bridging session.
///
/// Owns the UDP socket, the (at most one) serial channel, the serial decode
/// backlog and one outbound queue per direction. The two ingress loops,
/// [`run_udp`](Self::run_udp) and [`run_serial`](Self::run_serial), are
/// driven as separate tasks; their completions may interleave in any order,
/// so every shared structure sits behind its own lock, held only for the
/// mutation and never across an await or a blocking transfer.
///
/// A bridge is bound to one session lifetime: after a fatal serial error it
/// is discarded wholesale and a fresh instance is built, never repaired in
/// place.
pub struct Bridge {
    socket: UdpSocket,
    remote: SocketAddr,
    probe: Option<StatusProbe>,
    connector: Box<dyn SerialConnector>,
    serial: Mutex<Option<SerialHandle>>,
    decoder: Mutex<FrameDecoder>,
    udp_out: Mutex<SendQueue>,
    serial_out: Mutex<SendQueue>,
}

/// Shared handle to an open serial link plus its teardown token.
#[derive(Clone)]
struct SerialHandle {
    link: Arc<Mutex<Box<dyn SerialLink>>>,
    cancel: CancellationToken,
}

/// The locks here guard plain byte state; a panic mid-mutation leaves
/// nothing worth salvaging, so poisoning is stripped instead of propagated.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Bridge {
    /// Bind the UDP endpoint and assemble an idle session.
    pub async fn bind(config: BridgeConfig, connector: Box<dyn SerialConnector>) -> Result<Self> {
        let socket = UdpSocket::bind(config.local)
            .await
            .map_err(|source| BridgeError::Bind {
                addr: config.local,
                source,
            })?;
        if let Ok(local) = socket.local_addr() {
            info!(%local, remote = %config.remote, "UDP endpoint bound");
        }
        Ok(Self {
            socket,
            remote: config.remote,
            probe: config.probe,
            connector,
            serial: Mutex::new(None),
            decoder: Mutex::new(FrameDecoder::new()),
            udp_out: Mutex::new(SendQueue::default()),
            serial_out: Mutex::new(SendQueue::default()),
        })
    }

    /// Local address of the bound UDP socket.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Whether a status-probe responder is configured.
    pub fn is_status_probe_configured(&self) -> bool {
        self.probe.is_some()
    }

    /// Whether the serial channel is currently open.
    pub fn is_serial_open(&self) -> bool {
        lock(&self.serial).is_some()
    }

    /// Open the serial channel. Only legal while the channel is closed.
    pub fn open(&self, name: &str) -> Result<()> {
        let mut slot = lock(&self.serial);
        if slot.is_some() {
            return Err(BridgeError::SerialAlreadyOpen);
        }
        let link = self
            .connector
            .connect(name)
            .map_err(|source| BridgeError::SerialOpen {
                name: name.to_string(),
                source,
            })?;
        *slot = Some(SerialHandle {
            link: Arc::new(Mutex::new(link)),
            cancel: CancellationToken::new(),
        });
        info!(name, "serial channel open");
        Ok(())
    }

    /// Close the serial channel, cancelling any outstanding operation
    /// before the handle is released. A no-op while closed.
    pub fn close(&self) {
        if let Some(handle) = lock(&self.serial).take() {
            handle.cancel.cancel();
            info!("serial channel closed");
        }
    }

    fn serial_handle(&self) -> Option<SerialHandle> {
        lock(&self.serial).clone()
    }

    /// UDP ingress loop.
    ///
    /// Receive errors are logged and the loop re-arms; they are never
    /// fatal. The only exit is a serial write failure escalating out of the
    /// forwarding path.
    pub async fn run_udp(&self) -> Result<()> {
        let mut buf = vec![0u8; RECV_BUFFER_SIZE];
        loop {
            match self.socket.recv_from(&mut buf).await {
                Ok((len, from)) => {
                    trace!(len, %from, "UDP datagram received");
                    self.handle_datagram(&buf[..len]).await?;
                }
                Err(err) => {
                    warn!(error = %err, "UDP receive failed, continuing");
                }
            }
        }
    }

    async fn handle_datagram(&self, datagram: &[u8]) -> Result<()> {
        if let Some(probe) = &self.probe {
            if probe.matches(datagram) {
                debug!("status probe request intercepted");
                self.send_udp(&probe.response(self.is_serial_open())).await;
                return Ok(());
            }
        }

        if !self.is_serial_open() {
            // Absence of serial is an implicit negative probe result; the
            // datagram is never forwarded while the channel is closed.
            match &self.probe {
                Some(probe) => self.send_udp(&probe.response(false)).await,
                None => debug!(len = datagram.len(), "serial channel closed, datagram dropped"),
            }
            return Ok(());
        }

        let frame = encode(datagram);
        lock(&self.serial_out).push(&frame);
        self.flush_serial().await
    }

    /// Serial ingress loop.
    ///
    /// Runs until the channel fails, disconnects or is closed, all of which
    /// are fatal to the session. Decoded frames are relayed to the remote
    /// UDP peer.
    pub async fn run_serial(&self) -> Result<()> {
        let mut buf = vec![0u8; RECV_BUFFER_SIZE];
        loop {
            let Some(handle) = self.serial_handle() else {
                return Err(BridgeError::SerialClosed);
            };
            if handle.cancel.is_cancelled() {
                return Err(BridgeError::SerialClosed);
            }

            let link = handle.link.clone();
            let (outcome, returned) = task::spawn_blocking(move || {
                let mut buf = buf;
                let outcome = lock(link.as_ref()).read(&mut buf);
                (outcome, buf)
            })
            .await
            .map_err(BridgeError::Task)?;
            buf = returned;

            match outcome {
                Ok(0) => return Err(BridgeError::SerialDisconnected),
                Ok(len) => self.ingest_serial_chunk(&buf[..len]).await,
                Err(err) if err.kind() == io::ErrorKind::TimedOut => {}
                Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
                Err(err) => return Err(BridgeError::SerialRead(err)),
            }
        }
    }

    async fn ingest_serial_chunk(&self, chunk: &[u8]) {
        // A chunk that does not begin at a frame boundary is a torn read;
        // resynchronize by dropping it wholesale.
        if chunk.first() != Some(&END) {
            trace!(len = chunk.len(), "discarding serial chunk without leading delimiter");
            return;
        }

        let (status, payload) = {
            let mut decoder = lock(&self.decoder);
            decoder.append(chunk);
            decoder.next_frame()
        };

        match status {
            FrameStatus::Valid => {
                trace!(len = payload.len(), "frame decoded");
                self.send_udp(&payload).await;
            }
            status => trace!(?status, "no complete frame yet"),
        }
    }

    /// Queue bytes for the remote UDP peer and drive the write engine.
    async fn send_udp(&self, data: &[u8]) {
        lock(&self.udp_out).push(data);
        self.flush_udp().await;
    }

    /// Drain the UDP outbound queue, one coalesced write at a time.
    ///
    /// Send failures are transient: the batch is logged and dropped, and
    /// draining continues.
    async fn flush_udp(&self) {
        loop {
            let Some(batch) = lock(&self.udp_out).begin_write() else {
                return;
            };
            if let Err(err) = self.socket.send_to(&batch, self.remote).await {
                warn!(error = %err, len = batch.len(), "UDP send failed, dropping batch");
            }
            lock(&self.udp_out).complete_write();
        }
    }

    /// Drain the serial outbound queue, one coalesced write at a time.
    ///
    /// Any write failure is fatal to the session.
    async fn flush_serial(&self) -> Result<()> {
        loop {
            let Some(batch) = lock(&self.serial_out).begin_write() else {
                return Ok(());
            };
            let Some(handle) = self.serial_handle() else {
                return Err(BridgeError::SerialClosed);
            };

            let link = handle.link.clone();
            let written: io::Result<()> =
                task::spawn_blocking(move || lock(link.as_ref()).write_all(&batch))
                    .await
                    .map_err(BridgeError::Task)?;
            written.map_err(BridgeError::SerialWrite)?;
            lock(&self.serial_out).complete_write();
        }
    }
}

impl std::fmt::Debug for Bridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bridge")
            .field("remote", &self.remote)
            .field("probe", &self.probe.is_some())
            .field("serial_open", &self.is_serial_open())
            .finish()
    }
}
