//! Server network layer handling TCP connections and the event loop
//!
//! Every connection gets a reader task and a writer task. Readers decode
//! frames and forward them to the main loop over a channel; the main loop
//! owns the [`Gateway`] and is the only place room state changes. Writers
//! drain a per-connection queue, so a slow socket never blocks a room.

use crate::client_manager::ConnectionThrottle;
use crate::config::ServerConfig;
use crate::gateway::{Flow, Gateway};
use log::{debug, error, info, warn};
use shared::frame::{read_frame, write_frame, FrameError};
use shared::{Packet, PlayerId};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use tokio::io::AsyncWriteExt;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::interval;

/// Messages sent from connection tasks to the main server loop
#[derive(Debug)]
pub enum ServerMessage {
    PacketReceived { client_id: PlayerId, packet: Packet },
    /// A complete frame arrived but its payload did not decode
    MalformedPacket { client_id: PlayerId },
    ConnectionClosed { client_id: PlayerId },
}

/// Main server coordinating networking and the room gateway
pub struct Server {
    listener: TcpListener,
    gateway: Gateway,
    throttle: ConnectionThrottle,
    readers: HashMap<PlayerId, JoinHandle<()>>,
    housekeeping_interval: Duration,

    server_tx: mpsc::UnboundedSender<ServerMessage>,
    server_rx: mpsc::UnboundedReceiver<ServerMessage>,
}

impl Server {
    pub async fn new(config: ServerConfig) -> Result<Self, Box<dyn std::error::Error>> {
        config.validate()?;

        let listener = TcpListener::bind(&config.bind_addr).await?;
        info!("Server listening on {}", listener.local_addr()?);

        let (server_tx, server_rx) = mpsc::unbounded_channel();

        Ok(Server {
            listener,
            gateway: Gateway::new(&config),
            throttle: ConnectionThrottle::new(config.max_connects_per_ip, config.throttle_window),
            readers: HashMap::new(),
            housekeeping_interval: Duration::from_secs(1),
            server_tx,
            server_rx,
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Registers an accepted socket and spawns its reader and writer
    fn accept(&mut self, stream: TcpStream, addr: SocketAddr) {
        if !self.throttle.allow(addr.ip(), Instant::now()) {
            return;
        }
        if let Err(e) = stream.set_nodelay(true) {
            debug!("Failed to set TCP_NODELAY for {}: {}", addr, e);
        }

        let (reader, writer) = stream.into_split();
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(writer_task(writer, rx));

        // A refused connection only keeps its writer, which sends the refusal and exits.
        if let Some(client_id) = self.gateway.connect(addr, tx) {
            let handle = tokio::spawn(reader_task(client_id, reader, self.server_tx.clone()));
            self.readers.insert(client_id, handle);
        }
    }

    fn close(&mut self, client_id: PlayerId) {
        self.gateway.disconnect(client_id, Instant::now());
        if let Some(handle) = self.readers.remove(&client_id) {
            handle.abort();
        }
    }

    fn handle_message(&mut self, message: ServerMessage) {
        match message {
            ServerMessage::PacketReceived { client_id, packet } => {
                if self.gateway.handle_packet(client_id, packet) == Flow::Close {
                    self.close(client_id);
                }
            }
            ServerMessage::MalformedPacket { client_id } => {
                self.gateway.reject_malformed(client_id);
            }
            ServerMessage::ConnectionClosed { client_id } => {
                self.close(client_id);
            }
        }
    }

    fn housekeeping(&mut self) {
        let now = Instant::now();
        for client_id in self.gateway.housekeeping(now) {
            if let Some(handle) = self.readers.remove(&client_id) {
                handle.abort();
            }
        }
        self.throttle.prune(now);
    }

    /// Main server loop coordinating all operations
    pub async fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let mut housekeeping = interval(self.housekeeping_interval);

        info!("Server started successfully");

        loop {
            tokio::select! {
                result = self.listener.accept() => {
                    match result {
                        Ok((stream, addr)) => self.accept(stream, addr),
                        Err(e) => error!("Accept failed: {}", e),
                    }
                },

                message = self.server_rx.recv() => {
                    match message {
                        Some(message) => self.handle_message(message),
                        None => {
                            info!("Server shutting down");
                            break;
                        }
                    }
                },

                _ = housekeeping.tick() => {
                    self.housekeeping();

                    let clients = self.gateway.clients().len();
                    if clients > 0 {
                        debug!(
                            "{} clients, {} rooms",
                            clients,
                            self.gateway.registry().len()
                        );
                    }
                },
            }
        }

        Ok(())
    }
}

/// Decodes frames from one socket until it closes
async fn reader_task(
    client_id: PlayerId,
    mut reader: OwnedReadHalf,
    server_tx: mpsc::UnboundedSender<ServerMessage>,
) {
    loop {
        let message = match read_frame(&mut reader).await {
            Ok(packet) => ServerMessage::PacketReceived { client_id, packet },
            Err(e) if e.is_recoverable() => {
                warn!("Client {} sent an undecodable packet: {}", client_id, e);
                ServerMessage::MalformedPacket { client_id }
            }
            Err(FrameError::ConnectionClosed) => {
                debug!("Client {} closed the connection", client_id);
                break;
            }
            Err(e) => {
                warn!("Read error from client {}: {}", client_id, e);
                break;
            }
        };

        if server_tx.send(message).is_err() {
            return;
        }
    }

    let _ = server_tx.send(ServerMessage::ConnectionClosed { client_id });
}

/// Writes queued packets until the queue closes or a `Disconnected` is sent
async fn writer_task(mut writer: OwnedWriteHalf, mut rx: mpsc::UnboundedReceiver<Packet>) {
    while let Some(packet) = rx.recv().await {
        let last = matches!(packet, Packet::Disconnected { .. });
        if let Err(e) = write_frame(&mut writer, &packet).await {
            debug!("Write failed: {}", e);
            break;
        }
        if last {
            break;
        }
    }
    let _ = writer.shutdown().await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::PROTOCOL_VERSION;
    use tokio::io::AsyncWriteExt;
    use tokio::time::timeout;

    async fn start() -> SocketAddr {
        let config = ServerConfig {
            bind_addr: "127.0.0.1:0".to_string(),
            seed: Some(1),
            ..ServerConfig::default()
        };
        let mut server = Server::new(config).await.unwrap();
        let addr = server.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = server.run().await;
        });
        addr
    }

    async fn recv(stream: &mut TcpStream) -> Packet {
        timeout(Duration::from_secs(5), read_frame(stream))
            .await
            .expect("timed out waiting for a packet")
            .unwrap()
    }

    #[test]
    fn test_server_message_creation() {
        let msg = ServerMessage::PacketReceived {
            client_id: 7,
            packet: Packet::Ping,
        };
        match msg {
            ServerMessage::PacketReceived { client_id, packet } => {
                assert_eq!(client_id, 7);
                assert_eq!(packet, Packet::Ping);
            }
            _ => panic!("Unexpected message type"),
        }
    }

    #[tokio::test]
    async fn test_handshake_and_ping_over_tcp() {
        let addr = start().await;
        let mut stream = TcpStream::connect(addr).await.unwrap();

        write_frame(
            &mut stream,
            &Packet::Connect {
                client_version: PROTOCOL_VERSION,
            },
        )
        .await
        .unwrap();
        assert!(matches!(recv(&mut stream).await, Packet::Connected { .. }));

        write_frame(&mut stream, &Packet::Ping).await.unwrap();
        assert_eq!(recv(&mut stream).await, Packet::Pong);
    }

    #[tokio::test]
    async fn test_bad_payload_keeps_connection() {
        let addr = start().await;
        let mut stream = TcpStream::connect(addr).await.unwrap();

        write_frame(
            &mut stream,
            &Packet::Connect {
                client_version: PROTOCOL_VERSION,
            },
        )
        .await
        .unwrap();
        recv(&mut stream).await;

        stream
            .write_all(&[0, 0, 0, 4, 0xFF, 0xFF, 0xFF, 0xFF])
            .await
            .unwrap();
        assert_eq!(
            recv(&mut stream).await,
            Packet::Error {
                message: "Invalid packet".to_string()
            }
        );

        write_frame(&mut stream, &Packet::Ping).await.unwrap();
        assert_eq!(recv(&mut stream).await, Packet::Pong);
    }

    #[tokio::test]
    async fn test_wrong_version_is_disconnected() {
        let addr = start().await;
        let mut stream = TcpStream::connect(addr).await.unwrap();

        write_frame(&mut stream, &Packet::Connect { client_version: 0 })
            .await
            .unwrap();
        assert!(matches!(
            recv(&mut stream).await,
            Packet::Disconnected { .. }
        ));

        let next = timeout(Duration::from_secs(5), read_frame(&mut stream))
            .await
            .unwrap();
        assert!(matches!(next, Err(FrameError::ConnectionClosed)));
    }
}
