//! Connection management for the room server
//!
//! This module handles the server-side bookkeeping of connected clients:
//! - Connection lifecycle (connect, disconnect, idle timeout)
//! - Outbound packet routing through each connection's writer channel
//! - Capacity limits and per-address connection throttling
//!
//! A connection id doubles as the player id for every room action the
//! connection performs.

use log::{info, warn};
use shared::{Packet, PlayerId};
use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// Represents a connected client and the channel feeding its writer task
#[derive(Debug)]
pub struct Client {
    /// Unique client identifier assigned by the server
    pub id: PlayerId,
    /// Remote address, used for logging and throttling
    pub addr: SocketAddr,
    /// Last time we received any packet from this client
    pub last_seen: Instant,
    /// Set once the client completed the version handshake
    pub handshaken: bool,
    tx: mpsc::UnboundedSender<Packet>,
}

impl Client {
    pub fn new(id: PlayerId, addr: SocketAddr, tx: mpsc::UnboundedSender<Packet>) -> Self {
        Self {
            id,
            addr,
            last_seen: Instant::now(),
            handshaken: false,
            tx,
        }
    }

    /// Queues a packet for this client's writer task.
    ///
    /// Returns false if the writer has already shut down, which means the
    /// connection is on its way out and the packet can be dropped.
    pub fn send(&self, packet: Packet) -> bool {
        self.tx.send(packet).is_ok()
    }

    /// Checks if the client has exceeded the idle timeout
    pub fn is_timed_out(&self, timeout: Duration) -> bool {
        self.last_seen.elapsed() > timeout
    }
}

/// Manages all connected clients
///
/// The ClientManager provides centralized control over client connections,
/// enforces server capacity limits, and is the only way the rest of the
/// server reaches a socket.
pub struct ClientManager {
    /// Connected clients indexed by their unique ID
    clients: HashMap<PlayerId, Client>,
    /// Next available client ID for new connections
    next_client_id: PlayerId,
    /// Maximum number of concurrent clients allowed
    max_clients: usize,
}

impl ClientManager {
    /// Creates a new client manager with the given capacity limit.
    /// Client IDs start from 1 and increment for each new connection.
    pub fn new(max_clients: usize) -> Self {
        Self {
            clients: HashMap::new(),
            next_client_id: 1,
            max_clients,
        }
    }

    /// Attempts to add a new client connection
    ///
    /// Returns Some(client_id) if successful, None if server is at capacity.
    pub fn add_client(
        &mut self,
        addr: SocketAddr,
        tx: mpsc::UnboundedSender<Packet>,
    ) -> Option<PlayerId> {
        if self.clients.len() >= self.max_clients {
            warn!("Rejecting {}: server full ({} clients)", addr, self.max_clients);
            return None;
        }

        let client_id = self.next_client_id;
        self.next_client_id += 1;

        info!("Client {} connected from {}", client_id, addr);
        self.clients.insert(client_id, Client::new(client_id, addr, tx));

        Some(client_id)
    }

    /// Removes a client from the server. Dropping the client closes its
    /// writer channel, which ends the writer task.
    pub fn remove_client(&mut self, client_id: &PlayerId) -> bool {
        if let Some(client) = self.clients.remove(client_id) {
            info!("Client {} disconnected", client.id);
            true
        } else {
            false
        }
    }

    pub fn get(&self, client_id: PlayerId) -> Option<&Client> {
        self.clients.get(&client_id)
    }

    pub fn get_mut(&mut self, client_id: PlayerId) -> Option<&mut Client> {
        self.clients.get_mut(&client_id)
    }

    /// Records activity from a client
    pub fn touch(&mut self, client_id: PlayerId) {
        if let Some(client) = self.clients.get_mut(&client_id) {
            client.last_seen = Instant::now();
        }
    }

    /// Sends a packet to one client. Unknown ids are ignored.
    pub fn send(&self, client_id: PlayerId, packet: Packet) -> bool {
        match self.clients.get(&client_id) {
            Some(client) => client.send(packet),
            None => false,
        }
    }

    /// Checks for and removes timed-out clients
    ///
    /// Returns the removed client IDs so the rooms they were in can be
    /// told about the departure.
    pub fn check_timeouts(&mut self, timeout: Duration) -> Vec<PlayerId> {
        let timed_out: Vec<PlayerId> = self
            .clients
            .iter()
            .filter(|(_, client)| client.is_timed_out(timeout))
            .map(|(id, _)| *id)
            .collect();

        for client_id in &timed_out {
            if let Some(client) = self.clients.get(client_id) {
                client.send(Packet::Disconnected {
                    reason: "Connection timed out".to_string(),
                });
            }
            self.remove_client(client_id);
        }

        timed_out
    }

    /// Returns the number of currently connected clients
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

/// Limits how many connections one address may open within a window
pub struct ConnectionThrottle {
    limit: u32,
    window: Duration,
    attempts: HashMap<IpAddr, (Instant, u32)>,
}

impl ConnectionThrottle {
    /// A limit of 0 disables throttling
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            limit,
            window,
            attempts: HashMap::new(),
        }
    }

    /// Records an attempt from `ip` and reports whether it is allowed
    pub fn allow(&mut self, ip: IpAddr, now: Instant) -> bool {
        if self.limit == 0 {
            return true;
        }

        let entry = self.attempts.entry(ip).or_insert((now, 0));
        if now.saturating_duration_since(entry.0) >= self.window {
            *entry = (now, 0);
        }

        if entry.1 >= self.limit {
            warn!("Throttling connections from {}", ip);
            return false;
        }
        entry.1 += 1;
        true
    }

    /// Forgets windows that have fully elapsed
    pub fn prune(&mut self, now: Instant) {
        let window = self.window;
        self.attempts
            .retain(|_, (start, _)| now.saturating_duration_since(*start) < window);
    }
}
