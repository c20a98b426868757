//! Connection gateway
//!
//! Owns the room registry and the connection pool and is driven by the
//! server's single event loop, so no locking is needed. Every inbound packet
//! is routed to exactly one room action; a failed action is answered with an
//! `Error` packet to the sender and never touches anyone else.

use crate::broadcast::{self, project};
use crate::client_manager::ClientManager;
use crate::config::{RoomSettings, ServerConfig};
use crate::error::{GameError, GameResult};
use crate::game::{GameRoom, Notice};
use crate::registry::{clean_code, RoomRegistry};
use log::{debug, error, info, warn};
use shared::{FinalAnswer, Packet, PlayerId, PROTOCOL_VERSION};
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// What the network layer should do with a connection after a packet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Close,
}

pub struct Gateway {
    registry: RoomRegistry,
    clients: ClientManager,
    settings: RoomSettings,
    idle_timeout: Duration,
}

impl Gateway {
    pub fn new(config: &ServerConfig) -> Self {
        Self {
            registry: RoomRegistry::new(config.seed),
            clients: ClientManager::new(config.max_clients),
            settings: config.rooms,
            idle_timeout: config.idle_timeout,
        }
    }

    pub fn registry(&self) -> &RoomRegistry {
        &self.registry
    }

    pub fn clients(&self) -> &ClientManager {
        &self.clients
    }

    /// Registers a new connection. None means the server is full; the
    /// caller is told so through `tx` before it is dropped.
    pub fn connect(
        &mut self,
        addr: SocketAddr,
        tx: mpsc::UnboundedSender<Packet>,
    ) -> Option<PlayerId> {
        let refusal = tx.clone();
        let id = self.clients.add_client(addr, tx);
        if id.is_none() {
            let _ = refusal.send(Packet::Disconnected {
                reason: "Server full".to_string(),
            });
        }
        id
    }

    /// Processes one packet from connection `conn`
    pub fn handle_packet(&mut self, conn: PlayerId, packet: Packet) -> Flow {
        self.clients.touch(conn);
        debug!("Client {} sent {}", conn, packet.name());

        let handshaken = match self.clients.get(conn) {
            Some(client) => client.handshaken,
            None => return Flow::Close,
        };

        if !handshaken {
            return self.handshake(conn, packet);
        }

        match packet {
            Packet::Ping => {
                self.clients.send(conn, Packet::Pong);
                Flow::Continue
            }
            Packet::Disconnect => Flow::Close,
            Packet::Connect { .. } => {
                debug!("Client {} repeated its handshake", conn);
                Flow::Continue
            }
            packet => {
                let name = packet.name();
                if let Err(e) = self.route(conn, packet) {
                    self.report(conn, name, e);
                }
                Flow::Continue
            }
        }
    }

    fn handshake(&mut self, conn: PlayerId, packet: Packet) -> Flow {
        let reason = match packet {
            Packet::Connect { client_version } if client_version == PROTOCOL_VERSION => {
                if let Some(client) = self.clients.get_mut(conn) {
                    client.handshaken = true;
                }
                self.clients.send(conn, Packet::Connected { client_id: conn });
                return Flow::Continue;
            }
            Packet::Connect { client_version } => {
                warn!(
                    "Client {} uses protocol {} (server speaks {})",
                    conn, client_version, PROTOCOL_VERSION
                );
                format!(
                    "Incompatible client version {}, expected {}",
                    client_version, PROTOCOL_VERSION
                )
            }
            other => {
                warn!("Client {} sent {} before connecting", conn, other.name());
                "Handshake required".to_string()
            }
        };

        self.clients.send(conn, Packet::Disconnected { reason });
        Flow::Close
    }

    /// Answers a frame whose payload could not be decoded
    pub fn reject_malformed(&mut self, conn: PlayerId) {
        self.clients.touch(conn);
        self.report(conn, "packet", GameError::validation("Invalid packet"));
    }

    fn report(&self, conn: PlayerId, action: &str, err: GameError) {
        match &err {
            GameError::Internal(detail) => {
                error!("{} from client {} failed: {}", action, conn, detail)
            }
            _ => warn!(
                "Rejected {} from client {} ({}): {}",
                action,
                conn,
                err.category(),
                err
            ),
        }
        self.clients.send(
            conn,
            Packet::Error {
                message: err.to_string(),
            },
        );
    }

    fn route(&mut self, conn: PlayerId, packet: Packet) -> GameResult<()> {
        match packet {
            Packet::CreateRoom { player_name } => self.create_room(conn, &player_name),
            Packet::JoinRoom {
                room_code,
                player_name,
            } => self.join_room(conn, &room_code, &player_name),
            Packet::LeaveRoom => self.leave_room(conn),
            Packet::StartGame => self.in_room(conn, |room| room.start_game(conn)),
            Packet::RevealRole => self.in_room(conn, |room| room.reveal_role(conn)),
            Packet::SendChat { message } => {
                self.in_room(conn, |room| room.send_chat(conn, &message))
            }
            Packet::SubmitAnswer { answer } => {
                self.in_room(conn, |room| room.submit_answer(conn, &answer))
            }
            Packet::VotePlayer { target_id } => {
                self.in_room(conn, |room| room.submit_vote(conn, target_id))
            }
            Packet::SubmitFinalAnswer { answer } => self.submit_final_answer(conn, answer),
            Packet::VoteFinal { target_id } => {
                self.in_room(conn, |room| room.submit_final_vote(conn, target_id))
            }
            other => Err(GameError::validation(format!(
                "Unexpected {} from a client",
                other.name()
            ))),
        }
    }

    /// Runs an action against the caller's room and publishes the outcome
    fn in_room<F>(&mut self, conn: PlayerId, action: F) -> GameResult<()>
    where
        F: FnOnce(&mut GameRoom) -> GameResult<Vec<Notice>>,
    {
        let room = self.registry.room_for_mut(conn)?;
        let notices = action(room)?;
        broadcast::publish(&self.clients, room.room(), notices);
        Ok(())
    }

    fn submit_final_answer(&mut self, conn: PlayerId, answer: FinalAnswer) -> GameResult<()> {
        self.in_room(conn, |room| room.submit_final_answer(conn, answer))
    }

    fn create_room(&mut self, conn: PlayerId, player_name: &str) -> GameResult<()> {
        let room = self.registry.create(conn, player_name, self.settings)?;
        self.clients.send(
            conn,
            Packet::RoomCreated {
                room: project(room.room(), conn),
                player_id: conn,
            },
        );
        Ok(())
    }

    fn join_room(&mut self, conn: PlayerId, room_code: &str, player_name: &str) -> GameResult<()> {
        let code = clean_code(room_code);
        if code.is_empty() {
            return Err(GameError::validation("Room code is required"));
        }
        if let Some(current) = self.registry.room_of(conn) {
            return Err(GameError::unauthorized(format!(
                "You are already in room {}",
                current
            )));
        }

        let room = self
            .registry
            .get_mut(&code)
            .ok_or_else(|| GameError::not_found("Room not found"))?;

        let (restored, notices) = match room.restore_seat(conn, player_name) {
            Some(old_id) => (Some(old_id), Vec::new()),
            None => (None, room.add_player(conn, player_name)?),
        };

        if let Some(old_id) = restored {
            self.registry.unbind(old_id);
        }
        self.registry.bind(conn, &code);

        let room = self
            .registry
            .get(&code)
            .ok_or_else(|| GameError::internal(format!("room {} vanished during join", code)))?
            .room();

        self.clients.send(
            conn,
            Packet::RoomJoined {
                room: project(room, conn),
                player_id: conn,
            },
        );
        if let Some(player) = room.player(conn).filter(|_| restored.is_some()) {
            if let Some(role) = player.role {
                self.clients.send(
                    conn,
                    Packet::RoleAssigned {
                        role,
                        disease: player.disease.clone(),
                    },
                );
            }
        }

        broadcast::publish(&self.clients, room, notices);
        Ok(())
    }

    /// Removes `player_id` from its room, dropping the room once empty
    fn leave_room(&mut self, player_id: PlayerId) -> GameResult<()> {
        let code = self
            .registry
            .unbind(player_id)
            .ok_or_else(|| GameError::not_found("You are not in a room"))?;

        let room = self
            .registry
            .get_mut(&code)
            .ok_or_else(|| GameError::internal(format!("player {} bound to missing room {}", player_id, code)))?;
        let notices = room.remove_player(player_id)?;

        if room.is_empty() {
            self.registry.remove_if_empty(&code);
        } else if room.is_abandoned() {
            info!("Room {} finished with only held seats left", code);
            self.registry.remove(&code);
        } else {
            broadcast::publish(&self.clients, room.room(), notices);
        }
        Ok(())
    }

    /// Deals with a player whose connection is gone. Mid-game the seat is
    /// held for a reconnect; otherwise the player leaves straight away.
    fn depart(&mut self, player_id: PlayerId, now: Instant) {
        let code = match self.registry.room_of(player_id) {
            Some(code) => code.to_string(),
            None => return,
        };

        let in_progress = self
            .registry
            .get(&code)
            .map_or(false, |room| room.phase().in_progress());

        let result = if in_progress {
            self.hold_seat(player_id, &code, now)
        } else {
            self.leave_room(player_id)
        };

        if let Err(e) = result {
            error!("Failed to release player {}: {}", player_id, e);
        }
    }

    fn hold_seat(&mut self, player_id: PlayerId, code: &str, now: Instant) -> GameResult<()> {
        let room = self
            .registry
            .get_mut(code)
            .ok_or_else(|| GameError::internal(format!("room {} missing", code)))?;
        let notices = room.mark_disconnected(player_id, now)?;

        info!("Holding seat of player {} in room {}", player_id, code);
        broadcast::publish(&self.clients, room.room(), notices);
        Ok(())
    }

    /// Tears down a closed connection
    pub fn disconnect(&mut self, conn: PlayerId, now: Instant) {
        if self.clients.remove_client(&conn) {
            self.depart(conn, now);
        }
    }

    /// Periodic maintenance: idle connections and expired held seats.
    /// Returns the connections that were dropped for idling.
    pub fn housekeeping(&mut self, now: Instant) -> Vec<PlayerId> {
        let timed_out = self.clients.check_timeouts(self.idle_timeout);
        for conn in &timed_out {
            warn!("Client {} timed out", conn);
            self.depart(*conn, now);
        }

        for code in self.registry.codes() {
            let expired = match self.registry.get(&code) {
                Some(room) => room.expired_seats(now),
                None => continue,
            };
            for player_id in expired {
                info!("Seat of player {} in room {} expired", player_id, code);
                if let Err(e) = self.leave_room(player_id) {
                    error!("Failed to release seat {}: {}", player_id, e);
                }
            }
        }

        timed_out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::Phase;

    struct Conn {
        id: PlayerId,
        rx: mpsc::UnboundedReceiver<Packet>,
    }

    impl Conn {
        fn drain(&mut self) -> Vec<Packet> {
            let mut packets = Vec::new();
            while let Ok(packet) = self.rx.try_recv() {
                packets.push(packet);
            }
            packets
        }

        fn last_error(&mut self) -> Option<String> {
            self.drain().into_iter().rev().find_map(|p| match p {
                Packet::Error { message } => Some(message),
                _ => None,
            })
        }
    }

    fn gateway() -> Gateway {
        let config = ServerConfig {
            seed: Some(17),
            ..ServerConfig::default()
        };
        Gateway::new(&config)
    }

    fn open(gateway: &mut Gateway) -> Conn {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = gateway
            .connect("127.0.0.1:5000".parse().unwrap(), tx)
            .unwrap();
        let mut conn = Conn { id, rx };
        gateway.handle_packet(
            id,
            Packet::Connect {
                client_version: PROTOCOL_VERSION,
            },
        );
        assert_eq!(conn.drain(), vec![Packet::Connected { client_id: id }]);
        conn
    }

    fn room_code(gateway: &Gateway, conn: &Conn) -> String {
        gateway.registry().room_of(conn.id).unwrap().to_string()
    }

    /// Host plus three joiners in one lobby
    fn lobby(gateway: &mut Gateway) -> (String, Vec<Conn>) {
        let mut conns = vec![open(gateway)];
        gateway.handle_packet(
            conns[0].id,
            Packet::CreateRoom {
                player_name: "Alice".to_string(),
            },
        );
        let code = room_code(gateway, &conns[0]);

        for name in ["Bob", "Cara", "Dan"] {
            let conn = open(gateway);
            gateway.handle_packet(
                conn.id,
                Packet::JoinRoom {
                    room_code: code.to_lowercase(),
                    player_name: name.to_string(),
                },
            );
            conns.push(conn);
        }
        for conn in &mut conns {
            conn.drain();
        }
        (code, conns)
    }

    #[test]
    fn test_handshake_version_mismatch() {
        let mut gateway = gateway();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let id = gateway.connect("127.0.0.1:5000".parse().unwrap(), tx).unwrap();

        let flow = gateway.handle_packet(id, Packet::Connect { client_version: 99 });
        assert_eq!(flow, Flow::Close);
        assert!(matches!(rx.try_recv(), Ok(Packet::Disconnected { .. })));
    }

    #[test]
    fn test_actions_require_handshake() {
        let mut gateway = gateway();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let id = gateway.connect("127.0.0.1:5000".parse().unwrap(), tx).unwrap();

        let flow = gateway.handle_packet(
            id,
            Packet::CreateRoom {
                player_name: "Alice".to_string(),
            },
        );
        assert_eq!(flow, Flow::Close);
        assert!(matches!(rx.try_recv(), Ok(Packet::Disconnected { .. })));
        assert!(gateway.registry().is_empty());
    }

    #[test]
    fn test_ping() {
        let mut gateway = gateway();
        let mut conn = open(&mut gateway);
        assert_eq!(gateway.handle_packet(conn.id, Packet::Ping), Flow::Continue);
        assert_eq!(conn.drain(), vec![Packet::Pong]);
    }

    #[test]
    fn test_server_full() {
        let config = ServerConfig {
            max_clients: 1,
            ..ServerConfig::default()
        };
        let mut gateway = Gateway::new(&config);
        let (tx1, _rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();
        let addr: SocketAddr = "127.0.0.1:5000".parse().unwrap();

        assert!(gateway.connect(addr, tx1).is_some());
        assert!(gateway.connect(addr, tx2).is_none());
        assert!(matches!(rx2.try_recv(), Ok(Packet::Disconnected { .. })));
    }

    #[test]
    fn test_create_and_join() {
        let mut gateway = gateway();
        let mut host = open(&mut gateway);
        gateway.handle_packet(
            host.id,
            Packet::CreateRoom {
                player_name: "Alice".to_string(),
            },
        );
        match host.drain().as_slice() {
            [Packet::RoomCreated { room, player_id }] => {
                assert_eq!(*player_id, host.id);
                assert_eq!(room.players.len(), 1);
                assert_eq!(room.host_id, host.id);
            }
            other => panic!("unexpected {:?}", other),
        }

        let code = room_code(&gateway, &host);
        let mut guest = open(&mut gateway);
        gateway.handle_packet(
            guest.id,
            Packet::JoinRoom {
                room_code: format!("  {} ", code.to_lowercase()),
                player_name: "Bob".to_string(),
            },
        );

        let packets = guest.drain();
        assert!(matches!(
            &packets[0],
            Packet::RoomJoined { room, player_id } if *player_id == guest.id && room.players.len() == 2
        ));
        assert!(host
            .drain()
            .iter()
            .any(|p| matches!(p, Packet::RoomUpdated { room } if room.players.len() == 2)));
    }

    #[test]
    fn test_errors_go_to_sender_only() {
        let mut gateway = gateway();
        let (_code, mut conns) = lobby(&mut gateway);

        gateway.handle_packet(conns[1].id, Packet::StartGame);
        assert_eq!(
            conns[1].last_error().as_deref(),
            Some("Only host can start the game")
        );
        let rejected = conns[1].id;
        for conn in conns.iter_mut().filter(|c| c.id != rejected) {
            assert!(conn.drain().is_empty());
        }
    }

    #[test]
    fn test_unknown_room_and_malformed_packets() {
        let mut gateway = gateway();
        let mut conn = open(&mut gateway);

        gateway.handle_packet(
            conn.id,
            Packet::JoinRoom {
                room_code: "NOPE123".to_string(),
                player_name: "Bob".to_string(),
            },
        );
        assert_eq!(conn.last_error().as_deref(), Some("Room not found"));

        gateway.reject_malformed(conn.id);
        assert_eq!(conn.last_error().as_deref(), Some("Invalid packet"));

        gateway.handle_packet(conn.id, Packet::StartGame);
        assert_eq!(conn.last_error().as_deref(), Some("You are not in a room"));
    }

    #[test]
    fn test_lobby_disconnect_promotes_host() {
        let mut gateway = gateway();
        let (code, mut conns) = lobby(&mut gateway);

        gateway.disconnect(conns[0].id, Instant::now());
        let room = gateway.registry().get(&code).unwrap().room();
        assert_eq!(room.players.len(), 3);
        assert_eq!(room.host_id, conns[1].id);
        assert!(conns[1]
            .drain()
            .iter()
            .any(|p| matches!(p, Packet::RoomUpdated { .. })));
    }

    #[test]
    fn test_last_player_leaving_destroys_room() {
        let mut gateway = gateway();
        let mut host = open(&mut gateway);
        gateway.handle_packet(
            host.id,
            Packet::CreateRoom {
                player_name: "Alice".to_string(),
            },
        );
        gateway.handle_packet(host.id, Packet::LeaveRoom);
        assert!(gateway.registry().is_empty());
        assert!(host.drain().iter().all(|p| !matches!(p, Packet::Error { .. })));
    }

    #[test]
    fn test_mid_game_reconnect_restores_seat() {
        let mut gateway = gateway();
        let (code, mut conns) = lobby(&mut gateway);
        gateway.handle_packet(conns[0].id, Packet::StartGame);

        let now = Instant::now();
        let dropped = conns.remove(2);
        gateway.disconnect(dropped.id, now);
        {
            let room = gateway.registry().get(&code).unwrap().room();
            assert_eq!(room.phase, Phase::RoleAssignment);
            assert!(!room.player(dropped.id).unwrap().connected);
        }

        let mut back = open(&mut gateway);
        gateway.handle_packet(
            back.id,
            Packet::JoinRoom {
                room_code: code.clone(),
                player_name: "cara".to_string(),
            },
        );
        let packets = back.drain();
        assert!(matches!(packets[0], Packet::RoomJoined { player_id, .. } if player_id == back.id));
        assert!(packets
            .iter()
            .any(|p| matches!(p, Packet::RoleAssigned { .. })));

        let room = gateway.registry().get(&code).unwrap().room();
        assert!(room.player(back.id).unwrap().connected);
        assert!(room.player(dropped.id).is_none());
        assert_eq!(gateway.registry().room_of(back.id), Some(code.as_str()));
        assert_eq!(gateway.registry().room_of(dropped.id), None);
    }

    #[test]
    fn test_expired_seat_is_released() {
        let mut gateway = gateway();
        let (code, conns) = lobby(&mut gateway);
        gateway.handle_packet(conns[0].id, Packet::StartGame);

        let now = Instant::now();
        gateway.disconnect(conns[3].id, now);
        gateway.housekeeping(now);
        assert_eq!(gateway.registry().get(&code).unwrap().room().players.len(), 4);

        let later = now + RoomSettings::default().reconnect_grace;
        gateway.housekeeping(later);
        let room = gateway.registry().get(&code).unwrap().room();
        assert_eq!(room.players.len(), 3);
        assert_eq!(gateway.registry().room_of(conns[3].id), None);
    }
}
