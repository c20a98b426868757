//! Room synchronization
//!
//! After every successful mutation the whole room is pushed to each of its
//! connected players. The push is per recipient: until the game ends, a
//! player only sees their own secret role and disease, plus those of players
//! who have already been eliminated.

use crate::client_manager::ClientManager;
use crate::game::{Audience, Notice};
use log::debug;
use shared::{Packet, Phase, PlayerId, Room};

/// The view of `room` that `viewer` is entitled to
pub fn project(room: &Room, viewer: PlayerId) -> Room {
    let mut view = room.clone();
    if view.phase == Phase::Results {
        return view;
    }

    view.diseases.clear();
    for player in view
        .players
        .iter_mut()
        .filter(|p| p.id != viewer && !p.is_eliminated)
    {
        player.role = None;
        player.disease = None;
    }
    view
}

/// Delivers the notices produced by one room operation
pub fn dispatch(clients: &ClientManager, room: &Room, notices: Vec<Notice>) {
    for notice in notices {
        match notice.audience {
            Audience::Player(id) => {
                clients.send(id, notice.packet);
            }
            Audience::Room => {
                for player in room.players.iter().filter(|p| p.connected) {
                    clients.send(player.id, notice.packet.clone());
                }
            }
        }
    }
}

/// Sends every connected player their projection of the room
pub fn sync_room(clients: &ClientManager, room: &Room) {
    debug!("Syncing room {} ({} players)", room.code, room.players.len());
    for player in room.players.iter().filter(|p| p.connected) {
        clients.send(
            player.id,
            Packet::RoomUpdated {
                room: project(room, player.id),
            },
        );
    }
}

/// Delivers notices, then the room snapshot that reflects them
pub fn publish(clients: &ClientManager, room: &Room, notices: Vec<Notice>) {
    dispatch(clients, room, notices);
    sync_room(clients, room);
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{Disease, DiseaseKind, Player, Role};
    use tokio::sync::mpsc;

    fn sample_room() -> Room {
        let mut players = vec![
            Player::new(1, "Alice", true),
            Player::new(2, "Bob", false),
            Player::new(3, "Cara", false),
        ];
        players[0].role = Some(Role::MainDiagnose);
        players[0].disease = Some("Tuberculosis".to_string());
        players[1].role = Some(Role::DifferentialDiagnose);
        players[1].disease = Some("Pneumonia".to_string());
        players[2].role = Some(Role::DoctorGrey);
        players[2].is_eliminated = true;

        Room {
            code: "ABC1234".to_string(),
            phase: Phase::Discussion,
            round: 2,
            players,
            host_id: 1,
            diseases: vec![Disease {
                id: "1".to_string(),
                name: "Tuberculosis".to_string(),
                kind: DiseaseKind::Main,
                description: String::new(),
                symptoms: Vec::new(),
            }],
            min_players: 4,
            max_players: 12,
            current_votes: Vec::new(),
            final_votes: Vec::new(),
            eliminated_this_round: Some(3),
            chat_messages: Vec::new(),
        }
    }

    #[test]
    fn test_projection_hides_active_secrets() {
        let room = sample_room();
        let view = project(&room, 1);

        assert_eq!(view.player(1).unwrap().role, Some(Role::MainDiagnose));
        assert_eq!(view.player(2).unwrap().role, None);
        assert_eq!(view.player(2).unwrap().disease, None);
        assert_eq!(view.player(3).unwrap().role, Some(Role::DoctorGrey));
        assert!(view.diseases.is_empty());

        // Everything else mirrors the authoritative room.
        assert_eq!(view.players.len(), room.players.len());
        assert_eq!(view.phase, room.phase);
        assert_eq!(view.chat_messages.len(), room.chat_messages.len());
    }

    #[test]
    fn test_results_are_unredacted() {
        let mut room = sample_room();
        room.phase = Phase::Results;
        assert_eq!(project(&room, 1), room);
    }

    #[test]
    fn test_sync_skips_disconnected_players() {
        let mut room = sample_room();
        room.players[1].connected = false;

        let mut clients = ClientManager::new(4);
        let addr = "127.0.0.1:9000".parse().unwrap();
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();
        clients.add_client(addr, tx1);
        clients.add_client(addr, tx2);

        sync_room(&clients, &room);

        match rx1.try_recv().unwrap() {
            Packet::RoomUpdated { room: view } => {
                assert_eq!(view.player(1).unwrap().disease.as_deref(), Some("Tuberculosis"))
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(rx2.try_recv().is_err());
    }

    #[test]
    fn test_dispatch_targets_audience() {
        let room = sample_room();
        let mut clients = ClientManager::new(4);
        let addr = "127.0.0.1:9000".parse().unwrap();
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();
        clients.add_client(addr, tx1);
        clients.add_client(addr, tx2);

        dispatch(
            &clients,
            &room,
            vec![
                Notice::to(2, Packet::FinalAnswerSubmitted { player_id: 2 }),
                Notice::room(Packet::GameStarted),
            ],
        );

        assert_eq!(rx1.try_recv().unwrap(), Packet::GameStarted);
        assert_eq!(
            rx2.try_recv().unwrap(),
            Packet::FinalAnswerSubmitted { player_id: 2 }
        );
        assert_eq!(rx2.try_recv().unwrap(), Packet::GameStarted);
    }
}
