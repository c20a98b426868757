use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

pub mod frame;

/// Player ids are the server-assigned connection ids.
pub type PlayerId = u32;

pub const PROTOCOL_VERSION: u32 = 1;
pub const ROOM_CODE_LEN: usize = 7;
pub const ROOM_CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
pub const DEFAULT_MIN_PLAYERS: usize = 4;
pub const DEFAULT_MAX_PLAYERS: usize = 12;
/// Once this many or fewer players remain active the game moves to the final round.
pub const FINAL_ROUND_THRESHOLD: usize = 3;
pub const MAX_NAME_LEN: usize = 24;
pub const MAX_CHAT_LEN: usize = 500;

pub const SURVIVAL_POINTS: u32 = 10;
pub const FINAL_ANSWER_POINTS: u32 = 50;
pub const FINAL_VOTE_POINTS: u32 = 20;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Lobby,
    RoleAssignment,
    Discussion,
    Voting,
    FinalRound,
    VotingFinal,
    Results,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Lobby => "lobby",
            Phase::RoleAssignment => "role_assignment",
            Phase::Discussion => "discussion",
            Phase::Voting => "voting",
            Phase::FinalRound => "final_round",
            Phase::VotingFinal => "voting_final",
            Phase::Results => "results",
        }
    }

    /// True once the host has started the game and until results are in.
    pub fn in_progress(&self) -> bool {
        !matches!(self, Phase::Lobby | Phase::Results)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    MainDiagnose,
    DifferentialDiagnose,
    DoctorGrey,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Role::MainDiagnose => "Main diagnose",
            Role::DifferentialDiagnose => "Differential diagnose",
            Role::DoctorGrey => "Doctor Grey",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct FinalAnswer {
    pub treatment: String,
    pub innovation: String,
}

impl FinalAnswer {
    /// Both free-text fields are required.
    pub fn is_complete(&self) -> bool {
        !self.treatment.trim().is_empty() && !self.innovation.trim().is_empty()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub role: Option<Role>,
    pub disease: Option<String>,
    pub is_host: bool,
    pub is_eliminated: bool,
    /// False while the seat is held for a reconnect.
    pub connected: bool,
    pub has_revealed: bool,
    pub has_answered: bool,
    pub voted_for: Option<PlayerId>,
    pub final_answer: Option<FinalAnswer>,
    pub points: u32,
}

impl Player {
    pub fn new(id: PlayerId, name: impl Into<String>, is_host: bool) -> Self {
        Self {
            id,
            name: name.into(),
            role: None,
            disease: None,
            is_host,
            is_eliminated: false,
            connected: true,
            has_revealed: false,
            has_answered: false,
            voted_for: None,
            final_answer: None,
            points: 0,
        }
    }

    pub fn is_active(&self) -> bool {
        !self.is_eliminated
    }

    /// Case-insensitive name comparison used for uniqueness and seat restore.
    pub fn has_name(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.trim().to_lowercase()
    }
}

/// One vote, kept in the order it was cast.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct Ballot {
    pub voter_id: PlayerId,
    pub target_id: PlayerId,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DiseaseKind {
    Main,
    Differential,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Disease {
    pub id: String,
    pub name: String,
    pub kind: DiseaseKind,
    pub description: String,
    pub symptoms: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Chat,
    System,
    Answer,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ChatMessage {
    pub id: u64,
    /// None for system messages.
    pub player_id: Option<PlayerId>,
    pub player_name: String,
    pub message: String,
    pub timestamp: u64,
    pub kind: MessageKind,
}

/// The shared state-shape contract for one game room.
///
/// The server owns the authoritative copy; clients receive projections of it
/// in `RoomCreated`, `RoomJoined` and `RoomUpdated` packets.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Room {
    pub code: String,
    pub phase: Phase,
    pub round: u32,
    pub players: Vec<Player>,
    pub host_id: PlayerId,
    pub diseases: Vec<Disease>,
    pub min_players: usize,
    pub max_players: usize,
    pub current_votes: Vec<Ballot>,
    pub final_votes: Vec<Ballot>,
    pub eliminated_this_round: Option<PlayerId>,
    pub chat_messages: Vec<ChatMessage>,
}

impl Room {
    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    pub fn player_by_name(&self, name: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.has_name(name))
    }

    pub fn active_players(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| p.is_active())
    }

    pub fn eliminated_players(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| p.is_eliminated)
    }

    pub fn active_count(&self) -> usize {
        self.active_players().count()
    }

    pub fn host(&self) -> Option<&Player> {
        self.players.iter().find(|p| p.is_host)
    }

    pub fn current_vote_of(&self, voter: PlayerId) -> Option<PlayerId> {
        self.current_votes
            .iter()
            .find(|b| b.voter_id == voter)
            .map(|b| b.target_id)
    }

    pub fn final_vote_of(&self, voter: PlayerId) -> Option<PlayerId> {
        self.final_votes
            .iter()
            .find(|b| b.voter_id == voter)
            .map(|b| b.target_id)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Reward {
    pub title: String,
    pub icon: String,
    pub points: u32,
    pub description: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct GameResult {
    pub winner: Player,
    pub final_ranking: Vec<Player>,
    pub rewards: Vec<(PlayerId, Reward)>,
}

impl GameResult {
    pub fn reward_for(&self, id: PlayerId) -> Option<&Reward> {
        self.rewards
            .iter()
            .find(|(player_id, _)| *player_id == id)
            .map(|(_, reward)| reward)
    }
}

/// Every message exchanged between client and server.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub enum Packet {
    // Connection management
    Connect {
        client_version: u32,
    },
    Connected {
        client_id: PlayerId,
    },
    Ping,
    Pong,
    Disconnect,
    Disconnected {
        reason: String,
    },

    // Client to server
    CreateRoom {
        player_name: String,
    },
    JoinRoom {
        room_code: String,
        player_name: String,
    },
    StartGame,
    RevealRole,
    SendChat {
        message: String,
    },
    SubmitAnswer {
        answer: String,
    },
    VotePlayer {
        target_id: PlayerId,
    },
    SubmitFinalAnswer {
        answer: FinalAnswer,
    },
    VoteFinal {
        target_id: PlayerId,
    },
    LeaveRoom,

    // Server to client
    RoomCreated {
        room: Room,
        player_id: PlayerId,
    },
    RoomJoined {
        room: Room,
        player_id: PlayerId,
    },
    RoomUpdated {
        room: Room,
    },
    GameStarted,
    RoleAssigned {
        role: Role,
        disease: Option<String>,
    },
    PhaseChanged {
        phase: Phase,
    },
    PlayerEliminated {
        player_id: PlayerId,
    },
    FinalAnswerSubmitted {
        player_id: PlayerId,
    },
    VoteRecorded {
        voter_id: PlayerId,
        target_id: PlayerId,
    },
    FinalVoteRecorded {
        voter_id: PlayerId,
        target_id: PlayerId,
    },
    GameEnded {
        results: GameResult,
    },
    ChatMessage {
        message: ChatMessage,
    },
    Error {
        message: String,
    },
}

impl Packet {
    /// Short event name used in logs, matching the event channel names.
    pub fn name(&self) -> &'static str {
        match self {
            Packet::Connect { .. } => "connect",
            Packet::Connected { .. } => "connected",
            Packet::Ping => "ping",
            Packet::Pong => "pong",
            Packet::Disconnect => "disconnect",
            Packet::Disconnected { .. } => "disconnected",
            Packet::CreateRoom { .. } => "create-room",
            Packet::JoinRoom { .. } => "join-room",
            Packet::StartGame => "start-game",
            Packet::RevealRole => "reveal-role",
            Packet::SendChat { .. } => "send-chat",
            Packet::SubmitAnswer { .. } => "submit-answer",
            Packet::VotePlayer { .. } => "vote-player",
            Packet::SubmitFinalAnswer { .. } => "submit-final-answer",
            Packet::VoteFinal { .. } => "vote-final",
            Packet::LeaveRoom => "leave-room",
            Packet::RoomCreated { .. } => "room-created",
            Packet::RoomJoined { .. } => "room-joined",
            Packet::RoomUpdated { .. } => "room-updated",
            Packet::GameStarted => "game-started",
            Packet::RoleAssigned { .. } => "role-assigned",
            Packet::PhaseChanged { .. } => "phase-changed",
            Packet::PlayerEliminated { .. } => "player-eliminated",
            Packet::FinalAnswerSubmitted { .. } => "final-answer-submitted",
            Packet::VoteRecorded { .. } => "vote-recorded",
            Packet::FinalVoteRecorded { .. } => "final-vote-recorded",
            Packet::GameEnded { .. } => "game-ended",
            Packet::ChatMessage { .. } => "chat-message",
            Packet::Error { .. } => "error",
        }
    }
}

/// Current wall-clock time in milliseconds
pub fn get_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::from_secs(0))
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_room() -> Room {
        let mut host = Player::new(1, "Alice", true);
        host.points = 30;
        let mut bob = Player::new(2, "Bob", false);
        bob.is_eliminated = true;
        Room {
            code: "ABC1234".to_string(),
            phase: Phase::Voting,
            round: 2,
            players: vec![host, bob, Player::new(3, "Cara", false)],
            host_id: 1,
            diseases: Vec::new(),
            min_players: DEFAULT_MIN_PLAYERS,
            max_players: DEFAULT_MAX_PLAYERS,
            current_votes: vec![Ballot {
                voter_id: 3,
                target_id: 1,
            }],
            final_votes: Vec::new(),
            eliminated_this_round: Some(2),
            chat_messages: Vec::new(),
        }
    }

    #[test]
    fn test_player_creation() {
        let player = Player::new(7, "Dana", false);
        assert_eq!(player.id, 7);
        assert!(player.is_active());
        assert!(player.connected);
        assert_eq!(player.points, 0);
        assert!(player.role.is_none());
    }

    #[test]
    fn test_name_match_is_case_insensitive() {
        let player = Player::new(1, "Alice", true);
        assert!(player.has_name("alice"));
        assert!(player.has_name("  ALICE "));
        assert!(!player.has_name("Alicia"));
    }

    #[test]
    fn test_room_lookups() {
        let room = sample_room();
        assert_eq!(room.host().map(|p| p.id), Some(1));
        assert_eq!(room.active_count(), 2);
        assert_eq!(room.eliminated_players().count(), 1);
        assert_eq!(room.current_vote_of(3), Some(1));
        assert_eq!(room.current_vote_of(1), None);
        assert_eq!(room.player_by_name("cara").map(|p| p.id), Some(3));
    }

    #[test]
    fn test_final_answer_completeness() {
        let answer = FinalAnswer {
            treatment: "Antibiotics".to_string(),
            innovation: " ".to_string(),
        };
        assert!(!answer.is_complete());

        let answer = FinalAnswer {
            treatment: "Antibiotics".to_string(),
            innovation: "Early screening".to_string(),
        };
        assert!(answer.is_complete());
    }

    #[test]
    fn test_phase_progress() {
        assert!(!Phase::Lobby.in_progress());
        assert!(Phase::Voting.in_progress());
        assert!(!Phase::Results.in_progress());
        assert_eq!(Phase::VotingFinal.to_string(), "voting_final");
    }

    #[test]
    fn test_packet_serialization_room_updated() {
        let packet = Packet::RoomUpdated {
            room: sample_room(),
        };
        let serialized = bincode::serialize(&packet).unwrap();
        let deserialized: Packet = bincode::deserialize(&serialized).unwrap();

        match deserialized {
            Packet::RoomUpdated { room } => {
                assert_eq!(room.players.len(), 3);
                assert_eq!(room.phase, Phase::Voting);
                assert_eq!(room.current_votes.len(), 1);
                assert_eq!(room.eliminated_this_round, Some(2));
            }
            _ => panic!("Wrong packet type after deserialization"),
        }
    }

    #[test]
    fn test_room_snapshot_as_json() {
        let room = sample_room();
        let json = serde_json::to_string(&room).unwrap();
        assert!(json.contains("\"phase\":\"voting\""));

        let restored: Room = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, room);
    }

    #[test]
    fn test_reward_lookup() {
        let room = sample_room();
        let result = GameResult {
            winner: room.players[0].clone(),
            final_ranking: room.players.clone(),
            rewards: vec![(
                1,
                Reward {
                    title: "Champion".to_string(),
                    icon: "crown".to_string(),
                    points: 75,
                    description: "Medical diagnosis champion".to_string(),
                },
            )],
        };
        assert_eq!(result.reward_for(1).map(|r| r.points), Some(75));
        assert!(result.reward_for(2).is_none());
    }

    #[test]
    fn test_packet_names() {
        assert_eq!(Packet::VoteFinal { target_id: 1 }.name(), "vote-final");
        assert_eq!(Packet::LeaveRoom.name(), "leave-room");
        assert_eq!(
            Packet::Error {
                message: String::new()
            }
            .name(),
            "error"
        );
    }
}
