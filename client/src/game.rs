//! Client-side view of the room
//!
//! The server's room snapshot is always the truth. Actions the player has
//! sent but the server has not yet confirmed are kept in a small overlay so
//! the UI can show them immediately; the next snapshot replaces the overlay
//! wholesale.

use shared::{FinalAnswer, GameResult, Packet, Phase, Player, PlayerId, Role, Room};

/// Local actions not yet reflected in a server snapshot
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overlay {
    pub voted_for: Option<PlayerId>,
    pub final_answer: Option<FinalAnswer>,
    pub answered: bool,
}

impl Overlay {
    pub fn is_empty(&self) -> bool {
        *self == Overlay::default()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientGameState {
    /// Last room snapshot received from the server
    pub confirmed: Option<Room>,
    pub overlay: Overlay,
    pub player_id: Option<PlayerId>,
    pub role: Option<Role>,
    pub disease: Option<String>,
    pub last_error: Option<String>,
    pub results: Option<GameResult>,
}

/// Installs an authoritative snapshot: the overlay is dropped and everything
/// derived from the room is recomputed from it.
pub fn reconcile(local: &ClientGameState, authoritative: Room) -> ClientGameState {
    let mut next = local.clone();
    next.overlay = Overlay::default();

    if let Some(me) = local.player_id.and_then(|id| authoritative.player(id)) {
        if me.role.is_some() {
            next.role = me.role;
            next.disease = me.disease.clone();
        }
    }
    if authoritative.phase == Phase::Lobby {
        next.role = None;
        next.disease = None;
    }

    next.confirmed = Some(authoritative);
    next
}

impl ClientGameState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Option<Phase> {
        self.confirmed.as_ref().map(|room| room.phase)
    }

    /// This client's player in the confirmed room
    pub fn me(&self) -> Option<&Player> {
        let id = self.player_id?;
        self.confirmed.as_ref()?.player(id)
    }

    pub fn is_host(&self) -> bool {
        self.me().map_or(false, |p| p.is_host)
    }

    /// Records an action as sent, before the server has confirmed it
    pub fn predict(&mut self, action: &Packet) {
        match action {
            Packet::VotePlayer { target_id } | Packet::VoteFinal { target_id } => {
                self.overlay.voted_for = Some(*target_id);
            }
            Packet::SubmitFinalAnswer { answer } => {
                self.overlay.final_answer = Some(answer.clone());
            }
            Packet::SubmitAnswer { .. } => {
                self.overlay.answered = true;
            }
            _ => {}
        }
    }

    /// Applies a packet from the server
    pub fn apply(&mut self, packet: &Packet) {
        match packet {
            Packet::RoomCreated { room, player_id } | Packet::RoomJoined { room, player_id } => {
                self.player_id = Some(*player_id);
                self.results = None;
                self.last_error = None;
                *self = reconcile(self, room.clone());
            }
            Packet::RoomUpdated { room } => {
                *self = reconcile(self, room.clone());
            }
            Packet::RoleAssigned { role, disease } => {
                self.role = Some(*role);
                self.disease = disease.clone();
            }
            Packet::PhaseChanged { phase } => {
                if let Some(room) = self.confirmed.as_mut() {
                    room.phase = *phase;
                }
                self.overlay = Overlay::default();
            }
            Packet::PlayerEliminated { player_id } => {
                if let Some(player) = self
                    .confirmed
                    .as_mut()
                    .and_then(|room| room.player_mut(*player_id))
                {
                    player.is_eliminated = true;
                }
            }
            Packet::ChatMessage { message } => {
                if let Some(room) = self.confirmed.as_mut() {
                    if !room.chat_messages.iter().any(|m| m.id == message.id) {
                        room.chat_messages.push(message.clone());
                    }
                }
            }
            Packet::GameEnded { results } => {
                self.results = Some(results.clone());
            }
            Packet::Error { message } => {
                // Whatever we predicted was refused.
                self.last_error = Some(message.clone());
                self.overlay = Overlay::default();
            }
            _ => {}
        }
    }

    /// Confirmed room with pending local actions applied to our own player
    pub fn view(&self) -> Option<Room> {
        let mut room = self.confirmed.clone()?;
        if let Some(me) = self.player_id.and_then(|id| room.player_mut(id)) {
            if let Some(target) = self.overlay.voted_for {
                me.voted_for = Some(target);
            }
            if me.final_answer.is_none() {
                me.final_answer = self.overlay.final_answer.clone();
            }
            if self.overlay.answered {
                me.has_answered = true;
            }
        }
        Some(room)
    }

    /// Forgets the room after leaving it
    pub fn leave(&mut self) {
        let results = self.results.take();
        *self = ClientGameState::new();
        self.results = results;
    }
}
