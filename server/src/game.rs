//! Authoritative state machine for a single room
//!
//! Every mutation goes through a [`GameRoom`] method that either rejects the
//! action without touching state or applies it completely and returns the
//! packets it produced. Phase advances happen inside the call that completes
//! the quorum, so there is never a window where quorum is met but the phase
//! has not moved.

use crate::assignment::{assign_roles, default_catalog};
use crate::config::RoomSettings;
use crate::error::{GameError, GameResult};
use crate::tally;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;
use shared::{
    get_timestamp, Ballot, ChatMessage, Disease, FinalAnswer, GameResult as Results, MessageKind,
    Packet, Phase, Player, PlayerId, Reward, Role, Room, FINAL_ANSWER_POINTS,
    FINAL_ROUND_THRESHOLD, FINAL_VOTE_POINTS, MAX_CHAT_LEN, MAX_NAME_LEN, SURVIVAL_POINTS,
};
use std::collections::HashMap;
use std::time::Instant;

/// Recipient of a packet produced by a room operation
#[derive(Debug, Clone, PartialEq)]
pub enum Audience {
    Player(PlayerId),
    Room,
}

/// A packet to deliver once the operation that produced it has completed
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub audience: Audience,
    pub packet: Packet,
}

impl Notice {
    pub fn to(player_id: PlayerId, packet: Packet) -> Self {
        Self {
            audience: Audience::Player(player_id),
            packet,
        }
    }

    pub fn room(packet: Packet) -> Self {
        Self {
            audience: Audience::Room,
            packet,
        }
    }
}

/// Trims a player name and checks its length
pub fn clean_name(name: &str) -> GameResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(GameError::validation("Player name is required"));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(GameError::validation(format!(
            "Player name must be at most {} characters",
            MAX_NAME_LEN
        )));
    }
    Ok(name.to_string())
}

fn clean_text(text: &str, what: &str) -> GameResult<String> {
    let text = text.trim();
    if text.is_empty() {
        return Err(GameError::validation(format!("{} cannot be empty", what)));
    }
    if text.chars().count() > MAX_CHAT_LEN {
        return Err(GameError::validation(format!(
            "{} must be at most {} characters",
            what, MAX_CHAT_LEN
        )));
    }
    Ok(text.to_string())
}

pub struct GameRoom {
    room: Room,
    settings: RoomSettings,
    catalog: Vec<Disease>,
    rng: StdRng,
    next_message_id: u64,
    /// Seats held for players whose connection dropped mid-game
    away_since: HashMap<PlayerId, Instant>,
    results: Option<Results>,
}

impl GameRoom {
    /// Creates a room in the lobby with `host_id` as its only player
    pub fn new(
        code: String,
        host_id: PlayerId,
        host_name: &str,
        settings: RoomSettings,
        seed: u64,
    ) -> GameResult<Self> {
        let name = clean_name(host_name)?;

        let room = Room {
            code,
            phase: Phase::Lobby,
            round: 0,
            players: vec![Player::new(host_id, name, true)],
            host_id,
            diseases: Vec::new(),
            min_players: settings.min_players,
            max_players: settings.max_players,
            current_votes: Vec::new(),
            final_votes: Vec::new(),
            eliminated_this_round: None,
            chat_messages: Vec::new(),
        };

        Ok(Self {
            room,
            settings,
            catalog: default_catalog(),
            rng: StdRng::seed_from_u64(seed),
            next_message_id: 1,
            away_since: HashMap::new(),
            results: None,
        })
    }

    pub fn with_catalog(mut self, catalog: Vec<Disease>) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn room(&self) -> &Room {
        &self.room
    }

    pub fn code(&self) -> &str {
        &self.room.code
    }

    pub fn phase(&self) -> Phase {
        self.room.phase
    }

    pub fn results(&self) -> Option<&Results> {
        self.results.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.room.players.is_empty()
    }

    /// A finished game where only held seats remain
    pub fn is_abandoned(&self) -> bool {
        self.room.phase == Phase::Results && self.room.players.iter().all(|p| !p.connected)
    }

    pub fn contains(&self, player_id: PlayerId) -> bool {
        self.room.player(player_id).is_some()
    }

    fn player(&self, player_id: PlayerId) -> GameResult<&Player> {
        self.room
            .player(player_id)
            .ok_or_else(|| GameError::not_found("You are not in this room"))
    }

    fn push_message(&mut self, author: Option<PlayerId>, text: String, kind: MessageKind) -> ChatMessage {
        let player_name = match author.and_then(|id| self.room.player(id)) {
            Some(p) => p.name.clone(),
            None => "System".to_string(),
        };

        let message = ChatMessage {
            id: self.next_message_id,
            player_id: author,
            player_name,
            message: text,
            timestamp: get_timestamp(),
            kind,
        };
        self.next_message_id += 1;
        self.room.chat_messages.push(message.clone());
        message
    }

    fn system_message(&mut self, text: String, notices: &mut Vec<Notice>) {
        let message = self.push_message(None, text, MessageKind::System);
        notices.push(Notice::room(Packet::ChatMessage { message }));
    }

    /// Adds a new player in the lobby
    pub fn add_player(&mut self, player_id: PlayerId, name: &str) -> GameResult<Vec<Notice>> {
        let name = clean_name(name)?;

        if self.room.phase != Phase::Lobby {
            return Err(GameError::unauthorized("Game already in progress"));
        }
        if self.contains(player_id) {
            return Err(GameError::unauthorized("You are already in this room"));
        }
        if self.room.players.len() >= self.room.max_players {
            return Err(GameError::unauthorized("Room is full"));
        }
        if self.room.player_by_name(&name).is_some() {
            return Err(GameError::validation(
                "Player name already taken in this room",
            ));
        }

        info!("Player {} ({}) joined room {}", name, player_id, self.room.code);
        self.room.players.push(Player::new(player_id, name.clone(), false));

        let mut notices = Vec::new();
        self.system_message(format!("{} joined the room", name), &mut notices);
        Ok(notices)
    }

    /// Hands a held seat to a reconnecting player with the same name.
    /// Returns the seat's previous id, or None if no held seat matches.
    pub fn restore_seat(&mut self, new_id: PlayerId, name: &str) -> Option<PlayerId> {
        let old_id = self
            .room
            .players
            .iter()
            .find(|p| !p.connected && p.has_name(name))?
            .id;

        self.rebind(old_id, new_id);
        self.away_since.remove(&old_id);
        if let Some(player) = self.room.player_mut(new_id) {
            player.connected = true;
        }

        info!(
            "Player {} restored seat in room {} ({} -> {})",
            name.trim(),
            self.room.code,
            old_id,
            new_id
        );
        Some(old_id)
    }

    fn rebind(&mut self, old_id: PlayerId, new_id: PlayerId) {
        let swap = |id: &mut PlayerId| {
            if *id == old_id {
                *id = new_id;
            }
        };

        for player in &mut self.room.players {
            swap(&mut player.id);
            if let Some(target) = player.voted_for.as_mut() {
                swap(target);
            }
        }
        for ballot in self
            .room
            .current_votes
            .iter_mut()
            .chain(self.room.final_votes.iter_mut())
        {
            swap(&mut ballot.voter_id);
            swap(&mut ballot.target_id);
        }
        for message in &mut self.room.chat_messages {
            if let Some(author) = message.player_id.as_mut() {
                swap(author);
            }
        }
        swap(&mut self.room.host_id);
        if let Some(eliminated) = self.room.eliminated_this_round.as_mut() {
            swap(eliminated);
        }
    }

    /// LOBBY -> ROLE_ASSIGNMENT, host only
    pub fn start_game(&mut self, actor: PlayerId) -> GameResult<Vec<Notice>> {
        let player = self.player(actor)?;
        if !player.is_host {
            return Err(GameError::unauthorized("Only host can start the game"));
        }
        if self.room.phase != Phase::Lobby {
            return Err(GameError::unauthorized("Game has already started"));
        }
        if self.room.players.len() < self.room.min_players {
            return Err(GameError::unauthorized(format!(
                "Minimum {} players required",
                self.room.min_players
            )));
        }

        let ids: Vec<PlayerId> = self.room.players.iter().map(|p| p.id).collect();
        let assignment = assign_roles(&ids, &self.catalog, &mut self.rng)
            .ok_or_else(|| GameError::internal("disease catalog cannot cover both roles"))?;

        for player in &mut self.room.players {
            if let Some(card) = assignment.card_for(player.id) {
                player.role = Some(card.role);
                player.disease = card.disease.clone();
            }
            player.has_revealed = false;
        }
        self.room.diseases = vec![assignment.main_disease, assignment.differential_disease];
        self.room.round = 1;

        info!(
            "Room {} started with {} players",
            self.room.code,
            self.room.players.len()
        );

        let mut notices = vec![Notice::room(Packet::GameStarted)];
        self.enter_phase(Phase::RoleAssignment, &mut notices);
        Ok(notices)
    }

    /// Sends the caller their role; during ROLE_ASSIGNMENT it also counts as
    /// their acknowledgement.
    pub fn reveal_role(&mut self, actor: PlayerId) -> GameResult<Vec<Notice>> {
        let player = self.player(actor)?;
        match self.room.phase {
            Phase::Lobby => return Err(GameError::unauthorized("Roles have not been assigned yet")),
            Phase::Results => return Err(GameError::unauthorized("The game is over")),
            _ => {}
        }
        let role = player
            .role
            .ok_or_else(|| GameError::internal(format!("player {} has no role", actor)))?;

        let mut notices = vec![Notice::to(
            actor,
            Packet::RoleAssigned {
                role,
                disease: player.disease.clone(),
            },
        )];

        if self.room.phase == Phase::RoleAssignment {
            if let Some(player) = self.room.player_mut(actor) {
                player.has_revealed = true;
            }
            self.advance_if_quorum(&mut notices);
        }
        Ok(notices)
    }

    pub fn send_chat(&mut self, actor: PlayerId, text: &str) -> GameResult<Vec<Notice>> {
        let text = clean_text(text, "Message")?;
        self.player(actor)?;

        let message = self.push_message(Some(actor), text, MessageKind::Chat);
        Ok(vec![Notice::room(Packet::ChatMessage { message })])
    }

    /// One diagnosis per active player per round
    pub fn submit_answer(&mut self, actor: PlayerId, answer: &str) -> GameResult<Vec<Notice>> {
        let answer = clean_text(answer, "Answer")?;
        let player = self.player(actor)?;

        if self.room.phase != Phase::Discussion {
            return Err(GameError::unauthorized(
                "Answers can only be submitted during discussion",
            ));
        }
        if player.is_eliminated {
            return Err(GameError::unauthorized(
                "Eliminated players cannot submit answers",
            ));
        }
        if player.has_answered {
            return Err(GameError::unauthorized(
                "You have already submitted an answer this round",
            ));
        }

        if let Some(player) = self.room.player_mut(actor) {
            player.has_answered = true;
        }
        let message =
            self.push_message(Some(actor), format!("Diagnosis: {}", answer), MessageKind::Answer);

        let mut notices = vec![Notice::room(Packet::ChatMessage { message })];
        self.advance_if_quorum(&mut notices);
        Ok(notices)
    }

    /// Elimination vote. A second vote from the same player is rejected.
    pub fn submit_vote(&mut self, voter: PlayerId, target: PlayerId) -> GameResult<Vec<Notice>> {
        if self.room.phase != Phase::Voting {
            return Err(GameError::unauthorized("Voting is not open"));
        }
        let player = self.player(voter)?;
        if self.room.current_vote_of(voter).is_some() {
            return Err(GameError::unauthorized("You have already voted this round"));
        }
        if player.is_eliminated {
            return Err(GameError::unauthorized("Eliminated players cannot vote"));
        }
        let target_player = self
            .room
            .player(target)
            .ok_or_else(|| GameError::not_found("Unknown player"))?;
        if target_player.is_eliminated {
            return Err(GameError::unauthorized(
                "That player has already been eliminated",
            ));
        }

        self.room.current_votes.push(Ballot {
            voter_id: voter,
            target_id: target,
        });
        if let Some(player) = self.room.player_mut(voter) {
            player.voted_for = Some(target);
        }
        debug!("Room {}: {} voted for {}", self.room.code, voter, target);

        let mut notices = vec![Notice::to(
            voter,
            Packet::VoteRecorded {
                voter_id: voter,
                target_id: target,
            },
        )];
        self.advance_if_quorum(&mut notices);
        Ok(notices)
    }

    /// Locks in a finalist's answer. Answers cannot be edited afterwards.
    pub fn submit_final_answer(
        &mut self,
        actor: PlayerId,
        answer: FinalAnswer,
    ) -> GameResult<Vec<Notice>> {
        if !answer.is_complete() {
            return Err(GameError::validation(
                "Treatment and innovation are both required",
            ));
        }
        let answer = FinalAnswer {
            treatment: clean_text(&answer.treatment, "Treatment")?,
            innovation: clean_text(&answer.innovation, "Innovation")?,
        };

        if self.room.phase != Phase::FinalRound {
            return Err(GameError::unauthorized("The final round has not started"));
        }
        let player = self.player(actor)?;
        if player.is_eliminated {
            return Err(GameError::unauthorized(
                "Only finalists can submit a final answer",
            ));
        }
        if player.final_answer.is_some() {
            return Err(GameError::unauthorized("Your final answer is already locked in"));
        }

        if let Some(player) = self.room.player_mut(actor) {
            player.final_answer = Some(answer);
            player.points += FINAL_ANSWER_POINTS;
        }

        let mut notices = vec![Notice::to(
            actor,
            Packet::FinalAnswerSubmitted { player_id: actor },
        )];
        self.advance_if_quorum(&mut notices);
        Ok(notices)
    }

    /// Final vote, cast only by eliminated players for a live finalist.
    /// A second vote from the same player is rejected, never overwritten.
    pub fn submit_final_vote(
        &mut self,
        voter: PlayerId,
        target: PlayerId,
    ) -> GameResult<Vec<Notice>> {
        if self.room.phase != Phase::VotingFinal {
            return Err(GameError::unauthorized("Final voting is not open"));
        }
        let player = self.player(voter)?;
        if !player.is_eliminated {
            return Err(GameError::unauthorized(
                "Only eliminated players vote in the final round",
            ));
        }
        if self.room.final_vote_of(voter).is_some() {
            return Err(GameError::unauthorized("You have already cast your final vote"));
        }
        let target_player = self
            .room
            .player(target)
            .ok_or_else(|| GameError::not_found("Unknown player"))?;
        if target_player.is_eliminated {
            return Err(GameError::unauthorized("You can only vote for a finalist"));
        }

        self.room.final_votes.push(Ballot {
            voter_id: voter,
            target_id: target,
        });
        if let Some(player) = self.room.player_mut(voter) {
            player.voted_for = Some(target);
        }
        debug!("Room {}: {} cast final vote for {}", self.room.code, voter, target);

        let mut notices = vec![Notice::to(
            voter,
            Packet::FinalVoteRecorded {
                voter_id: voter,
                target_id: target,
            },
        )];
        self.advance_if_quorum(&mut notices);
        Ok(notices)
    }

    /// Holds the seat of a player whose connection dropped mid-game
    pub fn mark_disconnected(&mut self, player_id: PlayerId, now: Instant) -> GameResult<Vec<Notice>> {
        let name = self.player(player_id)?.name.clone();
        if let Some(player) = self.room.player_mut(player_id) {
            player.connected = false;
        }
        self.away_since.insert(player_id, now);

        let mut notices = Vec::new();
        self.system_message(format!("{} lost connection", name), &mut notices);
        Ok(notices)
    }

    /// Held seats whose reconnect window has run out
    pub fn expired_seats(&self, now: Instant) -> Vec<PlayerId> {
        let mut expired: Vec<PlayerId> = self
            .away_since
            .iter()
            .filter(|(_, since)| {
                now.saturating_duration_since(**since) >= self.settings.reconnect_grace
            })
            .map(|(id, _)| *id)
            .collect();
        expired.sort_unstable();
        expired
    }

    /// Removes a player, promotes a new host if needed, and re-checks the
    /// current phase's quorum so the departure cannot stall the room.
    pub fn remove_player(&mut self, player_id: PlayerId) -> GameResult<Vec<Notice>> {
        let index = self
            .room
            .players
            .iter()
            .position(|p| p.id == player_id)
            .ok_or_else(|| GameError::not_found("You are not in this room"))?;

        let departed = self.room.players.remove(index);
        self.away_since.remove(&player_id);

        if self.room.phase.in_progress() {
            let stale = |b: &Ballot| b.voter_id == player_id || b.target_id == player_id;
            let revoters: Vec<PlayerId> = self
                .room
                .current_votes
                .iter()
                .chain(self.room.final_votes.iter())
                .filter(|b| b.target_id == player_id)
                .map(|b| b.voter_id)
                .collect();

            self.room.current_votes.retain(|b| !stale(b));
            self.room.final_votes.retain(|b| !stale(b));
            for player in &mut self.room.players {
                if revoters.contains(&player.id) {
                    player.voted_for = None;
                }
            }
        }

        let mut notices = Vec::new();
        if self.room.players.is_empty() {
            info!("Room {} is now empty", self.room.code);
            return Ok(notices);
        }

        if departed.is_host {
            let next_host = &mut self.room.players[0];
            next_host.is_host = true;
            self.room.host_id = next_host.id;
            info!(
                "Room {}: host {} left, {} is now host",
                self.room.code, departed.id, next_host.id
            );
        }

        info!("Player {} ({}) left room {}", departed.name, departed.id, self.room.code);
        self.system_message(format!("{} left the room", departed.name), &mut notices);

        if self.room.phase.in_progress() {
            self.advance_if_quorum(&mut notices);
        }
        Ok(notices)
    }

    /// Whether every player the current phase waits on has acted
    fn quorum_met(&self) -> bool {
        let room = &self.room;
        match room.phase {
            Phase::RoleAssignment => room.players.iter().all(|p| p.has_revealed),
            Phase::Discussion => room.active_players().all(|p| p.has_answered),
            Phase::Voting => room
                .active_players()
                .all(|p| room.current_vote_of(p.id).is_some()),
            Phase::FinalRound => room.active_players().all(|p| p.final_answer.is_some()),
            Phase::VotingFinal => room
                .eliminated_players()
                .all(|p| room.final_vote_of(p.id).is_some()),
            Phase::Lobby | Phase::Results => false,
        }
    }

    /// Advances through every phase whose quorum is currently met
    fn advance_if_quorum(&mut self, notices: &mut Vec<Notice>) {
        while self.room.phase.in_progress() {
            if self.room.active_count() == 0 {
                self.finish_game(notices);
                return;
            }
            if !self.quorum_met() {
                return;
            }

            match self.room.phase {
                Phase::RoleAssignment => self.enter_phase(Phase::Discussion, notices),
                Phase::Discussion => self.enter_phase(Phase::Voting, notices),
                Phase::Voting => self.resolve_elimination(notices),
                Phase::FinalRound => self.enter_phase(Phase::VotingFinal, notices),
                Phase::VotingFinal => self.finish_game(notices),
                Phase::Lobby | Phase::Results => return,
            }
        }
    }

    fn enter_phase(&mut self, phase: Phase, notices: &mut Vec<Notice>) {
        match phase {
            Phase::Discussion | Phase::FinalRound => {
                for player in &mut self.room.players {
                    player.has_answered = false;
                    player.voted_for = None;
                }
            }
            Phase::Voting => {
                self.room.current_votes.clear();
                for player in &mut self.room.players {
                    player.voted_for = None;
                }
            }
            Phase::VotingFinal => {
                for player in &mut self.room.players {
                    player.voted_for = None;
                }
            }
            _ => {}
        }

        info!(
            "Room {}: {} -> {} (round {})",
            self.room.code, self.room.phase, phase, self.room.round
        );
        self.room.phase = phase;
        notices.push(Notice::room(Packet::PhaseChanged { phase }));
    }

    /// VOTING -> DISCUSSION or FINAL_ROUND
    fn resolve_elimination(&mut self, notices: &mut Vec<Notice>) {
        let eligible: Vec<PlayerId> = self.room.active_players().map(|p| p.id).collect();
        let outcome = tally::resolve(
            &self.room.current_votes,
            &eligible,
            self.settings.tie_break,
            &mut self.rng,
        );

        if let Some(outcome) = outcome {
            if let Some(player) = self.room.player_mut(outcome.target) {
                player.is_eliminated = true;
            }
            self.room.eliminated_this_round = Some(outcome.target);
            for player in self.room.players.iter_mut().filter(|p| p.is_active()) {
                player.points += SURVIVAL_POINTS;
            }

            let name = self
                .room
                .player(outcome.target)
                .map(|p| p.name.clone())
                .unwrap_or_default();
            info!(
                "Room {}: {} eliminated with {} votes{}",
                self.room.code,
                name,
                outcome.votes,
                if outcome.was_tie() { " after a tie" } else { "" }
            );
            notices.push(Notice::room(Packet::PlayerEliminated {
                player_id: outcome.target,
            }));
            self.system_message(
                format!("{} was eliminated with {} votes", name, outcome.votes),
                notices,
            );
        }

        self.room.round += 1;

        if self.room.active_count() <= FINAL_ROUND_THRESHOLD {
            self.enter_phase(Phase::FinalRound, notices);
        } else {
            self.enter_phase(Phase::Discussion, notices);
        }
    }

    fn pick_winner(&mut self) -> Option<PlayerId> {
        let finalists: Vec<PlayerId> = self.room.active_players().map(|p| p.id).collect();
        if let Some(outcome) = tally::resolve(
            &self.room.final_votes,
            &finalists,
            self.settings.tie_break,
            &mut self.rng,
        ) {
            return Some(outcome.target);
        }

        // No usable final votes: most points wins, join order on ties.
        let pool: Vec<&Player> = if finalists.is_empty() {
            self.room.players.iter().collect()
        } else {
            self.room.active_players().collect()
        };
        let mut best: Option<&Player> = None;
        for player in pool {
            if best.map_or(true, |b| player.points > b.points) {
                best = Some(player);
            }
        }
        best.map(|p| p.id)
    }

    /// VOTING_FINAL -> RESULTS
    fn finish_game(&mut self, notices: &mut Vec<Notice>) {
        let finalists: Vec<PlayerId> = self.room.active_players().map(|p| p.id).collect();
        for (target, votes) in tally::count_votes(&self.room.final_votes, &finalists) {
            if let Some(player) = self.room.player_mut(target) {
                player.points += votes as u32 * FINAL_VOTE_POINTS;
            }
        }

        let winner_id = match self.pick_winner() {
            Some(id) => id,
            None => return,
        };

        let ranking: Vec<PlayerId> = {
            let mut others: Vec<&Player> =
                self.room.players.iter().filter(|p| p.id != winner_id).collect();
            others.sort_by(|a, b| b.points.cmp(&a.points));
            std::iter::once(winner_id)
                .chain(others.into_iter().map(|p| p.id))
                .collect()
        };

        let mut rewards = Vec::new();
        for (place, id) in ranking.iter().enumerate().take(3) {
            let role = self.room.player(*id).and_then(|p| p.role);
            let reward = reward_for_place(place, role);
            if let Some(player) = self.room.player_mut(*id) {
                player.points += reward.points;
            }
            rewards.push((*id, reward));
        }

        let final_ranking: Vec<Player> = ranking
            .iter()
            .filter_map(|id| self.room.player(*id).cloned())
            .collect();
        let winner = match final_ranking.first() {
            Some(winner) => winner.clone(),
            None => return,
        };
        let results = Results {
            winner,
            final_ranking,
            rewards,
        };

        info!(
            "Room {} finished, winner {} ({})",
            self.room.code, results.winner.name, results.winner.id
        );
        self.room.phase = Phase::Results;
        notices.push(Notice::room(Packet::PhaseChanged {
            phase: Phase::Results,
        }));
        notices.push(Notice::room(Packet::GameEnded {
            results: results.clone(),
        }));
        self.results = Some(results);
    }
}

fn reward_for_place(place: usize, role: Option<Role>) -> Reward {
    let reward = |title: &str, icon: &str, points: u32, description: &str| Reward {
        title: title.to_string(),
        icon: icon.to_string(),
        points,
        description: description.to_string(),
    };

    match (place, role) {
        (0, Some(Role::DoctorGrey)) => reward(
            "Mastermind",
            "\u{1F9E0}",
            100,
            "Won without knowing the disease!",
        ),
        (0, _) => reward("Champion", "\u{1F451}", 75, "Medical diagnosis champion"),
        (1, _) => reward("Survivor", "\u{1F948}", 50, "Excellent medical performance"),
        _ => reward("Diagnostician", "\u{1F949}", 25, "Strong medical knowledge"),
    }
}
