//! Plain-text rendering of the room for the terminal client

use shared::{ChatMessage, GameResult, MessageKind, Phase, PlayerId, Room};
use std::fmt::Write;

/// One-line instruction for what the player can do in `phase`
pub fn phase_hint(phase: Phase) -> &'static str {
    match phase {
        Phase::Lobby => "Waiting for players. The host starts with /start.",
        Phase::RoleAssignment => "Roles are assigned. Use /reveal to see yours.",
        Phase::Discussion => "Discuss the case and submit a diagnosis with /answer.",
        Phase::Voting => "Vote someone out with /vote <player>.",
        Phase::FinalRound => "Finalists: /final <treatment> | <innovation>.",
        Phase::VotingFinal => "Eliminated players pick a winner with /fvote <player>.",
        Phase::Results => "Game over.",
    }
}

pub fn render_message(message: &ChatMessage) -> String {
    match message.kind {
        MessageKind::System => format!("* {}", message.message),
        MessageKind::Answer => format!("[{}] {}", message.player_name, message.message),
        MessageKind::Chat => format!("<{}> {}", message.player_name, message.message),
    }
}

/// Room summary as seen by `me`
pub fn render_room(room: &Room, me: Option<PlayerId>) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Room {} | {} | round {} | {}/{} players",
        room.code,
        room.phase,
        room.round,
        room.players.len(),
        room.max_players
    );

    for player in &room.players {
        let mut tags = Vec::new();
        if player.is_host {
            tags.push("host".to_string());
        }
        if Some(player.id) == me {
            tags.push("you".to_string());
        }
        if player.is_eliminated {
            tags.push("eliminated".to_string());
        }
        if !player.connected {
            tags.push("away".to_string());
        }
        if let Some(role) = player.role {
            tags.push(role.to_string());
        }
        if player.has_answered || player.final_answer.is_some() {
            tags.push("answered".to_string());
        }
        if player.voted_for.is_some() {
            tags.push("voted".to_string());
        }

        let _ = writeln!(
            out,
            "  {:>3} {:<24} {:>4} pts {}",
            player.id,
            player.name,
            player.points,
            if tags.is_empty() {
                String::new()
            } else {
                format!("({})", tags.join(", "))
            }
        );
    }

    let _ = write!(out, "{}", phase_hint(room.phase));
    out
}

pub fn render_results(results: &GameResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Winner: {}", results.winner.name);
    for (place, player) in results.final_ranking.iter().enumerate() {
        let reward = results
            .reward_for(player.id)
            .map(|r| format!(" {} {} (+{})", r.icon, r.title, r.points))
            .unwrap_or_default();
        let _ = writeln!(
            out,
            "  {}. {:<24} {:>4} pts{}",
            place + 1,
            player.name,
            player.points,
            reward
        );
    }
    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::Player;

    #[test]
    fn test_render_room_marks_self_and_host() {
        let mut bob = Player::new(2, "Bob", false);
        bob.is_eliminated = true;
        let room = Room {
            code: "ABC1234".to_string(),
            phase: Phase::Voting,
            round: 2,
            players: vec![Player::new(1, "Alice", true), bob],
            host_id: 1,
            diseases: Vec::new(),
            min_players: 4,
            max_players: 12,
            current_votes: Vec::new(),
            final_votes: Vec::new(),
            eliminated_this_round: Some(2),
            chat_messages: Vec::new(),
        };

        let text = render_room(&room, Some(1));
        assert!(text.starts_with("Room ABC1234 | voting | round 2"));
        assert!(text.contains("(host, you)"));
        assert!(text.contains("(eliminated)"));
        assert!(text.ends_with(phase_hint(Phase::Voting)));
    }

    #[test]
    fn test_render_message_kinds() {
        let mut message = ChatMessage {
            id: 1,
            player_id: Some(1),
            player_name: "Alice".to_string(),
            message: "hi".to_string(),
            timestamp: 0,
            kind: MessageKind::Chat,
        };
        assert_eq!(render_message(&message), "<Alice> hi");
        message.kind = MessageKind::System;
        assert_eq!(render_message(&message), "* hi");
    }
}
