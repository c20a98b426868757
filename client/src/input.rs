//! Terminal command parsing
//!
//! Lines starting with `/` are commands; anything else is sent as chat.

use crate::error::{ClientError, Result};
use shared::{PlayerId, Room};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Create { name: Option<String> },
    Join { code: String, name: Option<String> },
    Start,
    Reveal,
    Chat(String),
    Answer(String),
    /// Elimination vote, by player name or id
    Vote(String),
    FinalAnswer { treatment: String, innovation: String },
    /// Final-round vote, by player name or id
    FinalVote(String),
    Leave,
    Status,
    Help,
    Quit,
}

pub const HELP: &str = "\
Commands:
  /create [name]              create a room
  /join <code> [name]         join a room
  /start                      start the game (host)
  /reveal                     reveal your role
  /answer <diagnosis>         submit your diagnosis for this round
  /vote <player>              vote to eliminate a player
  /final <treatment> | <idea> submit your final answer
  /fvote <player>             vote for a finalist (eliminated players)
  /leave                      leave the room
  /status                     show the room
  /quit                       exit
Anything else is sent as chat.";

fn required(rest: &str, usage: &str) -> Result<String> {
    if rest.is_empty() {
        Err(ClientError::InvalidCommand(format!("Usage: {}", usage)))
    } else {
        Ok(rest.to_string())
    }
}

/// Parses one input line. Blank lines yield None.
pub fn parse(line: &str) -> Result<Option<Command>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    if !line.starts_with('/') {
        return Ok(Some(Command::Chat(line.to_string())));
    }

    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };
    let optional = |s: &str| (!s.is_empty()).then(|| s.to_string());

    let command = match word.to_lowercase().as_str() {
        "/create" => Command::Create {
            name: optional(rest),
        },
        "/join" => {
            let (code, name) = match rest.split_once(char::is_whitespace) {
                Some((code, name)) => (code, name.trim()),
                None => (rest, ""),
            };
            Command::Join {
                code: required(code, "/join <code> [name]")?,
                name: optional(name),
            }
        }
        "/start" => Command::Start,
        "/reveal" => Command::Reveal,
        "/answer" => Command::Answer(required(rest, "/answer <diagnosis>")?),
        "/vote" => Command::Vote(required(rest, "/vote <player>")?),
        "/final" => {
            let usage = "/final <treatment> | <innovation>";
            let (treatment, innovation) = rest
                .split_once('|')
                .ok_or_else(|| ClientError::InvalidCommand(format!("Usage: {}", usage)))?;
            Command::FinalAnswer {
                treatment: required(treatment.trim(), usage)?,
                innovation: required(innovation.trim(), usage)?,
            }
        }
        "/fvote" => Command::FinalVote(required(rest, "/fvote <player>")?),
        "/leave" => Command::Leave,
        "/status" => Command::Status,
        "/help" | "/?" => Command::Help,
        "/quit" | "/exit" => Command::Quit,
        other => {
            return Err(ClientError::InvalidCommand(format!(
                "Unknown command {}, try /help",
                other
            )))
        }
    };
    Ok(Some(command))
}

/// Resolves a vote target typed by the user: an exact id, or a player name
/// (case-insensitive).
pub fn resolve_target(room: &Room, target: &str) -> Result<PlayerId> {
    let target = target.trim();
    if let Ok(id) = target.parse::<PlayerId>() {
        if room.player(id).is_some() {
            return Ok(id);
        }
    }
    room.player_by_name(target)
        .map(|p| p.id)
        .ok_or_else(|| ClientError::InvalidCommand(format!("No player named {}", target)))
}
