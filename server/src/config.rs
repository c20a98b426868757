//! Server configuration

use crate::tally::TieBreak;
use shared::{DEFAULT_MAX_PLAYERS, DEFAULT_MIN_PLAYERS};
use std::time::Duration;

/// Rules applied to every room created by this server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoomSettings {
    pub min_players: usize,
    pub max_players: usize,
    pub tie_break: TieBreak,
    /// How long a dropped player's seat is held for a reconnect
    pub reconnect_grace: Duration,
}

impl Default for RoomSettings {
    fn default() -> Self {
        Self {
            min_players: DEFAULT_MIN_PLAYERS,
            max_players: DEFAULT_MAX_PLAYERS,
            tie_break: TieBreak::default(),
            reconnect_grace: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub max_clients: usize,
    pub idle_timeout: Duration,
    /// Connections accepted per IP within `throttle_window`; 0 disables the limit
    pub max_connects_per_ip: u32,
    pub throttle_window: Duration,
    pub rooms: RoomSettings,
    /// Fixed RNG seed for reproducible games
    pub seed: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            max_clients: 256,
            idle_timeout: Duration::from_secs(30),
            max_connects_per_ip: 20,
            throttle_window: Duration::from_secs(30),
            rooms: RoomSettings::default(),
            seed: None,
        }
    }
}

impl ServerConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.rooms.min_players < 2 {
            return Err(format!(
                "min players must be at least 2, got {}",
                self.rooms.min_players
            ));
        }
        if self.rooms.min_players > self.rooms.max_players {
            return Err(format!(
                "min players ({}) exceeds max players ({})",
                self.rooms.min_players, self.rooms.max_players
            ));
        }
        if self.max_clients == 0 {
            return Err("max clients must be positive".to_string());
        }
        Ok(())
    }
}
