//! Session cache
//!
//! Keeps the last known room, player and results on disk as JSON so a
//! restarted client can rejoin the game it was in.

use crate::error::Result;
use directories::ProjectDirs;
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use shared::{GameResult, Phase, Player, Room};
use std::fs;
use std::path::{Path, PathBuf};

pub const ROOM_KEY: &str = "uncoverles_room";
pub const PLAYER_KEY: &str = "uncoverles_player";
pub const RESULTS_KEY: &str = "uncoverles_results";

/// Cache directory used when none is given on the command line
pub fn default_cache_dir() -> PathBuf {
    ProjectDirs::from("dev", "uncoverles", "uncoverles")
        .map(|dirs| dirs.cache_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".uncoverles"))
}

pub struct SessionCache {
    dir: PathBuf,
}

impl SessionCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    pub fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let json = serde_json::to_vec_pretty(value)?;
        fs::write(self.path(key), json)?;
        debug!("Cached {}", key);
        Ok(())
    }

    /// Reads a cached value. A missing entry is `Ok(None)`.
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let path = self.path(key);
        if !path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(path)?;
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    pub fn remove(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn save_session(&self, room: &Room, player: &Player) -> Result<()> {
        self.save(ROOM_KEY, room)?;
        self.save(PLAYER_KEY, player)
    }

    /// The cached room and player, if the game they belong to can still be
    /// rejoined. Unreadable entries are dropped.
    pub fn session(&self) -> Option<(Room, Player)> {
        let room: Option<Room> = self.load(ROOM_KEY).unwrap_or_else(|e| {
            warn!("Discarding cached room: {}", e);
            None
        });
        let player: Option<Player> = self.load(PLAYER_KEY).unwrap_or_else(|e| {
            warn!("Discarding cached player: {}", e);
            None
        });

        match (room, player) {
            (Some(room), Some(player)) if room.phase != Phase::Results => Some((room, player)),
            _ => None,
        }
    }

    /// Stores final results and forgets the finished room
    pub fn store_results(&self, results: &GameResult) -> Result<()> {
        self.save(RESULTS_KEY, results)?;
        self.remove(ROOM_KEY)?;
        self.remove(PLAYER_KEY)
    }

    pub fn results(&self) -> Option<GameResult> {
        self.load(RESULTS_KEY).ok().flatten()
    }

    pub fn clear(&self) -> Result<()> {
        self.remove(ROOM_KEY)?;
        self.remove(PLAYER_KEY)?;
        self.remove(RESULTS_KEY)
    }
}
