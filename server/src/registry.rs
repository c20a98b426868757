//! Process-wide index of rooms by code and of players by room

use crate::config::RoomSettings;
use crate::error::{GameError, GameResult};
use crate::game::GameRoom;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use shared::{PlayerId, ROOM_CODE_CHARSET, ROOM_CODE_LEN};
use std::collections::HashMap;

/// Normalizes a user-typed room code
pub fn clean_code(code: &str) -> String {
    code.trim().to_uppercase()
}

pub struct RoomRegistry {
    rooms: HashMap<String, GameRoom>,
    memberships: HashMap<PlayerId, String>,
    rng: StdRng,
}

impl RoomRegistry {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            rooms: HashMap::new(),
            memberships: HashMap::new(),
            rng,
        }
    }

    /// Random code that no live room is using
    fn generate_code(&mut self) -> String {
        loop {
            let code: String = (0..ROOM_CODE_LEN)
                .map(|_| {
                    let idx = self.rng.gen_range(0..ROOM_CODE_CHARSET.len());
                    ROOM_CODE_CHARSET[idx] as char
                })
                .collect();

            if !self.rooms.contains_key(&code) {
                return code;
            }
            debug!("Room code {} collided, retrying", code);
        }
    }

    /// Creates a room with `host_id` as its host and binds the host to it
    pub fn create(
        &mut self,
        host_id: PlayerId,
        host_name: &str,
        settings: RoomSettings,
    ) -> GameResult<&GameRoom> {
        if self.memberships.contains_key(&host_id) {
            return Err(GameError::unauthorized(
                "Leave your current room before creating a new one",
            ));
        }

        let code = self.generate_code();
        let seed = self.rng.gen::<u64>();
        let room = GameRoom::new(code.clone(), host_id, host_name, settings, seed)?;

        info!("Room {} created by player {}", code, host_id);
        self.memberships.insert(host_id, code.clone());
        Ok(self.rooms.entry(code).or_insert(room))
    }

    pub fn get(&self, code: &str) -> Option<&GameRoom> {
        self.rooms.get(code)
    }

    pub fn get_mut(&mut self, code: &str) -> Option<&mut GameRoom> {
        self.rooms.get_mut(code)
    }

    /// Code of the room `player_id` belongs to
    pub fn room_of(&self, player_id: PlayerId) -> Option<&str> {
        self.memberships.get(&player_id).map(String::as_str)
    }

    /// The room `player_id` belongs to, for an action that requires one
    pub fn room_for_mut(&mut self, player_id: PlayerId) -> GameResult<&mut GameRoom> {
        let code = self
            .memberships
            .get(&player_id)
            .ok_or_else(|| GameError::not_found("You are not in a room"))?;

        self.rooms
            .get_mut(code)
            .ok_or_else(|| GameError::internal(format!("membership points at missing room {}", code)))
    }

    pub fn bind(&mut self, player_id: PlayerId, code: &str) {
        self.memberships.insert(player_id, code.to_string());
    }

    pub fn unbind(&mut self, player_id: PlayerId) -> Option<String> {
        self.memberships.remove(&player_id)
    }

    /// Drops the room once its last player has gone
    pub fn remove_if_empty(&mut self, code: &str) -> bool {
        let empty = self.rooms.get(code).map_or(false, |r| r.is_empty());
        if empty {
            self.remove(code);
        }
        empty
    }

    /// Drops the room along with every membership still pointing at it
    pub fn remove(&mut self, code: &str) -> Option<GameRoom> {
        let room = self.rooms.remove(code)?;
        self.memberships.retain(|_, c| c != code);
        info!("Room {} removed", code);
        Some(room)
    }

    pub fn codes(&self) -> Vec<String> {
        self.rooms.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_well_formed_and_unique() {
        let mut registry = RoomRegistry::new(Some(1));
        let mut seen = std::collections::HashSet::new();

        for id in 1..=50 {
            let code = registry
                .create(id, &format!("P{}", id), RoomSettings::default())
                .unwrap()
                .code()
                .to_string();

            assert_eq!(code.len(), ROOM_CODE_LEN);
            assert!(code.bytes().all(|b| ROOM_CODE_CHARSET.contains(&b)));
            assert!(seen.insert(code));
        }
        assert_eq!(registry.len(), 50);
    }

    #[test]
    fn test_create_binds_host() {
        let mut registry = RoomRegistry::new(Some(2));
        let code = registry
            .create(1, "Alice", RoomSettings::default())
            .unwrap()
            .code()
            .to_string();

        assert_eq!(registry.room_of(1), Some(code.as_str()));
        assert!(registry.room_for_mut(1).is_ok());
        assert!(matches!(registry.room_for_mut(2), Err(GameError::NotFound(_))));

        let again = registry.create(1, "Alice", RoomSettings::default());
        assert!(matches!(again, Err(GameError::Authorization(_))));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_invalid_host_name_creates_nothing() {
        let mut registry = RoomRegistry::new(Some(3));
        assert!(registry.create(1, "  ", RoomSettings::default()).is_err());
        assert!(registry.is_empty());
        assert_eq!(registry.room_of(1), None);
    }

    #[test]
    fn test_empty_room_is_removed() {
        let mut registry = RoomRegistry::new(Some(4));
        let code = registry
            .create(1, "Alice", RoomSettings::default())
            .unwrap()
            .code()
            .to_string();

        assert!(!registry.remove_if_empty(&code));
        registry.get_mut(&code).unwrap().remove_player(1).unwrap();
        assert!(registry.remove_if_empty(&code));
        assert!(registry.get(&code).is_none());
        assert_eq!(registry.room_of(1), None);
    }

    #[test]
    fn test_clean_code() {
        assert_eq!(clean_code("  ab12cd3 "), "AB12CD3");
    }
}
