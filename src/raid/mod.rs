//! The raid record and its roster.

pub mod store;

pub use store::{MemoryStore, RaidStore};

use chrono::NaiveTime;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::data::{Boss, Gym};

/// Length of the random raid code.
const CODE_LEN: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    Normal,
    Remote,
    RemoteInvite,
    Flyer,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub name: String,
    pub role: Role,
    /// The participant plus the people they bring along; always at least 1.
    pub count: u32,
}

impl Participant {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            role: Role::Normal,
            count: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Raid {
    pub code: String,
    pub gym: Option<Gym>,
    pub is_ex: bool,
    pub level: Option<u8>,
    pub is_hatched: bool,
    pub end: Option<NaiveTime>,
    pub hatching: Option<NaiveTime>,
    pub hangout: Option<NaiveTime>,
    pub boss: Option<Boss>,
    /// Times are estimated from the current clock instead of the screenshot.
    pub is_aprx_time: bool,
    pub participants: BTreeMap<i64, Participant>,
}

impl Default for Raid {
    fn default() -> Self {
        Self::new()
    }
}

pub fn generate_code() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(CODE_LEN)
        .map(char::from)
        .collect()
}

impl Raid {
    /// An empty raid with a fresh random code.
    pub fn new() -> Self {
        Self {
            code: generate_code(),
            gym: None,
            is_ex: false,
            level: None,
            is_hatched: false,
            end: None,
            hatching: None,
            hangout: None,
            boss: None,
            is_aprx_time: false,
            participants: BTreeMap::new(),
        }
    }

    /// Adds a user, or one more companion of a user already in the roster.
    pub fn add_participant(&mut self, user_id: i64, name: &str) {
        self.participants
            .entry(user_id)
            .and_modify(|p| {
                p.name = name.to_string();
                p.count += 1;
            })
            .or_insert_with(|| Participant::new(name));
    }

    /// Removes one companion of a user, or the user when alone.
    /// Returns whether the user was in the roster.
    pub fn remove_participant(&mut self, user_id: i64, name: &str) -> bool {
        let Some(participant) = self.participants.get_mut(&user_id) else {
            return false;
        };

        if participant.count > 1 {
            participant.name = name.to_string();
            participant.count -= 1;
        } else {
            self.participants.remove(&user_id);
        }
        true
    }

    pub fn toggle_remote(&mut self, user_id: i64, name: &str) -> bool {
        self.toggle_role(user_id, name, Role::Remote)
    }

    pub fn toggle_remote_invite(&mut self, user_id: i64, name: &str) -> bool {
        self.toggle_role(user_id, name, Role::RemoteInvite)
    }

    pub fn toggle_flyer(&mut self, user_id: i64, name: &str) -> bool {
        self.toggle_role(user_id, name, Role::Flyer)
    }

    /// Switches a participant between `role` and [`Role::Normal`].
    fn toggle_role(&mut self, user_id: i64, name: &str, role: Role) -> bool {
        let Some(participant) = self.participants.get_mut(&user_id) else {
            return false;
        };

        participant.name = name.to_string();
        participant.role = if participant.role == role {
            Role::Normal
        } else {
            role
        };
        true
    }

    /// Total people in the roster, companions included.
    pub fn participants_count(&self) -> u32 {
        self.participants.values().map(|p| p.count).sum()
    }

    /// Level of the boss when known, else the level read from the screenshot.
    pub fn effective_level(&self) -> Option<u8> {
        self.boss
            .as_ref()
            .and_then(|b| b.level)
            .or(self.level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_is_random_alphanumeric() {
        let a = Raid::new();
        let b = Raid::new();

        assert_eq!(a.code.len(), 8);
        assert!(a.code.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(a.code, b.code);
    }

    #[test]
    fn test_add_participant() {
        let mut raid = Raid::new();
        raid.add_participant(1, "Ash");
        raid.add_participant(2, "Misty");
        raid.add_participant(1, "Ash K.");

        assert_eq!(raid.participants[&1].count, 2);
        assert_eq!(raid.participants[&1].name, "Ash K.");
        assert_eq!(raid.participants[&2], Participant::new("Misty"));
        assert_eq!(raid.participants_count(), 3);
    }

    #[test]
    fn test_remove_participant() {
        let mut raid = Raid::new();
        raid.add_participant(1, "Ash");
        raid.add_participant(1, "Ash");

        assert!(raid.remove_participant(1, "Ash"));
        assert_eq!(raid.participants[&1].count, 1);
        assert!(raid.remove_participant(1, "Ash"));
        assert!(!raid.participants.contains_key(&1));
        assert!(!raid.remove_participant(1, "Ash"));
        assert_eq!(raid.participants_count(), 0);
    }

    #[test]
    fn test_toggle_roles() {
        let mut raid = Raid::new();
        assert!(!raid.toggle_remote(1, "Ash"));

        raid.add_participant(1, "Ash");
        assert!(raid.toggle_remote(1, "Ash"));
        assert_eq!(raid.participants[&1].role, Role::Remote);

        assert!(raid.toggle_flyer(1, "Ash"));
        assert_eq!(raid.participants[&1].role, Role::Flyer);

        assert!(raid.toggle_flyer(1, "Ash"));
        assert_eq!(raid.participants[&1].role, Role::Normal);

        assert!(raid.toggle_remote_invite(1, "Ash"));
        assert_eq!(raid.participants[&1].role, Role::RemoteInvite);
        assert!(raid.toggle_remote_invite(1, "Ash"));
        assert_eq!(raid.participants[&1].role, Role::Normal);
    }

    #[test]
    fn test_effective_level() {
        let mut raid = Raid::new();
        assert_eq!(raid.effective_level(), None);

        raid.level = Some(3);
        assert_eq!(raid.effective_level(), Some(3));

        raid.boss = Some(Boss::new("Absol"));
        assert_eq!(raid.effective_level(), Some(3));

        raid.boss = Some(Boss::with_level("Mewtwo", 5));
        assert_eq!(raid.effective_level(), Some(5));
    }

    #[test]
    fn test_json_keeps_roster() {
        let mut raid = Raid::new();
        raid.gym = Some(Gym::new("Fountain"));
        raid.end = NaiveTime::from_hms_opt(13, 45, 0);
        raid.add_participant(42, "Brock");
        raid.toggle_flyer(42, "Brock");

        let json = serde_json::to_string(&raid).unwrap();
        let restored: Raid = serde_json::from_str(&json).unwrap();

        assert_eq!(restored, raid);
        assert!(json.contains("\"flyer\""));
    }
}
