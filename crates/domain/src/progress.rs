use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{catalog::RudimentCatalog, tempo::Tier};

pub const MIN_SOUND_SET: u8 = 1;
pub const MAX_SOUND_SET: u8 = 5;

/// Levels at which the next sound set is unlocked: level 2 unlocks set 2,
/// level 4 set 3, level 6 set 4 and level 8 set 5.
const SOUND_SET_STEPS: [u32; 4] = [2, 4, 6, 8];

pub fn sound_set_for(level: u32) -> u8 {
    let unlocked = SOUND_SET_STEPS.iter().filter(|step| level >= **step).count() as u8;
    MIN_SOUND_SET + unlocked
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ProgressState {
    pub current_level: u32,
    pub sound_set: u8,
    #[serde(default)]
    pub achievements: BTreeMap<u32, Tier>,
}

impl ProgressState {
    pub fn new(catalog: &RudimentCatalog) -> Self {
        Self {
            current_level: 1,
            sound_set: MIN_SOUND_SET,
            achievements: catalog.iter().map(|r| (r.id, Tier::None)).collect(),
        }
    }

    pub fn achievement(&self, level: u32) -> Tier {
        self.achievements.get(&level).copied().unwrap_or_default()
    }

    pub fn is_accessible(&self, level: u32) -> bool {
        match level {
            0 => false,
            1 => true,
            _ => self.achievement(level - 1).is_earned(),
        }
    }

    /// Drops unknown levels, falls back to level 1 when the current one is locked.
    pub fn sanitized(mut self, catalog: &RudimentCatalog) -> Self {
        self.achievements.retain(|level, _| catalog.contains(*level));
        for rudiment in catalog.iter() {
            self.achievements.entry(rudiment.id).or_default();
        }
        if !catalog.contains(self.current_level) || !self.is_accessible(self.current_level) {
            self.current_level = 1;
        }
        self.sound_set = self
            .sound_set
            .clamp(MIN_SOUND_SET, MAX_SOUND_SET)
            .max(sound_set_for(self.current_level));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sound_set_steps() {
        let expected = [(1, 1), (2, 2), (3, 2), (4, 3), (5, 3), (6, 4), (7, 4), (8, 5), (9, 5), (10, 5)];
        for (level, set) in expected {
            assert_eq!(sound_set_for(level), set, "level {level}");
        }
        assert_eq!(sound_set_for(40), MAX_SOUND_SET);
    }

    #[test]
    fn new_state_has_every_level_unearned() {
        let catalog = RudimentCatalog::standard();
        let state = ProgressState::new(&catalog);
        assert_eq!(state.achievements.len(), 10);
        assert!(state.achievements.values().all(|t| *t == Tier::None));
    }

    #[test]
    fn accessibility_follows_previous_level() {
        let catalog = RudimentCatalog::standard();
        let mut state = ProgressState::new(&catalog);
        assert!(state.is_accessible(1));
        assert!(!state.is_accessible(2));
        assert!(!state.is_accessible(0));
        state.achievements.insert(1, Tier::Bronze);
        assert!(state.is_accessible(2));
        assert!(!state.is_accessible(3));
    }

    #[test]
    fn sanitize_repairs_restored_state() {
        let catalog = RudimentCatalog::standard();
        let mut achievements = BTreeMap::new();
        achievements.insert(1, Tier::Gold);
        achievements.insert(42, Tier::Gold);
        let restored = ProgressState {
            current_level: 5,
            sound_set: 9,
            achievements,
        };
        let state = restored.sanitized(&catalog);
        assert_eq!(state.current_level, 1);
        assert_eq!(state.sound_set, MAX_SOUND_SET);
        assert!(!state.achievements.contains_key(&42));
        assert_eq!(state.achievements.len(), 10);
    }

    #[test]
    fn sanitize_raises_sound_set_to_level() {
        let catalog = RudimentCatalog::standard();
        let mut state = ProgressState::new(&catalog);
        for level in 1..=3 {
            state.achievements.insert(level, Tier::Silver);
        }
        state.current_level = 4;
        state.sound_set = 1;
        let state = state.sanitized(&catalog);
        assert_eq!(state.current_level, 4);
        assert_eq!(state.sound_set, 3);
    }
}
