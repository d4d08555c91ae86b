use crate::country::Side;
use crate::state::TwilightRand;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rolls strictly below this succeed, indexed by current progress.
const SUCCESS_BELOW: [i8; 8] = [4, 5, 4, 5, 4, 5, 4, 3];
/// (first to reach, second to reach), indexed by the new progress level.
const SPACE_VPS: [(i8, i8); 9] = [
    (0, 0),
    (2, 1),
    (0, 0),
    (2, 0),
    (0, 0),
    (3, 1),
    (0, 0),
    (4, 2),
    (2, 0),
];
pub const SPACE_MAX: i8 = 8;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Defcon {
    level: i8,
}

impl Default for Defcon {
    fn default() -> Self {
        Defcon { level: 5 }
    }
}

impl Defcon {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn level(&self) -> i8 {
        self.level
    }
    /// Lowers DEFCON by one and returns true on thermonuclear war.
    pub fn decrease(&mut self) -> bool {
        self.set(self.level - 1)
    }
    pub fn increase(&mut self) {
        self.set(self.level + 1);
    }
    /// Sets the level, clamped to [1, 5], and returns true on thermonuclear
    /// war.
    pub fn set(&mut self, level: i8) -> bool {
        self.level = std::cmp::min(5, std::cmp::max(1, level));
        self.is_war()
    }
    pub fn is_war(&self) -> bool {
        self.level < 2
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum SpaceError {
    #[error("the space race is not available this turn")]
    Unavailable,
}

/// Abilities granted by reaching certain space race levels. They are applied
/// by the game, not the track.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpaceReward {
    /// Level 4: the opponent reveals its headline first.
    OpponentHeadlinesFirst,
    /// Level 6: may discard a held card at the end of the turn.
    DiscardHeld,
    /// Level 8: eight action rounds per turn.
    EightActionRounds,
}

/// The outcome of moving up the track.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpaceAdvance {
    pub progress: i8,
    pub vps: i8,
    pub first: bool,
    pub reward: Option<SpaceReward>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpaceAttempt {
    pub roll: i8,
    pub advance: Option<SpaceAdvance>,
}

impl SpaceAttempt {
    pub fn success(&self) -> bool {
        self.advance.is_some()
    }
    pub fn vps(&self) -> i8 {
        self.advance.map(|a| a.vps).unwrap_or(0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpaceRace {
    pub progress: i8,
    pub available: bool,
    pub spaced_once: bool,
    pub minimum_ops: i8,
    pub space_twice: bool,
}

impl Default for SpaceRace {
    fn default() -> Self {
        SpaceRace {
            progress: 0,
            available: true,
            spaced_once: false,
            minimum_ops: 2,
            space_twice: false,
        }
    }
}

impl SpaceRace {
    pub fn new() -> Self {
        Self::default()
    }
    /// Whether a card with the given ops may be spent on the race right now.
    pub fn can_attempt(&self, ops: i8) -> bool {
        self.available && self.progress < SPACE_MAX && ops >= self.minimum_ops
    }
    /// Rolls for the next level. Fails without rolling if the track is not
    /// available this turn.
    pub fn attempt<R: TwilightRand>(
        &mut self,
        side: Side,
        opponent_progress: i8,
        rng: &mut R,
    ) -> Result<SpaceAttempt, SpaceError> {
        if !self.available || self.progress >= SPACE_MAX {
            return Err(SpaceError::Unavailable);
        }
        let roll = rng.roll(side);
        let advance = if roll < SUCCESS_BELOW[self.progress as usize] {
            self.advance(opponent_progress)
        } else {
            None
        };
        if self.progress >= SPACE_MAX || !self.space_twice || self.spaced_once {
            self.available = false;
        } else {
            self.spaced_once = true;
        }
        Ok(SpaceAttempt { roll, advance })
    }
    /// Moves up one level without a roll. Returns None at the top of the
    /// track.
    pub fn advance(&mut self, opponent_progress: i8) -> Option<SpaceAdvance> {
        if self.progress >= SPACE_MAX {
            return None;
        }
        self.progress += 1;
        let first = opponent_progress < self.progress;
        let (a, b) = SPACE_VPS[self.progress as usize];
        let vps = if first { a } else { b };
        let reward = match self.progress {
            2 => {
                self.space_twice = true;
                None
            }
            4 => {
                self.minimum_ops = 3;
                Some(SpaceReward::OpponentHeadlinesFirst)
            }
            6 => Some(SpaceReward::DiscardHeld),
            7 => {
                self.minimum_ops = 4;
                None
            }
            8 => {
                self.available = false;
                Some(SpaceReward::EightActionRounds)
            }
            _ => None,
        };
        Some(SpaceAdvance {
            progress: self.progress,
            vps,
            first,
            reward,
        })
    }
    pub fn reset_for_turn(&mut self) {
        self.spaced_once = false;
        self.available = self.progress < SPACE_MAX;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::DebugRand;
    use proptest::prelude::*;

    #[test]
    fn defcon_war() {
        let mut d = Defcon::new();
        assert!(!d.decrease());
        assert!(!d.decrease());
        assert!(!d.decrease());
        assert_eq!(d.level(), 2);
        assert!(d.decrease());
        assert_eq!(d.level(), 1);
        assert!(d.decrease());
        assert_eq!(d.level(), 1);
    }
    #[test]
    fn defcon_clamps_at_five() {
        let mut d = Defcon::new();
        d.increase();
        assert_eq!(d.level(), 5);
        d.set(3);
        d.increase();
        assert_eq!(d.level(), 4);
    }
    #[test]
    fn first_and_second_vps() {
        let mut us = SpaceRace::new();
        let mut ussr = SpaceRace::new();
        let a = ussr.advance(us.progress).unwrap();
        assert_eq!((a.progress, a.vps, a.first), (1, 2, true));
        let b = us.advance(ussr.progress).unwrap();
        assert_eq!((b.progress, b.vps, b.first), (1, 1, false));
    }
    #[test]
    fn attempt_rolls_against_threshold() {
        let mut rng = DebugRand::new_empty();
        rng.us_rolls = vec![5, 3];
        let mut space = SpaceRace::new();
        // Rolls are popped from the back.
        let hit = space.attempt(Side::US, 0, &mut rng).unwrap();
        assert_eq!(hit.roll, 3);
        assert!(hit.success());
        assert_eq!(hit.vps(), 2);
        assert!(!space.available);
        assert_eq!(
            space.attempt(Side::US, 0, &mut rng),
            Err(SpaceError::Unavailable)
        );
        // No roll was consumed by the rejected attempt.
        assert_eq!(rng.us_rolls, vec![5]);
        space.reset_for_turn();
        let miss = space.attempt(Side::US, 0, &mut rng).unwrap();
        assert!(!miss.success());
        assert_eq!(space.progress, 1);
    }
    #[test]
    fn space_twice_allows_second_attempt() {
        let mut rng = DebugRand::new_empty();
        rng.ussr_rolls = vec![6, 6, 6];
        let mut space = SpaceRace::new();
        space.advance(0);
        space.advance(0);
        assert!(space.space_twice);
        space.attempt(Side::USSR, 0, &mut rng).unwrap();
        assert!(space.available);
        space.attempt(Side::USSR, 0, &mut rng).unwrap();
        assert!(!space.available);
        space.reset_for_turn();
        assert!(space.available);
    }
    #[test]
    fn rewards_and_minimum_ops() {
        let mut space = SpaceRace::new();
        let rewards: Vec<_> = (0..8).map(|_| space.advance(0).unwrap().reward).collect();
        assert_eq!(rewards[3], Some(SpaceReward::OpponentHeadlinesFirst));
        assert_eq!(rewards[5], Some(SpaceReward::DiscardHeld));
        assert_eq!(rewards[7], Some(SpaceReward::EightActionRounds));
        assert_eq!(space.minimum_ops, 4);
        assert!(!space.available);
        assert!(space.advance(0).is_none());
        space.reset_for_turn();
        assert!(!space.available);
    }

    proptest! {
        #[test]
        fn progress_is_monotonic(rolls in proptest::collection::vec(1i8..=6, 1..40)) {
            let mut rng = DebugRand::new_empty();
            rng.us_rolls = rolls.clone();
            let mut space = SpaceRace::new();
            let mut last = space.progress;
            for _ in 0..rolls.len() {
                space.reset_for_turn();
                if space.attempt(Side::US, 0, &mut rng).is_err() {
                    prop_assert_eq!(space.progress, SPACE_MAX);
                    break;
                }
                prop_assert!(space.progress >= last);
                if space.progress == SPACE_MAX {
                    prop_assert!(!space.available);
                }
                last = space.progress;
            }
        }
    }
}
