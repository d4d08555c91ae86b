use crate::country::{CName, Side};

use serde::{Deserialize, Serialize};

/// The fixed opening placement used by `StartingInfluence::Standard`.
pub const STANDARD_PLACEMENT: [(Side, CName, i8); 6] = [
    (Side::USSR, CName::EGermany, 1),
    (Side::USSR, CName::Poland, 4),
    (Side::USSR, CName::Yugoslavia, 1),
    (Side::US, CName::WGermany, 4),
    (Side::US, CName::Italy, 3),
    (Side::US, CName::Iran, 2),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StartingInfluence {
    /// A common fixed opening.
    Standard,
    /// The agents place: USSR 6 in Eastern Europe, US 7 in Western Europe,
    /// then US 2 more where it already has influence.
    Choose,
    /// Leave only the influence printed on the map.
    Skip,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub seed: u64,
    pub starting_influence: StartingInfluence,
    /// Final scoring happens after this turn.
    pub last_turn: i8,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            seed: 0,
            starting_influence: StartingInfluence::Standard,
            last_turn: 10,
        }
    }
}

impl GameConfig {
    pub fn from_json(json: &str) -> Result<GameConfig, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_fills_defaults() {
        let config = GameConfig::from_json(r#"{"seed": 42}"#).unwrap();
        assert_eq!(config.seed, 42);
        assert_eq!(config.last_turn, 10);
        assert_eq!(config.starting_influence, StartingInfluence::Standard);
        let config =
            GameConfig::from_json(r#"{"starting_influence": "Choose", "last_turn": 3}"#).unwrap();
        assert_eq!(config.starting_influence, StartingInfluence::Choose);
        assert_eq!(config.last_turn, 3);
        assert!(GameConfig::from_json(r#"{"last_turn": "soon"}"#).is_err());
    }
    #[test]
    fn standard_totals() {
        let total = |side| {
            STANDARD_PLACEMENT
                .iter()
                .filter(|(s, _, _)| *s == side)
                .map(|(_, _, n)| n)
                .sum::<i8>()
        };
        assert_eq!(total(Side::USSR), 6);
        assert_eq!(total(Side::US), 9);
    }
}
