use serde::{Deserialize, Serialize};

/// How long a modifier lasts once added.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scope {
    /// Cleared at the start of the next turn.
    Turn,
    /// Lasts until a later event or game rule clears it.
    Game,
}

/// Named rule modifiers left behind by events and space race rewards. They
/// are stored per side on the game state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Effect {
    Containment,
    RedScarePurge,
    AllowNato,
    Nato,
    DeGaulle,
    UsJapanPact,
    FormosanResolution,
    Norad,
    /// Space race level 4: the opponent reveals its headline first.
    SpaceHeadline,
    /// Space race level 6.
    SpaceDiscard,
    /// Space race level 8.
    SpaceStation,
}

impl Effect {
    pub fn scope(&self) -> Scope {
        match self {
            Effect::Containment | Effect::RedScarePurge => Scope::Turn,
            _ => Scope::Game,
        }
    }
}
