use crate::card::{Card, DeckError};
use crate::country::Side;
use crate::track::SpaceRace;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChinaCard {
    Unheld,
    Available,
    /// Held face down after being received this turn.
    Unavailable,
}

impl ChinaCard {
    /// 0 when not held, +1 when held face up, -1 when held face down.
    pub fn value(&self) -> i8 {
        match self {
            ChinaCard::Unheld => 0,
            ChinaCard::Available => 1,
            ChinaCard::Unavailable => -1,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub side: Side,
    pub hand: Vec<Card>,
    pub china: ChinaCard,
    pub space: SpaceRace,
}

impl Player {
    pub fn new(side: Side) -> Self {
        Player {
            side,
            hand: Vec::new(),
            china: ChinaCard::Unheld,
            space: SpaceRace::new(),
        }
    }
    pub fn receive_cards(&mut self, cards: Vec<Card>) {
        self.hand.extend(cards);
    }
    pub fn take_card(&mut self, card: Card) -> Result<(), DeckError> {
        match self.hand.iter().position(|c| *c == card) {
            Some(i) => {
                self.hand.swap_remove(i);
                Ok(())
            }
            None => Err(DeckError::NotInHand {
                card,
                side: self.side,
            }),
        }
    }
    pub fn has_china(&self) -> bool {
        self.china == ChinaCard::Available
    }
    pub fn receive_china(&mut self, available: bool) {
        self.china = if available {
            ChinaCard::Available
        } else {
            ChinaCard::Unavailable
        };
    }
    pub fn activate_china(&mut self) {
        if self.china == ChinaCard::Unavailable {
            self.china = ChinaCard::Available;
        }
    }
    pub fn scoring_cards(&self) -> Vec<Card> {
        self.hand.iter().copied().filter(|c| c.is_scoring()).collect()
    }
    pub fn held_scoring(&self) -> bool {
        self.hand.iter().any(|c| c.is_scoring())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hand_handling() {
        let mut p = Player::new(Side::US);
        p.receive_cards(vec![Card::NATO, Card::Asia_Scoring, Card::Fidel]);
        assert!(p.held_scoring());
        assert_eq!(p.scoring_cards(), vec![Card::Asia_Scoring]);
        p.take_card(Card::Asia_Scoring).unwrap();
        assert!(!p.held_scoring());
        assert_eq!(
            p.take_card(Card::Asia_Scoring),
            Err(DeckError::NotInHand {
                card: Card::Asia_Scoring,
                side: Side::US
            })
        );
    }
    #[test]
    fn china_card_states() {
        let mut p = Player::new(Side::USSR);
        assert_eq!(p.china.value(), 0);
        p.receive_china(false);
        assert_eq!(p.china.value(), -1);
        assert!(!p.has_china());
        p.activate_china();
        assert_eq!(p.china.value(), 1);
    }
}
