use super::Card;
use crate::country::Side;
use crate::state::TwilightRand;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DeckError {
    #[error("the {0:?} pile is empty and has nothing to refill from")]
    EmptyPile(PileKind),
    #[error("{card:?} is not in the {side:?} hand")]
    NotInHand { card: Card, side: Side },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PileKind {
    Draw,
    Discard,
    Removed,
}

/// An ordered stack of cards. Draws come off the end.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pile {
    kind: PileKind,
    cards: Vec<Card>,
}

impl Pile {
    pub fn new(kind: PileKind, cards: Vec<Card>) -> Self {
        Pile { kind, cards }
    }
    pub fn kind(&self) -> PileKind {
        self.kind
    }
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }
    pub fn len(&self) -> usize {
        self.cards.len()
    }
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
    pub fn contains(&self, card: Card) -> bool {
        self.cards.contains(&card)
    }
    pub fn push(&mut self, card: Card) {
        self.cards.push(card);
    }
    pub fn extend(&mut self, cards: Vec<Card>) {
        self.cards.extend(cards);
    }
    pub fn shuffle<R: TwilightRand>(&mut self, rng: &mut R) {
        rng.shuffle(&mut self.cards);
    }
    /// Takes every card out of the pile.
    pub fn take_all(&mut self) -> Vec<Card> {
        std::mem::replace(&mut self.cards, Vec::new())
    }
    /// Draws `n` cards. When this pile runs out, the refill pile (if any) is
    /// shuffled and becomes this pile. If there is nothing left to draw the
    /// pile is put back as it was and `EmptyPile` is returned.
    pub fn draw<R: TwilightRand>(
        &mut self,
        n: usize,
        mut refill: Option<&mut Pile>,
        rng: &mut R,
    ) -> Result<Vec<Card>, DeckError> {
        let mut drawn = Vec::with_capacity(n);
        while drawn.len() < n {
            if self.cards.is_empty() {
                if let Some(source) = refill.as_mut() {
                    if !source.is_empty() {
                        log::debug!("reshuffling {} cards into the draw pile", source.len());
                        self.cards = source.take_all();
                        self.shuffle(rng);
                    }
                }
            }
            match self.cards.pop() {
                Some(card) => drawn.push(card),
                None => {
                    self.cards.extend(drawn.into_iter().rev());
                    return Err(DeckError::EmptyPile(self.kind));
                }
            }
        }
        Ok(drawn)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Deck {
    draw: Pile,
    discard: Pile,
    removed: Pile,
}

impl Default for Deck {
    fn default() -> Self {
        Deck::new()
    }
}

impl Deck {
    /// An unshuffled early war deck.
    pub fn new() -> Self {
        Deck {
            draw: Pile::new(PileKind::Draw, Card::early_war()),
            discard: Pile::new(PileKind::Discard, Vec::new()),
            removed: Pile::new(PileKind::Removed, Vec::new()),
        }
    }
    pub fn draw_pile(&self) -> &Pile {
        &self.draw
    }
    pub fn discard_pile(&self) -> &Pile {
        &self.discard
    }
    pub fn removed(&self) -> &Pile {
        &self.removed
    }
    pub fn shuffle<R: TwilightRand>(&mut self, rng: &mut R) {
        self.draw.shuffle(rng);
    }
    /// Draws from the draw pile, reshuffling the discards in when needed.
    pub fn draw<R: TwilightRand>(&mut self, n: usize, rng: &mut R) -> Result<Vec<Card>, DeckError> {
        self.draw.draw(n, Some(&mut self.discard), rng)
    }
    pub fn discard(&mut self, card: Card) {
        self.discard.push(card);
    }
    pub fn remove(&mut self, card: Card) {
        self.removed.push(card);
    }
    pub fn add_mid_war<R: TwilightRand>(&mut self, rng: &mut R) {
        self.draw.extend(Card::mid_war());
        self.draw.shuffle(rng);
    }
    pub fn add_late_war<R: TwilightRand>(&mut self, rng: &mut R) {
        self.draw.extend(Card::late_war());
        self.draw.shuffle(rng);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{DebugRand, InternalRand};

    #[test]
    fn draws_from_the_end() {
        let mut rng = DebugRand::new_empty();
        let mut pile = Pile::new(PileKind::Draw, vec![Card::Fidel, Card::NATO, Card::Nasser]);
        let hand = pile.draw(2, None, &mut rng).unwrap();
        assert_eq!(hand, vec![Card::Nasser, Card::NATO]);
        assert_eq!(pile.cards(), &[Card::Fidel]);
    }
    #[test]
    fn empty_pile_is_an_error() {
        let mut rng = DebugRand::new_empty();
        let mut pile = Pile::new(PileKind::Draw, vec![Card::Fidel, Card::NATO]);
        assert_eq!(
            pile.draw(3, None, &mut rng),
            Err(DeckError::EmptyPile(PileKind::Draw))
        );
        // Nothing was lost.
        assert_eq!(pile.cards(), &[Card::Fidel, Card::NATO]);
    }
    #[test]
    fn refills_from_discard() {
        let mut rng = InternalRand::new_seeded(3);
        let mut draw = Pile::new(PileKind::Draw, vec![Card::Fidel]);
        let mut discard = Pile::new(PileKind::Discard, vec![Card::NATO, Card::Nasser, Card::Comecon]);
        let hand = draw.draw(3, Some(&mut discard), &mut rng).unwrap();
        assert_eq!(hand.len(), 3);
        assert_eq!(hand[0], Card::Fidel);
        assert!(discard.is_empty());
        assert_eq!(draw.len(), 1);
        let mut all = hand.clone();
        all.extend(draw.cards());
        all.sort();
        assert_eq!(all, vec![Card::Fidel, Card::Comecon, Card::Nasser, Card::NATO]);
    }
    #[test]
    fn war_pools() {
        let mut rng = InternalRand::new_seeded(0);
        let mut deck = Deck::new();
        assert_eq!(deck.draw_pile().len(), 38);
        deck.add_mid_war(&mut rng);
        assert_eq!(deck.draw_pile().len(), 86);
        deck.add_late_war(&mut rng);
        assert_eq!(deck.draw_pile().len(), 109);
        let cards = deck.draw(109, &mut rng).unwrap();
        assert_eq!(cards.len(), 109);
        assert!(deck.draw(1, &mut rng).is_err());
    }
}
