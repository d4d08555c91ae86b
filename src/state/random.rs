use crate::card::Card;
use crate::country::Side;

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// The nondeterminism involved in Twilight Struggle. It is a trait so games
/// can run on our own seeded generator or on randomness supplied from outside,
/// e.g. a server or a test script.
pub trait TwilightRand {
    /// Rolls a six-sided die for the given side and returns the result.
    fn roll(&mut self, side: Side) -> i8;
    /// Puts the cards into a uniformly random order. Cards are drawn from the
    /// end of the vector, as in a stack.
    fn shuffle(&mut self, cards: &mut Vec<Card>);
    /// Returns a random card from the hand, or None if and only if the hand
    /// is empty.
    fn card_from_hand(&mut self, hand: &[Card]) -> Option<Card>;
}

#[derive(Clone)]
pub struct InternalRand {
    rng: SmallRng,
}

impl InternalRand {
    pub fn new_entropy() -> Self {
        InternalRand {
            rng: SmallRng::from_entropy(),
        }
    }
    pub fn new_seeded(seed: u64) -> Self {
        InternalRand {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl TwilightRand for InternalRand {
    fn roll(&mut self, _side: Side) -> i8 {
        self.rng.gen_range(1, 7)
    }
    fn shuffle(&mut self, cards: &mut Vec<Card>) {
        cards.shuffle(&mut self.rng);
    }
    fn card_from_hand(&mut self, hand: &[Card]) -> Option<Card> {
        hand.choose(&mut self.rng).copied()
    }
}

/// Plays back scripted randomness. Rolls and discards are popped from the end
/// of their vectors; shuffles pop a full replacement order when one is
/// scripted and otherwise leave the cards as they are.
#[derive(Clone, Default)]
pub struct DebugRand {
    pub us_rolls: Vec<i8>,
    pub ussr_rolls: Vec<i8>,
    pub discards: Vec<Card>,
    pub shuffle_order: Vec<Vec<Card>>,
}

impl DebugRand {
    pub fn new_empty() -> Self {
        Self::default()
    }
    /// Queues rolls so they come out in the order given.
    pub fn with_rolls(us: &[i8], ussr: &[i8]) -> Self {
        DebugRand {
            us_rolls: us.iter().rev().copied().collect(),
            ussr_rolls: ussr.iter().rev().copied().collect(),
            ..Self::default()
        }
    }
}

impl TwilightRand for DebugRand {
    fn roll(&mut self, side: Side) -> i8 {
        let rolls = match side {
            Side::US => &mut self.us_rolls,
            Side::USSR => &mut self.ussr_rolls,
        };
        rolls.pop().expect("DebugRand ran out of scripted rolls")
    }
    fn shuffle(&mut self, cards: &mut Vec<Card>) {
        if let Some(order) = self.shuffle_order.pop() {
            *cards = order;
        }
    }
    fn card_from_hand(&mut self, hand: &[Card]) -> Option<Card> {
        match self.discards.pop() {
            Some(card) if hand.contains(&card) => Some(card),
            _ => hand.first().copied(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_is_reproducible() {
        let mut a = InternalRand::new_seeded(11);
        let mut b = InternalRand::new_seeded(11);
        let rolls_a: Vec<i8> = (0..50).map(|_| a.roll(Side::US)).collect();
        let rolls_b: Vec<i8> = (0..50).map(|_| b.roll(Side::USSR)).collect();
        assert_eq!(rolls_a, rolls_b);
        assert!(rolls_a.iter().all(|r| *r >= 1 && *r <= 6));
        let mut x = Card::early_war();
        let mut y = Card::early_war();
        a.shuffle(&mut x);
        b.shuffle(&mut y);
        assert_eq!(x, y);
    }
    #[test]
    fn debug_rolls_in_order() {
        let mut rng = DebugRand::with_rolls(&[1, 2], &[6]);
        assert_eq!(rng.roll(Side::US), 1);
        assert_eq!(rng.roll(Side::USSR), 6);
        assert_eq!(rng.roll(Side::US), 2);
    }
}
