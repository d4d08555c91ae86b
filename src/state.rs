use crate::action::{Action, Placement};
use crate::card::*;
use crate::country::*;
use crate::player::Player;
use crate::track::{Defcon, SpaceAdvance, SpaceReward};

use serde::{Deserialize, Serialize};

mod random;
pub use random::{DebugRand, InternalRand, TwilightRand};

/// Work queued by an event that the game resolves once the event is done.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum FollowUp {
    /// The side conducts operations with the given value.
    Ops { side: Side, ops: i8 },
    /// The card's event resolves as though `played_by` had played it.
    Event { card: Card, played_by: Side },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub map: Map,
    pub vp: i8,
    pub defcon: Defcon,
    pub turn: i8,
    pub ar: i8,
    /// Action rounds per side this turn.
    pub rounds: i8,
    pub hand_size: usize,
    pub side: Side,
    pub players: [Player; 2],
    pub deck: Deck,
    effects: Vec<(Side, Effect)>,
    pub mil_ops: [i8; 2],
    /// The card being resolved and the side that played it.
    pub current_event: Option<(Card, Side)>,
    pub follow_ups: Vec<FollowUp>,
    /// Headline cards, indexed by side. Only set once revealed.
    pub headlines: [Option<Card>; 2],
}

impl Default for GameState {
    fn default() -> Self {
        GameState::new()
    }
}

impl GameState {
    pub fn new() -> GameState {
        GameState {
            map: Map::standard(),
            vp: 0,
            defcon: Defcon::new(),
            turn: 0,
            ar: 0,
            rounds: 6,
            hand_size: 8,
            side: Side::USSR,
            players: [Player::new(Side::US), Player::new(Side::USSR)],
            deck: Deck::new(),
            effects: Vec::new(),
            mil_ops: [0, 0],
            current_event: None,
            follow_ups: Vec::new(),
            headlines: [None, None],
        }
    }
    /// Puts everything back to the state before `begin_game`.
    pub fn reset_game(&mut self) {
        *self = GameState::new();
    }
    /// Shuffles the early war deck, deals the opening hands and gives the
    /// USSR the China Card face up.
    pub fn begin_game<R: TwilightRand>(&mut self, rng: &mut R) -> Result<(), DeckError> {
        self.deck.shuffle(rng);
        self.deal(rng)?;
        self.player_mut(Side::USSR).receive_china(true);
        log::debug!("opening hands dealt");
        Ok(())
    }
    pub fn begin_new_turn<R: TwilightRand>(&mut self, rng: &mut R) {
        self.turn += 1;
        self.ar = 0;
        if self.turn == 4 {
            self.hand_size = 9;
            self.rounds = 7;
            self.deck.add_mid_war(rng);
        } else if self.turn == 8 {
            self.deck.add_late_war(rng);
        }
        self.turn_effect_clear();
        for p in self.players.iter_mut() {
            p.space.reset_for_turn();
            p.activate_china();
        }
        if let Err(e) = self.deal(rng) {
            log::warn!("short deal on turn {}: {}", self.turn, e);
        }
        log::info!(
            "turn {} begins: VP {}, DEFCON {}",
            self.turn,
            self.vp,
            self.defcon.level()
        );
    }
    /// Tops both hands up to the hand size, one card at a time starting with
    /// the USSR.
    pub fn deal<R: TwilightRand>(&mut self, rng: &mut R) -> Result<(), DeckError> {
        let target = self.hand_size;
        loop {
            let mut dealt = false;
            for &side in [Side::USSR, Side::US].iter() {
                if self.player(side).hand.len() < target {
                    let cards = self.deck.draw(1, rng)?;
                    self.player_mut(side).receive_cards(cards);
                    dealt = true;
                }
            }
            if !dealt {
                return Ok(());
            }
        }
    }
    pub fn player(&self, side: Side) -> &Player {
        &self.players[side as usize]
    }
    pub fn player_mut(&mut self, side: Side) -> &mut Player {
        &mut self.players[side as usize]
    }
    pub fn period(&self) -> Period {
        if self.turn <= 3 {
            Period::Early
        } else if self.turn <= 7 {
            Period::Mid
        } else {
            Period::Late
        }
    }
    pub fn max_ar(&self, side: Side) -> i8 {
        if self.has_effect(side, Effect::SpaceStation) {
            8
        } else {
            self.rounds
        }
    }
    pub fn check_win(&self) -> Result<(), Win> {
        if self.defcon.is_war() {
            // The phasing player takes the blame.
            return Err(Win::Defcon(self.side.opposite()));
        }
        if self.vp >= 20 {
            return Err(Win::Vp(Side::US));
        } else if self.vp <= -20 {
            return Err(Win::Vp(Side::USSR));
        }
        Ok(())
    }
    pub fn winner(&self) -> Option<Win> {
        self.check_win().err()
    }
    /// Return true if the side has the effect, else false.
    pub fn has_effect(&self, side: Side, effect: Effect) -> bool {
        self.effects.iter().any(|x| *x == (side, effect))
    }
    pub fn add_effect(&mut self, side: Side, effect: Effect) {
        if !self.has_effect(side, effect) {
            self.effects.push((side, effect));
        }
    }
    pub fn clear_effect(&mut self, side: Side, effect: Effect) {
        self.effects.retain(|x| *x != (side, effect));
    }
    pub fn effects(&self) -> &[(Side, Effect)] {
        &self.effects
    }
    /// Clears all effects that are meant to only last for a single turn.
    pub fn turn_effect_clear(&mut self) {
        self.effects.retain(|(_, e)| e.scope() == Scope::Game);
    }
    /// Raises the side's influence to the minimum needed for control, if it
    /// does not already control the country.
    pub fn control(&mut self, side: Side, country: CName) {
        let c = &mut self.map[country];
        let needed = c.influence(side.opposite()) + c.stability;
        let own = c.influence_mut(side);
        *own = std::cmp::max(*own, needed);
    }
    pub fn add_influence(&mut self, side: Side, country: CName, num: i8) {
        *self.map[country].influence_mut(side) += num;
    }
    pub fn remove_influence(&mut self, side: Side, country: CName, num: i8) {
        let inf = self.map[country].influence_mut(side);
        debug_assert!(*inf >= num, "removing more influence than present");
        *inf -= num;
    }
    pub fn remove_all(&mut self, side: Side, country: CName) {
        *self.map[country].influence_mut(side) = 0;
    }
    pub fn place(&mut self, side: Side, placement: &Placement) {
        for (c, n) in placement.iter() {
            self.add_influence(side, *c, *n);
        }
    }
    /// Resolves a coup and returns the coup's net result. Coups in
    /// battlegrounds degrade DEFCON.
    pub fn take_coup(&mut self, side: Side, country: CName, ops: i8, roll: i8) -> i8 {
        let c = &mut self.map[country];
        let delta = std::cmp::max(0, ops + roll - 2 * c.stability);
        let enemy = c.influence(side.opposite());
        if delta > enemy {
            *c.influence_mut(side.opposite()) = 0;
            *c.influence_mut(side) += delta - enemy;
        } else {
            *c.influence_mut(side.opposite()) -= delta;
        }
        if c.bg {
            self.defcon.decrease();
        }
        self.add_mil_ops(side, ops);
        delta
    }
    /// Resolves a single realignment roll. Returns the modified rolls.
    pub fn take_realign(&mut self, country: CName, mut us_roll: i8, mut ussr_roll: i8) -> (i8, i8) {
        us_roll += self.adjacent_controlled(country, Side::US);
        ussr_roll += self.adjacent_controlled(country, Side::USSR);
        let c = &mut self.map[country];
        if c.us > c.ussr {
            us_roll += 1;
        } else if c.ussr > c.us {
            ussr_roll += 1;
        }
        if c.borders_home(Side::US) {
            us_roll += 1;
        }
        if c.borders_home(Side::USSR) {
            ussr_roll += 1;
        }
        if us_roll > ussr_roll {
            c.ussr = std::cmp::max(0, c.ussr - (us_roll - ussr_roll));
        } else if ussr_roll > us_roll {
            c.us = std::cmp::max(0, c.us - (ussr_roll - us_roll));
        }
        (us_roll, ussr_roll)
    }
    /// Calculates the number of adjacent controlled countries for use in
    /// wars and realignments.
    pub fn adjacent_controlled(&self, country: CName, side: Side) -> i8 {
        self.map
            .neighbors(country)
            .filter(|c| self.map.control_of(*c) == Some(side))
            .count() as i8
    }
    /// Resolves a war on a standard 4-6 roll, less one per enemy-controlled
    /// neighbour (and for the target itself if `count_target`). Success
    /// scores 2 VP and hands the target's influence to the attacker.
    pub fn war_target(&mut self, war_side: Side, country: CName, roll: i8, count_target: bool) -> bool {
        let enemy = war_side.opposite();
        let mut roll = roll - self.adjacent_controlled(country, enemy);
        if count_target && self.map.control_of(country) == Some(enemy) {
            roll -= 1;
        }
        self.add_mil_ops(war_side, 2);
        if roll >= 4 {
            self.war_flip(war_side, country);
            self.vp += 2 * war_side.vp_sign();
            true
        } else {
            false
        }
    }
    fn war_flip(&mut self, war_side: Side, country: CName) {
        let c = &mut self.map[country];
        let opp = c.influence(war_side.opposite());
        *c.influence_mut(war_side.opposite()) = 0;
        *c.influence_mut(war_side) += opp;
    }
    pub fn add_mil_ops(&mut self, side: Side, amount: i8) {
        let mil_ops = self.mil_ops[side as usize];
        self.mil_ops[side as usize] = std::cmp::min(5, mil_ops + amount);
    }
    /// Scores a space race advance and hands out its reward. Reaching a
    /// reward level second cancels the opponent's reward instead.
    pub fn apply_space_advance(&mut self, side: Side, advance: SpaceAdvance) {
        self.vp += advance.vps * side.vp_sign();
        if let Some(reward) = advance.reward {
            let effect = match reward {
                SpaceReward::OpponentHeadlinesFirst => Effect::SpaceHeadline,
                SpaceReward::DiscardHeld => Effect::SpaceDiscard,
                SpaceReward::EightActionRounds => Effect::SpaceStation,
            };
            if advance.first {
                self.add_effect(side, effect);
            } else {
                self.clear_effect(side.opposite(), effect);
            }
        }
    }
    pub fn take_from_hand(&mut self, side: Side, card: Card) -> Result<(), DeckError> {
        let player = self.player_mut(side);
        if card == Card::The_China_Card {
            if player.has_china() {
                player.china = crate::player::ChinaCard::Unheld;
                Ok(())
            } else {
                Err(DeckError::NotInHand { card, side })
            }
        } else {
            player.take_card(card)
        }
    }
    /// Moves a played card to where it belongs: the China Card to the
    /// opponent face down, starred events out of the game, everything else
    /// to the discards.
    pub fn retire(&mut self, card: Card, side: Side, evented: bool) {
        if card == Card::The_China_Card {
            self.player_mut(side.opposite()).receive_china(false);
            if side == Side::US {
                self.clear_effect(Side::US, Effect::FormosanResolution);
            }
        } else if evented && card.is_starred() {
            self.deck.remove(card);
        } else {
            self.deck.discard(card);
        }
    }
    pub fn legal_actions(&self, side: Side) -> Vec<Action> {
        crate::legal::legal_actions(self, side)
    }
    pub fn save(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
    pub fn load(json: &str) -> Result<GameState, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Win {
    Defcon(Side),
    Vp(Side),
    HeldScoring(Side),
    /// Final scoring after the last turn. None is a draw.
    Final(Option<Side>),
}

impl Win {
    pub fn winner(&self) -> Option<Side> {
        match self {
            Win::Defcon(s) | Win::Vp(s) | Win::HeldScoring(s) => Some(*s),
            Win::Final(s) => *s,
        }
    }
}
