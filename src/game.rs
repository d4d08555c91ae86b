use crate::action::{Action, Choice, Decision, OpsAction, Prompt};
use crate::agent::{choose, Actors, Agent};
use crate::card::{Card, DeckError, Effect};
use crate::config::{GameConfig, StartingInfluence, STANDARD_PLACEMENT};
use crate::country::{CName, CountryBundle, MapRegion, Region, Side};
use crate::legal;
use crate::state::{FollowUp, GameState, InternalRand, TwilightRand, Win};
use crate::track::SpaceError;

use log::{debug, info, warn};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GameError {
    #[error("{action:?} is not a legal action for {side:?}")]
    InvalidAction { side: Side, action: Action },
    #[error(transparent)]
    Deck(#[from] DeckError),
    #[error(transparent)]
    Space(#[from] SpaceError),
}

/// Why a step of the game stopped early.
enum Interrupt {
    Over(Win),
    Failed(GameError),
}

impl From<Win> for Interrupt {
    fn from(win: Win) -> Self {
        Interrupt::Over(win)
    }
}

impl From<GameError> for Interrupt {
    fn from(e: GameError) -> Self {
        Interrupt::Failed(e)
    }
}

impl From<DeckError> for Interrupt {
    fn from(e: DeckError) -> Self {
        Interrupt::Failed(e.into())
    }
}

impl From<SpaceError> for Interrupt {
    fn from(e: SpaceError) -> Self {
        Interrupt::Failed(e.into())
    }
}

type Step = Result<(), Interrupt>;

fn settle(step: Step) -> Result<Option<Win>, GameError> {
    match step {
        Ok(()) => Ok(None),
        Err(Interrupt::Over(win)) => Ok(Some(win)),
        Err(Interrupt::Failed(e)) => Err(e),
    }
}

pub struct Game<A: Agent, B: Agent, R: TwilightRand> {
    pub actors: Actors<A, B>,
    pub state: GameState,
    pub rng: R,
    pub config: GameConfig,
    started: bool,
}

impl<A: Agent, B: Agent> Game<A, B, InternalRand> {
    /// A fresh game on our own generator, seeded from the config.
    pub fn seeded(ussr_agent: A, us_agent: B, config: &GameConfig) -> Self {
        let rng = InternalRand::new_seeded(config.seed);
        Game::new(ussr_agent, us_agent, GameState::new(), rng, config.clone())
    }
}

impl<A: Agent, B: Agent, R: TwilightRand> Game<A, B, R> {
    pub fn new(ussr_agent: A, us_agent: B, state: GameState, rng: R, config: GameConfig) -> Self {
        let started = state.turn > 0;
        Game {
            actors: Actors::new(ussr_agent, us_agent),
            state,
            rng,
            config,
            started,
        }
    }
    /// Deals the opening hands and places starting influence.
    pub fn setup(&mut self) -> Result<(), GameError> {
        self.state.begin_game(&mut self.rng)?;
        match self.config.starting_influence {
            StartingInfluence::Standard => {
                for (side, country, n) in STANDARD_PLACEMENT.iter() {
                    self.state.add_influence(*side, *country, *n);
                }
            }
            StartingInfluence::Choose => self.initial_placement(),
            StartingInfluence::Skip => {}
        }
        self.started = true;
        info!(
            "game set up with {:?} starting influence",
            self.config.starting_influence
        );
        Ok(())
    }
    /// Plays to the end: an instant win, or final scoring after the last
    /// turn.
    pub fn play(&mut self) -> Result<Win, GameError> {
        if !self.started {
            self.setup()?;
        }
        let win = match settle(self.run())? {
            Some(win) => win,
            None => self.final_scoring(),
        };
        info!("game over on turn {}: {:?}, VP {}", self.state.turn, win, self.state.vp);
        Ok(win)
    }
    fn run(&mut self) -> Step {
        while self.state.turn < self.config.last_turn {
            self.state.begin_new_turn(&mut self.rng);
            self.do_headline()?;
            self.do_action_rounds()?;
            self.end_turn()?;
        }
        Ok(())
    }
    fn initial_placement(&mut self) {
        let east = CountryBundle::all(&self.state.map)
            .map_region(MapRegion::EasternEurope)
            .names()
            .to_vec();
        let west = CountryBundle::all(&self.state.map)
            .map_region(MapRegion::WesternEurope)
            .names()
            .to_vec();
        for _ in 0..6 {
            self.place_one(Side::USSR, &east);
        }
        for _ in 0..7 {
            self.place_one(Side::US, &west);
        }
        for _ in 0..2 {
            let open = CountryBundle::all(&self.state.map)
                .has_influence(Side::US)
                .names()
                .to_vec();
            self.place_one(Side::US, &open);
        }
    }
    fn place_one(&mut self, side: Side, countries: &[CName]) -> Option<CName> {
        let decision = Decision::countries(side, Prompt::Place, countries);
        match choose(&mut self.actors, &self.state, &decision) {
            Some(Choice::Country(c)) => {
                self.state.add_influence(side, c, 1);
                Some(c)
            }
            _ => None,
        }
    }
    /// Both sides pick a headline card, then the events resolve in order of
    /// ops value, the US going first on ties.
    pub fn headline(&mut self) -> Result<Option<Win>, GameError> {
        settle(self.do_headline())
    }
    fn do_headline(&mut self) -> Step {
        self.state.ar = 0;
        let us_sees = self.state.has_effect(Side::US, Effect::SpaceHeadline);
        let ussr_sees = self.state.has_effect(Side::USSR, Effect::SpaceHeadline);
        // A side with the space race ability picks second and sees the
        // other headline first.
        let (first, reveal) = match (us_sees, ussr_sees) {
            (true, false) => (Side::USSR, true),
            (false, true) => (Side::US, true),
            _ => (Side::USSR, false),
        };
        let a = self.pick_headline(first)?;
        if reveal {
            self.state.headlines[first as usize] = a;
        }
        let b = self.pick_headline(first.opposite())?;
        self.state.headlines[first as usize] = a;
        self.state.headlines[first.opposite() as usize] = b;

        let us = self.state.headlines[Side::US as usize];
        let mut ussr = self.state.headlines[Side::USSR as usize];
        if us == Some(Card::Defectors) {
            if let Some(cancelled) = ussr.take() {
                debug!("Defectors cancels the USSR headline {}", cancelled.name());
                self.state.retire(cancelled, Side::USSR, false);
            }
        }
        let order = match (us, ussr) {
            (Some(x), Some(y)) if x.base_ops() >= y.base_ops() => {
                vec![(Side::US, x), (Side::USSR, y)]
            }
            (Some(x), Some(y)) => vec![(Side::USSR, y), (Side::US, x)],
            (Some(x), None) => vec![(Side::US, x)],
            (None, Some(y)) => vec![(Side::USSR, y)],
            (None, None) => Vec::new(),
        };
        for (side, card) in order {
            self.state.side = side;
            self.state.current_event = Some((card, side));
            self.state.retire(card, side, true);
            let step = self.resolve_event(card, side);
            self.state.current_event = None;
            step?;
        }
        self.state.headlines = [None, None];
        Ok(())
    }
    fn pick_headline(&mut self, side: Side) -> Result<Option<Card>, Interrupt> {
        let cards = legal::headline_cards(&self.state, side);
        let decision = Decision::new(
            side,
            Prompt::Headline,
            cards.into_iter().map(Choice::Card).collect(),
        );
        match choose(&mut self.actors, &self.state, &decision) {
            Some(Choice::Card(card)) => {
                self.state.take_from_hand(side, card)?;
                Ok(Some(card))
            }
            _ => {
                warn!("{:?} has nothing to headline", side);
                Ok(None)
            }
        }
    }
    fn do_action_rounds(&mut self) -> Step {
        let last = std::cmp::max(
            self.state.max_ar(Side::USSR),
            self.state.max_ar(Side::US),
        );
        for ar in 1..=last {
            self.state.ar = ar;
            for &side in [Side::USSR, Side::US].iter() {
                if ar <= self.state.max_ar(side) {
                    self.do_action_round(side)?;
                }
            }
        }
        Ok(())
    }
    /// Asks the side for one play out of everything legal and resolves it.
    pub fn action_round(&mut self, side: Side) -> Result<Option<Win>, GameError> {
        settle(self.do_action_round(side))
    }
    fn do_action_round(&mut self, side: Side) -> Step {
        self.state.side = side;
        let options = legal::legal_actions(&self.state, side)
            .into_iter()
            .map(Choice::Action)
            .collect();
        let decision = Decision::new(side, Prompt::ActionRound, options);
        match choose(&mut self.actors, &self.state, &decision) {
            Some(Choice::Action(action)) => self.play_action(side, action),
            _ => {
                debug!("{:?} has nothing to play in AR {}", side, self.state.ar);
                Ok(())
            }
        }
    }
    /// Plays an action for the side. Anything outside the legal set is
    /// rejected before the state changes.
    pub fn take_action(&mut self, side: Side, action: Action) -> Result<Option<Win>, GameError> {
        if !legal::legal_actions(&self.state, side).contains(&action) {
            return Err(GameError::InvalidAction { side, action });
        }
        settle(self.play_action(side, action))
    }
    /// Resolves one play, then NORAD and the end of game check.
    fn play_action(&mut self, side: Side, action: Action) -> Step {
        debug!("turn {} AR {}: {:?} plays {:?}", self.state.turn, self.state.ar, side, action);
        self.state.side = side;
        let defcon = self.state.defcon.level();
        let card = action.card();
        let ops = card.modified_ops(side, &self.state);
        let evented = match action {
            Action::Ops(..) | Action::Space(_) => false,
            _ => true,
        };
        self.state.take_from_hand(side, card)?;
        self.state.retire(card, side, evented);
        self.state.current_event = Some((card, side));
        let step = match action {
            Action::Event(card) | Action::Score(card) => self.resolve_event(card, side),
            Action::Ops(_, ops_action) => self.apply_ops(side, ops_action, ops),
            Action::EventThenOps(card) => self
                .resolve_event(card, side)
                .and_then(|_| self.choose_ops(side, ops)),
            Action::OpsThenEvent(card, ops_action) => self
                .apply_ops(side, ops_action, ops)
                .and_then(|_| self.resolve_event(card, side)),
            Action::Space(_) => self.space(side),
        };
        self.state.current_event = None;
        step?;
        self.norad(defcon);
        self.state.check_win()?;
        Ok(())
    }
    /// Runs the card's event with the phasing side forced to the card's
    /// side, then checks for the end of the game and runs anything the event
    /// queued.
    fn resolve_event(&mut self, card: Card, played_by: Side) -> Step {
        let prior = self.state.side;
        self.state.side = card.side().unwrap_or(prior);
        let over = card.event(&mut self.state, &mut self.actors, &mut self.rng);
        self.state.side = prior;
        debug!(
            "{} resolved for {:?}{}",
            card.name(),
            played_by,
            if over { ", game over" } else { "" }
        );
        self.state.check_win()?;
        self.resolve_follow_ups()
    }
    fn resolve_follow_ups(&mut self) -> Step {
        while let Some(next) = self.state.follow_ups.pop() {
            match next {
                FollowUp::Ops { side, ops } => self.choose_ops(side, ops)?,
                FollowUp::Event { card, played_by } => {
                    self.state.retire(card, played_by, true);
                    self.resolve_event(card, played_by)?;
                }
            }
        }
        Ok(())
    }
    fn choose_ops(&mut self, side: Side, ops: i8) -> Step {
        let options = legal::ops_actions(&self.state, side, ops)
            .into_iter()
            .map(Choice::Ops)
            .collect();
        let decision = Decision::new(side, Prompt::Ops(ops), options);
        if let Some(Choice::Ops(action)) = choose(&mut self.actors, &self.state, &decision) {
            self.apply_ops(side, action, ops)?;
        }
        Ok(())
    }
    fn apply_ops(&mut self, side: Side, action: OpsAction, ops: i8) -> Step {
        match action {
            OpsAction::Coup(c) => {
                let roll = self.rng.roll(side);
                let delta = self.state.take_coup(side, c, ops, roll);
                debug!("{:?} coups {} with {} ops, roll {}: {}", side, c.name(), ops, roll, delta);
                // The couping side is to blame for nuclear war.
                if self.state.defcon.is_war() {
                    return Err(Win::Defcon(side.opposite()).into());
                }
            }
            OpsAction::Realign(first) => {
                let mut target = Some(first);
                for left in (0..ops).rev() {
                    let c = match target {
                        Some(c) => c,
                        None => break,
                    };
                    let us = self.rng.roll(Side::US);
                    let ussr = self.rng.roll(Side::USSR);
                    let (us, ussr) = self.state.take_realign(c, us, ussr);
                    debug!("realign in {}: US {} USSR {}", c.name(), us, ussr);
                    target = if left > 0 { self.next_realign(side) } else { None };
                }
            }
            OpsAction::Influence(placement) => {
                debug!("{:?} places {:?}", side, placement);
                self.state.place(side, &placement);
            }
        }
        Ok(())
    }
    fn next_realign(&mut self, side: Side) -> Option<CName> {
        let targets = legal::coup_targets(&self.state, side);
        let mut decision = Decision::countries(side, Prompt::Realign, &targets);
        decision.options.push(Choice::Pass);
        match choose(&mut self.actors, &self.state, &decision) {
            Some(Choice::Country(c)) => Some(c),
            _ => None,
        }
    }
    fn space(&mut self, side: Side) -> Step {
        let opp = self.state.player(side.opposite()).space.progress;
        let attempt = self
            .state
            .player_mut(side)
            .space
            .attempt(side, opp, &mut self.rng)?;
        debug!(
            "{:?} space roll {}: {}",
            side,
            attempt.roll,
            if attempt.success() { "success" } else { "failure" }
        );
        if let Some(advance) = attempt.advance {
            self.state.apply_space_advance(side, advance);
        }
        Ok(())
    }
    /// NORAD: when DEFCON has just moved to 2 and the US controls Canada,
    /// the US adds one influence where it already has some.
    fn norad(&mut self, defcon_before: i8) {
        if defcon_before != 2
            && self.state.defcon.level() == 2
            && self.state.has_effect(Side::US, Effect::Norad)
            && self.state.map.control_of(CName::Canada) == Some(Side::US)
        {
            let open = CountryBundle::all(&self.state.map)
                .has_influence(Side::US)
                .names()
                .to_vec();
            if let Some(c) = self.place_one(Side::US, &open) {
                debug!("NORAD places in {}", c.name());
            }
        }
    }
    /// Military ops penalties come first, so a VP win they cause stands
    /// before any held scoring card is looked at.
    fn end_turn(&mut self) -> Step {
        let defcon = self.state.defcon.level();
        for &side in [Side::US, Side::USSR].iter() {
            let short = std::cmp::max(0, defcon - self.state.mil_ops[side as usize]);
            // Penalties score for the opponent
            self.state.vp -= short * side.vp_sign();
        }
        self.state.check_win()?;
        let us_held = self.state.player(Side::US).held_scoring();
        let ussr_held = self.state.player(Side::USSR).held_scoring();
        match (us_held, ussr_held) {
            // US wins if both players hold one
            (true, true) | (false, true) => return Err(Win::HeldScoring(Side::US).into()),
            (true, false) => return Err(Win::HeldScoring(Side::USSR).into()),
            (false, false) => {}
        }
        for &side in [Side::USSR, Side::US].iter() {
            if self.state.has_effect(side, Effect::SpaceDiscard) {
                self.space_discard(side)?;
            }
        }
        self.state.defcon.increase();
        self.state.mil_ops = [0, 0];
        info!(
            "turn {} ends: VP {}, DEFCON {}",
            self.state.turn,
            self.state.vp,
            self.state.defcon.level()
        );
        Ok(())
    }
    fn space_discard(&mut self, side: Side) -> Step {
        let mut options: Vec<Choice> = self
            .state
            .player(side)
            .hand
            .iter()
            .filter(|c| !c.is_scoring())
            .map(|c| Choice::Card(*c))
            .collect();
        options.push(Choice::Pass);
        let decision = Decision::new(side, Prompt::Discard, options);
        if let Some(Choice::Card(card)) = choose(&mut self.actors, &self.state, &decision) {
            self.state.take_from_hand(side, card)?;
            self.state.retire(card, side, false);
        }
        Ok(())
    }
    /// Scores every region, Europe last, and decides the game on the VP
    /// track. A score of zero is a draw.
    pub fn final_scoring(&mut self) -> Win {
        use Region::*;
        for r in [Asia, MiddleEast, Africa, CentralAmerica, SouthAmerica, SoutheastAsia, Europe].iter() {
            let delta = r.score(&mut self.state);
            debug!("final scoring {:?}: {:+}", r, delta);
        }
        let winner = if self.state.vp > 0 {
            Some(Side::US)
        } else if self.state.vp < 0 {
            Some(Side::USSR)
        } else {
            None
        };
        Win::Final(winner)
    }
}
