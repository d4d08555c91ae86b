use super::{Card, CardKind, Effect};
use crate::action::{Choice, Decision, Prompt};
use crate::agent::{choose, Agent};
use crate::country::{CName, CountryBundle, MapRegion, Region, Side};
use crate::state::{FollowUp, GameState, TwilightRand};

/// One side adding or removing single influence points over a pool of
/// countries, at most `cap` per country.
struct Spread<'p> {
    chooser: Side,
    /// Whose influence changes.
    target: Side,
    add: bool,
    pool: &'p [CName],
    points: i8,
    cap: i8,
    /// Whether the chooser may stop early.
    optional: bool,
}

impl Spread<'_> {
    /// Returns the number of points applied.
    fn run<A: Agent>(&self, state: &mut GameState, agent: &mut A) -> i8 {
        let mut used = vec![0i8; self.pool.len()];
        let mut applied = 0;
        let prompt = if self.add { Prompt::Place } else { Prompt::Remove };
        while applied < self.points {
            let open: Vec<CName> = self
                .pool
                .iter()
                .zip(used.iter())
                .filter(|(c, n)| {
                    **n < self.cap && (self.add || state.map[**c].has_influence(self.target))
                })
                .map(|(c, _)| *c)
                .collect();
            if open.is_empty() {
                break;
            }
            let mut decision = Decision::countries(self.chooser, prompt, &open);
            if self.optional {
                decision.options.push(Choice::Pass);
            }
            let country = match choose(agent, state, &decision) {
                Some(Choice::Country(c)) => c,
                _ => break,
            };
            if let Some(i) = self.pool.iter().position(|c| *c == country) {
                used[i] += 1;
            }
            if self.add {
                state.add_influence(self.target, country, 1);
            } else {
                state.remove_influence(self.target, country, 1);
            }
            applied += 1;
        }
        applied
    }
}

fn pick_country<A: Agent>(
    state: &GameState,
    agent: &mut A,
    side: Side,
    countries: &[CName],
) -> Option<CName> {
    let decision = Decision::countries(side, Prompt::Target, countries);
    match choose(agent, state, &decision) {
        Some(Choice::Country(c)) => Some(c),
        _ => None,
    }
}

fn pick_flag<A: Agent>(state: &GameState, agent: &mut A, side: Side, card: Card) -> bool {
    let decision = Decision::new(
        side,
        Prompt::Option(card),
        vec![Choice::Flag(true), Choice::Flag(false)],
    );
    match choose(agent, state, &decision) {
        Some(Choice::Flag(x)) => x,
        _ => true,
    }
}

fn map_region(state: &GameState, region: MapRegion) -> CountryBundle<'_> {
    CountryBundle::all(&state.map).map_region(region)
}

impl Card {
    /// Resolves the card's event for the phasing side and returns true if
    /// the game is over afterwards. Player choices go through `agent`.
    pub fn event<A: Agent, R: TwilightRand>(
        &self,
        state: &mut GameState,
        agent: &mut A,
        rng: &mut R,
    ) -> bool {
        use crate::country::CName::*;
        use Card::*;
        let side = state.side;
        if let CardKind::Scoring(region) = self.kind() {
            let delta = region.score(state);
            log::debug!("{} scores {:+}", self.name(), delta);
            return state.winner().is_some();
        }
        match self {
            Duck_and_Cover => {
                state.defcon.decrease();
                state.vp += 5 - state.defcon.level();
            }
            Five_Year_Plan => {
                let card = rng.card_from_hand(&state.player(Side::USSR).hand);
                if let Some(card) = card {
                    if state.take_from_hand(Side::USSR, card).is_ok() {
                        log::debug!("Five Year Plan discards {}", card.name());
                        if card.side() == Some(Side::US) && card.can_event(state) {
                            state.follow_ups.push(FollowUp::Event {
                                card,
                                played_by: Side::USSR,
                            });
                        } else {
                            state.retire(card, Side::USSR, false);
                        }
                    }
                }
            }
            Socialist_Governments => {
                let pool = map_region(state, MapRegion::WesternEurope).names().to_vec();
                Spread {
                    chooser: Side::USSR,
                    target: Side::US,
                    add: false,
                    pool: &pool,
                    points: 3,
                    cap: 2,
                    optional: false,
                }
                .run(state, agent);
            }
            Fidel => {
                state.remove_all(Side::US, Cuba);
                state.control(Side::USSR, Cuba);
            }
            Vietnam_Revolts => state.add_influence(Side::USSR, Vietnam, 2),
            Blockade => {
                let mut options: Vec<Choice> = state
                    .player(Side::US)
                    .hand
                    .iter()
                    .filter(|c| c.modified_ops(Side::US, state) >= 3)
                    .map(|c| Choice::Card(*c))
                    .collect();
                options.push(Choice::Pass);
                let decision = Decision::new(Side::US, Prompt::Discard, options);
                let discarded = match choose(agent, state, &decision) {
                    Some(Choice::Card(c)) => state.take_from_hand(Side::US, c).map(|_| c).ok(),
                    _ => None,
                };
                match discarded {
                    Some(c) => state.retire(c, Side::US, false),
                    None => state.remove_all(Side::US, WGermany),
                }
            }
            Korean_War => {
                let roll = rng.roll(Side::USSR);
                state.war_target(Side::USSR, SKorea, roll, false);
            }
            Romanian_Abdication => {
                state.remove_all(Side::US, Romania);
                state.control(Side::USSR, Romania);
            }
            Arab_Israeli_War => {
                let roll = rng.roll(Side::USSR);
                state.war_target(Side::USSR, Israel, roll, true);
            }
            Comecon => {
                let pool = map_region(state, MapRegion::EasternEurope)
                    .not_enemy_controlled(Side::USSR)
                    .names()
                    .to_vec();
                Spread {
                    chooser: Side::USSR,
                    target: Side::USSR,
                    add: true,
                    pool: &pool,
                    points: 4,
                    cap: 1,
                    optional: false,
                }
                .run(state, agent);
            }
            Nasser => {
                state.add_influence(Side::USSR, Egypt, 2);
                let half = (state.map[Egypt].us + 1) / 2;
                state.remove_influence(Side::US, Egypt, half);
            }
            Warsaw_Pact_Formed => {
                state.add_effect(Side::US, Effect::AllowNato);
                if pick_flag(state, agent, Side::USSR, *self) {
                    for _ in 0..4 {
                        let open = map_region(state, MapRegion::EasternEurope)
                            .has_influence(Side::US)
                            .names()
                            .to_vec();
                        match pick_country(state, agent, Side::USSR, &open) {
                            Some(c) => state.remove_all(Side::US, c),
                            None => break,
                        }
                    }
                } else {
                    let pool = map_region(state, MapRegion::EasternEurope).names().to_vec();
                    Spread {
                        chooser: Side::USSR,
                        target: Side::USSR,
                        add: true,
                        pool: &pool,
                        points: 5,
                        cap: 2,
                        optional: false,
                    }
                    .run(state, agent);
                }
            }
            De_Gaulle_Leads_France => {
                let us = std::cmp::min(2, state.map[France].us);
                state.remove_influence(Side::US, France, us);
                state.add_influence(Side::USSR, France, 1);
                state.add_effect(Side::USSR, Effect::DeGaulle);
            }
            Captured_Nazi_Scientist => {
                let opp = state.player(side.opposite()).space.progress;
                if let Some(advance) = state.player_mut(side).space.advance(opp) {
                    state.apply_space_advance(side, advance);
                }
            }
            Truman_Doctrine => {
                let open = Region::Europe
                    .countries(&state.map)
                    .controlled_by(None)
                    .has_influence(Side::USSR)
                    .names()
                    .to_vec();
                if let Some(c) = pick_country(state, agent, Side::US, &open) {
                    state.remove_all(Side::USSR, c);
                }
            }
            Olympic_Games => {
                let opp = side.opposite();
                if pick_flag(state, agent, opp, *self) {
                    let (mine, theirs) = loop {
                        let mine = rng.roll(side) + 2;
                        let theirs = rng.roll(opp);
                        if mine != theirs {
                            break (mine, theirs);
                        }
                    };
                    let winner = if mine > theirs { side } else { opp };
                    state.vp += 2 * winner.vp_sign();
                } else {
                    state.defcon.decrease();
                    state.follow_ups.push(FollowUp::Ops { side, ops: 4 });
                }
            }
            NATO => state.add_effect(Side::US, Effect::Nato),
            Independent_Reds => {
                let open: Vec<CName> = [Yugoslavia, Romania, Bulgaria, Hungary, Czechoslovakia]
                    .iter()
                    .copied()
                    .filter(|c| state.map[*c].ussr > 0)
                    .collect();
                if let Some(c) = pick_country(state, agent, Side::US, &open) {
                    let country = &mut state.map[c];
                    country.us = std::cmp::max(country.us, country.ussr);
                }
            }
            Marshall_Plan => {
                state.add_effect(Side::US, Effect::AllowNato);
                let pool = map_region(state, MapRegion::WesternEurope)
                    .not_enemy_controlled(Side::US)
                    .names()
                    .to_vec();
                Spread {
                    chooser: Side::US,
                    target: Side::US,
                    add: true,
                    pool: &pool,
                    points: 7,
                    cap: 1,
                    optional: false,
                }
                .run(state, agent);
            }
            Indo_Pakistani_War => {
                if let Some(c) = pick_country(state, agent, side, &[India, Pakistan]) {
                    let roll = rng.roll(side);
                    state.war_target(side, c, roll, false);
                }
            }
            Containment => state.add_effect(Side::US, Effect::Containment),
            CIA_Created => {
                log::debug!("USSR reveals {:?}", state.player(Side::USSR).hand);
                state.follow_ups.push(FollowUp::Ops {
                    side: Side::US,
                    ops: 1,
                });
            }
            US_Japan_Mutual_Defense_Pact => {
                state.control(Side::US, Japan);
                state.add_effect(Side::US, Effect::UsJapanPact);
            }
            Suez_Crisis => {
                Spread {
                    chooser: Side::USSR,
                    target: Side::US,
                    add: false,
                    pool: &[France, UK, Israel],
                    points: 4,
                    cap: 2,
                    optional: false,
                }
                .run(state, agent);
            }
            East_European_Unrest => {
                let amount = if state.turn >= 8 { 2 } else { 1 };
                for _ in 0..3 {
                    let open: Vec<CName> = map_region(state, MapRegion::EasternEurope)
                        .has_influence(Side::USSR)
                        .names()
                        .to_vec();
                    match pick_country(state, agent, Side::US, &open) {
                        Some(c) => {
                            let n = std::cmp::min(amount, state.map[c].ussr);
                            state.remove_influence(Side::USSR, c, n);
                        }
                        None => break,
                    }
                }
            }
            Decolonization => {
                let mut pool = Region::Africa.countries(&state.map).names().to_vec();
                pool.extend(map_region(state, MapRegion::SoutheastAsia).names());
                Spread {
                    chooser: Side::USSR,
                    target: Side::USSR,
                    add: true,
                    pool: &pool,
                    points: 4,
                    cap: 1,
                    optional: false,
                }
                .run(state, agent);
            }
            Red_Scare_Purge => state.add_effect(side, Effect::RedScarePurge),
            UN_Intervention => {
                let options: Vec<Choice> = state
                    .player(side)
                    .hand
                    .iter()
                    .filter(|c| c.side() == Some(side.opposite()))
                    .map(|c| Choice::Card(*c))
                    .collect();
                let decision = Decision::new(side, Prompt::Discard, options);
                if let Some(Choice::Card(c)) = choose(agent, state, &decision) {
                    if state.take_from_hand(side, c).is_ok() {
                        let ops = c.modified_ops(side, state);
                        state.retire(c, side, false);
                        state.follow_ups.push(FollowUp::Ops { side, ops });
                    }
                }
            }
            De_Stalinization => {
                let from = CountryBundle::all(&state.map)
                    .has_influence(Side::USSR)
                    .names()
                    .to_vec();
                let moved = Spread {
                    chooser: Side::USSR,
                    target: Side::USSR,
                    add: false,
                    pool: &from,
                    points: 4,
                    cap: 4,
                    optional: true,
                }
                .run(state, agent);
                let to = CountryBundle::all(&state.map)
                    .not_enemy_controlled(Side::USSR)
                    .names()
                    .to_vec();
                Spread {
                    chooser: Side::USSR,
                    target: Side::USSR,
                    add: true,
                    pool: &to,
                    points: moved,
                    cap: 2,
                    optional: false,
                }
                .run(state, agent);
            }
            Nuclear_Test_Ban => {
                let level = state.defcon.level();
                state.vp += (level - 2) * side.vp_sign();
                state.defcon.set(level + 2);
            }
            Formosan_Resolution => state.add_effect(Side::US, Effect::FormosanResolution),
            Defectors => {
                if let Some((_, Side::USSR)) = state.current_event {
                    if state.ar > 0 {
                        state.vp += 1;
                    }
                }
            }
            Cambridge_Five => {
                let scoring = state.player(Side::US).scoring_cards();
                log::debug!("US reveals scoring cards {:?}", scoring);
                let mut open = Vec::new();
                for card in scoring {
                    if let CardKind::Scoring(region) = card.kind() {
                        open.extend(region.countries(&state.map).names());
                    }
                }
                open.sort();
                open.dedup();
                if let Some(c) = pick_country(state, agent, Side::USSR, &open) {
                    state.add_influence(Side::USSR, c, 1);
                }
            }
            Special_Relationship => {
                if state.map.control_of(UK) == Some(Side::US) {
                    if state.has_effect(Side::US, Effect::Nato) {
                        let open = map_region(state, MapRegion::WesternEurope).names().to_vec();
                        if let Some(c) = pick_country(state, agent, Side::US, &open) {
                            state.add_influence(Side::US, c, 2);
                            state.vp += 2;
                        }
                    } else {
                        let open: Vec<CName> = state.map.neighbors(UK).collect();
                        if let Some(c) = pick_country(state, agent, Side::US, &open) {
                            state.add_influence(Side::US, c, 1);
                        }
                    }
                }
            }
            NORAD => state.add_effect(Side::US, Effect::Norad),
            _ => log::debug!("{} has no board effect", self.name()),
        }
        state.winner().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{Actors, ScriptedAgent};
    use crate::country::CName::*;
    use crate::state::DebugRand;

    type Script = Actors<ScriptedAgent, ScriptedAgent>;

    fn script(ussr: Vec<Choice>, us: Vec<Choice>) -> Script {
        Actors::new(ScriptedAgent::new(ussr), ScriptedAgent::new(us))
    }

    fn fire(card: Card, side: Side, state: &mut GameState, agent: &mut Script, rng: &mut DebugRand) -> bool {
        state.side = side;
        card.event(state, agent, rng)
    }

    #[test]
    fn fidel_takes_cuba() {
        let mut state = GameState::new();
        state.map[Cuba].us = 2;
        let mut agent = script(vec![], vec![]);
        let mut rng = DebugRand::new_empty();
        assert!(!fire(Card::Fidel, Side::USSR, &mut state, &mut agent, &mut rng));
        assert_eq!(state.map[Cuba].us, 0);
        assert_eq!(state.map.control_of(Cuba), Some(Side::USSR));
    }
    #[test]
    fn socialist_governments_caps_per_country() {
        let mut state = GameState::new();
        let uk = Choice::Country(UK);
        let mut agent = script(vec![uk.clone(), uk.clone(), uk], vec![]);
        let mut rng = DebugRand::new_empty();
        fire(Card::Socialist_Governments, Side::USSR, &mut state, &mut agent, &mut rng);
        assert_eq!(state.map[UK].us, 3);
        // A third UK point is over the cap, so the first open country goes
        assert_eq!(agent.ussr().missed(), 1);
        assert_eq!(state.map[Canada].us, 1);
    }
    #[test]
    fn duck_and_cover() {
        let mut state = GameState::new();
        let mut agent = script(vec![], vec![]);
        let mut rng = DebugRand::new_empty();
        assert!(!fire(Card::Duck_and_Cover, Side::US, &mut state, &mut agent, &mut rng));
        assert_eq!(state.defcon.level(), 4);
        assert_eq!(state.vp, 1);
        state.defcon.set(2);
        assert!(fire(Card::Duck_and_Cover, Side::US, &mut state, &mut agent, &mut rng));
    }
    #[test]
    fn five_year_plan_triggers_us_events() {
        let mut state = GameState::new();
        state.player_mut(Side::USSR).hand = vec![Card::Fidel, Card::Containment];
        let mut agent = script(vec![], vec![]);
        let mut rng = DebugRand::new_empty();
        rng.discards = vec![Card::Containment];
        fire(Card::Five_Year_Plan, Side::US, &mut state, &mut agent, &mut rng);
        assert_eq!(state.player(Side::USSR).hand, vec![Card::Fidel]);
        assert_eq!(
            state.follow_ups,
            vec![FollowUp::Event {
                card: Card::Containment,
                played_by: Side::USSR
            }]
        );
        rng.discards = vec![Card::Fidel];
        fire(Card::Five_Year_Plan, Side::US, &mut state, &mut agent, &mut rng);
        assert!(state.player(Side::USSR).hand.is_empty());
        assert_eq!(state.deck.discard_pile().cards(), &[Card::Fidel]);
        assert_eq!(state.follow_ups.len(), 1);
    }
    #[test]
    fn nasser_halves_us() {
        let mut state = GameState::new();
        state.map[Egypt].us = 3;
        let mut agent = script(vec![], vec![]);
        let mut rng = DebugRand::new_empty();
        fire(Card::Nasser, Side::USSR, &mut state, &mut agent, &mut rng);
        assert_eq!(state.map[Egypt].us, 1);
        assert_eq!(state.map[Egypt].ussr, 2);
    }
    #[test]
    fn blockade_discard_or_lose_germany() {
        let mut state = GameState::new();
        state.map[WGermany].us = 4;
        state.player_mut(Side::US).hand = vec![Card::Marshall_Plan, Card::Fidel];
        let mut agent = script(vec![], vec![Choice::Card(Card::Marshall_Plan), Choice::Pass]);
        let mut rng = DebugRand::new_empty();
        fire(Card::Blockade, Side::USSR, &mut state, &mut agent, &mut rng);
        assert_eq!(state.map[WGermany].us, 4);
        assert_eq!(state.player(Side::US).hand, vec![Card::Fidel]);
        fire(Card::Blockade, Side::USSR, &mut state, &mut agent, &mut rng);
        assert_eq!(state.map[WGermany].us, 0);
    }
    #[test]
    fn olympic_boycott_and_games() {
        let mut state = GameState::new();
        let mut agent = script(vec![Choice::Flag(false), Choice::Flag(true)], vec![]);
        let mut rng = DebugRand::with_rolls(&[3, 2], &[5, 6]);
        fire(Card::Olympic_Games, Side::US, &mut state, &mut agent, &mut rng);
        assert_eq!(state.defcon.level(), 4);
        assert_eq!(state.follow_ups, vec![FollowUp::Ops { side: Side::US, ops: 4 }]);
        // 3 + 2 ties with 5, then 2 + 2 loses to 6
        fire(Card::Olympic_Games, Side::US, &mut state, &mut agent, &mut rng);
        assert_eq!(state.vp, -2);
    }
    #[test]
    fn warsaw_pact_places() {
        let mut state = GameState::new();
        let mut agent = script(
            vec![
                Choice::Flag(false),
                Choice::Country(Poland),
                Choice::Country(Poland),
                Choice::Country(Poland),
                Choice::Country(Hungary),
                Choice::Country(Hungary),
            ],
            vec![],
        );
        let mut rng = DebugRand::new_empty();
        fire(Card::Warsaw_Pact_Formed, Side::USSR, &mut state, &mut agent, &mut rng);
        assert!(state.has_effect(Side::US, Effect::AllowNato));
        assert_eq!(state.map[Poland].ussr, 2);
        assert_eq!(state.map[Hungary].ussr, 2);
        // The third Poland pick fell back to the first open country
        assert_eq!(agent.ussr().missed(), 1);
        assert_eq!(state.map[Finland].ussr, 2);
    }
    #[test]
    fn un_intervention_queues_ops() {
        let mut state = GameState::new();
        state.player_mut(Side::US).hand = vec![Card::Fidel, Card::NATO];
        let mut agent = script(vec![], vec![Choice::Card(Card::Fidel)]);
        let mut rng = DebugRand::new_empty();
        fire(Card::UN_Intervention, Side::US, &mut state, &mut agent, &mut rng);
        assert_eq!(state.player(Side::US).hand, vec![Card::NATO]);
        assert_eq!(state.deck.discard_pile().cards(), &[Card::Fidel]);
        assert_eq!(state.follow_ups, vec![FollowUp::Ops { side: Side::US, ops: 2 }]);
        assert_eq!(state.map.control_of(Cuba), None);
    }
    #[test]
    fn test_ban_scores_then_improves() {
        let mut state = GameState::new();
        state.defcon.set(3);
        let mut agent = script(vec![], vec![]);
        let mut rng = DebugRand::new_empty();
        fire(Card::Nuclear_Test_Ban, Side::USSR, &mut state, &mut agent, &mut rng);
        assert_eq!(state.vp, -1);
        assert_eq!(state.defcon.level(), 5);
    }
    #[test]
    fn scoring_card_scores() {
        let mut state = GameState::new();
        let mut agent = script(vec![], vec![]);
        let mut rng = DebugRand::new_empty();
        // Scoring depends only on the board
        fire(Card::Middle_East_Scoring, Side::US, &mut state, &mut agent, &mut rng);
        assert_eq!(state.vp, Region::MiddleEast.score(&mut state.clone()));
    }
}
