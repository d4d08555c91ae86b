//! Enumeration of legal moves. Everything here is a pure function of the
//! game state, so it is safe to call on independent clones in parallel.

use crate::action::{Action, OpsAction, Placement};
use crate::card::{Card, Effect};
use crate::country::{CName, Country, Region, Side};
use crate::state::GameState;

/// Countries the side may coup or realign: the enemy has influence there,
/// DEFCON allows the region and no event protects it.
pub fn coup_targets(state: &GameState, side: Side) -> Vec<CName> {
    let defcon = state.defcon.level();
    state
        .map
        .iter()
        .filter(|c| c.has_influence(side.opposite()))
        .filter(|c| c.defcon_legal(defcon))
        .filter(|c| !protected(state, side, c))
        .map(|c| c.name)
        .collect()
}

fn protected(state: &GameState, side: Side, c: &Country) -> bool {
    if side != Side::USSR {
        return false;
    }
    let nato = state.has_effect(Side::US, Effect::Nato)
        && c.region == Region::Europe
        && c.controller() == Some(Side::US)
        && !(c.name == CName::France && state.has_effect(Side::USSR, Effect::DeGaulle));
    let japan = c.name == CName::Japan && state.has_effect(Side::US, Effect::UsJapanPact);
    nato || japan
}

/// Countries where the side may place influence.
pub fn influence_targets(state: &GameState, side: Side) -> Vec<CName> {
    CName::all()
        .filter(|c| state.map.is_adjacent(*c, side))
        .collect()
}

/// Cost of placing 1..=ops points into a single country, point by point.
/// Entry `n - 1` is the cost of `n` points; the ladder stops once `ops`
/// would be exceeded.
fn cost_ladder(country: &Country, side: Side, ops: i8) -> Vec<i8> {
    let enemy = country.influence(side.opposite());
    let mut mine = country.influence(side);
    let mut total = 0;
    let mut ladder = Vec::new();
    loop {
        total += if enemy - mine >= country.stability { 2 } else { 1 };
        if total > ops {
            return ladder;
        }
        ladder.push(total);
        mine += 1;
    }
}

/// Every distinct influence placement whose cost is exactly `ops`.
/// Placements are multisets over the side's influence targets, listed with
/// countries in table order.
pub fn influence_placements(state: &GameState, side: Side, ops: i8) -> Vec<Placement> {
    let targets = influence_targets(state, side);
    let ladders: Vec<(CName, Vec<i8>)> = targets
        .iter()
        .map(|c| (*c, cost_ladder(&state.map[*c], side, ops)))
        .filter(|(_, l)| !l.is_empty())
        .collect();
    let mut out = Vec::new();
    let mut current = Vec::new();
    compose(&ladders, 0, ops, &mut current, &mut out);
    log::trace!("{} placements for {:?} at {} ops", out.len(), side, ops);
    out
}

fn compose(
    ladders: &[(CName, Vec<i8>)],
    start: usize,
    budget: i8,
    current: &mut Vec<(CName, i8)>,
    out: &mut Vec<Placement>,
) {
    if budget == 0 {
        if !current.is_empty() {
            out.push(Placement::new(current.clone()));
        }
        return;
    }
    for i in start..ladders.len() {
        let (country, ladder) = &ladders[i];
        for (n, cost) in ladder.iter().enumerate() {
            if *cost > budget {
                break;
            }
            current.push((*country, n as i8 + 1));
            compose(ladders, i + 1, budget - cost, current, out);
            current.pop();
        }
    }
}

/// All ways to spend `ops` operations points.
pub fn ops_actions(state: &GameState, side: Side, ops: i8) -> Vec<OpsAction> {
    let targets = coup_targets(state, side);
    let mut actions: Vec<OpsAction> = targets.iter().map(|c| OpsAction::Coup(*c)).collect();
    actions.extend(targets.iter().map(|c| OpsAction::Realign(*c)));
    actions.extend(
        influence_placements(state, side, ops)
            .into_iter()
            .map(OpsAction::Influence),
    );
    actions
}

/// Every legal action round play for the side. Chained plays of opponent
/// cards only fix the first step here; with `EventThenOps` the ops are
/// enumerated again after the event.
pub fn legal_actions(state: &GameState, side: Side) -> Vec<Action> {
    let player = state.player(side);
    let mut cache: [Option<Vec<OpsAction>>; 5] = Default::default();
    let mut actions = Vec::new();
    let mut ops_for = |ops: i8| -> Vec<OpsAction> {
        let slot = &mut cache[ops as usize];
        if slot.is_none() {
            *slot = Some(ops_actions(state, side, ops));
        }
        slot.clone().unwrap_or_default()
    };
    for &card in player.hand.iter() {
        if card.is_scoring() {
            actions.push(Action::Score(card));
            continue;
        }
        let ops = card.modified_ops(side, state);
        if card.is_opponent_event(side, state) {
            actions.push(Action::EventThenOps(card));
            for a in ops_for(ops) {
                actions.push(Action::OpsThenEvent(card, a));
            }
        } else {
            if card.side() != Some(side.opposite()) && card.can_event_for(side, state) {
                actions.push(Action::Event(card));
            }
            for a in ops_for(ops) {
                actions.push(Action::Ops(card, a));
            }
        }
        if player.space.can_attempt(ops) {
            actions.push(Action::Space(card));
        }
    }
    if player.has_china() {
        let card = Card::The_China_Card;
        let ops = card.modified_ops(side, state);
        for a in ops_for(ops) {
            actions.push(Action::Ops(card, a));
        }
    }
    log::trace!("{} legal actions for {:?}", actions.len(), side);
    actions
}

/// Cards the side may headline.
pub fn headline_cards(state: &GameState, side: Side) -> Vec<Card> {
    state
        .player(side)
        .hand
        .iter()
        .copied()
        .filter(|c| c.can_headline(state))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::country::CName::*;
    use proptest::prelude::*;

    fn clear() -> GameState {
        let mut state = GameState::new();
        state.map.clear_influence();
        state
    }

    #[test]
    fn single_point_exhaustive() {
        let mut state = clear();
        state.map[Bulgaria].ussr = 1;
        let k1 = influence_placements(&state, Side::USSR, 1);
        let turkey: Vec<_> = k1.iter().filter(|p| p.points_in(Turkey) > 0).collect();
        assert_eq!(turkey, vec![&Placement::single(Turkey, 1)]);
        assert!(k1.iter().all(|p| p.total_points() == 1));
        // Home neighbours plus Bulgaria and its neighbours
        assert!(k1.contains(&Placement::single(Afghanistan, 1)));
        assert!(k1.contains(&Placement::single(Greece, 1)));
        assert!(!k1.contains(&Placement::single(Italy, 1)));
    }
    #[test]
    fn breaking_control_at_three() {
        let mut state = clear();
        state.map[Poland].us = 3;
        assert!(state.map[Poland].control_margin(Side::USSR, 0));
        let k3 = influence_placements(&state, Side::USSR, 3);
        assert!(k3.contains(&Placement::single(Poland, 2)));
        assert!(!k3.contains(&Placement::single(Poland, 3)));
        let k2 = influence_placements(&state, Side::USSR, 2);
        assert!(k2.contains(&Placement::single(Poland, 1)));
        assert!(!k2.contains(&Placement::single(Poland, 2)));
    }
    #[test]
    fn premium_never_alone_at_one() {
        let mut state = clear();
        state.map[Poland].us = 3;
        let k1 = influence_placements(&state, Side::USSR, 1);
        assert!(k1.iter().all(|p| p.points_in(Poland) == 0));
        let k2 = influence_placements(&state, Side::USSR, 2);
        assert!(k2
            .iter()
            .filter(|p| p.points_in(Poland) > 0)
            .all(|p| *p == Placement::single(Poland, 1)));
    }
    #[test]
    fn two_overcontrolled_at_four() {
        let mut state = clear();
        state.map[Poland].us = 5;
        state.map[Romania].us = 6;
        let k4 = influence_placements(&state, Side::USSR, 4);
        let pair = Placement::new(vec![(Poland, 1), (Romania, 1)]);
        assert!(k4.contains(&pair));
        assert!(!k4.contains(&Placement::single(Poland, 3)));
    }
    #[test]
    fn defcon_gates_regions() {
        let mut state = GameState::new();
        // Starting USSR influence is in Finland, E. Germany, Syria, Iraq and
        // N. Korea.
        let names = |s: &GameState| coup_targets(s, Side::US);
        assert_eq!(names(&state), vec![Finland, EGermany, Syria, Iraq, NKorea]);
        state.defcon.set(4);
        assert_eq!(names(&state), vec![Syria, Iraq, NKorea]);
        state.defcon.set(3);
        assert_eq!(names(&state), vec![Syria, Iraq]);
        state.defcon.set(2);
        assert!(names(&state).is_empty());
        state.map[Angola].ussr = 1;
        assert_eq!(names(&state), vec![Angola]);
    }
    #[test]
    fn no_effectiveness_filter() {
        let mut state = clear();
        // A battleground coup at DEFCON 2 loses the game, but it is legal.
        state.map[Nigeria].us = 1;
        state.defcon.set(2);
        let actions = ops_actions(&state, Side::USSR, 1);
        assert!(actions.contains(&OpsAction::Coup(Nigeria)));
        assert!(actions.contains(&OpsAction::Realign(Nigeria)));
    }
    #[test]
    fn nato_protects() {
        let mut state = GameState::new();
        state.control(Side::US, France);
        state.map[France].ussr = 1;
        state.control(Side::US, France);
        assert!(coup_targets(&state, Side::USSR).contains(&UK));
        state.add_effect(Side::US, Effect::Nato);
        let targets = coup_targets(&state, Side::USSR);
        assert!(!targets.contains(&UK));
        assert!(!targets.contains(&France));
        // Canada is not controlled, so NATO does not cover it.
        assert!(targets.contains(&Canada));
        state.add_effect(Side::USSR, Effect::DeGaulle);
        assert!(coup_targets(&state, Side::USSR).contains(&France));
        state.add_effect(Side::US, Effect::UsJapanPact);
        assert!(!coup_targets(&state, Side::USSR).contains(&Japan));
    }
    #[test]
    fn opening_hand_actions() {
        let mut state = GameState::new();
        state.player_mut(Side::USSR).hand = vec![Card::Asia_Scoring, Card::Fidel, Card::Duck_and_Cover];
        state.player_mut(Side::USSR).receive_china(true);
        let actions = legal_actions(&state, Side::USSR);
        assert!(actions.contains(&Action::Score(Card::Asia_Scoring)));
        assert!(!actions.iter().any(|a| matches!(a, Action::Ops(Card::Asia_Scoring, _))));
        assert!(actions.contains(&Action::Event(Card::Fidel)));
        assert!(actions.contains(&Action::Space(Card::Fidel)));
        assert!(actions.contains(&Action::EventThenOps(Card::Duck_and_Cover)));
        assert!(actions.contains(&Action::OpsThenEvent(
            Card::Duck_and_Cover,
            OpsAction::Coup(Iran)
        )));
        assert!(!actions.contains(&Action::Event(Card::Duck_and_Cover)));
        assert!(actions.contains(&Action::Ops(Card::The_China_Card, OpsAction::Coup(Iran))));
        assert!(!actions.contains(&Action::Space(Card::The_China_Card)));
        assert_eq!(headline_cards(&state, Side::USSR), vec![Card::Asia_Scoring, Card::Fidel, Card::Duck_and_Cover]);
    }

    #[test]
    fn un_intervention_needs_a_target() {
        let mut state = GameState::new();
        state.player_mut(Side::USSR).hand = vec![Card::UN_Intervention, Card::Nasser];
        let actions = legal_actions(&state, Side::USSR);
        assert!(!actions.contains(&Action::Event(Card::UN_Intervention)));
        assert!(actions.iter().any(|a| a.card() == Card::UN_Intervention));
        state.player_mut(Side::USSR).hand.push(Card::Duck_and_Cover);
        let actions = legal_actions(&state, Side::USSR);
        assert!(actions.contains(&Action::Event(Card::UN_Intervention)));
    }

    /// Influence scattered by seed so that control varies.
    fn scattered(seed: u64) -> GameState {
        use crate::state::{InternalRand, TwilightRand};
        let mut rng = InternalRand::new_seeded(seed);
        let mut state = GameState::new();
        for c in CName::all() {
            if rng.roll(Side::US) == 6 {
                state.map[c].us += rng.roll(Side::US);
            }
            if rng.roll(Side::USSR) == 6 {
                state.map[c].ussr += rng.roll(Side::USSR);
            }
        }
        state
    }

    /// Non-decreasing index sequences of the given length.
    fn multisets(n: usize, len: usize, start: usize, current: &mut Vec<usize>, out: &mut Vec<Vec<usize>>) {
        if current.len() == len {
            out.push(current.clone());
            return;
        }
        for i in start..n {
            current.push(i);
            multisets(n, len, i, current, out);
            current.pop();
        }
    }

    #[test]
    fn placements_match_brute_force() {
        use std::collections::HashSet;
        for seed in 0..3u64 {
            let state = scattered(seed);
            for &side in [Side::US, Side::USSR].iter() {
                let targets = influence_targets(&state, side);
                for ops in 1..=4i8 {
                    let mut expected = HashSet::new();
                    for len in 1..=ops as usize {
                        let mut picks = Vec::new();
                        multisets(targets.len(), len, 0, &mut Vec::new(), &mut picks);
                        for p in picks {
                            let placement = Placement::new(p.iter().map(|i| (targets[*i], 1)).collect());
                            if placement.cost(&state.map, side) == ops {
                                expected.insert(placement);
                            }
                        }
                    }
                    let found: HashSet<Placement> =
                        influence_placements(&state, side, ops).into_iter().collect();
                    assert_eq!(found, expected, "seed {} {:?} ops {}", seed, side, ops);
                }
            }
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]
        #[test]
        fn placements_cost_exactly(ops in 1i8..=4, seed in 0u64..200) {
            let state = scattered(seed);
            let side = if seed % 2 == 0 { Side::US } else { Side::USSR };
            let placements = influence_placements(&state, side, ops);
            for p in placements.iter() {
                prop_assert_eq!(p.cost(&state.map, side), ops);
                prop_assert!(p.iter().all(|(c, _)| state.map.is_adjacent(*c, side)));
            }
            let distinct: std::collections::HashSet<_> = placements.iter().collect();
            prop_assert_eq!(distinct.len(), placements.len());
        }
    }
}
