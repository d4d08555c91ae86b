use crate::card::Card;
use crate::country::{CName, Map, Side};

use serde::{Deserialize, Serialize};

/// A multiset of influence points, one entry per country in table order.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Placement(Vec<(CName, i8)>);

impl Placement {
    pub fn new(mut points: Vec<(CName, i8)>) -> Self {
        points.sort();
        let mut merged: Vec<(CName, i8)> = Vec::with_capacity(points.len());
        for (c, n) in points {
            match merged.last_mut() {
                Some((last, m)) if *last == c => *m += n,
                _ => merged.push((c, n)),
            }
        }
        Placement(merged)
    }
    pub fn single(country: CName, points: i8) -> Self {
        Placement(vec![(country, points)])
    }
    pub fn iter(&self) -> impl Iterator<Item = &(CName, i8)> {
        self.0.iter()
    }
    pub fn points_in(&self, country: CName) -> i8 {
        self.0
            .iter()
            .find(|(c, _)| *c == country)
            .map(|(_, n)| *n)
            .unwrap_or(0)
    }
    pub fn total_points(&self) -> i8 {
        self.0.iter().map(|(_, n)| n).sum()
    }
    /// Ops needed to place these points for `side` on the given map. Each
    /// point into an enemy-controlled country costs 2 until control breaks.
    pub fn cost(&self, map: &Map, side: Side) -> i8 {
        self.0
            .iter()
            .map(|(c, n)| {
                let country = &map[*c];
                let enemy = country.influence(side.opposite());
                let mut mine = country.influence(side);
                let mut cost = 0;
                for _ in 0..*n {
                    cost += if enemy - mine >= country.stability { 2 } else { 1 };
                    mine += 1;
                }
                cost
            })
            .sum()
    }
}

/// One way of spending a card's operations points.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OpsAction {
    Coup(CName),
    /// The first realignment roll. Further rolls with the remaining ops are
    /// chosen after it resolves.
    Realign(CName),
    Influence(Placement),
}

/// A complete choice for an action round.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Play an own or neutral event.
    Event(Card),
    /// Spend ops. For opponent cards whose event cannot fire.
    Ops(Card, OpsAction),
    /// Opponent card: its event resolves first, then the ops are chosen
    /// against the resulting position.
    EventThenOps(Card),
    /// Opponent card: spend the ops, then its event resolves.
    OpsThenEvent(Card, OpsAction),
    Space(Card),
    Score(Card),
}

impl Action {
    pub fn card(&self) -> Card {
        match self {
            Action::Event(c)
            | Action::Ops(c, _)
            | Action::EventThenOps(c)
            | Action::OpsThenEvent(c, _)
            | Action::Space(c)
            | Action::Score(c) => *c,
        }
    }
}

/// What an agent is being asked.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Prompt {
    ActionRound,
    Headline,
    /// Ops granted by a card, an event, or the second half of a chained play.
    Ops(i8),
    /// Another realignment roll, or stop.
    Realign,
    /// Add one influence point.
    Place,
    /// Remove influence from a country.
    Remove,
    /// Discard a card from hand.
    Discard,
    /// Pick a country for a one-off event effect.
    Target,
    /// A yes/no event option.
    Option(Card),
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Choice {
    Action(Action),
    Ops(OpsAction),
    Country(CName),
    Card(Card),
    Flag(bool),
    Pass,
}

#[derive(Clone, Debug)]
pub struct Decision {
    pub agent: Side,
    pub prompt: Prompt,
    pub options: Vec<Choice>,
}

impl Decision {
    pub fn new(agent: Side, prompt: Prompt, options: Vec<Choice>) -> Decision {
        Decision {
            agent,
            prompt,
            options,
        }
    }
    pub fn countries(agent: Side, prompt: Prompt, countries: &[CName]) -> Decision {
        let options = countries.iter().map(|c| Choice::Country(*c)).collect();
        Decision::new(agent, prompt, options)
    }
    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::country::Map;

    #[test]
    fn placement_merges_points() {
        let p = Placement::new(vec![
            (CName::Iran, 1),
            (CName::Canada, 1),
            (CName::Iran, 2),
        ]);
        assert_eq!(p, Placement::new(vec![(CName::Canada, 1), (CName::Iran, 3)]));
        assert_eq!(p.points_in(CName::Iran), 3);
        assert_eq!(p.total_points(), 4);
    }
    #[test]
    fn cost_breaks_control() {
        let mut map = Map::standard();
        map.clear_influence();
        map[CName::Poland].us = 3;
        let p = Placement::single(CName::Poland, 2);
        assert_eq!(p.cost(&map, Side::USSR), 3);
        map[CName::Poland].us = 4;
        assert_eq!(p.cost(&map, Side::USSR), 4);
        assert_eq!(Placement::single(CName::Poland, 2).cost(&map, Side::US), 2);
    }
}
