#![allow(non_camel_case_types)]

use crate::country::{Region, Side};
use crate::state::GameState;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod deck;
pub mod effect;
mod event;
pub use deck::*;
pub use effect::*;

pub const NUM_CARDS: usize = Card::AWACS as usize + 1;

lazy_static! {
    static ref ATT: Vec<Attributes> = {
        let cards = init_cards();
        if let Err(e) = validate(&cards) {
            panic!("built-in card table is invalid: {}", e);
        }
        cards
    };
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CardError {
    #[error("{name} has {ops} ops, expected 0 to 4")]
    InvalidOps { name: &'static str, ops: i8 },
    #[error("card table has {0} entries, expected {expected}", expected = NUM_CARDS)]
    WrongLength(usize),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Period {
    Early,
    Mid,
    Late,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CardKind {
    China,
    Scoring(Region),
    /// `None` marks a neutral event.
    Event(Option<Side>),
}

#[derive(Clone, Debug)]
pub struct Attributes {
    pub name: &'static str,
    pub side: Option<Side>,
    pub ops: i8,
    pub starred: bool,
    pub scoring: Option<Region>,
}

impl Attributes {
    fn new(name: &'static str, side: Option<Side>, ops: i8) -> Attributes {
        Attributes {
            name,
            side,
            ops,
            starred: false,
            scoring: None,
        }
    }
    fn scoring(name: &'static str, region: Region) -> Attributes {
        Attributes {
            name,
            side: None,
            ops: 0,
            starred: false,
            scoring: Some(region),
        }
    }
    fn star(mut self) -> Attributes {
        self.starred = true;
        self
    }
}

fn validate(cards: &[Attributes]) -> Result<(), CardError> {
    if cards.len() != NUM_CARDS {
        return Err(CardError::WrongLength(cards.len()));
    }
    for a in cards.iter() {
        if a.ops < 0 || a.ops > 4 {
            return Err(CardError::InvalidOps {
                name: a.name,
                ops: a.ops,
            });
        }
    }
    Ok(())
}

fn init_cards() -> Vec<Attributes> {
    let us = Some(Side::US);
    let ussr = Some(Side::USSR);
    let neutral = None;
    let c = Attributes::new;
    let s = Attributes::scoring;
    vec![
        c("Dummy", neutral, 0),
        s("Asia Scoring", Region::Asia),
        s("Europe Scoring", Region::Europe),
        s("Middle East Scoring", Region::MiddleEast),
        c("Duck and Cover", us, 3),
        c("Five Year Plan", us, 3),
        c("The China Card", neutral, 4),
        c("Socialist Governments", ussr, 3),
        c("Fidel", ussr, 2).star(),
        c("Vietnam Revolts", ussr, 2).star(),
        c("Blockade", ussr, 1).star(),
        c("Korean War", ussr, 2).star(),
        c("Romanian Abdication", ussr, 1).star(),
        c("Arab-Israeli War", ussr, 2),
        c("Comecon", ussr, 3).star(),
        c("Nasser", ussr, 1).star(),
        c("Warsaw Pact Formed", ussr, 3).star(),
        c("De Gaulle Leads France", ussr, 3).star(),
        c("Captured Nazi Scientist", neutral, 1).star(),
        c("Truman Doctrine", us, 1).star(),
        c("Olympic Games", neutral, 2),
        c("NATO", us, 4).star(),
        c("Independent Reds", us, 2).star(),
        c("Marshall Plan", us, 4).star(),
        c("Indo-Pakistani War", neutral, 2),
        c("Containment", us, 3).star(),
        c("CIA Created", us, 1).star(),
        c("US/Japan Mutual Defense Pact", us, 4).star(),
        c("Suez Crisis", ussr, 3).star(),
        c("East European Unrest", us, 3),
        c("Decolonization", ussr, 2),
        c("Red Scare/Purge", neutral, 4),
        c("UN Intervention", neutral, 1),
        c("De-Stalinization", ussr, 3).star(),
        c("Nuclear Test Ban", neutral, 4),
        c("Formosan Resolution", us, 2).star(),
        // Mid war
        c("Brush War", neutral, 3),
        s("Central America Scoring", Region::CentralAmerica),
        s("Southeast Asia Scoring", Region::SoutheastAsia).star(),
        c("Arms Race", neutral, 3),
        c("Cuban Missile Crisis", neutral, 3).star(),
        c("Nuclear Subs", us, 2).star(),
        c("Quagmire", ussr, 3).star(),
        c("SALT Negotiations", neutral, 3).star(),
        c("Bear Trap", us, 3).star(),
        c("Summit", neutral, 1),
        c("How I Learned to Stop Worrying", neutral, 2).star(),
        c("Junta", neutral, 2),
        c("Kitchen Debates", us, 1).star(),
        c("Missile Envy", neutral, 2),
        c("We Will Bury You", ussr, 4).star(),
        c("Brezhnev Doctrine", ussr, 3).star(),
        c("Portuguese Empire Crumbles", ussr, 2).star(),
        c("South African Unrest", ussr, 2),
        c("Allende", ussr, 1).star(),
        c("Willy Brandt", ussr, 2).star(),
        c("Muslim Revolution", ussr, 4),
        c("ABM Treaty", neutral, 4),
        c("Cultural Revolution", ussr, 3).star(),
        c("Flower Power", ussr, 4).star(),
        c("U2 Incident", ussr, 3).star(),
        c("OPEC", ussr, 3),
        c("Lone Gunman", ussr, 1).star(),
        c("Colonial Rear Guards", us, 2),
        c("Panama Canal Returned", us, 1).star(),
        c("Camp David Accords", us, 2).star(),
        c("Puppet Governments", us, 2).star(),
        c("Grain Sales to Soviets", us, 2),
        c("John Paul II Elected Pope", us, 2).star(),
        c("Latin American Death Squads", neutral, 2),
        c("OAS Founded", us, 1).star(),
        c("Nixon Plays the China Card", us, 2).star(),
        c("Sadat Expels Soviets", us, 1).star(),
        c("Shuttle Diplomacy", us, 3),
        c("The Voice of America", us, 2),
        c("Liberation Theology", ussr, 2),
        c("Ussuri River Skirmish", us, 3).star(),
        c("Ask Not What Your Country Can Do For You", us, 3).star(),
        c("Alliance for Progress", us, 3).star(),
        s("Africa Scoring", Region::Africa),
        c("One Small Step", neutral, 2),
        s("South America Scoring", Region::SouthAmerica),
        // Late war
        c("Iranian Hostage Crisis", ussr, 3).star(),
        c("The Iron Lady", us, 3).star(),
        c("Reagan Bombs Libya", us, 2).star(),
        c("Star Wars", us, 2).star(),
        c("North Sea Oil", us, 3).star(),
        c("The Reformer", ussr, 3).star(),
        c("Marine Barracks Bombing", ussr, 2).star(),
        c("Soviets Shoot Down KAL-007", us, 4).star(),
        c("Glasnost", ussr, 4).star(),
        c("Ortega Elected in Nicaragua", ussr, 2).star(),
        c("Terrorism", neutral, 2),
        c("Iran-Contra Scandal", ussr, 2).star(),
        c("Chernobyl", us, 3).star(),
        c("Latin American Debt Crisis", ussr, 2),
        c("Tear Down This Wall", us, 3).star(),
        c("An Evil Empire", us, 3).star(),
        c("Aldrich Ames Remix", ussr, 3).star(),
        c("Pershing II Deployed", ussr, 3).star(),
        c("Wargames", neutral, 4).star(),
        c("Solidarity", us, 2).star(),
        c("Iran-Iraq War", neutral, 2).star(),
        // Optional cards
        c("Defectors", us, 2),
        c("The Cambridge Five", ussr, 2),
        c("Special Relationship", us, 2),
        c("NORAD", us, 3).star(),
        c("Che", ussr, 3),
        c("Our Man in Tehran", us, 2).star(),
        c("Yuri and Samantha", ussr, 2).star(),
        c("AWACS Sale to Saudis", us, 3).star(),
    ]
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, FromPrimitive, Serialize, Deserialize,
)]
pub enum Card {
    Asia_Scoring = 1,
    Europe_Scoring,
    Middle_East_Scoring,
    Duck_and_Cover,
    Five_Year_Plan,
    The_China_Card,
    Socialist_Governments,
    Fidel,
    Vietnam_Revolts,
    Blockade,
    Korean_War,
    Romanian_Abdication,
    Arab_Israeli_War,
    Comecon,
    Nasser,
    Warsaw_Pact_Formed,
    De_Gaulle_Leads_France,
    Captured_Nazi_Scientist,
    Truman_Doctrine,
    Olympic_Games,
    NATO,
    Independent_Reds,
    Marshall_Plan,
    Indo_Pakistani_War,
    Containment,
    CIA_Created,
    US_Japan_Mutual_Defense_Pact,
    Suez_Crisis,
    East_European_Unrest,
    Decolonization,
    Red_Scare_Purge,
    UN_Intervention,
    De_Stalinization,
    Nuclear_Test_Ban,
    Formosan_Resolution,
    Brush_War,
    Central_America_Scoring,
    Southeast_Asia_Scoring,
    Arms_Race,
    Cuban_Missile_Crisis,
    Nuclear_Subs,
    Quagmire,
    Salt_Negotiations,
    Bear_Trap,
    Summit,
    How_I_Learned,
    Junta,
    Kitchen_Debates,
    Missile_Envy,
    We_Will_Bury_You,
    Brezhnev_Doctrine,
    Portuguese_Empire_Crumbles,
    South_African_Unrest,
    Allende,
    Willy_Brandt,
    Muslim_Revolution,
    ABM_Treaty,
    Cultural_Revolution,
    Flower_Power,
    U2_Incident,
    OPEC,
    Lone_Gunman,
    Colonial_Rear_Guards,
    Panama_Canal_Returned,
    Camp_David_Accords,
    Puppet_Governments,
    Grain_Sales,
    John_Paul,
    Latin_American_Death_Squads,
    OAS_Founded,
    Nixon_Plays_The_China_Card,
    Sadat_Expels_Soviets,
    Shuttle_Diplomacy,
    Voice_of_America,
    Liberation_Theology,
    Ussuri_River_Skirmish,
    Ask_Not,
    Alliance_for_Progress,
    Africa_Scoring,
    One_Small_Step,
    South_America_Scoring,
    Iranian_Hostage_Crisis,
    Iron_Lady,
    Reagan_Bombs_Libya,
    Star_Wars,
    North_Sea_Oil,
    The_Reformer,
    Marine_Barracks_Bombing,
    KAL_007,
    Glasnost,
    Ortega,
    Terrorism,
    Iran_Contra,
    Chernobyl,
    Debt_Crisis,
    Tear_Down_This_Wall,
    An_Evil_Empire,
    Aldrich_Ames,
    Pershing_II,
    Wargames,
    Solidarity,
    Iran_Iraq_War,
    Defectors,
    Cambridge_Five,
    Special_Relationship,
    NORAD,
    Che,
    Our_Man_In_Tehran,
    Yuri_and_Samantha,
    AWACS,
}

impl Card {
    pub fn from_index(index: usize) -> Option<Card> {
        num_traits::FromPrimitive::from_usize(index)
    }
    fn att(&self) -> &'static Attributes {
        &ATT[*self as usize]
    }
    pub fn name(&self) -> &'static str {
        self.att().name
    }
    pub fn base_ops(&self) -> i8 {
        self.att().ops
    }
    pub fn side(&self) -> Option<Side> {
        self.att().side
    }
    pub fn is_starred(&self) -> bool {
        self.att().starred
    }
    pub fn is_scoring(&self) -> bool {
        self.att().scoring.is_some()
    }
    pub fn kind(&self) -> CardKind {
        let att = self.att();
        if let Card::The_China_Card = self {
            CardKind::China
        } else if let Some(region) = att.scoring {
            CardKind::Scoring(region)
        } else {
            CardKind::Event(att.side)
        }
    }
    pub fn period(&self) -> Period {
        let i = *self as usize;
        match i {
            1..=35 | 103..=106 => Period::Early,
            36..=81 | 107..=108 => Period::Mid,
            _ => Period::Late,
        }
    }
    fn pool(period: Period) -> Vec<Card> {
        (1..NUM_CARDS)
            .filter_map(Card::from_index)
            .filter(|c| c.period() == period && *c != Card::The_China_Card)
            .collect()
    }
    /// The cards shuffled into the draw pile at the start of the game. The
    /// China Card starts with the USSR instead.
    pub fn early_war() -> Vec<Card> {
        Card::pool(Period::Early)
    }
    pub fn mid_war() -> Vec<Card> {
        Card::pool(Period::Mid)
    }
    pub fn late_war() -> Vec<Card> {
        Card::pool(Period::Late)
    }
    /// Ops after Containment and Red Scare/Purge. Scoring cards have none.
    pub fn modified_ops(&self, side: Side, state: &GameState) -> i8 {
        if self.is_scoring() {
            return 0;
        }
        let mut ops = self.base_ops();
        if side == Side::US && state.has_effect(Side::US, Effect::Containment) {
            ops += 1;
        }
        if state.has_effect(side.opposite(), Effect::RedScarePurge) {
            ops -= 1;
        }
        std::cmp::min(4, std::cmp::max(1, ops))
    }
    pub fn can_event(&self, state: &GameState) -> bool {
        use Card::*;
        match self {
            The_China_Card => false,
            NATO => {
                state.has_effect(Side::US, Effect::AllowNato)
                    && !state.has_effect(Side::US, Effect::Nato)
            }
            Cambridge_Five => state.turn < 8,
            _ => true,
        }
    }
    /// `can_event`, plus the conditions that depend on who plays the card.
    pub fn can_event_for(&self, side: Side, state: &GameState) -> bool {
        match self {
            // Needs an opponent card in hand to cancel
            Card::UN_Intervention => state
                .player(side)
                .hand
                .iter()
                .any(|c| c.side() == Some(side.opposite())),
            _ => self.can_event(state),
        }
    }
    pub fn can_headline(&self, state: &GameState) -> bool {
        match self {
            Card::The_China_Card | Card::UN_Intervention => false,
            _ => self.is_scoring() || self.can_event(state),
        }
    }
    /// Whether the card's event fires when the given side plays it for ops.
    pub fn is_opponent_event(&self, side: Side, state: &GameState) -> bool {
        self.side() == Some(side.opposite()) && self.can_event(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_cards() {
        assert!(validate(&init_cards()).is_ok());
        assert_eq!(Card::AWACS as usize, 110);
        assert_eq!(Card::Formosan_Resolution as usize, 35);
        assert_eq!(Card::Defectors as usize, 103);
        for i in 1..NUM_CARDS {
            let c = Card::from_index(i).unwrap();
            assert_eq!(c.is_scoring(), c.base_ops() == 0, "{}", c.name());
        }
        assert_eq!(Card::Southeast_Asia_Scoring.name(), "Southeast Asia Scoring");
        assert_eq!(Card::Che.base_ops(), 3);
    }
    #[test]
    fn pools_partition_the_deck() {
        let early = Card::early_war();
        let mid = Card::mid_war();
        let late = Card::late_war();
        assert_eq!(early.len(), 38);
        assert_eq!(mid.len(), 48);
        assert_eq!(late.len(), 23);
        assert_eq!(early.len() + mid.len() + late.len(), NUM_CARDS - 2);
        assert!(!early.contains(&Card::The_China_Card));
        assert!(early.contains(&Card::NORAD));
        assert!(mid.contains(&Card::Our_Man_In_Tehran));
        assert!(late.contains(&Card::Yuri_and_Samantha));
    }
    #[test]
    fn kinds() {
        assert_eq!(Card::The_China_Card.kind(), CardKind::China);
        assert_eq!(
            Card::Central_America_Scoring.kind(),
            CardKind::Scoring(Region::CentralAmerica)
        );
        assert_eq!(Card::Fidel.kind(), CardKind::Event(Some(Side::USSR)));
        assert_eq!(Card::Olympic_Games.kind(), CardKind::Event(None));
        assert!(Card::Southeast_Asia_Scoring.is_starred());
    }
    #[test]
    fn ops_modifiers() {
        let mut state = GameState::new();
        assert_eq!(Card::Duck_and_Cover.modified_ops(Side::US, &state), 3);
        state.add_effect(Side::US, Effect::Containment);
        assert_eq!(Card::Duck_and_Cover.modified_ops(Side::US, &state), 4);
        assert_eq!(Card::NATO.modified_ops(Side::US, &state), 4);
        assert_eq!(Card::Fidel.modified_ops(Side::USSR, &state), 2);
        state.add_effect(Side::USSR, Effect::RedScarePurge);
        assert_eq!(Card::Duck_and_Cover.modified_ops(Side::US, &state), 3);
        assert_eq!(Card::CIA_Created.modified_ops(Side::US, &state), 1);
        assert_eq!(Card::Asia_Scoring.modified_ops(Side::US, &state), 0);
    }
    #[test]
    fn nato_needs_a_prerequisite() {
        let mut state = GameState::new();
        assert!(!Card::NATO.can_event(&state));
        state.add_effect(Side::US, Effect::AllowNato);
        assert!(Card::NATO.can_event(&state));
        assert!(!Card::UN_Intervention.can_headline(&state));
        assert!(Card::Europe_Scoring.can_headline(&state));
    }
}
