use crate::card::Effect;
use crate::state::GameState;

use radix_trie::Trie;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use std::ops::{Index, IndexMut};

mod bundle;

pub use bundle::CountryBundle;

pub const NUM_COUNTRIES: usize = CName::Ecuador as usize + 1;

static MAP_DATA: &str = include_str!("../data/map.txt");

lazy_static! {
    static ref STANDARD_MAP: Map = Map::from_table(MAP_DATA)
        .unwrap_or_else(|e| panic!("built-in country table is invalid: {}", e));
    static ref NAME_INDEX: Trie<String, CName> = {
        let mut trie = Trie::new();
        for (i, name) in NAMES.iter().enumerate() {
            if let Some(c) = CName::from_index(i) {
                trie.insert(name.to_lowercase(), c);
            }
        }
        trie
    };
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Side {
    US,
    USSR,
}

impl Side {
    pub fn opposite(&self) -> Side {
        match self {
            Side::US => Side::USSR,
            Side::USSR => Side::US,
        }
    }
    /// Sign of a VP award for this side: the score is positive for the US.
    pub fn vp_sign(&self) -> i8 {
        match self {
            Side::US => 1,
            Side::USSR => -1,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MapError {
    #[error("line {line}: cannot parse `{text}`")]
    Parse { line: usize, text: String },
    #[error("unknown country `{0}`")]
    UnknownCountry(String),
    #[error("{0:?} is listed twice")]
    Duplicate(CName),
    #[error("{0} is missing from the table")]
    Missing(&'static str),
    #[error("{country:?} has stability {stability}, expected 1 to 5")]
    InvalidStability { country: CName, stability: i8 },
    #[error("{from:?} lists {to:?} as a neighbour but not the other way around")]
    NonReciprocal { from: CName, to: CName },
}

/// Scoring regions. Every country belongs to exactly one.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Region {
    Europe,
    MiddleEast,
    Asia,
    Africa,
    CentralAmerica,
    SouthAmerica,
    SoutheastAsia,
}

/// Finer map regions used by event eligibility.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum MapRegion {
    WesternEurope,
    EasternEurope,
    MiddleEast,
    Asia,
    SoutheastAsia,
    Africa,
    CentralAmerica,
    SouthAmerica,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Neighbor {
    Country(CName),
    /// A superpower's home space. These are one-way anchors: no country
    /// record exists for them.
    Home(Side),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Country {
    pub name: CName,
    pub region: Region,
    pub map_regions: Vec<MapRegion>,
    pub stability: i8,
    pub us: i8,
    pub ussr: i8,
    pub bg: bool,
    pub neighbors: Vec<Neighbor>,
}

impl Country {
    pub fn controller(&self) -> Option<Side> {
        let diff = self.us - self.ussr;
        if diff >= self.stability {
            Some(Side::US)
        } else if diff <= -self.stability {
            Some(Side::USSR)
        } else {
            None
        }
    }
    pub fn influence(&self, side: Side) -> i8 {
        match side {
            Side::US => self.us,
            Side::USSR => self.ussr,
        }
    }
    pub fn influence_mut(&mut self, side: Side) -> &mut i8 {
        match side {
            Side::US => &mut self.us,
            Side::USSR => &mut self.ussr,
        }
    }
    pub fn has_influence(&self, side: Side) -> bool {
        self.influence(side) > 0
    }
    /// True if the opponent's lead here, minus the stability, is exactly
    /// `margin`. A margin of 0 means one point from `side` breaks control.
    pub fn control_margin(&self, side: Side, margin: i8) -> bool {
        let enemy = side.opposite();
        self.controller() == Some(enemy)
            && self.influence(enemy) - self.influence(side) - self.stability == margin
    }
    pub fn in_map_region(&self, region: MapRegion) -> bool {
        self.map_regions.contains(&region)
    }
    pub fn borders_home(&self, side: Side) -> bool {
        self.neighbors.contains(&Neighbor::Home(side))
    }
    /// Whether coups and realignments here are restricted by DEFCON at all.
    pub fn defcon_restricted(&self) -> bool {
        match self.region {
            Region::Europe | Region::Asia | Region::MiddleEast => true,
            _ => false,
        }
    }
    /// Whether coups and realignments here are legal at the given level.
    pub fn defcon_legal(&self, defcon: i8) -> bool {
        match self.region {
            Region::Europe => defcon >= 5,
            Region::Asia => defcon > 3,
            Region::MiddleEast => defcon > 2,
            _ => true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Map {
    pub countries: Vec<Country>,
}

impl Map {
    /// A fresh copy of the standard board with starting influence placed.
    pub fn standard() -> Map {
        STANDARD_MAP.clone()
    }
    /// Builds a map from a country table. The result has every country
    /// exactly once, in `CName` order, with reciprocal adjacency.
    pub fn from_table(text: &str) -> Result<Map, MapError> {
        let rows = crate::parse::country_table(text)?;
        let mut slots: Vec<Option<Country>> = vec![None; NUM_COUNTRIES];
        for row in rows {
            let name =
                CName::find(row.name).ok_or_else(|| MapError::UnknownCountry(row.name.into()))?;
            if slots[name as usize].is_some() {
                return Err(MapError::Duplicate(name));
            }
            if row.stability < 1 || row.stability > 5 {
                return Err(MapError::InvalidStability {
                    country: name,
                    stability: row.stability,
                });
            }
            let mut neighbors = Vec::with_capacity(row.neighbors.len());
            for n in row.neighbors {
                neighbors.push(n.resolve()?);
            }
            slots[name as usize] = Some(Country {
                name,
                region: row.region,
                map_regions: row.map_regions,
                stability: row.stability,
                us: row.us,
                ussr: row.ussr,
                bg: row.bg,
                neighbors,
            });
        }
        let countries = slots
            .into_iter()
            .enumerate()
            .map(|(i, c)| c.ok_or(MapError::Missing(NAMES[i])))
            .collect::<Result<Vec<_>, _>>()?;
        let map = Map { countries };
        map.validate()?;
        Ok(map)
    }
    /// Checks that every country-to-country edge is listed from both ends.
    pub fn validate(&self) -> Result<(), MapError> {
        for c in self.countries.iter() {
            for n in c.neighbors.iter() {
                if let Neighbor::Country(other) = n {
                    if !self[*other].neighbors.contains(&Neighbor::Country(c.name)) {
                        return Err(MapError::NonReciprocal {
                            from: c.name,
                            to: *other,
                        });
                    }
                }
            }
        }
        Ok(())
    }
    pub fn control_of(&self, country: CName) -> Option<Side> {
        self[country].controller()
    }
    /// A country is adjacent to a side if the side has influence there, or it
    /// borders the side's home or any country where the side has influence.
    pub fn is_adjacent(&self, country: CName, side: Side) -> bool {
        let c = &self[country];
        c.has_influence(side)
            || c.neighbors.iter().any(|n| match n {
                Neighbor::Home(s) => *s == side,
                Neighbor::Country(x) => self[*x].has_influence(side),
            })
    }
    /// Country neighbours only, in table order of the owning country.
    pub fn neighbors(&self, country: CName) -> impl Iterator<Item = CName> + '_ {
        self[country].neighbors.iter().filter_map(|n| match n {
            Neighbor::Country(c) => Some(*c),
            Neighbor::Home(_) => None,
        })
    }
    pub fn clear_influence(&mut self) {
        for c in self.countries.iter_mut() {
            c.us = 0;
            c.ussr = 0;
        }
    }
    pub fn iter(&self) -> impl Iterator<Item = &Country> {
        self.countries.iter()
    }
}

impl Index<CName> for Map {
    type Output = Country;
    fn index(&self, name: CName) -> &Country {
        &self.countries[name as usize]
    }
}

impl IndexMut<CName> for Map {
    fn index_mut(&mut self, name: CName) -> &mut Country {
        &mut self.countries[name as usize]
    }
}

#[derive(Clone, Copy, Default)]
struct Tally {
    countries: i8,
    bgs: i8,
    non_bgs: i8,
    /// Controlled countries bordering the enemy superpower.
    frontier: i8,
}

impl Tally {
    fn level(&self, enemy: &Tally, total_bgs: i8) -> usize {
        if self.countries > enemy.countries && total_bgs > 0 && self.bgs == total_bgs {
            3
        } else if self.countries > enemy.countries && self.bgs > enemy.bgs && self.non_bgs > 0 {
            2
        } else if self.countries > 0 {
            1
        } else {
            0
        }
    }
}

impl Region {
    pub const ALL: [Region; 7] = [
        Region::Europe,
        Region::MiddleEast,
        Region::Asia,
        Region::Africa,
        Region::CentralAmerica,
        Region::SouthAmerica,
        Region::SoutheastAsia,
    ];
    /// VP for presence, domination and control. Europe control wins outright
    /// and is handled separately.
    fn awards(&self) -> [i8; 3] {
        match self {
            Region::Europe => [3, 7, 0],
            Region::Asia => [3, 7, 9],
            Region::MiddleEast => [3, 5, 7],
            Region::Africa => [1, 4, 6],
            Region::CentralAmerica => [1, 3, 5],
            Region::SouthAmerica => [2, 5, 6],
            Region::SoutheastAsia => [0, 0, 0],
        }
    }
    pub fn countries<'a>(&self, map: &'a Map) -> CountryBundle<'a> {
        let all = CountryBundle::all(map);
        match self {
            Region::SoutheastAsia => all.map_region(MapRegion::SoutheastAsia),
            r => all.region(*r),
        }
    }
    /// Scores the region, applies the result to the VP track and returns the
    /// change (positive favours the US).
    pub fn score(&self, state: &mut GameState) -> i8 {
        let before = state.vp;
        if let Region::SoutheastAsia = self {
            let mut delta = 0;
            for c in self.countries(&state.map).iter() {
                let value = if c.name == CName::Thailand { 2 } else { 1 };
                if let Some(side) = c.controller() {
                    delta += value * side.vp_sign();
                }
            }
            state.vp += delta;
            return delta;
        }
        let formosan = state.has_effect(Side::US, Effect::FormosanResolution);
        let mut tally = [Tally::default(); 2];
        let mut total_bgs = 0;
        for c in self.countries(&state.map).iter() {
            let controller = c.controller();
            let bg = c.bg
                || (formosan && c.name == CName::Taiwan && controller == Some(Side::US));
            if bg {
                total_bgs += 1;
            }
            if let Some(side) = controller {
                let t = &mut tally[side as usize];
                t.countries += 1;
                if bg {
                    t.bgs += 1;
                } else {
                    t.non_bgs += 1;
                }
                if c.borders_home(side.opposite()) {
                    t.frontier += 1;
                }
            }
        }
        let us = tally[Side::US as usize];
        let ussr = tally[Side::USSR as usize];
        let us_level = us.level(&ussr, total_bgs);
        let ussr_level = ussr.level(&us, total_bgs);
        if let Region::Europe = self {
            if us_level == 3 {
                state.vp = std::cmp::max(state.vp, 20);
                return state.vp - before;
            } else if ussr_level == 3 {
                state.vp = std::cmp::min(state.vp, -20);
                return state.vp - before;
            }
        }
        let awards = self.awards();
        let points = |t: &Tally, level: usize| {
            let base = if level > 0 { awards[level - 1] } else { 0 };
            base + t.bgs + t.frontier
        };
        let delta = points(&us, us_level) - points(&ussr, ussr_level);
        state.vp += delta;
        delta
    }
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, FromPrimitive, Serialize, Deserialize)]
pub enum CName {
    Canada = 0,
    UK,
    Norway,
    Sweden,
    Finland,
    Denmark,
    Benelux,
    WGermany,
    EGermany,
    Poland,
    Czechoslovakia,
    France,
    SpainPortugal,
    Italy,
    Austria,
    Hungary,
    Yugoslavia,
    Romania,
    Turkey,
    Greece,
    Bulgaria,
    Algeria,
    Morocco,
    Tunisia,
    SaharanStates,
    Nigeria,
    WestAfricanStates,
    IvoryCoast,
    Cameroon,
    Zaire,
    Angola,
    SouthAfrica,
    Botswana,
    Zimbabwe,
    SEAfricanStates,
    Kenya,
    Somalia,
    Ethiopia,
    Sudan,
    Syria,
    Israel,
    Egypt,
    Libya,
    Lebanon,
    Jordan,
    SaudiArabia,
    GulfStates,
    Iraq,
    Iran,
    Afghanistan,
    Pakistan,
    India,
    Burma,
    LaosCambodia,
    Vietnam,
    Thailand,
    Malaysia,
    Australia,
    Indonesia,
    Philippines,
    Japan,
    Taiwan,
    SKorea,
    NKorea,
    Mexico,
    Guatemala,
    ElSalvador,
    Honduras,
    Nicaragua,
    Cuba,
    Haiti,
    DominicanRep,
    CostaRica,
    Panama,
    Colombia,
    Venezuela,
    Brazil,
    Uruguay,
    Argentina,
    Paraguay,
    Bolivia,
    Chile,
    Peru,
    Ecuador,
}

static NAMES: [&str; NUM_COUNTRIES] = [
    "Canada",
    "UK",
    "Norway",
    "Sweden",
    "Finland",
    "Denmark",
    "Benelux",
    "West Germany",
    "East Germany",
    "Poland",
    "Czechoslovakia",
    "France",
    "Spain/Portugal",
    "Italy",
    "Austria",
    "Hungary",
    "Yugoslavia",
    "Romania",
    "Turkey",
    "Greece",
    "Bulgaria",
    "Algeria",
    "Morocco",
    "Tunisia",
    "Saharan States",
    "Nigeria",
    "West African States",
    "Ivory Coast",
    "Cameroon",
    "Zaire",
    "Angola",
    "South Africa",
    "Botswana",
    "Zimbabwe",
    "SE African States",
    "Kenya",
    "Somalia",
    "Ethiopia",
    "Sudan",
    "Syria",
    "Israel",
    "Egypt",
    "Libya",
    "Lebanon",
    "Jordan",
    "Saudi Arabia",
    "Gulf States",
    "Iraq",
    "Iran",
    "Afghanistan",
    "Pakistan",
    "India",
    "Burma",
    "Laos/Cambodia",
    "Vietnam",
    "Thailand",
    "Malaysia",
    "Australia",
    "Indonesia",
    "Philippines",
    "Japan",
    "Taiwan",
    "South Korea",
    "North Korea",
    "Mexico",
    "Guatemala",
    "El Salvador",
    "Honduras",
    "Nicaragua",
    "Cuba",
    "Haiti",
    "Dominican Republic",
    "Costa Rica",
    "Panama",
    "Colombia",
    "Venezuela",
    "Brazil",
    "Uruguay",
    "Argentina",
    "Paraguay",
    "Bolivia",
    "Chile",
    "Peru",
    "Ecuador",
];

impl CName {
    pub fn from_index(index: usize) -> Option<CName> {
        num_traits::FromPrimitive::from_usize(index)
    }
    pub fn name(&self) -> &'static str {
        NAMES[*self as usize]
    }
    /// Looks a country up by its printed name, ignoring case.
    pub fn find(name: &str) -> Option<CName> {
        NAME_INDEX.get(&name.trim().to_lowercase()).copied()
    }
    pub fn all() -> impl Iterator<Item = CName> {
        (0..NUM_COUNTRIES).filter_map(CName::from_index)
    }
}
