use super::{CName, Country, Map, MapRegion, Region, Side};

/// An ordered view over a subset of the map. Every filter returns a new
/// bundle and keeps the map's table order.
#[derive(Clone)]
pub struct CountryBundle<'a> {
    map: &'a Map,
    members: Vec<CName>,
}

impl<'a> CountryBundle<'a> {
    pub fn all(map: &'a Map) -> Self {
        CountryBundle {
            map,
            members: map.countries.iter().map(|c| c.name).collect(),
        }
    }
    pub fn from_names(map: &'a Map, names: &[CName]) -> Self {
        let mut members = names.to_vec();
        members.sort();
        members.dedup();
        CountryBundle { map, members }
    }
    pub fn filter<F>(&self, f: F) -> Self
    where
        F: Fn(&Country) -> bool,
    {
        let members = self
            .members
            .iter()
            .copied()
            .filter(|n| f(&self.map[*n]))
            .collect();
        CountryBundle {
            map: self.map,
            members,
        }
    }
    pub fn region(&self, region: Region) -> Self {
        self.filter(|c| c.region == region)
    }
    pub fn map_region(&self, region: MapRegion) -> Self {
        self.filter(|c| c.in_map_region(region))
    }
    pub fn battleground(&self) -> Self {
        self.filter(|c| c.bg)
    }
    pub fn not_battleground(&self) -> Self {
        self.filter(|c| !c.bg)
    }
    pub fn has_influence(&self, side: Side) -> Self {
        self.filter(|c| c.has_influence(side))
    }
    pub fn any_influence(&self) -> Self {
        self.filter(|c| c.us > 0 || c.ussr > 0)
    }
    pub fn controlled_by(&self, side: Option<Side>) -> Self {
        self.filter(|c| c.controller() == side)
    }
    pub fn enemy_controlled(&self, side: Side) -> Self {
        self.controlled_by(Some(side.opposite()))
    }
    pub fn not_enemy_controlled(&self, side: Side) -> Self {
        let enemy = side.opposite();
        self.filter(|c| c.controller() != Some(enemy))
    }
    pub fn not_defcon_restricted(&self) -> Self {
        self.filter(|c| !c.defcon_restricted())
    }
    pub fn defcon_legal(&self, defcon: i8) -> Self {
        self.filter(|c| c.defcon_legal(defcon))
    }
    pub fn adjacent_to(&self, side: Side) -> Self {
        let map = self.map;
        self.filter(|c| map.is_adjacent(c.name, side))
    }
    pub fn control_margin(&self, side: Side, margin: i8) -> Self {
        self.filter(|c| c.control_margin(side, margin))
    }
    pub fn without(&self, name: CName) -> Self {
        self.filter(|c| c.name != name)
    }
    /// Looks up a member by printed name.
    pub fn get(&self, name: &str) -> Option<&'a Country> {
        let map = self.map;
        CName::find(name)
            .filter(|n| self.contains(*n))
            .map(|n| &map[n])
    }
    pub fn contains(&self, name: CName) -> bool {
        self.members.contains(&name)
    }
    pub fn names(&self) -> &[CName] {
        &self.members
    }
    pub fn iter(&self) -> impl Iterator<Item = &'a Country> + '_ {
        let map = self.map;
        self.members.iter().map(move |n| &map[*n])
    }
    pub fn len(&self) -> usize {
        self.members.len()
    }
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl<'a> IntoIterator for CountryBundle<'a> {
    type Item = CName;
    type IntoIter = std::vec::IntoIter<CName>;
    fn into_iter(self) -> Self::IntoIter {
        self.members.into_iter()
    }
}
