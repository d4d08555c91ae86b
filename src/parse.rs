//! Parser for the plain-text country table the standard map is built from.
use crate::country::{CName, MapError, MapRegion, Neighbor, Region, Side};
use nom::{
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::{char, digit1, space0},
    combinator::{all_consuming, map, map_res, value},
    multi::separated_nonempty_list,
    sequence::delimited,
    IResult,
};

/// One row of the table before names are resolved.
#[derive(Clone, Debug, PartialEq)]
pub struct RawCountry<'a> {
    pub name: &'a str,
    pub region: Region,
    pub map_regions: Vec<MapRegion>,
    pub stability: i8,
    pub bg: bool,
    pub us: i8,
    pub ussr: i8,
    pub neighbors: Vec<RawNeighbor<'a>>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum RawNeighbor<'a> {
    Named(&'a str),
    Home(Side),
}

impl<'a> RawNeighbor<'a> {
    pub fn resolve(&self) -> Result<Neighbor, MapError> {
        match self {
            RawNeighbor::Home(side) => Ok(Neighbor::Home(*side)),
            RawNeighbor::Named(name) => CName::find(name)
                .map(Neighbor::Country)
                .ok_or_else(|| MapError::UnknownCountry(name.to_string())),
        }
    }
}

/// Parses every non-blank, non-comment line of the table.
pub fn country_table(text: &str) -> Result<Vec<RawCountry>, MapError> {
    let mut rows = Vec::new();
    for (i, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match all_consuming(country)(line) {
            Ok((_, row)) => rows.push(row),
            Err(_) => {
                return Err(MapError::Parse {
                    line: i + 1,
                    text: line.to_string(),
                })
            }
        }
    }
    Ok(rows)
}

fn bar(input: &str) -> IResult<&str, char> {
    delimited(space0, char('|'), space0)(input)
}

fn comma(input: &str) -> IResult<&str, char> {
    delimited(space0, char(','), space0)(input)
}

fn word(input: &str) -> IResult<&str, &str> {
    map(take_while1(|c: char| c != '|' && c != ','), |s: &str| {
        s.trim()
    })(input)
}

fn number(input: &str) -> IResult<&str, i8> {
    map_res(digit1, |s: &str| s.parse::<i8>())(input)
}

fn region(input: &str) -> IResult<&str, Region> {
    alt((
        value(Region::Europe, tag("Europe")),
        value(Region::MiddleEast, tag("MiddleEast")),
        value(Region::Asia, tag("Asia")),
        value(Region::Africa, tag("Africa")),
        value(Region::CentralAmerica, tag("CentralAmerica")),
        value(Region::SouthAmerica, tag("SouthAmerica")),
    ))(input)
}

fn map_region(input: &str) -> IResult<&str, MapRegion> {
    alt((
        value(MapRegion::WesternEurope, tag("WesternEurope")),
        value(MapRegion::EasternEurope, tag("EasternEurope")),
        value(MapRegion::MiddleEast, tag("MiddleEast")),
        value(MapRegion::SoutheastAsia, tag("SoutheastAsia")),
        value(MapRegion::Asia, tag("Asia")),
        value(MapRegion::Africa, tag("Africa")),
        value(MapRegion::CentralAmerica, tag("CentralAmerica")),
        value(MapRegion::SouthAmerica, tag("SouthAmerica")),
    ))(input)
}

fn battleground(input: &str) -> IResult<&str, bool> {
    alt((value(true, tag("BG")), value(false, tag("-"))))(input)
}

fn neighbor(input: &str) -> IResult<&str, RawNeighbor> {
    alt((
        value(RawNeighbor::Home(Side::USSR), tag("@USSR")),
        value(RawNeighbor::Home(Side::US), tag("@US")),
        map(word, RawNeighbor::Named),
    ))(input)
}

fn country(input: &str) -> IResult<&str, RawCountry> {
    let (input, name) = word(input)?;
    let (input, _) = bar(input)?;
    let (input, region) = region(input)?;
    let (input, _) = bar(input)?;
    let (input, map_regions) = separated_nonempty_list(comma, map_region)(input)?;
    let (input, _) = bar(input)?;
    let (input, stability) = number(input)?;
    let (input, _) = bar(input)?;
    let (input, bg) = battleground(input)?;
    let (input, _) = bar(input)?;
    let (input, us) = number(input)?;
    let (input, _) = bar(input)?;
    let (input, ussr) = number(input)?;
    let (input, _) = bar(input)?;
    let (input, neighbors) = separated_nonempty_list(comma, neighbor)(input)?;
    let (input, _) = space0(input)?;
    Ok((
        input,
        RawCountry {
            name,
            region,
            map_regions,
            stability,
            bg,
            us,
            ussr,
            neighbors,
        },
    ))
}
