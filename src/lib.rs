#[macro_use]
extern crate lazy_static;

#[macro_use]
extern crate num_derive;

pub mod action;
pub mod agent;
pub mod card;
pub mod config;
pub mod country;
pub mod game;
pub mod legal;
mod parse;
pub mod player;
pub mod state;
pub mod track;

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn test_scoring() {
        use country::CName::*;
        use country::{Region, Side};
        let mut state = state::GameState::new();
        state.map.clear_influence();
        let us = [UK, WGermany, Israel, Iran, Japan, Thailand, Mexico, Panama];
        let ussr = [EGermany, Poland, Iraq, Syria, NKorea, Cuba, Angola];
        for c in us.iter() {
            state.control(Side::US, *c);
        }
        for c in ussr.iter() {
            state.control(Side::USSR, *c);
        }
        let scores = [
            (Region::Europe, -1),
            (Region::MiddleEast, 1),
            // Two BGs alone are not domination
            (Region::Asia, 1),
            // Cuba borders the US
            (Region::CentralAmerica, 0),
            (Region::Africa, -2),
            (Region::SoutheastAsia, 2),
        ];
        for (r, delta) in scores.iter() {
            assert_eq!(r.score(&mut state), *delta, "{:?}", r);
        }
    }
}
