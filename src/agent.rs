use crate::action::{Choice, Decision};
use crate::country::Side;
use crate::state::GameState;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use std::collections::VecDeque;

/// Supplies the player choices the rules ask for.
pub trait Agent {
    /// Given a game state and a decision with its legal options, returns the
    /// index of the chosen option.
    fn decide(&mut self, state: &GameState, decision: &Decision) -> usize;
}

/// Asks the agent and returns a copy of the chosen option. An out of range
/// answer falls back to the first option. None if there are no options.
pub fn choose<A: Agent + ?Sized>(agent: &mut A, state: &GameState, decision: &Decision) -> Option<Choice> {
    if decision.is_empty() {
        return None;
    }
    let index = agent.decide(state, decision);
    let choice = decision.options.get(index).or_else(|| {
        log::warn!("{:?} picked option {} of {}", decision.agent, index, decision.options.len());
        decision.options.first()
    });
    choice.cloned()
}

pub struct Actors<A: Agent, B: Agent> {
    pub ussr_agent: A,
    pub us_agent: B,
}

impl<A, B> Actors<A, B>
where
    A: Agent,
    B: Agent,
{
    pub fn new(ussr_agent: A, us_agent: B) -> Actors<A, B> {
        Actors {
            ussr_agent,
            us_agent,
        }
    }
    pub fn ussr(&self) -> &A {
        &self.ussr_agent
    }
    pub fn ussr_mut(&mut self) -> &mut A {
        &mut self.ussr_agent
    }
    pub fn us(&self) -> &B {
        &self.us_agent
    }
    pub fn us_mut(&mut self) -> &mut B {
        &mut self.us_agent
    }
}

/// Routes each decision to the agent playing the side it is addressed to.
impl<A: Agent, B: Agent> Agent for Actors<A, B> {
    fn decide(&mut self, state: &GameState, decision: &Decision) -> usize {
        match decision.agent {
            Side::USSR => self.ussr_agent.decide(state, decision),
            Side::US => self.us_agent.decide(state, decision),
        }
    }
}

/// Plays back a fixed list of choices. A scripted choice that is not on
/// offer is skipped and the first option is taken instead.
#[derive(Default)]
pub struct ScriptedAgent {
    choices: VecDeque<Choice>,
    missed: usize,
}

impl ScriptedAgent {
    pub fn new(choices: Vec<Choice>) -> Self {
        ScriptedAgent {
            choices: choices.into(),
            missed: 0,
        }
    }
    pub fn push(&mut self, choice: Choice) {
        self.choices.push_back(choice);
    }
    pub fn remaining(&self) -> usize {
        self.choices.len()
    }
    /// How many times the script did not match the options.
    pub fn missed(&self) -> usize {
        self.missed
    }
}

impl Agent for ScriptedAgent {
    fn decide(&mut self, _state: &GameState, decision: &Decision) -> usize {
        let next = self.choices.pop_front();
        let found = next
            .as_ref()
            .and_then(|c| decision.options.iter().position(|o| o == c));
        match found {
            Some(i) => i,
            None => {
                log::warn!(
                    "script for {:?} off track at {:?}: wanted {:?}",
                    decision.agent,
                    decision.prompt,
                    next
                );
                self.missed += 1;
                0
            }
        }
    }
}

/// Picks uniformly among the options.
pub struct RandAgent {
    rng: SmallRng,
}

impl RandAgent {
    pub fn new(seed: u64) -> Self {
        RandAgent {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl Agent for RandAgent {
    fn decide(&mut self, _state: &GameState, decision: &Decision) -> usize {
        if decision.options.is_empty() {
            0
        } else {
            self.rng.gen_range(0, decision.options.len())
        }
    }
}
