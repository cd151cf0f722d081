//! Blocks world, solved natively.
//!
//! `BlocksWorld` implements `Solver` by evaluating the dynamics of
//! `asp/blocksworld.lp` directly instead of grounding it:
//!
//! - fluents: `on(X,Y)`, `ontable(X)`, `clear(X)`
//! - actions: `move(X,Y)` onto a clear block, `move(X,table)` from a block
//! - reward: +100 for the step that reaches the goal, -1 for any other step
//! - no action is executable once the goal holds
//!
//! It answers the three query shapes the engine issues (`t=0` action
//! discovery, `t=1` transitions, bounded-horizon optimization) and ignores the
//! program files in the request. Useful for tests and for runs on machines
//! without clingo.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::core::{Action, Fact, State};
use crate::error::{MdpError, Result};
use crate::mdp::predicates;
use crate::solver::{Model, SolveMode, SolveRequest, Solver, Term};

/// Reward for the step that reaches the goal.
pub const GOAL_REWARD: i64 = 100;

/// Reward for every other step.
pub const STEP_REWARD: i64 = -1;

const TABLE: &str = "table";

/// Native blocks-world solver.
#[derive(Clone, Debug, Default)]
pub struct BlocksWorld {
    queries: usize,
}

impl BlocksWorld {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `solve` calls answered so far.
    #[must_use]
    pub fn queries(&self) -> usize {
        self.queries
    }

    /// Answer a `t=0` query: what is executable here.
    fn observe(request: &SolveRequest<'_>, world: &World) -> Result<Model> {
        let mut atoms = Vec::new();
        if request.shows(&predicates::state()) {
            for fact in request.current {
                atoms.push(Term::function("state", vec![fact.to_term()?]));
            }
        }
        if request.shows(&predicates::executable()) {
            for action in world.executable(request.subgoal) {
                atoms.push(Term::function("executable", vec![action]));
            }
        }
        Ok(Model::new(atoms))
    }

    /// Answer a `t=1` query: apply one action.
    fn step(request: &SolveRequest<'_>, world: &World, action: &Action) -> Result<Vec<Model>> {
        let action = Term::parse(action.as_str())?;
        if !world.executable(request.subgoal).contains(&action) {
            return Ok(Vec::new());
        }

        let next = world.apply(&action);
        let next_state = next.to_state();
        let reward = if next_state.satisfies(request.subgoal) {
            GOAL_REWARD
        } else {
            STEP_REWARD
        };

        let mut atoms = Vec::new();
        if request.shows(&predicates::state()) {
            for fact in &next_state {
                atoms.push(Term::function("state", vec![fact.to_term()?]));
            }
        }
        if request.shows(&predicates::next_reward()) {
            atoms.push(Term::function("nextReward", vec![Term::Number(reward)]));
        }
        if request.shows(&predicates::executable()) {
            for action in next.executable(request.subgoal) {
                atoms.push(Term::function("executable", vec![action]));
            }
        }

        Ok(vec![Model::new(atoms)])
    }

    /// Answer an optimization query.
    fn optimize(request: &SolveRequest<'_>, world: World) -> Vec<Model> {
        match best_return(world, request.subgoal, request.horizon) {
            Some(best) if request.shows(&predicates::max_return()) => {
                let mut model = Model::new(vec![Term::function("maxReturn", vec![Term::Number(best)])]);
                model.costs = vec![-best];
                vec![model]
            }
            Some(_) => vec![Model::default()],
            None => Vec::new(),
        }
    }
}

impl Solver for BlocksWorld {
    fn solve(&mut self, request: &SolveRequest<'_>) -> Result<Vec<Model>> {
        self.queries += 1;
        let world = World::parse(request.current)?;

        match (request.mode, request.action, request.horizon) {
            (SolveMode::Optimize, _, _) => Ok(Self::optimize(request, world)),
            (SolveMode::Enumerate { .. }, None, 0) => Ok(vec![Self::observe(request, &world)?]),
            (SolveMode::Enumerate { .. }, Some(action), 1) => Self::step(request, &world, action),
            (_, action, horizon) => Err(MdpError::Solver(format!(
                "blocks world cannot enumerate t={horizon} with action {action:?}"
            ))),
        }
    }
}

/// Best reachable return within `horizon` steps, or `None` if the goal is
/// out of reach.
///
/// Every step before the goal earns the same reward, so the best plan is a
/// shortest one. Searches breadth-first over reachable states and stops at
/// the horizon or once a layer adds no new state.
fn best_return(start: World, goal: &State, horizon: u32) -> Option<i64> {
    let start_state = start.to_state();
    if start_state.satisfies(goal) {
        return Some(0);
    }

    let mut seen = FxHashSet::default();
    seen.insert(start_state);
    let mut frontier = vec![start];
    let mut depth: i64 = 0;

    while depth < i64::from(horizon) && !frontier.is_empty() {
        depth += 1;
        let mut next_layer = Vec::new();
        for world in &frontier {
            for action in world.executable(goal) {
                let next = world.apply(&action);
                let state = next.to_state();
                if state.satisfies(goal) {
                    return Some(GOAL_REWARD + STEP_REWARD * (depth - 1));
                }
                if seen.insert(state) {
                    next_layer.push(next);
                }
            }
        }
        frontier = next_layer;
    }

    None
}

#[derive(Clone, Debug, Default)]
struct World {
    /// block -> block it sits on
    on: FxHashMap<String, String>,
    ontable: FxHashSet<String>,
    clear: FxHashSet<String>,
}

impl World {
    fn parse(state: &State) -> Result<Self> {
        let mut world = World::default();
        for fact in state {
            let term = fact.to_term()?;
            let args = term.args();
            match (term.name(), args.len()) {
                (Some("on"), 2) => {
                    world.on.insert(args[0].to_string(), args[1].to_string());
                }
                (Some("ontable"), 1) => {
                    world.ontable.insert(args[0].to_string());
                }
                (Some("clear"), 1) => {
                    world.clear.insert(args[0].to_string());
                }
                _ => return Err(MdpError::malformed(fact, "not a blocks-world fluent")),
            }
        }
        Ok(world)
    }

    /// Blocks in sorted order.
    fn blocks(&self) -> Vec<&str> {
        let mut blocks: Vec<&str> = self
            .on
            .iter()
            .flat_map(|(x, y)| [x.as_str(), y.as_str()])
            .chain(self.ontable.iter().map(String::as_str))
            .collect();
        blocks.sort_unstable();
        blocks.dedup();
        blocks
    }

    fn executable(&self, goal: &State) -> Vec<Term> {
        if self.to_state().satisfies(goal) {
            return Vec::new();
        }

        let blocks = self.blocks();
        let mut actions = Vec::new();
        for &x in &blocks {
            if !self.clear.contains(x) {
                continue;
            }
            if self.on.contains_key(x) {
                actions.push(move_term(x, TABLE));
            }
            for &y in &blocks {
                let already_there = self.on.get(x).is_some_and(|below| below == y);
                if x != y && self.clear.contains(y) && !already_there {
                    actions.push(move_term(x, y));
                }
            }
        }
        actions
    }

    fn apply(&self, action: &Term) -> World {
        let mut next = self.clone();
        let args = action.args();
        let (x, y) = (args[0].to_string(), args[1].to_string());

        if let Some(below) = next.on.remove(&x) {
            next.clear.insert(below);
        }
        next.ontable.remove(&x);

        if y == TABLE {
            next.ontable.insert(x);
        } else {
            next.clear.remove(&y);
            next.on.insert(x, y);
        }
        next
    }

    fn to_state(&self) -> State {
        let on = self.on.iter().map(|(x, y)| Fact::new(format!("on({x},{y})")));
        let ontable = self.ontable.iter().map(|x| Fact::new(format!("ontable({x})")));
        let clear = self.clear.iter().map(|x| Fact::new(format!("clear({x})")));
        on.chain(ontable).chain(clear).collect()
    }
}

fn move_term(x: &str, y: &str) -> Term {
    Term::function("move", vec![Term::symbol(x), Term::symbol(y)])
}
