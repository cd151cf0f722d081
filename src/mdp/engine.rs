//! The MDP simulation engine.
//!
//! Owns the current state, the actions available in it, and the trajectory.
//! Every operation issues exactly one blocking solver query:
//!
//! | Operation                    | `t`       | Shown predicates                         | Mode              |
//! |------------------------------|-----------|------------------------------------------|-------------------|
//! | `resolve_available_actions`  | 0         | `executable/1`                           | exactly one model |
//! | `transition`                 | 1         | `state/1`, `nextReward/1`, `executable/1`| exactly one model |
//! | `compute_optimal_return`     | horizon   | `maxReturn/1`                            | optimize          |

use tracing::{debug, info};

use super::trajectory::Trajectory;
use crate::core::{Action, AvailableActions, Fact, MdpConfig, State};
use crate::error::{MdpError, QueryKind, Result};
use crate::solver::{
    best_model, single_model, Model, ProgramSet, Signature, SolveMode, SolveRequest, Solver, Term,
};

/// Enough to tell "one model" from "more than one".
const UNIQUENESS_MODEL_LIMIT: usize = 2;

/// Output predicate names shared with the interface program.
pub mod predicates {
    use crate::solver::Signature;

    pub fn state() -> Signature {
        Signature::new("state", 1)
    }

    pub fn next_reward() -> Signature {
        Signature::new("nextReward", 1)
    }

    pub fn executable() -> Signature {
        Signature::new("executable", 1)
    }

    pub fn max_return() -> Signature {
        Signature::new("maxReturn", 1)
    }
}

/// A deterministic MDP whose dynamics live in a logic program.
///
/// ## Example
///
/// ```
/// use asp_mdp::core::{Action, MdpConfig, State};
/// use asp_mdp::domains::BlocksWorld;
/// use asp_mdp::mdp::MarkovDecisionProcess;
/// use asp_mdp::solver::ProgramSet;
///
/// let initial: State = ["clear(a)", "on(a,b)", "ontable(b)"].into_iter().collect();
/// let goal: State = ["on(b,a)"].into_iter().collect();
/// let programs = ProgramSet::bundled("blocksworld.lp").unwrap();
///
/// let mut mdp = MarkovDecisionProcess::new(
///     initial, goal, programs, BlocksWorld::new(), MdpConfig::new(0.9),
/// ).unwrap();
///
/// let reward = mdp.transition(&Action::new("move(a, table)")).unwrap();
/// assert_eq!(reward, -1.0);
/// assert_eq!(mdp.trajectory().len(), 2);
/// ```
pub struct MarkovDecisionProcess<S: Solver> {
    state: State,
    goal_state: State,
    config: MdpConfig,
    programs: ProgramSet,
    solver: S,
    available_actions: AvailableActions,
    trajectory: Trajectory,
}

impl<S: Solver> MarkovDecisionProcess<S> {
    /// Create an engine and resolve the initially available actions.
    pub fn new(
        initial_state: State,
        goal_state: State,
        programs: ProgramSet,
        solver: S,
        config: MdpConfig,
    ) -> Result<Self> {
        config.validate()?;

        let mut mdp = Self {
            trajectory: Trajectory::new(initial_state.clone()),
            state: initial_state,
            goal_state,
            config,
            programs,
            solver,
            available_actions: AvailableActions::new(),
        };
        mdp.available_actions = mdp.resolve_available_actions()?;

        Ok(mdp)
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> &State {
        &self.state
    }

    #[must_use]
    pub fn goal_state(&self) -> &State {
        &self.goal_state
    }

    #[must_use]
    pub fn discount_rate(&self) -> f64 {
        self.config.discount_rate
    }

    #[must_use]
    pub fn config(&self) -> &MdpConfig {
        &self.config
    }

    #[must_use]
    pub fn programs(&self) -> &ProgramSet {
        &self.programs
    }

    #[must_use]
    pub fn solver(&self) -> &S {
        &self.solver
    }

    /// Actions executable in the current state, as last reported by the solver.
    #[must_use]
    pub fn available_actions(&self) -> &AvailableActions {
        &self.available_actions
    }

    #[must_use]
    pub fn trajectory(&self) -> &Trajectory {
        &self.trajectory
    }

    /// Discounted return from every recorded time step.
    #[must_use]
    pub fn return_history(&self) -> Vec<f64> {
        self.trajectory.return_history(self.config.discount_rate)
    }

    /// Check whether every goal fact holds in the current state.
    #[must_use]
    pub fn is_goal_reached(&self) -> bool {
        self.state.satisfies(&self.goal_state)
    }

    /// No action is executable from here.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.available_actions.is_empty()
    }

    /// Ask the solver which actions are executable in the current state.
    ///
    /// Does not touch the cached set; `new` and `transition` do that.
    pub fn resolve_available_actions(&mut self) -> Result<AvailableActions> {
        let request = SolveRequest::new(&self.programs, &self.state, &self.goal_state, 0)
            .show(predicates::executable())
            .with_mode(SolveMode::Enumerate { limit: UNIQUENESS_MODEL_LIMIT });

        let models = self.solver.solve(&request)?;
        debug!(query = %QueryKind::AvailableActions, models = models.len(), "solver answered");

        let model = single_model(models, QueryKind::AvailableActions)?;
        Ok(executable_actions(&model))
    }

    /// Apply one action and return the reward it earned.
    ///
    /// On success the state and available actions are replaced and the
    /// trajectory grows by one step. On failure nothing changes.
    pub fn transition(&mut self, action: &Action) -> Result<f64> {
        if self.config.check_action_legality && !self.available_actions.contains(action) {
            return Err(MdpError::IllegalAction {
                action: action.to_string(),
            });
        }

        let request = SolveRequest::new(&self.programs, &self.state, &self.goal_state, 1)
            .with_action(action)
            .show(predicates::state())
            .show(predicates::next_reward())
            .show(predicates::executable())
            .with_mode(SolveMode::Enumerate { limit: UNIQUENESS_MODEL_LIMIT });

        let models = self.solver.solve(&request)?;
        debug!(query = %QueryKind::Transition, models = models.len(), "solver answered");

        let model = single_model(models, QueryKind::Transition)?;
        let next_state: State = model.arguments_of(&predicates::state()).cloned().map(Fact::from).collect();
        let reward = next_reward(&model)?;
        let available_actions = executable_actions(&model);

        info!(%action, reward, facts = next_state.len(), "transition");

        self.trajectory.push(action.clone(), next_state.clone(), reward);
        self.state = next_state;
        self.available_actions = available_actions;

        Ok(reward)
    }

    /// Best cumulative reward reachable from the current state within
    /// `horizon` steps.
    ///
    /// Defaults to the configured horizon, or twice the number of facts in
    /// the current state. Never mutates the engine. A goal that cannot be
    /// reached within the horizon yields `ModelNotFound`; retrying with a
    /// larger horizon is up to the caller.
    pub fn compute_optimal_return(&mut self, horizon: Option<u32>) -> Result<f64> {
        let horizon = horizon.unwrap_or_else(|| self.config.default_horizon(self.state.len()));

        let request = SolveRequest::new(&self.programs, &self.state, &self.goal_state, horizon)
            .show(predicates::max_return())
            .with_mode(SolveMode::Optimize);

        let models = self.solver.solve(&request)?;
        debug!(query = %QueryKind::OptimalReturn, horizon, models = models.len(), "solver answered");

        let model = best_model(models, QueryKind::OptimalReturn)?;
        let max_return = unique_number(&model, &predicates::max_return())?;
        Ok(max_return as f64)
    }
}

/// Integer argument of the only atom of a unary predicate.
fn unique_number(model: &Model, signature: &Signature) -> Result<i64> {
    let mut atoms = model.atoms_of(signature);
    let atom = atoms
        .next()
        .ok_or_else(|| MdpError::malformed(signature, "atom missing from model"))?;
    if let Some(extra) = atoms.next() {
        return Err(MdpError::malformed(extra, format!("more than one {signature} atom")));
    }
    atom.args()
        .first()
        .and_then(Term::as_number)
        .ok_or_else(|| MdpError::malformed(atom, "expected an integer argument"))
}

fn next_reward(model: &Model) -> Result<f64> {
    unique_number(model, &predicates::next_reward()).map(|r| r as f64)
}

fn executable_actions(model: &Model) -> AvailableActions {
    model
        .arguments_of(&predicates::executable())
        .cloned()
        .map(Action::from)
        .collect()
}
