//! Trajectory recording and discounted returns.
//!
//! A trajectory is the realised sequence `S0, A0, R1, S1, A1, R2, S2, ...`
//! stored as three parallel sequences:
//!
//! - states: `S0..S[T-1]` (length T)
//! - actions: `A0..A[T-2]` (length T-1)
//! - rewards: `R0..R[T-1]` (length T, `R0` is undefined and stored as `None`)
//!
//! Entries are only ever appended.

use serde::{Deserialize, Serialize};

use crate::core::{Action, State};
use crate::error::{MdpError, Result};

/// One recorded step `(S[t], A[t], R[t+1], S[t+1])`.
#[derive(Clone, Copy, Debug)]
pub struct Step<'a> {
    pub state: &'a State,
    pub action: &'a Action,
    pub reward: f64,
    pub next_state: &'a State,
}

/// Realised history of one MDP run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    states: Vec<State>,
    actions: Vec<Action>,
    rewards: Vec<Option<f64>>,
}

#[allow(clippy::len_without_is_empty)]
impl Trajectory {
    /// Start a trajectory at the initial state.
    #[must_use]
    pub fn new(initial: State) -> Self {
        Self {
            states: vec![initial],
            actions: Vec::new(),
            rewards: vec![None],
        }
    }

    /// Record `A[t]`, `S[t+1]` and `R[t+1]`.
    pub fn push(&mut self, action: Action, next_state: State, reward: f64) {
        self.actions.push(action);
        self.states.push(next_state);
        self.rewards.push(Some(reward));
    }

    /// Number of recorded states (T). Always at least 1.
    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Number of transitions (T - 1).
    #[must_use]
    pub fn step_count(&self) -> usize {
        self.actions.len()
    }

    #[must_use]
    pub fn states(&self) -> &[State] {
        &self.states
    }

    #[must_use]
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Rewards; the first entry is always `None`.
    #[must_use]
    pub fn rewards(&self) -> &[Option<f64>] {
        &self.rewards
    }

    #[must_use]
    pub fn initial_state(&self) -> &State {
        &self.states[0]
    }

    #[must_use]
    pub fn last_state(&self) -> &State {
        &self.states[self.states.len() - 1]
    }

    /// Iterate over recorded transitions in order.
    pub fn steps(&self) -> impl Iterator<Item = Step<'_>> {
        self.actions.iter().enumerate().map(move |(t, action)| Step {
            state: &self.states[t],
            action,
            reward: self.rewards[t + 1].unwrap_or_default(),
            next_state: &self.states[t + 1],
        })
    }

    /// Undiscounted sum of all rewards.
    #[must_use]
    pub fn total_reward(&self) -> f64 {
        self.rewards.iter().flatten().sum()
    }

    /// Discounted return from every time step.
    ///
    /// `G[T-1] = 0` and `G[t] = R[t+1] + discount * G[t+1]`.
    #[must_use]
    pub fn return_history(&self, discount_rate: f64) -> Vec<f64> {
        let len = self.len();
        let mut returns = vec![0.0; len];

        for t in (0..len - 1).rev() {
            let reward = self.rewards[t + 1].unwrap_or_default();
            returns[t] = reward + discount_rate * returns[t + 1];
        }

        returns
    }

    /// Discounted return from the initial state, `G[0]`.
    #[must_use]
    pub fn discounted_return(&self, discount_rate: f64) -> f64 {
        self.return_history(discount_rate)[0]
    }

    /// Serialize to a compact binary snapshot.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    /// Restore from a snapshot, checking the length invariants.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let trajectory: Self = bincode::deserialize(bytes)?;
        trajectory.check()?;
        Ok(trajectory)
    }

    fn check(&self) -> Result<()> {
        if self.states.is_empty() {
            return Err(MdpError::CorruptSnapshot("no initial state".to_string()));
        }
        if self.states.len() != self.rewards.len() || self.states.len() != self.actions.len() + 1 {
            return Err(MdpError::CorruptSnapshot(format!(
                "{} states, {} actions, {} rewards",
                self.states.len(),
                self.actions.len(),
                self.rewards.len()
            )));
        }
        if self.rewards[0].is_some() || self.rewards[1..].iter().any(Option::is_none) {
            return Err(MdpError::CorruptSnapshot("reward sentinel misplaced".to_string()));
        }
        Ok(())
    }
}
