//! Policies that choose actions during an episode.
//!
//! Learning policies live outside this crate; they plug in through the
//! `Policy` trait. The two policies here are baselines.

use std::collections::VecDeque;

use crate::core::{Action, AvailableActions, PolicyRng, State};
use crate::mdp::Trajectory;

/// Chooses actions for an episode.
pub trait Policy {
    /// Called by the runner before the first step of each episode.
    fn begin_episode(&mut self, _episode_id: u64) {}

    /// Pick an action from `actions`, or `None` to end the episode.
    fn select(&mut self, state: &State, actions: &AvailableActions) -> Option<Action>;

    /// Called once the episode is over with its full trajectory.
    fn observe(&mut self, _trajectory: &Trajectory, _discount_rate: f64) {}
}

impl<P: Policy + ?Sized> Policy for &mut P {
    fn begin_episode(&mut self, episode_id: u64) {
        (**self).begin_episode(episode_id);
    }

    fn select(&mut self, state: &State, actions: &AvailableActions) -> Option<Action> {
        (**self).select(state, actions)
    }

    fn observe(&mut self, trajectory: &Trajectory, discount_rate: f64) {
        (**self).observe(trajectory, discount_rate);
    }
}

/// Picks uniformly among the available actions.
#[derive(Clone, Debug)]
pub struct UniformRandomPolicy {
    base: PolicyRng,
    rng: PolicyRng,
}

impl UniformRandomPolicy {
    pub fn new(seed: u64) -> Self {
        let base = PolicyRng::new(seed);
        Self {
            rng: base.clone(),
            base,
        }
    }

    /// Reseed for an episode so each episode is reproducible on its own.
    pub fn reseed_for_episode(&mut self, episode_id: u64) {
        self.rng = self.base.for_episode(episode_id);
    }
}

impl Policy for UniformRandomPolicy {
    fn begin_episode(&mut self, episode_id: u64) {
        self.reseed_for_episode(episode_id);
    }

    fn select(&mut self, _state: &State, actions: &AvailableActions) -> Option<Action> {
        let actions = actions.to_vec();
        self.rng.choose(&actions).cloned()
    }
}

/// Replays a fixed list of actions, then stops.
#[derive(Clone, Debug, Default)]
pub struct ScriptedPolicy {
    script: VecDeque<Action>,
}

impl ScriptedPolicy {
    pub fn new<A: Into<Action>>(actions: impl IntoIterator<Item = A>) -> Self {
        Self {
            script: actions.into_iter().map(Into::into).collect(),
        }
    }

    /// Actions not yet played.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl Policy for ScriptedPolicy {
    fn select(&mut self, _state: &State, _actions: &AvailableActions) -> Option<Action> {
        self.script.pop_front()
    }
}
