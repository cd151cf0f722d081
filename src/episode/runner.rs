//! Episode loop for experiment harnesses.
//!
//! Drives one engine with a policy until the state is terminal, the policy
//! gives up, or the episode length cap is hit, and summarises the result
//! as a record ready to be written out as one row.

use serde::{Deserialize, Serialize};
use tracing::info;

use super::policy::Policy;
use crate::error::Result;
use crate::mdp::MarkovDecisionProcess;
use crate::solver::Solver;

/// Configuration for episode runs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EpisodeConfig {
    /// Maximum transitions per episode.
    pub max_episode_length: usize,

    /// Compute the optimal return before the first step.
    pub plan_optimal_return: bool,

    /// Planning horizon. `None` = the engine's default.
    pub planning_horizon: Option<u32>,
}

impl Default for EpisodeConfig {
    fn default() -> Self {
        Self {
            max_episode_length: 100,
            plan_optimal_return: true,
            planning_horizon: None,
        }
    }
}

impl EpisodeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set maximum transitions per episode.
    pub fn with_max_episode_length(mut self, max: usize) -> Self {
        self.max_episode_length = max;
        self
    }

    /// Enable or disable optimal-return planning.
    pub fn with_planning(mut self, enabled: bool) -> Self {
        self.plan_optimal_return = enabled;
        self
    }

    /// Set the planning horizon.
    pub fn with_planning_horizon(mut self, horizon: u32) -> Self {
        self.planning_horizon = Some(horizon);
        self
    }
}

/// Summary of one finished episode.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EpisodeRecord {
    pub episode_id: u64,

    /// Transitions taken.
    pub steps: usize,

    /// Discounted return of the realised trajectory, `G[0]`.
    pub behavior_policy_return: f64,

    /// Undiscounted sum of the realised rewards.
    pub behavior_policy_total_reward: f64,

    /// Best achievable undiscounted reward from the initial state, if planned.
    pub optimal_return: Option<f64>,

    /// Goal facts all hold in the final state.
    pub reached_goal: bool,
}

impl EpisodeRecord {
    /// How far the realised total reward fell short of optimal.
    ///
    /// The planner sums rewards without discounting, so the comparison is
    /// against `behavior_policy_total_reward`, not `G[0]`.
    #[must_use]
    pub fn return_gap(&self) -> Option<f64> {
        self.optimal_return
            .map(|opt| opt - self.behavior_policy_total_reward)
    }
}

/// Runs episodes.
#[derive(Clone, Debug, Default)]
pub struct EpisodeRunner {
    config: EpisodeConfig,
}

impl EpisodeRunner {
    pub fn new(config: EpisodeConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &EpisodeConfig {
        &self.config
    }

    /// Play one episode on a freshly constructed engine.
    ///
    /// Calls `Policy::begin_episode` first, so a seeded policy replays the
    /// same episode whether it runs alone or inside `run_episodes`.
    pub fn run_episode<S: Solver, P: Policy>(
        &self,
        mdp: &mut MarkovDecisionProcess<S>,
        policy: &mut P,
        episode_id: u64,
    ) -> Result<EpisodeRecord> {
        policy.begin_episode(episode_id);

        let optimal_return = if self.config.plan_optimal_return {
            Some(mdp.compute_optimal_return(self.config.planning_horizon)?)
        } else {
            None
        };

        let mut steps = 0;
        while steps < self.config.max_episode_length && !mdp.is_terminal() {
            let Some(action) = policy.select(mdp.state(), mdp.available_actions()) else {
                break;
            };
            mdp.transition(&action)?;
            steps += 1;
        }

        policy.observe(mdp.trajectory(), mdp.discount_rate());

        let record = EpisodeRecord {
            episode_id,
            steps,
            behavior_policy_return: mdp.trajectory().discounted_return(mdp.discount_rate()),
            behavior_policy_total_reward: mdp.trajectory().total_reward(),
            optimal_return,
            reached_goal: mdp.is_goal_reached(),
        };

        info!(
            episode = episode_id,
            steps,
            behavior_return = record.behavior_policy_return,
            optimal_return = ?record.optimal_return,
            reached_goal = record.reached_goal,
            "episode finished"
        );

        Ok(record)
    }

    /// Play `episodes` episodes, building a fresh engine for each.
    pub fn run_episodes<S, P, F>(&self, mut make_mdp: F, policy: &mut P, episodes: u64) -> Result<EpisodeLog>
    where
        S: Solver,
        P: Policy,
        F: FnMut(u64) -> Result<MarkovDecisionProcess<S>>,
    {
        let mut log = EpisodeLog::new();
        for episode_id in 0..episodes {
            let mut mdp = make_mdp(episode_id)?;
            log.push(self.run_episode(&mut mdp, policy, episode_id)?);
        }
        Ok(log)
    }
}

/// Records of a run, in episode order.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EpisodeLog {
    records: Vec<EpisodeRecord>,
}

impl EpisodeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: EpisodeRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[EpisodeRecord] {
        &self.records
    }

    /// Running sum of behaviour returns.
    pub fn cumulative_behavior_returns(&self) -> Vec<f64> {
        running_sum(self.records.iter().map(|r| r.behavior_policy_return))
    }

    /// Running sum of optimal returns. Unplanned episodes count as 0.
    pub fn cumulative_optimal_returns(&self) -> Vec<f64> {
        running_sum(self.records.iter().map(|r| r.optimal_return.unwrap_or_default()))
    }

    /// Fraction of episodes that reached the goal.
    pub fn success_rate(&self) -> f64 {
        if self.records.is_empty() {
            return 0.0;
        }
        let reached = self.records.iter().filter(|r| r.reached_goal).count();
        reached as f64 / self.records.len() as f64
    }
}

fn running_sum(values: impl Iterator<Item = f64>) -> Vec<f64> {
    values
        .scan(0.0, |acc, v| {
            *acc += v;
            Some(*acc)
        })
        .collect()
}
