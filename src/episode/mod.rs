//! Episode driving for experiment harnesses.
//!
//! ## Overview
//!
//! - **Policy**: chooses actions; learning policies implement it outside
//!   this crate
//! - **UniformRandomPolicy / ScriptedPolicy**: baselines
//! - **EpisodeRunner**: plays episodes and produces `EpisodeRecord`s
//! - **EpisodeLog**: collects records and derives cumulative returns
//!
//! ## Usage
//!
//! ```rust,ignore
//! use asp_mdp::episode::{EpisodeConfig, EpisodeRunner, UniformRandomPolicy};
//!
//! let runner = EpisodeRunner::new(EpisodeConfig::new().with_max_episode_length(16));
//! let mut policy = UniformRandomPolicy::new(42);
//!
//! let log = runner.run_episodes(|_| build_mdp(), &mut policy, 100)?;
//! let cumulative = log.cumulative_behavior_returns();
//! ```

pub mod policy;
pub mod runner;

pub use policy::{Policy, ScriptedPolicy, UniformRandomPolicy};
pub use runner::{EpisodeConfig, EpisodeLog, EpisodeRecord, EpisodeRunner};
