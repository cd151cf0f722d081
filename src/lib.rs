//! # asp-mdp
//!
//! Deterministic Markov Decision Processes whose dynamics, rewards and legal
//! actions are written as answer set programs instead of code.
//!
//! ## Design Principles
//!
//! 1. **Declarative Dynamics**: The engine never interprets a domain. Every
//!    question about the world goes to a `Solver`.
//!
//! 2. **One Query per Operation**: `transition`, action discovery and
//!    optimal-return planning each issue exactly one blocking solver call.
//!
//! 3. **Fail Loudly**: No model, too many models, malformed atoms, missing
//!    programs and timeouts are distinct errors. Nothing is retried.
//!
//! ## Architecture
//!
//! - **Persistent States**: `State` is an `im` ordered set, so the trajectory
//!   keeps every visited state cheaply.
//!
//! - **Deterministic Domains**: a transition must produce exactly one
//!   stable model; two or more is reported as `AmbiguousModel`.
//!
//! ## Modules
//!
//! - `core`: Facts, states, actions, configuration, RNG
//! - `solver`: Solver contract, ground terms, program files, clingo adapter
//! - `mdp`: The engine and its trajectory
//! - `episode`: Policies and the episode loop
//! - `domains`: Native solvers mirroring the bundled programs
//! - `error`: Error taxonomy

pub mod core;
pub mod domains;
pub mod episode;
pub mod error;
pub mod mdp;
pub mod solver;

#[cfg(feature = "python")]
pub mod python;

// Re-export commonly used types
pub use crate::core::{Action, AvailableActions, Fact, MdpConfig, PolicyRng, State};

pub use crate::error::{MdpError, QueryKind, Result};

pub use crate::solver::{
    ClingoSolver, Model, ProgramSet, Signature, SolveMode, SolveRequest, Solver, SolverConfig, Term,
};

pub use crate::mdp::{MarkovDecisionProcess, Trajectory};

pub use crate::episode::{
    EpisodeConfig, EpisodeLog, EpisodeRecord, EpisodeRunner, Policy, ScriptedPolicy,
    UniformRandomPolicy,
};

pub use crate::domains::BlocksWorld;
