//! Core engine types: facts, states, actions, configuration, RNG.
//!
//! Nothing in here knows about a particular domain. Facts and actions are
//! opaque ground terms; only the domain program gives them meaning.

pub mod action;
pub mod config;
pub mod rng;
pub mod state;

pub use action::{Action, AvailableActions};
pub use config::MdpConfig;
pub use rng::{PolicyRng, PolicyRngState};
pub use state::{Fact, State};
