//! The MDP engine and its trajectory.
//!
//! - **MarkovDecisionProcess**: owns state, available actions and trajectory;
//!   drives the solver for transitions, action discovery and planning
//! - **Trajectory**: append-only `S, A, R` history with discounted returns

pub mod engine;
pub mod trajectory;

pub use engine::{predicates, MarkovDecisionProcess};
pub use trajectory::{Step, Trajectory};
