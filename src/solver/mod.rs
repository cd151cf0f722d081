//! The declarative solver boundary.
//!
//! The engine never interprets domain dynamics itself. Every question it
//! asks (which actions are legal, what a step leads to, what the best
//! achievable return is) goes through the `Solver` trait:
//!
//! - `term`: ground terms and predicate signatures, with a parser for the
//!   solver's textual output
//! - `contract`: `Solver`, `SolveRequest`, `SolveMode`, `Model`
//! - `program`: locating the interface and domain programs
//! - `clingo`: `ClingoSolver`, a subprocess adapter for the clingo executable

pub mod clingo;
pub mod contract;
pub mod program;
pub mod term;

pub use clingo::{ClingoSolver, SolverConfig};
pub use contract::{best_model, single_model, Model, SolveMode, SolveRequest, Solver};
pub use program::{bundled_dir, ProgramSet, INTERFACE_PROGRAM};
pub use term::{Signature, Term};
