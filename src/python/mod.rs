//! Python bindings for the asp-mdp engine.
//!
//! Thin PyO3 wrappers so experiment scripts and learning agents written in
//! Python can drive the engine.
//!
//! # Quick Start
//!
//! ```python
//! import asp_mdp
//!
//! mdp = asp_mdp.MarkovDecisionProcess(
//!     ["clear(a)", "on(a,b)", "ontable(b)"],
//!     ["on(b,a)"],
//!     discount_rate=0.9,
//!     asp_file_name="blocksworld.lp",
//! )
//! reward = mdp.transition("move(a,table)")
//! print(mdp.available_actions(), mdp.return_history())
//! ```

use pyo3::exceptions::{PyFileNotFoundError, PyRuntimeError, PyTimeoutError, PyValueError};
use pyo3::prelude::*;

use crate::error::MdpError;

mod py_episode;
mod py_mdp;

pub use py_episode::*;
pub use py_mdp::*;

impl From<MdpError> for PyErr {
    fn from(err: MdpError) -> Self {
        let message = err.to_string();
        match err {
            MdpError::MissingProgramFile { .. } => PyFileNotFoundError::new_err(message),
            MdpError::SolverTimeout { .. } => PyTimeoutError::new_err(message),
            MdpError::IllegalAction { .. }
            | MdpError::InvalidDiscountRate(_)
            | MdpError::InvalidTimeLimit(_)
            | MdpError::MalformedAtom { .. } => PyValueError::new_err(message),
            _ => PyRuntimeError::new_err(message),
        }
    }
}

/// asp_mdp: Markov Decision Processes defined by answer set programs.
///
/// This module provides:
/// - The MDP engine backed by clingo
/// - Trajectory inspection and discounted returns
/// - A uniform random baseline episode runner
#[pymodule]
fn asp_mdp(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyMarkovDecisionProcess>()?;
    m.add_class::<PyTrajectory>()?;
    m.add_class::<PyEpisodeRecord>()?;

    Ok(())
}
