//! Engine bindings for Python.

use std::path::PathBuf;

use pyo3::prelude::*;
use pyo3::types::PyBytes;

use crate::core::{Action, MdpConfig, State};
use crate::episode::{EpisodeConfig, EpisodeRunner, UniformRandomPolicy};
use crate::mdp::{MarkovDecisionProcess, Trajectory};
use crate::solver::{ClingoSolver, ProgramSet, SolverConfig};

use super::py_episode::PyEpisodeRecord;

fn facts(state: &State) -> Vec<String> {
    state.iter().map(|f| f.as_str().to_owned()).collect()
}

/// Python wrapper for MarkovDecisionProcess driven by clingo.
#[pyclass(name = "MarkovDecisionProcess")]
pub struct PyMarkovDecisionProcess {
    inner: MarkovDecisionProcess<ClingoSolver>,
}

#[pymethods]
impl PyMarkovDecisionProcess {
    /// Create an engine and resolve the initially available actions.
    ///
    /// # Arguments
    /// - initial_state: Ground facts true at S0
    /// - goal_state: Facts that must all hold at the goal
    /// - discount_rate: Gamma in [0, 1]
    /// - asp_file_name: Domain program file name
    /// - program_dir: Directory holding both programs (default: bundled programs)
    /// - clingo: clingo executable
    /// - time_limit_secs: Per-query budget, None = unbounded
    /// - check_action_legality: Reject unavailable actions before querying
    #[new]
    #[pyo3(signature = (
        initial_state,
        goal_state,
        discount_rate = 1.0,
        asp_file_name = "blocksworld.lp",
        program_dir = None,
        clingo = "clingo",
        time_limit_secs = None,
        check_action_legality = true
    ))]
    #[allow(clippy::too_many_arguments)]
    fn new(
        initial_state: Vec<String>,
        goal_state: Vec<String>,
        discount_rate: f64,
        asp_file_name: &str,
        program_dir: Option<PathBuf>,
        clingo: &str,
        time_limit_secs: Option<f64>,
        check_action_legality: bool,
    ) -> PyResult<Self> {
        let programs = match program_dir {
            Some(dir) => ProgramSet::in_dir(dir, asp_file_name)?,
            None => ProgramSet::bundled(asp_file_name)?,
        };

        let mut solver_config = SolverConfig::default().with_executable(clingo);
        if let Some(secs) = time_limit_secs {
            solver_config = solver_config.with_time_limit_secs(secs)?;
        }

        let config = MdpConfig::new(discount_rate).with_legality_check(check_action_legality);
        let inner = MarkovDecisionProcess::new(
            initial_state.into_iter().collect(),
            goal_state.into_iter().collect(),
            programs,
            ClingoSolver::new(solver_config),
            config,
        )?;

        Ok(Self { inner })
    }

    /// Apply an action and return its reward.
    fn transition(&mut self, action: &str) -> PyResult<f64> {
        Ok(self.inner.transition(&Action::new(action))?)
    }

    /// Actions executable in the current state.
    fn available_actions(&self) -> Vec<String> {
        self.inner
            .available_actions()
            .iter()
            .map(|a| a.as_str().to_owned())
            .collect()
    }

    /// Best return reachable from the current state.
    #[pyo3(signature = (max_planning_horizon = None))]
    fn compute_optimal_return(&mut self, max_planning_horizon: Option<u32>) -> PyResult<f64> {
        Ok(self.inner.compute_optimal_return(max_planning_horizon)?)
    }

    /// Discounted return from every recorded time step.
    fn return_history(&self) -> Vec<f64> {
        self.inner.return_history()
    }

    #[getter]
    fn state(&self) -> Vec<String> {
        facts(self.inner.state())
    }

    #[getter]
    fn goal_state(&self) -> Vec<String> {
        facts(self.inner.goal_state())
    }

    #[getter]
    fn discount_rate(&self) -> f64 {
        self.inner.discount_rate()
    }

    #[getter]
    fn state_history(&self) -> Vec<Vec<String>> {
        self.inner.trajectory().states().iter().map(facts).collect()
    }

    #[getter]
    fn action_history(&self) -> Vec<String> {
        self.inner
            .trajectory()
            .actions()
            .iter()
            .map(|a| a.as_str().to_owned())
            .collect()
    }

    /// Rewards; the first entry is None.
    #[getter]
    fn reward_history(&self) -> Vec<Option<f64>> {
        self.inner.trajectory().rewards().to_vec()
    }

    fn is_goal_reached(&self) -> bool {
        self.inner.is_goal_reached()
    }

    fn is_terminal(&self) -> bool {
        self.inner.is_terminal()
    }

    /// Snapshot of the trajectory so far.
    fn trajectory(&self) -> PyTrajectory {
        PyTrajectory(self.inner.trajectory().clone())
    }

    /// Play a uniform random episode from the current state.
    #[pyo3(signature = (seed = 42, max_episode_length = 100, episode_id = 0, plan_optimal_return = true))]
    fn run_random_episode(
        &mut self,
        seed: u64,
        max_episode_length: usize,
        episode_id: u64,
        plan_optimal_return: bool,
    ) -> PyResult<PyEpisodeRecord> {
        let runner = EpisodeRunner::new(
            EpisodeConfig::new()
                .with_max_episode_length(max_episode_length)
                .with_planning(plan_optimal_return),
        );
        let mut policy = UniformRandomPolicy::new(seed);

        let record = runner.run_episode(&mut self.inner, &mut policy, episode_id)?;
        Ok(PyEpisodeRecord(record))
    }

    fn __repr__(&self) -> String {
        format!(
            "MarkovDecisionProcess(domain={}, state={}, steps={})",
            self.inner.programs().domain_name(),
            self.inner.state(),
            self.inner.trajectory().step_count()
        )
    }
}

/// Python wrapper for Trajectory.
#[pyclass(name = "Trajectory")]
#[derive(Clone)]
pub struct PyTrajectory(pub Trajectory);

#[pymethods]
impl PyTrajectory {
    #[getter]
    fn states(&self) -> Vec<Vec<String>> {
        self.0.states().iter().map(facts).collect()
    }

    #[getter]
    fn actions(&self) -> Vec<String> {
        self.0.actions().iter().map(|a| a.as_str().to_owned()).collect()
    }

    #[getter]
    fn rewards(&self) -> Vec<Option<f64>> {
        self.0.rewards().to_vec()
    }

    fn return_history(&self, discount_rate: f64) -> Vec<f64> {
        self.0.return_history(discount_rate)
    }

    fn total_reward(&self) -> f64 {
        self.0.total_reward()
    }

    /// Serialize to bincode bytes.
    fn to_bytes<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyBytes>> {
        let bytes = self.0.to_bytes()?;
        Ok(PyBytes::new_bound(py, &bytes))
    }

    #[staticmethod]
    fn from_bytes(bytes: &[u8]) -> PyResult<Self> {
        Ok(Self(Trajectory::from_bytes(bytes)?))
    }

    fn __len__(&self) -> usize {
        self.0.len()
    }

    fn __repr__(&self) -> String {
        format!(
            "Trajectory(length={}, steps={}, total_reward={})",
            self.0.len(),
            self.0.step_count(),
            self.0.total_reward()
        )
    }
}
