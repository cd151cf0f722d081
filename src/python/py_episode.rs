//! Episode bindings for Python.

use pyo3::prelude::*;

use crate::episode::EpisodeRecord;

/// Python wrapper for EpisodeRecord.
#[pyclass(name = "EpisodeRecord")]
#[derive(Clone)]
pub struct PyEpisodeRecord(pub EpisodeRecord);

#[pymethods]
impl PyEpisodeRecord {
    #[getter]
    fn episode_id(&self) -> u64 {
        self.0.episode_id
    }

    #[getter]
    fn steps(&self) -> usize {
        self.0.steps
    }

    #[getter]
    fn behavior_policy_return(&self) -> f64 {
        self.0.behavior_policy_return
    }

    #[getter]
    fn behavior_policy_total_reward(&self) -> f64 {
        self.0.behavior_policy_total_reward
    }

    #[getter]
    fn optimal_return(&self) -> Option<f64> {
        self.0.optimal_return
    }

    #[getter]
    fn reached_goal(&self) -> bool {
        self.0.reached_goal
    }

    fn return_gap(&self) -> Option<f64> {
        self.0.return_gap()
    }

    /// One JSON object, for appending to a results file.
    fn to_json(&self) -> PyResult<String> {
        serde_json::to_string(&self.0)
            .map_err(|e| PyErr::new::<pyo3::exceptions::PyValueError, _>(format!("{}", e)))
    }

    fn __repr__(&self) -> String {
        format!(
            "EpisodeRecord(id={}, steps={}, return={:.2}, optimal={:?})",
            self.0.episode_id, self.0.steps, self.0.behavior_policy_return, self.0.optimal_return
        )
    }
}
