//! Engine configuration.

use serde::{Deserialize, Serialize};

use crate::error::{MdpError, Result};

/// Configuration for a `MarkovDecisionProcess`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MdpConfig {
    /// Discount rate in [0, 1] used when deriving returns.
    pub discount_rate: f64,

    /// Planning horizon for `compute_optimal_return(None)`.
    /// `None` = twice the number of facts in the current state.
    pub planning_horizon: Option<u32>,

    /// Reject actions that are not in the current available set before
    /// asking the solver. When false the solver decides, and an illegal
    /// action surfaces as `ModelNotFound`.
    pub check_action_legality: bool,
}

impl Default for MdpConfig {
    fn default() -> Self {
        Self {
            discount_rate: 1.0,
            planning_horizon: None,
            check_action_legality: true,
        }
    }
}

impl MdpConfig {
    /// Create a config with the given discount rate.
    pub fn new(discount_rate: f64) -> Self {
        Self {
            discount_rate,
            ..Self::default()
        }
    }

    /// Set a fixed planning horizon.
    pub fn with_planning_horizon(mut self, horizon: u32) -> Self {
        self.planning_horizon = Some(horizon);
        self
    }

    /// Enable or disable the local legality check.
    pub fn with_legality_check(mut self, enabled: bool) -> Self {
        self.check_action_legality = enabled;
        self
    }

    /// Check the discount rate lies in [0, 1].
    pub fn validate(&self) -> Result<()> {
        if (0.0..=1.0).contains(&self.discount_rate) {
            Ok(())
        } else {
            Err(MdpError::InvalidDiscountRate(self.discount_rate))
        }
    }

    /// Horizon used when the caller does not pass one.
    #[must_use]
    pub fn default_horizon(&self, state_size: usize) -> u32 {
        self.planning_horizon
            .unwrap_or_else(|| u32::try_from(2 * state_size).unwrap_or(u32::MAX))
    }
}
