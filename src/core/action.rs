//! Actions and the set of actions executable in a state.
//!
//! An action is an uninterpreted ground term such as `move(a,table)`. The
//! engine never looks inside it; only the domain program gives it meaning.

use std::fmt;

use im::OrdSet;
use serde::{Deserialize, Serialize};

use super::state::strip_whitespace;
use crate::error::Result;
use crate::solver::Term;

/// An executable action identifier.
///
/// ```
/// use asp_mdp::core::Action;
///
/// let a = Action::new("move(a, table)");
/// assert_eq!(a.as_str(), "move(a,table)");
/// assert_eq!(a, Action::new("move(a,table)"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Action(String);

impl Action {
    /// Create an action from text, normalising whitespace.
    #[must_use]
    pub fn new(text: impl AsRef<str>) -> Self {
        Self(strip_whitespace(text.as_ref()))
    }

    /// Create an action, checking that the text is a well-formed ground term.
    pub fn parse(text: &str) -> Result<Self> {
        Term::parse(text).map(Self::from)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<Term> for Action {
    fn from(term: Term) -> Self {
        Self(term.to_string())
    }
}

impl From<&str> for Action {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Actions executable in the current state.
///
/// Recomputed after every transition; never carried over from a previous state.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailableActions {
    actions: OrdSet<Action>,
}

impl AvailableActions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    #[must_use]
    pub fn contains(&self, action: &Action) -> bool {
        self.actions.contains(action)
    }

    /// Iterate in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &Action> {
        self.actions.iter()
    }

    /// Collect into a sorted vector.
    #[must_use]
    pub fn to_vec(&self) -> Vec<Action> {
        self.actions.iter().cloned().collect()
    }
}

impl<A: Into<Action>> FromIterator<A> for AvailableActions {
    fn from_iter<I: IntoIterator<Item = A>>(iter: I) -> Self {
        Self {
            actions: iter.into_iter().map(Into::into).collect(),
        }
    }
}
