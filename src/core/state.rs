//! World states as sets of ground facts.
//!
//! ## Fact
//!
//! A fact is the textual form of a ground term, e.g. `on(a,b)`. Whitespace
//! outside quoted strings is dropped on construction so that facts written
//! by hand compare equal to facts printed by the solver.
//!
//! ## State
//!
//! An unordered set of facts. Uses `im` persistent data structures so the
//! trajectory can keep every visited state without deep copies. Iteration
//! order is sorted, which keeps the facts sent to the solver reproducible.

use std::fmt;

use im::OrdSet;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::solver::Term;

/// A ground fact identifier, e.g. `clear(a)`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fact(String);

impl Fact {
    /// Create a fact from text, normalising whitespace.
    #[must_use]
    pub fn new(text: impl AsRef<str>) -> Self {
        Self(strip_whitespace(text.as_ref()))
    }

    /// Create a fact, checking that the text is a well-formed ground term.
    pub fn parse(text: &str) -> Result<Self> {
        Term::parse(text).map(Self::from)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse this fact into a structured term.
    pub fn to_term(&self) -> Result<Term> {
        Term::parse(&self.0)
    }
}

impl From<Term> for Fact {
    fn from(term: Term) -> Self {
        Self(term.to_string())
    }
}

impl From<&str> for Fact {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for Fact {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

impl fmt::Display for Fact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Remove whitespace that sits outside double-quoted strings.
pub(crate) fn strip_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;

    for c in text.chars() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
        } else if c == '"' {
            in_string = true;
            out.push(c);
        } else if !c.is_whitespace() {
            out.push(c);
        }
    }

    out
}

/// An MDP world state: an immutable set of ground facts.
///
/// Two states are equal iff they contain the same facts.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct State {
    facts: OrdSet<Fact>,
}

impl State {
    /// Create an empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of facts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.facts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    /// Check whether a fact holds in this state.
    #[must_use]
    pub fn contains(&self, fact: &Fact) -> bool {
        self.facts.contains(fact)
    }

    /// Iterate over facts in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &Fact> {
        self.facts.iter()
    }

    /// Return a new state with one more fact. The receiver is unchanged.
    #[must_use]
    pub fn with(&self, fact: impl Into<Fact>) -> Self {
        Self {
            facts: self.facts.update(fact.into()),
        }
    }

    /// Return a new state without the given fact.
    #[must_use]
    pub fn without(&self, fact: &Fact) -> Self {
        Self {
            facts: self.facts.without(fact),
        }
    }

    /// Check whether every fact of `goal` holds here.
    #[must_use]
    pub fn satisfies(&self, goal: &State) -> bool {
        goal.facts.iter().all(|fact| self.facts.contains(fact))
    }
}

impl<F: Into<Fact>> FromIterator<F> for State {
    fn from_iter<I: IntoIterator<Item = F>>(iter: I) -> Self {
        Self {
            facts: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl<'a> IntoIterator for &'a State {
    type Item = &'a Fact;
    type IntoIter = im::ordset::Iter<'a, Fact>;

    fn into_iter(self) -> Self::IntoIter {
        self.facts.iter()
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, fact) in self.facts.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{fact}")?;
        }
        f.write_str("}")
    }
}
