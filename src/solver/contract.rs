//! The solver contract consumed by the engine.
//!
//! A solver grounds and solves the interface program together with a domain
//! program and a handful of input facts, and reports stable models projected
//! onto the requested output predicates.
//!
//! ## Implementation Notes
//!
//! - Calls are independent: no grounding or solver process is assumed to
//!   survive between `solve` calls. An implementation may pool sessions
//!   behind this trait as long as answers stay the same.
//! - `SolveMode::Enumerate { limit }` returns at most `limit` models
//!   (0 = all) in enumeration order.
//! - `SolveMode::Optimize` returns the models found while optimizing, in
//!   the order found; the last one is the best.

use smallvec::SmallVec;

use super::program::ProgramSet;
use super::term::{Signature, Term};
use crate::core::{Action, State};
use crate::error::{MdpError, QueryKind, Result};

/// How many models to ask for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SolveMode {
    /// Enumerate up to `limit` models (0 = all).
    Enumerate { limit: usize },
    /// Enumerate all models under the program's objective.
    Optimize,
}

/// One query against the solver.
#[derive(Clone, Debug)]
pub struct SolveRequest<'a> {
    /// Interface and domain programs.
    pub programs: &'a ProgramSet,

    /// Facts passed as `current/1`.
    pub current: &'a State,

    /// Facts passed as `subgoal/1`.
    pub subgoal: &'a State,

    /// Value of the time constant `t`.
    pub horizon: u32,

    /// Chosen action, passed as `action/1`.
    pub action: Option<&'a Action>,

    /// Output predicates to expose.
    pub show: SmallVec<[Signature; 4]>,

    pub mode: SolveMode,
}

impl<'a> SolveRequest<'a> {
    /// Create a request that shows nothing yet.
    pub fn new(programs: &'a ProgramSet, current: &'a State, subgoal: &'a State, horizon: u32) -> Self {
        Self {
            programs,
            current,
            subgoal,
            horizon,
            action: None,
            show: SmallVec::new(),
            mode: SolveMode::Enumerate { limit: 0 },
        }
    }

    /// Add the chosen action.
    #[must_use]
    pub fn with_action(mut self, action: &'a Action) -> Self {
        self.action = Some(action);
        self
    }

    /// Expose another output predicate.
    #[must_use]
    pub fn show(mut self, signature: Signature) -> Self {
        self.show.push(signature);
        self
    }

    #[must_use]
    pub fn with_mode(mut self, mode: SolveMode) -> Self {
        self.mode = mode;
        self
    }

    /// Check whether a predicate was requested.
    #[must_use]
    pub fn shows(&self, signature: &Signature) -> bool {
        self.show.contains(signature)
    }

    /// Render the input facts and `#show` directives as program text.
    ///
    /// The horizon is not included; it is passed as the constant `t`.
    /// Optimization requests add the `plan` fact, which makes the goal
    /// mandatory within the horizon.
    #[must_use]
    pub fn input_program(&self) -> String {
        let mut out = String::new();
        for fact in self.current {
            out.push_str(&format!("current({fact}).\n"));
        }
        for fact in self.subgoal {
            out.push_str(&format!("subgoal({fact}).\n"));
        }
        if let Some(action) = self.action {
            out.push_str(&format!("action({action}).\n"));
        }
        if self.mode == SolveMode::Optimize {
            out.push_str("plan.\n");
        }
        for signature in &self.show {
            out.push_str(&format!("#show {signature}.\n"));
        }
        out
    }
}

/// A stable model, projected onto the shown predicates.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Model {
    /// Shown atoms.
    pub atoms: Vec<Term>,

    /// Optimization costs, if the program has an objective.
    pub costs: Vec<i64>,
}

impl Model {
    pub fn new(atoms: Vec<Term>) -> Self {
        Self {
            atoms,
            costs: Vec::new(),
        }
    }

    /// Parse a model from the solver's textual atoms.
    pub fn parse<I, T>(atoms: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let atoms = atoms
            .into_iter()
            .map(|a| Term::parse(a.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(atoms))
    }

    /// Atoms of one predicate.
    pub fn atoms_of<'a>(&'a self, signature: &'a Signature) -> impl Iterator<Item = &'a Term> + 'a {
        self.atoms.iter().filter(move |atom| atom.matches(signature))
    }

    /// Single argument of every atom of a unary predicate.
    pub fn arguments_of<'a>(&'a self, signature: &'a Signature) -> impl Iterator<Item = &'a Term> + 'a {
        self.atoms_of(signature).filter_map(|atom| atom.args().first())
    }
}

/// A declarative solver the engine can query.
pub trait Solver {
    /// Ground and solve one request.
    ///
    /// Returns the models found (possibly none). Errors are reserved for
    /// failures of the solver itself: timeouts, bad programs, crashes.
    fn solve(&mut self, request: &SolveRequest<'_>) -> Result<Vec<Model>>;
}

impl<S: Solver + ?Sized> Solver for Box<S> {
    fn solve(&mut self, request: &SolveRequest<'_>) -> Result<Vec<Model>> {
        (**self).solve(request)
    }
}

impl<S: Solver + ?Sized> Solver for &mut S {
    fn solve(&mut self, request: &SolveRequest<'_>) -> Result<Vec<Model>> {
        (**self).solve(request)
    }
}

/// Require exactly one model.
pub fn single_model(models: Vec<Model>, query: QueryKind) -> Result<Model> {
    let count = models.len();
    let mut models = models.into_iter();
    match (models.next(), count) {
        (Some(model), 1) => Ok(model),
        (None, _) => Err(MdpError::ModelNotFound { query }),
        (Some(_), count) => Err(MdpError::AmbiguousModel { query, count }),
    }
}

/// Take the best model of an optimization run.
pub fn best_model(models: Vec<Model>, query: QueryKind) -> Result<Model> {
    models.into_iter().last().ok_or(MdpError::ModelNotFound { query })
}
