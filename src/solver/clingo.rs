//! Solver backed by the `clingo` executable.
//!
//! Each `solve` call spawns one clingo process:
//!
//! ```text
//! clingo <interface.lp> <domain.lp> - --outf=2 -c t=<horizon> --models=<n> --opt-mode=<ignore|opt>
//! ```
//!
//! Input facts and `#show` directives are written to stdin. The JSON report
//! on stdout is parsed into models. clingo's exit code is a bit set: 1 means
//! the search was interrupted (time limit), 10 satisfiable, 20 search space
//! exhausted, 33 and above a hard failure.

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::contract::{Model, SolveMode, SolveRequest, Solver};
use crate::error::{MdpError, Result};

const EXIT_INTERRUPTED: i32 = 1;
const EXIT_MEMORY: i32 = 33;

/// Configuration for the clingo subprocess.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Path or name of the clingo executable.
    pub executable: PathBuf,

    /// Wall-clock budget per query (`--time-limit`, whole seconds, rounded up).
    /// `None` = unbounded.
    pub time_limit: Option<Duration>,

    /// Solver threads (`--parallel-mode`). 1 = sequential.
    pub threads: u32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            executable: PathBuf::from("clingo"),
            time_limit: None,
            threads: 1,
        }
    }
}

impl SolverConfig {
    /// Use a specific clingo binary.
    pub fn with_executable(mut self, executable: impl Into<PathBuf>) -> Self {
        self.executable = executable.into();
        self
    }

    /// Bound every query by a time limit.
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    /// Set the time limit from fractional seconds.
    ///
    /// Negative, NaN, infinite or overflowing values are rejected.
    pub fn with_time_limit_secs(self, secs: f64) -> Result<Self> {
        let limit = Duration::try_from_secs_f64(secs).map_err(|_| MdpError::InvalidTimeLimit(secs))?;
        Ok(self.with_time_limit(limit))
    }

    pub fn with_threads(mut self, threads: u32) -> Self {
        self.threads = threads.max(1);
        self
    }

    /// Command-line arguments for one request, excluding program files.
    fn arguments(&self, request: &SolveRequest<'_>) -> Vec<String> {
        let mut args = vec![
            "-".to_string(),
            "--outf=2".to_string(),
            "-c".to_string(),
            format!("t={}", request.horizon),
        ];

        match request.mode {
            SolveMode::Enumerate { limit } => {
                args.push(format!("--models={limit}"));
                args.push("--opt-mode=ignore".to_string());
            }
            SolveMode::Optimize => {
                args.push("--models=0".to_string());
                args.push("--opt-mode=opt".to_string());
            }
        }

        if let Some(limit) = self.time_limit {
            let secs = limit.as_secs() + u64::from(limit.subsec_nanos() > 0);
            args.push(format!("--time-limit={}", secs.max(1)));
        }

        if self.threads > 1 {
            args.push(format!("--parallel-mode={}", self.threads));
        }

        args
    }
}

/// Stateless clingo subprocess solver.
#[derive(Clone, Debug, Default)]
pub struct ClingoSolver {
    config: SolverConfig,
}

impl ClingoSolver {
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }
}

impl Solver for ClingoSolver {
    fn solve(&mut self, request: &SolveRequest<'_>) -> Result<Vec<Model>> {
        let args = self.config.arguments(request);
        debug!(
            executable = %self.config.executable.display(),
            horizon = request.horizon,
            mode = ?request.mode,
            "spawning clingo"
        );

        let mut child = Command::new(&self.config.executable)
            .args(request.programs.paths())
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                MdpError::Solver(format!(
                    "failed to spawn {}: {e}",
                    self.config.executable.display()
                ))
            })?;

        // clingo may exit before reading all input; still reap it and keep stderr.
        let written = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(request.input_program().as_bytes()),
            None => Ok(()),
        };

        let output = child.wait_with_output()?;
        if let Err(e) = written {
            return Err(MdpError::Solver(format!(
                "clingo stopped reading its input ({e}): {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        let code = output.status.code().ok_or_else(|| {
            MdpError::Solver("clingo terminated by a signal".to_string())
        })?;

        if code >= EXIT_MEMORY {
            return Err(MdpError::Solver(format!(
                "clingo exited with code {code}: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        parse_report(&output.stdout, code, self.config.time_limit)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Report {
    result: String,
    #[serde(default)]
    call: Vec<Call>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Call {
    #[serde(default)]
    witnesses: Vec<Witness>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Witness {
    #[serde(default)]
    value: Vec<String>,
    #[serde(default)]
    costs: Vec<i64>,
}

/// Turn a `--outf=2` report into models.
fn parse_report(stdout: &[u8], exit_code: i32, time_limit: Option<Duration>) -> Result<Vec<Model>> {
    let report: Report = serde_json::from_slice(stdout)?;

    let interrupted = exit_code & EXIT_INTERRUPTED != 0 || report.result == "UNKNOWN";
    if interrupted {
        warn!(result = %report.result, exit_code, "clingo search interrupted");
        return Err(match time_limit {
            Some(budget) => MdpError::SolverTimeout { budget },
            None => MdpError::Solver(format!("clingo search interrupted ({})", report.result)),
        });
    }

    let mut models = Vec::new();
    for witness in report.call.into_iter().flat_map(|c| c.witnesses) {
        let mut model = Model::parse(&witness.value)?;
        model.costs = witness.costs;
        models.push(model);
    }

    debug!(result = %report.result, models = models.len(), "clingo finished");
    Ok(models)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Action, State};
    use crate::solver::{ProgramSet, Signature, Term};

    const SAT_REPORT: &str = r#"{
        "Solver": "clingo version 5.6.2",
        "Input": ["-"],
        "Call": [{"Witnesses": [
            {"Value": ["state(clear(a))", "state(ontable(a))", "nextReward(-1)", "executable(move(b,a))"]}
        ]}],
        "Result": "SATISFIABLE",
        "Models": {"Number": 1, "More": "no"},
        "Calls": 1,
        "Time": {"Total": 0.001, "Solve": 0.0, "Model": 0.0, "Unsat": 0.0, "CPU": 0.001}
    }"#;

    const OPT_REPORT: &str = r#"{
        "Call": [{"Witnesses": [
            {"Value": ["maxReturn(-3)"], "Costs": [3]},
            {"Value": ["maxReturn(99)"], "Costs": [-99]}
        ]}],
        "Result": "OPTIMUM FOUND"
    }"#;

    #[test]
    fn test_parse_satisfiable_report() {
        let models = parse_report(SAT_REPORT.as_bytes(), 30, None).unwrap();
        assert_eq!(models.len(), 1);

        let reward = Signature::new("nextReward", 1);
        assert_eq!(models[0].arguments_of(&reward).next(), Some(&Term::Number(-1)));
        assert_eq!(models[0].atoms.len(), 4);
    }

    #[test]
    fn test_parse_unsatisfiable_report() {
        let report = r#"{"Call": [{}], "Result": "UNSATISFIABLE"}"#;
        let models = parse_report(report.as_bytes(), 20, None).unwrap();
        assert!(models.is_empty());
    }

    #[test]
    fn test_parse_optimization_keeps_order_and_costs() {
        let models = parse_report(OPT_REPORT.as_bytes(), 30, None).unwrap();
        assert_eq!(models.len(), 2);
        assert_eq!(models[1].atoms[0].to_string(), "maxReturn(99)");
        assert_eq!(models[1].costs, vec![-99]);
    }

    #[test]
    fn test_interrupted_search_is_timeout() {
        let report = r#"{"Call": [{"Witnesses": [{"Value": ["maxReturn(1)"]}]}], "Result": "SATISFIABLE"}"#;
        let budget = Duration::from_secs(2);

        let err = parse_report(report.as_bytes(), 11, Some(budget)).unwrap_err();
        assert!(matches!(err, MdpError::SolverTimeout { budget: b } if b == budget));

        let err = parse_report(r#"{"Result": "UNKNOWN"}"#.as_bytes(), 1, None).unwrap_err();
        assert!(matches!(err, MdpError::Solver(_)));
    }

    #[test]
    fn test_malformed_atom_in_report() {
        let report = r#"{"Call": [{"Witnesses": [{"Value": ["state(X)"]}]}], "Result": "SATISFIABLE"}"#;
        let err = parse_report(report.as_bytes(), 10, None).unwrap_err();
        assert!(matches!(err, MdpError::MalformedAtom { .. }));
    }

    #[test]
    fn test_garbage_output() {
        let err = parse_report(b"*** ERROR: (clingo): parsing failed", 65, None).unwrap_err();
        assert!(matches!(err, MdpError::Json(_)));
    }

    #[test]
    fn test_arguments() {
        let programs = ProgramSet::bundled("blocksworld.lp").unwrap();
        let state = State::new();
        let action = Action::new("move(a,table)");
        let config = SolverConfig::default()
            .with_time_limit(Duration::from_millis(1500))
            .with_threads(4);

        let request = SolveRequest::new(&programs, &state, &state, 1)
            .with_action(&action)
            .with_mode(SolveMode::Enumerate { limit: 2 });
        assert_eq!(
            config.arguments(&request),
            vec![
                "-",
                "--outf=2",
                "-c",
                "t=1",
                "--models=2",
                "--opt-mode=ignore",
                "--time-limit=2",
                "--parallel-mode=4",
            ]
        );

        let request = SolveRequest::new(&programs, &state, &state, 6).with_mode(SolveMode::Optimize);
        let args = SolverConfig::default().arguments(&request);
        assert!(args.contains(&"--opt-mode=opt".to_string()));
        assert!(args.contains(&"t=6".to_string()));
    }

    #[test]
    fn test_time_limit_secs() {
        let config = SolverConfig::default().with_time_limit_secs(2.5).unwrap();
        assert_eq!(config.time_limit, Some(Duration::from_millis(2500)));

        for bad in [f64::INFINITY, f64::NAN, -1.0, 1e30] {
            assert!(matches!(
                SolverConfig::default().with_time_limit_secs(bad),
                Err(MdpError::InvalidTimeLimit(_))
            ));
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_solver_exits_without_reading_input() {
        let programs = ProgramSet::bundled("blocksworld.lp").unwrap();
        // Far more than a pipe buffer, so the write cannot complete.
        let state: State = (0..50_000).map(|i| format!("fluent({i})")).collect();
        let mut solver = ClingoSolver::new(SolverConfig::default().with_executable("true"));
        let request = SolveRequest::new(&programs, &state, &state, 0);

        match solver.solve(&request) {
            Err(MdpError::Solver(message)) => assert!(message.contains("stopped reading")),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_missing_executable() {
        let programs = ProgramSet::bundled("blocksworld.lp").unwrap();
        let state = State::new();
        let mut solver = ClingoSolver::new(
            SolverConfig::default().with_executable("/nonexistent/clingo-binary"),
        );
        let request = SolveRequest::new(&programs, &state, &state, 0);
        assert!(matches!(solver.solve(&request), Err(MdpError::Solver(_))));
    }
}
