//! Engine integration tests against the native blocks-world solver.
//!
//! Covers the transition protocol, action discovery, planning and the
//! return history on the two-block scenario:
//! `{clear(a), on(a,b), ontable(b)}` with goal `{on(b,a)}`.

use asp_mdp::core::{Action, MdpConfig, State};
use asp_mdp::domains::BlocksWorld;
use asp_mdp::error::{MdpError, QueryKind};
use asp_mdp::mdp::MarkovDecisionProcess;
use asp_mdp::solver::ProgramSet;

fn state(facts: &[&str]) -> State {
    facts.iter().copied().collect()
}

fn initial() -> State {
    state(&["clear(a)", "on(a,b)", "ontable(b)"])
}

fn goal() -> State {
    state(&["on(b,a)"])
}

fn mdp_with(config: MdpConfig) -> MarkovDecisionProcess<BlocksWorld> {
    let programs = ProgramSet::bundled("blocksworld.lp").unwrap();
    MarkovDecisionProcess::new(initial(), goal(), programs, BlocksWorld::new(), config).unwrap()
}

fn mdp() -> MarkovDecisionProcess<BlocksWorld> {
    mdp_with(MdpConfig::new(0.9))
}

fn action_names(mdp: &MarkovDecisionProcess<BlocksWorld>) -> Vec<String> {
    mdp.available_actions().iter().map(ToString::to_string).collect()
}

// =============================================================================
// Construction
// =============================================================================

#[test]
fn test_new_resolves_available_actions() {
    let mdp = mdp();
    assert_eq!(action_names(&mdp), vec!["move(a,table)"]);
    assert_eq!(mdp.solver().queries(), 1);
    assert_eq!(mdp.trajectory().len(), 1);
    assert_eq!(mdp.trajectory().rewards(), &[None]);
    assert_eq!(mdp.state(), &initial());
}

#[test]
fn test_new_rejects_invalid_discount() {
    let programs = ProgramSet::bundled("blocksworld.lp").unwrap();
    let result =
        MarkovDecisionProcess::new(initial(), goal(), programs, BlocksWorld::new(), MdpConfig::new(1.5));
    assert!(matches!(result, Err(MdpError::InvalidDiscountRate(r)) if r == 1.5));
}

#[test]
fn test_missing_domain_program() {
    let result = ProgramSet::bundled("no_such_domain.lp");
    assert!(matches!(result, Err(MdpError::MissingProgramFile { .. })));
}

// =============================================================================
// Transitions
// =============================================================================

#[test]
fn test_two_step_scenario() {
    let mut mdp = mdp();

    let r1 = mdp.transition(&Action::new("move(a,table)")).unwrap();
    assert_eq!(r1, -1.0);
    assert_eq!(
        mdp.state(),
        &state(&["clear(a)", "clear(b)", "ontable(a)", "ontable(b)"])
    );
    assert_eq!(action_names(&mdp), vec!["move(a,b)", "move(b,a)"]);

    let r2 = mdp.transition(&Action::new("move(b,a)")).unwrap();
    assert_eq!(r2, 100.0);
    assert_eq!(mdp.state(), &state(&["clear(b)", "on(b,a)", "ontable(a)"]));
    assert!(mdp.is_goal_reached());
    assert!(mdp.is_terminal());

    let trajectory = mdp.trajectory();
    assert_eq!(trajectory.len(), 3);
    assert_eq!(trajectory.actions().len(), 2);
    assert_eq!(trajectory.rewards(), &[None, Some(-1.0), Some(100.0)]);
    assert_eq!(trajectory.states()[0], initial());
}

#[test]
fn test_one_query_per_operation() {
    let mut mdp = mdp();
    assert_eq!(mdp.solver().queries(), 1);

    mdp.transition(&Action::new("move(a,table)")).unwrap();
    assert_eq!(mdp.solver().queries(), 2);

    mdp.compute_optimal_return(None).unwrap();
    assert_eq!(mdp.solver().queries(), 3);

    mdp.resolve_available_actions().unwrap();
    assert_eq!(mdp.solver().queries(), 4);
}

#[test]
fn test_action_text_is_normalized() {
    let mut mdp = mdp();
    let reward = mdp.transition(&Action::new("move( a , table )")).unwrap();
    assert_eq!(reward, -1.0);
    assert_eq!(mdp.trajectory().actions()[0].as_str(), "move(a,table)");
}

#[test]
fn test_transitions_are_deterministic() {
    let run = || {
        let mut mdp = mdp();
        mdp.transition(&Action::new("move(a,table)")).unwrap();
        mdp.transition(&Action::new("move(b,a)")).unwrap();
        mdp.trajectory().clone()
    };
    assert_eq!(run(), run());
}

#[test]
fn test_illegal_action_rejected_locally() {
    let mut mdp = mdp();
    let err = mdp.transition(&Action::new("move(b,a)")).unwrap_err();
    assert!(matches!(err, MdpError::IllegalAction { ref action } if action == "move(b,a)"));

    // Nothing changed and the solver was not asked.
    assert_eq!(mdp.state(), &initial());
    assert_eq!(mdp.trajectory().len(), 1);
    assert_eq!(mdp.solver().queries(), 1);
}

#[test]
fn test_illegal_action_left_to_solver() {
    let mut mdp = mdp_with(MdpConfig::new(0.9).with_legality_check(false));
    let err = mdp.transition(&Action::new("move(b,a)")).unwrap_err();
    assert!(matches!(
        err,
        MdpError::ModelNotFound {
            query: QueryKind::Transition
        }
    ));
    assert_eq!(mdp.state(), &initial());
    assert_eq!(mdp.trajectory().len(), 1);
    assert_eq!(mdp.solver().queries(), 2);
}

#[test]
fn test_no_transition_after_goal() {
    let mut mdp = mdp();
    mdp.transition(&Action::new("move(a,table)")).unwrap();
    mdp.transition(&Action::new("move(b,a)")).unwrap();

    let err = mdp.transition(&Action::new("move(b,table)")).unwrap_err();
    assert!(matches!(err, MdpError::IllegalAction { .. }));
}

// =============================================================================
// Planning
// =============================================================================

#[test]
fn test_optimal_return_default_horizon() {
    let mut mdp = mdp();
    assert_eq!(mdp.compute_optimal_return(None).unwrap(), 99.0);
}

#[test]
fn test_optimal_return_does_not_mutate() {
    let mut mdp = mdp();
    let before = mdp.trajectory().clone();
    let actions = mdp.available_actions().clone();

    mdp.compute_optimal_return(Some(4)).unwrap();

    assert_eq!(mdp.trajectory(), &before);
    assert_eq!(mdp.available_actions(), &actions);
    assert_eq!(mdp.state(), &initial());
}

#[test]
fn test_optimal_return_horizon_too_small() {
    let mut mdp = mdp();
    let err = mdp.compute_optimal_return(Some(1)).unwrap_err();
    assert!(matches!(
        err,
        MdpError::ModelNotFound {
            query: QueryKind::OptimalReturn
        }
    ));
    assert_eq!(mdp.compute_optimal_return(Some(2)).unwrap(), 99.0);
}

#[test]
fn test_optimal_return_huge_horizon() {
    let mut mdp = mdp();
    assert_eq!(mdp.compute_optimal_return(Some(100_000)).unwrap(), 99.0);
    assert_eq!(mdp.compute_optimal_return(Some(u32::MAX)).unwrap(), 99.0);
}

#[test]
fn test_optimal_return_at_goal_is_zero() {
    let programs = ProgramSet::bundled("blocksworld.lp").unwrap();
    let at_goal = state(&["clear(b)", "on(b,a)", "ontable(a)"]);
    let mut mdp =
        MarkovDecisionProcess::new(at_goal.clone(), goal(), programs, BlocksWorld::new(), MdpConfig::default())
            .unwrap();

    assert!(mdp.is_terminal());
    assert_eq!(mdp.compute_optimal_return(Some(0)).unwrap(), 0.0);
    assert_eq!(mdp.compute_optimal_return(None).unwrap(), 0.0);
}

#[test]
fn test_configured_planning_horizon() {
    let mut mdp = mdp_with(MdpConfig::new(1.0).with_planning_horizon(1));
    assert!(mdp.compute_optimal_return(None).is_err());
    assert_eq!(mdp.compute_optimal_return(Some(3)).unwrap(), 99.0);
}

#[test]
fn test_optimal_bounds_realized_return() {
    let mut mdp = mdp_with(MdpConfig::new(1.0));
    let optimal = mdp.compute_optimal_return(None).unwrap();

    mdp.transition(&Action::new("move(a,table)")).unwrap();
    mdp.transition(&Action::new("move(a,b)")).unwrap();
    mdp.transition(&Action::new("move(a,table)")).unwrap();
    mdp.transition(&Action::new("move(b,a)")).unwrap();

    let realized = mdp.return_history()[0];
    assert_eq!(realized, 97.0);
    assert!(realized <= optimal);
}

// =============================================================================
// Return history
// =============================================================================

#[test]
fn test_return_history_discounted() {
    let mut mdp = mdp();
    mdp.transition(&Action::new("move(a,table)")).unwrap();
    mdp.transition(&Action::new("move(b,a)")).unwrap();

    let history = mdp.return_history();
    assert_eq!(history.len(), 3);
    assert_eq!(history[2], 0.0);
    assert!((history[1] - 100.0).abs() < 1e-9);
    assert!((history[0] - 89.0).abs() < 1e-9);
}

#[test]
fn test_return_history_before_any_step() {
    let mdp = mdp();
    assert_eq!(mdp.return_history(), vec![0.0]);
}

#[test]
fn test_return_history_zero_discount() {
    let mut mdp = mdp_with(MdpConfig::new(0.0));
    mdp.transition(&Action::new("move(a,table)")).unwrap();
    mdp.transition(&Action::new("move(b,a)")).unwrap();
    assert_eq!(mdp.return_history(), vec![-1.0, 100.0, 0.0]);
}
