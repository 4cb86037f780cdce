use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use test_log::test;

use sat_portfolio::{PortfolioError, Session, SolverConfig};
use sat_portfolio_core::solver::mock::ScriptedSolver;
use sat_portfolio_core::solver::{BuildError, PortfolioMember, Verdict};
use sat_portfolio_test_utils::{check_model, load, pigeonhole, random_3sat, solve_with_threads};

fn session(threads: isize) -> color_eyre::Result<Session> {
    let mut session = Session::new();
    session.configure(&SolverConfig::default().with_threads(threads))?;
    Ok(session)
}

#[test]
fn satisfiable_for_every_pool_size() -> color_eyre::Result<()> {
    // Under-constrained: far below the 3-SAT threshold.
    let clauses = random_3sat(40, 80, 7);
    for threads in [1, 2, 4] {
        assert_eq!(solve_with_threads(&clauses, threads)?, Verdict::Satisfiable, "threads = {}", threads);
    }
    Ok(())
}

#[test]
fn unsatisfiable_for_every_pool_size() -> color_eyre::Result<()> {
    let clauses = pigeonhole(5);
    for threads in [1, 2, 4] {
        assert_eq!(solve_with_threads(&clauses, threads)?, Verdict::Unsatisfiable, "threads = {}", threads);
    }
    Ok(())
}

#[test]
fn exactly_one_of_two() -> color_eyre::Result<()> {
    let mut session = session(1)?;
    session.add_clause(&[1, 2])?;
    session.add_clause(&[-1, -2])?;
    assert_eq!(session.solve(), Verdict::Satisfiable);
    assert_eq!(session.model_size(), 2);
    assert_ne!(session.model_value(1), session.model_value(2));
    Ok(())
}

#[test]
fn contradicting_units_with_four_members() -> color_eyre::Result<()> {
    let mut session = session(4)?;
    session.add_clause(&[1])?;
    session.add_clause(&[-1])?;
    assert_eq!(session.solve(), Verdict::Unsatisfiable);
    assert_eq!(session.model_size(), 0);
    assert!(matches!(session.model(), Err(PortfolioError::NoSolution { .. })));
    Ok(())
}

#[test]
fn out_of_range_variable_is_false() -> color_eyre::Result<()> {
    let mut session = session(2)?;
    session.add_clause(&[1, 2, 3])?;
    session.add_clause(&[1, -2])?;
    assert_eq!(session.variable_count(), 3);
    assert_eq!(session.solve(), Verdict::Satisfiable);
    assert!(!session.model_value(5));
    assert!(matches!(session.try_model_value(5), Err(PortfolioError::InvalidVariable { var: 5 })));
    assert!(!session.model_value(-1));
    Ok(())
}

#[test]
fn empty_session_is_neutral() {
    let mut session = Session::new();
    assert_eq!(session.solve(), Verdict::Unknown);
    assert_eq!(session.solve_with_assumptions(&[1, -2]), Verdict::Unknown);
    assert_eq!(session.model_size(), 0);
    assert_eq!(session.statistics(), Default::default());
    assert!(!session.model_value(1));
    let mut buffer = [0; 4];
    assert_eq!(session.copy_model(&mut buffer), 0);
    session.interrupt();
    session.clear_interrupt();
}

#[test]
fn statistics_are_idempotent() -> color_eyre::Result<()> {
    let mut session = session(2)?;
    load(&mut session, &pigeonhole(4))?;
    session.solve();
    let first = session.statistics();
    let second = session.statistics();
    assert_eq!(first, second);
    assert!(first.conflicts > 0);
    assert!(first.memory_peak_kb > 0.0);
    Ok(())
}

#[test]
fn assumptions_hold_for_one_solve_only() -> color_eyre::Result<()> {
    let mut session = session(2)?;
    session.add_clause(&[1, 2])?;
    session.add_clause(&[-1, -2])?;

    assert_eq!(session.solve_with_assumptions(&[1, 2]), Verdict::Unsatisfiable);
    assert_eq!(session.solve_with_assumptions(&[-1]), Verdict::Satisfiable);
    assert!(session.model_value(2));
    assert_eq!(session.solve_with_assumptions(&[]), Verdict::Satisfiable);
    assert_eq!(session.solve(), Verdict::Satisfiable);
    Ok(())
}

#[test]
fn reconfiguring_keeps_the_formula() -> color_eyre::Result<()> {
    let mut session = session(1)?;
    load(&mut session, &pigeonhole(3))?;
    assert_eq!(session.solve(), Verdict::Unsatisfiable);

    session.configure(&SolverConfig::default().with_threads(3).with_seed(42))?;
    assert_eq!(session.num_members(), 3);
    assert_eq!(session.solve(), Verdict::Unsatisfiable);
    Ok(())
}

#[test]
fn interrupt_stops_a_hard_race() -> color_eyre::Result<()> {
    let mut session = session(2)?;
    load(&mut session, &pigeonhole(11))?;

    let control = session.control();
    let watchdog = thread::spawn(move || {
        thread::sleep(Duration::from_millis(200));
        control.interrupt();
    });
    let start = Instant::now();
    let verdict = session.solve();
    watchdog.join().unwrap();

    assert_eq!(verdict, Verdict::Unknown);
    assert!(start.elapsed() < Duration::from_secs(20));
    assert!(session.is_interrupted());

    // Sticky until cleared:
    assert_eq!(session.solve(), Verdict::Unknown);
    session.clear_interrupt();
    assert!(!session.is_interrupted());
    Ok(())
}

#[test]
fn load_dimacs_file() -> color_eyre::Result<()> {
    let path: PathBuf = [env!("CARGO_MANIFEST_DIR"), "data", "coloring.cnf"].iter().collect();
    let mut session = session(2)?;
    session.load_dimacs(&path)?;
    assert!(session.num_clauses() > 0);
    assert_eq!(session.solve(), Verdict::Satisfiable);

    let text = std::fs::read_to_string(&path)?;
    let cnf: sat_portfolio_core::cnf::Cnf = text.parse()?;
    let clauses: Vec<Vec<i32>> = cnf.iter().map(|c| c.iter().map(|l| l.get()).collect()).collect();
    assert!(check_model(&clauses, &session.model()?));
    Ok(())
}

#[test]
fn load_missing_dimacs_file() -> color_eyre::Result<()> {
    let mut session = session(1)?;
    let err = session.load_dimacs("/definitely/not/here.cnf").unwrap_err();
    assert!(matches!(err, PortfolioError::Io { .. }));
    Ok(())
}

fn data(name: &str) -> PathBuf {
    [env!("CARGO_MANIFEST_DIR"), "data", name].iter().collect()
}

#[test]
fn empty_clause_in_dimacs_is_unsat() -> color_eyre::Result<()> {
    let mut session = session(2)?;
    session.load_dimacs(data("empty-clause.cnf"))?;
    assert_eq!(session.num_clauses(), 2);
    assert_eq!(session.solve(), Verdict::Unsatisfiable);
    assert_eq!(session.model_size(), 0);

    session.configure(&SolverConfig::default().with_threads(3))?;
    assert_eq!(session.solve(), Verdict::Unsatisfiable);
    Ok(())
}

#[test]
fn rejected_dimacs_registers_nothing() -> color_eyre::Result<()> {
    let mut session = session(2)?;
    session.add_clause(&[2])?;
    let err = session.load_dimacs(data("huge-variable.cnf")).unwrap_err();
    assert!(matches!(err, PortfolioError::Parse { .. }));
    assert_eq!(session.num_clauses(), 1);
    assert_eq!(session.variable_count(), 2);
    assert_eq!(session.solve(), Verdict::Satisfiable);
    assert!(session.model_value(2));
    Ok(())
}

#[test]
fn clearing_interrupts_during_a_race() -> color_eyre::Result<()> {
    let mut session = Session::with_factory(|index: usize| -> Result<Box<dyn PortfolioMember>, BuildError> {
        Ok(Box::new(match index {
            0 => ScriptedSolver::answering(Verdict::Unsatisfiable).with_delay(Duration::from_millis(50)),
            _ => ScriptedSolver::stalling(),
        }))
    });
    session.configure(&SolverConfig::default().with_threads(2))?;
    session.add_clause(&[1])?;

    let control = session.control();
    let done = AtomicBool::new(false);
    let start = Instant::now();
    let verdict = thread::scope(|s| {
        s.spawn(|| {
            while !done.load(Ordering::SeqCst) {
                control.clear_interrupt();
                thread::yield_now();
            }
        });
        let verdict = session.solve();
        done.store(true, Ordering::SeqCst);
        verdict
    });

    assert_eq!(verdict, Verdict::Unsatisfiable);
    assert_eq!(session.last_winner(), Some(0));
    assert!(start.elapsed() < Duration::from_secs(10));
    Ok(())
}
