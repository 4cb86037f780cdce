//! C interface of the portfolio.
//!
//! ## Safety
//!
//! Every entry point accepts a null session and malformed arguments and answers with the
//! neutral value of its return type. Non-null pointers must be valid for the given sizes.
//! A session may be interrupted from another thread while it is solving; any other
//! concurrent use of the same session is undefined behaviour.

use std::ffi::CStr;
use std::os::raw::{c_char, c_int};
use std::panic::{self, AssertUnwindSafe};
use std::ptr;
use std::slice;
use std::time::Duration;

use log::{debug, error};

use sat_portfolio::{ControlHandle, Session, SolverConfig};
use sat_portfolio_core::solver::{Statistics, Verdict};

/// Result codes of the solve functions.
#[repr(C)]
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PortfolioResult {
    Unknown = 0,
    Sat = 10,
    Unsat = 20,
}

impl From<Verdict> for PortfolioResult {
    fn from(verdict: Verdict) -> Self {
        match verdict {
            Verdict::Satisfiable => PortfolioResult::Sat,
            Verdict::Unsatisfiable => PortfolioResult::Unsat,
            Verdict::Unknown => PortfolioResult::Unknown,
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct PortfolioStatistics {
    pub propagations: u64,
    pub decisions: u64,
    pub conflicts: u64,
    pub restarts: u64,
    pub mem_peak: f64,
}

impl From<Statistics> for PortfolioStatistics {
    fn from(stats: Statistics) -> Self {
        Self {
            propagations: stats.propagations,
            decisions: stats.decisions,
            conflicts: stats.conflicts,
            restarts: stats.restarts,
            mem_peak: stats.memory_peak_kb,
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct PortfolioConfig {
    pub num_threads: c_int,
    pub timeout_seconds: c_int,
    pub random_seed: c_int,
    pub enable_preprocessing: bool,
    pub verbosity: c_int,
}

impl From<&PortfolioConfig> for SolverConfig {
    fn from(config: &PortfolioConfig) -> Self {
        SolverConfig {
            num_threads: config.num_threads as isize,
            timeout: Duration::from_secs(config.timeout_seconds.max(0) as u64),
            // Negative seeds wrap, keeping `index + seed` distinct per member.
            random_seed: config.random_seed as u32,
            enable_preprocessing: config.enable_preprocessing,
            verbosity: config.verbosity.max(0) as u32,
        }
    }
}

/// Opaque session handle.
pub struct PortfolioSolver {
    session: Session,
    // Kept apart from `session` so that interrupts never alias a running solve.
    control: ControlHandle,
}

fn guard<T, F>(neutral: T, f: F) -> T
where
    F: FnOnce() -> T,
{
    panic::catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|_| {
        error!("Panic caught at the C boundary");
        neutral
    })
}

unsafe fn session_mut<'a>(solver: *mut PortfolioSolver) -> Option<&'a mut Session> {
    if solver.is_null() {
        None
    } else {
        Some(&mut (*solver).session)
    }
}

unsafe fn session_ref<'a>(solver: *const PortfolioSolver) -> Option<&'a Session> {
    if solver.is_null() {
        None
    } else {
        Some(&(*solver).session)
    }
}

unsafe fn control_ref<'a>(solver: *const PortfolioSolver) -> Option<&'a ControlHandle> {
    if solver.is_null() {
        None
    } else {
        Some(&(*solver).control)
    }
}

unsafe fn ints<'a>(data: *const c_int, size: c_int) -> Option<&'a [c_int]> {
    if data.is_null() || size <= 0 {
        None
    } else {
        Some(slice::from_raw_parts(data, size as usize))
    }
}

/// Create a session with no members. Returns null on failure.
#[no_mangle]
pub extern "C" fn portfolio_new() -> *mut PortfolioSolver {
    guard(ptr::null_mut(), || {
        let session = Session::new();
        let control = session.control();
        Box::into_raw(Box::new(PortfolioSolver { session, control }))
    })
}

/// # Safety
/// `solver` must be null or come from [portfolio_new], and must not be used afterwards.
#[no_mangle]
pub unsafe extern "C" fn portfolio_delete(solver: *mut PortfolioSolver) {
    if !solver.is_null() {
        guard((), || drop(Box::from_raw(solver)));
    }
}

/// # Safety
/// `solver` and `config` must be null or valid.
#[no_mangle]
pub unsafe extern "C" fn portfolio_configure(solver: *mut PortfolioSolver, config: *const PortfolioConfig) {
    let (Some(session), Some(config)) = (session_mut(solver), config.as_ref()) else {
        return;
    };
    guard((), || {
        if let Err(e) = session.configure(&SolverConfig::from(config)) {
            error!("{}", e);
        }
    })
}

/// # Safety
/// `filename` must be null or a NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn portfolio_load_dimacs(solver: *mut PortfolioSolver, filename: *const c_char) -> bool {
    let Some(session) = session_mut(solver) else {
        return false;
    };
    if filename.is_null() {
        return false;
    }
    let Ok(path) = CStr::from_ptr(filename).to_str() else {
        return false;
    };
    guard(false, || match session.load_dimacs(path) {
        Ok(()) => true,
        Err(e) => {
            error!("{}", e);
            false
        }
    })
}

/// Invalid clauses are ignored.
///
/// # Safety
/// `literals` must be null or point to `size` ints.
#[no_mangle]
pub unsafe extern "C" fn portfolio_add_clause(solver: *mut PortfolioSolver, literals: *const c_int, size: c_int) {
    let (Some(session), Some(lits)) = (session_mut(solver), ints(literals, size)) else {
        return;
    };
    guard((), || {
        if let Err(e) = session.add_clause(lits) {
            debug!("Ignoring clause: {}", e);
        }
    })
}

/// # Safety
/// `solver` must be null or valid.
#[no_mangle]
pub unsafe extern "C" fn portfolio_set_variable_count(solver: *mut PortfolioSolver, num_vars: c_int) {
    let Some(session) = session_mut(solver) else {
        return;
    };
    guard((), || {
        if let Err(e) = session.reserve_variables(num_vars) {
            debug!("Ignoring variable count: {}", e);
        }
    })
}

/// # Safety
/// `solver` must be null or valid.
#[no_mangle]
pub unsafe extern "C" fn portfolio_solve(solver: *mut PortfolioSolver) -> PortfolioResult {
    let Some(session) = session_mut(solver) else {
        return PortfolioResult::Unknown;
    };
    guard(PortfolioResult::Unknown, || session.solve().into())
}

/// # Safety
/// `assumptions` must be null or point to `num_assumptions` ints.
#[no_mangle]
pub unsafe extern "C" fn portfolio_solve_with_assumptions(
    solver: *mut PortfolioSolver,
    assumptions: *const c_int,
    num_assumptions: c_int,
) -> PortfolioResult {
    let Some(session) = session_mut(solver) else {
        return PortfolioResult::Unknown;
    };
    let assumptions = ints(assumptions, num_assumptions).unwrap_or(&[]);
    guard(PortfolioResult::Unknown, || session.solve_with_assumptions(assumptions).into())
}

/// # Safety
/// `solver` must be null or valid.
#[no_mangle]
pub unsafe extern "C" fn portfolio_get_model_value(solver: *const PortfolioSolver, variable: c_int) -> bool {
    let Some(session) = session_ref(solver) else {
        return false;
    };
    guard(false, || session.model_value(variable))
}

/// # Safety
/// `solver` must be null or valid.
#[no_mangle]
pub unsafe extern "C" fn portfolio_get_model_size(solver: *const PortfolioSolver) -> c_int {
    let Some(session) = session_ref(solver) else {
        return 0;
    };
    guard(0, || c_int::try_from(session.model_size()).unwrap_or(c_int::MAX))
}

/// Copy up to `size` model entries into `model`.
///
/// # Safety
/// `model` must be null or point to `size` writable ints.
#[no_mangle]
pub unsafe extern "C" fn portfolio_get_model(solver: *const PortfolioSolver, model: *mut c_int, size: c_int) {
    let Some(session) = session_ref(solver) else {
        return;
    };
    if model.is_null() || size <= 0 {
        return;
    }
    let buffer = slice::from_raw_parts_mut(model, size as usize);
    guard(0, || session.copy_model(buffer));
}

/// # Safety
/// `solver` must be null or valid.
#[no_mangle]
pub unsafe extern "C" fn portfolio_get_statistics(solver: *const PortfolioSolver) -> PortfolioStatistics {
    let Some(session) = session_ref(solver) else {
        return PortfolioStatistics::default();
    };
    guard(PortfolioStatistics::default(), || session.statistics().into())
}

/// May be called from any thread, also while the session is solving.
///
/// # Safety
/// `solver` must be null or valid.
#[no_mangle]
pub unsafe extern "C" fn portfolio_interrupt(solver: *const PortfolioSolver) {
    if let Some(control) = control_ref(solver) {
        guard((), || control.interrupt());
    }
}

/// # Safety
/// `solver` must be null or valid.
#[no_mangle]
pub unsafe extern "C" fn portfolio_clear_interrupt(solver: *const PortfolioSolver) {
    if let Some(control) = control_ref(solver) {
        guard((), || control.clear_interrupt());
    }
}

#[cfg(test)]
mod tests {
    use std::ffi::CString;

    use test_log::test;

    use super::*;

    fn config(num_threads: c_int) -> PortfolioConfig {
        PortfolioConfig {
            num_threads,
            timeout_seconds: 0,
            random_seed: 0,
            enable_preprocessing: false,
            verbosity: 0,
        }
    }

    #[test]
    fn test_null_session_is_neutral() {
        unsafe {
            let null = ptr::null_mut();
            portfolio_configure(null, &config(2));
            portfolio_add_clause(null, [1, 2].as_ptr(), 2);
            portfolio_set_variable_count(null, 3);
            assert!(!portfolio_load_dimacs(null, ptr::null()));
            assert_eq!(portfolio_solve(null), PortfolioResult::Unknown);
            assert_eq!(portfolio_solve_with_assumptions(null, [1].as_ptr(), 1), PortfolioResult::Unknown);
            assert!(!portfolio_get_model_value(null, 1));
            assert_eq!(portfolio_get_model_size(null), 0);
            portfolio_get_model(null, ptr::null_mut(), 4);
            assert_eq!(portfolio_get_statistics(null), PortfolioStatistics::default());
            portfolio_interrupt(null);
            portfolio_clear_interrupt(null);
            portfolio_delete(null);
        }
    }

    #[test]
    fn test_solve_through_the_c_interface() {
        unsafe {
            let solver = portfolio_new();
            assert!(!solver.is_null());
            portfolio_configure(solver, &config(2));

            portfolio_add_clause(solver, [1, 2].as_ptr(), 2);
            portfolio_add_clause(solver, [-1, -2].as_ptr(), 2);
            // Malformed input is ignored:
            portfolio_add_clause(solver, [1, 0].as_ptr(), 2);
            portfolio_add_clause(solver, ptr::null(), 3);
            portfolio_add_clause(solver, [1].as_ptr(), 0);

            assert_eq!(portfolio_solve(solver), PortfolioResult::Sat);
            assert_eq!(portfolio_get_model_size(solver), 2);
            let mut model = [0; 2];
            portfolio_get_model(solver, model.as_mut_ptr(), 2);
            assert_eq!(model.iter().filter(|&&x| x > 0).count(), 1);
            assert_ne!(portfolio_get_model_value(solver, 1), portfolio_get_model_value(solver, 2));
            assert!(!portfolio_get_model_value(solver, 3));

            assert_eq!(
                portfolio_solve_with_assumptions(solver, [1, 2].as_ptr(), 2),
                PortfolioResult::Unsat
            );
            assert_eq!(portfolio_get_model_size(solver), 0);

            portfolio_interrupt(solver);
            assert_eq!(portfolio_solve(solver), PortfolioResult::Unknown);
            portfolio_clear_interrupt(solver);
            assert_eq!(portfolio_solve(solver), PortfolioResult::Sat);

            let stats = portfolio_get_statistics(solver);
            assert!(stats.propagations > 0);

            portfolio_delete(solver);
        }
    }

    #[test]
    fn test_load_dimacs_failures() {
        unsafe {
            let solver = portfolio_new();
            let missing = CString::new("/definitely/not/here.cnf").unwrap();
            // No members yet:
            assert!(!portfolio_load_dimacs(solver, missing.as_ptr()));
            portfolio_configure(solver, &config(1));
            assert!(!portfolio_load_dimacs(solver, missing.as_ptr()));
            portfolio_delete(solver);
        }
    }

    #[test]
    fn test_negative_seed_is_forwarded() {
        let config = PortfolioConfig {
            random_seed: -1,
            timeout_seconds: -3,
            ..config(2)
        };
        let config = SolverConfig::from(&config);
        assert_eq!(config.random_seed, u32::MAX);
        assert_eq!(config.member_seed(1), u32::MAX as u64 + 1);
        assert_eq!(config.timeout(), None);
    }

    #[test]
    fn test_result_codes() {
        assert_eq!(PortfolioResult::Sat as i32, 10);
        assert_eq!(PortfolioResult::Unsat as i32, 20);
        assert_eq!(PortfolioResult::Unknown as i32, 0);
    }
}
