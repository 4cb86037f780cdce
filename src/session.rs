use std::fmt::{Display, Formatter};
use std::path::Path;

use log::{debug, info, warn};

use sat_portfolio_core::cnf::{ClauseRef, Cnf};
use sat_portfolio_core::lit::Lit;
use sat_portfolio_core::model::Model;
use sat_portfolio_core::solver::{MemberFactory, Statistics, Verdict};

use crate::config::SolverConfig;
use crate::control::ControlHandle;
use crate::error::{PortfolioError, Result};
use crate::member::SimpleSatFactory;
use crate::pool::MemberPool;
use crate::race::{race_with, RaceOutcome};
use crate::registry::ClauseRegistry;
use crate::stats::StatisticsReport;

/// A portfolio solving session.
///
/// Owns the members, the clauses and the result of the last race.
/// Dropping the session releases all of them.
pub struct Session {
    factory: Box<dyn MemberFactory>,
    config: SolverConfig,
    pool: MemberPool,
    registry: ClauseRegistry,
    control: ControlHandle,
    verdict: Option<Verdict>,
    model: Model,
    winner: Option<usize>,
    faults: usize,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Session backed by `simple-sat` members. The pool stays empty until [Session::configure].
    pub fn new() -> Self {
        Self::with_factory(SimpleSatFactory)
    }

    pub fn with_factory<F>(factory: F) -> Self
    where
        F: MemberFactory + 'static,
    {
        Self {
            factory: Box::new(factory),
            config: SolverConfig::default(),
            pool: MemberPool::new(),
            registry: ClauseRegistry::new(),
            control: ControlHandle::new(),
            verdict: None,
            model: Model::default(),
            winner: None,
            faults: 0,
        }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Rebuild the pool from the configuration. Every clause added so far is loaded into
    /// the fresh members.
    pub fn configure(&mut self, config: &SolverConfig) -> Result<()> {
        info!("Configuring portfolio: {:?}", config);
        self.config = config.clone();
        let built = self.pool.configure(self.factory.as_ref(), config);
        self.pool.replay(self.registry.clauses());
        self.control.register(self.pool.signals());
        built
    }

    /// Whether [Session::configure] has built at least one member.
    pub fn is_configured(&self) -> bool {
        !self.pool.is_empty()
    }

    pub fn num_members(&self) -> usize {
        self.pool.len()
    }

    pub fn member_signatures(&self) -> Vec<String> {
        self.pool.signatures()
    }

    /// Read a DIMACS file (optionally gzipped) and add all its clauses.
    ///
    /// The whole file is validated first: on error nothing is registered. An empty clause
    /// makes the formula unsatisfiable.
    pub fn load_dimacs<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        if self.pool.is_empty() {
            return Err(PortfolioError::NoInstances);
        }
        let path = path.as_ref();
        let cnf = Cnf::from_file(path)?;
        info!(
            "Loaded {} clauses over {} variables from '{}'",
            cnf.clauses.len(),
            cnf.max_var,
            path.display()
        );

        let max_var = i32::try_from(cnf.max_var).map_err(|_| PortfolioError::Parse {
            message: format!("variable count {} is out of range", cnf.max_var),
        })?;
        let mut inconsistent = false;
        let mut prepared = Vec::with_capacity(cnf.clauses.len());
        for clause in cnf.iter() {
            if clause.is_empty() {
                inconsistent = true;
                continue;
            }
            let lits: Vec<i32> = clause.iter().map(|&lit| lit.get()).collect();
            prepared.push(ClauseRegistry::prepare(&lits)?);
        }

        let start = self.registry.len();
        self.registry.extend(prepared)?;
        if max_var > 0 {
            self.registry.reserve_variables(max_var)?;
        }
        if inconsistent {
            warn!("'{}' contains the empty clause", path.display());
            self.registry.mark_inconsistent();
        }
        for clause in &self.registry.clauses()[start..] {
            self.pool.broadcast(clause);
        }
        Ok(())
    }

    /// Register a clause and hand it to every member.
    pub fn add_clause(&mut self, lits: &[i32]) -> Result<ClauseRef> {
        let clause = self.registry.add(lits)?;
        self.pool.broadcast(&clause);
        Ok(clause)
    }

    pub fn reserve_variables(&mut self, n: i32) -> Result<()> {
        self.registry.reserve_variables(n)
    }

    pub fn variable_count(&self) -> u32 {
        self.registry.variable_count()
    }

    pub fn num_clauses(&self) -> usize {
        self.registry.len()
    }

    pub fn solve(&mut self) -> Verdict {
        self.solve_with_assumptions(&[])
    }

    /// Race all members under the given assumptions.
    ///
    /// Returns [Verdict::Unknown] without running anything when the pool is empty,
    /// when the session is interrupted, or when an assumption is not a valid literal.
    /// A formula holding the empty clause is [Verdict::Unsatisfiable] without a race.
    pub fn solve_with_assumptions(&mut self, assumptions: &[i32]) -> Verdict {
        self.model.clear();
        self.winner = None;
        self.faults = 0;

        let assumptions: Option<Vec<Lit>> = assumptions.iter().map(|&x| Lit::try_new(x)).collect();
        let outcome = match assumptions {
            None => {
                warn!("Invalid assumption literal, not solving");
                RaceOutcome::default()
            }
            Some(_) if self.pool.is_empty() => {
                debug!("No portfolio members, not solving");
                RaceOutcome::default()
            }
            Some(_) if self.control.is_interrupted() => {
                debug!("Session is interrupted, not solving");
                RaceOutcome::default()
            }
            Some(_) if self.registry.is_inconsistent() => {
                debug!("Formula contains the empty clause");
                RaceOutcome {
                    verdict: Verdict::Unsatisfiable,
                    ..RaceOutcome::default()
                }
            }
            Some(assumptions) => {
                self.control.sync();
                race_with(self.pool.members_mut(), &assumptions, &self.control)
            }
        };

        match outcome.winner {
            Some(winner) => info!("{} by member #{}", outcome.verdict, winner),
            None => info!("{}", outcome.verdict),
        }
        if outcome.faults > 0 {
            warn!("{} member(s) faulted during the race", outcome.faults);
        }

        self.verdict = Some(outcome.verdict);
        self.winner = outcome.winner;
        self.faults = outcome.faults;
        if outcome.verdict == Verdict::Satisfiable {
            self.model = Model::new(outcome.model);
        }
        outcome.verdict
    }

    /// Verdict of the last solve, `None` before the first one.
    pub fn last_verdict(&self) -> Option<Verdict> {
        self.verdict
    }

    /// Index of the member whose verdict the last solve accepted.
    pub fn last_winner(&self) -> Option<usize> {
        self.winner
    }

    /// Number of members that faulted during the last solve.
    pub fn last_faults(&self) -> usize {
        self.faults
    }

    fn is_satisfied(&self) -> bool {
        self.verdict == Some(Verdict::Satisfiable)
    }

    /// Truth value of `var` in the model. False whenever there is no such value.
    pub fn model_value(&self, var: i32) -> bool {
        self.try_model_value(var).unwrap_or(false)
    }

    pub fn try_model_value(&self, var: i32) -> Result<bool> {
        if var <= 0 || var as u32 > self.variable_count() {
            return Err(PortfolioError::InvalidVariable { var });
        }
        if !self.is_satisfied() {
            return Err(self.no_solution());
        }
        Ok(self.model.value(var as u32).unwrap_or(false))
    }

    pub fn model_size(&self) -> usize {
        self.model.len()
    }

    /// Copy as much of the model as fits. Returns the number of copied entries.
    pub fn copy_model(&self, buffer: &mut [i32]) -> usize {
        let n = buffer.len().min(self.model.len());
        for (dst, lit) in buffer.iter_mut().zip(self.model.iter()) {
            *dst = lit.get();
        }
        n
    }

    pub fn model(&self) -> Result<Vec<i32>> {
        if !self.is_satisfied() {
            return Err(self.no_solution());
        }
        Ok(self.model.iter().map(Lit::get).collect())
    }

    fn no_solution(&self) -> PortfolioError {
        PortfolioError::NoSolution {
            verdict: match self.verdict {
                Some(verdict) => verdict.to_string(),
                None => "none".to_string(),
            },
        }
    }

    /// Counters summed over all members, memory peak maximised. All zero for an empty pool.
    pub fn statistics(&self) -> Statistics {
        self.pool.statistics()
    }

    pub fn statistics_report(&self) -> StatisticsReport {
        StatisticsReport::collect(&self.pool)
    }

    pub fn interrupt(&self) {
        self.control.interrupt();
    }

    pub fn clear_interrupt(&self) {
        self.control.clear_interrupt();
    }

    pub fn is_interrupted(&self) -> bool {
        self.control.is_interrupted()
    }

    /// Handle for interrupting the session from another thread.
    pub fn control(&self) -> ControlHandle {
        self.control.clone()
    }
}

impl Display for Session {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}(members = {}, clauses = {}, vars = {})",
            tynm::type_name::<Self>(),
            self.pool.len(),
            self.registry.len(),
            self.variable_count()
        )
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use sat_portfolio_core::solver::mock::{Event, Journal, ScriptedSolver};
    use sat_portfolio_core::solver::{BuildError, PortfolioMember};

    use super::*;

    #[test]
    fn test_clauses_added_before_configure_are_replayed() -> color_eyre::Result<()> {
        let journal = Journal::default();
        let log = Arc::clone(&journal);
        let mut session = Session::with_factory(move |index: usize| -> Result<Box<dyn PortfolioMember>, BuildError> {
            Ok(Box::new(
                ScriptedSolver::answering(Verdict::Unknown).with_journal(index, Arc::clone(&log)),
            ))
        });
        session.add_clause(&[1, 2])?;
        session.configure(&SolverConfig::default().with_threads(2))?;
        session.add_clause(&[-1])?;

        let loaded = journal
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, e)| matches!(e, Event::Loaded(_)))
            .count();
        assert_eq!(loaded, 4);
        Ok(())
    }

    #[test]
    fn test_scripted_sat_model_is_exposed() -> color_eyre::Result<()> {
        let mut session = Session::with_factory(|_index: usize| -> Result<Box<dyn PortfolioMember>, BuildError> {
            Ok(Box::new(ScriptedSolver::answering(Verdict::Satisfiable).with_model([1, -2, 3])))
        });
        session.configure(&SolverConfig::default())?;
        session.add_clause(&[1, 2, 3])?;
        assert_eq!(session.solve(), Verdict::Satisfiable);
        assert_eq!(session.model()?, vec![1, -2, 3]);
        assert!(session.model_value(1));
        assert!(!session.model_value(2));
        assert!(!session.model_value(4));
        assert!(matches!(session.try_model_value(0), Err(PortfolioError::InvalidVariable { var: 0 })));

        let mut buffer = [0; 2];
        assert_eq!(session.copy_model(&mut buffer), 2);
        assert_eq!(buffer, [1, -2]);
        let mut buffer = [0; 5];
        assert_eq!(session.copy_model(&mut buffer), 3);
        assert_eq!(buffer, [1, -2, 3, 0, 0]);
        Ok(())
    }

    #[test]
    fn test_invalid_assumption_is_unknown() -> color_eyre::Result<()> {
        let mut session = Session::new();
        session.configure(&SolverConfig::default())?;
        session.add_clause(&[1])?;
        assert_eq!(session.solve_with_assumptions(&[1, 0]), Verdict::Unknown);
        assert_eq!(session.last_verdict(), Some(Verdict::Unknown));
        assert!(matches!(session.model(), Err(PortfolioError::NoSolution { .. })));
        Ok(())
    }

    #[test]
    fn test_load_dimacs_needs_members() {
        let mut session = Session::new();
        let err = session.load_dimacs("whatever.cnf").unwrap_err();
        assert!(matches!(err, PortfolioError::NoInstances));
    }

    #[test]
    fn test_is_configured() -> color_eyre::Result<()> {
        let mut session = Session::new();
        assert!(!session.is_configured());
        session.configure(&SolverConfig::default().with_threads(2))?;
        assert!(session.is_configured());
        assert_eq!(session.num_members(), 2);
        Ok(())
    }

    #[test]
    fn test_display() {
        let session = Session::new();
        assert_eq!(session.to_string(), "Session(members = 0, clauses = 0, vars = 0)");
    }
}
