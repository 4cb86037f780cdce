use std::borrow::Cow;
use std::fmt::{Display, Formatter};

use itertools::Itertools;

use sat_portfolio_core::cnf::ClauseRef;
use sat_portfolio_core::lit::Lit;
use sat_portfolio_core::solver::{InterruptSignal, MemberOptions, PortfolioMember, Statistics, Verdict};
use simple_sat::lit::Lit as EngineLit;
use simple_sat::solver::{SolveResult, Solver};

fn to_engine(lit: Lit) -> EngineLit {
    EngineLit::from_external(lit.get())
}

/// Portfolio member backed by the `simple-sat` CDCL engine.
#[derive(Debug)]
pub struct SimpleSatMember {
    solver: Solver,
    signal: InterruptSignal,
    // Keeps the shared buffers alive for as long as the member lives.
    clauses: Vec<ClauseRef>,
}

impl SimpleSatMember {
    pub fn new() -> Self {
        let solver = Solver::new();
        let signal = InterruptSignal::from_flag(solver.interrupt_flag());
        Self {
            solver,
            signal,
            clauses: Vec::new(),
        }
    }

    pub fn num_clauses(&self) -> usize {
        self.clauses.len()
    }
}

impl Default for SimpleSatMember {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for SimpleSatMember {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", tynm::type_name::<Self>(), self.signature())
    }
}

impl PortfolioMember for SimpleSatMember {
    fn signature(&self) -> Cow<str> {
        format!("simple-sat#{}", self.solver.options().seed).into()
    }

    fn configure(&mut self, options: &MemberOptions) {
        let mut profile = self.solver.options().clone();
        profile.preprocessing = options.preprocessing;
        profile.verbosity = options.verbosity;
        self.solver.set_options(profile);
    }

    fn diversify(&mut self, seed: u64) {
        let profile = self.solver.options().clone().diversified(seed);
        self.solver.set_options(profile);
    }

    fn load_clause(&mut self, clause: ClauseRef) {
        let lits = clause.iter().copied().map(to_engine).collect_vec();
        self.solver.add_clause(&lits);
        self.clauses.push(clause);
    }

    fn solve(&mut self, assumptions: &[Lit]) -> Verdict {
        let assumptions = assumptions.iter().copied().map(to_engine).collect_vec();
        match self.solver.solve_under(&assumptions) {
            SolveResult::Sat => Verdict::Satisfiable,
            SolveResult::Unsat => Verdict::Unsatisfiable,
            SolveResult::Unknown => Verdict::Unknown,
        }
    }

    fn model(&self) -> Vec<Lit> {
        self.solver.model().into_iter().map(Lit::new).collect()
    }

    fn interrupt_signal(&self) -> InterruptSignal {
        self.signal.clone()
    }

    fn statistics(&self) -> Statistics {
        let stats = self.solver.stats();
        Statistics {
            propagations: stats.propagations,
            decisions: stats.decisions,
            conflicts: stats.conflicts,
            restarts: stats.restarts,
            memory_peak_kb: stats.memory_peak_kb,
        }
    }
}
