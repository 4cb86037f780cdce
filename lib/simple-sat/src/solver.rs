use std::fmt::{Display, Formatter};
use std::mem;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use itertools::Itertools;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, trace};

use crate::clause::{ClauseArena, ClauseRef};
use crate::lbool::LBool;
use crate::lit::Lit;
use crate::options::Options;
use crate::restart::RestartStrategy;
use crate::var::Var;
use crate::var_order::VarOrder;
use crate::watch::{WatchList, Watcher};

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SolveResult {
    Sat,
    Unsat,
    /// Interrupted before reaching a conclusion.
    Unknown,
}

impl Display for SolveResult {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SolveResult::Sat => write!(f, "SAT"),
            SolveResult::Unsat => write!(f, "UNSAT"),
            SolveResult::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Stats {
    pub decisions: u64,
    pub propagations: u64,
    pub conflicts: u64,
    pub restarts: u64,
    pub memory_peak_kb: f64,
}

#[derive(Debug, Copy, Clone)]
struct VarData {
    reason: Option<ClauseRef>,
    level: usize,
}

#[derive(Debug)]
pub struct Solver {
    options: Options,
    ca: ClauseArena,
    clauses: Vec<ClauseRef>,
    learnts: Vec<ClauseRef>,
    watchlist: WatchList,
    assignment: Vec<LBool>,
    var_data: Vec<VarData>,
    // Saved phase, `true` means negated.
    polarity: Vec<bool>,
    seen: Vec<bool>,
    trail: Vec<Lit>,
    trail_lim: Vec<usize>,
    qhead: usize,
    order: VarOrder,
    cla_inc: f64,
    max_learnts: f64,
    assumptions: Vec<Lit>,
    model: Vec<LBool>,
    ok: bool,
    rng: StdRng,
    interrupt: Arc<AtomicBool>,
    // Trail size at the last level-0 simplification.
    simp_trail: Option<usize>,
    // Statistics
    decisions: u64,
    propagations: u64,
    conflicts: u64,
    restarts: u64,
    peak_bytes: usize,
}

impl Default for Solver {
    fn default() -> Self {
        Self::new()
    }
}

impl Solver {
    pub fn new() -> Self {
        Self::with_options(Options::default())
    }

    pub fn with_options(options: Options) -> Self {
        Self {
            ca: ClauseArena::new(),
            clauses: Vec::new(),
            learnts: Vec::new(),
            watchlist: WatchList::new(),
            assignment: Vec::new(),
            var_data: Vec::new(),
            polarity: Vec::new(),
            seen: Vec::new(),
            trail: Vec::new(),
            trail_lim: Vec::new(),
            qhead: 0,
            order: VarOrder::new(options.var_decay),
            cla_inc: 1.0,
            max_learnts: 0.0,
            assumptions: Vec::new(),
            model: Vec::new(),
            ok: true,
            rng: StdRng::seed_from_u64(options.seed),
            interrupt: Arc::new(AtomicBool::new(false)),
            simp_trail: None,
            decisions: 0,
            propagations: 0,
            conflicts: 0,
            restarts: 0,
            peak_bytes: 0,
            options,
        }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Replace the search profile. Phases of existing variables are reset to the new initial polarity.
    pub fn set_options(&mut self, options: Options) {
        if options.seed != self.options.seed {
            self.rng = StdRng::seed_from_u64(options.seed);
        }
        self.order.set_var_decay(options.var_decay);
        self.polarity.fill(!options.initial_polarity);
        self.options = options;
    }

    pub fn num_vars(&self) -> usize {
        self.assignment.len()
    }
    pub fn num_clauses(&self) -> usize {
        self.clauses.len()
    }
    pub fn num_learnts(&self) -> usize {
        self.learnts.len()
    }
    pub fn is_ok(&self) -> bool {
        self.ok
    }

    pub fn stats(&self) -> Stats {
        Stats {
            decisions: self.decisions,
            propagations: self.propagations,
            conflicts: self.conflicts,
            restarts: self.restarts,
            memory_peak_kb: self.peak_bytes as f64 / 1024.0,
        }
    }

    /// Flag that stops the search when raised. Clones may be raised from other threads.
    pub fn interrupt_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.interrupt)
    }

    pub fn interrupt(&self) {
        self.interrupt.store(true, Ordering::Release);
    }

    pub fn clear_interrupt(&self) {
        self.interrupt.store(false, Ordering::Release);
    }

    pub fn new_var(&mut self) -> Var {
        let var = Var::new(self.num_vars() as u32);
        self.assignment.push(LBool::Undef);
        self.var_data.push(VarData { reason: None, level: 0 });
        self.polarity.push(!self.options.initial_polarity);
        self.seen.push(false);
        self.watchlist.init(var);
        // Seeded members start from slightly different activities:
        let activity = if self.options.seed != 0 {
            self.rng.gen::<f64>() * 1e-5
        } else {
            0.0
        };
        self.order.init_var(var, activity);
        var
    }

    fn ensure_var(&mut self, var: Var) {
        while self.num_vars() <= var.index() {
            self.new_var();
        }
    }

    pub fn value_var(&self, var: Var) -> LBool {
        self.assignment[var.index()]
    }

    pub fn value(&self, lit: Lit) -> LBool {
        self.value_var(lit.var()) ^ lit.negated()
    }

    /// Value of the variable in the model of the last satisfiable solve.
    pub fn model_value(&self, var: Var) -> LBool {
        self.model.get(var.index()).copied().unwrap_or(LBool::Undef)
    }

    /// Model of the last satisfiable solve as DIMACS literals, one per variable.
    pub fn model(&self) -> Vec<i32> {
        self.model
            .iter()
            .enumerate()
            .filter_map(|(i, value)| {
                value
                    .to_option()
                    .map(|b| Lit::new(Var::new(i as u32), !b).to_external())
            })
            .collect()
    }

    fn reason(&self, var: Var) -> Option<ClauseRef> {
        self.var_data[var.index()].reason
    }

    fn level(&self, var: Var) -> usize {
        self.var_data[var.index()].level
    }

    pub fn decision_level(&self) -> usize {
        self.trail_lim.len()
    }

    fn new_decision_level(&mut self) {
        self.trail_lim.push(self.trail.len());
    }

    fn backtrack(&mut self, level: usize) {
        if self.decision_level() > level {
            trace!("backtrack from {} to {}", self.decision_level(), level);
            let lim = self.trail_lim[level];
            for i in (lim..self.trail.len()).rev() {
                let lit = self.trail[i];
                let var = lit.var();
                self.assignment[var.index()] = LBool::Undef;
                self.var_data[var.index()].reason = None;
                if self.options.phase_saving {
                    self.polarity[var.index()] = lit.negated();
                }
                self.order.insert(var);
            }
            self.qhead = lim;
            self.trail.truncate(lim);
            self.trail_lim.truncate(level);
        }
    }

    /// Add a clause at level 0. Returns `false` once the formula is known to be unsatisfiable.
    pub fn add_clause(&mut self, lits: &[Lit]) -> bool {
        debug_assert_eq!(self.decision_level(), 0);

        // If the solver is already in UNSAT state, we do not need to add new clause.
        if !self.ok {
            return false;
        }

        // Auto-create missing variables.
        if let Some(&max) = lits.iter().max_by_key(|lit| lit.var()) {
            self.ensure_var(max.var());
        }

        let mut lits = lits.to_vec();
        lits.sort_unstable();
        lits.dedup();
        // Complementary literals are neighbours after sorting:
        if lits.windows(2).any(|w| w[0] == !w[1]) {
            return true;
        }
        if lits.iter().any(|&lit| self.value(lit) == LBool::True) {
            return true;
        }
        lits.retain(|&lit| self.value(lit) != LBool::False);

        match lits.len() {
            0 => {
                self.ok = false;
            }
            1 => {
                self.unchecked_enqueue(lits[0], None);
                self.ok = self.propagate().is_none();
            }
            _ => {
                let cref = self.ca.alloc(lits, false, 0);
                self.clauses.push(cref);
                self.attach_clause(cref);
                self.track_memory();
            }
        }
        self.ok
    }

    /// Convenience wrapper over [Solver::add_clause] for DIMACS literals.
    pub fn add_clause_external(&mut self, lits: &[i32]) -> bool {
        let lits = lits.iter().map(|&lit| Lit::from_external(lit)).collect_vec();
        self.add_clause(&lits)
    }

    fn attach_clause(&mut self, cref: ClauseRef) {
        let clause = &self.ca[cref];
        debug_assert!(clause.size() >= 2, "Clause must have at least 2 literals");
        let (a, b) = (clause[0], clause[1]);
        self.watchlist.insert(a, Watcher { cref, blocker: b });
        self.watchlist.insert(b, Watcher { cref, blocker: a });
    }

    fn track_memory(&mut self) {
        let per_var = mem::size_of::<LBool>()
            + mem::size_of::<VarData>()
            + 2 * mem::size_of::<bool>()
            + mem::size_of::<f64>()
            + mem::size_of::<Lit>();
        let bytes = self.ca.bytes()
            + self.watchlist.bytes()
            + self.num_vars() * per_var
            + (self.clauses.len() + self.learnts.len()) * mem::size_of::<ClauseRef>();
        self.peak_bytes = self.peak_bytes.max(bytes);
    }

    pub fn solve(&mut self) -> SolveResult {
        self.solve_under(&[])
    }

    /// Solve under assumptions, which only hold for this call.
    ///
    /// A falsified assumption yields [SolveResult::Unsat] while the formula itself stays usable.
    pub fn solve_under(&mut self, assumptions: &[Lit]) -> SolveResult {
        debug!("Solver::solve_under({} assumptions)", assumptions.len());
        self.model.clear();

        // If the solver is already in UNSAT state, return early.
        if !self.ok {
            return SolveResult::Unsat;
        }

        if let Some(&max) = assumptions.iter().max_by_key(|lit| lit.var()) {
            self.ensure_var(max.var());
        }
        self.assumptions = assumptions.to_vec();
        self.track_memory();
        self.max_learnts = (self.clauses.len() as f64 * self.options.learntsize_factor).max(self.options.min_learnts);

        let strategy = RestartStrategy::from(&self.options);
        let mut current_restarts = 0;
        let status = loop {
            let num_confl = strategy.num_confl(current_restarts);
            if let Some(status) = self.search(num_confl) {
                break status;
            }
            current_restarts += 1;
            self.max_learnts *= self.options.learntsize_inc;
        };

        if status == SolveResult::Sat {
            self.model = self.assignment.clone();
        }
        self.backtrack(0);
        self.assumptions.clear();

        if self.options.verbosity > 0 {
            info!(
                "{} after {} conflicts, {} decisions, {} restarts",
                status, self.conflicts, self.decisions, self.restarts
            );
        }
        status
    }

    /// The main CDCL loop.
    ///
    /// Returns [`None`] when `num_confl` conflicts were hit (restart), and the final result otherwise.
    fn search(&mut self, num_confl: usize) -> Option<SolveResult> {
        debug_assert!(self.ok);
        let mut current_conflicts = 0;

        loop {
            if let Some(conflict) = self.propagate() {
                // Conflict
                current_conflicts += 1;
                self.conflicts += 1;

                if self.decision_level() == 0 {
                    // conflict on root level => UNSAT
                    self.ok = false;
                    return Some(SolveResult::Unsat);
                }

                let (lemma, backtrack_level) = self.analyze(conflict);
                let lbd = self.compute_lbd(&lemma);
                self.backtrack(backtrack_level);

                if lemma.len() == 1 {
                    // Learn a unit clause
                    self.unchecked_enqueue(lemma[0], None);
                } else {
                    // Learn a clause
                    let asserting = lemma[0];
                    let cref = self.ca.alloc(lemma, true, lbd);
                    self.learnts.push(cref);
                    self.attach_clause(cref);
                    self.cla_bump_activity(cref);
                    self.unchecked_enqueue(asserting, Some(cref));
                    self.track_memory();
                }

                self.order.var_decay_activity();
                self.cla_decay_activity();
            } else {
                // NO conflict

                if self.interrupt.load(Ordering::Acquire) {
                    debug!("Interrupted after {} conflicts", self.conflicts);
                    return Some(SolveResult::Unknown);
                }

                // Restart:
                if num_confl > 0 && current_conflicts >= num_confl {
                    self.restarts += 1;
                    self.backtrack(0);
                    let msg = format!(
                        "r {} {} {} {} {}",
                        self.restarts,
                        self.conflicts,
                        self.num_learnts(),
                        self.num_clauses(),
                        self.num_vars()
                    );
                    if self.options.verbosity > 1 {
                        info!("{}", msg);
                    } else {
                        trace!("{}", msg);
                    }
                    return None;
                }

                if self.decision_level() == 0 && self.options.preprocessing {
                    self.simplify();
                }

                if self.learnts.len() as f64 - self.trail.len() as f64 >= self.max_learnts {
                    self.reduce_db();
                }

                // Assumptions come first:
                let mut next = None;
                while self.decision_level() < self.assumptions.len() {
                    let p = self.assumptions[self.decision_level()];
                    match self.value(p) {
                        // Dummy decision level:
                        LBool::True => self.new_decision_level(),
                        LBool::False => {
                            debug!("Assumption {} is falsified", p);
                            return Some(SolveResult::Unsat);
                        }
                        LBool::Undef => {
                            next = Some(p);
                            break;
                        }
                    }
                }

                // Make a decision:
                let decision = match next {
                    Some(p) => p,
                    None => {
                        self.decisions += 1;
                        match self.pick_branch_lit() {
                            Some(lit) => lit,
                            // SAT
                            None => return Some(SolveResult::Sat),
                        }
                    }
                };
                self.new_decision_level();
                self.unchecked_enqueue(decision, None);
            }
        }
    }

    fn pick_branch_lit(&mut self) -> Option<Lit> {
        let mut next = None;

        // Random decision:
        if self.options.random_var_freq > 0.0 && self.rng.gen::<f64>() < self.options.random_var_freq {
            if let Some(var) = self.order.random(&mut self.rng) {
                if self.value_var(var).is_undef() {
                    next = Some(var);
                }
            }
        }

        // Activity-based decision:
        while next.is_none() {
            let var = self.order.pop_max()?;
            if self.value_var(var).is_undef() {
                next = Some(var);
            }
        }

        let var = next?;
        let negated = if self.options.random_polarity {
            self.rng.gen()
        } else {
            self.polarity[var.index()]
        };
        Some(Lit::new(var, negated))
    }

    fn unchecked_enqueue(&mut self, lit: Lit, reason: Option<ClauseRef>) {
        debug_assert_eq!(self.value(lit), LBool::Undef);

        self.assignment[lit.var().index()] = LBool::from(!lit.negated());
        self.var_data[lit.var().index()] = VarData {
            reason,
            level: self.decision_level(),
        };
        self.trail.push(lit);
    }

    /// Unit propagation over two watched literals. Returns the conflicting clause, if any.
    fn propagate(&mut self) -> Option<ClauseRef> {
        let mut conflict = None;

        while self.qhead < self.trail.len() {
            let p = self.trail[self.qhead];
            self.qhead += 1;
            self.propagations += 1;

            let false_literal = !p;
            let mut ws = self.watchlist.take(false_literal);
            let mut i = 0;
            let mut j = 0;

            'watches: while i < ws.len() {
                let w = ws[i];
                i += 1;

                // Try to avoid inspecting the clause:
                if self.value(w.blocker) == LBool::True {
                    ws[j] = w;
                    j += 1;
                    continue;
                }

                let cref = w.cref;
                let blocker = w.blocker;
                // Make sure the false literal is at index 1:
                {
                    let clause = &mut self.ca[cref];
                    if clause[0] == false_literal {
                        clause.lits.swap(0, 1);
                    }
                    debug_assert_eq!(clause[1], false_literal);
                }

                // If the 0th literal is `true`, then the clause is already satisfied
                let first = self.ca[cref][0];
                let w = Watcher { cref, blocker: first };
                if first != blocker && self.value(first) == LBool::True {
                    ws[j] = w;
                    j += 1;
                    continue;
                }

                // Find the non-falsified literal:
                for k in 2..self.ca[cref].size() {
                    let other = self.ca[cref][k];
                    if self.value(other) != LBool::False {
                        self.ca[cref].lits.swap(1, k);
                        self.watchlist.insert(other, w);
                        continue 'watches;
                    }
                }

                ws[j] = w;
                j += 1;
                match self.value(first) {
                    LBool::False => {
                        // conflict
                        conflict = Some(cref);
                        self.qhead = self.trail.len();
                        // Copy the remaining watches:
                        while i < ws.len() {
                            ws[j] = ws[i];
                            j += 1;
                            i += 1;
                        }
                    }
                    // unit
                    _ => self.unchecked_enqueue(first, Some(cref)),
                }
            }

            ws.truncate(j);
            self.watchlist.restore(false_literal, ws);
        }

        conflict
    }

    /// Returns learnt clause (asserting literal first) and backtrack level.
    fn analyze(&mut self, conflict: ClauseRef) -> (Vec<Lit>, usize) {
        debug_assert!(self.decision_level() > 0);

        let mut lemma = Vec::new();
        let mut counter: usize = 0; // number of literals in the conflicting clause on the current decision level
        let mut confl = conflict;
        let mut start_index = 0; // 0 for initial conflict, 1 thereafter
        let mut index = self.trail.len();

        let asserting = loop {
            if self.ca[confl].is_learnt() {
                self.cla_bump_activity(confl);
            }

            for j in start_index..self.ca[confl].size() {
                let q = self.ca[confl][j];
                let var = q.var();
                debug_assert_eq!(self.value(q), LBool::False);

                if !self.seen[var.index()] && self.level(var) > 0 {
                    self.order.var_bump_activity(var);
                    self.seen[var.index()] = true;
                    if self.level(var) < self.decision_level() {
                        lemma.push(q);
                    } else {
                        counter += 1;
                    }
                }
            }

            // Select next clause to look at:
            loop {
                index -= 1;
                if self.seen[self.trail[index].var().index()] {
                    break;
                }
            }
            let p = self.trail[index];
            self.seen[p.var().index()] = false;
            counter -= 1;
            if counter == 0 {
                break !p;
            }
            confl = match self.reason(p.var()) {
                Some(reason) => reason,
                None => unreachable!("implied literal {} has no reason", p),
            };
            start_index = 1;
        };

        // Local minimisation: drop literals implied by other literals of the lemma.
        let to_clear = lemma.clone();
        lemma.retain(|&lit| match self.reason(lit.var()) {
            None => true,
            Some(reason) => self.ca[reason].lits()[1..].iter().any(|&q| {
                let var = q.var();
                !self.seen[var.index()] && self.level(var) > 0
            }),
        });
        for lit in to_clear {
            self.seen[lit.var().index()] = false;
        }
        lemma.insert(0, asserting);

        // Find the correct backtrack level:
        let bt_level = if lemma.len() == 1 {
            0
        } else {
            let mut max_i = 1;
            // Find the first literal assigned at the next-highest level:
            for i in 2..lemma.len() {
                if self.level(lemma[i].var()) > self.level(lemma[max_i].var()) {
                    max_i = i;
                }
            }
            // Swap-in this literal at index 1:
            lemma.swap(1, max_i);
            self.level(lemma[1].var())
        };

        (lemma, bt_level)
    }

    /// Number of distinct decision levels among the literals.
    fn compute_lbd(&self, lits: &[Lit]) -> u32 {
        lits.iter().map(|lit| self.level(lit.var())).unique().count() as u32
    }

    fn cla_bump_activity(&mut self, cref: ClauseRef) {
        let clause = &mut self.ca[cref];
        clause.activity += self.cla_inc;
        if clause.activity > 1e20 {
            // Rescale:
            for &learnt in self.learnts.iter() {
                self.ca[learnt].activity *= 1e-20;
            }
            self.cla_inc *= 1e-20;
        }
    }

    fn cla_decay_activity(&mut self) {
        self.cla_inc /= self.options.clause_decay;
    }

    /// A clause is locked while it is the reason of its first literal.
    fn is_locked(&self, cref: ClauseRef) -> bool {
        let first = self.ca[cref][0];
        self.value(first) == LBool::True && self.reason(first.var()) == Some(cref)
    }

    fn is_satisfied(&self, cref: ClauseRef) -> bool {
        self.ca[cref].lits().iter().any(|&lit| self.value(lit) == LBool::True)
    }

    /// Drop half of the learnt clauses, worst (high LBD, low activity) first.
    /// Locked clauses and glue clauses (LBD <= 2) are always kept.
    fn reduce_db(&mut self) {
        let mut learnts = mem::take(&mut self.learnts);
        {
            let ca = &self.ca;
            learnts.sort_by(|&a, &b| {
                ca[b].lbd()
                    .cmp(&ca[a].lbd())
                    .then(ca[a].activity.total_cmp(&ca[b].activity))
            });
        }

        let limit = learnts.len() / 2;
        let mut removed = Vec::new();
        let mut kept = Vec::with_capacity(learnts.len());
        for cref in learnts {
            if removed.len() < limit && self.ca[cref].lbd() > 2 && self.ca[cref].size() > 2 && !self.is_locked(cref) {
                removed.push(cref);
            } else {
                kept.push(cref);
            }
        }
        self.learnts = kept;

        debug!("reduce_db: removing {} of {} learnts", removed.len(), removed.len() + self.learnts.len());
        self.remove_clauses(removed);
    }

    /// Remove clauses satisfied at level 0.
    fn simplify(&mut self) {
        debug_assert_eq!(self.decision_level(), 0);
        if self.simp_trail == Some(self.trail.len()) {
            return;
        }

        let mut removed = Vec::new();
        for learnt in [false, true] {
            let list = if learnt {
                mem::take(&mut self.learnts)
            } else {
                mem::take(&mut self.clauses)
            };
            let (satisfied, kept): (Vec<ClauseRef>, Vec<ClauseRef>) =
                list.into_iter().partition(|&cref| self.is_satisfied(cref));
            removed.extend(satisfied);
            if learnt {
                self.learnts = kept;
            } else {
                self.clauses = kept;
            }
        }

        if !removed.is_empty() {
            debug!("simplify: removing {} satisfied clauses", removed.len());
        }
        self.remove_clauses(removed);
        self.simp_trail = Some(self.trail.len());
    }

    fn remove_clauses(&mut self, removed: Vec<ClauseRef>) {
        if removed.is_empty() {
            return;
        }
        for &cref in removed.iter() {
            if self.is_locked(cref) {
                let var = self.ca[cref][0].var();
                self.var_data[var.index()].reason = None;
            }
            self.ca[cref].deleted = true;
        }
        let ca = &self.ca;
        self.watchlist.retain(|w| !ca[w.cref].deleted);
        for cref in removed {
            self.ca.free(cref);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::thread;
    use std::time::{Duration, Instant};

    use test_log::test;

    use super::*;

    fn lits(xs: &[i32]) -> Vec<Lit> {
        xs.iter().map(|&x| Lit::from_external(x)).collect()
    }

    /// Pigeons `0..=holes` into `holes` holes, variable `p * holes + h + 1`.
    fn pigeonhole(solver: &mut Solver, holes: i32) {
        let var = |p: i32, h: i32| p * holes + h + 1;
        for p in 0..=holes {
            let clause: Vec<i32> = (0..holes).map(|h| var(p, h)).collect();
            solver.add_clause_external(&clause);
        }
        for h in 0..holes {
            for p in 0..=holes {
                for q in (p + 1)..=holes {
                    solver.add_clause_external(&[-var(p, h), -var(q, h)]);
                }
            }
        }
    }

    fn check_model(solver: &Solver, clauses: &[Vec<i32>]) -> bool {
        let model = solver.model();
        clauses.iter().all(|c| c.iter().any(|lit| model.contains(lit)))
    }

    #[test]
    fn test_correctness() {
        let mut solver = Solver::new();

        let tie = Lit::new(solver.new_var(), false);
        let shirt = Lit::new(solver.new_var(), false);
        solver.add_clause(&[!tie, shirt]);
        solver.add_clause(&[tie, shirt]);
        solver.add_clause(&[!tie, !shirt]);

        // Problem is satisfiable.
        assert_eq!(solver.solve(), SolveResult::Sat);

        // Check TIE is false, SHIRT is true.
        assert_eq!(solver.model_value(tie.var()), LBool::False);
        assert_eq!(solver.model_value(shirt.var()), LBool::True);

        // Force TIE to true.
        solver.add_clause(&[tie]);

        // Problem is now unsatisfiable.
        assert_eq!(solver.solve(), SolveResult::Unsat);
        assert!(solver.model().is_empty());
    }

    #[test]
    fn test_tautology_and_duplicates() {
        let mut solver = Solver::new();
        assert!(solver.add_clause(&lits(&[1, -1])));
        assert_eq!(solver.num_clauses(), 0);
        assert!(solver.add_clause(&lits(&[2, 2, 3])));
        assert_eq!(solver.num_clauses(), 1);
        assert_eq!(solver.num_vars(), 3);
    }

    #[test]
    fn test_contradicting_units() {
        let mut solver = Solver::new();
        assert!(solver.add_clause(&lits(&[1])));
        assert!(!solver.add_clause(&lits(&[-1])));
        assert!(!solver.is_ok());
        assert_eq!(solver.solve(), SolveResult::Unsat);
    }

    #[test]
    fn test_pigeonhole_unsat() {
        let mut solver = Solver::new();
        pigeonhole(&mut solver, 5);
        assert_eq!(solver.solve(), SolveResult::Unsat);
        let stats = solver.stats();
        assert!(stats.conflicts > 0);
        assert!(stats.memory_peak_kb > 0.0);
    }

    #[test]
    fn test_model_satisfies_formula() {
        let clauses = vec![vec![1, 2, 3], vec![-1, -2], vec![-2, -3], vec![-1, -3], vec![2, 4], vec![-4, 5], vec![-5, -3]];
        for seed in 0..6 {
            let mut solver = Solver::with_options(Options::default().diversified(seed));
            for c in clauses.iter() {
                solver.add_clause_external(c);
            }
            assert_eq!(solver.solve(), SolveResult::Sat, "seed {}", seed);
            assert!(check_model(&solver, &clauses), "seed {}", seed);
            assert_eq!(solver.model().len(), 5);
        }
    }

    #[test]
    fn test_assumptions() {
        let mut solver = Solver::new();
        solver.add_clause_external(&[1, 2]);
        solver.add_clause_external(&[-1, -2]);

        assert_eq!(solver.solve_under(&lits(&[1])), SolveResult::Sat);
        assert_eq!(solver.model(), vec![1, -2]);

        assert_eq!(solver.solve_under(&lits(&[1, 2])), SolveResult::Unsat);
        // Assumptions do not stick:
        assert!(solver.is_ok());
        assert_eq!(solver.solve(), SolveResult::Sat);

        assert_eq!(solver.solve_under(&lits(&[-2])), SolveResult::Sat);
        assert_eq!(solver.model_value(Var::new(0)), LBool::True);
    }

    #[test]
    fn test_preprocessing_keeps_answers() {
        let options = Options {
            preprocessing: true,
            ..Options::default()
        };
        let mut solver = Solver::with_options(options);
        solver.add_clause_external(&[1]);
        solver.add_clause_external(&[1, 2, 3]);
        solver.add_clause_external(&[-2, 3]);
        solver.add_clause_external(&[-3, 4]);
        assert_eq!(solver.solve(), SolveResult::Sat);
        assert!(check_model(&solver, &[vec![1], vec![1, 2, 3], vec![-2, 3], vec![-3, 4]]));
        assert_eq!(solver.num_clauses(), 2);
    }

    #[test]
    fn test_interrupt_before_solve() {
        let mut solver = Solver::new();
        pigeonhole(&mut solver, 4);
        solver.interrupt();
        assert_eq!(solver.solve(), SolveResult::Unknown);
        solver.clear_interrupt();
        assert_eq!(solver.solve(), SolveResult::Unsat);
    }

    #[test]
    fn test_interrupt_from_another_thread() {
        let mut solver = Solver::new();
        pigeonhole(&mut solver, 11);
        let flag = solver.interrupt_flag();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(100));
            flag.store(true, Ordering::Release);
        });
        let start = Instant::now();
        let res = solver.solve();
        handle.join().unwrap();
        assert_eq!(res, SolveResult::Unknown);
        assert!(start.elapsed() < Duration::from_secs(10));
        assert_eq!(solver.decision_level(), 0);
    }
}
