use std::borrow::Cow;
use std::fmt::{Display, Formatter};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use itertools::Itertools;

use crate::cnf::ClauseRef;
use crate::lit::Lit;

use super::api::*;
use super::signal::InterruptSignal;
use super::types::*;

const POLL_INTERVAL: Duration = Duration::from_millis(1);

/// What a [ScriptedSolver] went through, in call order.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Configured(MemberOptions),
    Diversified(u64),
    Loaded(Vec<Lit>),
    Solved(Vec<Lit>),
}

/// Event log shared by several scripted members, tagged with the member id.
pub type Journal = Arc<Mutex<Vec<(usize, Event)>>>;

#[derive(Debug, Clone)]
enum Behaviour {
    /// Answer after the delay (or earlier with Unknown when interrupted).
    Answer { verdict: Verdict, delay: Duration },
    /// Block until interrupted, then answer Unknown.
    Stall,
    Panic,
}

/// Deterministic member whose answers are fixed up front.
#[derive(Debug)]
pub struct ScriptedSolver {
    id: usize,
    behaviour: Behaviour,
    model: Vec<Lit>,
    signal: InterruptSignal,
    clauses: Vec<ClauseRef>,
    seed: Option<u64>,
    options: MemberOptions,
    solves: u64,
    journal: Option<Journal>,
}

impl ScriptedSolver {
    fn with_behaviour(behaviour: Behaviour) -> Self {
        Self {
            id: 0,
            behaviour,
            model: Vec::new(),
            signal: InterruptSignal::new(),
            clauses: Vec::new(),
            seed: None,
            options: MemberOptions::default(),
            solves: 0,
            journal: None,
        }
    }

    pub fn answering(verdict: Verdict) -> Self {
        Self::with_behaviour(Behaviour::Answer {
            verdict,
            delay: Duration::ZERO,
        })
    }

    pub fn stalling() -> Self {
        Self::with_behaviour(Behaviour::Stall)
    }

    pub fn panicking() -> Self {
        Self::with_behaviour(Behaviour::Panic)
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        if let Behaviour::Answer { delay: d, .. } = &mut self.behaviour {
            *d = delay;
        }
        self
    }

    pub fn with_model<I>(mut self, model: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Lit>,
    {
        self.model = model.into_iter().map_into::<Lit>().collect();
        self
    }

    pub fn with_journal(mut self, id: usize, journal: Journal) -> Self {
        self.id = id;
        self.journal = Some(journal);
        self
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn options(&self) -> MemberOptions {
        self.options
    }

    pub fn clauses(&self) -> &[ClauseRef] {
        &self.clauses
    }

    fn record(&self, event: Event) {
        if let Some(journal) = &self.journal {
            journal
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push((self.id, event));
        }
    }

    /// Sleep for `delay`, returning early with `false` if interrupted.
    fn wait(&self, delay: Duration) -> bool {
        let deadline = Instant::now() + delay;
        loop {
            if self.signal.is_raised() {
                return false;
            }
            let now = Instant::now();
            if now >= deadline {
                return true;
            }
            thread::sleep(POLL_INTERVAL.min(deadline - now));
        }
    }
}

impl Display for ScriptedSolver {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", tynm::type_name::<Self>(), self.signature())
    }
}

impl PortfolioMember for ScriptedSolver {
    fn signature(&self) -> Cow<str> {
        match self.seed {
            Some(seed) => format!("scripted#{}", seed).into(),
            None => "scripted".into(),
        }
    }

    fn configure(&mut self, options: &MemberOptions) {
        self.options = *options;
        self.record(Event::Configured(*options));
    }

    fn diversify(&mut self, seed: u64) {
        self.seed = Some(seed);
        self.record(Event::Diversified(seed));
    }

    fn load_clause(&mut self, clause: ClauseRef) {
        self.record(Event::Loaded(clause.lits().to_vec()));
        self.clauses.push(clause);
    }

    fn solve(&mut self, assumptions: &[Lit]) -> Verdict {
        self.solves += 1;
        self.record(Event::Solved(assumptions.to_vec()));
        match &self.behaviour {
            Behaviour::Answer { verdict, delay } => {
                let verdict = *verdict;
                if self.wait(*delay) {
                    verdict
                } else {
                    Verdict::Unknown
                }
            }
            Behaviour::Stall => {
                while !self.signal.is_raised() {
                    thread::sleep(POLL_INTERVAL);
                }
                Verdict::Unknown
            }
            Behaviour::Panic => panic!("scripted member {} failed on purpose", self.id),
        }
    }

    fn model(&self) -> Vec<Lit> {
        self.model.clone()
    }

    fn interrupt_signal(&self) -> InterruptSignal {
        self.signal.clone()
    }

    fn statistics(&self) -> Statistics {
        Statistics {
            propagations: self.clauses.len() as u64,
            decisions: self.solves,
            conflicts: self.solves,
            restarts: 0,
            memory_peak_kb: 1.0 + self.id as f64,
        }
    }
}
