use std::fmt::{Display, Formatter};
use std::iter::Sum;

/// Outcome of a solve attempt.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Verdict {
    Satisfiable,
    Unsatisfiable,
    /// Not run yet, interrupted, or gave up.
    Unknown,
}

impl Verdict {
    /// Only conclusive verdicts take part in the race.
    pub const fn is_conclusive(self) -> bool {
        !matches!(self, Verdict::Unknown)
    }

    /// Result code used by SAT competition drivers (and the C ABI).
    pub const fn code(self) -> i32 {
        match self {
            Verdict::Satisfiable => 10,
            Verdict::Unsatisfiable => 20,
            Verdict::Unknown => 0,
        }
    }

    pub const fn from_code(code: i32) -> Self {
        match code {
            10 => Verdict::Satisfiable,
            20 => Verdict::Unsatisfiable,
            _ => Verdict::Unknown,
        }
    }
}

impl Default for Verdict {
    fn default() -> Self {
        Verdict::Unknown
    }
}

impl Display for Verdict {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        use Verdict::*;
        match self {
            Satisfiable => write!(f, "SAT"),
            Unsatisfiable => write!(f, "UNSAT"),
            Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// Snapshot of search counters.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Statistics {
    pub propagations: u64,
    pub decisions: u64,
    pub conflicts: u64,
    pub restarts: u64,
    /// Peak memory in KB.
    pub memory_peak_kb: f64,
}

impl Statistics {
    /// Counters are added up, the memory peak is the larger of the two.
    pub fn merge(self, other: Statistics) -> Statistics {
        Statistics {
            propagations: self.propagations + other.propagations,
            decisions: self.decisions + other.decisions,
            conflicts: self.conflicts + other.conflicts,
            restarts: self.restarts + other.restarts,
            memory_peak_kb: self.memory_peak_kb.max(other.memory_peak_kb),
        }
    }
}

impl Sum for Statistics {
    fn sum<I: Iterator<Item = Statistics>>(iter: I) -> Self {
        iter.fold(Statistics::default(), Statistics::merge)
    }
}

impl Display for Statistics {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "propagations={} decisions={} conflicts={} restarts={} memory_peak={:.1}KB",
            self.propagations, self.decisions, self.conflicts, self.restarts, self.memory_peak_kb
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_codes() {
        for verdict in [Verdict::Satisfiable, Verdict::Unsatisfiable, Verdict::Unknown] {
            assert_eq!(Verdict::from_code(verdict.code()), verdict);
        }
        assert_eq!(Verdict::from_code(42), Verdict::Unknown);
    }

    #[test]
    fn test_statistics_sum() {
        let a = Statistics {
            propagations: 10,
            decisions: 2,
            conflicts: 1,
            restarts: 0,
            memory_peak_kb: 3.5,
        };
        let b = Statistics {
            propagations: 5,
            decisions: 1,
            conflicts: 4,
            restarts: 2,
            memory_peak_kb: 7.0,
        };
        let total: Statistics = [a, b].into_iter().sum();
        assert_eq!(total.propagations, 15);
        assert_eq!(total.decisions, 3);
        assert_eq!(total.conflicts, 5);
        assert_eq!(total.restarts, 2);
        assert_eq!(total.memory_peak_kb, 7.0);
    }

    #[test]
    fn test_empty_sum_is_zero() {
        let total: Statistics = std::iter::empty().sum();
        assert_eq!(total, Statistics::default());
    }
}
