use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::sync::Arc;

use itertools::Itertools;

use crate::lit::Lit;

/// LBD given to clauses that were not learnt by any engine.
pub const DEFAULT_LBD: u32 = 2;

/// Handle to a clause shared between the registry and every portfolio member.
///
/// The backing buffer is released when the last handle is dropped.
pub type ClauseRef = Arc<SharedClause>;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ClauseOrigin {
    /// Added by the caller (directly or from a DIMACS file).
    Original,
    /// Learnt by the member with the given index.
    Learnt { member: usize },
}

/// Immutable clause buffer handed out to portfolio members.
#[derive(Debug)]
pub struct SharedClause {
    lits: Box<[Lit]>,
    origin: ClauseOrigin,
    lbd: u32,
}

impl SharedClause {
    pub fn new(lits: Box<[Lit]>, origin: ClauseOrigin, lbd: u32) -> Self {
        debug_assert!(!lits.is_empty(), "Clause must be non-empty");
        Self { lits, origin, lbd }
    }

    pub fn original(lits: Box<[Lit]>) -> Self {
        Self::new(lits, ClauseOrigin::Original, DEFAULT_LBD)
    }

    pub fn lits(&self) -> &[Lit] {
        &self.lits
    }

    pub fn origin(&self) -> ClauseOrigin {
        self.origin
    }

    pub fn lbd(&self) -> u32 {
        self.lbd
    }

    /// Largest variable id mentioned in the clause.
    pub fn max_var(&self) -> u32 {
        self.lits.iter().map(|lit| lit.var()).max().unwrap_or(0)
    }

    /// Whether at least one literal is true under the given assignment lookup.
    pub fn is_satisfied_by<F>(&self, mut value: F) -> bool
    where
        F: FnMut(u32) -> Option<bool>,
    {
        self.lits
            .iter()
            .any(|lit| value(lit.var()) == Some(lit.is_positive()))
    }
}

impl Deref for SharedClause {
    type Target = [Lit];

    fn deref(&self) -> &Self::Target {
        &self.lits
    }
}

impl Display for SharedClause {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({})", self.lits.iter().join(" "))
    }
}

impl PartialEq for SharedClause {
    fn eq(&self, other: &Self) -> bool {
        if self.lits.len() != other.lits.len() {
            return false;
        }
        let lhs = self.lits.iter().copied().sorted_unstable();
        let rhs = other.lits.iter().copied().sorted_unstable();
        itertools::equal(lhs, rhs)
    }
}
