use std::sync::Arc;

use log::trace;

use sat_portfolio_core::cnf::{ClauseRef, SharedClause};
use sat_portfolio_core::lit::Lit;

use crate::error::{PortfolioError, Result};

/// Owner of every clause handed to the portfolio.
///
/// Clauses are append-only: once registered they are never retracted or mutated, and the buffers
/// live until the registry and every member holding a handle are dropped.
#[derive(Debug, Default)]
pub struct ClauseRegistry {
    clauses: Vec<ClauseRef>,
    variable_count: u32,
    inconsistent: bool,
}

impl ClauseRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn clauses(&self) -> &[ClauseRef] {
        &self.clauses
    }

    /// Highest variable id seen so far (or reserved).
    pub fn variable_count(&self) -> u32 {
        self.variable_count
    }

    /// Validate and register a clause. Nothing is registered on failure.
    pub fn add(&mut self, lits: &[i32]) -> Result<ClauseRef> {
        let clause = Self::prepare(lits)?;
        self.extend(vec![Arc::clone(&clause)])?;
        Ok(clause)
    }

    /// Validate a clause and build its shared buffer without registering it.
    pub fn prepare(lits: &[i32]) -> Result<ClauseRef> {
        if lits.is_empty() {
            return Err(PortfolioError::InvalidArgument {
                reason: "clause must not be empty".to_string(),
            });
        }

        let mut buffer: Vec<Lit> = Vec::new();
        buffer
            .try_reserve_exact(lits.len())
            .map_err(|_| PortfolioError::AllocationFailure { len: lits.len() })?;
        for &x in lits {
            let lit = Lit::try_new(x).ok_or_else(|| PortfolioError::InvalidArgument {
                reason: format!("invalid literal {} in clause", x),
            })?;
            buffer.push(lit);
        }
        Ok(Arc::new(SharedClause::original(buffer.into_boxed_slice())))
    }

    /// Register prepared clauses, all of them or none.
    pub fn extend(&mut self, clauses: Vec<ClauseRef>) -> Result<()> {
        let total: usize = clauses.iter().map(|c| c.len()).sum();
        self.clauses
            .try_reserve(clauses.len())
            .map_err(|_| PortfolioError::AllocationFailure { len: total })?;
        for clause in clauses {
            self.variable_count = self.variable_count.max(clause.max_var());
            trace!("Registered clause #{} {}", self.clauses.len(), clause);
            self.clauses.push(clause);
        }
        Ok(())
    }

    /// Record that the formula contains the empty clause.
    pub fn mark_inconsistent(&mut self) {
        self.inconsistent = true;
    }

    /// Whether the formula is trivially unsatisfiable.
    pub fn is_inconsistent(&self) -> bool {
        self.inconsistent
    }

    /// Raise the variable count to at least `n`. The count never decreases.
    pub fn reserve_variables(&mut self, n: i32) -> Result<()> {
        if n <= 0 {
            return Err(PortfolioError::InvalidArgument {
                reason: format!("variable count must be positive, got {}", n),
            });
        }
        self.variable_count = self.variable_count.max(n as u32);
        Ok(())
    }
}
