use std::fmt::{Display, Formatter};

use itertools::Itertools;

use crate::lit::Lit;

/// Satisfying assignment: one signed literal per assigned variable, in the order the
/// winning member reported them.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct Model {
    lits: Vec<Lit>,
}

impl Model {
    pub fn new(lits: Vec<Lit>) -> Self {
        Self { lits }
    }

    pub fn len(&self) -> usize {
        self.lits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lits.is_empty()
    }

    pub fn clear(&mut self) {
        self.lits.clear();
    }

    pub fn lits(&self) -> &[Lit] {
        &self.lits
    }

    pub fn iter(&self) -> impl Iterator<Item = Lit> + '_ {
        self.lits.iter().copied()
    }

    /// Truth value of the variable, `None` if the model does not mention it.
    // Linear scan: models are read once or twice per solve.
    pub fn value(&self, var: u32) -> Option<bool> {
        self.lits.iter().find(|lit| lit.var() == var).map(|lit| lit.is_positive())
    }

    /// Whether the literal is true in the model.
    pub fn is_true(&self, lit: Lit) -> bool {
        self.value(lit.var()) == Some(lit.is_positive())
    }

    /// Whether every clause has a literal that is true in the model.
    pub fn satisfies<C>(&self, clauses: &[C]) -> bool
    where
        C: AsRef<[Lit]>,
    {
        clauses
            .iter()
            .all(|clause| clause.as_ref().iter().any(|&lit| self.is_true(lit)))
    }
}

impl From<Vec<Lit>> for Model {
    fn from(lits: Vec<Lit>) -> Self {
        Self::new(lits)
    }
}

impl Display for Model {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.lits.iter().join(" "))
    }
}
