use std::fmt::{Display, Formatter};
use std::ops;

use crate::var::Var;

/// Internal literal: `var << 1 | negated`, so that `lit` and `!lit` are neighbours.
#[derive(Debug, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash)]
#[repr(transparent)]
pub struct Lit(pub(crate) u32);

impl Lit {
    pub const fn new(var: Var, negated: bool) -> Self {
        Lit(var.0 << 1 | negated as u32)
    }

    pub const fn var(self) -> Var {
        Var(self.0 >> 1)
    }

    pub const fn negated(self) -> bool {
        (self.0 & 1) != 0
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }

    pub const fn to_external(self) -> i32 {
        let var = (self.var().0 + 1) as i32;
        if self.negated() {
            -var
        } else {
            var
        }
    }

    /// Convert a non-zero DIMACS literal.
    pub const fn from_external(lit: i32) -> Lit {
        debug_assert!(lit != 0);
        let var = lit.unsigned_abs() - 1;
        Lit::new(Var(var), lit < 0)
    }
}

impl Display for Lit {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_external())
    }
}

// !Lit
impl ops::Not for Lit {
    type Output = Lit;

    fn not(self) -> Self::Output {
        Lit(self.0 ^ 1)
    }
}

// Lit ^ bool
impl ops::BitXor<bool> for Lit {
    type Output = Lit;

    fn bitxor(self, rhs: bool) -> Self::Output {
        Lit(self.0 ^ rhs as u32)
    }
}
