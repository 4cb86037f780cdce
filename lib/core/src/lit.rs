use std::fmt::{Display, Formatter};
use std::ops::Neg;

/// External (DIMACS-style) literal: a non-zero signed integer.
/// The magnitude is the 1-based variable id, the sign is the polarity.
#[derive(Debug, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash)]
#[repr(transparent)]
pub struct Lit(i32);

impl Lit {
    pub const fn new(val: i32) -> Self {
        debug_assert!(val != 0, "literal must not be zero");
        Lit(val)
    }

    /// Fallible constructor for values coming from untrusted input.
    pub const fn try_new(val: i32) -> Option<Self> {
        if val == 0 || val == i32::MIN {
            None
        } else {
            Some(Lit(val))
        }
    }

    pub const fn get(self) -> i32 {
        self.0
    }

    pub const fn var(self) -> u32 {
        self.get().unsigned_abs()
    }

    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }
}

impl Display for Lit {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.get())
    }
}

impl From<i32> for Lit {
    fn from(val: i32) -> Self {
        Self::new(val)
    }
}

impl From<&i32> for Lit {
    fn from(val: &i32) -> Self {
        Self::new(*val)
    }
}

// Into<i32>
impl From<Lit> for i32 {
    fn from(lit: Lit) -> Self {
        lit.get()
    }
}

// -Lit
impl Neg for Lit {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Lit(-self.0)
    }
}
