use std::borrow::Cow;

use snafu::Snafu;

use crate::cnf::ClauseRef;
use crate::lit::Lit;

use super::signal::InterruptSignal;
use super::types::*;

/// Options shared by every member of a portfolio.
/// Their meaning is up to the backend; the coordinator only forwards them.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct MemberOptions {
    pub preprocessing: bool,
    pub verbosity: u32,
}

/// One competitor in a portfolio race.
///
/// Unlike a plain solver, a member must be usable as a trait object and movable to a worker
/// thread, so the trait is object-safe and requires `Send`.
pub trait PortfolioMember: Send {
    /// Return the signature of the backend as a `Cow<str>`.
    fn signature(&self) -> Cow<str>;

    /// Apply the baseline profile.
    fn configure(&mut self, options: &MemberOptions);

    /// Perturb the search so that members with distinct seeds explore differently.
    fn diversify(&mut self, seed: u64);

    /// Load a clause. The member may keep the handle for as long as it lives.
    fn load_clause(&mut self, clause: ClauseRef);

    /// Run the search under the given assumptions.
    fn solve(&mut self, assumptions: &[Lit]) -> Verdict;

    /// Assignment found by the last satisfiable `solve`, one signed literal per variable.
    fn model(&self) -> Vec<Lit>;

    /// Handle other threads may raise while this member is solving.
    fn interrupt_signal(&self) -> InterruptSignal;

    fn interrupt(&self) {
        self.interrupt_signal().raise();
    }

    fn clear_interrupt(&self) {
        self.interrupt_signal().lower();
    }

    fn statistics(&self) -> Statistics;
}

#[derive(Debug, Snafu)]
#[snafu(display("Could not build member #{}: {}", index, message))]
pub struct BuildError {
    pub index: usize,
    pub message: String,
}

/// Builds fresh members for the pool.
pub trait MemberFactory: Send + Sync {
    fn create(&self, index: usize) -> Result<Box<dyn PortfolioMember>, BuildError>;
}

impl<F> MemberFactory for F
where
    F: Fn(usize) -> Result<Box<dyn PortfolioMember>, BuildError> + Send + Sync,
{
    fn create(&self, index: usize) -> Result<Box<dyn PortfolioMember>, BuildError> {
        self(index)
    }
}
