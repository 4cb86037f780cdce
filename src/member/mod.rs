use std::fmt::{Display, Formatter};

use sat_portfolio_core::solver::{BuildError, MemberFactory, PortfolioMember};

pub use simple::SimpleSatMember;

mod simple;

/// Builds [SimpleSatMember]s, the default backend of a session.
#[derive(Debug, Copy, Clone, Default)]
pub struct SimpleSatFactory;

impl MemberFactory for SimpleSatFactory {
    fn create(&self, _index: usize) -> Result<Box<dyn PortfolioMember>, BuildError> {
        Ok(Box::new(SimpleSatMember::new()))
    }
}

impl Display for SimpleSatFactory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", tynm::type_name::<Self>())
    }
}
