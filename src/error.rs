use snafu::Snafu;

use sat_portfolio_core::cnf::CnfError;

pub type Result<T, E = PortfolioError> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
pub enum PortfolioError {
    #[snafu(display("Could not reserve memory for a clause of {} literals", len))]
    AllocationFailure { len: usize },

    #[snafu(display("Invalid argument: {}", reason))]
    InvalidArgument { reason: String },

    #[snafu(display("Only {} of {} portfolio members could be built", built, requested))]
    PartialPoolFailure { requested: usize, built: usize },

    #[snafu(display("Portfolio member #{} failed: {}", member, message))]
    InstanceFault { member: usize, message: String },

    #[snafu(display("Invalid variable {}", var))]
    InvalidVariable { var: i32 },

    #[snafu(display("No solution available, last verdict is {}", verdict))]
    NoSolution { verdict: String },

    #[snafu(display("The portfolio has no members"))]
    NoInstances,

    #[snafu(display("Could not read '{}': {}", path, source))]
    Io { path: String, source: std::io::Error },

    #[snafu(display("Could not parse DIMACS: {}", message))]
    Parse { message: String },
}

impl From<CnfError> for PortfolioError {
    fn from(e: CnfError) -> Self {
        match e {
            CnfError::Io { path, source } => PortfolioError::Io { path, source },
            other => PortfolioError::Parse {
                message: other.to_string(),
            },
        }
    }
}
