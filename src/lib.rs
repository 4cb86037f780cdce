//! Portfolio SAT solving: several differently seeded solver instances race on the same
//! formula, and the first conclusive answer wins.

pub use config::{SolverConfig, ALL_CPUS};
pub use control::ControlHandle;
pub use error::{PortfolioError, Result};
pub use race::RaceOutcome;
pub use session::Session;

pub mod config;
pub mod control;
pub mod error;
pub mod member;
pub mod pool;
pub mod race;
pub mod registry;
pub mod session;
pub mod stats;
