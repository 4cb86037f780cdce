use std::thread;
use std::time::Duration;

use log::warn;

/// Sentinel for "one member per available CPU".
pub const ALL_CPUS: isize = -1;

/// Configuration of a portfolio session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolverConfig {
    /// Number of portfolio members. `-1` means all available CPUs.
    pub num_threads: isize,
    /// Advisory wall-clock budget. Zero means unbounded. Enforced by drivers, not by the race.
    pub timeout: Duration,
    /// Base seed for diversification. Zero derives seeds from member indices only.
    pub random_seed: u32,
    pub enable_preprocessing: bool,
    pub verbosity: u32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            num_threads: 1,
            timeout: Duration::ZERO,
            random_seed: 0,
            enable_preprocessing: false,
            verbosity: 0,
        }
    }
}

impl SolverConfig {
    pub fn with_threads(mut self, num_threads: isize) -> Self {
        self.num_threads = num_threads;
        self
    }

    pub fn with_seed(mut self, random_seed: u32) -> Self {
        self.random_seed = random_seed;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_preprocessing(mut self, enable: bool) -> Self {
        self.enable_preprocessing = enable;
        self
    }

    pub fn with_verbosity(mut self, verbosity: u32) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Number of members to build.
    pub fn resolved_threads(&self) -> usize {
        match self.num_threads {
            ALL_CPUS => thread::available_parallelism().map(|n| n.get()).unwrap_or(1),
            n if n <= 0 => {
                warn!("num_threads = {} is not positive, using a single member", n);
                1
            }
            n => n as usize,
        }
    }

    /// Diversification seed of the member with the given index.
    pub fn member_seed(&self, index: usize) -> u64 {
        index as u64 + self.random_seed as u64
    }

    pub fn timeout(&self) -> Option<Duration> {
        if self.timeout.is_zero() {
            None
        } else {
            Some(self.timeout)
        }
    }
}
