#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    // Restart:
    pub is_luby: bool,
    pub restart_init: usize,
    pub restart_inc: f64,
    // Activity:
    pub var_decay: f64,
    pub clause_decay: f64,
    // Decisions:
    pub random_var_freq: f64,
    pub random_polarity: bool,
    /// Phase tried first for fresh variables (`true` is positive).
    pub initial_polarity: bool,
    pub phase_saving: bool,
    // ReduceDB:
    pub learntsize_factor: f64,
    pub learntsize_inc: f64,
    pub min_learnts: f64,
    // Misc:
    pub preprocessing: bool,
    pub verbosity: u32,
    pub seed: u64,
}

pub const DEFAULT_OPTIONS: Options = Options {
    // Restart:
    is_luby: true,
    restart_init: 100,
    restart_inc: 2.0,
    // Activity:
    var_decay: 0.95,
    clause_decay: 0.999,
    // Decisions:
    random_var_freq: 0.0,
    random_polarity: false,
    initial_polarity: false,
    phase_saving: true,
    // ReduceDB:
    learntsize_factor: 1.0 / 3.0,
    learntsize_inc: 1.1,
    min_learnts: 5000.0,
    // Misc:
    preprocessing: false,
    verbosity: 0,
    seed: 0,
};

impl Default for Options {
    fn default() -> Self {
        DEFAULT_OPTIONS
    }
}

impl Options {
    /// Derive a perturbed profile from this one.
    ///
    /// Seed `0` keeps the profile as is. Any other seed changes the restart policy,
    /// the amount of random decisions, the initial phase and the activity decay,
    /// so that distinct seeds lead to distinct searches.
    pub fn diversified(mut self, seed: u64) -> Self {
        self.seed = seed;
        if seed == 0 {
            return self;
        }
        self.is_luby = seed % 2 == 0;
        if !self.is_luby {
            self.restart_inc = 1.5;
        }
        self.restart_init = 50 + 50 * (seed % 3) as usize;
        self.random_var_freq = 0.01 * (seed % 5) as f64;
        self.initial_polarity = seed % 4 >= 2;
        self.random_polarity = seed % 7 == 6;
        self.var_decay = 0.95 - 0.01 * (seed % 3) as f64;
        self
    }
}
