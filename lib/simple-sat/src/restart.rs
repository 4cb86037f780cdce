use crate::options::Options;
use crate::utils::luby;

#[derive(Debug)]
pub struct RestartStrategy {
    pub is_luby: bool,
    pub restart_init: usize,
    pub restart_inc: f64,
}

impl RestartStrategy {
    /// Conflict budget of the search round that follows `restarts` restarts.
    pub fn num_confl(&self, restarts: usize) -> usize {
        let restart_base = if self.is_luby {
            luby(self.restart_inc, restarts as u32)
        } else {
            self.restart_inc.powi(restarts as i32)
        };

        (restart_base * self.restart_init as f64) as usize
    }
}

impl From<&Options> for RestartStrategy {
    fn from(options: &Options) -> Self {
        Self {
            is_luby: options.is_luby,
            restart_init: options.restart_init,
            restart_inc: options.restart_inc,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_luby_budget() {
        let strategy = RestartStrategy {
            is_luby: true,
            restart_init: 100,
            restart_inc: 2.0,
        };
        let budgets: Vec<usize> = (0..7).map(|i| strategy.num_confl(i)).collect();
        assert_eq!(budgets, vec![100, 100, 200, 100, 100, 200, 400]);
    }

    #[test]
    fn test_geometric_budget() {
        let strategy = RestartStrategy {
            is_luby: false,
            restart_init: 100,
            restart_inc: 1.5,
        };
        let budgets: Vec<usize> = (0..4).map(|i| strategy.num_confl(i)).collect();
        assert_eq!(budgets, vec![100, 150, 225, 337]);
    }
}
