use std::fmt::{Display, Formatter};

use sat_portfolio_core::solver::Statistics;

use crate::pool::MemberPool;

#[derive(Debug, Clone, PartialEq)]
pub struct MemberStatistics {
    pub index: usize,
    pub signature: String,
    pub stats: Statistics,
}

/// Aggregated statistics together with the per-member breakdown.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatisticsReport {
    pub total: Statistics,
    pub members: Vec<MemberStatistics>,
}

impl StatisticsReport {
    pub fn collect(pool: &MemberPool) -> Self {
        let members: Vec<MemberStatistics> = pool
            .member_statistics()
            .into_iter()
            .enumerate()
            .map(|(index, (signature, stats))| MemberStatistics { index, signature, stats })
            .collect();
        let total = members.iter().map(|m| m.stats).sum();
        Self { total, members }
    }
}

impl Display for StatisticsReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "total: {}", self.total)?;
        for m in self.members.iter() {
            writeln!(f, "#{} {}: {}", m.index, m.signature, m.stats)?;
        }
        Ok(())
    }
}
