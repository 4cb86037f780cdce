use std::fmt::{Display, Formatter};

use itertools::Itertools;
use log::{debug, info, warn};

use sat_portfolio_core::cnf::ClauseRef;
use sat_portfolio_core::solver::{InterruptSignal, MemberFactory, MemberOptions, PortfolioMember, Statistics};

use crate::config::SolverConfig;
use crate::error::{PortfolioError, Result};

/// The competing members. Exclusively owns them; nobody else holds a member.
#[derive(Default)]
pub struct MemberPool {
    members: Vec<Box<dyn PortfolioMember>>,
}

impl MemberPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Discard the current members and build a fresh, diversified set.
    ///
    /// Members the factory fails to build are skipped. Building none at all is an error,
    /// and leaves the pool empty.
    pub fn configure(&mut self, factory: &dyn MemberFactory, config: &SolverConfig) -> Result<()> {
        self.members.clear();

        let requested = config.resolved_threads();
        let seeds = (0..requested).map(|i| config.member_seed(i)).collect_vec();
        debug_assert!(seeds.iter().all_unique(), "member seeds must be pairwise distinct");

        let options = MemberOptions {
            preprocessing: config.enable_preprocessing,
            verbosity: config.verbosity,
        };

        let mut members = Vec::with_capacity(requested);
        for (index, &seed) in seeds.iter().enumerate() {
            match factory.create(index) {
                Ok(mut member) => {
                    member.configure(&options);
                    member.diversify(seed);
                    debug!("Built member #{}: {} (seed = {})", index, member.signature(), seed);
                    members.push(member);
                }
                Err(e) => warn!("{}", e),
            }
        }

        if members.is_empty() {
            return Err(PortfolioError::PartialPoolFailure { requested, built: 0 });
        }
        if members.len() < requested {
            warn!("Only {} of {} portfolio members were built", members.len(), requested);
        } else {
            info!("Portfolio of {} members is ready", members.len());
        }
        self.members = members;
        Ok(())
    }

    /// Hand a clause to every member.
    pub fn broadcast(&mut self, clause: &ClauseRef) {
        for member in self.members.iter_mut() {
            member.load_clause(ClauseRef::clone(clause));
        }
    }

    pub fn replay(&mut self, clauses: &[ClauseRef]) {
        for clause in clauses {
            self.broadcast(clause);
        }
    }

    pub fn signals(&self) -> Vec<InterruptSignal> {
        self.members.iter().map(|m| m.interrupt_signal()).collect()
    }

    pub fn signatures(&self) -> Vec<String> {
        self.members.iter().map(|m| m.signature().into_owned()).collect()
    }

    pub fn members_mut(&mut self) -> &mut [Box<dyn PortfolioMember>] {
        &mut self.members
    }

    /// Counters summed over every member, memory peak maximised.
    pub fn statistics(&self) -> Statistics {
        self.members.iter().map(|m| m.statistics()).sum()
    }

    pub fn member_statistics(&self) -> Vec<(String, Statistics)> {
        self.members
            .iter()
            .map(|m| (m.signature().into_owned(), m.statistics()))
            .collect()
    }
}

impl Display for MemberPool {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}[{}]", tynm::type_name::<Self>(), self.signatures().join(", "))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use sat_portfolio_core::cnf::SharedClause;
    use sat_portfolio_core::lit::Lit;
    use sat_portfolio_core::solver::mock::{Event, Journal, ScriptedSolver};
    use sat_portfolio_core::solver::{BuildError, Verdict};

    use super::*;

    fn journaled(journal: Journal) -> impl MemberFactory {
        move |index: usize| -> Result<Box<dyn PortfolioMember>, BuildError> {
            Ok(Box::new(
                ScriptedSolver::answering(Verdict::Unknown).with_journal(index, Arc::clone(&journal)),
            ))
        }
    }

    #[test]
    fn test_members_are_configured_then_diversified() -> color_eyre::Result<()> {
        let journal = Journal::default();
        let mut pool = MemberPool::new();
        let config = SolverConfig::default().with_threads(3).with_seed(10).with_preprocessing(true);
        pool.configure(&journaled(Arc::clone(&journal)), &config)?;
        assert_eq!(pool.len(), 3);
        assert_eq!(pool.signatures(), vec!["scripted#10", "scripted#11", "scripted#12"]);

        let events = journal.lock().unwrap();
        for index in 0..3 {
            let own = events.iter().filter(|(id, _)| *id == index).map(|(_, e)| e.clone()).collect_vec();
            assert_eq!(
                own,
                vec![
                    Event::Configured(MemberOptions {
                        preprocessing: true,
                        verbosity: 0
                    }),
                    Event::Diversified(10 + index as u64),
                ]
            );
        }
        Ok(())
    }

    #[test]
    fn test_failed_members_are_skipped() -> color_eyre::Result<()> {
        let factory = |index: usize| -> Result<Box<dyn PortfolioMember>, BuildError> {
            if index % 2 == 1 {
                Err(BuildError {
                    index,
                    message: "out of luck".to_string(),
                })
            } else {
                Ok(Box::new(ScriptedSolver::answering(Verdict::Unknown)))
            }
        };
        let mut pool = MemberPool::new();
        pool.configure(&factory, &SolverConfig::default().with_threads(4))?;
        assert_eq!(pool.len(), 2);
        Ok(())
    }

    #[test]
    fn test_no_members_is_an_error() {
        let factory = |index: usize| -> Result<Box<dyn PortfolioMember>, BuildError> {
            Err(BuildError {
                index,
                message: "nope".to_string(),
            })
        };
        let mut pool = MemberPool::new();
        let err = pool.configure(&factory, &SolverConfig::default().with_threads(3)).unwrap_err();
        assert!(matches!(err, PortfolioError::PartialPoolFailure { requested: 3, built: 0 }));
        assert!(pool.is_empty());
    }

    #[test]
    fn test_broadcast_reaches_every_member() -> color_eyre::Result<()> {
        let journal = Journal::default();
        let mut pool = MemberPool::new();
        pool.configure(&journaled(Arc::clone(&journal)), &SolverConfig::default().with_threads(2))?;
        let clause: ClauseRef = Arc::new(SharedClause::original(vec![Lit::new(1), Lit::new(-2)].into()));
        pool.broadcast(&clause);
        assert_eq!(Arc::strong_count(&clause), 3);
        assert_eq!(pool.statistics().propagations, 2);

        drop(pool);
        assert_eq!(Arc::strong_count(&clause), 1);
        Ok(())
    }
}
