use std::fmt::{Display, Formatter};
use std::path::Path;
use std::slice::Iter;
use std::str::FromStr;

use itertools::Itertools;
use snafu::Snafu;

use crate::lit::Lit;

pub use clause::*;

mod clause;
mod parsing;

pub type Result<T, E = CnfError> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
pub enum CnfError {
    #[snafu(display("Could not read '{}': {}", path, source))]
    Io { path: String, source: std::io::Error },

    #[snafu(display("Could not parse DIMACS: {}", message))]
    Parse { message: String },

    #[snafu(display("DIMACS instance is not in CNF"))]
    NotCnf,
}

/// Plain formula as read from a DIMACS file.
#[derive(Debug, Default)]
pub struct Cnf {
    pub max_var: usize,
    pub clauses: Vec<Vec<Lit>>,
}

impl Cnf {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn iter(&self) -> Iter<'_, Vec<Lit>> {
        self.clauses.iter()
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        parsing::parse_cnf(path)
    }

    pub fn add_clause<I>(&mut self, lits: I)
    where
        I: IntoIterator,
        I::Item: Into<Lit>,
    {
        let lits = lits.into_iter().map_into::<Lit>().collect_vec();
        let max_var = lits.iter().map(|lit| lit.var() as usize).max().unwrap_or(0);
        self.max_var = self.max_var.max(max_var);
        self.clauses.push(lits);
    }
}

impl FromStr for Cnf {
    type Err = CnfError;

    fn from_str(s: &str) -> Result<Self> {
        parsing::parse_cnf_str(s)
    }
}

impl<C> FromIterator<C> for Cnf
where
    C: IntoIterator,
    C::Item: Into<Lit>,
{
    fn from_iter<T: IntoIterator<Item = C>>(iter: T) -> Self {
        let mut cnf = Self::new();
        for clause in iter {
            cnf.add_clause(clause);
        }
        cnf
    }
}

impl Display for Cnf {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "p cnf {} {}", self.max_var, self.clauses.len())?;
        for clause in self.clauses.iter() {
            writeln!(f, "{} 0", clause.iter().join(" "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cnf_tracks_max_var() {
        let cnf: Cnf = [vec![1, -5], vec![3]].into_iter().collect();
        assert_eq!(cnf.max_var, 5);
        assert_eq!(cnf.clauses.len(), 2);
    }

    #[test]
    fn test_cnf_display_is_dimacs() {
        let cnf: Cnf = [vec![1, -2], vec![2]].into_iter().collect();
        assert_eq!(cnf.to_string(), "p cnf 2 2\n1 -2 0\n2 0\n");
    }
}
