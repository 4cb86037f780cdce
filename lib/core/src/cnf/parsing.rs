use std::ffi::OsStr;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use dimacs::{parse_dimacs, Instance, Sign};
use flate2::read::GzDecoder;
use log::debug;
use snafu::ResultExt;

use crate::cnf::{Cnf, CnfError, IoSnafu, Result};
use crate::lit::Lit;

fn open_maybe_gzip(path: &Path) -> std::io::Result<Box<dyn BufRead>> {
    let file = File::open(path)?;
    let capacity = 128 * 1024;
    if path.extension().and_then(OsStr::to_str) == Some("gz") {
        Ok(Box::new(BufReader::with_capacity(capacity, GzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::with_capacity(capacity, file)))
    }
}

pub fn parse_cnf<P: AsRef<Path>>(path: P) -> Result<Cnf> {
    let path = path.as_ref();
    let display = path.display().to_string();
    let mut reader = open_maybe_gzip(path).context(IoSnafu { path: display.clone() })?;
    let mut text = String::new();
    reader.read_to_string(&mut text).context(IoSnafu { path: display.clone() })?;
    debug!("Read {} bytes from '{}'", text.len(), display);
    parse_cnf_str(&text)
}

pub fn parse_cnf_str(text: &str) -> Result<Cnf> {
    let instance = parse_dimacs(text).map_err(|e| CnfError::Parse {
        message: format!("{:?}", e),
    })?;
    match instance {
        Instance::Cnf { num_vars, clauses } => {
            let clauses: Vec<Vec<Lit>> = clauses
                .iter()
                .map(|c| {
                    c.lits()
                        .iter()
                        .map(|x| {
                            let v = i32::try_from(x.var().to_u64()).map_err(|_| CnfError::Parse {
                                message: format!("variable {} is out of range", x.var().to_u64()),
                            })?;
                            Ok(match x.sign() {
                                Sign::Pos => Lit::new(v),
                                Sign::Neg => Lit::new(-v),
                            })
                        })
                        .collect::<Result<Vec<Lit>>>()
                })
                .collect::<Result<_>>()?;
            let max_var = clauses
                .iter()
                .flatten()
                .map(|lit| lit.var() as usize)
                .max()
                .unwrap_or(0);
            Ok(Cnf {
                max_var: max_var.max(num_vars as usize),
                clauses,
            })
        }
        _ => Err(CnfError::NotCnf),
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    #[test]
    fn test_parse_small_cnf() -> color_eyre::Result<()> {
        let cnf = parse_cnf_str("c comment\np cnf 3 2\n1 -2 0\n2 3 0\n")?;
        assert_eq!(cnf.max_var, 3);
        assert_eq!(cnf.clauses, vec![vec![Lit::new(1), Lit::new(-2)], vec![Lit::new(2), Lit::new(3)]]);
        Ok(())
    }

    #[test]
    fn test_parse_empty_clause() -> color_eyre::Result<()> {
        let cnf = parse_cnf_str("p cnf 2 3\n1 2 0\n0\n-1 0\n")?;
        assert_eq!(cnf.clauses.len(), 3);
        assert!(cnf.clauses[1].is_empty());
        Ok(())
    }

    #[test]
    fn test_huge_variable_is_a_parse_error() {
        let err = parse_cnf_str("p cnf 1 1\n4294967296 0\n").unwrap_err();
        assert!(matches!(err, CnfError::Parse { .. }));
        let err = parse_cnf_str("p cnf 1 1\n-2147483648 0\n").unwrap_err();
        assert!(matches!(err, CnfError::Parse { .. }));
    }

    #[test]
    fn test_parse_garbage_fails() {
        assert!(parse_cnf_str("p cnf x y\n1 2 0\n").is_err());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = parse_cnf("/definitely/not/here.cnf").unwrap_err();
        assert!(matches!(err, CnfError::Io { .. }));
    }
}
