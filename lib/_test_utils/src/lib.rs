use color_eyre::eyre::ensure;
use itertools::Itertools;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use sat_portfolio::{Session, SolverConfig};
use sat_portfolio_core::solver::Verdict;

/// `holes + 1` pigeons into `holes` holes. Unsatisfiable for every `holes >= 1`.
pub fn pigeonhole(holes: i32) -> Vec<Vec<i32>> {
    let var = |p: i32, h: i32| p * holes + h + 1;
    let mut clauses = Vec::new();
    for p in 0..=holes {
        clauses.push((0..holes).map(|h| var(p, h)).collect_vec());
    }
    for h in 0..holes {
        for (p, q) in (0..=holes).tuple_combinations() {
            clauses.push(vec![-var(p, h), -var(q, h)]);
        }
    }
    clauses
}

/// Uniform random 3-SAT over `num_vars` variables (distinct variables in each clause).
pub fn random_3sat(num_vars: i32, num_clauses: usize, seed: u64) -> Vec<Vec<i32>> {
    assert!(num_vars >= 3);
    let mut rng = StdRng::seed_from_u64(seed);
    (0..num_clauses)
        .map(|_| {
            let mut vars = Vec::with_capacity(3);
            while vars.len() < 3 {
                let v = rng.gen_range(1..=num_vars);
                if !vars.contains(&v) {
                    vars.push(v);
                }
            }
            vars.into_iter()
                .map(|v| if rng.gen() { v } else { -v })
                .collect_vec()
        })
        .collect()
}

/// Whether every clause contains a literal of the model.
pub fn check_model(clauses: &[Vec<i32>], model: &[i32]) -> bool {
    clauses.iter().all(|clause| clause.iter().any(|lit| model.contains(lit)))
}

pub fn load(session: &mut Session, clauses: &[Vec<i32>]) -> color_eyre::Result<()> {
    for clause in clauses {
        session.add_clause(clause)?;
    }
    Ok(())
}

/// Solve the clauses with a fresh `simple-sat` portfolio of the given size,
/// checking the model whenever the answer is satisfiable.
pub fn solve_with_threads(clauses: &[Vec<i32>], threads: isize) -> color_eyre::Result<Verdict> {
    let mut session = Session::new();
    session.configure(&SolverConfig::default().with_threads(threads))?;
    load(&mut session, clauses)?;
    println!("session = {}", session);

    let verdict = session.solve();
    println!("Portfolio returned: {}", verdict);
    match verdict {
        Verdict::Satisfiable => {
            let model = session.model()?;
            ensure!(check_model(clauses, &model), "model {:?} does not satisfy the formula", model);
        }
        _ => {
            ensure!(session.model_size() == 0, "model must be empty when not satisfiable");
        }
    }
    Ok(verdict)
}
