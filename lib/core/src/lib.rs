pub mod cnf;
pub mod lit;
pub mod model;
pub mod solver;
