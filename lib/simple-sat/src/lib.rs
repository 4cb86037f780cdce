pub mod solver;

pub mod clause;
pub mod lbool;
pub mod lit;
pub mod options;
pub mod restart;
pub mod utils;
pub mod var;
pub mod var_order;
pub mod watch;
