pub use api::*;
pub use signal::*;
pub use types::*;

mod api;
pub mod mock;
mod signal;
mod types;
