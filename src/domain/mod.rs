mod launcher;
mod resolve;
mod sign;
mod types;

pub use launcher::*;
pub use resolve::*;
pub use sign::*;
pub use types::*;
