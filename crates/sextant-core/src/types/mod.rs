pub mod block;
pub mod proof;

pub use block::*;
pub use proof::*;
