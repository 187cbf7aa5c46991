pub mod ibft2;
pub mod seals;

pub use ibft2::*;
pub use seals::*;
