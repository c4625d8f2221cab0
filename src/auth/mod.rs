pub mod directory;
pub mod evaluator;
pub mod handler;
pub mod lockout;

pub use directory::*;
pub use evaluator::*;
pub use handler::*;
pub use lockout::*;
