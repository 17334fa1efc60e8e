mod operator;
mod predicate;
mod sort;

pub use operator::*;
pub use predicate::*;
pub use sort::*;
