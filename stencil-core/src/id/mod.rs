mod clock;
mod guid;
mod snowflake;

pub use clock::*;
pub use guid::*;
pub use snowflake::*;
