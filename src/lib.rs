pub use stencil_core::*;
pub use stencil_macros::*;
