pub use extrude_core::*;
pub use extrude_macros::Reflect;
