mod transform;
pub use transform::*;

mod lerp;
pub use lerp::*;
