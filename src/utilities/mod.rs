mod bounding_box;
pub use self::bounding_box::*;

mod matrix3x3;
pub use self::matrix3x3::*;

pub mod memory;
