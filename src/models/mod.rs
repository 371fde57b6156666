pub mod grade;
pub mod result;

pub use grade::*;
pub use result::*;
