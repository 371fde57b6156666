pub mod stage;
pub mod stage1_read;
pub mod stage2_grade;
pub mod stage3_feedback;
pub mod stage4_justify;

pub use stage::*;
pub use stage1_read::*;
pub use stage2_grade::*;
pub use stage3_feedback::*;
pub use stage4_justify::*;
