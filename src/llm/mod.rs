pub mod client;
pub mod parsing;
pub mod prompts;

pub use client::*;
pub use parsing::*;
pub use prompts::*;
