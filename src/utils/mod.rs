//! Small shared helpers.

pub mod process;

pub use process::{find_first, find_program, program_stem};
