//! Command implementations for the NFTNET CLI
//!
//! Each command module provides a `run` function that executes the command logic.

pub mod completions;
pub mod details;
pub mod generate;
pub mod summary;
