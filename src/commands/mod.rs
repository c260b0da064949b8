//! Subcommand implementations

pub mod energy;
pub mod generate;
pub mod recommend;
