//! CLI subcommand implementations.

pub mod migrate;
pub mod recommend;
pub mod seed;
