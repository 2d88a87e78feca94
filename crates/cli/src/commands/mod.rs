//! CLI subcommands

pub mod fruits;
pub mod info;
pub mod predict;
