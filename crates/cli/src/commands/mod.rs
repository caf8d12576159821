//! CLI subcommand implementations

pub mod debug;
pub mod flights;
pub mod predict;
