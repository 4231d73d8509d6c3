//! CLI command implementations

pub mod chart;
pub mod generate;
pub mod list;
pub mod show;
