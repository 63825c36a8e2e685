//! CLI library components for the import reconciler.

pub mod cli;
pub mod commands;
pub mod config;
pub mod logging;
pub mod sink;
pub mod summary;
