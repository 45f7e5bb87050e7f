//! CLI module for the bead deployment tool.
//!
//! This module provides the command-line interface for managing
//! a single bead deployment.

mod commands;
mod output;

pub use commands::{Cli, Commands, OutputFormat};
pub use output::OutputFormatter;
