//! Flex-time balance CLI library.
//!
//! This crate provides the CLI interface for bounty.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands};
pub use config::{
    ClockifyConfig, Config, HarvestConfig, IntegrationKind, XLedgerConfig, default_config_file,
    dirs_config_path, expand_placeholders,
};
