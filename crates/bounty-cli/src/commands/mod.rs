//! CLI subcommand implementations.

pub mod balance;
pub mod days;
pub mod holidays;
pub mod init;
