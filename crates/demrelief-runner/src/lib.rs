//! # demrelief-runner
//!
//! Library half of the `demrelief` command-line tool: argument parsing,
//! YAML configuration, logging setup and dispatch onto the DEM, plot and
//! scene crates.

pub mod cli;
pub mod commands;
pub mod config;
mod error;
pub mod logging;

pub use cli::{Cli, Command};
pub use commands::run;
pub use config::{Config, API_KEY_ENV};
pub use error::{Result, RunnerError};

/// Load the config file, then apply the environment and `cli` on top.
pub fn resolve_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::load(cli.config.as_deref())?;
    config.apply_env_api_key(std::env::var(API_KEY_ENV).ok());
    config.apply_cli_overrides(cli);
    Ok(config)
}
