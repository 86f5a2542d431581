//! Config inspection commands

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use mentorlink_core::Config;

#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the effective configuration as TOML
    Show,
    /// Print the config file path in use
    Path,
}

pub fn run_config(args: ConfigArgs, config: &Config, path: Option<&Path>) -> Result<()> {
    match args.command {
        ConfigCommand::Show => print!("{}", config.to_toml_string()?),
        ConfigCommand::Path => {
            let path: PathBuf = path.map(Path::to_path_buf).unwrap_or_else(Config::default_path);
            println!("{}", path.display());
        }
    }
    Ok(())
}
