use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "vstore",
    about = "vstore - provision and bootstrap versioned reference stores",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Provision the configured store and create its default branch
    Init(InitArgs),
    /// Show which backend a configuration selects
    Config(ConfigArgs),
}

#[derive(Args)]
pub struct InitArgs {
    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Override `backend.kind` from the file
    #[arg(long)]
    pub kind: Option<String>,
    /// Override `default_branch` from the file
    #[arg(long)]
    pub branch: Option<String>,
}

#[derive(Args)]
pub struct ConfigArgs {
    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Override `backend.kind` from the file
    #[arg(long)]
    pub kind: Option<String>,
    /// Print the effective configuration as TOML
    #[arg(long)]
    pub dump: bool,
}
