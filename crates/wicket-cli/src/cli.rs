use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "wicket",
    about = "Wicket — Access Decision Orchestrator",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the orchestrator and admin API with in-memory backends
    Serve(ServeArgs),
    /// Run a scripted set of access attempts and print the resulting ledger
    Demo(DemoArgs),
    /// Generate a ledger writer signing key
    Keygen(KeygenArgs),
}

#[derive(Args)]
pub struct ServeArgs {
    /// Admin API bind address (overrides the config file)
    #[arg(long)]
    pub bind: Option<SocketAddr>,

    /// TOML configuration file for the admin API
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Hex-encoded 32-byte writer key seed; a fresh key is generated when
    /// omitted
    #[arg(long)]
    pub writer_key: Option<String>,

    /// Topic devices publish access attempts to
    #[arg(long)]
    pub topic: Option<String>,
}

#[derive(Args)]
pub struct DemoArgs {
    /// Print each device response as raw JSON instead of a summary line
    #[arg(long)]
    pub raw: bool,
}

#[derive(Args)]
pub struct KeygenArgs {}
