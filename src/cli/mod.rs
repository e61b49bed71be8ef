//! CLI command handlers
//!
//! Each subcommand has its own module with handler functions.

pub mod config;
pub mod options;
pub mod simulate;
pub mod urls;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Embedded single-pin map widget tooling
#[derive(Parser)]
#[command(name = "pinmap")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage configuration
    Config(config::ConfigArgs),

    /// Print the options handed to the maps library
    Options(options::OptionsArgs),

    /// Print the script and directions URLs
    Urls(urls::UrlsArgs),

    /// Run the widget lifecycle against a headless page
    Simulate(simulate::SimulateArgs),
}

/// Install the fmt subscriber, honouring RUST_LOG (default: info)
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Run the CLI
pub fn run() -> crate::error::Result<()> {
    let cli = Cli::parse();

    init_logging();

    match cli.command {
        Commands::Config(args) => config::run(args),
        Commands::Options(args) => options::run(args),
        Commands::Urls(args) => urls::run(args),
        Commands::Simulate(args) => simulate::run(args),
    }
}
