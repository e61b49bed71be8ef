//! Urls command handler
//!
//! Prints the script URL the widget injects and the directions link its
//! popup offers.

use crate::config::Config;
use crate::error::Result;
use clap::Args;

/// Urls command arguments
#[derive(Args)]
pub struct UrlsArgs {
    /// Only print the script URL
    #[arg(long, conflicts_with = "directions")]
    pub script: bool,

    /// Only print the directions URL
    #[arg(long)]
    pub directions: bool,
}

/// Run the urls command
pub fn run(args: UrlsArgs) -> Result<()> {
    let config = Config::load()?;

    if args.script {
        println!("{}", config.script_url());
    } else if args.directions {
        println!("{}", config.directions_url());
    } else {
        println!("script:     {}", config.script_url());
        println!("directions: {}", config.directions_url());
    }

    Ok(())
}
