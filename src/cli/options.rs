//! Options command handler
//!
//! Prints the map, marker and popup options exactly as the widget hands
//! them to the maps library.

use crate::config::Config;
use crate::error::Result;
use crate::widget::options::WidgetOptions;
use clap::{Args, ValueEnum};

/// Which part of the options to print
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Part {
    All,
    Map,
    Marker,
    Popup,
}

/// Options command arguments
#[derive(Args)]
pub struct OptionsArgs {
    /// Part to print
    #[arg(long, value_enum, default_value = "all")]
    pub part: Part,

    /// Compact JSON instead of pretty-printed
    #[arg(long)]
    pub compact: bool,
}

/// Run the options command
pub fn run(args: OptionsArgs) -> Result<()> {
    let config = Config::load()?;
    println!("{}", render(&config, args.part, args.compact)?);
    Ok(())
}

fn render(config: &Config, part: Part, compact: bool) -> Result<String> {
    let options = WidgetOptions::from_config(config);
    let value = match part {
        Part::All => serde_json::to_value(&options)?,
        Part::Map => serde_json::to_value(&options.map)?,
        Part::Marker => serde_json::to_value(&options.marker)?,
        Part::Popup => serde_json::to_value(&options.popup)?,
    };

    let text = if compact {
        serde_json::to_string(&value)?
    } else {
        serde_json::to_string_pretty(&value)?
    };
    Ok(text)
}
