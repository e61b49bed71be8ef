//! pinmap CLI entry point
//!
//! Inspect the widget configuration and run the widget against a headless page

use pinmap::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
