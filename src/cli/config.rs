//! Config command handler
//!
//! View and modify configuration settings.

use crate::config::Config;
use crate::error::{Error, Result};
use clap::Args;

/// Config command arguments
#[derive(Args)]
pub struct ConfigArgs {
    /// Configuration key (e.g., "location.lat")
    pub key: Option<String>,

    /// Value to set (if not provided, shows current value)
    pub value: Option<String>,

    /// Show config file path
    #[arg(long)]
    pub path: bool,

    /// Reset config to defaults
    #[arg(long)]
    pub reset: bool,
}

/// Run the config command
pub fn run(args: ConfigArgs) -> Result<()> {
    if args.path {
        let path = Config::config_path()?;
        println!("{}", path.display());
        return Ok(());
    }

    if args.reset {
        Config::default().save()?;
        println!("Configuration reset to defaults");
        return Ok(());
    }

    let mut config = Config::load()?;

    match (&args.key, &args.value) {
        (None, None) => {
            print!("{}", render_all(&config));
        }

        (Some(key), None) => match config.get(key) {
            Some(value) => println!("{}", value),
            None => {
                let mut message = format!("Unknown config key: {}\n\nAvailable keys:", key);
                for k in Config::available_keys() {
                    message.push_str("\n  ");
                    message.push_str(k);
                }
                return Err(Error::Config(message));
            }
        },

        (Some(key), Some(value)) => {
            config.set(key, value)?;
            config.save()?;
            println!("{} = {}", key, value);
        }

        (None, Some(_)) => {
            return Err(Error::Config(
                "Must specify a key to set a value".to_string(),
            ));
        }
    }

    Ok(())
}

/// Render every value, masking the API key
fn render_all(config: &Config) -> String {
    let mut out = String::new();
    let mut section = "";

    for key in Config::available_keys() {
        let (name, field) = key.split_once('.').unwrap_or(("", key));
        if name != section {
            if !section.is_empty() {
                out.push('\n');
            }
            out.push_str(&format!("[{}]\n", name));
            section = name;
        }

        let value = config.get(key).unwrap_or_default();
        if key == "script.api_key" {
            let note = if value.is_empty() {
                "\"\" # not configured"
            } else {
                "\"***\" # configured"
            };
            out.push_str(&format!("{} = {}\n", field, note));
        } else {
            out.push_str(&format!("{} = {}\n", field, value));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_all_groups_sections() {
        let out = render_all(&Config::default());

        assert!(out.starts_with("[location]\n"));
        assert!(out.contains("\n[map]\nzoom = 15\n"));
        assert!(out.contains("[resize]\ncontainer_delay_ms = 100\nwindow_delay_ms = 300\n"));
        assert!(out.contains("api_key = \"\" # not configured"));
    }

    #[test]
    fn test_render_all_masks_api_key() {
        let mut config = Config::default();
        config.script.api_key = "secret-key".to_string();

        let out = render_all(&config);
        assert!(!out.contains("secret-key"));
        assert!(out.contains("api_key = \"***\" # configured"));
    }
}
