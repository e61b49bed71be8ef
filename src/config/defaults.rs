//! Default configuration values
//!
//! Named constants for all tunable parameters

/// Default point of interest latitude
pub const DEFAULT_LAT: f64 = 48.8566;

/// Default point of interest longitude
pub const DEFAULT_LNG: f64 = 2.3522;

/// Default place name (marker title and popup heading)
pub const DEFAULT_TITLE: &str = "Artisan Bakery";

/// Default address line shown in the popup
pub const DEFAULT_ADDRESS: &str = "123 Bakery Street";

/// Default tagline shown in the popup
pub const DEFAULT_TAGLINE: &str = "Fresh bread daily";

/// Default zoom level
pub const DEFAULT_ZOOM: u8 = 15;

/// Default id of the mount element
pub const DEFAULT_MOUNT_ID: &str = "map-container";

/// Default library feature set
pub const DEFAULT_LIBRARIES: &[&str] = &["places"];

/// Delay before re-layout after the container resizes (milliseconds)
pub const DEFAULT_CONTAINER_DELAY_MS: u64 = 100;

/// Delay before re-layout and re-center after the window resizes (milliseconds)
pub const DEFAULT_WINDOW_DELAY_MS: u64 = 300;

/// Config file name
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Application directory name (for XDG paths)
pub const APP_DIR_NAME: &str = "pinmap";
