//! Configuration management
//!
//! Loads and saves configuration from XDG-compliant paths.
//! Config location: ~/.config/pinmap/config.toml

pub mod defaults;

use crate::constants::{api, map};
use crate::coord::Coordinates;
use crate::error::{Error, Result};
use crate::widget::options::GestureHandling;
use defaults::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Point of interest and its descriptive text
    #[serde(default)]
    pub location: LocationConfig,

    /// Map view settings
    #[serde(default)]
    pub map: MapConfig,

    /// External script settings
    #[serde(default)]
    pub script: ScriptConfig,

    /// Resize synchronization delays
    #[serde(default)]
    pub resize: ResizeConfig,

    /// Outbound directions link
    #[serde(default)]
    pub directions: DirectionsConfig,
}

/// Point of interest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationConfig {
    /// Latitude of the pin
    #[serde(default = "default_lat")]
    pub lat: f64,

    /// Longitude of the pin
    #[serde(default = "default_lng")]
    pub lng: f64,

    /// Place name, used as marker title and popup heading
    #[serde(default = "default_title")]
    pub title: String,

    /// Address line in the popup
    #[serde(default = "default_address")]
    pub address: String,

    /// Tagline in the popup
    #[serde(default = "default_tagline")]
    pub tagline: String,
}

/// Map view settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapConfig {
    /// Initial zoom level
    #[serde(default = "default_zoom")]
    pub zoom: u8,

    /// Id of the element the map mounts into
    #[serde(default = "default_mount_id")]
    pub mount_id: String,

    /// Gesture handling mode
    #[serde(default)]
    pub gesture_handling: GestureHandling,
}

/// External script settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptConfig {
    /// Script endpoint
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Access credential sent as the `key` query parameter
    #[serde(default)]
    pub api_key: String,

    /// Feature set sent as the `libraries` query parameter
    #[serde(default = "default_libraries")]
    pub libraries: Vec<String>,
}

/// Resize synchronization delays
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResizeConfig {
    /// Delay after a container size change, in milliseconds
    #[serde(default = "default_container_delay")]
    pub container_delay_ms: u64,

    /// Delay after a window resize, in milliseconds
    #[serde(default = "default_window_delay")]
    pub window_delay_ms: u64,
}

/// Outbound directions link
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectionsConfig {
    /// Base URL; the link is `<base_url>?q=<lat>,<lng>`
    #[serde(default = "default_directions_url")]
    pub base_url: String,
}

// Default value functions for serde
fn default_lat() -> f64 {
    DEFAULT_LAT
}
fn default_lng() -> f64 {
    DEFAULT_LNG
}
fn default_title() -> String {
    DEFAULT_TITLE.to_string()
}
fn default_address() -> String {
    DEFAULT_ADDRESS.to_string()
}
fn default_tagline() -> String {
    DEFAULT_TAGLINE.to_string()
}
fn default_zoom() -> u8 {
    DEFAULT_ZOOM
}
fn default_mount_id() -> String {
    DEFAULT_MOUNT_ID.to_string()
}
fn default_endpoint() -> String {
    api::MAPS_SCRIPT_URL.to_string()
}
fn default_libraries() -> Vec<String> {
    DEFAULT_LIBRARIES.iter().map(|s| s.to_string()).collect()
}
fn default_container_delay() -> u64 {
    DEFAULT_CONTAINER_DELAY_MS
}
fn default_window_delay() -> u64 {
    DEFAULT_WINDOW_DELAY_MS
}
fn default_directions_url() -> String {
    api::DIRECTIONS_URL.to_string()
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            lat: default_lat(),
            lng: default_lng(),
            title: default_title(),
            address: default_address(),
            tagline: default_tagline(),
        }
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            zoom: default_zoom(),
            mount_id: default_mount_id(),
            gesture_handling: GestureHandling::default(),
        }
    }
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            api_key: String::new(),
            libraries: default_libraries(),
        }
    }
}

impl Default for ResizeConfig {
    fn default() -> Self {
        Self {
            container_delay_ms: default_container_delay(),
            window_delay_ms: default_window_delay(),
        }
    }
}

impl Default for DirectionsConfig {
    fn default() -> Self {
        Self {
            base_url: default_directions_url(),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join(APP_DIR_NAME))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Load configuration from the default path
    ///
    /// Creates default config if file doesn't exist
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from a specific path
    ///
    /// Creates default config at that path if the file doesn't exist
    pub fn load_from(path: &Path) -> Result<Self> {
        let config = if path.exists() {
            let content = fs::read_to_string(path)
                .map_err(|e| Error::Config(format!("Failed to read config file: {}", e)))?;

            toml::from_str::<Config>(&content)
                .map_err(|e| Error::Config(format!("Failed to parse config file: {}", e)))?
        } else {
            let config = Config::default();
            config.save_to(path)?;
            config
        };

        config.validate()?;
        if config.script.api_key.is_empty() {
            warn!("script.api_key is empty; the maps library will reject requests");
        }
        Ok(config)
    }

    /// Save configuration to the default path
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                Error::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, content)
            .map_err(|e| Error::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Check value ranges the maps library would otherwise reject at runtime
    pub fn validate(&self) -> Result<()> {
        self.center().validate()?;

        if !(map::MIN_ZOOM..=map::MAX_ZOOM).contains(&self.map.zoom) {
            return Err(Error::Config(format!(
                "Zoom {} is out of range [{}, {}]",
                self.map.zoom,
                map::MIN_ZOOM,
                map::MAX_ZOOM
            )));
        }
        if self.map.mount_id.trim().is_empty() {
            return Err(Error::Config("map.mount_id must not be empty".to_string()));
        }
        Ok(())
    }

    /// Get a configuration value by key path
    ///
    /// Key format: "section.key"
    /// Returns the value as a string, or None if not found
    pub fn get(&self, key: &str) -> Option<String> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["location", "lat"] => Some(self.location.lat.to_string()),
            ["location", "lng"] => Some(self.location.lng.to_string()),
            ["location", "title"] => Some(self.location.title.clone()),
            ["location", "address"] => Some(self.location.address.clone()),
            ["location", "tagline"] => Some(self.location.tagline.clone()),

            ["map", "zoom"] => Some(self.map.zoom.to_string()),
            ["map", "mount_id"] => Some(self.map.mount_id.clone()),
            ["map", "gesture_handling"] => Some(self.map.gesture_handling.to_string()),

            ["script", "endpoint"] => Some(self.script.endpoint.clone()),
            ["script", "api_key"] => Some(self.script.api_key.clone()),
            ["script", "libraries"] => Some(self.script.libraries.join(",")),

            ["resize", "container_delay_ms"] => Some(self.resize.container_delay_ms.to_string()),
            ["resize", "window_delay_ms"] => Some(self.resize.window_delay_ms.to_string()),

            ["directions", "base_url"] => Some(self.directions.base_url.clone()),

            _ => None,
        }
    }

    /// Set a configuration value by key path
    ///
    /// Key format: "section.key"
    /// Returns error if key is invalid or value type is wrong. A rejected
    /// value leaves the config unchanged.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut updated = self.clone();
        updated.apply(key, value)?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    fn apply(&mut self, key: &str, value: &str) -> Result<()> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["location", "lat"] => {
                self.location.lat = value
                    .parse()
                    .map_err(|_| Error::Config(format!("Invalid latitude value: {}", value)))?;
            }
            ["location", "lng"] => {
                self.location.lng = value
                    .parse()
                    .map_err(|_| Error::Config(format!("Invalid longitude value: {}", value)))?;
            }
            ["location", "title"] => {
                self.location.title = value.to_string();
            }
            ["location", "address"] => {
                self.location.address = value.to_string();
            }
            ["location", "tagline"] => {
                self.location.tagline = value.to_string();
            }

            ["map", "zoom"] => {
                self.map.zoom = value
                    .parse()
                    .map_err(|_| Error::Config(format!("Invalid zoom value: {}", value)))?;
            }
            ["map", "mount_id"] => {
                self.map.mount_id = value.to_string();
            }
            ["map", "gesture_handling"] => {
                self.map.gesture_handling = value.parse().map_err(Error::Config)?;
            }

            ["script", "endpoint"] => {
                self.script.endpoint = value.to_string();
            }
            ["script", "api_key"] => {
                self.script.api_key = value.to_string();
            }
            ["script", "libraries"] => {
                self.script.libraries = value
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect();
            }

            ["resize", "container_delay_ms"] => {
                self.resize.container_delay_ms = value
                    .parse()
                    .map_err(|_| Error::Config(format!("Invalid delay value: {}", value)))?;
            }
            ["resize", "window_delay_ms"] => {
                self.resize.window_delay_ms = value
                    .parse()
                    .map_err(|_| Error::Config(format!("Invalid delay value: {}", value)))?;
            }

            ["directions", "base_url"] => {
                self.directions.base_url = value.to_string();
            }

            _ => {
                return Err(Error::Config(format!("Unknown config key: {}", key)));
            }
        }

        Ok(())
    }

    /// List all available config keys
    pub fn available_keys() -> Vec<&'static str> {
        vec![
            "location.lat",
            "location.lng",
            "location.title",
            "location.address",
            "location.tagline",
            "map.zoom",
            "map.mount_id",
            "map.gesture_handling",
            "script.endpoint",
            "script.api_key",
            "script.libraries",
            "resize.container_delay_ms",
            "resize.window_delay_ms",
            "directions.base_url",
        ]
    }

    /// The fixed point of interest
    pub fn center(&self) -> Coordinates {
        Coordinates::new(self.location.lat, self.location.lng)
    }

    /// Full script URL with `key` and `libraries` query parameters
    pub fn script_url(&self) -> String {
        let libraries = self
            .script
            .libraries
            .iter()
            .map(|lib| urlencoding::encode(lib).into_owned())
            .collect::<Vec<_>>()
            .join(",");

        format!(
            "{}?key={}&libraries={}",
            self.script.endpoint,
            urlencoding::encode(&self.script.api_key),
            libraries
        )
    }

    /// Outbound directions link for the point of interest
    pub fn directions_url(&self) -> String {
        self.center().directions_url(&self.directions.base_url)
    }

    /// Delay before re-layout after a container size change
    pub fn container_delay(&self) -> Duration {
        Duration::from_millis(self.resize.container_delay_ms)
    }

    /// Delay before re-layout and re-center after a window resize
    pub fn window_delay(&self) -> Duration {
        Duration::from_millis(self.resize.window_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_relative_eq!(config.location.lat, 48.8566);
        assert_relative_eq!(config.location.lng, 2.3522);
        assert_eq!(config.map.zoom, 15);
        assert_eq!(config.map.gesture_handling, GestureHandling::Cooperative);
        assert_eq!(config.script.libraries, vec!["places".to_string()]);
        assert_eq!(config.resize.container_delay_ms, 100);
        assert_eq!(config.resize.window_delay_ms, 300);
    }

    #[test]
    fn test_get_set() {
        let mut config = Config::default();

        assert_eq!(config.get("map.zoom"), Some("15".to_string()));

        config.set("map.zoom", "12").unwrap();
        assert_eq!(config.get("map.zoom"), Some("12".to_string()));

        config.set("script.libraries", "places, geometry").unwrap();
        assert_eq!(config.script.libraries, vec!["places", "geometry"]);
        assert_eq!(config.get("script.libraries"), Some("places,geometry".to_string()));

        config.set("map.gesture_handling", "greedy").unwrap();
        assert_eq!(config.map.gesture_handling, GestureHandling::Greedy);
    }

    #[test]
    fn test_get_invalid_key() {
        let config = Config::default();
        assert_eq!(config.get("invalid.key"), None);
    }

    #[test]
    fn test_set_invalid_key() {
        let mut config = Config::default();
        assert!(config.set("invalid.key", "value").is_err());
    }

    #[test]
    fn test_set_invalid_value() {
        let mut config = Config::default();
        assert!(config.set("resize.window_delay_ms", "soon").is_err());
        assert!(config.set("map.gesture_handling", "sideways").is_err());
    }

    #[test]
    fn test_set_out_of_range() {
        let mut config = Config::default();
        assert!(config.set("location.lat", "120").is_err());
        assert!(config.set("map.zoom", "30").is_err());
        assert!(config.set("map.mount_id", "").is_err());

        // Rejected values are not kept
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_every_available_key_is_readable() {
        let config = Config::default();
        for key in Config::available_keys() {
            assert!(config.get(key).is_some(), "key {} not readable", key);
        }
    }

    #[test]
    fn test_script_url() {
        let mut config = Config::default();
        config.script.api_key = "abc 123".to_string();

        assert_eq!(
            config.script_url(),
            "https://maps.googleapis.com/maps/api/js?key=abc%20123&libraries=places"
        );
    }

    #[test]
    fn test_directions_url() {
        let config = Config::default();
        assert_eq!(
            config.directions_url(),
            "https://maps.google.com?q=48.8566,2.3522"
        );
    }

    #[test]
    fn test_delays() {
        let config = Config::default();
        assert_eq!(config.container_delay(), Duration::from_millis(100));
        assert_eq!(config.window_delay(), Duration::from_millis(300));
    }

    #[test]
    fn test_load_creates_default() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config, Config::default());
        assert!(path.exists());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");

        let mut config = Config::default();
        config.location.title = "Corner Café".to_string();
        config.resize.window_delay_ms = 500;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.location.title, "Corner Café");
        assert_eq!(loaded.resize.window_delay_ms, 500);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[location]\nlat = 51.5\nlng = -0.12\n").unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_relative_eq!(loaded.location.lat, 51.5);
        assert_eq!(loaded.location.title, DEFAULT_TITLE);
        assert_eq!(loaded.map.zoom, DEFAULT_ZOOM);
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[map]\nzoom = 40\n").unwrap();

        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_serialization_format() {
        let config = Config::default();
        let toml = toml::to_string_pretty(&config).unwrap();

        assert!(toml.contains("[location]"));
        assert!(toml.contains("[map]"));
        assert!(toml.contains("[script]"));
        assert!(toml.contains("[resize]"));
        assert!(toml.contains("gesture_handling = \"cooperative\""));
    }
}
