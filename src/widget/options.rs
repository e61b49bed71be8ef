//! Option structs handed to the maps library
//!
//! Every struct here serializes to the object literal the library's
//! constructors accept, so a host can pass `serde_json` output straight
//! through.

use crate::config::Config;
use crate::constants::map::MARKER_ICON_SIZE;
use crate::coord::Coordinates;
use crate::widget::popup;
use crate::widget::style::{self, MapTypeStyle};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Inline marker icon: amber disc with a white cross
const MARKER_SVG: &str = r##"<svg width="40" height="40" viewBox="0 0 40 40" fill="none" xmlns="http://www.w3.org/2000/svg"><circle cx="20" cy="20" r="18" fill="#D97706" stroke="white" stroke-width="3"/><path d="M15 15L25 25M25 15L15 25" stroke="white" stroke-width="2"/></svg>"##;

/// How the map reacts to scroll and touch gestures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GestureHandling {
    /// Scroll zoom needs a modifier key, touch pan needs two fingers
    #[default]
    Cooperative,
    /// All gestures go to the map
    Greedy,
    /// Map ignores gestures
    None,
    /// Library picks cooperative or greedy
    Auto,
}

impl fmt::Display for GestureHandling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cooperative => write!(f, "cooperative"),
            Self::Greedy => write!(f, "greedy"),
            Self::None => write!(f, "none"),
            Self::Auto => write!(f, "auto"),
        }
    }
}

impl std::str::FromStr for GestureHandling {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cooperative" => Ok(Self::Cooperative),
            "greedy" => Ok(Self::Greedy),
            "none" => Ok(Self::None),
            "auto" => Ok(Self::Auto),
            _ => Err(format!("Unknown gesture handling: {}", s)),
        }
    }
}

/// UI affordances shown on the map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Controls {
    #[serde(rename = "disableDefaultUI")]
    pub disable_default_ui: bool,
    pub zoom_control: bool,
    pub map_type_control: bool,
    pub scale_control: bool,
    pub street_view_control: bool,
    pub rotate_control: bool,
    pub fullscreen_control: bool,
}

impl Default for Controls {
    fn default() -> Self {
        Self {
            disable_default_ui: false,
            zoom_control: true,
            map_type_control: false,
            scale_control: true,
            street_view_control: true,
            rotate_control: false,
            fullscreen_control: true,
        }
    }
}

/// Map view constructor options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapOptions {
    pub center: Coordinates,
    pub zoom: u8,
    pub styles: Vec<MapTypeStyle>,
    #[serde(flatten)]
    pub controls: Controls,
    pub gesture_handling: GestureHandling,
}

impl MapOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            center: config.center(),
            zoom: config.map.zoom,
            styles: style::theme(),
            controls: Controls::default(),
            gesture_handling: config.map.gesture_handling,
        }
    }
}

/// Pixel size, the library's `Size` helper
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

/// Pixel offset, the library's `Point` helper
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Marker icon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerIcon {
    pub url: String,
    pub scaled_size: Size,
    pub anchor: Point,
}

impl MarkerIcon {
    /// The inline SVG pin, centred on the coordinate
    pub fn pin() -> Self {
        let half = MARKER_ICON_SIZE / 2.0;
        Self {
            url: format!(
                "data:image/svg+xml;charset=UTF-8,{}",
                urlencoding::encode(MARKER_SVG)
            ),
            scaled_size: Size {
                width: MARKER_ICON_SIZE,
                height: MARKER_ICON_SIZE,
            },
            anchor: Point { x: half, y: half },
        }
    }
}

/// Marker entrance animation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Animation {
    Drop,
    Bounce,
}

/// Marker constructor options (the owning map is passed separately)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerOptions {
    pub position: Coordinates,
    pub title: String,
    pub icon: MarkerIcon,
    pub animation: Animation,
}

impl MarkerOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            position: config.center(),
            title: config.location.title.clone(),
            icon: MarkerIcon::pin(),
            animation: Animation::Drop,
        }
    }
}

/// Popup (info window) constructor options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopupOptions {
    pub content: String,
}

impl PopupOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            content: popup::render(config),
        }
    }
}

/// Everything the widget hands to the library, in construction order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetOptions {
    pub map: MapOptions,
    pub marker: MarkerOptions,
    pub popup: PopupOptions,
}

impl WidgetOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            map: MapOptions::from_config(config),
            marker: MarkerOptions::from_config(config),
            popup: PopupOptions::from_config(config),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_map_options_wire_shape() {
        let options = MapOptions::from_config(&Config::default());
        let value = serde_json::to_value(&options).unwrap();

        assert_eq!(value["center"], json!({ "lat": 48.8566, "lng": 2.3522 }));
        assert_eq!(value["zoom"], json!(15));
        assert_eq!(value["disableDefaultUI"], json!(false));
        assert_eq!(value["zoomControl"], json!(true));
        assert_eq!(value["mapTypeControl"], json!(false));
        assert_eq!(value["scaleControl"], json!(true));
        assert_eq!(value["streetViewControl"], json!(true));
        assert_eq!(value["rotateControl"], json!(false));
        assert_eq!(value["fullscreenControl"], json!(true));
        assert_eq!(value["gestureHandling"], json!("cooperative"));
        assert_eq!(value["styles"].as_array().unwrap().len(), 13);
    }

    #[test]
    fn test_marker_options_wire_shape() {
        let options = MarkerOptions::from_config(&Config::default());
        let value = serde_json::to_value(&options).unwrap();

        assert_eq!(value["title"], json!("Artisan Bakery"));
        assert_eq!(value["animation"], json!("DROP"));
        assert_eq!(value["icon"]["scaledSize"], json!({ "width": 40.0, "height": 40.0 }));
        assert_eq!(value["icon"]["anchor"], json!({ "x": 20.0, "y": 20.0 }));
    }

    #[test]
    fn test_marker_icon_is_inline_svg() {
        let icon = MarkerIcon::pin();
        assert!(icon.url.starts_with("data:image/svg+xml;charset=UTF-8,%3Csvg"));
        // Fill colour survives encoding
        assert!(icon.url.contains("%23D97706"));
    }

    #[test]
    fn test_gesture_handling_parse() {
        assert_eq!("Cooperative".parse::<GestureHandling>(), Ok(GestureHandling::Cooperative));
        assert_eq!("greedy".parse::<GestureHandling>(), Ok(GestureHandling::Greedy));
        assert!("wobbly".parse::<GestureHandling>().is_err());
    }
}
