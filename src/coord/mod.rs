//! Geographic coordinates
//!
//! The widget pins exactly one point of interest; this module holds its
//! representation and the deep links derived from it.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A geographic coordinate (latitude, longitude)
///
/// Serializes as `{"lat": .., "lng": ..}`, the literal shape the maps
/// library accepts wherever it expects a position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    /// Create new coordinates
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Validate that coordinates are within valid ranges
    ///
    /// Latitude: -90 to 90
    /// Longitude: -180 to 180
    pub fn validate(&self) -> Result<()> {
        if !(-90.0..=90.0).contains(&self.lat) {
            return Err(Error::InvalidCoordinates(format!(
                "Latitude {} is out of range [-90, 90]",
                self.lat
            )));
        }
        if !(-180.0..=180.0).contains(&self.lng) {
            return Err(Error::InvalidCoordinates(format!(
                "Longitude {} is out of range [-180, 180]",
                self.lng
            )));
        }
        Ok(())
    }

    /// Build a directions link of the form `<base>?q=<lat>,<lng>`
    pub fn directions_url(&self, base_url: &str) -> String {
        format!("{}?q={}", base_url.trim_end_matches('/'), self)
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

impl std::str::FromStr for Coordinates {
    type Err = Error;

    /// Parse `"lat,lng"`
    fn from_str(s: &str) -> Result<Self> {
        let (lat, lng) = s.split_once(',').ok_or_else(|| {
            Error::InvalidCoordinates(format!("Expected \"lat,lng\", got \"{}\"", s))
        })?;

        let parse = |part: &str| {
            part.trim()
                .parse::<f64>()
                .map_err(|_| Error::InvalidCoordinates(format!("Not a number: {}", part.trim())))
        };

        let coords = Coordinates::new(parse(lat)?, parse(lng)?);
        coords.validate()?;
        Ok(coords)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_validate_ranges() {
        assert!(Coordinates::new(48.8566, 2.3522).validate().is_ok());
        assert!(Coordinates::new(90.0, -180.0).validate().is_ok());
        assert!(Coordinates::new(90.5, 0.0).validate().is_err());
        assert!(Coordinates::new(0.0, 180.1).validate().is_err());
    }

    #[test]
    fn test_display() {
        let coords = Coordinates::new(48.8566, 2.3522);
        assert_eq!(coords.to_string(), "48.8566,2.3522");
    }

    #[test]
    fn test_directions_url() {
        let coords = Coordinates::new(48.8566, 2.3522);
        assert_eq!(
            coords.directions_url("https://maps.google.com"),
            "https://maps.google.com?q=48.8566,2.3522"
        );
        // Trailing slash on the base is tolerated
        assert_eq!(
            coords.directions_url("https://maps.google.com/"),
            "https://maps.google.com?q=48.8566,2.3522"
        );
    }

    #[test]
    fn test_parse() {
        let coords: Coordinates = "48.8566, 2.3522".parse().unwrap();
        assert_relative_eq!(coords.lat, 48.8566);
        assert_relative_eq!(coords.lng, 2.3522);

        assert!("48.8566".parse::<Coordinates>().is_err());
        assert!("north,east".parse::<Coordinates>().is_err());
        assert!("91,0".parse::<Coordinates>().is_err());
    }

    #[test]
    fn test_serializes_as_lat_lng_literal() {
        let json = serde_json::to_value(Coordinates::new(48.8566, 2.3522)).unwrap();
        assert_eq!(json, serde_json::json!({ "lat": 48.8566, "lng": 2.3522 }));
    }
}
