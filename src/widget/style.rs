//! Muted grey map theme
//!
//! Style rules are matched by the library on `featureType` and
//! `elementType`; a rule without a feature type applies to everything.

use serde::{Deserialize, Serialize};

/// A single styler applied to the selected features
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Styler {
    Color(String),
    Visibility(String),
}

/// One style rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapTypeStyle {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub feature_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub element_type: Option<String>,
    pub stylers: Vec<Styler>,
}

impl MapTypeStyle {
    fn color(feature: Option<&str>, element: &str, color: &str) -> Self {
        Self {
            feature_type: feature.map(str::to_string),
            element_type: Some(element.to_string()),
            stylers: vec![Styler::Color(color.to_string())],
        }
    }

    fn hidden(element: &str) -> Self {
        Self {
            feature_type: None,
            element_type: Some(element.to_string()),
            stylers: vec![Styler::Visibility("off".to_string())],
        }
    }
}

/// The widget's theme
pub fn theme() -> Vec<MapTypeStyle> {
    vec![
        MapTypeStyle::color(None, "geometry", "#f5f5f5"),
        MapTypeStyle::hidden("labels.icon"),
        MapTypeStyle::color(None, "labels.text.fill", "#616161"),
        MapTypeStyle::color(None, "labels.text.stroke", "#f5f5f5"),
        MapTypeStyle::color(Some("administrative.land_parcel"), "labels.text.fill", "#bdbdbd"),
        MapTypeStyle::color(Some("poi"), "geometry", "#eeeeee"),
        MapTypeStyle::color(Some("poi"), "labels.text.fill", "#757575"),
        MapTypeStyle::color(Some("poi.park"), "geometry", "#e5e5e5"),
        MapTypeStyle::color(Some("road"), "geometry", "#ffffff"),
        MapTypeStyle::color(Some("road.arterial"), "labels.text.fill", "#757575"),
        MapTypeStyle::color(Some("road.highway"), "geometry", "#dadada"),
        MapTypeStyle::color(Some("road.highway"), "labels.text.fill", "#616161"),
        MapTypeStyle::color(Some("water"), "geometry", "#c9c9c9"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rule_wire_shape() {
        let rules = serde_json::to_value(theme()).unwrap();

        assert_eq!(
            rules[0],
            json!({ "elementType": "geometry", "stylers": [{ "color": "#f5f5f5" }] })
        );
        assert_eq!(
            rules[1],
            json!({ "elementType": "labels.icon", "stylers": [{ "visibility": "off" }] })
        );
        assert_eq!(
            rules[12],
            json!({
                "featureType": "water",
                "elementType": "geometry",
                "stylers": [{ "color": "#c9c9c9" }]
            })
        );
    }

    #[test]
    fn test_covers_feature_types() {
        let rules = theme();
        for feature in ["road", "poi", "poi.park", "water", "administrative.land_parcel"] {
            assert!(
                rules.iter().any(|r| r.feature_type.as_deref() == Some(feature)),
                "no rule for {}",
                feature
            );
        }
    }
}
