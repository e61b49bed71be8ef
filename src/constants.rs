//! Centralized constants for the pinmap crate
//!
//! Provider endpoints and fixed widget parameters shared by the config
//! defaults, the widget and the hosts.

/// External endpoints
pub mod api {
    /// Maps JavaScript API script endpoint
    pub const MAPS_SCRIPT_URL: &str = "https://maps.googleapis.com/maps/api/js";

    /// Base URL for the outbound "get directions" deep link
    pub const DIRECTIONS_URL: &str = "https://maps.google.com";
}

/// Map view parameters
pub mod map {
    /// Lowest zoom level the library accepts
    pub const MIN_ZOOM: u8 = 0;

    /// Highest zoom level the library accepts
    pub const MAX_ZOOM: u8 = 22;

    /// Marker icon edge length in pixels
    pub const MARKER_ICON_SIZE: f64 = 40.0;
}

/// Library event names
pub mod events {
    /// Event forcing the map to recompute its layout
    pub const RESIZE: &str = "resize";

    /// Marker click event
    pub const CLICK: &str = "click";
}
