//! Map widget collaborator.
//!
//! The provider is loaded once at startup from the configured key. A missing
//! key disables the map quietly; a bad key is a non-fatal `WidgetLoadError`.

use url::form_urlencoded;

use crate::errors::{ClientError, ClientResult};

const STATIC_MAP_ENDPOINT: &str = "https://maps.googleapis.com/maps/api/staticmap";
const DEFAULT_CENTER: (f64, f64) = (20.5937, 78.9629);
const DEFAULT_ZOOM: u8 = 5;
const MAP_SIZE: &str = "640x400";

#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub lat: f64,
    pub lng: f64,
    pub title: String,
}

/// Marker-drawing surface the itinerary flow forwards places to
pub trait MapWidget: Send {
    fn clear_markers(&mut self);
    fn place_marker(&mut self, marker: Marker);
    fn markers(&self) -> &[Marker];
    /// Link to a rendered image of the current markers
    fn snapshot_url(&self) -> String;
}

/// Google Static Maps rendition of the widget
#[derive(Debug, Clone)]
pub struct StaticMap {
    key: String,
    markers: Vec<Marker>,
}

impl StaticMap {
    /// Loads the provider for `key`.
    ///
    /// Returns `Ok(None)` when no key is configured, so the feature stays off.
    pub fn load(key: Option<&str>) -> ClientResult<Option<Self>> {
        let Some(key) = key else {
            return Ok(None);
        };
        let key = key.trim();
        if key.is_empty() {
            return Err(ClientError::WidgetLoadError("map API key is blank".to_string()));
        }
        if !key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(ClientError::WidgetLoadError(
                "map API key contains invalid characters".to_string(),
            ));
        }
        Ok(Some(Self {
            key: key.to_string(),
            markers: Vec::new(),
        }))
    }
}

impl MapWidget for StaticMap {
    fn clear_markers(&mut self) {
        self.markers.clear();
    }

    fn place_marker(&mut self, marker: Marker) {
        self.markers.push(marker);
    }

    fn markers(&self) -> &[Marker] {
        &self.markers
    }

    fn snapshot_url(&self) -> String {
        let mut query = form_urlencoded::Serializer::new(String::new());
        query.append_pair("size", MAP_SIZE);
        if self.markers.is_empty() {
            query.append_pair(
                "center",
                &format!("{},{}", DEFAULT_CENTER.0, DEFAULT_CENTER.1),
            );
            query.append_pair("zoom", &DEFAULT_ZOOM.to_string());
        }
        for marker in &self.markers {
            query.append_pair("markers", &format!("{},{}", marker.lat, marker.lng));
        }
        query.append_pair("key", &self.key);
        format!("{}?{}", STATIC_MAP_ENDPOINT, query.finish())
    }
}
