//! Map configuration
//!
//! Defaults reproduce the stock dashboard look: dark CARTO basemap,
//! world view centered at (20, 0) zoom 2, 15px risk circles.

use serde::{Deserialize, Serialize};

use crate::severity::Palette;
use crate::{RenderError, Result};

pub const DEFAULT_HEIGHT_PX: u32 = 520;
pub const DEFAULT_TILE_URL: &str =
    "https://{s}.basemaps.cartocdn.com/dark_all/{z}/{x}/{y}{r}.png";
pub const DEFAULT_ATTRIBUTION: &str =
    "&copy; OpenStreetMap contributors &copy; CARTO";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TileConfig {
    /// Leaflet URL template with `{s}`/`{z}`/`{x}`/`{y}` placeholders
    pub url_template: String,
    pub max_zoom: u8,
    pub attribution: String,
}

impl Default for TileConfig {
    fn default() -> Self {
        Self {
            url_template: DEFAULT_TILE_URL.to_string(),
            max_zoom: 19,
            attribution: DEFAULT_ATTRIBUTION.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerStyle {
    pub radius: f64,
    pub fill_opacity: f64,
    pub class_name: String,
}

impl Default for MarkerStyle {
    fn default() -> Self {
        Self {
            radius: 15.0,
            fill_opacity: 0.7,
            class_name: "ellit-risk-circle".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub center: LatLon,
    pub zoom: f64,
    pub zoom_control: bool,
    pub scroll_wheel_zoom: bool,
    pub tiles: TileConfig,
    pub marker: MarkerStyle,
    pub palette: Palette,
    /// Frame height when the host does not pass `height`
    pub default_height: u32,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            center: LatLon { lat: 20.0, lon: 0.0 },
            zoom: 2.0,
            zoom_control: true,
            scroll_wheel_zoom: true,
            tiles: TileConfig::default(),
            marker: MarkerStyle::default(),
            palette: Palette::default(),
            default_height: DEFAULT_HEIGHT_PX,
        }
    }
}

impl MapConfig {
    /// Parse a (possibly partial) JSON config; missing fields take defaults
    pub fn from_json(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.zoom.is_finite() || self.zoom < 0.0 || self.zoom > f64::from(self.tiles.max_zoom) {
            return Err(RenderError::Config(format!(
                "zoom {} outside 0..={}",
                self.zoom, self.tiles.max_zoom
            )));
        }
        if !(self.marker.radius > 0.0) {
            return Err(RenderError::Config(format!(
                "marker radius must be positive, got {}",
                self.marker.radius
            )));
        }
        if !(0.0..=1.0).contains(&self.marker.fill_opacity) {
            return Err(RenderError::Config(format!(
                "fill opacity {} outside [0, 1]",
                self.marker.fill_opacity
            )));
        }
        if self.default_height == 0 {
            return Err(RenderError::Config("default height must be non-zero".to_string()));
        }
        if self.tiles.url_template.trim().is_empty() {
            return Err(RenderError::Config("tile url template is empty".to_string()));
        }
        Ok(())
    }

    /// Resolve the frame height for one render: a finite positive
    /// `requested` wins, anything else falls back to `default_height`.
    pub fn resolve_height(&self, requested: Option<f64>) -> u32 {
        match requested {
            Some(h) if h.is_finite() && h >= 1.0 => h.round().min(f64::from(u32::MAX)) as u32,
            _ => self.default_height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MapConfig::default();
        assert_eq!(config.center, LatLon { lat: 20.0, lon: 0.0 });
        assert_eq!(config.zoom, 2.0);
        assert_eq!(config.default_height, 520);
        assert_eq!(config.marker.radius, 15.0);
        assert!(config.tiles.url_template.contains("{z}/{x}/{y}"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = MapConfig::from_json(r#"{"zoom": 3, "marker": {"radius": 10}}"#).unwrap();
        assert_eq!(config.zoom, 3.0);
        assert_eq!(config.marker.radius, 10.0);
        assert_eq!(config.marker.fill_opacity, 0.7);
        assert_eq!(config.default_height, 520);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            MapConfig::from_json(r#"{"zoom": 25}"#),
            Err(RenderError::Config(_))
        ));
        assert!(matches!(
            MapConfig::from_json(r#"{"marker": {"radius": 0}}"#),
            Err(RenderError::Config(_))
        ));
        assert!(matches!(
            MapConfig::from_json(r#"{"marker": {"fill_opacity": 1.5}}"#),
            Err(RenderError::Config(_))
        ));
        assert!(matches!(
            MapConfig::from_json(r#"{"default_height": 0}"#),
            Err(RenderError::Config(_))
        ));
        assert!(matches!(
            MapConfig::from_json("not json"),
            Err(RenderError::Parse(_))
        ));
    }

    #[test]
    fn test_resolve_height() {
        let config = MapConfig::default();
        assert_eq!(config.resolve_height(Some(300.0)), 300);
        assert_eq!(config.resolve_height(Some(299.6)), 300);
        assert_eq!(config.resolve_height(None), 520);
        assert_eq!(config.resolve_height(Some(0.0)), 520);
        assert_eq!(config.resolve_height(Some(-40.0)), 520);
        assert_eq!(config.resolve_height(Some(f64::NAN)), 520);
    }
}
