//! Marker construction
//!
//! Turns one `CountryRisk` into everything a backend needs to draw it:
//! position, style, popup markup, and the click payload.

use serde::Serialize;

use crate::config::{LatLon, MapConfig};
use crate::dataset::CountryRisk;
use crate::host::ClickEvent;
use crate::severity::Severity;

/// Backend-independent description of one circle marker
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerSpec {
    pub position: LatLon,
    pub radius: f64,
    pub color: String,
    pub fill_color: String,
    pub fill_opacity: f64,
    pub class_name: String,
    pub severity: Severity,
    pub popup_html: String,
    pub click: ClickEvent,
}

impl MarkerSpec {
    pub fn from_country(country: &CountryRisk, config: &MapConfig) -> Self {
        let severity = country.severity();
        let color = config.palette.color(severity).to_string();

        Self {
            position: LatLon {
                lat: country.lat,
                lon: country.lon,
            },
            radius: config.marker.radius,
            fill_color: color.clone(),
            color,
            fill_opacity: config.marker.fill_opacity,
            class_name: config.marker.class_name.clone(),
            severity,
            popup_html: popup_html(country),
            click: ClickEvent::country_clicked(country),
        }
    }
}

/// Popup label: name, risk percentage, CVE count
pub fn popup_html(country: &CountryRisk) -> String {
    format!(
        "<b>{}</b><br>Risk: {}%<br>Active CVEs: {}",
        escape_html(&country.name),
        country.risk,
        country.cves
    )
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
