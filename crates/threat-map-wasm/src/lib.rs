//! Threat Map Component
//!
//! Browser widget for a dashboard host: per-country cyber-threat risk
//! scores drawn as colored circle markers on a Leaflet map.
//! - Decodes the host's `threatData` JSON payload
//! - Rebuilds the map on every render (no incremental diffing)
//! - Buckets risk into high / mid / low severity colors
//! - Reports marker clicks back through the host bridge
//!
//! The core (dataset, severity, markers, host protocol, renderer) is
//! plain Rust and runs natively. The `wasm` feature adds the Leaflet
//! bindings, the `postMessage` bridge and the exported component.

#[cfg(feature = "wasm")]
use wasm_bindgen::prelude::*;

#[cfg(feature = "wasm")]
mod console;

pub mod backend;
pub mod config;
pub mod dataset;
pub mod error;
pub mod host;
pub mod marker;
pub mod renderer;
pub mod severity;

#[cfg(feature = "wasm")]
pub mod bridge;
#[cfg(feature = "wasm")]
pub mod component;
#[cfg(feature = "wasm")]
pub mod js;
#[cfg(feature = "wasm")]
pub mod leaflet;

// Re-exports
pub use backend::{BackendStats, ClickHandler, MapBackend, MemoryBackend, MemoryMap};
pub use config::{LatLon, MapConfig, MarkerStyle, TileConfig, DEFAULT_HEIGHT_PX};
pub use dataset::{CountryRisk, DatasetIssue, ThreatDataset, ValidationReport};
pub use error::{RenderError, Result};
pub use host::{
    ClickEvent, ClickKind, ComponentMessage, HostBridge, HostMessage, Payload, RecordingBridge,
    RenderArgs,
};
pub use marker::MarkerSpec;
pub use renderer::{RenderOutcome, RenderSummary, ThreatMapRenderer};
pub use severity::{Palette, Severity, HIGH_RISK_THRESHOLD, MID_RISK_THRESHOLD};

#[cfg(feature = "wasm")]
pub use bridge::PostMessageBridge;
#[cfg(feature = "wasm")]
pub use component::ThreatMapComponent;
#[cfg(feature = "wasm")]
pub use leaflet::LeafletBackend;

// ============================================================================
// WASM EXPORTS
// ============================================================================

#[cfg(feature = "wasm")]
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
}

/// Install console logging at `level` ("debug", "info", ...). Must run
/// before the first `ThreatMapComponent` is created, which otherwise
/// installs it at INFO.
#[cfg(feature = "wasm")]
#[wasm_bindgen(js_name = initLogging)]
pub fn init_logging(level: &str) -> std::result::Result<(), JsValue> {
    let level = console::parse_level(level)
        .ok_or_else(|| JsValue::from_str(&format!("unknown log level: {}", level)))?;
    console::init(level).map_err(|e| JsValue::from_str(&e))
}

/// Bucket a risk score: "high", "mid" or "low"
#[cfg(feature = "wasm")]
#[wasm_bindgen(js_name = severityOf)]
pub fn severity_of(risk: f64) -> String {
    Severity::from_risk(risk).label().to_string()
}
