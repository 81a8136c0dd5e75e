//! Render dry run
//!
//! Runs the real renderer against the in-memory backend and a recording
//! bridge, then reports what the browser would have drawn and what the
//! host would have received.

use std::rc::Rc;

use serde::Serialize;
use serde_json::Value;
use threat_map_wasm::{
    HostBridge, MapConfig, MarkerSpec, MemoryBackend, RecordingBridge, RenderArgs, RenderOutcome,
    ThreatMapRenderer,
};
use tracing::warn;

use crate::Result;

#[derive(Debug, Serialize)]
pub struct DryRunReport {
    pub outcome: Option<RenderOutcome>,
    pub error: Option<String>,
    pub markers: Vec<MarkerSpec>,
    pub placeholder: Option<String>,
    /// Wire objects in the order the host would see them
    pub messages: Vec<Value>,
}

/// Render once; then simulate clicks on the given marker indices
pub fn dry_run(args: &RenderArgs, config: MapConfig, clicks: &[usize]) -> Result<DryRunReport> {
    let bridge = Rc::new(RecordingBridge::new());
    let host: Rc<dyn HostBridge> = bridge.clone();
    let mut renderer = ThreatMapRenderer::new(MemoryBackend::new(), host, config);

    renderer.announce_ready();
    let result = renderer.render(args);

    let mut markers = Vec::new();
    if let Some(map) = renderer.current_map() {
        markers.extend(map.markers().cloned());
        for &index in clicks {
            if let Err(err) = map.click(index) {
                warn!("Click #{} skipped: {}", index, err);
            }
        }
    }

    let placeholder = renderer.backend().message().map(str::to_string);
    let messages = bridge
        .messages()
        .iter()
        .map(|m| m.to_wire())
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let (outcome, error) = match result {
        Ok(outcome) => (Some(outcome), None),
        Err(err) => (None, Some(err.to_string())),
    };

    Ok(DryRunReport {
        outcome,
        error,
        markers,
        placeholder,
        messages,
    })
}
