//! Map backend interface
//!
//! The renderer only talks to a map library through `MapBackend`.
//! `LeafletBackend` (feature `wasm`) drives Leaflet in the browser;
//! `MemoryBackend` keeps everything in process for tests and dry runs.

use serde::Serialize;

use crate::config::{LatLon, MapConfig};
use crate::marker::MarkerSpec;
use crate::{RenderError, Result};

/// Invoked when the user clicks a marker
pub type ClickHandler = Box<dyn Fn()>;

/// Map library interface
pub trait MapBackend {
    /// Live map instance; dropping it must not leave listeners behind
    type Map;

    /// Create a map at the configured view with its tile layer attached
    fn create_map(&mut self, config: &MapConfig, height: u32) -> Result<Self::Map>;

    /// Draw one marker and wire its click handler
    fn add_marker(
        &mut self,
        map: &mut Self::Map,
        marker: &MarkerSpec,
        on_click: ClickHandler,
    ) -> Result<()>;

    /// Tear the map down completely, including every marker listener
    fn remove_map(&mut self, map: Self::Map);

    /// Show a visible message in place of the map
    fn show_message(&mut self, text: &str);
}

/// In-process map instance
pub struct MemoryMap {
    pub id: u64,
    pub center: LatLon,
    pub zoom: f64,
    pub tile_url: String,
    pub height: u32,
    markers: Vec<(MarkerSpec, ClickHandler)>,
}

impl MemoryMap {
    pub fn markers(&self) -> impl Iterator<Item = &MarkerSpec> {
        self.markers.iter().map(|(spec, _)| spec)
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    /// Simulate a user click on the marker at `index`
    pub fn click(&self, index: usize) -> Result<()> {
        let (_, handler) = self
            .markers
            .get(index)
            .ok_or_else(|| RenderError::Backend(format!("no marker at index {}", index)))?;
        handler();
        Ok(())
    }
}

impl std::fmt::Debug for MemoryMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryMap")
            .field("id", &self.id)
            .field("center", &self.center)
            .field("zoom", &self.zoom)
            .field("height", &self.height)
            .field("markers", &self.markers.len())
            .finish()
    }
}

/// Lifecycle counters kept by `MemoryBackend`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BackendStats {
    pub created: usize,
    pub removed: usize,
    pub live: Vec<u64>,
}

/// Backend that builds maps in memory
#[derive(Debug, Default)]
pub struct MemoryBackend {
    next_id: u64,
    stats: BackendStats,
    message: Option<String>,
    /// When set, `create_map` fails with this reason
    pub fail_create: Option<String>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> &BackendStats {
        &self.stats
    }

    /// Placeholder text currently shown, if any
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

impl MapBackend for MemoryBackend {
    type Map = MemoryMap;

    fn create_map(&mut self, config: &MapConfig, height: u32) -> Result<MemoryMap> {
        if let Some(reason) = &self.fail_create {
            return Err(RenderError::Backend(reason.clone()));
        }

        self.next_id += 1;
        self.stats.created += 1;
        self.stats.live.push(self.next_id);
        self.message = None;

        Ok(MemoryMap {
            id: self.next_id,
            center: config.center,
            zoom: config.zoom,
            tile_url: config.tiles.url_template.clone(),
            height,
            markers: Vec::new(),
        })
    }

    fn add_marker(
        &mut self,
        map: &mut MemoryMap,
        marker: &MarkerSpec,
        on_click: ClickHandler,
    ) -> Result<()> {
        map.markers.push((marker.clone(), on_click));
        Ok(())
    }

    fn remove_map(&mut self, map: MemoryMap) {
        self.stats.removed += 1;
        self.stats.live.retain(|id| *id != map.id);
    }

    fn show_message(&mut self, text: &str) {
        self.message = Some(text.to_string());
    }
}
