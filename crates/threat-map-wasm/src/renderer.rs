//! Threat Map Renderer
//!
//! Owns the current map instance and rebuilds it on every host render:
//!
//! ```text
//! Unmounted --render--> Mounted --render--> (unmount) --> Mounted ...
//! ```
//!
//! There is no incremental diffing. Each render tears the previous map
//! down (markers and click listeners included) before drawing again.

use std::cell::Cell;
use std::rc::Rc;

use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::backend::{ClickHandler, MapBackend};
use crate::config::MapConfig;
use crate::dataset::ThreatDataset;
use crate::host::{ComponentMessage, HostBridge, HostMessage, RenderArgs};
use crate::marker::MarkerSpec;
use crate::{RenderError, Result};

/// What a successful render did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RenderOutcome {
    /// No payload in the arguments; nothing was touched
    NoPayload,
    Rendered(RenderSummary),
}

impl RenderOutcome {
    pub fn summary(&self) -> Option<RenderSummary> {
        match self {
            RenderOutcome::NoPayload => None,
            RenderOutcome::Rendered(summary) => Some(*summary),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RenderSummary {
    pub markers: usize,
    pub height: u32,
}

struct MountedMap<M> {
    map: M,
    markers: usize,
}

pub struct ThreatMapRenderer<B: MapBackend> {
    backend: B,
    host: Rc<dyn HostBridge>,
    config: MapConfig,
    current: Option<MountedMap<B::Map>>,
    announced: bool,
    /// Shared with click handlers; set from the host's `disabled` flag
    disabled: Rc<Cell<bool>>,
}

impl<B: MapBackend> ThreatMapRenderer<B> {
    pub fn new(backend: B, host: Rc<dyn HostBridge>, config: MapConfig) -> Self {
        Self {
            backend,
            host,
            config,
            current: None,
            announced: false,
            disabled: Rc::new(Cell::new(false)),
        }
    }

    /// Tell the host the component is ready for render events (once)
    pub fn announce_ready(&mut self) {
        if self.announced {
            return;
        }
        self.announced = true;
        self.notify(&ComponentMessage::ready());
    }

    /// Dispatch a decoded host message. Non-render messages yield `None`.
    pub fn handle(&mut self, message: &HostMessage) -> Option<Result<RenderOutcome>> {
        match message {
            HostMessage::Render { args, disabled } => {
                self.set_disabled(*disabled);
                Some(self.render(args))
            }
            HostMessage::Other => None,
        }
    }

    /// While disabled, marker clicks are not reported to the host
    pub fn set_disabled(&mut self, disabled: bool) {
        if self.disabled.replace(disabled) != disabled {
            debug!(disabled, "host interaction state changed");
        }
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled.get()
    }

    /// Render arguments that could not be read at all: clear the map and
    /// show the reason at the default height
    pub fn reject(&mut self, err: RenderError) -> RenderError {
        error!("render arguments unreadable: {}", err);
        let height = self.config.resolve_height(None);
        self.fail(&format!("Render arguments could not be read: {}", err), height);
        err
    }

    /// Handle one host render event
    pub fn render(&mut self, args: &RenderArgs) -> Result<RenderOutcome> {
        let Some(payload) = args.payload() else {
            debug!("render skipped: no threat data in arguments");
            return Ok(RenderOutcome::NoPayload);
        };

        let height = self.config.resolve_height(args.height);

        let dataset = match payload.decode() {
            Ok(dataset) => dataset,
            Err(err) => {
                error!("threat data decode failed: {}", err);
                self.fail(&format!("Threat data could not be loaded: {}", err), height);
                return Err(err);
            }
        };

        let markers = match self.mount(&dataset, height) {
            Ok(markers) => markers,
            Err(err) => {
                error!("threat map build failed: {}", err);
                self.fail(&format!("Threat map could not be drawn: {}", err), height);
                return Err(err);
            }
        };

        self.notify(&ComponentMessage::frame_height(height));
        Ok(RenderOutcome::Rendered(RenderSummary { markers, height }))
    }

    /// Replace the current map with one built from `dataset`
    pub fn mount(&mut self, dataset: &ThreatDataset, height: u32) -> Result<usize> {
        self.unmount();

        let mut map = self.backend.create_map(&self.config, height)?;

        for country in &dataset.countries {
            let spec = MarkerSpec::from_country(country, &self.config);
            let on_click = self.click_handler(&spec);

            if let Err(err) = self.backend.add_marker(&mut map, &spec, on_click) {
                self.backend.remove_map(map);
                return Err(err);
            }
        }

        let markers = dataset.len();
        self.current = Some(MountedMap { map, markers });
        info!(markers, height, "threat map mounted");
        Ok(markers)
    }

    /// Remove the current map; returns whether one existed
    pub fn unmount(&mut self) -> bool {
        match self.current.take() {
            Some(mounted) => {
                self.backend.remove_map(mounted.map);
                debug!(markers = mounted.markers, "threat map unmounted");
                true
            }
            None => false,
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.current.is_some()
    }

    pub fn marker_count(&self) -> usize {
        self.current.as_ref().map_or(0, |m| m.markers)
    }

    pub fn current_map(&self) -> Option<&B::Map> {
        self.current.as_ref().map(|m| &m.map)
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    fn click_handler(&self, spec: &MarkerSpec) -> ClickHandler {
        let host = Rc::clone(&self.host);
        let disabled = Rc::clone(&self.disabled);
        let message = ComponentMessage::component_value(spec.click.clone());

        Box::new(move || {
            if disabled.get() {
                debug!("click ignored while disabled");
                return;
            }
            if let ComponentMessage::SetComponentValue { value, .. } = &message {
                debug!(country = %value.country, risk = value.risk, "country clicked");
            }
            if let Err(err) = host.send(&message) {
                warn!("click delivery failed: {}", err);
            }
        })
    }

    fn fail(&mut self, text: &str, height: u32) {
        self.unmount();
        self.backend.show_message(text);
        self.notify(&ComponentMessage::frame_height(height));
    }

    fn notify(&self, message: &ComponentMessage) {
        if let Err(err) = self.host.send(message) {
            warn!("host delivery failed: {}", err);
        }
    }
}

impl<B: MapBackend> Drop for ThreatMapRenderer<B> {
    fn drop(&mut self) {
        self.unmount();
    }
}
