//! Exported browser component
//!
//! JS owns the `ThreatMapComponent` instance; the renderer (and through
//! it the live map) lives inside it, so nothing is held in globals.
//!
//! ```js
//! const component = new ThreatMapComponent("map");
//! component.attach();
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, error, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::MessageEvent;

use crate::bridge::PostMessageBridge;
use crate::config::MapConfig;
use crate::host::{HostBridge, RenderArgs, RENDER_EVENT};
use crate::js::{from_js, to_js_error};
use crate::leaflet::LeafletBackend;
use crate::renderer::ThreatMapRenderer;

type SharedRenderer = Rc<RefCell<ThreatMapRenderer<LeafletBackend>>>;

#[wasm_bindgen]
pub struct ThreatMapComponent {
    renderer: SharedRenderer,
    listener: Option<Closure<dyn FnMut(MessageEvent)>>,
}

#[wasm_bindgen]
impl ThreatMapComponent {
    /// Create a component drawing into `#container_id`; `config_json`
    /// may override any `MapConfig` field
    #[wasm_bindgen(constructor)]
    pub fn new(container_id: &str, config_json: Option<String>) -> Result<ThreatMapComponent, JsValue> {
        crate::console::init_default();

        let config = match config_json.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => MapConfig::from_json(raw).map_err(to_js_error)?,
            _ => MapConfig::default(),
        };
        let backend = LeafletBackend::new(container_id).map_err(to_js_error)?;
        let host: Rc<dyn HostBridge> = Rc::new(PostMessageBridge::to_parent().map_err(to_js_error)?);

        Ok(Self {
            renderer: Rc::new(RefCell::new(ThreatMapRenderer::new(backend, host, config))),
            listener: None,
        })
    }

    /// Start listening for host render events and announce readiness
    #[wasm_bindgen]
    pub fn attach(&mut self) -> Result<(), JsValue> {
        if self.listener.is_some() {
            return Ok(());
        }

        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window available"))?;
        let renderer = Rc::clone(&self.renderer);
        let listener = Closure::wrap(Box::new(move |event: MessageEvent| {
            on_message(&renderer, event.data());
        }) as Box<dyn FnMut(MessageEvent)>);

        window.add_event_listener_with_callback("message", listener.as_ref().unchecked_ref())?;
        self.listener = Some(listener);

        self.renderer.borrow_mut().announce_ready();
        Ok(())
    }

    /// Stop listening and tear the map down
    #[wasm_bindgen]
    pub fn detach(&mut self) -> Result<(), JsValue> {
        if let Some(listener) = self.listener.take() {
            if let Some(window) = web_sys::window() {
                window.remove_event_listener_with_callback(
                    "message",
                    listener.as_ref().unchecked_ref(),
                )?;
            }
        }
        self.renderer.borrow_mut().unmount();
        Ok(())
    }

    /// Render directly from a JSON arguments object
    /// (`{"threatData": "...", "height": 520}`); returns the outcome as JSON
    #[wasm_bindgen(js_name = renderJson)]
    pub fn render_json(&self, args_json: &str) -> Result<String, JsValue> {
        let mut renderer = self.renderer.borrow_mut();
        let args = RenderArgs::from_json(args_json).map_err(|e| to_js_error(renderer.reject(e)))?;
        let outcome = renderer.render(&args).map_err(to_js_error)?;
        serde_json::to_string(&outcome).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    #[wasm_bindgen(js_name = isMounted)]
    pub fn is_mounted(&self) -> bool {
        self.renderer.borrow().is_mounted()
    }

    #[wasm_bindgen(js_name = markerCount)]
    pub fn marker_count(&self) -> usize {
        self.renderer.borrow().marker_count()
    }
}

impl Drop for ThreatMapComponent {
    fn drop(&mut self) {
        if let Err(err) = self.detach() {
            warn!("detach on drop failed: {:?}", err);
        }
    }
}

fn on_message(renderer: &SharedRenderer, data: JsValue) {
    if !data.is_object() {
        return;
    }
    let field = |key: &str| js_sys::Reflect::get(&data, &JsValue::from_str(key)).ok();
    if field("type").and_then(|v| v.as_string()).as_deref() != Some(RENDER_EVENT) {
        return;
    }

    let Ok(mut renderer) = renderer.try_borrow_mut() else {
        warn!("render event arrived during a render; dropped");
        return;
    };
    renderer.set_disabled(field("disabled").and_then(|v| v.as_bool()).unwrap_or(false));

    // Only `args` is decoded; `dfs` may carry Arrow buffers
    let args: RenderArgs = match field("args") {
        Some(raw) if !raw.is_undefined() && !raw.is_null() => match from_js(raw) {
            Ok(args) => args,
            Err(err) => {
                renderer.reject(err);
                return;
            }
        },
        _ => RenderArgs::default(),
    };

    match renderer.render(&args) {
        Ok(outcome) => debug!(?outcome, "render handled"),
        Err(err) => error!("render failed: {}", err),
    }
}
