//! Leaflet bindings and the browser map backend
//!
//! Thin externs over the global `L` namespace. Only the calls the
//! renderer needs are bound; everything else stays in JS.

use serde_json::json;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement};

use crate::backend::{ClickHandler, MapBackend};
use crate::config::MapConfig;
use crate::js::{describe, to_js};
use crate::marker::MarkerSpec;
use crate::{RenderError, Result};

#[wasm_bindgen]
extern "C" {
    pub type LeafletMap;

    #[wasm_bindgen(catch, js_namespace = L, js_name = map)]
    pub fn map(container: &HtmlElement, options: &JsValue) -> std::result::Result<LeafletMap, JsValue>;

    #[wasm_bindgen(method, js_name = setView)]
    pub fn set_view(this: &LeafletMap, center: &JsValue, zoom: f64) -> LeafletMap;

    #[wasm_bindgen(method)]
    pub fn remove(this: &LeafletMap) -> LeafletMap;
}

#[wasm_bindgen]
extern "C" {
    pub type TileLayer;

    #[wasm_bindgen(js_namespace = L, js_name = tileLayer)]
    pub fn tile_layer(url_template: &str, options: &JsValue) -> TileLayer;

    #[wasm_bindgen(method, js_name = addTo)]
    pub fn add_to(this: &TileLayer, map: &LeafletMap) -> TileLayer;
}

#[wasm_bindgen]
extern "C" {
    pub type CircleMarker;

    #[wasm_bindgen(js_namespace = L, js_name = circleMarker)]
    pub fn circle_marker(latlng: &JsValue, options: &JsValue) -> CircleMarker;

    #[wasm_bindgen(method, js_name = addTo)]
    pub fn add_to(this: &CircleMarker, map: &LeafletMap) -> CircleMarker;

    #[wasm_bindgen(method, js_name = bindPopup)]
    pub fn bind_popup(this: &CircleMarker, content: &str) -> CircleMarker;

    #[wasm_bindgen(method)]
    pub fn on(this: &CircleMarker, event: &str, handler: &Closure<dyn FnMut()>) -> CircleMarker;

    /// Drops every listener registered on the marker
    #[wasm_bindgen(method)]
    pub fn off(this: &CircleMarker) -> CircleMarker;
}

fn lat_lng(lat: f64, lon: f64) -> JsValue {
    js_sys::Array::of2(&JsValue::from_f64(lat), &JsValue::from_f64(lon)).into()
}

/// Live Leaflet map plus the Rust closures its markers call into.
/// The closures must outlive every marker that references them.
pub struct LeafletMapHandle {
    map: LeafletMap,
    markers: Vec<CircleMarker>,
    listeners: Vec<Closure<dyn FnMut()>>,
}

/// Draws into the element with id `container_id`
pub struct LeafletBackend {
    document: Document,
    container_id: String,
}

impl LeafletBackend {
    pub fn new(container_id: &str) -> Result<Self> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| RenderError::Backend("no document available".to_string()))?;

        Ok(Self {
            document,
            container_id: container_id.to_string(),
        })
    }

    fn container(&self) -> Result<HtmlElement> {
        self.document
            .get_element_by_id(&self.container_id)
            .ok_or_else(|| {
                RenderError::Backend(format!("container #{} not found", self.container_id))
            })?
            .dyn_into::<HtmlElement>()
            .map_err(|_| {
                RenderError::Backend(format!("#{} is not an HTML element", self.container_id))
            })
    }
}

impl MapBackend for LeafletBackend {
    type Map = LeafletMapHandle;

    fn create_map(&mut self, config: &MapConfig, height: u32) -> Result<LeafletMapHandle> {
        let container = self.container()?;
        container.set_inner_html("");

        let style = container.style();
        style
            .set_property("width", "100%")
            .and_then(|_| style.set_property("height", &format!("{}px", height)))
            .map_err(|e| RenderError::Backend(describe(&e)))?;

        let options = to_js(&json!({
            "zoomControl": config.zoom_control,
            "scrollWheelZoom": config.scroll_wheel_zoom,
        }))?;
        let map = map(&container, &options).map_err(|e| RenderError::Backend(describe(&e)))?;
        map.set_view(&lat_lng(config.center.lat, config.center.lon), config.zoom);

        let tile_options = to_js(&json!({
            "maxZoom": config.tiles.max_zoom,
            "attribution": config.tiles.attribution,
        }))?;
        tile_layer(&config.tiles.url_template, &tile_options).add_to(&map);

        Ok(LeafletMapHandle {
            map,
            markers: Vec::new(),
            listeners: Vec::new(),
        })
    }

    fn add_marker(
        &mut self,
        map: &mut LeafletMapHandle,
        marker: &MarkerSpec,
        on_click: ClickHandler,
    ) -> Result<()> {
        let options = to_js(&json!({
            "radius": marker.radius,
            "color": marker.color,
            "fillColor": marker.fill_color,
            "fillOpacity": marker.fill_opacity,
            "className": marker.class_name,
        }))?;

        let circle = circle_marker(&lat_lng(marker.position.lat, marker.position.lon), &options);
        circle.add_to(&map.map);
        circle.bind_popup(&marker.popup_html);

        let listener = Closure::wrap(Box::new(move || on_click()) as Box<dyn FnMut()>);
        circle.on("click", &listener);

        map.markers.push(circle);
        map.listeners.push(listener);
        Ok(())
    }

    fn remove_map(&mut self, handle: LeafletMapHandle) {
        for marker in &handle.markers {
            marker.off();
        }
        handle.map.remove();
    }

    fn show_message(&mut self, text: &str) {
        match self.container() {
            Ok(container) => {
                container.set_text_content(Some(text));
                if let Err(err) = container.style().set_property("color", "#FF5FB0") {
                    tracing::warn!("cannot style message: {}", describe(&err));
                }
            }
            Err(err) => tracing::warn!("cannot show message: {}", err),
        }
    }
}
