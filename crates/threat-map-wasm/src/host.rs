//! Host Bridge Protocol
//!
//! Wire format of the dashboard's custom-component channel:
//! - inbound: `streamlit:render` carrying the component arguments
//! - outbound: `componentReady`, `setFrameHeight`, `setComponentValue`
//!
//! Every outbound message is wrapped with `isStreamlitMessage: true` and
//! posted to the parent window. Click results travel only through
//! `setComponentValue`.

use std::cell::RefCell;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dataset::{CountryRisk, ThreatDataset};
use crate::Result;

/// Component API version announced in `componentReady`
pub const API_VERSION: u32 = 1;

/// `type` of the inbound render message
pub const RENDER_EVENT: &str = "streamlit:render";

// ============================================================================
// Outbound
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClickKind {
    #[serde(rename = "country_clicked")]
    CountryClicked,
}

/// Payload handed back to the host when a marker is clicked
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClickEvent {
    pub event: ClickKind,
    pub country: String,
    pub risk: f64,
    pub cves: u32,
}

impl ClickEvent {
    pub fn country_clicked(country: &CountryRisk) -> Self {
        Self {
            event: ClickKind::CountryClicked,
            country: country.name.clone(),
            risk: country.risk,
            cves: country.cves,
        }
    }
}

/// Messages sent from the component to the host page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ComponentMessage {
    #[serde(rename = "streamlit:componentReady", rename_all = "camelCase")]
    ComponentReady { api_version: u32 },

    #[serde(rename = "streamlit:setFrameHeight")]
    SetFrameHeight { height: u32 },

    #[serde(rename = "streamlit:setComponentValue", rename_all = "camelCase")]
    SetComponentValue { value: ClickEvent, data_type: String },
}

impl ComponentMessage {
    pub fn ready() -> Self {
        Self::ComponentReady {
            api_version: API_VERSION,
        }
    }

    pub fn frame_height(height: u32) -> Self {
        Self::SetFrameHeight { height }
    }

    pub fn component_value(value: ClickEvent) -> Self {
        Self::SetComponentValue {
            value,
            data_type: "json".to_string(),
        }
    }

    /// Full wire object, including the `isStreamlitMessage` marker
    pub fn to_wire(&self) -> Result<Value> {
        Ok(serde_json::to_value(Envelope {
            is_streamlit_message: true,
            message: self,
        })?)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Envelope<'a> {
    is_streamlit_message: bool,
    #[serde(flatten)]
    message: &'a ComponentMessage,
}

/// Outbound channel to the host page
pub trait HostBridge {
    fn send(&self, message: &ComponentMessage) -> Result<()>;
}

/// Bridge that keeps every message in memory, for tests and dry runs
#[derive(Debug, Default)]
pub struct RecordingBridge {
    sent: RefCell<Vec<ComponentMessage>>,
}

impl RecordingBridge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<ComponentMessage> {
        self.sent.borrow().clone()
    }

    pub fn take(&self) -> Vec<ComponentMessage> {
        std::mem::take(&mut *self.sent.borrow_mut())
    }

    pub fn clicks(&self) -> Vec<ClickEvent> {
        self.sent
            .borrow()
            .iter()
            .filter_map(|m| match m {
                ComponentMessage::SetComponentValue { value, .. } => Some(value.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn frame_heights(&self) -> Vec<u32> {
        self.sent
            .borrow()
            .iter()
            .filter_map(|m| match m {
                ComponentMessage::SetFrameHeight { height } => Some(*height),
                _ => None,
            })
            .collect()
    }
}

impl HostBridge for RecordingBridge {
    fn send(&self, message: &ComponentMessage) -> Result<()> {
        self.sent.borrow_mut().push(message.clone());
        Ok(())
    }
}

// ============================================================================
// Inbound
// ============================================================================

/// Arguments the host passes with each render
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderArgs {
    /// JSON-encoded `ThreatDataset`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threat_data: Option<Value>,
    /// Already-decoded `ThreatDataset`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Desired frame height in pixels
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

/// Payload located in the render arguments, not yet decoded
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Payload<'a> {
    Json(&'a str),
    Value(&'a Value),
}

impl Payload<'_> {
    pub fn decode(self) -> Result<ThreatDataset> {
        match self {
            Payload::Json(raw) => ThreatDataset::from_json(raw),
            Payload::Value(value) => ThreatDataset::from_value(value.clone()),
        }
    }
}

impl RenderArgs {
    /// Arguments as the dashboard-side wrapper builds them:
    /// the dataset serialized into `threatData` plus an optional height.
    pub fn from_dataset(dataset: &ThreatDataset, height: Option<u32>) -> Result<Self> {
        Ok(Self {
            threat_data: Some(Value::String(dataset.to_json()?)),
            data: None,
            height: height.map(f64::from),
        })
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// `threatData` wins over `data`; empty strings and nulls count as absent
    pub fn payload(&self) -> Option<Payload<'_>> {
        let present = |v: &&Value| match v {
            Value::Null => false,
            Value::String(s) => !s.trim().is_empty(),
            _ => true,
        };

        if let Some(v) = self.threat_data.as_ref().filter(present) {
            return Some(match v {
                Value::String(s) => Payload::Json(s),
                other => Payload::Value(other),
            });
        }
        self.data.as_ref().filter(present).map(|v| match v {
            Value::String(s) => Payload::Json(s),
            other => Payload::Value(other),
        })
    }
}

/// Messages received from the host page
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum HostMessage {
    #[serde(rename = "streamlit:render")]
    Render {
        #[serde(default)]
        args: RenderArgs,
        #[serde(default)]
        disabled: bool,
    },
    #[serde(other)]
    Other,
}

impl HostMessage {
    /// Interpret a raw `message` event payload. Anything that is not a
    /// host protocol message yields `None`.
    pub fn from_value(value: Value) -> Option<Self> {
        serde_json::from_value(value).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ready_wire_format() {
        let wire = ComponentMessage::ready().to_wire().unwrap();
        assert_eq!(
            wire,
            json!({"isStreamlitMessage": true, "type": "streamlit:componentReady", "apiVersion": 1})
        );
    }

    #[test]
    fn test_frame_height_wire_format() {
        let wire = ComponentMessage::frame_height(300).to_wire().unwrap();
        assert_eq!(
            wire,
            json!({"isStreamlitMessage": true, "type": "streamlit:setFrameHeight", "height": 300})
        );
    }

    #[test]
    fn test_component_value_wire_format() {
        let click = ClickEvent::country_clicked(&CountryRisk::new("Testland", 10.0, 20.0, 85.0, 4));
        let wire = ComponentMessage::component_value(click).to_wire().unwrap();
        assert_eq!(wire["type"], "streamlit:setComponentValue");
        assert_eq!(wire["dataType"], "json");
        assert_eq!(wire["value"]["event"], "country_clicked");
        assert_eq!(wire["value"]["country"], "Testland");
        assert_eq!(wire["value"]["risk"].as_f64(), Some(85.0));
        assert_eq!(wire["value"]["cves"], 4);
    }

    #[test]
    fn test_parse_render_message() {
        let msg = HostMessage::from_value(json!({
            "type": "streamlit:render",
            "args": {"threatData": "{\"countries\":[]}", "height": 300},
            "dfs": [],
            "disabled": false,
            "theme": {"base": "dark"}
        }))
        .unwrap();

        match msg {
            HostMessage::Render { args, disabled } => {
                assert!(!disabled);
                assert_eq!(args.height, Some(300.0));
                assert_eq!(args.payload(), Some(Payload::Json("{\"countries\":[]}")));
            }
            HostMessage::Other => panic!("expected render"),
        }
    }

    #[test]
    fn test_unknown_and_foreign_messages() {
        assert_eq!(
            HostMessage::from_value(json!({"type": "streamlit:somethingElse"})),
            Some(HostMessage::Other)
        );
        assert_eq!(HostMessage::from_value(json!({"hello": "world"})), None);
        assert_eq!(HostMessage::from_value(json!("webpack-ok")), None);
    }

    #[test]
    fn test_payload_precedence_and_absence() {
        let args = RenderArgs {
            threat_data: Some(json!("{\"countries\":[]}")),
            data: Some(json!({"countries": [{"name": "X", "lat": 0, "lon": 0, "risk": 1, "cves": 0}]})),
            height: None,
        };
        assert!(matches!(args.payload(), Some(Payload::Json(_))));

        let data_only = RenderArgs {
            threat_data: Some(json!("")),
            data: Some(json!({"countries": []})),
            height: None,
        };
        assert!(matches!(data_only.payload(), Some(Payload::Value(_))));

        assert_eq!(RenderArgs::default().payload(), None);
        let nulls = RenderArgs {
            threat_data: Some(Value::Null),
            data: Some(Value::Null),
            height: Some(300.0),
        };
        assert_eq!(nulls.payload(), None);
        let blank = RenderArgs {
            threat_data: Some(json!("   ")),
            ..Default::default()
        };
        assert_eq!(blank.payload(), None);
    }

    #[test]
    fn test_args_from_dataset() {
        let dataset = ThreatDataset {
            countries: vec![CountryRisk::new("Peru", -12.0, -77.0, 40.0, 2)],
        };
        let args = RenderArgs::from_dataset(&dataset, Some(600)).unwrap();
        assert_eq!(args.height, Some(600.0));
        let decoded = args.payload().unwrap().decode().unwrap();
        assert_eq!(decoded, dataset);

        let wire = serde_json::to_value(&args).unwrap();
        assert!(wire["threatData"].is_string());
        assert!(wire.get("data").is_none());
    }

    #[test]
    fn test_recording_bridge() {
        let bridge = RecordingBridge::new();
        bridge.send(&ComponentMessage::ready()).unwrap();
        bridge.send(&ComponentMessage::frame_height(520)).unwrap();
        assert_eq!(bridge.frame_heights(), vec![520]);
        assert!(bridge.clicks().is_empty());
        assert_eq!(bridge.take().len(), 2);
        assert!(bridge.messages().is_empty());
    }
}
