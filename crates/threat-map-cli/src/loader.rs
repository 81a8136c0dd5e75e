//! Input loading
//!
//! Accepts a file path or `-` for stdin. The `render` command takes any
//! of three shapes and tells them apart by their keys:
//! - host message: has `type`
//! - render arguments: has `threatData` or `data`
//! - bare dataset: anything else

use std::fs;
use std::io::Read;
use std::path::Path;

use serde_json::Value;
use threat_map_wasm::{HostMessage, MapConfig, RenderArgs, ThreatDataset};
use tracing::{debug, info};

use crate::{CliError, Result};

/// Read a whole file, or stdin when `path` is `-`
pub fn read_source(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        debug!("Read {} bytes from stdin", buf.len());
        return Ok(buf);
    }
    let raw = fs::read_to_string(path)?;
    debug!("Read {} bytes from {:?}", raw.len(), path);
    Ok(raw)
}

pub fn load_dataset(path: &Path) -> Result<ThreatDataset> {
    let dataset = ThreatDataset::from_json(&read_source(path)?)?;
    info!("Loaded {} countries from {:?}", dataset.len(), path);
    Ok(dataset)
}

/// Map config from a JSON file, or the defaults
pub fn load_config(path: Option<&Path>) -> Result<MapConfig> {
    match path {
        Some(path) => {
            let config = MapConfig::from_json(&fs::read_to_string(path)?)?;
            info!("Loaded map config from {:?}", path);
            Ok(config)
        }
        None => Ok(MapConfig::default()),
    }
}

/// Render arguments found in an input document
pub fn render_args_from(raw: &str) -> Result<RenderArgs> {
    let value: Value = serde_json::from_str(raw)?;
    let object = value.as_object().ok_or(CliError::NotAnObject)?;

    if let Some(kind) = object.get("type") {
        return match HostMessage::from_value(value.clone()) {
            Some(HostMessage::Render { args, .. }) => Ok(args),
            _ => Err(CliError::UnsupportedMessage(kind.to_string())),
        };
    }

    if object.contains_key("threatData") || object.contains_key("data") {
        return Ok(serde_json::from_value(value)?);
    }

    // bare dataset: wrap it the way the dashboard wrapper does
    Ok(RenderArgs {
        threat_data: Some(Value::String(raw.to_string())),
        data: None,
        height: None,
    })
}
