//! Threat Map Tooling
//!
//! Works on the same payloads the browser component receives:
//! - `loader`: read datasets, render arguments or raw host messages
//! - `export`: GeoJSON feature collections for GIS tools
//! - `dry_run`: drive the renderer in memory and capture host traffic

use thiserror::Error;
use threat_map_wasm::RenderError;

pub mod dry_run;
pub mod export;
pub mod loader;

/// Height the dashboard-side wrapper sends when the caller gives none
pub const WRAPPER_DEFAULT_HEIGHT: u32 = 600;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("Unsupported host message: {0}")]
    UnsupportedMessage(String),
    #[error("Input is not a JSON object")]
    NotAnObject,
}

pub type Result<T> = std::result::Result<T, CliError>;
