use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Map backend error: {0}")]
    Backend(String),
    #[error("Host bridge error: {0}")]
    Host(String),
    #[error("Invalid map config: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, RenderError>;
