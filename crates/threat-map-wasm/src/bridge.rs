//! `postMessage` host bridge
//!
//! The component runs inside an iframe; the dashboard listens on the
//! parent window for objects flagged `isStreamlitMessage`.

use web_sys::Window;

use crate::host::{ComponentMessage, HostBridge};
use crate::js::{describe, to_js};
use crate::{RenderError, Result};

pub struct PostMessageBridge {
    target: Window,
    target_origin: String,
}

impl PostMessageBridge {
    /// Post to the parent frame, or to our own window when not framed
    pub fn to_parent() -> Result<Self> {
        let window = web_sys::window()
            .ok_or_else(|| RenderError::Host("no window available".to_string()))?;
        let target = window
            .parent()
            .map_err(|e| RenderError::Host(describe(&e)))?
            .unwrap_or(window);

        Ok(Self {
            target,
            target_origin: "*".to_string(),
        })
    }
}

impl HostBridge for PostMessageBridge {
    fn send(&self, message: &ComponentMessage) -> Result<()> {
        let wire = to_js(&message.to_wire()?)?;
        self.target
            .post_message(&wire, &self.target_origin)
            .map_err(|e| RenderError::Host(describe(&e)))
    }
}
