//! # Canvas Configuration
//!
//! Runtime options for one preview instance. Every field has a default, so an
//! empty JSON object (or no config at all) yields a working setup.

use crate::CommonResult;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Quiet period after the last local edit before prop data is committed again
pub const DEFAULT_COMMIT_DEBOUNCE_MS: u64 = 500;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CanvasConfig {
    /// Whether the preview is rendered inside the builder (editable) or standalone
    pub is_in_builder: bool,

    /// Debounce delay for rich-text commits, in milliseconds
    pub commit_debounce_ms: u64,

    /// Origin passed when handing the channel endpoint to the parent window
    pub target_origin: String,

    /// Track the document element size alongside element box models
    pub measure_document_element: bool,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            is_in_builder: true,
            commit_debounce_ms: DEFAULT_COMMIT_DEBOUNCE_MS,
            target_origin: "*".to_string(),
            measure_document_element: true,
        }
    }
}

impl CanvasConfig {
    pub fn from_json(source: &str) -> CommonResult<Self> {
        Ok(serde_json::from_str(source)?)
    }

    pub fn from_value(value: serde_json::Value) -> CommonResult<Self> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn commit_debounce(&self) -> Duration {
        Duration::from_millis(self.commit_debounce_ms)
    }
}
