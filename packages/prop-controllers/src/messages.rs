//! Messages exchanged between a prop controller and the builder.
//!
//! The transport treats these as opaque payloads inside the
//! `{ documentKey, elementKey, propName, message }` envelope.

use crate::{PropControllerError, PropControllerResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BuilderEditMode {
    #[default]
    Build,
    Content,
    Interact,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    content = "payload",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum PropControllerMessage {
    /// Builder → preview: the builder switched editing modes
    ChangeBuilderEditMode { edit_mode: BuilderEditMode },

    /// Preview → builder: an editor attached and reports its starting value
    InitializeEditor { value: serde_json::Value },

    /// Preview → builder: the user edited the value locally
    ChangeEditorValue { value: serde_json::Value },

    Focus,
    Blur,
    Undo,
    Redo,
}

impl PropControllerMessage {
    pub fn from_value(value: serde_json::Value) -> PropControllerResult<Self> {
        serde_json::from_value(value).map_err(PropControllerError::InvalidMessage)
    }
}
