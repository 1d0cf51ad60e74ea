//! # Prop Controller Descriptors
//!
//! A descriptor says what kind of editable prop a component exposes. Component
//! types register a map of `propName → descriptor`; the store instantiates one
//! controller per entry when an element of that type mounts.
//!
//! Descriptors and prop values arrive from the builder as JSON. Unknown
//! descriptor types or link kinds are input-validation failures and are
//! reported as errors, never coerced into a fallback.

use crate::{PropControllerError, PropControllerResult};
use livecanvas_common::PropName;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Descriptors keyed by prop name
pub type PropControllerDescriptors = BTreeMap<PropName, PropControllerDescriptor>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PropControllerDescriptor {
    Checkbox {
        #[serde(default)]
        options: FieldOptions,
    },

    Color {
        #[serde(default)]
        options: FieldOptions,
    },

    #[serde(rename = "ElementID")]
    ElementId {
        #[serde(default)]
        options: FieldOptions,
    },

    Link {
        #[serde(default)]
        options: FieldOptions,
    },

    Margin {
        #[serde(default)]
        options: FieldOptions,
    },

    Number {
        #[serde(default)]
        options: NumberOptions,
    },

    RichText {
        #[serde(default)]
        options: RichTextOptions,
    },

    TextArea {
        #[serde(default)]
        options: TextAreaOptions,
    },

    TextInput {
        #[serde(default)]
        options: FieldOptions,
    },

    Width {
        #[serde(default)]
        options: FieldOptions,
    },
}

impl PropControllerDescriptor {
    pub fn from_value(value: serde_json::Value) -> PropControllerResult<Self> {
        serde_json::from_value(value).map_err(PropControllerError::InvalidDescriptor)
    }

    pub fn rich_text() -> Self {
        PropControllerDescriptor::RichText {
            options: RichTextOptions::default(),
        }
    }

    pub fn text_input() -> Self {
        PropControllerDescriptor::TextInput {
            options: FieldOptions::default(),
        }
    }

    pub fn link() -> Self {
        PropControllerDescriptor::Link {
            options: FieldOptions::default(),
        }
    }

    /// Name used on the wire (`"RichText"`, `"ElementID"`, ...)
    pub fn type_name(&self) -> &'static str {
        match self {
            PropControllerDescriptor::Checkbox { .. } => "Checkbox",
            PropControllerDescriptor::Color { .. } => "Color",
            PropControllerDescriptor::ElementId { .. } => "ElementID",
            PropControllerDescriptor::Link { .. } => "Link",
            PropControllerDescriptor::Margin { .. } => "Margin",
            PropControllerDescriptor::Number { .. } => "Number",
            PropControllerDescriptor::RichText { .. } => "RichText",
            PropControllerDescriptor::TextArea { .. } => "TextArea",
            PropControllerDescriptor::TextInput { .. } => "TextInput",
            PropControllerDescriptor::Width { .. } => "Width",
        }
    }
}

/// Parse a full `propName → descriptor` map
pub fn descriptors_from_value(
    value: serde_json::Value,
) -> PropControllerResult<PropControllerDescriptors> {
    serde_json::from_value(value).map_err(PropControllerError::InvalidDescriptor)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FieldOptions {
    pub label: Option<String>,
    pub hidden: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NumberOptions {
    pub label: Option<String>,
    pub default_value: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub step: Option<f64>,
    pub suffix: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RichTextOptions {
    pub placeholder: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextAreaOptions {
    pub label: Option<String>,
    pub rows: Option<u32>,
}

/// Value of a `Link` prop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    content = "payload",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum LinkValue {
    OpenPage {
        page_id: Option<String>,
        #[serde(default)]
        open_in_new_tab: bool,
    },

    OpenUrl {
        url: String,
        #[serde(default)]
        open_in_new_tab: bool,
    },

    SendEmail {
        to: Option<String>,
        subject: Option<String>,
        body: Option<String>,
    },

    CallPhone {
        phone_number: String,
    },

    ScrollToElement {
        element_id_config: Option<ElementIdConfig>,
        block: Option<ScrollBlock>,
    },
}

impl LinkValue {
    pub fn from_value(value: serde_json::Value) -> PropControllerResult<Self> {
        serde_json::from_value(value).map_err(PropControllerError::InvalidLink)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementIdConfig {
    pub element_key: String,
    pub prop_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollBlock {
    Start,
    Center,
    End,
}
