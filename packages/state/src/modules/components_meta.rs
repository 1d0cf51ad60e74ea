//! Metadata of registered component types, shown by the builder's panels.

use crate::actions::Action;
use livecanvas_common::ComponentType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentMeta {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default)]
    pub hidden: bool,
}

impl ComponentMeta {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }
}

pub type ComponentsMetaState = BTreeMap<ComponentType, ComponentMeta>;

pub fn reducer(state: &mut ComponentsMetaState, action: &Action) {
    match action {
        Action::RegisterComponent {
            component_type,
            meta,
            ..
        } => {
            state.insert(component_type.clone(), meta.clone());
        }

        Action::UnregisterComponent { component_type } => {
            state.remove(component_type);
        }

        _ => {}
    }
}
