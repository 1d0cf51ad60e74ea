//! # Documents
//!
//! Editable element trees registered by the builder. The preview renders
//! them; the prop controller lifecycle reads them to find which descriptors
//! apply to a mounted element.

mod operations;

pub use operations::*;

use crate::actions::Action;
use crate::modules::prop_controllers;
use livecanvas_common::{ComponentType, DocumentKey, ElementKey, PropName};
use livecanvas_prop_controllers::PropControllerDescriptors;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    pub key: ElementKey,
    #[serde(rename = "type")]
    pub component_type: ComponentType,
    #[serde(default)]
    pub props: BTreeMap<PropName, serde_json::Value>,
    #[serde(default)]
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(key: impl Into<ElementKey>, component_type: impl Into<ComponentType>) -> Self {
        Self {
            key: key.into(),
            component_type: component_type.into(),
            props: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    pub fn with_prop(mut self, name: impl Into<PropName>, value: serde_json::Value) -> Self {
        self.props.insert(name.into(), value);
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    /// Depth-first search, including `self`
    pub fn find(&self, key: &str) -> Option<&Element> {
        if self.key == key {
            return Some(self);
        }

        self.children.iter().find_map(|child| child.find(key))
    }

    pub fn find_mut(&mut self, key: &str) -> Option<&mut Element> {
        if self.key == key {
            return Some(self);
        }

        self.children.iter_mut().find_map(|child| child.find_mut(key))
    }

    /// Detach a descendant (never `self`) and return it
    pub fn remove_descendant(&mut self, key: &str) -> Option<Element> {
        if let Some(pos) = self.children.iter().position(|child| child.key == key) {
            return Some(self.children.remove(pos));
        }

        self.children
            .iter_mut()
            .find_map(|child| child.remove_descendant(key))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.find(key).is_some()
    }

    /// Keys of this element and every descendant
    pub fn keys(&self) -> Vec<ElementKey> {
        let mut keys = vec![self.key.clone()];
        for child in &self.children {
            keys.extend(child.keys());
        }
        keys
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub key: DocumentKey,
    pub root_element: Element,
}

impl Document {
    pub fn new(key: impl Into<DocumentKey>, root_element: Element) -> Self {
        Self {
            key: key.into(),
            root_element,
        }
    }

    pub fn find_element(&self, key: &str) -> Option<&Element> {
        self.root_element.find(key)
    }

    pub fn find_element_mut(&mut self, key: &str) -> Option<&mut Element> {
        self.root_element.find_mut(key)
    }
}

pub type DocumentsState = BTreeMap<DocumentKey, Document>;

pub fn reducer(state: &mut DocumentsState, action: &Action) {
    match action {
        Action::RegisterDocument { document } => {
            state.insert(document.key.clone(), document.clone());
        }

        Action::UnregisterDocument { document_key } => {
            state.remove(document_key);
        }

        Action::ChangeDocument {
            document_key,
            operation,
        } => {
            let Some(document) = state.get_mut(document_key) else {
                warn!(%document_key, "change for unknown document");
                return;
            };

            if let Err(error) = operation.apply(document) {
                warn!(%document_key, %error, "rejected document operation");
            }
        }

        _ => {}
    }
}

pub fn get_document<'a>(state: &'a DocumentsState, document_key: &str) -> Option<&'a Document> {
    state.get(document_key)
}

pub fn get_element<'a>(
    state: &'a DocumentsState,
    document_key: &str,
    element_key: &str,
) -> Option<&'a Element> {
    get_document(state, document_key)?.find_element(element_key)
}

/// Descriptors for an element, looked up through its component type
pub fn get_element_prop_controller_descriptors<'a>(
    documents: &DocumentsState,
    descriptors: &'a prop_controllers::PropControllersState,
    document_key: &str,
    element_key: &str,
) -> Option<&'a PropControllerDescriptors> {
    let element = get_element(documents, document_key, element_key)?;
    prop_controllers::get_component_prop_controller_descriptors(
        descriptors,
        &element.component_type,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn page() -> Document {
        Document::new(
            "doc1",
            Element::new("root", "Root")
                .with_child(Element::new("e1", "Text").with_prop("text", json!("Hello")))
                .with_child(Element::new("box", "Box").with_child(Element::new("e2", "Button"))),
        )
    }

    #[test]
    fn test_find_element() {
        let document = page();

        assert_eq!(document.find_element("e2").unwrap().component_type, "Button");
        assert_eq!(document.find_element("root").unwrap().key, "root");
        assert!(document.find_element("missing").is_none());
    }

    #[test]
    fn test_document_wire_shape() {
        let document = Document::new("doc1", Element::new("root", "Root"));

        assert_eq!(
            serde_json::to_value(&document).unwrap(),
            json!({
                "key": "doc1",
                "rootElement": { "key": "root", "type": "Root", "props": {}, "children": [] }
            })
        );

        let parsed: Document = serde_json::from_value(json!({
            "key": "doc1",
            "rootElement": { "key": "root", "type": "Root" }
        }))
        .unwrap();
        assert_eq!(parsed, document);
    }

    #[test]
    fn test_reducer_registers_and_changes() {
        let mut state = DocumentsState::new();
        reducer(&mut state, &Action::RegisterDocument { document: page() });

        reducer(
            &mut state,
            &Action::ChangeDocument {
                document_key: "doc1".to_string(),
                operation: Operation::SetProp {
                    element_key: "e1".to_string(),
                    prop_name: "text".to_string(),
                    value: json!("Bye"),
                },
            },
        );

        assert_eq!(
            get_element(&state, "doc1", "e1").unwrap().props["text"],
            json!("Bye")
        );

        reducer(
            &mut state,
            &Action::UnregisterDocument {
                document_key: "doc1".to_string(),
            },
        );
        assert!(state.is_empty());
    }

    #[test]
    fn test_rejected_operation_leaves_document_unchanged() {
        let mut state = DocumentsState::new();
        reducer(&mut state, &Action::RegisterDocument { document: page() });
        let before = state.clone();

        reducer(
            &mut state,
            &Action::ChangeDocument {
                document_key: "doc1".to_string(),
                operation: Operation::RemoveElement {
                    element_key: "missing".to_string(),
                },
            },
        );

        assert_eq!(state, before);
    }
}
