//! # Document Operations
//!
//! Structural edits the builder sends with `CHANGE_DOCUMENT`.
//!
//! ## Semantics
//!
//! - Every operation is validated against the document before it is applied,
//!   so a rejected operation never leaves a half-applied tree.
//! - Insert and move indices are clamped to the child count.
//! - Removing an element removes its whole subtree.
//! - The root element can be edited but never removed or moved.

use super::{Document, Element};
use livecanvas_common::{ElementKey, PropName};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    content = "payload",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum Operation {
    /// Replace one prop value
    SetProp {
        element_key: ElementKey,
        prop_name: PropName,
        value: serde_json::Value,
    },

    RemoveProp {
        element_key: ElementKey,
        prop_name: PropName,
    },

    InsertElement {
        parent_key: ElementKey,
        index: usize,
        element: Element,
    },

    RemoveElement {
        element_key: ElementKey,
    },

    MoveElement {
        element_key: ElementKey,
        new_parent_key: ElementKey,
        index: usize,
    },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum OperationError {
    #[error("Element not found: {0}")]
    ElementNotFound(ElementKey),

    #[error("Parent not found: {0}")]
    ParentNotFound(ElementKey),

    #[error("Would create cycle")]
    CycleDetected,

    #[error("Cannot remove or move the root element")]
    CannotRemoveRoot,

    #[error("Duplicate element key: {0}")]
    DuplicateKey(ElementKey),
}

pub type OperationResult<T> = Result<T, OperationError>;

impl Operation {
    /// Apply the operation with validation
    pub fn apply(&self, doc: &mut Document) -> OperationResult<()> {
        self.validate(doc)?;

        match self {
            Operation::SetProp {
                element_key,
                prop_name,
                value,
            } => {
                let element = find_mut(doc, element_key)?;
                element.props.insert(prop_name.clone(), value.clone());
                Ok(())
            }

            Operation::RemoveProp {
                element_key,
                prop_name,
            } => {
                let element = find_mut(doc, element_key)?;
                element.props.remove(prop_name);
                Ok(())
            }

            Operation::InsertElement {
                parent_key,
                index,
                element,
            } => Self::insert(doc, parent_key, *index, element.clone()),

            Operation::RemoveElement { element_key } => {
                doc.root_element
                    .remove_descendant(element_key)
                    .ok_or_else(|| OperationError::ElementNotFound(element_key.clone()))?;
                Ok(())
            }

            Operation::MoveElement {
                element_key,
                new_parent_key,
                index,
            } => {
                let element = doc
                    .root_element
                    .remove_descendant(element_key)
                    .ok_or_else(|| OperationError::ElementNotFound(element_key.clone()))?;
                Self::insert(doc, new_parent_key, *index, element)
            }
        }
    }

    fn insert(
        doc: &mut Document,
        parent_key: &str,
        index: usize,
        element: Element,
    ) -> OperationResult<()> {
        let parent = doc
            .find_element_mut(parent_key)
            .ok_or_else(|| OperationError::ParentNotFound(parent_key.to_string()))?;

        let index = index.min(parent.children.len());
        parent.children.insert(index, element);
        Ok(())
    }

    /// Validate without applying
    pub fn validate(&self, doc: &Document) -> OperationResult<()> {
        match self {
            Operation::SetProp { element_key, .. } | Operation::RemoveProp { element_key, .. } => {
                find(doc, element_key)?;
                Ok(())
            }

            Operation::InsertElement {
                parent_key,
                element,
                ..
            } => {
                doc.find_element(parent_key)
                    .ok_or_else(|| OperationError::ParentNotFound(parent_key.clone()))?;

                let mut seen = std::collections::BTreeSet::new();
                for key in element.keys() {
                    if doc.find_element(&key).is_some() || !seen.insert(key.clone()) {
                        return Err(OperationError::DuplicateKey(key));
                    }
                }

                Ok(())
            }

            Operation::RemoveElement { element_key } => {
                if doc.root_element.key == *element_key {
                    return Err(OperationError::CannotRemoveRoot);
                }
                find(doc, element_key)?;
                Ok(())
            }

            Operation::MoveElement {
                element_key,
                new_parent_key,
                ..
            } => {
                if doc.root_element.key == *element_key {
                    return Err(OperationError::CannotRemoveRoot);
                }

                let element = find(doc, element_key)?;
                doc.find_element(new_parent_key)
                    .ok_or_else(|| OperationError::ParentNotFound(new_parent_key.clone()))?;

                if element.contains(new_parent_key) {
                    return Err(OperationError::CycleDetected);
                }

                Ok(())
            }
        }
    }
}

fn find<'a>(doc: &'a Document, element_key: &str) -> OperationResult<&'a Element> {
    doc.find_element(element_key)
        .ok_or_else(|| OperationError::ElementNotFound(element_key.to_string()))
}

fn find_mut<'a>(doc: &'a mut Document, element_key: &str) -> OperationResult<&'a mut Element> {
    doc.find_element_mut(element_key)
        .ok_or_else(|| OperationError::ElementNotFound(element_key.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc() -> Document {
        Document::new(
            "doc1",
            Element::new("root", "Root")
                .with_child(Element::new("a", "Box").with_child(Element::new("a1", "Text")))
                .with_child(Element::new("b", "Box")),
        )
    }

    fn child_keys(element: &Element) -> Vec<&str> {
        element.children.iter().map(|child| child.key.as_str()).collect()
    }

    #[test]
    fn test_set_and_remove_prop() {
        let mut doc = doc();

        Operation::SetProp {
            element_key: "a1".to_string(),
            prop_name: "text".to_string(),
            value: json!("Hi"),
        }
        .apply(&mut doc)
        .unwrap();
        assert_eq!(doc.find_element("a1").unwrap().props["text"], json!("Hi"));

        Operation::RemoveProp {
            element_key: "a1".to_string(),
            prop_name: "text".to_string(),
        }
        .apply(&mut doc)
        .unwrap();
        assert!(doc.find_element("a1").unwrap().props.is_empty());
    }

    #[test]
    fn test_insert_clamps_index() {
        let mut doc = doc();

        Operation::InsertElement {
            parent_key: "root".to_string(),
            index: 99,
            element: Element::new("c", "Box"),
        }
        .apply(&mut doc)
        .unwrap();

        assert_eq!(child_keys(&doc.root_element), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_insert_rejects_duplicate_keys() {
        let mut doc = doc();

        let result = Operation::InsertElement {
            parent_key: "b".to_string(),
            index: 0,
            element: Element::new("new", "Box").with_child(Element::new("a1", "Text")),
        }
        .apply(&mut doc);

        assert_eq!(result, Err(OperationError::DuplicateKey("a1".to_string())));
        assert!(doc.find_element("new").is_none());
    }

    #[test]
    fn test_move_element() {
        let mut doc = doc();

        Operation::MoveElement {
            element_key: "a1".to_string(),
            new_parent_key: "b".to_string(),
            index: 0,
        }
        .apply(&mut doc)
        .unwrap();

        assert!(doc.find_element("a").unwrap().children.is_empty());
        assert_eq!(child_keys(doc.find_element("b").unwrap()), vec!["a1"]);
    }

    #[test]
    fn test_move_into_own_subtree_is_cycle() {
        let mut doc = doc();
        let before = doc.clone();

        let result = Operation::MoveElement {
            element_key: "a".to_string(),
            new_parent_key: "a1".to_string(),
            index: 0,
        }
        .apply(&mut doc);

        assert_eq!(result, Err(OperationError::CycleDetected));
        assert_eq!(doc, before);
    }

    #[test]
    fn test_move_to_missing_parent_keeps_element() {
        let mut doc = doc();

        let result = Operation::MoveElement {
            element_key: "a1".to_string(),
            new_parent_key: "missing".to_string(),
            index: 0,
        }
        .apply(&mut doc);

        assert_eq!(result, Err(OperationError::ParentNotFound("missing".to_string())));
        assert!(doc.find_element("a1").is_some());
    }

    #[test]
    fn test_root_cannot_be_removed() {
        let mut doc = doc();

        let result = Operation::RemoveElement {
            element_key: "root".to_string(),
        }
        .apply(&mut doc);

        assert_eq!(result, Err(OperationError::CannotRemoveRoot));
    }

    #[test]
    fn test_remove_element_takes_subtree() {
        let mut doc = doc();

        Operation::RemoveElement {
            element_key: "a".to_string(),
        }
        .apply(&mut doc)
        .unwrap();

        assert!(doc.find_element("a1").is_none());
        assert_eq!(child_keys(&doc.root_element), vec!["b"]);
    }

    #[test]
    fn test_operation_wire_shape() {
        let operation: Operation = serde_json::from_value(json!({
            "type": "MOVE_ELEMENT",
            "payload": { "elementKey": "a1", "newParentKey": "b", "index": 0 }
        }))
        .unwrap();

        assert_eq!(
            operation,
            Operation::MoveElement {
                element_key: "a1".to_string(),
                new_parent_key: "b".to_string(),
                index: 0,
            }
        );
    }
}
