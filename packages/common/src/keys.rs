//! Identifiers shared between the preview store and the builder.
//!
//! Element keys are unique within a document, and every controller is
//! addressed by the `(document, element, prop)` triple.

use serde::{Deserialize, Serialize};
use std::fmt;

pub type DocumentKey = String;
pub type ElementKey = String;
pub type PropName = String;
pub type ComponentType = String;

/// A rendered element inside a particular document
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementRef {
    pub document_key: DocumentKey,
    pub element_key: ElementKey,
}

impl ElementRef {
    pub fn new(document_key: impl Into<DocumentKey>, element_key: impl Into<ElementKey>) -> Self {
        Self {
            document_key: document_key.into(),
            element_key: element_key.into(),
        }
    }

    /// Address one prop of this element
    pub fn prop(&self, prop_name: impl Into<PropName>) -> PropRef {
        PropRef {
            document_key: self.document_key.clone(),
            element_key: self.element_key.clone(),
            prop_name: prop_name.into(),
        }
    }
}

impl fmt::Display for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.document_key, self.element_key)
    }
}

/// The `(documentKey, elementKey, propName)` triple a prop controller is bound to
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropRef {
    pub document_key: DocumentKey,
    pub element_key: ElementKey,
    pub prop_name: PropName,
}

impl PropRef {
    pub fn new(
        document_key: impl Into<DocumentKey>,
        element_key: impl Into<ElementKey>,
        prop_name: impl Into<PropName>,
    ) -> Self {
        Self {
            document_key: document_key.into(),
            element_key: element_key.into(),
            prop_name: prop_name.into(),
        }
    }

    pub fn element(&self) -> ElementRef {
        ElementRef::new(self.document_key.clone(), self.element_key.clone())
    }
}

impl fmt::Display for PropRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}#{}", self.document_key, self.element_key, self.prop_name)
    }
}
