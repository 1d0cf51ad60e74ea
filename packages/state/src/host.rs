//! # Host Mirror
//!
//! Builder-side end of the channel. It adopts the endpoint the preview handed
//! off and keeps a mirror of what the preview reported: registered component
//! types, mounted elements, box models, the document element size and the
//! prop controller messages addressed to the builder.

use crate::actions::{ChangedBoxModels, Message};
use crate::measure::Size;
use crate::modules::box_models::BoxModel;
use crate::modules::components_meta::ComponentMeta;
use crate::modules::documents::{Document, Operation};
use crate::transport::{MessagePort, TransportResult};
use livecanvas_common::{ComponentType, DocumentKey, ElementKey, ElementRef, PropRef};
use livecanvas_prop_controllers::{PropControllerDescriptors, PropControllerMessage};
use std::cell::{Ref, RefCell};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::rc::Rc;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct RegisteredComponent {
    pub meta: ComponentMeta,
    pub prop_controller_descriptors: PropControllerDescriptors,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HostState {
    pub components: BTreeMap<ComponentType, RegisteredComponent>,
    pub mounted: BTreeSet<ElementRef>,
    pub box_models: BTreeMap<ElementKey, BoxModel>,
    pub document_element_size: Option<Size>,
    pub prop_controller_messages: Vec<(PropRef, PropControllerMessage)>,
}

impl HostState {
    fn apply_box_models(&mut self, changed: ChangedBoxModels) {
        for (element_key, box_model) in changed {
            match box_model {
                Some(box_model) => {
                    self.box_models.insert(element_key, box_model);
                }
                None => {
                    self.box_models.remove(&element_key);
                }
            }
        }
    }

    fn apply(&mut self, message: Message) {
        match message {
            Message::RegisterComponent {
                component_type,
                meta,
                prop_controller_descriptors,
            } => {
                self.components.insert(
                    component_type,
                    RegisteredComponent {
                        meta,
                        prop_controller_descriptors,
                    },
                );
            }
            Message::UnregisterComponent { component_type } => {
                self.components.remove(&component_type);
            }
            Message::MountComponent {
                document_key,
                element_key,
            } => {
                self.mounted.insert(ElementRef::new(document_key, element_key));
            }
            Message::UnmountComponent {
                document_key,
                element_key,
            } => {
                self.mounted.remove(&ElementRef::new(document_key, element_key));
            }
            Message::ChangeElementBoxModels {
                changed_element_box_models,
            } => self.apply_box_models(changed_element_box_models),
            Message::ChangeDocumentElementSize { size } => {
                self.document_element_size = Some(size);
            }
            Message::MessageBuilderPropController {
                document_key,
                element_key,
                prop_name,
                message,
            } => {
                self.prop_controller_messages
                    .push((PropRef::new(document_key, element_key, prop_name), message));
            }
            other => debug!(message = %other.action_type(), "ignoring preview-bound message"),
        }
    }
}

pub struct HostMirror {
    port: Rc<dyn MessagePort>,
    state: Rc<RefCell<HostState>>,
}

impl HostMirror {
    /// Take over a handed-off endpoint
    pub fn adopt(port: Rc<dyn MessagePort>) -> Self {
        let state = Rc::new(RefCell::new(HostState::default()));

        let sink = state.clone();
        port.set_message_handler(Box::new(move |message| {
            sink.borrow_mut().apply(message);
        }));

        Self { port, state }
    }

    pub fn state(&self) -> Ref<'_, HostState> {
        self.state.borrow()
    }

    pub fn is_mounted(&self, element: &ElementRef) -> bool {
        self.state.borrow().mounted.contains(element)
    }

    /// Drain the prop controller messages received so far
    pub fn take_prop_controller_messages(&self) -> Vec<(PropRef, PropControllerMessage)> {
        std::mem::take(&mut self.state.borrow_mut().prop_controller_messages)
    }

    pub fn message_prop_controller(
        &self,
        prop: &PropRef,
        message: PropControllerMessage,
    ) -> TransportResult<()> {
        self.port.post_message(&Message::MessageHostPropController {
            document_key: prop.document_key.clone(),
            element_key: prop.element_key.clone(),
            prop_name: prop.prop_name.clone(),
            message,
        })
    }

    pub fn scroll_to(&self, scroll_top: f64) -> TransportResult<()> {
        self.port
            .post_message(&Message::ChangeDocumentElementScrollTop { scroll_top })
    }

    pub fn register_document(&self, document: Document) -> TransportResult<()> {
        self.port.post_message(&Message::RegisterDocument { document })
    }

    pub fn unregister_document(&self, document_key: impl Into<DocumentKey>) -> TransportResult<()> {
        self.port.post_message(&Message::UnregisterDocument {
            document_key: document_key.into(),
        })
    }

    pub fn change_document(
        &self,
        document_key: impl Into<DocumentKey>,
        operation: Operation,
    ) -> TransportResult<()> {
        self.port.post_message(&Message::ChangeDocument {
            document_key: document_key.into(),
            operation,
        })
    }
}

impl fmt::Debug for HostMirror {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostMirror")
            .field("state", &self.state.borrow())
            .finish_non_exhaustive()
    }
}
