//! # Actions
//!
//! Everything that changes the store goes through an [`Action`]. A subset of
//! actions is serializable and crosses the builder/preview boundary as a
//! [`Message`]; the rest carry live handles (`Rc`) and stay local.
//!
//! ## Wire format
//!
//! ```json
//! { "type": "MOUNT_COMPONENT", "payload": { "documentKey": "doc1", "elementKey": "e1" } }
//! ```
//!
//! The set of action types forwarded to the builder is [`FORWARDED_ACTION_TYPES`].
//! Adding a new synchronized action means adding a [`Message`] variant and
//! listing its type there.

use crate::handle::ComponentHandleRef;
use crate::measure::Size;
use crate::modules::box_models::BoxModel;
use crate::modules::components_meta::ComponentMeta;
use crate::modules::documents::{Document, Operation};
use livecanvas_common::{ComponentType, DocumentKey, ElementKey, ElementRef, PropName, PropRef};
use livecanvas_prop_controllers::{
    PropControllerDescriptors, PropControllerMessage, PropControllers,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Element box models that changed in one measurement pass. `None` means the
/// element no longer has geometry.
pub type ChangedBoxModels = BTreeMap<ElementKey, Option<BoxModel>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionType {
    RegisterDocument,
    UnregisterDocument,
    ChangeDocument,
    MountComponent,
    UnmountComponent,
    RegisterComponentHandle,
    UnregisterComponentHandle,
    RegisterMeasurable,
    UnregisterMeasurable,
    ChangeElementBoxModels,
    ChangeDocumentElementSize,
    ChangeDocumentElementScrollTop,
    RegisterComponent,
    UnregisterComponent,
    RegisterPropControllersHandle,
    RegisterPropControllers,
    UnregisterPropControllers,
    MessageBuilderPropController,
    MessageHostPropController,
}

/// Action types the transport forwards from the preview to the builder
pub const FORWARDED_ACTION_TYPES: &[ActionType] = &[
    ActionType::ChangeElementBoxModels,
    ActionType::MountComponent,
    ActionType::UnmountComponent,
    ActionType::RegisterComponent,
    ActionType::UnregisterComponent,
    ActionType::ChangeDocumentElementSize,
    ActionType::MessageBuilderPropController,
];

impl ActionType {
    pub fn is_forwarded(self) -> bool {
        FORWARDED_ACTION_TYPES.contains(&self)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ActionType::RegisterDocument => "REGISTER_DOCUMENT",
            ActionType::UnregisterDocument => "UNREGISTER_DOCUMENT",
            ActionType::ChangeDocument => "CHANGE_DOCUMENT",
            ActionType::MountComponent => "MOUNT_COMPONENT",
            ActionType::UnmountComponent => "UNMOUNT_COMPONENT",
            ActionType::RegisterComponentHandle => "REGISTER_COMPONENT_HANDLE",
            ActionType::UnregisterComponentHandle => "UNREGISTER_COMPONENT_HANDLE",
            ActionType::RegisterMeasurable => "REGISTER_MEASURABLE",
            ActionType::UnregisterMeasurable => "UNREGISTER_MEASURABLE",
            ActionType::ChangeElementBoxModels => "CHANGE_ELEMENT_BOX_MODELS",
            ActionType::ChangeDocumentElementSize => "CHANGE_DOCUMENT_ELEMENT_SIZE",
            ActionType::ChangeDocumentElementScrollTop => "CHANGE_DOCUMENT_ELEMENT_SCROLL_TOP",
            ActionType::RegisterComponent => "REGISTER_COMPONENT",
            ActionType::UnregisterComponent => "UNREGISTER_COMPONENT",
            ActionType::RegisterPropControllersHandle => "REGISTER_PROP_CONTROLLERS_HANDLE",
            ActionType::RegisterPropControllers => "REGISTER_PROP_CONTROLLERS",
            ActionType::UnregisterPropControllers => "UNREGISTER_PROP_CONTROLLERS",
            ActionType::MessageBuilderPropController => "MESSAGE_BUILDER_PROP_CONTROLLER",
            ActionType::MessageHostPropController => "MESSAGE_HOST_PROP_CONTROLLER",
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub enum Action {
    RegisterDocument {
        document: Document,
    },
    UnregisterDocument {
        document_key: DocumentKey,
    },
    ChangeDocument {
        document_key: DocumentKey,
        operation: Operation,
    },
    MountComponent {
        document_key: DocumentKey,
        element_key: ElementKey,
    },
    UnmountComponent {
        document_key: DocumentKey,
        element_key: ElementKey,
    },
    RegisterComponentHandle {
        document_key: DocumentKey,
        element_key: ElementKey,
        component_handle: ComponentHandleRef,
    },
    UnregisterComponentHandle {
        document_key: DocumentKey,
        element_key: ElementKey,
    },
    RegisterMeasurable {
        document_key: DocumentKey,
        element_key: ElementKey,
        measurable: ComponentHandleRef,
    },
    UnregisterMeasurable {
        document_key: DocumentKey,
        element_key: ElementKey,
    },
    ChangeElementBoxModels {
        changed_element_box_models: ChangedBoxModels,
    },
    ChangeDocumentElementSize {
        size: Size,
    },
    ChangeDocumentElementScrollTop {
        scroll_top: f64,
    },
    RegisterComponent {
        component_type: ComponentType,
        meta: ComponentMeta,
        prop_controller_descriptors: PropControllerDescriptors,
    },
    UnregisterComponent {
        component_type: ComponentType,
    },
    RegisterPropControllersHandle {
        document_key: DocumentKey,
        element_key: ElementKey,
        handle: ComponentHandleRef,
    },
    RegisterPropControllers {
        document_key: DocumentKey,
        element_key: ElementKey,
        prop_controllers: PropControllers,
    },
    UnregisterPropControllers {
        document_key: DocumentKey,
        element_key: ElementKey,
    },
    MessageBuilderPropController {
        document_key: DocumentKey,
        element_key: ElementKey,
        prop_name: PropName,
        message: PropControllerMessage,
    },
    MessageHostPropController {
        document_key: DocumentKey,
        element_key: ElementKey,
        prop_name: PropName,
        message: PropControllerMessage,
    },
}

impl Action {
    pub fn action_type(&self) -> ActionType {
        match self {
            Action::RegisterDocument { .. } => ActionType::RegisterDocument,
            Action::UnregisterDocument { .. } => ActionType::UnregisterDocument,
            Action::ChangeDocument { .. } => ActionType::ChangeDocument,
            Action::MountComponent { .. } => ActionType::MountComponent,
            Action::UnmountComponent { .. } => ActionType::UnmountComponent,
            Action::RegisterComponentHandle { .. } => ActionType::RegisterComponentHandle,
            Action::UnregisterComponentHandle { .. } => ActionType::UnregisterComponentHandle,
            Action::RegisterMeasurable { .. } => ActionType::RegisterMeasurable,
            Action::UnregisterMeasurable { .. } => ActionType::UnregisterMeasurable,
            Action::ChangeElementBoxModels { .. } => ActionType::ChangeElementBoxModels,
            Action::ChangeDocumentElementSize { .. } => ActionType::ChangeDocumentElementSize,
            Action::ChangeDocumentElementScrollTop { .. } => {
                ActionType::ChangeDocumentElementScrollTop
            }
            Action::RegisterComponent { .. } => ActionType::RegisterComponent,
            Action::UnregisterComponent { .. } => ActionType::UnregisterComponent,
            Action::RegisterPropControllersHandle { .. } => {
                ActionType::RegisterPropControllersHandle
            }
            Action::RegisterPropControllers { .. } => ActionType::RegisterPropControllers,
            Action::UnregisterPropControllers { .. } => ActionType::UnregisterPropControllers,
            Action::MessageBuilderPropController { .. } => {
                ActionType::MessageBuilderPropController
            }
            Action::MessageHostPropController { .. } => ActionType::MessageHostPropController,
        }
    }

    /// Wire form of this action, if it can cross the boundary at all
    pub fn to_message(&self) -> Option<Message> {
        let message = match self {
            Action::RegisterDocument { document } => Message::RegisterDocument {
                document: document.clone(),
            },
            Action::UnregisterDocument { document_key } => Message::UnregisterDocument {
                document_key: document_key.clone(),
            },
            Action::ChangeDocument {
                document_key,
                operation,
            } => Message::ChangeDocument {
                document_key: document_key.clone(),
                operation: operation.clone(),
            },
            Action::MountComponent {
                document_key,
                element_key,
            } => Message::MountComponent {
                document_key: document_key.clone(),
                element_key: element_key.clone(),
            },
            Action::UnmountComponent {
                document_key,
                element_key,
            } => Message::UnmountComponent {
                document_key: document_key.clone(),
                element_key: element_key.clone(),
            },
            Action::ChangeElementBoxModels {
                changed_element_box_models,
            } => Message::ChangeElementBoxModels {
                changed_element_box_models: changed_element_box_models.clone(),
            },
            Action::ChangeDocumentElementSize { size } => {
                Message::ChangeDocumentElementSize { size: *size }
            }
            Action::ChangeDocumentElementScrollTop { scroll_top } => {
                Message::ChangeDocumentElementScrollTop {
                    scroll_top: *scroll_top,
                }
            }
            Action::RegisterComponent {
                component_type,
                meta,
                prop_controller_descriptors,
            } => Message::RegisterComponent {
                component_type: component_type.clone(),
                meta: meta.clone(),
                prop_controller_descriptors: prop_controller_descriptors.clone(),
            },
            Action::UnregisterComponent { component_type } => Message::UnregisterComponent {
                component_type: component_type.clone(),
            },
            Action::MessageBuilderPropController {
                document_key,
                element_key,
                prop_name,
                message,
            } => Message::MessageBuilderPropController {
                document_key: document_key.clone(),
                element_key: element_key.clone(),
                prop_name: prop_name.clone(),
                message: message.clone(),
            },
            Action::MessageHostPropController {
                document_key,
                element_key,
                prop_name,
                message,
            } => Message::MessageHostPropController {
                document_key: document_key.clone(),
                element_key: element_key.clone(),
                prop_name: prop_name.clone(),
                message: message.clone(),
            },
            Action::RegisterComponentHandle { .. }
            | Action::UnregisterComponentHandle { .. }
            | Action::RegisterMeasurable { .. }
            | Action::UnregisterMeasurable { .. }
            | Action::RegisterPropControllersHandle { .. }
            | Action::RegisterPropControllers { .. }
            | Action::UnregisterPropControllers { .. } => return None,
        };

        Some(message)
    }
}

/// Serializable actions, as they travel over the channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    content = "payload",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum Message {
    RegisterDocument {
        document: Document,
    },
    UnregisterDocument {
        document_key: DocumentKey,
    },
    ChangeDocument {
        document_key: DocumentKey,
        operation: Operation,
    },
    MountComponent {
        document_key: DocumentKey,
        element_key: ElementKey,
    },
    UnmountComponent {
        document_key: DocumentKey,
        element_key: ElementKey,
    },
    ChangeElementBoxModels {
        changed_element_box_models: ChangedBoxModels,
    },
    ChangeDocumentElementSize {
        size: Size,
    },
    ChangeDocumentElementScrollTop {
        scroll_top: f64,
    },
    RegisterComponent {
        component_type: ComponentType,
        meta: ComponentMeta,
        prop_controller_descriptors: PropControllerDescriptors,
    },
    UnregisterComponent {
        component_type: ComponentType,
    },
    MessageBuilderPropController {
        document_key: DocumentKey,
        element_key: ElementKey,
        prop_name: PropName,
        message: PropControllerMessage,
    },
    MessageHostPropController {
        document_key: DocumentKey,
        element_key: ElementKey,
        prop_name: PropName,
        message: PropControllerMessage,
    },
}

impl Message {
    pub fn action_type(&self) -> ActionType {
        match self {
            Message::RegisterDocument { .. } => ActionType::RegisterDocument,
            Message::UnregisterDocument { .. } => ActionType::UnregisterDocument,
            Message::ChangeDocument { .. } => ActionType::ChangeDocument,
            Message::MountComponent { .. } => ActionType::MountComponent,
            Message::UnmountComponent { .. } => ActionType::UnmountComponent,
            Message::ChangeElementBoxModels { .. } => ActionType::ChangeElementBoxModels,
            Message::ChangeDocumentElementSize { .. } => ActionType::ChangeDocumentElementSize,
            Message::ChangeDocumentElementScrollTop { .. } => {
                ActionType::ChangeDocumentElementScrollTop
            }
            Message::RegisterComponent { .. } => ActionType::RegisterComponent,
            Message::UnregisterComponent { .. } => ActionType::UnregisterComponent,
            Message::MessageBuilderPropController { .. } => {
                ActionType::MessageBuilderPropController
            }
            Message::MessageHostPropController { .. } => ActionType::MessageHostPropController,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(source: &str) -> serde_json::Result<Self> {
        serde_json::from_str(source)
    }
}

impl From<Message> for Action {
    fn from(message: Message) -> Self {
        match message {
            Message::RegisterDocument { document } => Action::RegisterDocument { document },
            Message::UnregisterDocument { document_key } => {
                Action::UnregisterDocument { document_key }
            }
            Message::ChangeDocument {
                document_key,
                operation,
            } => Action::ChangeDocument {
                document_key,
                operation,
            },
            Message::MountComponent {
                document_key,
                element_key,
            } => Action::MountComponent {
                document_key,
                element_key,
            },
            Message::UnmountComponent {
                document_key,
                element_key,
            } => Action::UnmountComponent {
                document_key,
                element_key,
            },
            Message::ChangeElementBoxModels {
                changed_element_box_models,
            } => Action::ChangeElementBoxModels {
                changed_element_box_models,
            },
            Message::ChangeDocumentElementSize { size } => {
                Action::ChangeDocumentElementSize { size }
            }
            Message::ChangeDocumentElementScrollTop { scroll_top } => {
                Action::ChangeDocumentElementScrollTop { scroll_top }
            }
            Message::RegisterComponent {
                component_type,
                meta,
                prop_controller_descriptors,
            } => Action::RegisterComponent {
                component_type,
                meta,
                prop_controller_descriptors,
            },
            Message::UnregisterComponent { component_type } => {
                Action::UnregisterComponent { component_type }
            }
            Message::MessageBuilderPropController {
                document_key,
                element_key,
                prop_name,
                message,
            } => Action::MessageBuilderPropController {
                document_key,
                element_key,
                prop_name,
                message,
            },
            Message::MessageHostPropController {
                document_key,
                element_key,
                prop_name,
                message,
            } => Action::MessageHostPropController {
                document_key,
                element_key,
                prop_name,
                message,
            },
        }
    }
}

pub fn register_document(document: Document) -> Action {
    Action::RegisterDocument { document }
}

pub fn change_document(document_key: impl Into<DocumentKey>, operation: Operation) -> Action {
    Action::ChangeDocument {
        document_key: document_key.into(),
        operation,
    }
}

pub fn mount_component(element: &ElementRef) -> Action {
    Action::MountComponent {
        document_key: element.document_key.clone(),
        element_key: element.element_key.clone(),
    }
}

pub fn unmount_component(element: &ElementRef) -> Action {
    Action::UnmountComponent {
        document_key: element.document_key.clone(),
        element_key: element.element_key.clone(),
    }
}

pub fn register_component_handle(element: &ElementRef, handle: ComponentHandleRef) -> Action {
    Action::RegisterComponentHandle {
        document_key: element.document_key.clone(),
        element_key: element.element_key.clone(),
        component_handle: handle,
    }
}

pub fn unregister_component_handle(element: &ElementRef) -> Action {
    Action::UnregisterComponentHandle {
        document_key: element.document_key.clone(),
        element_key: element.element_key.clone(),
    }
}

pub fn register_measurable(element: &ElementRef, measurable: ComponentHandleRef) -> Action {
    Action::RegisterMeasurable {
        document_key: element.document_key.clone(),
        element_key: element.element_key.clone(),
        measurable,
    }
}

pub fn unregister_measurable(element: &ElementRef) -> Action {
    Action::UnregisterMeasurable {
        document_key: element.document_key.clone(),
        element_key: element.element_key.clone(),
    }
}

pub fn change_document_element_size(size: Size) -> Action {
    Action::ChangeDocumentElementSize { size }
}

pub fn change_document_element_scroll_top(scroll_top: f64) -> Action {
    Action::ChangeDocumentElementScrollTop { scroll_top }
}

pub fn register_component(
    component_type: impl Into<ComponentType>,
    meta: ComponentMeta,
    prop_controller_descriptors: PropControllerDescriptors,
) -> Action {
    Action::RegisterComponent {
        component_type: component_type.into(),
        meta,
        prop_controller_descriptors,
    }
}

pub fn unregister_component(component_type: impl Into<ComponentType>) -> Action {
    Action::UnregisterComponent {
        component_type: component_type.into(),
    }
}

pub fn register_prop_controllers_handle(element: &ElementRef, handle: ComponentHandleRef) -> Action {
    Action::RegisterPropControllersHandle {
        document_key: element.document_key.clone(),
        element_key: element.element_key.clone(),
        handle,
    }
}

pub fn register_prop_controllers(element: &ElementRef, prop_controllers: PropControllers) -> Action {
    Action::RegisterPropControllers {
        document_key: element.document_key.clone(),
        element_key: element.element_key.clone(),
        prop_controllers,
    }
}

pub fn unregister_prop_controllers(element: &ElementRef) -> Action {
    Action::UnregisterPropControllers {
        document_key: element.document_key.clone(),
        element_key: element.element_key.clone(),
    }
}

pub fn message_builder_prop_controller(prop: &PropRef, message: PropControllerMessage) -> Action {
    Action::MessageBuilderPropController {
        document_key: prop.document_key.clone(),
        element_key: prop.element_key.clone(),
        prop_name: prop.prop_name.clone(),
        message,
    }
}

pub fn message_host_prop_controller(prop: &PropRef, message: PropControllerMessage) -> Action {
    Action::MessageHostPropController {
        document_key: prop.document_key.clone(),
        element_key: prop.element_key.clone(),
        prop_name: prop.prop_name.clone(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_wire_shape() {
        let message = Message::MessageBuilderPropController {
            document_key: "doc1".to_string(),
            element_key: "e1".to_string(),
            prop_name: "text".to_string(),
            message: PropControllerMessage::Focus,
        };

        assert_eq!(
            serde_json::to_value(&message).unwrap(),
            json!({
                "type": "MESSAGE_BUILDER_PROP_CONTROLLER",
                "payload": {
                    "documentKey": "doc1",
                    "elementKey": "e1",
                    "propName": "text",
                    "message": { "type": "FOCUS" }
                }
            })
        );
    }

    #[test]
    fn test_unknown_message_type_fails_to_parse() {
        assert!(Message::from_json(r#"{ "type": "REGISTER_COMPONENT_HANDLE", "payload": {} }"#).is_err());
    }

    #[test]
    fn test_handle_actions_stay_local() {
        let action = unregister_component_handle(&ElementRef::new("doc1", "e1"));

        assert!(action.to_message().is_none());
        assert!(!action.action_type().is_forwarded());
    }

    #[test]
    fn test_message_round_trips_to_same_action_type() {
        let action = mount_component(&ElementRef::new("doc1", "e1"));
        let message = action.to_message().unwrap();

        assert_eq!(message.action_type(), ActionType::MountComponent);
        assert_eq!(Action::from(message).action_type(), ActionType::MountComponent);
    }

    #[test]
    fn test_whitelist() {
        assert!(ActionType::ChangeElementBoxModels.is_forwarded());
        assert!(ActionType::MessageBuilderPropController.is_forwarded());
        assert!(!ActionType::MessageHostPropController.is_forwarded());
        assert!(!ActionType::ChangeDocumentElementScrollTop.is_forwarded());
        assert!(!ActionType::ChangeDocument.is_forwarded());
        assert_eq!(FORWARDED_ACTION_TYPES.len(), 7);
    }
}
