//! # Prop Controller Lifecycle
//!
//! Binds prop controllers to the prop-controllable handles of mounted
//! elements.
//!
//! ```text
//! REGISTER_COMPONENT_HANDLE ─► register handle ─► create controllers ─► register ─► handle.set(Some)
//! UNREGISTER_COMPONENT_HANDLE ─► handle.set(None) ─► UNREGISTER_PROP_CONTROLLERS
//! MESSAGE_HOST_PROP_CONTROLLER ─► controller.recv(message), or dropped
//! ```
//!
//! Controllers hold a weak store reference in their send callback; the
//! registry in state owns them.

use crate::actions::{self, Action};
use crate::handle::ComponentHandleRef;
use crate::middleware::Middleware;
use crate::store::Store;
use livecanvas_common::{ElementRef, PropRef};
use livecanvas_prop_controllers::{
    create_prop_controller, PropControllerMessage, PropControllers, SendMessage,
};
use std::rc::Rc;
use tracing::{debug, instrument, trace};

#[derive(Debug, Default)]
pub struct PropControllerLifecycle;

impl PropControllerLifecycle {
    #[instrument(skip(self, store, element, handle), fields(element = %element))]
    fn register_and_set(&self, store: &Store, element: &ElementRef, handle: &ComponentHandleRef) {
        if store.select(|state| state.prop_controller_handles.contains(element)) {
            debug!("handle re-registered, tearing down previous controllers");
            self.unregister_and_unset(store, element);
        }

        store.dispatch(actions::register_prop_controllers_handle(
            element,
            handle.clone(),
        ));

        let prop_controllers = create_and_register_prop_controllers(store, element);

        if let Some(prop_controllable) = handle.as_prop_controllable() {
            prop_controllable.set_prop_controllers(prop_controllers);
        }
    }

    #[instrument(skip(self, store, element), fields(element = %element))]
    fn unregister_and_unset(&self, store: &Store, element: &ElementRef) {
        let handle = store.select(|state| {
            state
                .prop_controller_handles
                .get_prop_controllers_handle(element)
                .cloned()
        });

        if let Some(prop_controllable) = handle.as_ref().and_then(|handle| handle.as_prop_controllable()) {
            prop_controllable.set_prop_controllers(None);
        }

        store.dispatch(actions::unregister_prop_controllers(element));
    }

    fn route(&self, store: &Store, prop: &PropRef, message: &PropControllerMessage) {
        let controller = store.select(|state| {
            state
                .prop_controller_handles
                .get_prop_controller(prop)
                .cloned()
        });

        match controller {
            Some(controller) => controller.recv(message.clone()),
            None => trace!(prop = %prop, "no live prop controller, dropping message"),
        }
    }
}

fn create_and_register_prop_controllers(
    store: &Store,
    element: &ElementRef,
) -> Option<PropControllers> {
    let descriptors = store.select(|state| {
        state
            .get_element_prop_controller_descriptors(&element.document_key, &element.element_key)
            .cloned()
    })?;

    let commit_debounce = store.config().commit_debounce();

    let prop_controllers: PropControllers = descriptors
        .iter()
        .map(|(prop_name, descriptor)| {
            let send = send_to_builder(store, element.prop(prop_name.clone()));
            let controller = create_prop_controller(descriptor, send, commit_debounce);
            (prop_name.clone(), Rc::new(controller))
        })
        .collect();

    debug!(element = %element, count = prop_controllers.len(), "created prop controllers");

    store.dispatch(actions::register_prop_controllers(
        element,
        prop_controllers.clone(),
    ));

    Some(prop_controllers)
}

fn send_to_builder(store: &Store, prop: PropRef) -> SendMessage {
    let weak = store.downgrade();

    Rc::new(move |message| {
        if let Some(store) = weak.upgrade() {
            store.dispatch(actions::message_builder_prop_controller(&prop, message));
        }
    })
}

impl Middleware for PropControllerLifecycle {
    fn handle(&self, store: &Store, action: &Action) {
        match action {
            Action::RegisterComponentHandle {
                document_key,
                element_key,
                component_handle,
            } => {
                if component_handle.as_prop_controllable().is_some() {
                    let element = ElementRef::new(document_key.clone(), element_key.clone());
                    self.register_and_set(store, &element, component_handle);
                }
            }

            Action::UnregisterComponentHandle {
                document_key,
                element_key,
            } => {
                let element = ElementRef::new(document_key.clone(), element_key.clone());
                self.unregister_and_unset(store, &element);
            }

            Action::MessageHostPropController {
                document_key,
                element_key,
                prop_name,
                message,
            } => {
                let prop = PropRef::new(document_key.clone(), element_key.clone(), prop_name.clone());
                self.route(store, &prop, message);
            }

            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::components_meta::ComponentMeta;
    use crate::modules::documents::{Document, Element};
    use crate::actions::Message;
    use crate::testing::{ActionRecorder, HandleEvent, TestHandle};
    use livecanvas_common::CanvasConfig;
    use livecanvas_prop_controllers::{BuilderEditMode, PropControllerDescriptor};
    use std::collections::BTreeMap;

    fn register_text_component(store: &Store) {
        store.dispatch(actions::register_component(
            "Text",
            ComponentMeta::new("Text"),
            BTreeMap::from([("text".to_string(), PropControllerDescriptor::rich_text())]),
        ));
        store.dispatch(actions::register_document(Document::new(
            "doc1",
            Element::new("root", "Root").with_child(Element::new("e1", "Text")),
        )));
    }

    fn store() -> Store {
        let store = Store::builder(CanvasConfig::default())
            .middleware(PropControllerLifecycle)
            .build();
        register_text_component(&store);
        store
    }

    #[test]
    fn test_registration_pushes_controllers() {
        let store = store();
        let element = ElementRef::new("doc1", "e1");
        let handle = TestHandle::prop_controllable();

        store.dispatch(actions::register_component_handle(&element, handle.clone()));

        assert_eq!(handle.events(), vec![HandleEvent::Set(vec!["text".to_string()])]);
        assert!(store
            .state()
            .prop_controller_handles
            .get_prop_controller(&element.prop("text"))
            .is_some());
    }

    #[test]
    fn test_element_without_descriptors_gets_none() {
        let store = store();
        let element = ElementRef::new("doc1", "root");
        let handle = TestHandle::prop_controllable();

        store.dispatch(actions::register_component_handle(&element, handle.clone()));

        assert_eq!(handle.events(), vec![HandleEvent::Cleared]);
        assert!(store.state().prop_controller_handles.contains(&element));
        assert_eq!(store.state().prop_controller_handles.controller_count(), 0);
    }

    #[test]
    fn test_reregistration_tears_down_first() {
        let store = store();
        let element = ElementRef::new("doc1", "e1");
        let first = TestHandle::prop_controllable();
        let second = TestHandle::prop_controllable();

        store.dispatch(actions::register_component_handle(&element, first.clone()));
        store.dispatch(actions::register_component_handle(&element, second.clone()));

        assert_eq!(
            first.events(),
            vec![HandleEvent::Set(vec!["text".to_string()]), HandleEvent::Cleared]
        );
        assert_eq!(second.events(), vec![HandleEvent::Set(vec!["text".to_string()])]);
        assert_eq!(store.state().prop_controller_handles.controller_count(), 1);
    }

    #[test]
    fn test_host_message_reaches_controller() {
        let store = store();
        let element = ElementRef::new("doc1", "e1");
        store.dispatch(actions::register_component_handle(
            &element,
            TestHandle::prop_controllable(),
        ));

        store.dispatch(actions::message_host_prop_controller(
            &element.prop("text"),
            PropControllerMessage::ChangeBuilderEditMode {
                edit_mode: BuilderEditMode::Interact,
            },
        ));

        let controller = store
            .select(|state| {
                state
                    .prop_controller_handles
                    .get_prop_controller(&element.prop("text"))
                    .cloned()
            })
            .unwrap();
        assert!(controller.as_rich_text().unwrap().is_read_only());
    }

    #[test]
    fn test_controller_send_dispatches_builder_message() {
        let seen = Rc::new(std::cell::RefCell::new(Vec::new()));
        let sink = seen.clone();
        let store = Store::builder(CanvasConfig::default())
            .middleware(PropControllerLifecycle)
            .middleware(ActionRecorder::new(move |action: &Action| {
                if let Action::MessageBuilderPropController { .. } = action {
                    sink.borrow_mut().push(action.to_message());
                }
            }))
            .build();
        register_text_component(&store);

        let element = ElementRef::new("doc1", "e1");
        let handle = TestHandle::prop_controllable();
        store.dispatch(actions::register_component_handle(&element, handle.clone()));

        let controllers = handle.prop_controllers().unwrap();
        controllers["text"].as_rich_text().unwrap().focus();

        assert_eq!(
            *seen.borrow(),
            vec![Some(Message::MessageBuilderPropController {
                document_key: "doc1".to_string(),
                element_key: "e1".to_string(),
                prop_name: "text".to_string(),
                message: PropControllerMessage::Focus,
            })]
        );
    }
}
