//! Registry of prop-controllable handles and the controllers bound to them.
//!
//! Owned by the prop controller lifecycle: a handle is registered first,
//! then its controllers, and both are removed together.

use crate::actions::Action;
use crate::handle::ComponentHandleRef;
use livecanvas_common::{ElementRef, PropRef};
use livecanvas_prop_controllers::{PropController, PropControllers};
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Debug, Default)]
pub struct PropControllerHandlesState {
    pub handles: HashMap<ElementRef, ComponentHandleRef>,
    pub prop_controllers: HashMap<ElementRef, PropControllers>,
}

impl PropControllerHandlesState {
    pub fn contains(&self, element: &ElementRef) -> bool {
        self.handles.contains_key(element)
    }

    pub fn get_prop_controllers_handle(&self, element: &ElementRef) -> Option<&ComponentHandleRef> {
        self.handles.get(element)
    }

    pub fn get_prop_controllers(&self, element: &ElementRef) -> Option<&PropControllers> {
        self.prop_controllers.get(element)
    }

    pub fn get_prop_controller(&self, prop: &PropRef) -> Option<&Rc<PropController>> {
        self.prop_controllers
            .get(&prop.element())?
            .get(&prop.prop_name)
    }

    /// Number of live controllers across all elements
    pub fn controller_count(&self) -> usize {
        self.prop_controllers.values().map(|controllers| controllers.len()).sum()
    }
}

pub fn reducer(state: &mut PropControllerHandlesState, action: &Action) {
    match action {
        Action::RegisterPropControllersHandle {
            document_key,
            element_key,
            handle,
        } => {
            state.handles.insert(
                ElementRef::new(document_key.clone(), element_key.clone()),
                handle.clone(),
            );
        }

        Action::RegisterPropControllers {
            document_key,
            element_key,
            prop_controllers,
        } => {
            state.prop_controllers.insert(
                ElementRef::new(document_key.clone(), element_key.clone()),
                prop_controllers.clone(),
            );
        }

        Action::UnregisterPropControllers {
            document_key,
            element_key,
        } => {
            let element = ElementRef::new(document_key.clone(), element_key.clone());
            state.handles.remove(&element);
            state.prop_controllers.remove(&element);
        }

        _ => {}
    }
}
