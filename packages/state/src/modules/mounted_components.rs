//! Which elements are mounted in the preview, and the handles they registered.

use crate::actions::Action;
use crate::handle::ComponentHandleRef;
use livecanvas_common::ElementRef;
use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Default)]
pub struct MountedComponentsState {
    pub mounted: BTreeSet<ElementRef>,
    pub handles: HashMap<ElementRef, ComponentHandleRef>,
}

impl MountedComponentsState {
    pub fn is_mounted(&self, element: &ElementRef) -> bool {
        self.mounted.contains(element)
    }

    pub fn get_component_handle(&self, element: &ElementRef) -> Option<&ComponentHandleRef> {
        self.handles.get(element)
    }
}

pub fn reducer(state: &mut MountedComponentsState, action: &Action) {
    match action {
        Action::MountComponent {
            document_key,
            element_key,
        } => {
            state
                .mounted
                .insert(ElementRef::new(document_key.clone(), element_key.clone()));
        }

        Action::UnmountComponent {
            document_key,
            element_key,
        } => {
            state
                .mounted
                .remove(&ElementRef::new(document_key.clone(), element_key.clone()));
        }

        Action::RegisterComponentHandle {
            document_key,
            element_key,
            component_handle,
        } => {
            state.handles.insert(
                ElementRef::new(document_key.clone(), element_key.clone()),
                component_handle.clone(),
            );
        }

        Action::UnregisterComponentHandle {
            document_key,
            element_key,
        } => {
            state
                .handles
                .remove(&ElementRef::new(document_key.clone(), element_key.clone()));
        }

        _ => {}
    }
}
