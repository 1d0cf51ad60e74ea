//! Prop controller descriptors per registered component type.

use crate::actions::Action;
use livecanvas_common::ComponentType;
use livecanvas_prop_controllers::PropControllerDescriptors;
use std::collections::BTreeMap;

pub type PropControllersState = BTreeMap<ComponentType, PropControllerDescriptors>;

pub fn get_component_prop_controller_descriptors<'a>(
    state: &'a PropControllersState,
    component_type: &str,
) -> Option<&'a PropControllerDescriptors> {
    state.get(component_type)
}

pub fn reducer(state: &mut PropControllersState, action: &Action) {
    match action {
        Action::RegisterComponent {
            component_type,
            prop_controller_descriptors,
            ..
        } => {
            state.insert(component_type.clone(), prop_controller_descriptors.clone());
        }

        Action::UnregisterComponent { component_type } => {
            state.remove(component_type);
        }

        _ => {}
    }
}
