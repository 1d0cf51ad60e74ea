//! # Store
//!
//! One state tree, composed from the slices in [`crate::modules`], mutated
//! only by [`Store::dispatch`].
//!
//! ## Dispatch
//!
//! ```text
//! dispatch(action)
//!   ├─ reducers        (state exclusively borrowed, no store access)
//!   └─ middleware[0..] (may dispatch, post to the channel, touch the DOM)
//! ```
//!
//! Dispatch is synchronous. A dispatch issued by middleware or a thunk runs to
//! completion, middleware included, before the outer dispatch moves on to its
//! next middleware.
//!
//! The store is an `Rc` handle and is `!Send`. Anything the store owns that
//! needs to call back into it holds a [`WeakStore`].

use crate::actions::Action;
use crate::middleware::Middleware;
use crate::modules::box_models::{self, BoxModel, BoxModelsState};
use crate::modules::components_meta::{self, ComponentMeta, ComponentsMetaState};
use crate::modules::documents::{self, Document, DocumentsState};
use crate::modules::mounted_components::{self, MountedComponentsState};
use crate::modules::prop_controller_handles::{self, PropControllerHandlesState};
use crate::modules::prop_controllers::{self, PropControllersState};
use livecanvas_common::{CanvasConfig, ComponentType, DocumentKey, ElementKey, ElementRef, PropRef};
use livecanvas_prop_controllers::PropControllerDescriptors;
use std::cell::{Ref, RefCell};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::rc::{Rc, Weak};
use tracing::trace;

#[derive(Debug)]
pub struct State {
    pub documents: DocumentsState,
    pub mounted_components: MountedComponentsState,
    pub box_models: BoxModelsState,
    pub components_meta: ComponentsMetaState,
    pub prop_controllers: PropControllersState,
    pub prop_controller_handles: PropControllerHandlesState,
    pub is_in_builder: bool,
}

impl State {
    pub fn new(config: &CanvasConfig) -> Self {
        Self {
            documents: DocumentsState::default(),
            mounted_components: MountedComponentsState::default(),
            box_models: BoxModelsState::default(),
            components_meta: ComponentsMetaState::default(),
            prop_controllers: PropControllersState::default(),
            prop_controller_handles: PropControllerHandlesState::default(),
            is_in_builder: config.is_in_builder,
        }
    }

    fn reduce(&mut self, action: &Action) {
        documents::reducer(&mut self.documents, action);
        mounted_components::reducer(&mut self.mounted_components, action);
        box_models::reducer(&mut self.box_models, action);
        components_meta::reducer(&mut self.components_meta, action);
        prop_controllers::reducer(&mut self.prop_controllers, action);
        prop_controller_handles::reducer(&mut self.prop_controller_handles, action);
    }

    pub fn get_element_prop_controller_descriptors(
        &self,
        document_key: &str,
        element_key: &str,
    ) -> Option<&PropControllerDescriptors> {
        documents::get_element_prop_controller_descriptors(
            &self.documents,
            &self.prop_controllers,
            document_key,
            element_key,
        )
    }

    pub fn get_component_prop_controller_descriptors(
        &self,
        component_type: &str,
    ) -> Option<&PropControllerDescriptors> {
        prop_controllers::get_component_prop_controller_descriptors(
            &self.prop_controllers,
            component_type,
        )
    }

    /// A comparable copy of everything in the tree except live handles
    pub fn snapshot(&self) -> Snapshot {
        let mut prop_controllers = BTreeSet::new();
        for (element, controllers) in &self.prop_controller_handles.prop_controllers {
            for prop_name in controllers.keys() {
                prop_controllers.insert(element.prop(prop_name.clone()));
            }
        }

        Snapshot {
            documents: self.documents.clone(),
            mounted: self.mounted_components.mounted.clone(),
            component_handles: self.mounted_components.handles.keys().cloned().collect(),
            measurables: self.box_models.measurables.keys().cloned().collect(),
            box_models: self.box_models.box_models.clone(),
            components_meta: self.components_meta.clone(),
            prop_controller_descriptors: self.prop_controllers.clone(),
            prop_controller_handles: self
                .prop_controller_handles
                .handles
                .keys()
                .cloned()
                .collect(),
            prop_controllers,
            is_in_builder: self.is_in_builder,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub documents: BTreeMap<DocumentKey, Document>,
    pub mounted: BTreeSet<ElementRef>,
    pub component_handles: BTreeSet<ElementRef>,
    pub measurables: BTreeSet<ElementRef>,
    pub box_models: BTreeMap<ElementKey, BoxModel>,
    pub components_meta: BTreeMap<ComponentType, ComponentMeta>,
    pub prop_controller_descriptors: BTreeMap<ComponentType, PropControllerDescriptors>,
    pub prop_controller_handles: BTreeSet<ElementRef>,
    pub prop_controllers: BTreeSet<PropRef>,
    pub is_in_builder: bool,
}

struct StoreInner {
    state: RefCell<State>,
    middleware: Vec<Rc<dyn Middleware>>,
    config: CanvasConfig,
}

#[derive(Clone)]
pub struct Store {
    inner: Rc<StoreInner>,
}

impl Store {
    /// A store without middleware
    pub fn new(config: CanvasConfig) -> Self {
        Self::builder(config).build()
    }

    pub fn builder(config: CanvasConfig) -> StoreBuilder {
        StoreBuilder {
            config,
            preloaded: Vec::new(),
            middleware: Vec::new(),
        }
    }

    pub fn config(&self) -> &CanvasConfig {
        &self.inner.config
    }

    /// Reduce the action, then run it through the middleware chain
    pub fn dispatch(&self, action: Action) -> Action {
        trace!(action = %action.action_type(), "dispatch");

        self.inner.state.borrow_mut().reduce(&action);

        for middleware in &self.inner.middleware {
            middleware.handle(self, &action);
        }

        action
    }

    /// Run a synchronous thunk against this store
    pub fn thunk<T>(&self, thunk: impl FnOnce(&Store) -> T) -> T {
        thunk(self)
    }

    /// Borrow the full state tree. The borrow must be released before the
    /// next dispatch; prefer [`Store::select`] when a copy will do.
    pub fn state(&self) -> Ref<'_, State> {
        self.inner.state.borrow()
    }

    pub fn select<T>(&self, selector: impl FnOnce(&State) -> T) -> T {
        selector(&self.inner.state.borrow())
    }

    pub fn snapshot(&self) -> Snapshot {
        self.select(State::snapshot)
    }

    pub fn downgrade(&self) -> WeakStore {
        WeakStore {
            inner: Rc::downgrade(&self.inner),
        }
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("config", &self.inner.config)
            .field("middleware", &self.inner.middleware.len())
            .finish_non_exhaustive()
    }
}

/// Non-owning store reference for callbacks the store itself keeps alive
#[derive(Clone)]
pub struct WeakStore {
    inner: Weak<StoreInner>,
}

impl WeakStore {
    pub fn upgrade(&self) -> Option<Store> {
        self.inner.upgrade().map(|inner| Store { inner })
    }
}

impl fmt::Debug for WeakStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakStore")
            .field("alive", &(self.inner.strong_count() > 0))
            .finish()
    }
}

pub struct StoreBuilder {
    config: CanvasConfig,
    preloaded: Vec<Action>,
    middleware: Vec<Rc<dyn Middleware>>,
}

impl StoreBuilder {
    /// Reduce an action into the initial state. Middleware never sees it.
    pub fn preload(mut self, action: Action) -> Self {
        self.preloaded.push(action);
        self
    }

    /// Middleware runs in the order it is added
    pub fn middleware(mut self, middleware: impl Middleware + 'static) -> Self {
        self.middleware.push(Rc::new(middleware));
        self
    }

    /// Build the store and attach each middleware in order
    pub fn build(self) -> Store {
        let mut state = State::new(&self.config);
        for action in &self.preloaded {
            state.reduce(action);
        }

        let store = Store {
            inner: Rc::new(StoreInner {
                state: RefCell::new(state),
                middleware: self.middleware,
                config: self.config,
            }),
        };

        for middleware in &store.inner.middleware {
            middleware.attach(&store);
        }

        store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::{mount_component, register_component};
    use crate::ActionType;
    use std::cell::RefCell;

    #[derive(Default)]
    struct Recorder {
        seen: Rc<RefCell<Vec<ActionType>>>,
    }

    impl Middleware for Recorder {
        fn handle(&self, store: &Store, action: &Action) {
            // Reducers have already run
            if let Action::MountComponent { .. } = action {
                assert_eq!(store.select(|state| state.mounted_components.mounted.len()), 1);
                store.dispatch(register_component(
                    "Text",
                    ComponentMeta::new("Text"),
                    PropControllerDescriptors::new(),
                ));
            }
            self.seen.borrow_mut().push(action.action_type());
        }
    }

    #[test]
    fn test_nested_dispatch_completes_before_outer_middleware_continues() {
        let recorder = Recorder::default();
        let seen = recorder.seen.clone();
        let store = Store::builder(CanvasConfig::default())
            .middleware(recorder)
            .build();

        store.dispatch(mount_component(&ElementRef::new("doc1", "e1")));

        assert_eq!(
            *seen.borrow(),
            vec![ActionType::RegisterComponent, ActionType::MountComponent]
        );
        assert!(store.state().components_meta.contains_key("Text"));
    }

    #[test]
    fn test_thunk_returns_value() {
        let store = Store::new(CanvasConfig::default());

        let mounted = store.thunk(|store| {
            store.dispatch(mount_component(&ElementRef::new("doc1", "e1")));
            store.select(|state| state.mounted_components.mounted.len())
        });

        assert_eq!(mounted, 1);
    }

    #[test]
    fn test_weak_store_does_not_keep_store_alive() {
        let store = Store::new(CanvasConfig::default());
        let weak = store.downgrade();

        assert!(weak.upgrade().is_some());
        drop(store);
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn test_config_seeds_state() {
        let config = CanvasConfig {
            is_in_builder: false,
            ..CanvasConfig::default()
        };
        let store = Store::new(config);

        assert!(!store.state().is_in_builder);
    }
}
