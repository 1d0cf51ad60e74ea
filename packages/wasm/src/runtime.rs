use crate::channel::WindowChannel;
use crate::document::WebDocumentElement;
use crate::error::{WasmError, WasmResult};
use crate::frame::AnimationFrameScheduler;
use crate::handle::JsComponentHandle;
use livecanvas_common::{CanvasConfig, ElementRef};
use livecanvas_prop_controllers::descriptors_from_value;
use livecanvas_state::actions;
use livecanvas_state::{
    configure_store, initialize, Action, ComponentMeta, DocumentElement, Document, Operation,
    Store, Teardown,
};
use std::rc::Rc;
use tracing::info;
use wasm_bindgen::prelude::*;

fn read_config(config: JsValue) -> WasmResult<CanvasConfig> {
    if config.is_undefined() || config.is_null() {
        return Ok(CanvasConfig::default());
    }

    let value: serde_json::Value = serde_wasm_bindgen::from_value(config)?;
    Ok(CanvasConfig::from_value(value)?)
}

/// The preview runtime: one store, its frame loops and the builder channel
#[wasm_bindgen]
pub struct CanvasRuntime {
    store: Store,
    teardown: Teardown,
}

impl CanvasRuntime {
    fn create(config: JsValue) -> WasmResult<Self> {
        let config = read_config(config)?;
        let channel = WindowChannel::new(config.target_origin.clone());
        let document_element: Rc<dyn DocumentElement> = Rc::new(WebDocumentElement::new()?);
        let scheduler = Rc::new(AnimationFrameScheduler::new()?);

        let store = configure_store(config, channel, document_element.clone());
        let teardown = initialize(&store, scheduler, document_element);

        info!(is_in_builder = store.config().is_in_builder, "canvas runtime started");

        Ok(Self { store, teardown })
    }

    pub fn store(&self) -> &Store {
        &self.store
    }
}

#[wasm_bindgen]
impl CanvasRuntime {
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<CanvasRuntime, JsValue> {
        Ok(Self::create(config)?)
    }

    #[wasm_bindgen(getter, js_name = isInBuilder)]
    pub fn is_in_builder(&self) -> bool {
        self.store.state().is_in_builder
    }

    /// An invalid descriptor map is a programming error and is thrown
    #[wasm_bindgen(js_name = registerComponent)]
    pub fn register_component(
        &self,
        component_type: String,
        meta: JsValue,
        prop_controller_descriptors: JsValue,
    ) -> Result<(), JsValue> {
        let meta: ComponentMeta = serde_wasm_bindgen::from_value(meta)?;
        let descriptors: serde_json::Value =
            serde_wasm_bindgen::from_value(prop_controller_descriptors)?;
        let descriptors = descriptors_from_value(descriptors).map_err(WasmError::from)?;

        self.store
            .dispatch(actions::register_component(component_type, meta, descriptors));
        Ok(())
    }

    #[wasm_bindgen(js_name = unregisterComponent)]
    pub fn unregister_component(&self, component_type: String) {
        self.store
            .dispatch(actions::unregister_component(component_type));
    }

    #[wasm_bindgen(js_name = registerDocument)]
    pub fn register_document(&self, document: JsValue) -> Result<(), JsValue> {
        let document: Document = serde_wasm_bindgen::from_value(document)?;
        self.store.dispatch(actions::register_document(document));
        Ok(())
    }

    #[wasm_bindgen(js_name = unregisterDocument)]
    pub fn unregister_document(&self, document_key: String) {
        self.store.dispatch(Action::UnregisterDocument { document_key });
    }

    #[wasm_bindgen(js_name = changeDocument)]
    pub fn change_document(&self, document_key: String, operation: JsValue) -> Result<(), JsValue> {
        let operation: Operation = serde_wasm_bindgen::from_value(operation)?;
        self.store
            .dispatch(actions::change_document(document_key, operation));
        Ok(())
    }

    #[wasm_bindgen(js_name = mountComponent)]
    pub fn mount_component(&self, document_key: String, element_key: String) {
        let element = ElementRef::new(document_key, element_key);
        self.store.dispatch(actions::mount_component(&element));
    }

    #[wasm_bindgen(js_name = unmountComponent)]
    pub fn unmount_component(&self, document_key: String, element_key: String) {
        let element = ElementRef::new(document_key, element_key);
        self.store.dispatch(actions::unmount_component(&element));
    }

    #[wasm_bindgen(js_name = registerComponentHandle)]
    pub fn register_component_handle(&self, document_key: String, element_key: String, handle: JsValue) {
        let element = ElementRef::new(document_key, element_key);
        let handle = Rc::new(JsComponentHandle::new(handle));
        self.store
            .dispatch(actions::register_component_handle(&element, handle));
    }

    #[wasm_bindgen(js_name = unregisterComponentHandle)]
    pub fn unregister_component_handle(&self, document_key: String, element_key: String) {
        let element = ElementRef::new(document_key, element_key);
        self.store
            .dispatch(actions::unregister_component_handle(&element));
    }

    /// Stop measuring. The store stays usable.
    pub fn destroy(&self) {
        self.teardown.stop();
        info!("canvas runtime stopped");
    }
}

impl Drop for CanvasRuntime {
    fn drop(&mut self) {
        self.teardown.stop();
    }
}
