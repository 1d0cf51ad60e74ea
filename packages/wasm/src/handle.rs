//! Component handles and prop controllers crossing the JS boundary.

use js_sys::{Function, Object, Reflect};
use livecanvas_prop_controllers::{Instant, PropController, PropControllerMessage, PropControllers};
use livecanvas_state::{BoxModel, ComponentHandle, MeasureError, Measurable, PropControllable};
use serde::Serialize;
use std::rc::Rc;
use tracing::warn;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

fn method(object: &JsValue, name: &str) -> Option<Function> {
    Reflect::get(object, &JsValue::from_str(name))
        .ok()
        .and_then(|value| value.dyn_into::<Function>().ok())
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, serde_wasm_bindgen::Error> {
    value.serialize(&serde_wasm_bindgen::Serializer::json_compatible())
}

/// A mounted JS component.
///
/// Capabilities are probed once, when the handle is created: an object with a
/// `getBoxModel()` method is measurable, one with `setPropControllers(map)`
/// receives prop controllers.
#[derive(Debug)]
pub struct JsComponentHandle {
    object: JsValue,
    get_box_model: Option<Function>,
    set_prop_controllers: Option<Function>,
}

impl JsComponentHandle {
    pub fn new(object: JsValue) -> Self {
        Self {
            get_box_model: method(&object, "getBoxModel"),
            set_prop_controllers: method(&object, "setPropControllers"),
            object,
        }
    }
}

impl ComponentHandle for JsComponentHandle {
    fn as_measurable(&self) -> Option<&dyn Measurable> {
        self.get_box_model.as_ref().map(|_| self as &dyn Measurable)
    }

    fn as_prop_controllable(&self) -> Option<&dyn PropControllable> {
        self.set_prop_controllers
            .as_ref()
            .map(|_| self as &dyn PropControllable)
    }
}

impl Measurable for JsComponentHandle {
    fn measure(&self) -> Result<Option<BoxModel>, MeasureError> {
        let Some(get_box_model) = &self.get_box_model else {
            return Ok(None);
        };

        let value = get_box_model
            .call0(&self.object)
            .map_err(|error| MeasureError::Failed(format!("{:?}", error)))?;

        if value.is_null() || value.is_undefined() {
            return Ok(None);
        }

        serde_wasm_bindgen::from_value(value)
            .map(Some)
            .map_err(|error| MeasureError::Failed(error.to_string()))
    }
}

impl PropControllable for JsComponentHandle {
    fn set_prop_controllers(&self, prop_controllers: Option<PropControllers>) {
        let Some(set_prop_controllers) = &self.set_prop_controllers else {
            return;
        };

        let argument = match prop_controllers {
            Some(prop_controllers) => {
                let map = Object::new();
                for (prop_name, controller) in prop_controllers {
                    let controller = JsPropController::from(controller);
                    if let Err(error) =
                        Reflect::set(&map, &JsValue::from_str(&prop_name), &controller.into())
                    {
                        warn!(?error, %prop_name, "failed to expose prop controller");
                    }
                }
                map.into()
            }
            None => JsValue::NULL,
        };

        if let Err(error) = set_prop_controllers.call1(&self.object, &argument) {
            warn!(?error, "setPropControllers threw");
        }
    }
}

/// A prop controller as seen by JS components
#[wasm_bindgen(js_name = PropController)]
pub struct JsPropController {
    inner: Rc<PropController>,
}

impl From<Rc<PropController>> for JsPropController {
    fn from(inner: Rc<PropController>) -> Self {
        Self { inner }
    }
}

#[wasm_bindgen(js_class = PropController)]
impl JsPropController {
    #[wasm_bindgen(getter, js_name = descriptorType)]
    pub fn descriptor_type(&self) -> String {
        self.inner.descriptor().type_name().to_string()
    }

    #[wasm_bindgen(getter, js_name = isReadOnly)]
    pub fn is_read_only(&self) -> bool {
        self.inner
            .as_rich_text()
            .map(|text| text.is_read_only())
            .unwrap_or(false)
    }

    #[wasm_bindgen(js_name = initializeEditor)]
    pub fn initialize_editor(&self, value: JsValue) -> Result<(), JsValue> {
        if let Some(text) = self.inner.as_rich_text() {
            text.initialize_editor(serde_wasm_bindgen::from_value(value)?);
        }
        Ok(())
    }

    pub fn change(&self, value: JsValue) -> Result<(), JsValue> {
        if let Some(text) = self.inner.as_rich_text() {
            text.change(serde_wasm_bindgen::from_value(value)?, Instant::now());
        }
        Ok(())
    }

    /// The value to display, or `undefined` while local edits are pending
    #[wasm_bindgen(js_name = receivePropValue)]
    pub fn receive_prop_value(&self, value: JsValue) -> Result<JsValue, JsValue> {
        let Some(text) = self.inner.as_rich_text() else {
            return Ok(value);
        };

        match text.receive_prop_value(serde_wasm_bindgen::from_value(value)?, Instant::now()) {
            Some(committed) => Ok(to_js(&committed)?),
            None => Ok(JsValue::UNDEFINED),
        }
    }

    pub fn focus(&self) {
        if let Some(text) = self.inner.as_rich_text() {
            text.focus();
        }
    }

    pub fn blur(&self) {
        if let Some(text) = self.inner.as_rich_text() {
            text.blur();
        }
    }

    pub fn undo(&self) {
        if let Some(text) = self.inner.as_rich_text() {
            text.undo();
        }
    }

    pub fn redo(&self) {
        if let Some(text) = self.inner.as_rich_text() {
            text.redo();
        }
    }

    /// Commit prop data held back while typing once the quiet period is
    /// over. Returns the value to display, or `undefined`.
    pub fn tick(&self) -> Result<JsValue, JsValue> {
        let committed = self
            .inner
            .as_rich_text()
            .and_then(|text| text.tick(Instant::now()));

        match committed {
            Some(value) => Ok(to_js(&value)?),
            None => Ok(JsValue::UNDEFINED),
        }
    }

    /// Raw message to the builder
    pub fn send(&self, message: JsValue) -> Result<(), JsValue> {
        let message: PropControllerMessage = serde_wasm_bindgen::from_value(message)?;
        self.inner.send(message);
        Ok(())
    }
}
