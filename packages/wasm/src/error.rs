use livecanvas_common::CommonError;
use livecanvas_prop_controllers::PropControllerError;
use livecanvas_state::TransportError;
use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Error, Debug)]
pub enum WasmError {
    #[error("JavaScript error: {0}")]
    Js(String),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_wasm_bindgen::Error),

    #[error(transparent)]
    Config(#[from] CommonError),

    #[error(transparent)]
    PropController(#[from] PropControllerError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("No global window")]
    NoWindow,
}

impl WasmError {
    pub fn js(value: JsValue) -> Self {
        WasmError::Js(format!("{:?}", value))
    }
}

impl From<WasmError> for JsValue {
    fn from(error: WasmError) -> Self {
        js_sys::Error::new(&error.to_string()).into()
    }
}

pub type WasmResult<T> = Result<T, WasmError>;
