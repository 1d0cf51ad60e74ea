use crate::error::{WasmError, WasmResult};
use livecanvas_state::{DocumentElement, Size};
use wasm_bindgen::JsCast;
use web_sys::HtmlElement;

/// `document.documentElement` of the preview
pub struct WebDocumentElement {
    element: HtmlElement,
}

impl WebDocumentElement {
    pub fn new() -> WasmResult<Self> {
        let document = web_sys::window()
            .and_then(|window| window.document())
            .ok_or(WasmError::NoWindow)?;

        let element = document
            .document_element()
            .ok_or_else(|| WasmError::Js("document has no root element".to_string()))?
            .dyn_into::<HtmlElement>()
            .map_err(|element| WasmError::js(element.into()))?;

        Ok(Self { element })
    }
}

impl DocumentElement for WebDocumentElement {
    fn size(&self) -> Size {
        let element = &self.element;

        Size {
            offset_width: element.offset_width() as f64,
            offset_height: element.offset_height() as f64,
            client_width: element.client_width() as f64,
            client_height: element.client_height() as f64,
            scroll_width: element.scroll_width() as f64,
            scroll_height: element.scroll_height() as f64,
            scroll_top: element.scroll_top() as f64,
            scroll_left: element.scroll_left() as f64,
        }
    }

    fn set_scroll_top(&self, scroll_top: f64) {
        self.element.set_scroll_top(scroll_top.round() as i32);
    }
}
