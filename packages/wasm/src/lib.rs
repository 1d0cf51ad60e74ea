//! Browser bindings for the live canvas preview.
//!
//! ```js
//! const runtime = new CanvasRuntime({ commitDebounceMs: 300 });
//! runtime.registerComponent("Text", { label: "Text" }, { text: { type: "RichText" } });
//! runtime.mountComponent("doc", "hero");
//! runtime.registerComponentHandle("doc", "hero", {
//!   getBoxModel() { ... },
//!   setPropControllers(controllers) { ... },
//! });
//! ```

use wasm_bindgen::prelude::*;

mod channel;
mod document;
mod error;
mod frame;
mod handle;
mod runtime;

pub use channel::{WebMessagePort, WindowChannel};
pub use document::WebDocumentElement;
pub use error::{WasmError, WasmResult};
pub use frame::AnimationFrameScheduler;
pub use handle::{JsComponentHandle, JsPropController};
pub use runtime::CanvasRuntime;

#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}
