use crate::error::{WasmError, WasmResult};
use livecanvas_state::{FrameError, FrameHandle, FrameScheduler};
use tracing::debug;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

/// `requestAnimationFrame` on the global window
pub struct AnimationFrameScheduler {
    window: web_sys::Window,
}

impl AnimationFrameScheduler {
    pub fn new() -> WasmResult<Self> {
        let window = web_sys::window().ok_or(WasmError::NoWindow)?;
        Ok(Self { window })
    }
}

impl FrameScheduler for AnimationFrameScheduler {
    fn request_frame(&self, callback: Box<dyn FnOnce()>) -> Result<FrameHandle, FrameError> {
        // Freed by the browser after it runs; a cancelled frame leaks its closure.
        let callback = Closure::once_into_js(move || callback());

        self.window
            .request_animation_frame(callback.unchecked_ref())
            .map(FrameHandle)
            .map_err(|error| FrameError::Request(format!("{:?}", error)))
    }

    fn cancel_frame(&self, handle: FrameHandle) {
        if let Err(error) = self.window.cancel_animation_frame(handle.0) {
            debug!(?error, "cancelAnimationFrame failed");
        }
    }
}
