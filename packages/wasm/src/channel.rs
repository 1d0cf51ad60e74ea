//! `MessageChannel` transport between the preview iframe and its parent.

use livecanvas_state::{Channel, Message, MessagePort, TransportError, TransportResult};
use serde::Serialize;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::warn;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::MessageEvent;

/// Opens a `MessageChannel` and transfers its second port to `window.parent`
pub struct WindowChannel {
    target_origin: String,
}

impl WindowChannel {
    pub fn new(target_origin: impl Into<String>) -> Self {
        Self {
            target_origin: target_origin.into(),
        }
    }
}

/// Best effort: without a parent window the preview still runs, unsynced
fn hand_off(port: &web_sys::MessagePort, target_origin: &str) {
    let parent = web_sys::window().and_then(|window| window.parent().ok().flatten());

    let Some(parent) = parent else {
        warn!("no parent window, channel endpoint not handed off");
        return;
    };

    let transfer = js_sys::Array::of1(port);
    if let Err(error) = parent.post_message_with_transfer(port, target_origin, &transfer) {
        warn!(?error, "failed to hand off channel endpoint");
    }
}

impl Channel for WindowChannel {
    fn open(&self) -> TransportResult<Rc<dyn MessagePort>> {
        let channel = web_sys::MessageChannel::new()
            .map_err(|error| TransportError::Open(format!("{:?}", error)))?;

        hand_off(&channel.port2(), &self.target_origin);

        Ok(Rc::new(WebMessagePort::new(channel.port1())))
    }
}

/// One end of a `MessageChannel`. Messages travel as structured-cloned plain
/// objects in the `{ type, payload }` shape.
pub struct WebMessagePort {
    port: web_sys::MessagePort,
    on_message: RefCell<Option<Closure<dyn FnMut(MessageEvent)>>>,
}

impl WebMessagePort {
    pub fn new(port: web_sys::MessagePort) -> Self {
        Self {
            port,
            on_message: RefCell::new(None),
        }
    }
}

impl MessagePort for WebMessagePort {
    fn post_message(&self, message: &Message) -> TransportResult<()> {
        let value = message
            .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
            .map_err(|error| TransportError::Post(error.to_string()))?;

        self.port
            .post_message(&value)
            .map_err(|error| TransportError::Post(format!("{:?}", error)))
    }

    fn set_message_handler(&self, handler: Box<dyn Fn(Message)>) {
        let on_message: Closure<dyn FnMut(MessageEvent)> =
            Closure::new(move |event: MessageEvent| {
                match serde_wasm_bindgen::from_value::<Message>(event.data()) {
                    Ok(message) => handler(message),
                    Err(error) => warn!(%error, "dropping undecodable message"),
                }
            });

        self.port
            .set_onmessage(Some(on_message.as_ref().unchecked_ref()));
        *self.on_message.borrow_mut() = Some(on_message);
    }
}

impl Drop for WebMessagePort {
    fn drop(&mut self) {
        self.port.set_onmessage(None);
        self.port.close();
    }
}
