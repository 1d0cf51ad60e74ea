//! In-memory stand-ins for the browser: a manual frame scheduler, a document
//! element, recording component handles and a message channel whose ports
//! exchange JSON strings.

use crate::actions::{Action, Message};
use crate::handle::{ComponentHandle, MeasureError, Measurable, PropControllable};
use crate::measure::{DocumentElement, FrameError, FrameHandle, FrameScheduler, Size};
use crate::middleware::Middleware;
use crate::modules::box_models::BoxModel;
use crate::store::Store;
use crate::transport::{Channel, MessageHandler, MessagePort, TransportError, TransportResult};
use livecanvas_common::PropName;
use livecanvas_prop_controllers::PropControllers;
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use std::rc::{Rc, Weak};
use tracing::warn;

/// Frames run only when the test asks for them
#[derive(Default)]
pub struct ManualFrameScheduler {
    next_id: Cell<i32>,
    callbacks: RefCell<BTreeMap<i32, Box<dyn FnOnce()>>>,
}

impl ManualFrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> usize {
        self.callbacks.borrow().len()
    }

    /// Run every callback requested before this frame started
    pub fn run_frame(&self) {
        let callbacks = std::mem::take(&mut *self.callbacks.borrow_mut());

        for (_, callback) in callbacks {
            callback();
        }
    }

    pub fn run_frames(&self, count: usize) {
        for _ in 0..count {
            self.run_frame();
        }
    }
}

impl FrameScheduler for ManualFrameScheduler {
    fn request_frame(&self, callback: Box<dyn FnOnce()>) -> Result<FrameHandle, FrameError> {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        self.callbacks.borrow_mut().insert(id, callback);
        Ok(FrameHandle(id))
    }

    fn cancel_frame(&self, handle: FrameHandle) {
        self.callbacks.borrow_mut().remove(&handle.0);
    }
}

impl fmt::Debug for ManualFrameScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManualFrameScheduler")
            .field("pending", &self.pending())
            .finish()
    }
}

#[derive(Debug, Default)]
pub struct MemoryDocumentElement {
    size: Cell<Size>,
    scroll_top: Cell<f64>,
}

impl MemoryDocumentElement {
    pub fn set_size(&self, size: Size) {
        self.scroll_top.set(size.scroll_top);
        self.size.set(size);
    }

    pub fn scroll_top(&self) -> f64 {
        self.scroll_top.get()
    }
}

impl DocumentElement for MemoryDocumentElement {
    fn size(&self) -> Size {
        Size {
            scroll_top: self.scroll_top.get(),
            ..self.size.get()
        }
    }

    fn set_scroll_top(&self, scroll_top: f64) {
        self.scroll_top.set(scroll_top);
    }
}

/// What a [`TestHandle`] was told about its prop controllers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandleEvent {
    /// Controllers pushed, by prop name
    Set(Vec<PropName>),
    Cleared,
}

/// A component handle that records every controller push
pub struct TestHandle {
    measurement: Option<RefCell<Result<Option<BoxModel>, MeasureError>>>,
    prop_controllable: bool,
    events: RefCell<Vec<HandleEvent>>,
    prop_controllers: RefCell<Option<PropControllers>>,
    observer: RefCell<Option<Box<dyn Fn(&HandleEvent)>>>,
}

impl TestHandle {
    fn new(box_model: Option<BoxModel>, prop_controllable: bool) -> Rc<Self> {
        Rc::new(Self {
            measurement: box_model.map(|box_model| RefCell::new(Ok(Some(box_model)))),
            prop_controllable,
            events: RefCell::new(Vec::new()),
            prop_controllers: RefCell::new(None),
            observer: RefCell::new(None),
        })
    }

    /// A handle with neither capability
    pub fn plain() -> Rc<Self> {
        Self::new(None, false)
    }

    pub fn measurable(box_model: BoxModel) -> Rc<Self> {
        Self::new(Some(box_model), false)
    }

    pub fn prop_controllable() -> Rc<Self> {
        Self::new(None, true)
    }

    /// Measurable and prop-controllable, like most rendered components
    pub fn component(box_model: BoxModel) -> Rc<Self> {
        Self::new(Some(box_model), true)
    }

    pub fn set_box_model(&self, box_model: Option<BoxModel>) {
        if let Some(measurement) = &self.measurement {
            *measurement.borrow_mut() = Ok(box_model);
        }
    }

    pub fn fail_measurement(&self) {
        if let Some(measurement) = &self.measurement {
            *measurement.borrow_mut() = Err(MeasureError::Detached);
        }
    }

    /// Called on every push, after it is recorded
    pub fn on_event(&self, observer: impl Fn(&HandleEvent) + 'static) {
        *self.observer.borrow_mut() = Some(Box::new(observer));
    }

    pub fn events(&self) -> Vec<HandleEvent> {
        self.events.borrow().clone()
    }

    /// The controllers most recently pushed, if not cleared since
    pub fn prop_controllers(&self) -> Option<PropControllers> {
        self.prop_controllers.borrow().clone()
    }
}

impl ComponentHandle for TestHandle {
    fn as_measurable(&self) -> Option<&dyn Measurable> {
        self.measurement.as_ref().map(|_| self as &dyn Measurable)
    }

    fn as_prop_controllable(&self) -> Option<&dyn PropControllable> {
        self.prop_controllable.then_some(self as &dyn PropControllable)
    }
}

impl Measurable for TestHandle {
    fn measure(&self) -> Result<Option<BoxModel>, MeasureError> {
        match &self.measurement {
            Some(measurement) => measurement.borrow().clone(),
            None => Ok(None),
        }
    }
}

impl PropControllable for TestHandle {
    fn set_prop_controllers(&self, prop_controllers: Option<PropControllers>) {
        let event = match &prop_controllers {
            Some(controllers) => HandleEvent::Set(controllers.keys().cloned().collect()),
            None => HandleEvent::Cleared,
        };

        *self.prop_controllers.borrow_mut() = prop_controllers;
        self.events.borrow_mut().push(event.clone());

        if let Some(observer) = self.observer.borrow().as_ref() {
            observer(&event);
        }
    }
}

impl fmt::Debug for TestHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestHandle")
            .field("measurable", &self.measurement.is_some())
            .field("prop_controllable", &self.prop_controllable)
            .field("events", &self.events.borrow())
            .finish_non_exhaustive()
    }
}

/// Middleware that hands every action to a closure
pub struct ActionRecorder {
    observe: Box<dyn Fn(&Action)>,
}

impl ActionRecorder {
    pub fn new(observe: impl Fn(&Action) + 'static) -> Self {
        Self {
            observe: Box::new(observe),
        }
    }
}

impl Middleware for ActionRecorder {
    fn handle(&self, _store: &Store, action: &Action) {
        (self.observe)(action);
    }
}

/// One end of a [`MemoryChannel`]. Messages posted here queue up in the
/// peer's inbox as JSON until the peer calls [`MemoryPort::deliver`] or
/// [`MemoryPort::take_messages`].
#[derive(Default)]
pub struct MemoryPort {
    peer: RefCell<Weak<MemoryPort>>,
    inbox: RefCell<VecDeque<String>>,
    handler: RefCell<Option<MessageHandler>>,
    closed: Cell<bool>,
}

impl MemoryPort {
    /// Post, logging instead of returning failures
    pub fn post(&self, message: &Message) {
        if let Err(error) = self.post_message(message) {
            warn!(%error, "memory port post failed");
        }
    }

    /// Queue raw JSON for the peer, bypassing encoding
    pub fn post_raw(&self, json: impl Into<String>) {
        if let Some(peer) = self.peer.borrow().upgrade() {
            peer.inbox.borrow_mut().push_back(json.into());
        }
    }

    pub fn close(&self) {
        self.closed.set(true);
    }

    pub fn queued(&self) -> usize {
        self.inbox.borrow().len()
    }

    /// Hand queued messages to this port's handler, in order. Returns how
    /// many were handled.
    pub fn deliver(&self) -> usize {
        let mut delivered = 0;

        loop {
            let next = self.inbox.borrow_mut().pop_front();
            let Some(json) = next else {
                return delivered;
            };

            let message = match Message::from_json(&json) {
                Ok(message) => message,
                Err(error) => {
                    warn!(%error, "dropping undecodable message");
                    continue;
                }
            };

            if let Some(handler) = self.handler.borrow().as_ref() {
                handler(message);
                delivered += 1;
            }
        }
    }

    /// Drain and decode the inbox without running the handler
    pub fn take_messages(&self) -> Vec<Message> {
        self.inbox
            .borrow_mut()
            .drain(..)
            .filter_map(|json| Message::from_json(&json).ok())
            .collect()
    }
}

impl MessagePort for MemoryPort {
    fn post_message(&self, message: &Message) -> TransportResult<()> {
        if self.closed.get() {
            return Err(TransportError::Closed);
        }

        let json = message.to_json()?;
        let peer = self.peer.borrow().upgrade().ok_or(TransportError::Closed)?;
        peer.inbox.borrow_mut().push_back(json);
        Ok(())
    }

    fn set_message_handler(&self, handler: MessageHandler) {
        *self.handler.borrow_mut() = Some(handler);
    }
}

impl fmt::Debug for MemoryPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryPort")
            .field("queued", &self.queued())
            .field("closed", &self.closed.get())
            .finish_non_exhaustive()
    }
}

/// A linked pair of [`MemoryPort`]s. `open` returns the local end; the
/// remote end plays the builder.
#[derive(Debug)]
pub struct MemoryChannel {
    local: Rc<MemoryPort>,
    remote: Rc<MemoryPort>,
}

impl MemoryChannel {
    pub fn new() -> Self {
        let local = Rc::new(MemoryPort::default());
        let remote = Rc::new(MemoryPort::default());

        *local.peer.borrow_mut() = Rc::downgrade(&remote);
        *remote.peer.borrow_mut() = Rc::downgrade(&local);

        Self { local, remote }
    }

    pub fn local(&self) -> Rc<MemoryPort> {
        self.local.clone()
    }

    pub fn remote(&self) -> Rc<MemoryPort> {
        self.remote.clone()
    }
}

impl Default for MemoryChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl Channel for MemoryChannel {
    fn open(&self) -> TransportResult<Rc<dyn MessagePort>> {
        Ok(self.local.clone())
    }
}
