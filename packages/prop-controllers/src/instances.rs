//! # Prop Controller Instances
//!
//! One controller exists per `(documentKey, elementKey, propName)` while the
//! element is mounted. Controllers are shared between the store's registry and
//! the mounted component through `Rc`, so their state lives behind `Cell` /
//! `RefCell`. Borrows are always released before a message is sent, because
//! sending dispatches into the store.

use crate::debounce::{CommitDebounce, CommitPhase};
use crate::descriptors::PropControllerDescriptor;
use crate::messages::{BuilderEditMode, PropControllerMessage};
use livecanvas_common::PropName;
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;
use web_time::Instant;
use tracing::trace;

/// Send callback pre-bound to one controller's triple
pub type SendMessage = Rc<dyn Fn(PropControllerMessage)>;

/// Live controllers of one element, keyed by prop name
pub type PropControllers = BTreeMap<PropName, Rc<PropController>>;

/// Build the controller matching a descriptor
pub fn create_prop_controller(
    descriptor: &PropControllerDescriptor,
    send: SendMessage,
    commit_debounce: Duration,
) -> PropController {
    match descriptor {
        PropControllerDescriptor::RichText { .. } => PropController::RichText(
            RichTextPropController::new(descriptor.clone(), send, commit_debounce),
        ),
        _ => PropController::Default(DefaultPropController::new(descriptor.clone(), send)),
    }
}

#[derive(Debug)]
pub enum PropController {
    RichText(RichTextPropController),
    Default(DefaultPropController),
}

impl PropController {
    /// Handle a message the builder addressed to this controller
    pub fn recv(&self, message: PropControllerMessage) {
        match self {
            PropController::RichText(controller) => controller.recv(message),
            PropController::Default(controller) => controller.recv(message),
        }
    }

    /// Send a message to the builder through the controller's bound callback
    pub fn send(&self, message: PropControllerMessage) {
        match self {
            PropController::RichText(controller) => (controller.send)(message),
            PropController::Default(controller) => controller.send(message),
        }
    }

    pub fn descriptor(&self) -> &PropControllerDescriptor {
        match self {
            PropController::RichText(controller) => &controller.descriptor,
            PropController::Default(controller) => &controller.descriptor,
        }
    }

    pub fn as_rich_text(&self) -> Option<&RichTextPropController> {
        match self {
            PropController::RichText(controller) => Some(controller),
            PropController::Default(_) => None,
        }
    }
}

/// Controller for props with no live edit protocol
pub struct DefaultPropController {
    descriptor: PropControllerDescriptor,
    send: SendMessage,
}

impl DefaultPropController {
    pub fn new(descriptor: PropControllerDescriptor, send: SendMessage) -> Self {
        Self { descriptor, send }
    }

    pub fn send(&self, message: PropControllerMessage) {
        (self.send)(message);
    }

    fn recv(&self, message: PropControllerMessage) {
        trace!(
            descriptor = self.descriptor.type_name(),
            ?message,
            "ignoring message for default prop controller"
        );
    }
}

impl fmt::Debug for DefaultPropController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefaultPropController")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

/// Controller for rich text props.
///
/// The mounted text component reports editor activity through this object
/// (`initialize_editor`, `change`, `focus`, ...) and asks it whether incoming
/// prop data may replace the local editor value (`receive_prop_value`).
pub struct RichTextPropController {
    descriptor: PropControllerDescriptor,
    send: SendMessage,
    edit_mode: Cell<BuilderEditMode>,
    focused: Cell<bool>,
    value: RefCell<Option<serde_json::Value>>,
    held_back: RefCell<Option<serde_json::Value>>,
    debounce: RefCell<CommitDebounce>,
}

impl RichTextPropController {
    pub fn new(
        descriptor: PropControllerDescriptor,
        send: SendMessage,
        commit_debounce: Duration,
    ) -> Self {
        Self {
            descriptor,
            send,
            edit_mode: Cell::new(BuilderEditMode::default()),
            focused: Cell::new(false),
            value: RefCell::new(None),
            held_back: RefCell::new(None),
            debounce: RefCell::new(CommitDebounce::new(commit_debounce)),
        }
    }

    pub fn edit_mode(&self) -> BuilderEditMode {
        self.edit_mode.get()
    }

    pub fn is_focused(&self) -> bool {
        self.focused.get()
    }

    /// The editor accepts input in every mode except `Interact`
    pub fn is_read_only(&self) -> bool {
        self.edit_mode.get() == BuilderEditMode::Interact
    }

    /// Current local editor value
    pub fn value(&self) -> Option<serde_json::Value> {
        self.value.borrow().clone()
    }

    pub fn debounce(&self) -> CommitDebounce {
        self.debounce.borrow().clone()
    }

    /// An editor attached to this controller
    pub fn initialize_editor(&self, value: serde_json::Value) {
        *self.value.borrow_mut() = Some(value.clone());
        (self.send)(PropControllerMessage::InitializeEditor { value });
    }

    /// The user edited the value locally
    pub fn change(&self, value: serde_json::Value, now: Instant) {
        if self.value.borrow().as_ref() == Some(&value) {
            return;
        }

        *self.value.borrow_mut() = Some(value.clone());
        self.debounce.borrow_mut().local_edit(now);

        (self.send)(PropControllerMessage::ChangeEditorValue { value });
    }

    /// Prop data received while the user was typing, not yet committed
    pub fn held_back_value(&self) -> Option<serde_json::Value> {
        self.held_back.borrow().clone()
    }

    /// Advance the commit timer. Once the quiet period is over, prop data
    /// held back while typing is committed and returned for display.
    pub fn tick(&self, now: Instant) -> Option<serde_json::Value> {
        let mut debounce = self.debounce.borrow_mut();
        debounce.tick(now);

        if debounce.phase() != CommitPhase::PendingCommit {
            return None;
        }

        let value = self.held_back.borrow_mut().take()?;
        debounce.commit();
        *self.value.borrow_mut() = Some(value.clone());
        Some(value)
    }

    /// Authoritative prop data arrived. Returns the value the editor should
    /// display if it was committed, or `None` while the user is still typing,
    /// in which case the latest value is kept for [`Self::tick`].
    pub fn receive_prop_value(
        &self,
        value: serde_json::Value,
        now: Instant,
    ) -> Option<serde_json::Value> {
        let mut debounce = self.debounce.borrow_mut();
        debounce.tick(now);

        if !debounce.should_commit() {
            *self.held_back.borrow_mut() = Some(value);
            return None;
        }

        debounce.commit();
        self.held_back.borrow_mut().take();
        *self.value.borrow_mut() = Some(value.clone());
        Some(value)
    }

    pub fn focus(&self) {
        self.focused.set(true);
        (self.send)(PropControllerMessage::Focus);
    }

    pub fn blur(&self) {
        self.focused.set(false);
        (self.send)(PropControllerMessage::Blur);
    }

    pub fn undo(&self) {
        (self.send)(PropControllerMessage::Undo);
    }

    pub fn redo(&self) {
        (self.send)(PropControllerMessage::Redo);
    }

    fn recv(&self, message: PropControllerMessage) {
        match message {
            PropControllerMessage::ChangeBuilderEditMode { edit_mode } => {
                let previous = self.edit_mode.replace(edit_mode);

                // Leaving content mode drops the editor's selection.
                if previous == BuilderEditMode::Content && edit_mode != BuilderEditMode::Content {
                    self.focused.set(false);
                }
            }
            other => trace!(message = ?other, "ignoring message for rich text controller"),
        }
    }
}

impl fmt::Debug for RichTextPropController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RichTextPropController")
            .field("edit_mode", &self.edit_mode.get())
            .field("focused", &self.focused.get())
            .field("value", &self.value.borrow())
            .field("held_back", &self.held_back.borrow())
            .field("debounce", &self.debounce.borrow())
            .finish_non_exhaustive()
    }
}
