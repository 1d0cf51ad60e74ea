//! # Prop Controllers
//!
//! Per-prop controller objects that bind one editable prop of one mounted
//! element to the builder.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────┐         ┌──────────────────────────────┐
//! │ builder                      │         │ preview component            │
//! │  MESSAGE_HOST_PROP_CONTROLLER│ ──────► │  PropController::recv        │
//! │                              │         │                              │
//! │  MESSAGE_BUILDER_PROP_...    │ ◄────── │  send (bound to the triple)  │
//! └──────────────────────────────┘         └──────────────────────────────┘
//! ```
//!
//! A controller is created from a [`PropControllerDescriptor`] together with a
//! send callback that is already bound to `(documentKey, elementKey, propName)`.
//! The controller never knows its own address; routing is the store's job.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use livecanvas_prop_controllers::{create_prop_controller, PropControllerDescriptor};
//!
//! let controller = create_prop_controller(&descriptor, send, Duration::from_millis(500));
//!
//! if let Some(text) = controller.as_rich_text() {
//!     text.change(new_value, Instant::now());
//! }
//! ```

mod debounce;
mod descriptors;
mod errors;
mod instances;
mod link;
mod messages;

pub use debounce::{CommitDebounce, CommitPhase};
pub use descriptors::{
    descriptors_from_value, ElementIdConfig, FieldOptions, LinkValue, NumberOptions, PropControllerDescriptor,
    PropControllerDescriptors, RichTextOptions, ScrollBlock, TextAreaOptions,
};
pub use errors::{PropControllerError, PropControllerResult};
pub use instances::{
    create_prop_controller, DefaultPropController, PropController, PropControllers,
    RichTextPropController, SendMessage,
};
pub use link::{resolve_link, LinkTarget, ResolvedLink};
pub use messages::{BuilderEditMode, PropControllerMessage};

/// Clock used for commit debouncing; `std::time::Instant` outside the browser
pub use web_time::Instant;
