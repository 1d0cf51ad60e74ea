//! # Cross-Context Transport
//!
//! The preview opens a dedicated channel to the builder when the store is
//! built, keeps one endpoint and hands the other to the host.
//!
//! - Outbound: actions listed in [`FORWARDED_ACTION_TYPES`] are posted as
//!   [`Message`]s, in dispatch order.
//! - Inbound: every message is dispatched as an ordinary action.
//! - `CHANGE_DOCUMENT_ELEMENT_SCROLL_TOP` is applied to the live document
//!   element.
//!
//! Delivery is best effort. Send failures are logged and never retried; the
//! registration replay on open lets a reconnecting builder catch up.

use crate::actions::{self, Action, Message, FORWARDED_ACTION_TYPES};
use crate::measure::DocumentElement;
use crate::middleware::Middleware;
use crate::store::Store;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Failed to encode message: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Failed to open channel: {0}")]
    Open(String),

    #[error("Failed to post message: {0}")]
    Post(String),

    #[error("Port is closed")]
    Closed,
}

pub type TransportResult<T> = Result<T, TransportError>;

/// Handler invoked with each decoded inbound message
pub type MessageHandler = Box<dyn Fn(Message)>;

/// One endpoint of a bidirectional channel
pub trait MessagePort {
    fn post_message(&self, message: &Message) -> TransportResult<()>;

    /// Replaces any previous handler
    fn set_message_handler(&self, handler: MessageHandler);
}

/// Creates a channel and hands the remote endpoint to the other context
pub trait Channel {
    fn open(&self) -> TransportResult<Rc<dyn MessagePort>>;
}

/// Keeps the preview store in sync with the builder
pub struct TransportMiddleware {
    channel: Box<dyn Channel>,
    document_element: Option<Rc<dyn DocumentElement>>,
    port: RefCell<Option<Rc<dyn MessagePort>>>,
}

impl TransportMiddleware {
    pub fn new(channel: impl Channel + 'static) -> Self {
        Self {
            channel: Box::new(channel),
            document_element: None,
            port: RefCell::new(None),
        }
    }

    /// Document element that inbound scroll changes are applied to
    pub fn with_document_element(mut self, document_element: Rc<dyn DocumentElement>) -> Self {
        self.document_element = Some(document_element);
        self
    }

    fn post(&self, message: &Message) {
        let port = self.port.borrow().clone();

        let Some(port) = port else {
            debug!(message = %message.action_type(), "no open channel, dropping message");
            return;
        };

        if let Err(error) = port.post_message(message) {
            warn!(message = %message.action_type(), %error, "failed to post message");
        }
    }
}

/// Post every registered component type that has descriptors
fn replay_registered_components(store: &Store, port: &dyn MessagePort) {
    let messages: Vec<Message> = store.select(|state| {
        state
            .components_meta
            .iter()
            .filter_map(|(component_type, meta)| {
                let descriptors = state.get_component_prop_controller_descriptors(component_type)?;
                actions::register_component(component_type.clone(), meta.clone(), descriptors.clone())
                    .to_message()
            })
            .collect()
    });

    debug!(components = messages.len(), "replaying registered components");

    for message in &messages {
        if let Err(error) = port.post_message(message) {
            warn!(message = %message.action_type(), %error, "failed to replay component");
        }
    }
}

impl Middleware for TransportMiddleware {
    fn attach(&self, store: &Store) {
        let port = match self.channel.open() {
            Ok(port) => port,
            Err(error) => {
                warn!(%error, "could not open channel to the builder");
                return;
            }
        };

        let weak = store.downgrade();
        port.set_message_handler(Box::new(move |message| {
            let Some(store) = weak.upgrade() else {
                return;
            };

            debug!(message = %message.action_type(), "inbound");
            store.dispatch(Action::from(message));
        }));

        replay_registered_components(store, port.as_ref());

        *self.port.borrow_mut() = Some(port);
    }

    fn handle(&self, _store: &Store, action: &Action) {
        if let Action::ChangeDocumentElementScrollTop { scroll_top } = action {
            if let Some(document_element) = &self.document_element {
                document_element.set_scroll_top(*scroll_top);
            }
        }

        if !FORWARDED_ACTION_TYPES.contains(&action.action_type()) {
            return;
        }

        if let Some(message) = action.to_message() {
            debug!(message = %message.action_type(), "forwarding");
            self.post(&message);
        }
    }
}

impl fmt::Debug for TransportMiddleware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportMiddleware")
            .field("open", &self.port.borrow().is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::components_meta::ComponentMeta;
    use crate::testing::{MemoryChannel, MemoryDocumentElement};
    use crate::ActionType;
    use livecanvas_common::{CanvasConfig, ElementRef};
    use livecanvas_prop_controllers::PropControllerDescriptors;

    #[test]
    fn test_forwards_whitelisted_actions_only() {
        let channel = MemoryChannel::new();
        let host = channel.remote();
        let store = Store::builder(CanvasConfig::default())
            .middleware(TransportMiddleware::new(channel))
            .build();

        let element = ElementRef::new("doc1", "e1");
        store.dispatch(actions::mount_component(&element));
        store.dispatch(actions::change_document_element_scroll_top(10.0));
        store.dispatch(actions::unmount_component(&element));

        let types: Vec<ActionType> = host
            .take_messages()
            .iter()
            .map(Message::action_type)
            .collect();
        assert_eq!(
            types,
            vec![ActionType::MountComponent, ActionType::UnmountComponent]
        );
    }

    #[test]
    fn test_inbound_scroll_top_is_applied() {
        let channel = MemoryChannel::new();
        let (preview, host) = (channel.local(), channel.remote());
        let document_element = Rc::new(MemoryDocumentElement::default());
        let store = Store::builder(CanvasConfig::default())
            .middleware(
                TransportMiddleware::new(channel).with_document_element(document_element.clone()),
            )
            .build();

        host.post(&Message::ChangeDocumentElementScrollTop { scroll_top: 240.0 });
        assert_eq!(preview.deliver(), 1);

        assert_eq!(document_element.scroll_top(), 240.0);
        assert!(host.take_messages().is_empty());
        drop(store);
    }

    #[test]
    fn test_open_replays_preloaded_components() {
        let channel = MemoryChannel::new();
        let host = channel.remote();
        let store = Store::builder(CanvasConfig::default())
            .preload(actions::register_component(
                "Text",
                ComponentMeta::new("Text"),
                PropControllerDescriptors::new(),
            ))
            .middleware(TransportMiddleware::new(channel))
            .build();

        let messages = host.take_messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].action_type(), ActionType::RegisterComponent);

        store.dispatch(actions::register_component(
            "Button",
            ComponentMeta::new("Button"),
            PropControllerDescriptors::new(),
        ));
        assert_eq!(host.take_messages().len(), 1);
    }

    #[test]
    fn test_send_failure_is_not_fatal() {
        let channel = MemoryChannel::new();
        let host = channel.remote();
        let store = Store::builder(CanvasConfig::default())
            .middleware(TransportMiddleware::new(channel))
            .build();

        host.close();
        store.dispatch(actions::mount_component(&ElementRef::new("doc1", "e1")));

        assert!(store
            .state()
            .mounted_components
            .is_mounted(&ElementRef::new("doc1", "e1")));
    }

    #[test]
    fn test_inbound_messages_stop_after_store_is_dropped() {
        let channel = MemoryChannel::new();
        let (preview, host) = (channel.local(), channel.remote());
        let store = Store::builder(CanvasConfig::default())
            .middleware(TransportMiddleware::new(channel))
            .build();
        drop(store);

        host.post(&Message::MountComponent {
            document_key: "doc1".to_string(),
            element_key: "e1".to_string(),
        });
        preview.deliver();

        assert!(host.take_messages().is_empty());
    }
}
