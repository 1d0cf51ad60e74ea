//! Integration tests for the preview store, the channel and the host mirror

use livecanvas_common::{CanvasConfig, ElementRef, PropRef};
use livecanvas_prop_controllers::{
    BuilderEditMode, PropControllerDescriptor, PropControllerMessage,
};
use livecanvas_state::actions;
use livecanvas_state::testing::{
    ActionRecorder, HandleEvent, ManualFrameScheduler, MemoryChannel, MemoryDocumentElement,
    MemoryPort, TestHandle,
};
use livecanvas_state::{
    configure_store, initialize, Action, ActionType, BoxModel, ComponentMeta, Document, Element,
    HostMirror, MeasureBoxModelsMiddleware, Message, Operation, PropControllerLifecycle, Rect,
    Spacing, Store, Teardown, TransportMiddleware,
};
use serde_json::json;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use std::time::{Duration, Instant};

struct Harness {
    store: Store,
    preview: Rc<MemoryPort>,
    host: Rc<MemoryPort>,
    mirror: HostMirror,
    scheduler: Rc<ManualFrameScheduler>,
    document_element: Rc<MemoryDocumentElement>,
    teardown: Teardown,
}

impl Harness {
    fn new() -> Self {
        let channel = MemoryChannel::new();
        let (preview, host) = (channel.local(), channel.remote());
        let scheduler = Rc::new(ManualFrameScheduler::new());
        let document_element = Rc::new(MemoryDocumentElement::default());

        let store = configure_store(CanvasConfig::default(), channel, document_element.clone());
        let mirror = HostMirror::adopt(host.clone());
        let teardown = initialize(&store, scheduler.clone(), document_element.clone());

        Self {
            store,
            preview,
            host,
            mirror,
            scheduler,
            document_element,
            teardown,
        }
    }

    /// Deliver everything queued in both directions until both sides are idle
    fn sync(&self) {
        while self.preview.deliver() + self.host.deliver() > 0 {}
    }

    fn register_text_component(&self) {
        self.store.dispatch(actions::register_component(
            "T",
            ComponentMeta::new("Text"),
            BTreeMap::from([("text".to_string(), PropControllerDescriptor::rich_text())]),
        ));
    }

    fn register_page(&self) {
        self.mirror
            .register_document(page())
            .expect("document posted");
        self.sync();
    }

    fn controller_count(&self) -> usize {
        self.store
            .select(|state| state.prop_controller_handles.controller_count())
    }
}

fn page() -> Document {
    Document::new(
        "doc1",
        Element::new("root", "Root")
            .with_child(Element::new("e1", "T").with_prop("text", json!("Hello")))
            .with_child(Element::new("e2", "T")),
    )
}

fn box_model(width: f64) -> BoxModel {
    BoxModel::create(
        Rect::new(0.0, 0.0, width, 20.0),
        Spacing::default(),
        Spacing::default(),
        Spacing::default(),
    )
}

#[test]
fn test_end_to_end_prop_controller_round_trip() {
    let harness = Harness::new();
    harness.register_text_component();
    harness.register_page();

    let element = ElementRef::new("doc1", "e1");
    let text = element.prop("text");
    let handle = TestHandle::component(box_model(100.0));

    harness.store.dispatch(actions::mount_component(&element));
    harness
        .store
        .dispatch(actions::register_component_handle(&element, handle.clone()));

    // One controller for the triple
    assert_eq!(harness.controller_count(), 1);
    let controllers = handle.prop_controllers().expect("controllers pushed");
    let rich_text = controllers["text"].as_rich_text().expect("rich text controller");

    // An edit reaches the builder tagged with the triple
    rich_text.change(json!("Hello, world"), Instant::now());
    harness.sync();

    assert!(harness.mirror.is_mounted(&element));
    assert_eq!(
        harness.mirror.take_prop_controller_messages(),
        vec![(
            text.clone(),
            PropControllerMessage::ChangeEditorValue {
                value: json!("Hello, world")
            }
        )]
    );

    // The builder switches modes through the same triple
    harness
        .mirror
        .message_prop_controller(
            &text,
            PropControllerMessage::ChangeBuilderEditMode {
                edit_mode: BuilderEditMode::Interact,
            },
        )
        .expect("message posted");
    harness.sync();
    assert!(rich_text.is_read_only());

    // Unmount removes the controller
    harness
        .store
        .dispatch(actions::unregister_component_handle(&element));
    harness.store.dispatch(actions::unmount_component(&element));
    harness.sync();

    assert_eq!(harness.controller_count(), 0);
    assert_eq!(handle.events().last(), Some(&HandleEvent::Cleared));
    assert!(!harness.mirror.is_mounted(&element));

    // A late message for the torn-down controller changes nothing
    let before = harness.store.snapshot();
    harness
        .mirror
        .message_prop_controller(&text, PropControllerMessage::Focus)
        .expect("message posted");
    harness.sync();
    assert_eq!(harness.store.snapshot(), before);
}

#[test]
fn test_no_geometry_actions_after_baseline_frame() {
    let harness = Harness::new();
    let element = ElementRef::new("doc1", "e1");
    let handle = TestHandle::measurable(box_model(100.0));
    harness
        .store
        .dispatch(actions::register_component_handle(&element, handle.clone()));

    harness.scheduler.run_frame();
    harness.sync();
    assert_eq!(harness.mirror.state().box_models.get("e1"), Some(&box_model(100.0)));

    harness.scheduler.run_frames(2);
    let after_baseline: Vec<ActionType> = harness
        .host
        .take_messages()
        .iter()
        .map(Message::action_type)
        .collect();
    assert!(after_baseline.is_empty(), "unexpected {:?}", after_baseline);

    // A layout change is reported once
    handle.set_box_model(Some(box_model(120.0)));
    harness.scheduler.run_frames(2);
    let messages = harness.host.take_messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].action_type(), ActionType::ChangeElementBoxModels);
}

#[test]
fn test_geometry_removed_when_handle_unregisters() {
    let harness = Harness::new();
    let element = ElementRef::new("doc1", "e1");
    harness.store.dispatch(actions::register_component_handle(
        &element,
        TestHandle::measurable(box_model(100.0)),
    ));
    harness.scheduler.run_frame();
    harness.sync();

    harness
        .store
        .dispatch(actions::unregister_component_handle(&element));
    harness.scheduler.run_frame();
    harness.sync();

    assert!(harness.mirror.state().box_models.is_empty());
    assert!(harness
        .store
        .select(|state| state.box_models.box_models.is_empty()));
}

#[test]
fn test_document_size_and_scroll_sync() {
    let harness = Harness::new();

    harness.scheduler.run_frame();
    harness.sync();
    assert!(harness.mirror.state().document_element_size.is_some());

    harness.mirror.scroll_to(300.0).expect("scroll posted");
    harness.sync();
    assert_eq!(harness.document_element.scroll_top(), 300.0);

    // The new scroll offset comes back as a size change on the next frame
    harness.scheduler.run_frame();
    harness.sync();
    assert_eq!(
        harness
            .mirror
            .state()
            .document_element_size
            .map(|size| size.scroll_top),
        Some(300.0)
    );

    harness.teardown.stop();
    assert_eq!(harness.scheduler.pending(), 0);
}

#[test]
fn test_mount_unmount_sequences_leave_consistent_controllers() {
    let sequences: &[&[bool]] = &[
        &[true],
        &[true, false],
        &[true, true],
        &[true, true, false],
        &[false, true, false, true],
        &[true, false, true, false, false],
    ];

    for sequence in sequences {
        let harness = Harness::new();
        harness.register_text_component();
        harness.register_page();
        let element = ElementRef::new("doc1", "e1");

        let mut mounted = false;
        for &mount in sequence.iter() {
            if mount {
                harness.store.dispatch(actions::register_component_handle(
                    &element,
                    TestHandle::component(box_model(10.0)),
                ));
            } else {
                harness
                    .store
                    .dispatch(actions::unregister_component_handle(&element));
            }
            mounted = mount;
        }

        let expected = if mounted { 1 } else { 0 };
        assert_eq!(harness.controller_count(), expected, "sequence {:?}", sequence);
    }
}

#[test]
fn test_controllers_cleared_before_registry_removal() {
    let harness = Harness::new();
    harness.register_text_component();
    harness.register_page();

    let element = ElementRef::new("doc1", "e1");
    let handle = TestHandle::prop_controllable();
    let weak = harness.store.downgrade();
    let registered_at_clear = Rc::new(RefCell::new(Vec::new()));

    let sink = registered_at_clear.clone();
    let observed = element.clone();
    handle.on_event(move |event| {
        if *event == HandleEvent::Cleared {
            if let Some(store) = weak.upgrade() {
                sink.borrow_mut().push(store.select(|state| {
                    state.prop_controller_handles.get_prop_controllers(&observed).is_some()
                }));
            }
        }
    });

    harness
        .store
        .dispatch(actions::register_component_handle(&element, handle.clone()));
    harness
        .store
        .dispatch(actions::unregister_component_handle(&element));

    assert_eq!(*registered_at_clear.borrow(), vec![true]);
    assert_eq!(harness.controller_count(), 0);
}

#[test]
fn test_message_without_controller_leaves_state_identical() {
    let harness = Harness::new();
    harness.register_text_component();
    harness.register_page();

    let before = harness.store.snapshot();
    harness.store.dispatch(actions::message_host_prop_controller(
        &PropRef::new("doc1", "missing", "text"),
        PropControllerMessage::Undo,
    ));

    assert_eq!(harness.store.snapshot(), before);
}

#[test]
fn test_replay_through_transport_equals_local_dispatch() -> anyhow::Result<()> {
    let messages = vec![
        Message::RegisterDocument { document: page() },
        Message::ChangeDocument {
            document_key: "doc1".to_string(),
            operation: Operation::SetProp {
                element_key: "e2".to_string(),
                prop_name: "text".to_string(),
                value: json!("Second"),
            },
        },
        Message::MountComponent {
            document_key: "doc1".to_string(),
            element_key: "e1".to_string(),
        },
        Message::ChangeDocument {
            document_key: "doc1".to_string(),
            operation: Operation::MoveElement {
                element_key: "e2".to_string(),
                new_parent_key: "e1".to_string(),
                index: 0,
            },
        },
        Message::ChangeDocumentElementScrollTop { scroll_top: 40.0 },
    ];

    let local = Store::builder(CanvasConfig::default())
        .middleware(MeasureBoxModelsMiddleware)
        .middleware(PropControllerLifecycle)
        .build();
    for message in &messages {
        local.dispatch(Action::from(message.clone()));
    }

    let channel = MemoryChannel::new();
    let (preview, host) = (channel.local(), channel.remote());
    let remote = Store::builder(CanvasConfig::default())
        .middleware(MeasureBoxModelsMiddleware)
        .middleware(TransportMiddleware::new(channel))
        .middleware(PropControllerLifecycle)
        .build();
    for message in &messages {
        host.post(&serde_json::from_str(&serde_json::to_string(message)?)?);
    }
    assert_eq!(preview.deliver(), messages.len());

    assert_eq!(remote.snapshot(), local.snapshot());
    Ok(())
}

#[test]
fn test_undecodable_inbound_message_is_dropped() {
    let harness = Harness::new();
    let before = harness.store.snapshot();

    harness.host.post_raw(r#"{ "type": "REGISTER_COMPONENT_HANDLE", "payload": {} }"#);
    harness.host.post_raw("not json");
    harness.sync();

    assert_eq!(harness.store.snapshot(), before);
}

#[test]
fn test_rejected_document_operation_is_not_fatal() {
    let harness = Harness::new();
    harness.register_page();
    let before = harness.store.snapshot();

    harness
        .mirror
        .change_document(
            "doc1",
            Operation::RemoveElement {
                element_key: "root".to_string(),
            },
        )
        .expect("operation posted");
    harness.sync();

    assert_eq!(harness.store.snapshot(), before);
}

#[test]
fn test_rich_text_commit_debounce_through_store() {
    let harness = Harness::new();
    harness.register_text_component();
    harness.register_page();

    let element = ElementRef::new("doc1", "e1");
    let handle = TestHandle::prop_controllable();
    harness
        .store
        .dispatch(actions::register_component_handle(&element, handle.clone()));
    let controllers = handle.prop_controllers().expect("controllers pushed");
    let rich_text = controllers["text"].as_rich_text().expect("rich text controller");

    let t0 = Instant::now();
    rich_text.change(json!("Hello, w"), t0);

    // The builder echoes an older value while the user is still typing
    assert_eq!(
        rich_text.receive_prop_value(json!("Hello"), t0 + Duration::from_millis(100)),
        None
    );
    assert_eq!(
        rich_text.receive_prop_value(json!("Hello, w"), t0 + Duration::from_millis(600)),
        Some(json!("Hello, w"))
    );
}

#[test]
fn test_registration_replay_reaches_new_builder() {
    let recorded = Rc::new(RefCell::new(Vec::new()));
    let sink = recorded.clone();
    let channel = MemoryChannel::new();
    let host = channel.remote();

    let _store = Store::builder(CanvasConfig::default())
        .preload(actions::register_component(
            "T",
            ComponentMeta::new("Text"),
            BTreeMap::from([("text".to_string(), PropControllerDescriptor::rich_text())]),
        ))
        .middleware(TransportMiddleware::new(channel))
        .middleware(ActionRecorder::new(move |action: &Action| {
            sink.borrow_mut().push(action.action_type());
        }))
        .build();

    let mirror = HostMirror::adopt(host.clone());
    host.deliver();

    assert!(mirror.state().components.contains_key("T"));
    // Replay is posted directly, not dispatched
    assert!(recorded.borrow().is_empty());
}
