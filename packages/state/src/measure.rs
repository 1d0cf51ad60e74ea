//! # Measurement Loop
//!
//! Every frame, re-measure registered measurables and the document element,
//! and dispatch only what changed.
//!
//! ```text
//! frame ─► measure all ─► diff against state ─► CHANGE_ELEMENT_BOX_MODELS (if any)
//!       └► document size ─► diff against last ─► CHANGE_DOCUMENT_ELEMENT_SIZE (if changed)
//! ```
//!
//! Frames come from a [`FrameScheduler`], so the same loop runs on
//! `requestAnimationFrame` in the browser and on a manual scheduler in tests.

use crate::actions::{self, Action, ChangedBoxModels};
use crate::handle::ComponentHandleRef;
use crate::middleware::Middleware;
use crate::modules::box_models::BoxModel;
use crate::store::Store;
use livecanvas_common::{ElementKey, ElementRef};
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;
use thiserror::Error;
use tracing::{debug, trace, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub i32);

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FrameError {
    #[error("Frame request failed: {0}")]
    Request(String),
}

pub trait FrameScheduler {
    fn request_frame(&self, callback: Box<dyn FnOnce()>) -> Result<FrameHandle, FrameError>;
    fn cancel_frame(&self, handle: FrameHandle);
}

/// Offset, client and scroll dimensions of the outer document element
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Size {
    pub offset_width: f64,
    pub offset_height: f64,
    pub client_width: f64,
    pub client_height: f64,
    pub scroll_width: f64,
    pub scroll_height: f64,
    pub scroll_top: f64,
    pub scroll_left: f64,
}

pub trait DocumentElement {
    fn size(&self) -> Size;
    fn set_scroll_top(&self, scroll_top: f64);
}

struct FrameLoopState {
    scheduler: Rc<dyn FrameScheduler>,
    tick: RefCell<Box<dyn FnMut()>>,
    pending: Cell<Option<FrameHandle>>,
    stopped: Cell<bool>,
}

/// Runs `tick` once per frame until stopped or dropped
pub struct FrameLoop {
    state: Rc<FrameLoopState>,
}

impl FrameLoop {
    pub fn start(scheduler: Rc<dyn FrameScheduler>, tick: impl FnMut() + 'static) -> Self {
        let state = Rc::new(FrameLoopState {
            scheduler,
            tick: RefCell::new(Box::new(tick)),
            pending: Cell::new(None),
            stopped: Cell::new(false),
        });

        schedule(&state);

        Self { state }
    }

    pub fn is_running(&self) -> bool {
        !self.state.stopped.get()
    }

    /// Cancel the pending frame. Stopping twice is a no-op.
    pub fn stop(&self) {
        if self.state.stopped.replace(true) {
            return;
        }

        if let Some(handle) = self.state.pending.take() {
            self.state.scheduler.cancel_frame(handle);
        }
    }
}

impl Drop for FrameLoop {
    fn drop(&mut self) {
        self.stop();
    }
}

fn schedule(state: &Rc<FrameLoopState>) {
    let weak = Rc::downgrade(state);
    let callback = Box::new(move || {
        if let Some(state) = weak.upgrade() {
            run_frame(&state);
        }
    });

    match state.scheduler.request_frame(callback) {
        Ok(handle) => state.pending.set(Some(handle)),
        Err(error) => {
            warn!(%error, "could not schedule frame, stopping loop");
            state.stopped.set(true);
        }
    }
}

fn run_frame(state: &Rc<FrameLoopState>) {
    state.pending.set(None);

    if state.stopped.get() {
        return;
    }

    (state.tick.borrow_mut())();

    if !state.stopped.get() {
        schedule(state);
    }
}

/// Stops every loop started by [`initialize`]; dropping it does the same
pub struct Teardown {
    loops: Vec<FrameLoop>,
}

impl Teardown {
    pub fn stop(&self) {
        for frame_loop in &self.loops {
            frame_loop.stop();
        }
    }

    pub fn is_running(&self) -> bool {
        self.loops.iter().any(FrameLoop::is_running)
    }
}

fn measure(element_key: &str, handle: &ComponentHandleRef) -> Option<BoxModel> {
    let measurable = handle.as_measurable()?;

    match measurable.measure() {
        Ok(box_model) => box_model,
        Err(error) => {
            debug!(element_key, %error, "measurement failed");
            None
        }
    }
}

/// Measure every registered measurable once and dispatch the changes
pub fn measure_elements(store: &Store) {
    let (measurables, current) = store.select(|state| {
        let measurables: Vec<(ElementKey, ComponentHandleRef)> = state
            .box_models
            .measurables
            .iter()
            .map(|(element, handle)| (element.element_key.clone(), handle.clone()))
            .collect();
        (measurables, state.box_models.box_models.clone())
    });

    let measured: BTreeMap<ElementKey, BoxModel> = measurables
        .into_iter()
        .filter_map(|(element_key, handle)| {
            measure(&element_key, &handle).map(|box_model| (element_key, box_model))
        })
        .collect();

    let mut changed = ChangedBoxModels::new();

    for element_key in current.keys() {
        if !measured.contains_key(element_key) {
            changed.insert(element_key.clone(), None);
        }
    }

    for (element_key, box_model) in measured {
        if current.get(&element_key) != Some(&box_model) {
            changed.insert(element_key, Some(box_model));
        }
    }

    if changed.is_empty() {
        return;
    }

    trace!(changed = changed.len(), "box models changed");
    store.dispatch(Action::ChangeElementBoxModels {
        changed_element_box_models: changed,
    });
}

pub fn start_measuring_elements(store: &Store, scheduler: Rc<dyn FrameScheduler>) -> FrameLoop {
    let store = store.clone();
    FrameLoop::start(scheduler, move || measure_elements(&store))
}

pub fn start_measuring_document_element(
    store: &Store,
    scheduler: Rc<dyn FrameScheduler>,
    document_element: Rc<dyn DocumentElement>,
) -> FrameLoop {
    let store = store.clone();
    let mut last_size: Option<Size> = None;

    FrameLoop::start(scheduler, move || {
        let size = document_element.size();

        if last_size != Some(size) {
            last_size = Some(size);
            store.dispatch(actions::change_document_element_size(size));
        }
    })
}

/// Start the element loop, and the document element loop unless disabled
/// in the config.
pub fn initialize(
    store: &Store,
    scheduler: Rc<dyn FrameScheduler>,
    document_element: Rc<dyn DocumentElement>,
) -> Teardown {
    let mut loops = vec![start_measuring_elements(store, scheduler.clone())];

    if store.config().measure_document_element {
        loops.push(start_measuring_document_element(
            store,
            scheduler,
            document_element,
        ));
    }

    Teardown { loops }
}

/// Registers measurable handles as they mount
#[derive(Debug, Default)]
pub struct MeasureBoxModelsMiddleware;

impl Middleware for MeasureBoxModelsMiddleware {
    fn handle(&self, store: &Store, action: &Action) {
        match action {
            Action::RegisterComponentHandle {
                document_key,
                element_key,
                component_handle,
            } => {
                if component_handle.as_measurable().is_some() {
                    let element = ElementRef::new(document_key.clone(), element_key.clone());
                    store.dispatch(actions::register_measurable(
                        &element,
                        component_handle.clone(),
                    ));
                }
            }

            Action::UnregisterComponentHandle {
                document_key,
                element_key,
            } => {
                let element = ElementRef::new(document_key.clone(), element_key.clone());
                store.dispatch(actions::unregister_measurable(&element));
            }

            _ => {}
        }
    }
}
