//! Store presets for the preview.

use crate::lifecycle::PropControllerLifecycle;
use crate::measure::{DocumentElement, MeasureBoxModelsMiddleware};
use crate::store::Store;
use crate::transport::{Channel, TransportMiddleware};
use livecanvas_common::CanvasConfig;
use std::rc::Rc;
use tracing::debug;

/// The preview store: measurement, the builder channel when running inside
/// the builder, and the prop controller lifecycle.
pub fn configure_store(
    config: CanvasConfig,
    channel: impl Channel + 'static,
    document_element: Rc<dyn DocumentElement>,
) -> Store {
    if !config.is_in_builder {
        debug!("not running in the builder, skipping transport");
        return configure_local_store(config);
    }

    Store::builder(config)
        .middleware(MeasureBoxModelsMiddleware)
        .middleware(TransportMiddleware::new(channel).with_document_element(document_element))
        .middleware(PropControllerLifecycle)
        .build()
}

/// A store that never talks to a builder
pub fn configure_local_store(config: CanvasConfig) -> Store {
    Store::builder(config)
        .middleware(MeasureBoxModelsMiddleware)
        .middleware(PropControllerLifecycle)
        .build()
}
