//! # Live Canvas State
//!
//! The preview side of the builder/preview synchronization engine.
//!
//! ```text
//!   mounted components ──► Store ──► reducers (slices)
//!                            │
//!                            ├─► MeasureBoxModelsMiddleware ─► measurables
//!                            ├─► TransportMiddleware ◄──────► builder (HostMirror)
//!                            └─► PropControllerLifecycle ───► prop controllers
//!
//!   FrameLoop ─► measure_elements / document size ─► Store
//! ```

pub mod actions;
pub mod handle;
pub mod host;
pub mod lifecycle;
pub mod measure;
pub mod middleware;
pub mod modules;
pub mod preview;
pub mod store;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod transport;

pub use actions::{Action, ActionType, Message, FORWARDED_ACTION_TYPES};
pub use handle::{ComponentHandle, ComponentHandleRef, MeasureError, Measurable, PropControllable};
pub use host::{HostMirror, HostState};
pub use lifecycle::PropControllerLifecycle;
pub use measure::{
    initialize, DocumentElement, FrameHandle, FrameError, FrameLoop, FrameScheduler,
    MeasureBoxModelsMiddleware, Size, Teardown,
};
pub use middleware::Middleware;
pub use modules::box_models::{BoxModel, Rect, Spacing};
pub use modules::components_meta::ComponentMeta;
pub use modules::documents::{Document, Element, Operation, OperationError};
pub use preview::{configure_local_store, configure_store};
pub use store::{Snapshot, State, Store, StoreBuilder, WeakStore};
pub use transport::{Channel, MessagePort, TransportError, TransportMiddleware, TransportResult};
