//! The contract between the store and mounted preview components.
//!
//! A mounted component registers one [`ComponentHandle`]. The store probes it
//! for optional capabilities instead of relying on a type hierarchy.

use crate::modules::box_models::BoxModel;
use livecanvas_prop_controllers::PropControllers;
use std::fmt;
use std::rc::Rc;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeasureError {
    #[error("Element is not attached to the document")]
    Detached,

    #[error("Measurement failed: {0}")]
    Failed(String),
}

/// Reports the box model of a rendered element
pub trait Measurable {
    /// `Ok(None)` when the element currently has no geometry
    fn measure(&self) -> Result<Option<BoxModel>, MeasureError>;
}

/// Receives the live prop controllers of its element
pub trait PropControllable {
    /// `None` clears the controllers; always called before they are torn down
    fn set_prop_controllers(&self, prop_controllers: Option<PropControllers>);
}

pub trait ComponentHandle: fmt::Debug {
    fn as_measurable(&self) -> Option<&dyn Measurable> {
        None
    }

    fn as_prop_controllable(&self) -> Option<&dyn PropControllable> {
        None
    }
}

pub type ComponentHandleRef = Rc<dyn ComponentHandle>;
