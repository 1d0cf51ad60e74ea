//! State slices. Each slice owns one part of [`State`](crate::State) and
//! exposes a pure `reducer(&mut slice, &Action)`; unknown actions are no-ops.

pub mod box_models;
pub mod components_meta;
pub mod documents;
pub mod mounted_components;
pub mod prop_controller_handles;
pub mod prop_controllers;
