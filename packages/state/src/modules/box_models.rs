//! # Box Models
//!
//! Geometry of measured elements, keyed by element key as on the wire. The
//! slice keeps the registered measurables, addressed by document and element,
//! next to their last reported box model so the frame loop can diff a fresh
//! measurement against state.

use crate::actions::Action;
use crate::handle::ComponentHandleRef;
use livecanvas_common::{ElementKey, ElementRef};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn top(&self) -> f64 {
        self.y
    }

    pub fn left(&self) -> f64 {
        self.x
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn expand(&self, by: &Spacing) -> Rect {
        Rect {
            x: self.x - by.left,
            y: self.y - by.top,
            width: self.width + by.left + by.right,
            height: self.height + by.top + by.bottom,
        }
    }

    pub fn shrink(&self, by: &Spacing) -> Rect {
        Rect {
            x: self.x + by.left,
            y: self.y + by.top,
            width: self.width - by.left - by.right,
            height: self.height - by.top - by.bottom,
        }
    }
}

/// Edge sizes in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spacing {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Spacing {
    pub fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// Build from computed style values such as `"12px"`
    pub fn parse(top: &str, right: &str, bottom: &str, left: &str) -> Self {
        Self::new(parse(top), parse(right), parse(bottom), parse(left))
    }
}

/// Parse a computed pixel length. Anything that is not a pixel length is 0.
pub fn parse(raw: &str) -> f64 {
    let raw = raw.trim();
    let number = raw.strip_suffix("px").unwrap_or(raw);

    match number.parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => 0.0,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoxModel {
    pub margin_box: Rect,
    pub border_box: Rect,
    pub padding_box: Rect,
    pub content_box: Rect,
    pub margin: Spacing,
    pub border: Spacing,
    pub padding: Spacing,
}

impl BoxModel {
    /// Derive every box from the border box and the edge sizes
    pub fn create(border_box: Rect, margin: Spacing, border: Spacing, padding: Spacing) -> Self {
        let padding_box = border_box.shrink(&border);

        Self {
            margin_box: border_box.expand(&margin),
            border_box,
            padding_box,
            content_box: padding_box.shrink(&padding),
            margin,
            border,
            padding,
        }
    }
}

#[derive(Debug, Default)]
pub struct BoxModelsState {
    pub measurables: HashMap<ElementRef, ComponentHandleRef>,
    pub box_models: BTreeMap<ElementKey, BoxModel>,
}

impl BoxModelsState {
    pub fn get_box_model(&self, element_key: &str) -> Option<&BoxModel> {
        self.box_models.get(element_key)
    }

    pub fn is_measurable(&self, element: &ElementRef) -> bool {
        self.measurables.contains_key(element)
    }
}

pub fn reducer(state: &mut BoxModelsState, action: &Action) {
    match action {
        Action::RegisterMeasurable {
            document_key,
            element_key,
            measurable,
        } => {
            state.measurables.insert(
                ElementRef::new(document_key.clone(), element_key.clone()),
                measurable.clone(),
            );
        }

        // The stale box model is reported as gone by the next measurement.
        Action::UnregisterMeasurable {
            document_key,
            element_key,
        } => {
            state
                .measurables
                .remove(&ElementRef::new(document_key.clone(), element_key.clone()));
        }

        Action::ChangeElementBoxModels {
            changed_element_box_models,
        } => {
            for (element_key, box_model) in changed_element_box_models {
                match box_model {
                    Some(box_model) => {
                        state.box_models.insert(element_key.clone(), *box_model);
                    }
                    None => {
                        state.box_models.remove(element_key);
                    }
                }
            }
        }

        _ => {}
    }
}
