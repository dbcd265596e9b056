//! Visual identity - color and shape derived from an entity identifier
//!
//! This is a pure function of the identifier bytes. It runs once per
//! entity, when its visual object is constructed.

use prism_core::EntityId;

use crate::{NodeHandle, StyleProperty, StyleWrite};

/// Rotation applied to rotated squares
pub const ROTATED_TRANSFORM: &str = "rotate(45deg)";

/// Node shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    /// Default node shape, left to the host stylesheet
    Round,
    Square,
    /// Square rotated by 45 degrees
    Diamond,
}

/// Deterministic visual identity of an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VisualIdentity {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub is_square: bool,
    /// Only ever set together with `is_square`
    pub is_rotated: bool,
}

impl VisualIdentity {
    /// Decode the identity from the identifier's leading bytes.
    ///
    /// Bytes 0, 1 and 2 are the red, green and blue channels. The blue byte
    /// doubles as the shape byte: 128 and above is a square, and an odd
    /// square is rotated.
    pub fn decode(id: &EntityId) -> Self {
        let [red, green, blue] = id.head();
        let shape = blue;
        let is_square = shape >= 128;

        VisualIdentity {
            red,
            green,
            blue,
            is_square,
            is_rotated: is_square && shape % 2 == 1,
        }
    }

    pub fn shape(&self) -> Shape {
        match (self.is_square, self.is_rotated) {
            (true, true) => Shape::Diamond,
            (true, false) => Shape::Square,
            _ => Shape::Round,
        }
    }

    /// CSS color, e.g. `rgb(192, 255, 238)`
    pub fn css_color(&self) -> String {
        format!("rgb({}, {}, {})", self.red, self.green, self.blue)
    }

    /// Style writes that present this identity on a node
    pub fn style_writes(&self, node: NodeHandle) -> Vec<StyleWrite> {
        let mut writes = vec![StyleWrite::set(
            node,
            StyleProperty::BackgroundColor,
            self.css_color(),
        )];

        if self.is_square {
            writes.push(StyleWrite::set(node, StyleProperty::BorderRadius, "0"));
        }
        if self.is_rotated {
            writes.push(StyleWrite::set(
                node,
                StyleProperty::Transform,
                ROTATED_TRANSFORM,
            ));
        }

        writes
    }
}
