//! Inline style properties written to render nodes

use std::fmt;

use crate::NodeHandle;

/// Inline style property understood by the render surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StyleProperty {
    BackgroundColor,
    BorderRadius,
    Transform,
    Left,
    Top,
}

impl StyleProperty {
    /// CSS property name
    pub fn css_name(self) -> &'static str {
        match self {
            StyleProperty::BackgroundColor => "background-color",
            StyleProperty::BorderRadius => "border-radius",
            StyleProperty::Transform => "transform",
            StyleProperty::Left => "left",
            StyleProperty::Top => "top",
        }
    }
}

impl fmt::Display for StyleProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.css_name())
    }
}

/// A single style mutation. `None` unsets the property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleWrite {
    pub node: NodeHandle,
    pub property: StyleProperty,
    pub value: Option<String>,
}

impl StyleWrite {
    pub fn set(node: NodeHandle, property: StyleProperty, value: impl Into<String>) -> Self {
        StyleWrite {
            node,
            property,
            value: Some(value.into()),
        }
    }

    pub fn unset(node: NodeHandle, property: StyleProperty) -> Self {
        StyleWrite {
            node,
            property,
            value: None,
        }
    }
}

/// Pixel length, e.g. `12px` or `3.5px`
pub fn px(value: f64) -> String {
    format!("{}px", value)
}
