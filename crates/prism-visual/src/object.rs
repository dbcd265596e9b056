//! Visual object - the live on-screen counterpart of one entity

use prism_core::{EntityId, Formula, Position, PrismResult};

use crate::{
    formula_label, px, DeferredQueue, NodeHandle, RenderSurface, StyleProperty, StyleWrite,
    VisualIdentity,
};

/// One visual object per entity. Owns its node on the render surface.
///
/// The identity is decoded once here and never recomputed; attribute
/// updates only touch position and hover label.
#[derive(Debug)]
pub struct VisualObject {
    id: EntityId,
    node: NodeHandle,
    identity: VisualIdentity,
}

impl VisualObject {
    /// Create the node, append it to the surface root and schedule the
    /// identity styles for the next presentation turn.
    pub fn new<S: RenderSurface + ?Sized>(
        id: EntityId,
        class: &str,
        surface: &mut S,
        scheduler: &mut DeferredQueue,
    ) -> PrismResult<Self> {
        let identity = VisualIdentity::decode(&id);
        let node = surface.create_node(class);
        let root = surface.root();
        surface.append_child(root, node)?;
        scheduler.schedule_all(identity.style_writes(node));

        Ok(VisualObject { id, node, identity })
    }

    pub fn id(&self) -> &EntityId {
        &self.id
    }

    pub fn node(&self) -> NodeHandle {
        self.node
    }

    pub fn identity(&self) -> VisualIdentity {
        self.identity
    }

    /// Schedule the node's offsets. Absent position unsets both offsets so
    /// the node falls back to its default placement.
    pub fn apply_position(&self, position: Option<&Position>, scheduler: &mut DeferredQueue) {
        match position {
            Some(p) => {
                scheduler.schedule(StyleWrite::set(self.node, StyleProperty::Left, px(p.x)));
                scheduler.schedule(StyleWrite::set(self.node, StyleProperty::Top, px(p.y)));
            }
            None => {
                scheduler.schedule(StyleWrite::unset(self.node, StyleProperty::Left));
                scheduler.schedule(StyleWrite::unset(self.node, StyleProperty::Top));
            }
        }
    }

    /// Set the hover label to the decoded equation, or to empty.
    pub fn apply_formula<S: RenderSurface + ?Sized>(
        &self,
        formula: Option<&Formula>,
        surface: &mut S,
    ) -> PrismResult<()> {
        let label = formula.map(formula_label).unwrap_or_default();
        surface.set_title(self.node, &label)
    }
}
