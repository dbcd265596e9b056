//! Deferred presentation tick
//!
//! Style writes scheduled during the synchronous handling of an update are
//! held here and applied on the next presentation turn, so the host sees a
//! change after the node exists and can run its style transitions instead of
//! snapping. Writes are applied in scheduling order; a later write to the
//! same property overwrites an earlier one.

use tracing::trace;

use prism_core::PrismResult;

use crate::{RenderSurface, StyleWrite};

/// Queue of style writes waiting for the next presentation turn
#[derive(Debug, Default)]
pub struct DeferredQueue {
    pending: Vec<StyleWrite>,
    flushed: u64,
}

impl DeferredQueue {
    pub fn new() -> Self {
        DeferredQueue::default()
    }

    pub fn schedule(&mut self, write: StyleWrite) {
        self.pending.push(write);
    }

    pub fn schedule_all(&mut self, writes: impl IntoIterator<Item = StyleWrite>) {
        self.pending.extend(writes);
    }

    /// Writes waiting for the next turn
    pub fn pending(&self) -> &[StyleWrite] {
        &self.pending
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Total writes applied so far
    pub fn flushed(&self) -> u64 {
        self.flushed
    }

    /// Run the presentation turn: apply every pending write in order
    pub fn flush<S: RenderSurface + ?Sized>(&mut self, surface: &mut S) -> PrismResult<usize> {
        let writes = std::mem::take(&mut self.pending);
        let count = writes.len();

        for write in &writes {
            trace!(node = ?write.node, property = %write.property, value = ?write.value, "style write");
            surface.apply(write)?;
            self.flushed += 1;
        }

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemorySurface, StyleProperty};

    #[test]
    fn test_nothing_applied_before_flush() {
        let mut surface = MemorySurface::default();
        let node = surface.create_node("entity");
        let mut queue = DeferredQueue::new();

        queue.schedule(StyleWrite::set(node, StyleProperty::Top, "1px"));
        assert_eq!(surface.style(node, StyleProperty::Top), None);
        assert_eq!(queue.len(), 1);

        assert_eq!(queue.flush(&mut surface).unwrap(), 1);
        assert_eq!(surface.style(node, StyleProperty::Top), Some("1px"));
        assert!(queue.is_empty());
        assert_eq!(queue.flushed(), 1);
    }

    #[test]
    fn test_last_scheduled_wins() {
        let mut surface = MemorySurface::default();
        let node = surface.create_node("entity");
        let mut queue = DeferredQueue::new();

        queue.schedule_all([
            StyleWrite::set(node, StyleProperty::Left, "1px"),
            StyleWrite::set(node, StyleProperty::Left, "2px"),
            StyleWrite::unset(node, StyleProperty::Top),
        ]);
        queue.flush(&mut surface).unwrap();

        assert_eq!(surface.style(node, StyleProperty::Left), Some("2px"));
        assert_eq!(surface.style(node, StyleProperty::Top), None);
    }
}
