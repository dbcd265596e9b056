//! View context - everything the router mutates, owned in one place
//!
//! There are no process-wide singletons: the host builds a context at
//! startup and hands it to the router.

use prism_core::PrismResult;
use prism_visual::{DeferredQueue, EntityResolver, RenderSurface, VisualRegistry};

use crate::ViewerConfig;

/// Render surface, identifier resolver, visual registry and the deferred
/// style queue of one view
pub struct ViewContext<S, R> {
    pub(crate) surface: S,
    pub(crate) resolver: R,
    pub(crate) registry: VisualRegistry,
    pub(crate) scheduler: DeferredQueue,
    defer_styles: bool,
}

impl<S: RenderSurface, R: EntityResolver> ViewContext<S, R> {
    pub fn new(surface: S, resolver: R) -> Self {
        Self::with_config(surface, resolver, &ViewerConfig::default())
    }

    pub fn with_config(surface: S, resolver: R, config: &ViewerConfig) -> Self {
        ViewContext {
            surface,
            resolver,
            registry: VisualRegistry::with_class(config.entity_class.clone()),
            scheduler: DeferredQueue::new(),
            defer_styles: config.defer_styles,
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    pub fn resolver_mut(&mut self) -> &mut R {
        &mut self.resolver
    }

    pub fn registry(&self) -> &VisualRegistry {
        &self.registry
    }

    pub fn scheduler(&self) -> &DeferredQueue {
        &self.scheduler
    }

    /// Are style writes held until the end of the turn?
    pub fn defers_styles(&self) -> bool {
        self.defer_styles
    }

    /// Presentation turn: apply every deferred style write
    pub fn flush(&mut self) -> PrismResult<usize> {
        self.scheduler.flush(&mut self.surface)
    }

    /// Called after each synchronous routing step. Without deferral the
    /// writes land immediately; with deferral they wait for `flush`.
    pub(crate) fn settle(&mut self) -> PrismResult<()> {
        if !self.defer_styles {
            self.flush()?;
        }
        Ok(())
    }
}
