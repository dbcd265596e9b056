//! Update router - attribute updates to visual objects
//!
//! Every update resolves (or creates) the entity's visual object and then
//! hands the value, or its absence, to the handler for its attribute kind.
//! Updates are applied one at a time in delivery order.

use tokio::sync::mpsc;
use tracing::{debug, trace};

use prism_core::{AttributeKind, AttributeUpdate, Formula, Position, PrismError, PrismResult, Update};
use prism_visual::{EntityResolver, RenderSurface};

use crate::ViewContext;

/// Routing counters
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RouterStats {
    pub positions: u64,
    pub formulas: u64,
    pub clears: u64,
    /// Visual objects created while routing
    pub created: u64,
}

impl RouterStats {
    pub fn total(&self) -> u64 {
        self.positions + self.formulas
    }
}

/// Routes updates into a [`ViewContext`]
#[derive(Debug, Default)]
pub struct UpdateRouter {
    stats: RouterStats,
}

impl UpdateRouter {
    pub fn new() -> Self {
        UpdateRouter::default()
    }

    pub fn stats(&self) -> &RouterStats {
        &self.stats
    }

    /// Route one update synchronously
    pub fn route<S, R>(&mut self, ctx: &mut ViewContext<S, R>, update: Update) -> PrismResult<()>
    where
        S: RenderSurface,
        R: EntityResolver,
    {
        let index = update.entity();
        let known = ctx.registry.contains(index);

        let ViewContext {
            surface,
            resolver,
            registry,
            scheduler,
            ..
        } = &mut *ctx;
        let object = registry.get_or_create(index, resolver, surface, scheduler)?;

        if !known {
            self.stats.created += 1;
        }
        if update.is_clear() {
            self.stats.clears += 1;
        }

        trace!(entity = %index, kind = %update.kind(), clear = update.is_clear(), "routing update");

        match &update {
            Update::Position(u) => {
                object.apply_position(u.value.as_ref(), scheduler);
                self.stats.positions += 1;
            }
            Update::Formula(u) => {
                object.apply_formula(u.value.as_ref(), surface)?;
                self.stats.formulas += 1;
            }
        }

        ctx.settle()
    }
}

/// Create the pair of update channels: senders for the synchronization
/// layer, streams for the router
pub fn update_channels(buffer: usize) -> (UpdateSenders, UpdateStreams) {
    let (position_tx, position_rx) = mpsc::channel(buffer);
    let (formula_tx, formula_rx) = mpsc::channel(buffer);

    (
        UpdateSenders {
            position: position_tx,
            formula: formula_tx,
        },
        UpdateStreams::new(position_rx, formula_rx),
    )
}

/// Producer side of the two update streams
#[derive(Clone, Debug)]
pub struct UpdateSenders {
    pub position: mpsc::Sender<AttributeUpdate<Position>>,
    pub formula: mpsc::Sender<AttributeUpdate<Formula>>,
}

impl UpdateSenders {
    /// Send an update on the stream of its kind
    pub async fn send(&self, update: Update) -> PrismResult<()> {
        let kind = update.kind();
        let sent = match update {
            Update::Position(u) => self.position.send(u).await.is_ok(),
            Update::Formula(u) => self.formula.send(u).await.is_ok(),
        };

        if sent {
            Ok(())
        } else {
            Err(PrismError::StreamClosed(kind))
        }
    }
}

/// The two subscribed update streams
#[derive(Debug)]
pub struct UpdateStreams {
    position: mpsc::Receiver<AttributeUpdate<Position>>,
    formula: mpsc::Receiver<AttributeUpdate<Formula>>,
    position_open: bool,
    formula_open: bool,
}

impl UpdateStreams {
    pub fn new(
        position: mpsc::Receiver<AttributeUpdate<Position>>,
        formula: mpsc::Receiver<AttributeUpdate<Formula>>,
    ) -> Self {
        UpdateStreams {
            position,
            formula,
            position_open: true,
            formula_open: true,
        }
    }

    /// Is at least one stream still delivering?
    pub fn is_open(&self) -> bool {
        self.position_open || self.formula_open
    }

    /// Next update from whichever stream delivers first. Order within a
    /// stream is preserved. `None` once both streams are closed.
    pub async fn next(&mut self) -> Option<Update> {
        while self.is_open() {
            tokio::select! {
                received = self.position.recv(), if self.position_open => match received {
                    Some(update) => return Some(Update::Position(update)),
                    None => self.mark_closed(AttributeKind::Position),
                },
                received = self.formula.recv(), if self.formula_open => match received {
                    Some(update) => return Some(Update::Formula(update)),
                    None => self.mark_closed(AttributeKind::Formula),
                },
            }
        }
        None
    }

    fn mark_closed(&mut self, kind: AttributeKind) {
        debug!(kind = %kind, "update stream closed");
        match kind {
            AttributeKind::Position => self.position_open = false,
            AttributeKind::Formula => self.formula_open = false,
        }
    }
}
