//! Command dispatch - clicks on empty canvas create new formulas
//!
//! A click on the page background or on the root container submits a
//! `CreateFormula` command with two random operands. Clicks on entity nodes
//! do nothing. Operands come from an injected random number generator so
//! tests can pin them with a seed.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use prism_core::{CreateFormula, PrismError, PrismResult};
use prism_visual::NodeHandle;

/// Uniform random integer in `[min, max]`, both ends inclusive. Swapped
/// bounds are put back in order.
pub fn random_inclusive<R: Rng + ?Sized>(rng: &mut R, min: u64, max: u64) -> u64 {
    let (low, high) = if min <= max { (min, max) } else { (max, min) };
    rng.gen_range(low..=high)
}

/// What a user click landed on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    /// The page body outside the root container
    Background,
    /// The root container itself
    Root,
    /// An entity node
    Entity(NodeHandle),
}

impl ClickTarget {
    /// Does a click here count as a click on empty canvas?
    pub fn is_empty_canvas(self) -> bool {
        matches!(self, ClickTarget::Background | ClickTarget::Root)
    }
}

/// Command submission to the remote ledger
pub trait CommandSink {
    fn submit(&mut self, command: CreateFormula) -> PrismResult<()>;
}

/// Recording sink
impl CommandSink for Vec<CreateFormula> {
    fn submit(&mut self, command: CreateFormula) -> PrismResult<()> {
        self.push(command);
        Ok(())
    }
}

/// Forwards commands to the synchronization layer over a channel
#[derive(Debug, Clone)]
pub struct ChannelCommandSink {
    tx: mpsc::Sender<CreateFormula>,
}

impl ChannelCommandSink {
    pub fn new(tx: mpsc::Sender<CreateFormula>) -> Self {
        ChannelCommandSink { tx }
    }

    /// Sink plus the receiving end for the synchronization layer
    pub fn channel(buffer: usize) -> (Self, mpsc::Receiver<CreateFormula>) {
        let (tx, rx) = mpsc::channel(buffer);
        (ChannelCommandSink { tx }, rx)
    }
}

impl CommandSink for ChannelCommandSink {
    fn submit(&mut self, command: CreateFormula) -> PrismResult<()> {
        self.tx
            .try_send(command)
            .map_err(|e| PrismError::CommandRejected(e.to_string()))
    }
}

/// Click handler that submits `CreateFormula` commands
#[derive(Debug)]
pub struct CommandDispatch<R = StdRng> {
    rng: R,
    armed: bool,
    submitted: u64,
    ignored: u64,
}

impl CommandDispatch<StdRng> {
    /// Dispatch seeded from OS entropy
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    /// Dispatch with a fixed seed
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> CommandDispatch<R> {
    pub fn new(rng: R) -> Self {
        CommandDispatch {
            rng,
            armed: false,
            submitted: 0,
            ignored: 0,
        }
    }

    /// Start accepting clicks; called once synchronization has started
    pub fn arm(&mut self) {
        if !self.armed {
            info!("command dispatch armed");
        }
        self.armed = true;
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn submitted(&self) -> u64 {
        self.submitted
    }

    pub fn ignored(&self) -> u64 {
        self.ignored
    }

    /// Draw fresh operands from the full command ranges
    pub fn draw(&mut self) -> CreateFormula {
        CreateFormula {
            x: random_inclusive(&mut self.rng, 0, CreateFormula::X_MAX),
            y: random_inclusive(&mut self.rng, 0, CreateFormula::Y_MAX),
        }
    }

    /// Handle a click. Returns the submitted command, if any.
    pub fn on_click<K: CommandSink + ?Sized>(
        &mut self,
        target: ClickTarget,
        sink: &mut K,
    ) -> PrismResult<Option<CreateFormula>> {
        if !target.is_empty_canvas() {
            return Ok(None);
        }
        if !self.armed {
            warn!(?target, "click before synchronization started, ignored");
            self.ignored += 1;
            return Ok(None);
        }

        let command = self.draw();
        sink.submit(command)?;
        self.submitted += 1;
        debug!(system = CreateFormula::SYSTEM, x = command.x, y = command.y, "command submitted");

        Ok(Some(command))
    }
}
