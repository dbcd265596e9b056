//! Simulated remote ledger
//!
//! Stands in for the synchronization layer: it owns the entity table,
//! assigns dense local indices, records the latest attribute values and
//! emits the update events the viewer would receive. `CreateFormula`
//! commands spawn a new entity carrying the requested formula.

use std::cell::{Ref, RefCell, RefMut};
use std::collections::VecDeque;
use std::rc::Rc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use prism_core::{
    AttributeUpdate, CreateFormula, EntityId, EntityIndex, Formula, Magnitude, Position,
    PrismError, PrismResult, Update,
};
use prism_runtime::CommandSink;
use prism_visual::EntityResolver;

/// Width of generated identifiers, in bytes
pub const ID_WIDTH: usize = 32;

/// Largest coordinate a generated position may take
pub const POSITION_MAX: u32 = 1000;

#[derive(Debug, Clone)]
struct EntityRecord {
    id: EntityId,
    position: Option<Position>,
    formula: Option<Formula>,
}

/// Seeded in-memory ledger
#[derive(Debug)]
pub struct SimulatedLedger {
    rng: StdRng,
    entities: Vec<EntityRecord>,
    outbox: VecDeque<Update>,
    commands: u64,
}

impl SimulatedLedger {
    pub fn new(seed: u64) -> Self {
        SimulatedLedger {
            rng: StdRng::seed_from_u64(seed),
            entities: Vec::new(),
            outbox: VecDeque::new(),
            commands: 0,
        }
    }

    /// Register an entity with a random identifier
    pub fn spawn(&mut self) -> PrismResult<EntityIndex> {
        let mut bytes = vec![0u8; ID_WIDTH];
        self.rng.fill(bytes.as_mut_slice());
        let id = EntityId::new(bytes)?;
        Ok(self.spawn_with_id(id))
    }

    pub fn spawn_with_id(&mut self, id: EntityId) -> EntityIndex {
        let index = EntityIndex(self.entities.len() as u32);
        debug!(index = %index, id = %id, "ledger entity spawned");
        self.entities.push(EntityRecord {
            id,
            position: None,
            formula: None,
        });
        index
    }

    fn record_mut(&mut self, index: EntityIndex) -> PrismResult<&mut EntityRecord> {
        self.entities
            .get_mut(index.0 as usize)
            .ok_or(PrismError::UnresolvedEntity(index))
    }

    /// Set or clear an entity's position and emit the update
    pub fn set_position(&mut self, index: EntityIndex, position: Option<Position>) -> PrismResult<Update> {
        self.record_mut(index)?.position = position;
        let update: Update = AttributeUpdate {
            entity: index,
            value: position,
        }
        .into();
        self.outbox.push_back(update.clone());
        Ok(update)
    }

    /// Set or clear an entity's formula and emit the update
    pub fn set_formula(&mut self, index: EntityIndex, formula: Option<Formula>) -> PrismResult<Update> {
        self.record_mut(index)?.formula = formula.clone();
        let update: Update = AttributeUpdate {
            entity: index,
            value: formula,
        }
        .into();
        self.outbox.push_back(update.clone());
        Ok(update)
    }

    pub fn random_position(&mut self) -> Position {
        Position::new(
            f64::from(self.rng.gen_range(0..=POSITION_MAX)),
            f64::from(self.rng.gen_range(0..=POSITION_MAX)),
        )
    }

    pub fn random_formula(&mut self) -> Formula {
        Formula::new(
            Magnitude::from_u64(self.rng.gen_range(CreateFormula::x_range())),
            Magnitude::from_u64(self.rng.gen_range(CreateFormula::y_range())),
        )
    }

    /// Change one attribute of a random entity. Spawns the first entity
    /// when the ledger is empty.
    pub fn random_update(&mut self, clear_prob: f64) -> PrismResult<Update> {
        if self.entities.is_empty() {
            self.spawn()?;
        }

        let index = EntityIndex(self.rng.gen_range(0..self.entities.len() as u32));
        let clear = self.rng.gen_bool(clear_prob);

        if self.rng.gen_bool(0.5) {
            let value = if clear { None } else { Some(self.random_position()) };
            self.set_position(index, value)
        } else {
            let value = if clear { None } else { Some(self.random_formula()) };
            self.set_formula(index, value)
        }
    }

    /// Take every update emitted since the last drain, in emission order
    pub fn drain(&mut self) -> Vec<Update> {
        self.outbox.drain(..).collect()
    }

    pub fn pending(&self) -> usize {
        self.outbox.len()
    }

    /// Execute a `CreateFormula` command: a new entity with the requested
    /// formula, placed at a random position
    pub fn apply_command(&mut self, command: CreateFormula) -> PrismResult<EntityIndex> {
        if !command.is_valid() {
            return Err(PrismError::CommandRejected(format!(
                "operands out of range: x={} y={}",
                command.x, command.y
            )));
        }

        let index = self.spawn()?;
        self.set_formula(index, Some(command.to_formula()))?;
        let position = self.random_position();
        self.set_position(index, Some(position))?;
        self.commands += 1;

        debug!(index = %index, x = command.x, y = command.y, "command applied");
        Ok(index)
    }

    pub fn commands_applied(&self) -> u64 {
        self.commands
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn identifier(&self, index: EntityIndex) -> Option<&EntityId> {
        self.entities.get(index.0 as usize).map(|r| &r.id)
    }

    pub fn identifiers(&self) -> impl Iterator<Item = &EntityId> {
        self.entities.iter().map(|r| &r.id)
    }

    /// Latest position the ledger holds for an entity
    pub fn position(&self, index: EntityIndex) -> Option<Position> {
        self.entities.get(index.0 as usize).and_then(|r| r.position)
    }

    /// Latest formula the ledger holds for an entity
    pub fn formula(&self, index: EntityIndex) -> Option<&Formula> {
        self.entities
            .get(index.0 as usize)
            .and_then(|r| r.formula.as_ref())
    }
}

impl EntityResolver for SimulatedLedger {
    fn resolve(&self, index: EntityIndex) -> Option<EntityId> {
        self.identifier(index).cloned()
    }
}

/// Shared handle so one ledger can serve as both the viewer's resolver and
/// its command sink
#[derive(Debug, Clone)]
pub struct LedgerHandle(Rc<RefCell<SimulatedLedger>>);

impl LedgerHandle {
    pub fn new(ledger: SimulatedLedger) -> Self {
        LedgerHandle(Rc::new(RefCell::new(ledger)))
    }

    pub fn borrow(&self) -> Ref<'_, SimulatedLedger> {
        self.0.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, SimulatedLedger> {
        self.0.borrow_mut()
    }
}

impl EntityResolver for LedgerHandle {
    fn resolve(&self, index: EntityIndex) -> Option<EntityId> {
        self.0.borrow().resolve(index)
    }
}

impl CommandSink for LedgerHandle {
    fn submit(&mut self, command: CreateFormula) -> PrismResult<()> {
        self.0.borrow_mut().apply_command(command).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prism_core::AttributeKind;
    use proptest::prelude::*;

    #[test]
    fn test_dense_indices() {
        let mut ledger = SimulatedLedger::new(1);
        assert_eq!(ledger.spawn().unwrap(), EntityIndex(0));
        assert_eq!(ledger.spawn().unwrap(), EntityIndex(1));
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.identifier(EntityIndex(1)).unwrap().len(), ID_WIDTH);
        assert!(ledger.resolve(EntityIndex(2)).is_none());
    }

    #[test]
    fn test_same_seed_same_world() {
        let mut a = SimulatedLedger::new(42);
        let mut b = SimulatedLedger::new(42);
        for _ in 0..20 {
            assert_eq!(a.random_update(0.2).unwrap(), b.random_update(0.2).unwrap());
        }
        assert!(a.identifiers().eq(b.identifiers()));
    }

    #[test]
    fn test_updates_track_latest_value() {
        let mut ledger = SimulatedLedger::new(3);
        let index = ledger.spawn().unwrap();

        ledger.set_position(index, Some(Position::new(1.0, 2.0))).unwrap();
        ledger.set_position(index, None).unwrap();
        ledger.set_formula(index, Some(Formula::new(7u64, 9u64))).unwrap();

        assert_eq!(ledger.position(index), None);
        assert_eq!(ledger.formula(index), Some(&Formula::new(7u64, 9u64)));

        let updates = ledger.drain();
        assert_eq!(updates.len(), 3);
        assert!(updates[1].is_clear());
        assert_eq!(updates[2].kind(), AttributeKind::Formula);
        assert_eq!(ledger.pending(), 0);
    }

    #[test]
    fn test_unknown_index_rejected() {
        let mut ledger = SimulatedLedger::new(3);
        assert_eq!(
            ledger.set_position(EntityIndex(4), None),
            Err(PrismError::UnresolvedEntity(EntityIndex(4)))
        );
    }

    #[test]
    fn test_apply_command() {
        let mut ledger = SimulatedLedger::new(8);
        let command = CreateFormula { x: 0x0105, y: 2 };

        let index = ledger.apply_command(command).unwrap();
        assert_eq!(ledger.formula(index), Some(&command.to_formula()));
        assert!(ledger.position(index).is_some());
        assert_eq!(ledger.commands_applied(), 1);

        let kinds: Vec<_> = ledger.drain().iter().map(Update::kind).collect();
        assert_eq!(kinds, vec![AttributeKind::Formula, AttributeKind::Position]);
    }

    #[test]
    fn test_out_of_range_command_rejected() {
        let mut ledger = SimulatedLedger::new(8);
        let command = CreateFormula {
            x: CreateFormula::X_MAX + 1,
            y: 0,
        };
        assert!(matches!(
            ledger.apply_command(command),
            Err(PrismError::CommandRejected(_))
        ));
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_handle_is_resolver_and_sink() {
        let mut handle = LedgerHandle::new(SimulatedLedger::new(5));
        handle.submit(CreateFormula { x: 1, y: 1 }).unwrap();

        let id = handle.resolve(EntityIndex(0)).unwrap();
        assert_eq!(handle.borrow().identifier(EntityIndex(0)), Some(&id));
        assert_eq!(handle.borrow_mut().drain().len(), 2);
    }

    proptest! {
        #[test]
        fn prop_random_updates_target_known_entities(seed in any::<u64>(), n in 1usize..50) {
            let mut ledger = SimulatedLedger::new(seed);
            for _ in 0..n {
                let update = ledger.random_update(0.3).unwrap();
                prop_assert!(ledger.resolve(update.entity()).is_some());
            }
            prop_assert_eq!(ledger.drain().len(), n);
        }

        #[test]
        fn prop_valid_commands_accepted(x in 0..=CreateFormula::X_MAX, y in 0..=CreateFormula::Y_MAX) {
            let mut ledger = SimulatedLedger::new(0);
            let index = ledger.apply_command(CreateFormula { x, y }).unwrap();
            prop_assert_eq!(ledger.formula(index), Some(&Formula::new(x, y)));
        }
    }
}
