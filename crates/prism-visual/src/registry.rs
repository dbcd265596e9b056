//! Visual registry - one visual object per local entity index
//!
//! Get-or-create is the only mutator. Entries are never removed: the
//! synchronization layer has no notion of entity destruction, so the
//! registry grows with the number of distinct entities seen.

use std::collections::hash_map::{Entry, HashMap};

use tracing::debug;

use prism_core::{EntityId, EntityIndex, PrismError, PrismResult};

use crate::{DeferredQueue, RenderSurface, VisualObject};

/// Default category class carried by entity nodes
pub const ENTITY_CLASS: &str = "entity";

/// Resolves a local index to the entity's identifier
pub trait EntityResolver {
    fn resolve(&self, index: EntityIndex) -> Option<EntityId>;
}

impl EntityResolver for HashMap<EntityIndex, EntityId> {
    fn resolve(&self, index: EntityIndex) -> Option<EntityId> {
        self.get(&index).cloned()
    }
}

/// Dense table: the index is the position in the slice
impl EntityResolver for [EntityId] {
    fn resolve(&self, index: EntityIndex) -> Option<EntityId> {
        self.get(index.0 as usize).cloned()
    }
}

impl EntityResolver for Vec<EntityId> {
    fn resolve(&self, index: EntityIndex) -> Option<EntityId> {
        self.as_slice().resolve(index)
    }
}

/// Cache of live visual objects keyed by local index
#[derive(Debug)]
pub struct VisualRegistry {
    objects: HashMap<EntityIndex, VisualObject>,
    entity_class: String,
}

impl VisualRegistry {
    pub fn new() -> Self {
        Self::with_class(ENTITY_CLASS)
    }

    /// Registry whose nodes carry a custom category class
    pub fn with_class(entity_class: impl Into<String>) -> Self {
        VisualRegistry {
            objects: HashMap::new(),
            entity_class: entity_class.into(),
        }
    }

    /// Return the object for `index`, creating it on first sight.
    ///
    /// An existing object is returned untouched. A new one is built from the
    /// resolved identifier; an index the resolver does not know is a broken
    /// collaborator contract and surfaces as `UnresolvedEntity`.
    pub fn get_or_create<R, S>(
        &mut self,
        index: EntityIndex,
        resolver: &R,
        surface: &mut S,
        scheduler: &mut DeferredQueue,
    ) -> PrismResult<&VisualObject>
    where
        R: EntityResolver + ?Sized,
        S: RenderSurface + ?Sized,
    {
        match self.objects.entry(index) {
            Entry::Occupied(entry) => Ok(&*entry.into_mut()),
            Entry::Vacant(entry) => {
                let id = resolver
                    .resolve(index)
                    .ok_or(PrismError::UnresolvedEntity(index))?;
                let object = VisualObject::new(id, &self.entity_class, surface, scheduler)?;

                debug!(
                    index = %index,
                    id = %object.id(),
                    node = ?object.node(),
                    identity = ?object.identity(),
                    "visual object created"
                );

                Ok(&*entry.insert(object))
            }
        }
    }

    pub fn get(&self, index: EntityIndex) -> Option<&VisualObject> {
        self.objects.get(&index)
    }

    pub fn contains(&self, index: EntityIndex) -> bool {
        self.objects.contains_key(&index)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&EntityIndex, &VisualObject)> {
        self.objects.iter()
    }

    pub fn entity_class(&self) -> &str {
        &self.entity_class
    }
}

impl Default for VisualRegistry {
    fn default() -> Self {
        Self::new()
    }
}
