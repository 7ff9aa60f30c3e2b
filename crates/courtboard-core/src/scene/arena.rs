//! Id-keyed storage that remembers insertion order.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{EntityId, Item, Line, Path};

/// Anything stored in an [`Arena`].
pub(crate) trait Entity {
    fn id(&self) -> EntityId;
}

impl Entity for Item {
    fn id(&self) -> EntityId {
        self.id
    }
}

impl Entity for Line {
    fn id(&self) -> EntityId {
        self.id
    }
}

impl Entity for Path {
    fn id(&self) -> EntityId {
        self.id
    }
}

/// Entities keyed by id, iterated in insertion order (back to front).
///
/// Serialized as a plain ordered list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    from = "Vec<T>",
    into = "Vec<T>",
    bound(serialize = "T: Entity + Clone + Serialize", deserialize = "T: Entity + Deserialize<'de>")
)]
pub(crate) struct Arena<T> {
    entries: HashMap<EntityId, T>,
    order: Vec<EntityId>,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            order: Vec::new(),
        }
    }
}

impl<T: Entity> Arena<T> {
    /// Insert an entity, replacing any entry with the same id in place.
    pub fn insert(&mut self, entity: T) {
        let id = entity.id();
        if self.entries.insert(id, entity).is_none() {
            self.order.push(id);
        }
    }

    pub fn remove(&mut self, id: EntityId) -> Option<T> {
        let entity = self.entries.remove(&id)?;
        self.order.retain(|&other| other != id);
        Some(entity)
    }

    /// Remove every entity whose id is in `ids`. Returns how many were removed.
    pub fn remove_all(&mut self, ids: &[EntityId]) -> usize {
        let before = self.entries.len();
        for id in ids {
            self.entries.remove(id);
        }
        let entries = &self.entries;
        self.order.retain(|id| entries.contains_key(id));
        before - self.entries.len()
    }

    /// Keep only the entities matching the predicate.
    pub fn retain(&mut self, mut keep: impl FnMut(&T) -> bool) {
        self.entries.retain(|_, entity| keep(entity));
        let entries = &self.entries;
        self.order.retain(|id| entries.contains_key(id));
    }

    pub fn get(&self, id: EntityId) -> Option<&T> {
        self.entries.get(&id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut T> {
        self.entries.get_mut(&id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    /// Entities in insertion order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + '_ {
        self.order.iter().filter_map(|id| self.entries.get(id))
    }
}

impl<T: Entity> From<Vec<T>> for Arena<T> {
    fn from(entities: Vec<T>) -> Self {
        let mut arena = Self::default();
        for entity in entities {
            arena.insert(entity);
        }
        arena
    }
}

impl<T: Entity> From<Arena<T>> for Vec<T> {
    fn from(mut arena: Arena<T>) -> Self {
        let order = std::mem::take(&mut arena.order);
        order
            .into_iter()
            .filter_map(|id| arena.entries.remove(&id))
            .collect()
    }
}
