//! Generic entity storage shared by the server's authoritative collection
//! and each client's local collection.

use crate::id::EntityId;
use indexmap::IndexMap;

/// Which reconstruction algorithm a client uses for a non-owned entity.
/// Assigned once, at entity creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStrategy {
    /// Adopt the authoritative state as-is, with no smoothing.
    Raw,
    /// Interpolate between the two snapshots bracketing the render timestamp.
    Interpolation,
    /// Extrapolate forward from the last known state.
    DeadReckoning,
}

/// An entity: a stable id, its replicated `State`, and the strategy used to
/// reconcile it with incoming snapshots. Locally-owned entities use
/// prediction + reconciliation regardless of the `strategy` field, which is
/// only consulted for non-owned entities (see `entitysync_client`).
#[derive(Debug, Clone)]
pub struct Entity<S> {
    pub id: EntityId,
    pub state: S,
    pub strategy: SyncStrategy,
}

impl<S> Entity<S> {
    pub fn new(id: EntityId, state: S, strategy: SyncStrategy) -> Self {
        Self { id, state, strategy }
    }
}

/// Keyed by id, insertion-ordered iteration, no deletion (entity retirement
/// is out of scope).
#[derive(Debug, Clone, Default)]
pub struct EntityCollection<S> {
    entities: IndexMap<EntityId, Entity<S>>,
}

impl<S> EntityCollection<S> {
    pub fn new() -> Self {
        Self {
            entities: IndexMap::new(),
        }
    }

    pub fn add(&mut self, entity: Entity<S>) {
        self.entities.insert(entity.id.clone(), entity);
    }

    pub fn get(&self, id: &EntityId) -> Option<&Entity<S>> {
        self.entities.get(id)
    }

    pub fn get_mut(&mut self, id: &EntityId) -> Option<&mut Entity<S>> {
        self.entities.get_mut(id)
    }

    pub fn has(&self, id: &EntityId) -> bool {
        self.entities.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&EntityId, &Entity<S>)> {
        self.entities.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&EntityId, &mut Entity<S>)> {
        self.entities.iter_mut()
    }

    /// A read-only view keyed by id, for callers (e.g. the `synchronized`
    /// event payload) that want a map rather than an entity-owning iterator.
    pub fn as_id_keyed_map(&self) -> &IndexMap<EntityId, Entity<S>> {
        &self.entities
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn insertion_order_is_preserved() {
        let mut entities: EntityCollection<i32> = EntityCollection::new();
        entities.add(Entity::new(EntityId::from("b"), 1, SyncStrategy::Raw));
        entities.add(Entity::new(EntityId::from("a"), 2, SyncStrategy::Raw));
        let ids: Vec<_> = entities.iter().map(|(id, _)| id.as_str().to_string()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn has_and_get_reflect_membership() {
        let mut entities: EntityCollection<i32> = EntityCollection::new();
        assert!(!entities.has(&EntityId::from("p1")));
        entities.add(Entity::new(EntityId::from("p1"), 42, SyncStrategy::Raw));
        assert!(entities.has(&EntityId::from("p1")));
        assert_eq!(entities.get(&EntityId::from("p1")).unwrap().state, 42);
    }
}
