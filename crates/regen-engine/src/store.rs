use std::collections::BTreeMap;
use std::fmt::Debug;

use model_types::{Entity, EntityId, Param, ParamId};

/// An item that carries its own handle.
pub trait Keyed {
    type Key: Copy + Ord + Debug;

    fn key(&self) -> Self::Key;
}

impl Keyed for Entity {
    type Key = EntityId;

    fn key(&self) -> EntityId {
        self.id
    }
}

impl Keyed for Param {
    type Key = ParamId;

    fn key(&self) -> ParamId {
        self.id
    }
}

/// Handle-keyed collection, iterated in handle order.
#[derive(Debug, Clone, PartialEq)]
pub struct Store<T: Keyed> {
    items: BTreeMap<T::Key, T>,
}

pub type EntityStore = Store<Entity>;
pub type ParamStore = Store<Param>;

impl<T: Keyed> Store<T> {
    pub fn new() -> Self {
        Self {
            items: BTreeMap::new(),
        }
    }

    /// Insert `item`, returning whatever held its handle before.
    pub fn add(&mut self, item: T) -> Option<T> {
        self.items.insert(item.key(), item)
    }

    pub fn get(&self, key: T::Key) -> Option<&T> {
        self.items.get(&key)
    }

    pub fn get_mut(&mut self, key: T::Key) -> Option<&mut T> {
        self.items.get_mut(&key)
    }

    pub fn contains(&self, key: T::Key) -> bool {
        self.items.contains_key(&key)
    }

    pub fn remove(&mut self, key: T::Key) -> Option<T> {
        self.items.remove(&key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.items.values_mut()
    }

    pub fn keys(&self) -> impl Iterator<Item = T::Key> + '_ {
        self.items.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Move every item out, leaving this store empty.
    pub fn take(&mut self) -> Self {
        Self {
            items: std::mem::take(&mut self.items),
        }
    }
}

impl<T: Keyed> Default for Store<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Keyed> FromIterator<T> for Store<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut store = Self::new();
        for item in iter {
            store.add(item);
        }
        store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model_types::RequestId;

    fn param(r: RequestId, index: u16, val: f64) -> Param {
        Param::new(r.param(index), r.entity(1), val)
    }

    #[test]
    fn add_replaces_existing_handle() {
        let r = RequestId::new_v4();
        let mut store = ParamStore::new();
        assert!(store.add(param(r, 0, 1.0)).is_none());
        let old = store.add(param(r, 0, 2.0)).unwrap();
        assert_eq!(old.val, 1.0);
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(r.param(0)).unwrap().val, 2.0);
    }

    #[test]
    fn take_leaves_store_empty() {
        let r = RequestId::new_v4();
        let mut store: ParamStore = (0..3).map(|i| param(r, i, i as f64)).collect();
        let prev = store.take();
        assert!(store.is_empty());
        assert_eq!(prev.len(), 3);
        assert!(prev.contains(r.param(2)));
    }

    #[test]
    fn iteration_follows_handle_order() {
        let r = RequestId::new_v4();
        let store: ParamStore = [2, 0, 1].iter().map(|i| param(r, *i, 0.0)).collect();
        let keys: Vec<ParamId> = store.keys().collect();
        assert_eq!(keys, vec![r.param(0), r.param(1), r.param(2)]);
    }
}
