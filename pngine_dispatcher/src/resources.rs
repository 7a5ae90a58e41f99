//! Dense resource tables keyed by the bytecode-assigned `u32` resource ID.
//! Per `SPEC_FULL.md` §3.3, creation is append-only within a module and IDs
//! are never freed mid-module, so a `slotmap::SecondaryMap` keyed by the
//! dense ID itself (not one of `slotmap`'s own generational keys) is
//! sufficient: [`key_for`] synthesizes a `ResourceKey` straight from the ID,
//! via the same `KeyData::from_ffi` construction `slotmap` documents for
//! pairing a `SecondaryMap` with externally-assigned indices instead of a
//! primary `SlotMap`.

use slotmap::{new_key_type, KeyData, SecondaryMap};

use crate::error::{Error, Result};

new_key_type! {
    struct ResourceKey;
}

fn key_for(id: u32) -> ResourceKey {
    KeyData::from_ffi(id as u64).into()
}

/// One resource class's dense handle table. A pooled resource (declared
/// with `pool = N`) stores its `N` backend handles together under its base
/// ID; `resolve` indexes into that vector by pool offset.
#[derive(Debug, Clone)]
pub struct ResourceTable<H> {
    class: &'static str,
    handles: SecondaryMap<ResourceKey, Vec<H>>,
    /// IDs in creation order, for reverse-order teardown — `SecondaryMap`
    /// iteration order is not guaranteed to follow insertion order.
    creation_order: Vec<u32>,
}

impl<H: Copy> ResourceTable<H> {
    pub fn new(class: &'static str) -> Self {
        ResourceTable {
            class,
            handles: SecondaryMap::new(),
            creation_order: Vec::new(),
        }
    }

    /// Append `count` freshly created handles as one pooled resource,
    /// returning the dense base ID assigned to it.
    pub fn push_pool(&mut self, handles: impl IntoIterator<Item = H>, count: u32) -> u32 {
        let base_id = self.creation_order.len() as u32;
        let collected: Vec<H> = handles.into_iter().collect();
        debug_assert_eq!(collected.len(), count as usize);
        self.handles.insert(key_for(base_id), collected);
        self.creation_order.push(base_id);
        log::trace!("{} table grew to {} entries", self.class, self.creation_order.len());
        base_id
    }

    /// Append a single handle, returning its dense ID.
    pub fn push(&mut self, handle: H) -> u32 {
        self.push_pool(std::iter::once(handle), 1)
    }

    /// Resolve `(base_id, pool_offset)` to the backend handle. `pool_offset`
    /// must be `< pool size`; `set_*_pool` opcodes use this for ping-pong
    /// binding across a pooled buffer's handles.
    pub fn resolve(&self, base_id: u32, pool_offset: u32) -> Result<H> {
        let not_found = || Error::ResourceNotFound {
            class: self.class,
            id: base_id,
            len: self.creation_order.len(),
        };
        let slots = self.handles.get(key_for(base_id)).ok_or_else(not_found)?;
        slots.get(pool_offset as usize).copied().ok_or_else(not_found)
    }

    /// Resolve a plain (non-pooled) ID, equivalent to `resolve(id, 0)`.
    pub fn get(&self, id: u32) -> Result<H> {
        self.resolve(id, 0)
    }

    pub fn len(&self) -> usize {
        self.creation_order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.creation_order.is_empty()
    }

    /// All handles in creation order, for reverse-order teardown.
    pub fn handles_in_creation_order(&self) -> Vec<H> {
        self.creation_order
            .iter()
            .flat_map(|&id| self.handles[key_for(id)].iter().copied())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_push_resolves_at_offset_zero() {
        let mut table: ResourceTable<u32> = ResourceTable::new("buffer");
        let id = table.push(100);
        assert_eq!(id, 0);
        assert_eq!(table.get(0).unwrap(), 100);
    }

    #[test]
    fn pooled_push_resolves_each_offset() {
        let mut table: ResourceTable<u32> = ResourceTable::new("buffer");
        let base = table.push_pool([10, 20], 2);
        assert_eq!(table.resolve(base, 0).unwrap(), 10);
        assert_eq!(table.resolve(base, 1).unwrap(), 20);
    }

    #[test]
    fn out_of_range_pool_offset_is_an_error() {
        let mut table: ResourceTable<u32> = ResourceTable::new("buffer");
        let base = table.push_pool([10, 20], 2);
        assert!(table.resolve(base, 2).is_err());
    }

    #[test]
    fn mixing_pooled_and_single_resources_keeps_dense_ids() {
        let mut table: ResourceTable<u32> = ResourceTable::new("buffer");
        let first = table.push(1);
        let pool = table.push_pool([2, 3, 4], 3);
        let last = table.push(5);
        assert_eq!(first, 0);
        assert_eq!(pool, 1);
        assert_eq!(last, 2);
        assert_eq!(table.resolve(pool, 2).unwrap(), 4);
        assert_eq!(table.get(last).unwrap(), 5);
    }

    #[test]
    fn unknown_id_is_resource_not_found() {
        let table: ResourceTable<u32> = ResourceTable::new("buffer");
        assert!(table.get(0).is_err());
    }

    #[test]
    fn creation_order_survives_interleaved_pooled_pushes() {
        let mut table: ResourceTable<u32> = ResourceTable::new("buffer");
        table.push(1);
        table.push_pool([2, 3], 2);
        table.push(4);
        assert_eq!(table.handles_in_creation_order(), vec![1, 2, 3, 4]);
    }
}
