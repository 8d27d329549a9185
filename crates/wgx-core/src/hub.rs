//! Per-kind resource registries (§4.2).
//!
//! Each registry is a generational arena: `Vec<Slot<T>>` plus the epoch
//! folded into each slot, guarded by a reader-preferring lock (creates and
//! releases take the write side; lookups take the read side and may run
//! concurrently with each other).

use crate::error::Error;
use crate::id::{Epoch, Id, Index};
use parking_lot::RwLock;
use std::sync::Arc;

enum Slot<T> {
    /// No resource lives here; the next `insert` reusing this index will
    /// stamp epoch `0.wrapping_sub(1) + 1` logic below — see `Registry::insert`.
    Vacant,
    Occupied(Epoch, Arc<T>),
}

/// A single resource kind's registry.
pub struct Registry<T> {
    slots: RwLock<Vec<Slot<T>>>,
    free: RwLock<Vec<Index>>,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Registry {
            slots: RwLock::new(Vec::new()),
            free: RwLock::new(Vec::new()),
        }
    }
}

impl<T> Registry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint a new `Id<T>` for `value`: reuse a free slot if one exists
    /// (bumping its epoch so any `Id` referring to the slot's previous
    /// occupant goes stale), otherwise grow the table.
    pub fn insert(&self, value: T) -> Id<T> {
        let arc = Arc::new(value);
        let mut free = self.free.write();
        if let Some(index) = free.pop() {
            let mut slots = self.slots.write();
            let epoch = match &slots[index as usize] {
                Slot::Vacant => 1,
                Slot::Occupied(epoch, _) => epoch + 1,
            };
            slots[index as usize] = Slot::Occupied(epoch, arc);
            Id::new(index, epoch)
        } else {
            let mut slots = self.slots.write();
            let index = slots.len() as Index;
            slots.push(Slot::Occupied(1, arc));
            Id::new(index, 1)
        }
    }

    /// Look up `id`, failing with `Error::Released` if the slot is empty
    /// or its epoch no longer matches (the classic use-after-free /
    /// double-release catch, no reference counting needed on this path).
    pub fn get(&self, id: Id<T>) -> Result<Arc<T>, Error> {
        let slots = self.slots.read();
        match slots.get(id.index() as usize) {
            Some(Slot::Occupied(epoch, arc)) if *epoch == id.epoch() => Ok(arc.clone()),
            _ => Err(Error::Released),
        }
    }

    /// Drop the handle stored at `id` and invalidate every outstanding
    /// reference to it. Idempotent: releasing an already-released or
    /// never-issued `id` also returns `Error::Released` rather than
    /// panicking, and performs no further work.
    pub fn release(&self, id: Id<T>) -> Result<Arc<T>, Error> {
        let mut slots = self.slots.write();
        match slots.get(id.index() as usize) {
            Some(Slot::Occupied(epoch, _)) if *epoch == id.epoch() => {
                let taken = std::mem::replace(&mut slots[id.index() as usize], Slot::Vacant);
                drop(slots);
                self.free.write().push(id.index());
                match taken {
                    Slot::Occupied(_, arc) => Ok(arc),
                    Slot::Vacant => unreachable!(),
                }
            }
            _ => Err(Error::Released),
        }
    }

    /// Number of live (occupied) entries. Exposed for tests and metrics,
    /// not part of the hot path.
    pub fn live_count(&self) -> usize {
        self.slots
            .read()
            .iter()
            .filter(|s| matches!(s, Slot::Occupied(..)))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_id_after_release() {
        let reg = Registry::<u32>::new();
        let id = reg.insert(42);
        assert_eq!(*reg.get(id).unwrap(), 42);
        reg.release(id).unwrap();
        assert!(matches!(reg.get(id), Err(Error::Released)));
    }

    #[test]
    fn double_release_is_a_no_op_error() {
        let reg = Registry::<u32>::new();
        let id = reg.insert(1);
        reg.release(id).unwrap();
        assert!(matches!(reg.release(id), Err(Error::Released)));
    }

    #[test]
    fn reused_slot_gets_a_fresh_epoch() {
        let reg = Registry::<u32>::new();
        let first = reg.insert(1);
        reg.release(first).unwrap();
        let second = reg.insert(2);
        assert_eq!(*reg.get(second).unwrap(), 2);
        assert!(matches!(reg.get(first), Err(Error::Released)));
    }
}
