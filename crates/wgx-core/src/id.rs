//! Generational identifiers (§4.2, §9 "Dynamic resource IDs vs. strongly
//! typed handles").
//!
//! An `Id<T>` is a `(slot index, epoch)` pair, the textbook generational
//! arena index: it never points directly at memory, so a `TextureView`
//! can hold its parent `Texture`'s `Id` without becoming a cyclic owning
//! pointer, and a stale `Id` is detected cheaply by comparing epochs
//! instead of needing reference counting on every lookup.

use std::fmt;
use std::marker::PhantomData;

/// A slot index into one kind's registry.
pub type Index = u32;
/// A generation counter for one slot; incremented on every release.
pub type Epoch = u32;

/// A typed, generational identifier for one resource kind `T`.
pub struct Id<T> {
    index: Index,
    epoch: Epoch,
    marker: PhantomData<fn() -> T>,
}

impl<T> Id<T> {
    pub(crate) fn new(index: Index, epoch: Epoch) -> Self {
        Id {
            index,
            epoch,
            marker: PhantomData,
        }
    }

    pub(crate) fn index(&self) -> Index {
        self.index
    }

    pub(crate) fn epoch(&self) -> Epoch {
        self.epoch
    }
}

impl<T> Clone for Id<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Id<T> {}

impl<T> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.epoch == other.epoch
    }
}

impl<T> Eq for Id<T> {}

impl<T> std::hash::Hash for Id<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.index.hash(state);
        self.epoch.hash(state);
    }
}

impl<T> fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({}, epoch {})", self.index, self.epoch)
    }
}
