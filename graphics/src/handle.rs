//! Generation-checked handles and the arena that issues them.
//!
//! Every device resource lives in a [`HandleTable`] and is addressed by a
//! [`Handle`] carrying the slot index plus the slot's generation at the time
//! of insertion. Removing a slot bumps its generation, so a handle that
//! outlived its resource (or came from a different table) is rejected
//! instead of silently aliasing whatever now occupies the slot. Each table
//! also stamps its own id into the handles it issues, so a handle presented
//! to the wrong table never resolves.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU32, Ordering};

/// Typed handle to a value stored in a [`HandleTable`].
pub struct Handle<T> {
    table: u32,
    index: u32,
    generation: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    fn new(table: u32, index: u32, generation: u32) -> Self {
        Self {
            table,
            index,
            generation,
            _marker: PhantomData,
        }
    }

    /// Get the slot index of this handle.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Get the generation of this handle.
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.table == other.table
            && self.index == other.index
            && self.generation == other.generation
    }
}

impl<T> Eq for Handle<T> {}

impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.table.hash(state);
        self.index.hash(state);
        self.generation.hash(state);
    }
}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({}v{})", self.index, self.generation)
    }
}

struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// Arena of values addressed by generation-checked [`Handle`]s.
pub struct HandleTable<T> {
    id: u32,
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    len: usize,
}

impl<T> HandleTable<T> {
    /// Create an empty table.
    pub fn new() -> Self {
        static NEXT_TABLE_ID: AtomicU32 = AtomicU32::new(0);
        Self {
            id: NEXT_TABLE_ID.fetch_add(1, Ordering::Relaxed),
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
        }
    }

    /// Store a value and return its handle.
    pub fn insert(&mut self, value: T) -> Handle<T> {
        self.len += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.value = Some(value);
            return Handle::new(self.id, index, slot.generation);
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            value: Some(value),
        });
        Handle::new(self.id, index, 0)
    }

    fn slot(&self, handle: Handle<T>) -> Option<&Slot<T>> {
        if handle.table != self.id {
            return None;
        }
        self.slots
            .get(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
    }

    /// Check whether a handle still refers to a live value.
    pub fn contains(&self, handle: Handle<T>) -> bool {
        self.get(handle).is_some()
    }

    /// Look up a live value.
    pub fn get(&self, handle: Handle<T>) -> Option<&T> {
        self.slot(handle).and_then(|slot| slot.value.as_ref())
    }

    /// Look up a live value mutably.
    pub fn get_mut(&mut self, handle: Handle<T>) -> Option<&mut T> {
        if handle.table != self.id {
            return None;
        }
        self.slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.value.as_mut())
    }

    /// Remove a value, invalidating every copy of its handle.
    pub fn remove(&mut self, handle: Handle<T>) -> Option<T> {
        if handle.table != self.id {
            return None;
        }
        let slot = self
            .slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)?;
        let value = slot.value.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        self.len -= 1;
        Some(value)
    }

    /// Number of live values.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the table holds no live values.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterate over live values with their handles.
    pub fn iter(&self) -> impl Iterator<Item = (Handle<T>, &T)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.value
                .as_ref()
                .map(|value| (Handle::new(self.id, index as u32, slot.generation), value))
        })
    }
}

impl<T> Default for HandleTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for HandleTable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandleTable")
            .field("len", &self.len)
            .field("capacity", &self.slots.len())
            .finish()
    }
}
