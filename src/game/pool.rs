//! Generic object pool - reuse instead of allocate/destroy churn.
//!
//! A pool is an arena of slots plus a free-list stack. `acquire` pops the most
//! recently released slot (or grows the arena through the factory) and hands out
//! a typed [`Handle`]. `release` runs the reset function and pushes the slot back.
//!
//! Every slot carries an "active" marker, so releasing a handle twice is caught
//! without scanning the free list.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use tracing::error;

/// Typed index into a [`Pool`].
///
/// Handles are plain indices: they stay valid (and keep pointing at the same slot)
/// for as long as the slot is active.
pub struct Handle<T> {
    index: u32,
    marker: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    const fn new(index: u32) -> Self {
        Self {
            index,
            marker: PhantomData,
        }
    }

    /// Raw slot index, stable for the lifetime of the pool.
    pub const fn index(self) -> usize {
        self.index as usize
    }
}

// Manual impls: deriving would put bounds on `T`.
impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl<T> Eq for Handle<T> {}

impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
    }
}

impl<T> PartialOrd for Handle<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Handle<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.index.cmp(&other.index)
    }
}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.index)
    }
}

/// Arena + free list for one type.
pub struct Pool<T> {
    slots: Vec<T>,
    active: Vec<bool>,
    free: Vec<u32>,
    factory: fn() -> T,
    reset: fn(&mut T),
    name: &'static str,
}

impl<T> Pool<T> {
    /// Create an empty pool.
    ///
    /// `factory` builds a brand new instance when the free list is empty,
    /// `reset` is applied to every instance on release.
    pub fn new(name: &'static str, factory: fn() -> T, reset: fn(&mut T)) -> Self {
        Self {
            slots: Vec::new(),
            active: Vec::new(),
            free: Vec::new(),
            factory,
            reset,
            name,
        }
    }

    /// Pre-allocate `count` inactive instances.
    pub fn populate(&mut self, count: usize) {
        self.slots.reserve(count);
        for _ in 0..count {
            let index = self.slots.len() as u32;
            self.slots.push((self.factory)());
            self.active.push(false);
            self.free.push(index);
        }
    }

    /// Take an instance out of the pool.
    pub fn acquire(&mut self) -> Handle<T> {
        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                let index = self.slots.len() as u32;
                self.slots.push((self.factory)());
                self.active.push(false);
                index
            }
        };
        self.active[index as usize] = true;
        Handle::new(index)
    }

    /// Return an instance to the pool.
    ///
    /// Releasing an instance that is already pooled is a programming error.
    pub fn release(&mut self, handle: Handle<T>) {
        let index = handle.index();
        let is_active = self.active.get(index).copied().unwrap_or(false);
        debug_assert!(
            is_active,
            "{} {:?} released while not active (already pooled?)",
            self.name, handle
        );
        if !is_active {
            error!("{} {:?} released while not active, ignoring", self.name, handle);
            return;
        }

        (self.reset)(&mut self.slots[index]);
        self.active[index] = false;
        self.free.push(handle.index);
    }

    /// Is the handle currently checked out?
    pub fn is_active(&self, handle: Handle<T>) -> bool {
        self.active.get(handle.index()).copied().unwrap_or(false)
    }

    pub fn get(&self, handle: Handle<T>) -> &T {
        &self.slots[handle.index()]
    }

    pub fn get_mut(&mut self, handle: Handle<T>) -> &mut T {
        &mut self.slots[handle.index()]
    }

    /// Number of checked out instances.
    pub fn active_count(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// Number of instances waiting in the free list.
    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    /// Iterate over every checked out instance.
    pub fn iter_active(&self) -> impl Iterator<Item = (Handle<T>, &T)> {
        self.slots
            .iter()
            .zip(&self.active)
            .enumerate()
            .filter(|(_, (_, active))| **active)
            .map(|(index, (slot, _))| (Handle::new(index as u32), slot))
    }
}

impl<T> fmt::Debug for Pool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pool")
            .field("name", &self.name)
            .field("active", &self.active_count())
            .field("free", &self.free.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counter_pool() -> Pool<Vec<u32>> {
        Pool::new("buffer", Vec::new, Vec::clear)
    }

    #[test]
    fn test_acquire_reuses_last_released() {
        let mut pool = counter_pool();
        let a = pool.acquire();
        let b = pool.acquire();
        assert_ne!(a, b);

        pool.release(a);
        pool.release(b);

        // LIFO: b comes back first
        assert_eq!(pool.acquire(), b);
        assert_eq!(pool.acquire(), a);
        assert_eq!(pool.active_count(), 2);
    }

    #[test]
    fn test_release_runs_reset() {
        let mut pool = counter_pool();
        let h = pool.acquire();
        pool.get_mut(h).extend([1, 2, 3]);
        pool.release(h);

        let again = pool.acquire();
        assert_eq!(again, h);
        assert!(pool.get(again).is_empty());
    }

    #[test]
    fn test_populate_fills_free_list() {
        let mut pool = counter_pool();
        pool.populate(4);
        assert_eq!(pool.free_count(), 4);
        assert_eq!(pool.active_count(), 0);

        let h = pool.acquire();
        assert!(pool.is_active(h));
        assert_eq!(pool.free_count(), 3);
        assert_eq!(pool.iter_active().count(), 1);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "released while not active")]
    fn test_double_release_panics_in_debug() {
        let mut pool = counter_pool();
        let h = pool.acquire();
        pool.release(h);
        pool.release(h);
    }
}
