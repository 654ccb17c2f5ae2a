//! Object-identity model cache
//!
//! Maps an object's identity (payload address) to its [`ModelCore`]. Slots
//! hold only a weak reference to the object, so the cache never keeps an
//! object alive; a slot whose object died, or whose address now belongs to a
//! different object, is treated as a miss. Occupancy is bounded: once it
//! goes over capacity, dead slots are swept and then the least recently used
//! ones go, down to a low-water mark a tenth below capacity, so the sort
//! happens once per batch of misses rather than on every one.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use hostwrap_sdk::{HostObject, RuntimeType, TypeCategory, WeakHostData};

use super::ModelCore;

struct Slot {
    target: WeakHostData,
    core: Arc<ModelCore>,
    last_used: AtomicU64,
}

impl Slot {
    fn new(obj: &HostObject, core: Arc<ModelCore>, now: u64) -> Self {
        Self {
            target: obj.downgrade(),
            core,
            last_used: AtomicU64::new(now),
        }
    }

    fn is_for(&self, obj: &HostObject) -> bool {
        self.core.object_type() == obj.runtime_type()
            && self
                .target
                .upgrade()
                .map_or(false, |live| Arc::ptr_eq(&live, obj.data()))
    }
}

/// Identity-keyed memo of model cores
pub struct ModelCache {
    slots: DashMap<usize, Slot>,
    capacity: usize,
    low_water: usize,
    enabled: AtomicBool,
    clock: AtomicU64,
}

impl ModelCache {
    /// Create a cache holding at most `capacity` live slots
    pub fn new(capacity: usize, enabled: bool) -> Self {
        let capacity = capacity.max(1);
        Self {
            slots: DashMap::new(),
            capacity,
            low_water: capacity - (capacity / 10).max(1),
            enabled: AtomicBool::new(enabled),
            clock: AtomicU64::new(0),
        }
    }

    /// Model core for `obj`, created with `create` on a miss.
    ///
    /// Objects of the boolean category are never cached.
    pub fn get_or_create(&self, obj: &HostObject, create: impl FnOnce() -> ModelCore) -> Arc<ModelCore> {
        if !self.is_enabled() || obj.runtime_type().category() == TypeCategory::Boolean {
            return Arc::new(create());
        }

        let now = self.clock.fetch_add(1, Ordering::Relaxed);
        let core = match self.slots.entry(obj.identity()) {
            Entry::Occupied(slot) if slot.get().is_for(obj) => {
                slot.get().last_used.store(now, Ordering::Relaxed);
                return slot.get().core.clone();
            }
            Entry::Occupied(mut slot) => {
                tracing::trace!(type_name = obj.runtime_type().name(), "stale model slot replaced");
                let core = Arc::new(create());
                slot.insert(Slot::new(obj, core.clone(), now));
                core
            }
            Entry::Vacant(vacant) => {
                let core = Arc::new(create());
                vacant.insert(Slot::new(obj, core.clone(), now));
                core
            }
        };

        if self.slots.len() > self.capacity {
            self.evict();
        }
        core
    }

    /// Remove slots whose object is gone; returns how many were removed
    pub fn sweep(&self) -> usize {
        let before = self.slots.len();
        self.slots.retain(|_, slot| slot.target.strong_count() > 0);
        before.saturating_sub(self.slots.len())
    }

    /// Remove slots of objects of type `ty`
    pub fn invalidate_type(&self, ty: &RuntimeType) {
        self.slots.retain(|_, slot| slot.core.object_type() != ty);
    }

    /// Remove slots of objects whose type matches `pred`
    pub fn invalidate_where(&self, pred: impl Fn(&RuntimeType) -> bool) {
        self.slots.retain(|_, slot| !pred(slot.core.object_type()));
    }

    /// Drop every slot
    pub fn clear(&self) {
        self.slots.clear();
    }

    /// Turn identity caching on or off; turning it off empties the cache
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Release);
        if !enabled {
            self.clear();
        }
    }

    /// Whether identity caching is on
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    /// Number of slots, live or not yet swept
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Check if no slot exists
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Configured upper bound
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Occupancy an eviction pass shrinks the cache to
    pub fn low_water(&self) -> usize {
        self.low_water
    }

    fn evict(&self) {
        let swept = self.sweep();
        if self.slots.len() <= self.low_water {
            tracing::trace!(swept, "model cache swept");
            return;
        }
        let mut by_age: Vec<(u64, usize)> = self
            .slots
            .iter()
            .map(|slot| (slot.last_used.load(Ordering::Relaxed), *slot.key()))
            .collect();
        let excess = by_age.len().saturating_sub(self.low_water);
        by_age.select_nth_unstable(excess.saturating_sub(1));
        for (_, id) in by_age.into_iter().take(excess) {
            self.slots.remove(&id);
        }
        tracing::debug!(swept, evicted = excess, "model cache over capacity");
    }
}
