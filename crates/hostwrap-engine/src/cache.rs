//! Type-keyed memoisation shared by the introspection and factory caches
//!
//! Reads go straight to a [`DashMap`]. A miss takes the cache mutex,
//! re-checks, waits if another thread is already computing the same type,
//! then computes outside the lock and publishes.
//!
//! Two rules keep the cache honest:
//!
//! - **Reload detection.** Seeing a type name that is already cached under a
//!   different identity means the host reloaded its types; the whole cache is
//!   flushed before the new entry is computed. Two same-named identities
//!   that miss at the same time can both be published; a name therefore
//!   stays tracked until the last published identity carrying it is removed.
//! - **Generation check.** Every invalidation bumps a generation counter. A
//!   computation that started before an invalidation is handed to its caller
//!   but never published, so a flush is never undone by a late writer.

use std::sync::Arc;

use dashmap::DashMap;
use hostwrap_sdk::RuntimeType;
use parking_lot::{Condvar, Mutex};
use rustc_hash::FxHashSet;

/// Memoising map from runtime type to `V`
pub struct TypeCache<V> {
    /// Cache name used in log events
    label: &'static str,
    /// Published entries
    entries: DashMap<RuntimeType, V>,
    /// Miss-path bookkeeping
    state: Mutex<CacheState>,
    /// Signalled whenever an in-progress computation finishes
    computed: Condvar,
}

#[derive(Default)]
struct CacheState {
    /// Names of the types currently in `entries`
    names: FxHashSet<Arc<str>>,
    /// Types some thread is computing right now
    in_progress: FxHashSet<RuntimeType>,
    /// Bumped on every invalidation
    generation: u64,
}

impl<V: Clone> TypeCache<V> {
    /// Create an empty cache
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            entries: DashMap::new(),
            state: Mutex::new(CacheState::default()),
            computed: Condvar::new(),
        }
    }

    /// Get the entry for `ty`, computing it with `compute` on a miss.
    ///
    /// Concurrent misses for the same type run `compute` once; the other
    /// callers wait for its result.
    pub fn get_or_compute(&self, ty: &RuntimeType, compute: impl FnOnce(&RuntimeType) -> V) -> V {
        if let Some(hit) = self.entries.get(ty) {
            return hit.value().clone();
        }

        let mut state = self.state.lock();
        loop {
            if let Some(hit) = self.entries.get(ty) {
                return hit.value().clone();
            }
            if !state.in_progress.contains(ty) {
                break;
            }
            self.computed.wait(&mut state);
        }

        if state.names.contains(ty.name()) {
            tracing::info!(
                cache = self.label,
                type_name = ty.name(),
                "type name seen under a new identity; assuming reload and flushing cache"
            );
            self.flush_locked(&mut state);
        }

        state.in_progress.insert(ty.clone());
        let generation = state.generation;
        drop(state);

        let _guard = InProgress { cache: self, ty };
        tracing::debug!(cache = self.label, type_name = ty.name(), "cache miss");
        let value = compute(ty);

        let mut state = self.state.lock();
        if state.generation == generation {
            self.entries.insert(ty.clone(), value.clone());
            state.names.insert(ty.name_arc().clone());
        } else {
            tracing::debug!(
                cache = self.label,
                type_name = ty.name(),
                "cache invalidated during computation; result not published"
            );
        }
        value
    }

    /// Look up without computing
    pub fn peek(&self, ty: &RuntimeType) -> Option<V> {
        self.entries.get(ty).map(|entry| entry.value().clone())
    }

    /// Remove the entry for exactly `ty`
    pub fn invalidate(&self, ty: &RuntimeType) -> bool {
        let mut state = self.state.lock();
        let removed = self.entries.remove(ty).is_some();
        if removed {
            self.forget_name_locked(&mut state, ty.name());
        }
        state.generation += 1;
        removed
    }

    /// Remove every entry whose type matches `pred`; returns how many went
    pub fn invalidate_where(&self, pred: impl Fn(&RuntimeType) -> bool) -> usize {
        let mut state = self.state.lock();
        let doomed: Vec<RuntimeType> = self
            .entries
            .iter()
            .filter(|entry| pred(entry.key()))
            .map(|entry| entry.key().clone())
            .collect();
        for ty in &doomed {
            self.entries.remove(ty);
        }
        for ty in &doomed {
            self.forget_name_locked(&mut state, ty.name());
        }
        state.generation += 1;
        doomed.len()
    }

    /// Drop every entry
    pub fn clear(&self) {
        let mut state = self.state.lock();
        self.flush_locked(&mut state);
    }

    /// Number of invalidations so far; changes whenever cached data may
    /// have become outdated
    pub fn clearing_count(&self) -> u64 {
        self.state.lock().generation
    }

    /// Number of published entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing is published
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn forget_name_locked(&self, state: &mut CacheState, name: &str) {
        if !self.entries.iter().any(|entry| entry.key().name() == name) {
            state.names.remove(name);
        }
    }

    fn flush_locked(&self, state: &mut CacheState) {
        self.entries.clear();
        state.names.clear();
        state.generation += 1;
    }
}

/// Clears the in-progress mark and wakes waiters, also when `compute` panics
struct InProgress<'a, V> {
    cache: &'a TypeCache<V>,
    ty: &'a RuntimeType,
}

impl<V> Drop for InProgress<'_, V> {
    fn drop(&mut self) {
        let mut state = self.cache.state.lock();
        state.in_progress.remove(self.ty);
        self.cache.computed.notify_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hostwrap_sdk::TypeCategory;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Barrier;

    fn ty(name: &str) -> RuntimeType {
        RuntimeType::new(name, vec![], TypeCategory::Bean)
    }

    #[test]
    fn test_hit_after_miss() {
        let cache = TypeCache::new("test");
        let t = ty("A");
        let calls = AtomicUsize::new(0);
        let compute = |_: &RuntimeType| {
            calls.fetch_add(1, Ordering::SeqCst);
            7
        };
        assert_eq!(cache.get_or_compute(&t, compute), 7);
        assert_eq!(cache.get_or_compute(&t, compute), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_name_tracked_while_any_identity_remains() {
        let cache = TypeCache::new("test");
        let a1 = ty("A");
        let a2 = ty("A");
        let started = Barrier::new(2);
        let release = Barrier::new(2);

        // both identities miss before either publishes
        std::thread::scope(|s| {
            s.spawn(|| {
                cache.get_or_compute(&a1, |_| {
                    started.wait();
                    release.wait();
                    1
                })
            });
            started.wait();
            assert_eq!(cache.get_or_compute(&a2, |_| 2), 2);
            release.wait();
        });
        assert_eq!(cache.len(), 2);

        assert!(cache.invalidate(&a1));
        let before = cache.clearing_count();
        cache.get_or_compute(&ty("A"), |_| 3);
        // still a reload: a2 carried the name
        assert_eq!(cache.peek(&a2), None);
        assert_eq!(cache.len(), 1);
        assert!(cache.clearing_count() > before);
    }

    #[test]
    fn test_same_name_new_identity_flushes_everything() {
        let cache = TypeCache::new("test");
        let a1 = ty("A");
        let b = ty("B");
        cache.get_or_compute(&a1, |_| 1);
        cache.get_or_compute(&b, |_| 2);
        let before = cache.clearing_count();

        let a2 = ty("A");
        assert_eq!(cache.get_or_compute(&a2, |_| 3), 3);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.peek(&b), None);
        assert_eq!(cache.peek(&a1), None);
        assert!(cache.clearing_count() > before);
    }

    #[test]
    fn test_invalidate_forces_recompute() {
        let cache = TypeCache::new("test");
        let t = ty("A");
        cache.get_or_compute(&t, |_| 1);
        assert!(cache.invalidate(&t));
        assert!(!cache.invalidate(&t));
        assert_eq!(cache.get_or_compute(&t, |_| 2), 2);
    }

    #[test]
    fn test_invalidate_where() {
        let cache = TypeCache::new("test");
        for name in ["app.A", "app.B", "lib.C"] {
            cache.get_or_compute(&ty(name), |_| 0);
        }
        assert_eq!(cache.invalidate_where(|t| t.name().starts_with("app.")), 2);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_computation_racing_invalidation_is_not_published() {
        let cache = TypeCache::new("test");
        let t = ty("A");
        let other = ty("B");
        let value = cache.get_or_compute(&t, |_| {
            cache.invalidate(&other);
            5
        });
        assert_eq!(value, 5);
        assert!(cache.is_empty());
        assert_eq!(cache.get_or_compute(&t, |_| 6), 6);
    }

    #[test]
    fn test_panicking_compute_releases_waiters() {
        let cache = TypeCache::new("test");
        let t = ty("A");
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            cache.get_or_compute(&t, |_| -> i32 { panic!("boom") })
        }));
        assert!(result.is_err());
        assert_eq!(cache.get_or_compute(&t, |_| 1), 1);
    }

    #[test]
    fn test_concurrent_first_use_computes_once() {
        let cache = TypeCache::new("test");
        let t = ty("A");
        let calls = AtomicUsize::new(0);
        let barrier = Barrier::new(8);
        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    barrier.wait();
                    let v = cache.get_or_compute(&t, |_| {
                        calls.fetch_add(1, Ordering::SeqCst);
                        std::thread::sleep(std::time::Duration::from_millis(20));
                        42
                    });
                    assert_eq!(v, 42);
                });
            }
        });
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
