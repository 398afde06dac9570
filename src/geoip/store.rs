//! Current-generation store.
//!
//! Readers clone an `Arc<Generation>` under a short read lock and use it for
//! the whole query. A swap only replaces the pointer; the old generation (and
//! its readers) is freed once the last query holding it finishes.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::types::{Generation, GenerationInfo};

/// Holder of the generation lookups are served from.
#[derive(Debug)]
pub struct DatabaseStore {
    current: RwLock<Option<Arc<Generation>>>,
}

impl DatabaseStore {
    /// Creates a store serving `initial`.
    pub fn new(initial: Generation) -> Self {
        Self {
            current: RwLock::new(Some(Arc::new(initial))),
        }
    }

    // A panicking writer only ever held the lock for a pointer assignment,
    // so the guarded value is always consistent.
    fn read(&self) -> RwLockReadGuard<'_, Option<Arc<Generation>>> {
        self.current.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Option<Arc<Generation>>> {
        self.current.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Returns the current generation, or `None` after [`DatabaseStore::close`].
    pub fn get(&self) -> Option<Arc<Generation>> {
        self.read().clone()
    }

    /// Installs `next` and returns the generation it replaced.
    ///
    /// The write lock is held only for the pointer replacement. Dropping the
    /// returned value releases the store's reference to the old handles.
    pub fn swap(&self, next: Generation) -> Option<Arc<Generation>> {
        let next = Arc::new(next);
        let previous = {
            let mut current = self.write();
            current.replace(next)
        };
        if let Some(prev) = &previous {
            log::debug!(
                "Swapped database generation (previous built at {:?}, {} other holders)",
                prev.built_at(),
                Arc::strong_count(prev) - 1
            );
        }
        previous
    }

    /// Installs `next` only if `expected` is still the current generation.
    ///
    /// Returns `false`, dropping `next`, when another swap (or
    /// [`DatabaseStore::close`]) happened in between.
    pub fn swap_if_current(&self, expected: &Arc<Generation>, next: Generation) -> bool {
        let mut current = self.write();
        if !current.as_ref().is_some_and(|held| Arc::ptr_eq(held, expected)) {
            return false;
        }
        *current = Some(Arc::new(next));
        true
    }

    /// Releases the store's reference to the current generation.
    ///
    /// Queries already holding the generation keep working; later [`get`]
    /// calls return `None`.
    ///
    /// [`get`]: DatabaseStore::get
    pub fn close(&self) {
        let previous = self.write().take();
        if previous.is_some() {
            log::info!("Database store closed");
        }
    }

    /// Metadata of the current generation.
    pub fn info(&self) -> Option<GenerationInfo> {
        self.get().map(|generation| generation.info())
    }
}
