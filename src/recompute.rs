//! Dirty tracking and checkpoint/rollback for cached derived quantities.
//!
//! The sampler drives every stateful component through the same cycle:
//! parameters change (`notify_changed`), derived state is rebuilt lazily on
//! the next query, and the step is either accepted (`checkpoint`) or rejected
//! (`rollback`).

use std::sync::Arc;

pub trait Recompute {
    /// Marks cached state stale. Any upstream change forces a full rebuild, so
    /// this always reports that recalculation is needed.
    fn notify_changed(&mut self) -> bool;

    fn is_dirty(&self) -> bool;

    fn checkpoint(&mut self);

    fn rollback(&mut self);
}

/// Version counter compared against the version the cache was last built at.
#[derive(Debug, Clone, Default)]
pub struct DirtyTracker {
    version: u64,
    built: Option<u64>,
}

impl DirtyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notify_changed(&mut self) -> bool {
        self.version += 1;
        true
    }

    pub fn is_dirty(&self) -> bool {
        self.built != Some(self.version)
    }

    pub fn mark_built(&mut self) {
        self.built = Some(self.version);
    }

    pub fn mark_dirty(&mut self) {
        self.built = None;
    }

    pub fn version(&self) -> u64 {
        self.version
    }
}

#[derive(Debug, Clone)]
struct Snapshot<T> {
    value: Option<Arc<T>>,
    clean: bool,
}

/// A lazily built value with an accepted snapshot.
///
/// The snapshot shares storage with the active value until the next rebuild;
/// `rebuild` goes through `Arc::make_mut`, so storage still held by a
/// snapshot is copied before it is written and a checkpoint can never observe
/// a later rebuild.
#[derive(Debug, Clone)]
pub struct Checkpointed<T> {
    active: Option<Arc<T>>,
    stored: Option<Snapshot<T>>,
    tracker: DirtyTracker,
}

impl<T> Default for Checkpointed<T> {
    fn default() -> Self {
        Self {
            active: None,
            stored: None,
            tracker: DirtyTracker::new(),
        }
    }
}

impl<T: Clone> Checkpointed<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<&T> {
        self.active.as_deref()
    }

    /// Rebuilds the active value. `allocate` runs only when no storage exists
    /// yet; `fill` then overwrites the storage.
    pub fn rebuild<A, F>(&mut self, allocate: A, fill: F) -> &T
    where
        A: FnOnce() -> T,
        F: FnOnce(&mut T),
    {
        self.refresh(true, allocate, fill)
    }

    /// Like [`Checkpointed::rebuild`], but only when the value is stale.
    pub fn get_or_rebuild<A, F>(&mut self, allocate: A, fill: F) -> &T
    where
        A: FnOnce() -> T,
        F: FnOnce(&mut T),
    {
        self.refresh(false, allocate, fill)
    }

    fn refresh<A, F>(&mut self, force: bool, allocate: A, fill: F) -> &T
    where
        A: FnOnce() -> T,
        F: FnOnce(&mut T),
    {
        let stale = force || self.tracker.is_dirty() || self.active.is_none();
        let slot = self.active.get_or_insert_with(|| Arc::new(allocate()));
        if stale {
            fill(Arc::make_mut(slot));
            self.tracker.mark_built();
        }
        &**slot
    }

    pub fn needs_rebuild(&self) -> bool {
        self.tracker.is_dirty() || self.active.is_none()
    }

    /// True when the active value and the snapshot share storage.
    pub fn shares_storage_with_checkpoint(&self) -> bool {
        match (&self.active, self.stored.as_ref().and_then(|s| s.value.as_ref())) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    pub fn tracker(&self) -> &DirtyTracker {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut DirtyTracker {
        &mut self.tracker
    }
}

impl<T: Clone> Recompute for Checkpointed<T> {
    fn notify_changed(&mut self) -> bool {
        self.tracker.notify_changed()
    }

    fn is_dirty(&self) -> bool {
        self.tracker.is_dirty()
    }

    fn checkpoint(&mut self) {
        self.stored = Some(Snapshot {
            value: self.active.clone(),
            clean: !self.tracker.is_dirty(),
        });
    }

    fn rollback(&mut self) {
        // Rolling back without a checkpoint leaves the current state untouched.
        let Some(snapshot) = self.stored.as_ref() else {
            return;
        };
        self.active = snapshot.value.clone();
        if snapshot.clean && self.active.is_some() {
            self.tracker.mark_built();
        } else {
            self.tracker.mark_dirty();
        }
    }
}
