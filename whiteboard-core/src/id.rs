//! # IDs
//! Process-unique IDs, namespaced by a marker type so that e.g. a `UniqueId<LoadTicket>` can't be
//! confused with an ID of anything else. IDs are increasing within one process, which is used to
//! tell which of several in-flight requests is the latest.
//!
//! These are *not* stable across runs and must never be persisted. Persisted things (drafts) carry
//! their own time-derived string ids.

use std::sync::atomic::{AtomicU64, Ordering};

// One counter shared by every namespace. Values only need to be unique, not dense.
static NEXT_ID: AtomicU64 = AtomicU64::new(1);

pub struct UniqueId<T: 'static> {
    id: std::num::NonZeroU64,
    _phantom: std::marker::PhantomData<fn() -> T>,
}
impl<T: 'static> UniqueId<T> {
    /// Allocate a new ID, greater than every ID allocated before it.
    ///
    /// # Panics
    /// After `u64::MAX - 1` allocations. Not reachable in practice.
    #[must_use]
    pub fn next() -> Self {
        let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
        Self {
            id: std::num::NonZeroU64::new(id).expect("ID counter overflowed"),
            _phantom: std::marker::PhantomData,
        }
    }
    #[must_use]
    pub fn get(self) -> u64 {
        self.id.get()
    }
}
impl<T: 'static> Default for UniqueId<T> {
    fn default() -> Self {
        Self::next()
    }
}
impl<T: 'static> Clone for UniqueId<T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T: 'static> Copy for UniqueId<T> {}
impl<T: 'static> PartialEq for UniqueId<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}
impl<T: 'static> Eq for UniqueId<T> {}
impl<T: 'static> PartialOrd for UniqueId<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl<T: 'static> Ord for UniqueId<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.id.cmp(&other.id)
    }
}
impl<T: 'static> std::hash::Hash for UniqueId<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
impl<T: 'static> std::fmt::Display for UniqueId<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}#{}",
            std::any::type_name::<T>().rsplit("::").next().unwrap_or_default(),
            self.id
        )
    }
}
impl<T: 'static> std::fmt::Debug for UniqueId<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        <Self as std::fmt::Display>::fmt(self, f)
    }
}
