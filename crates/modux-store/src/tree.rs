//! Shared state document with a commit revision.
//!
//! `StateTree` owns the single composed state tree of a store. Every write
//! goes through [`StateTree::mutate`], which applies the change in place and
//! advances the revision so memoized getters know they must revalidate.

use crate::namespace::{ensure_record, get_namespaced_value, get_namespaced_value_mut};
use crate::{Namespace, StoreError, StoreResult};
use parking_lot::Mutex;
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicU64, Ordering};

/// Mutex-guarded state document plus a monotonically increasing revision.
pub(crate) struct StateTree {
    doc: Mutex<Value>,
    revision: AtomicU64,
}

impl StateTree {
    /// Create a tree from an initial document.
    pub fn new(value: Value) -> Self {
        Self {
            doc: Mutex::new(value),
            revision: AtomicU64::new(0),
        }
    }

    /// Current revision. Advanced once per applied mutation.
    #[inline]
    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::Acquire)
    }

    /// Run `f` against the current document.
    ///
    /// The lock is held while `f` runs; do not call back into the store.
    pub fn read<R>(&self, f: impl FnOnce(&Value) -> R) -> R {
        f(&self.doc.lock())
    }

    /// Clone the value at `path`, resolved like `get_namespaced_value`.
    pub fn value_at<S: AsRef<str>>(&self, path: &[S]) -> Option<Value> {
        self.read(|doc| get_namespaced_value(doc, path).cloned())
    }

    /// Clone the whole document.
    pub fn snapshot(&self) -> Value {
        self.doc.lock().clone()
    }

    /// Apply `f` to the record at `namespace` and advance the revision.
    ///
    /// The revision advances even if `f` panics, since writes made before
    /// the panic stay in the document.
    ///
    /// Fails with `DetachedState` when the record was replaced by a
    /// non-record value or removed.
    pub fn mutate<R>(
        &self,
        namespace: &Namespace,
        f: impl FnOnce(&mut Map<String, Value>) -> R,
    ) -> StoreResult<R> {
        let mut doc = self.doc.lock();
        let record = get_namespaced_value_mut(&mut doc, namespace.segments())
            .and_then(Value::as_object_mut)
            .ok_or_else(|| StoreError::detached(namespace.clone()))?;
        let _bump = RevisionBump(&self.revision);
        Ok(f(record))
    }

    /// Construction-time access to the record at `namespace`, creating any
    /// missing level. Does not advance the revision.
    pub(crate) fn with_record<R>(
        &self,
        namespace: &Namespace,
        f: impl FnOnce(&mut Map<String, Value>) -> R,
    ) -> R {
        let mut doc = self.doc.lock();
        f(ensure_record(&mut doc, namespace.segments()))
    }
}

/// Advances the revision when dropped, including during unwinding.
struct RevisionBump<'a>(&'a AtomicU64);

impl Drop for RevisionBump<'_> {
    fn drop(&mut self) {
        self.0.fetch_add(1, Ordering::AcqRel);
    }
}

impl Default for StateTree {
    fn default() -> Self {
        Self::new(Value::Object(Default::default()))
    }
}

impl std::fmt::Debug for StateTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateTree")
            .field("revision", &self.revision())
            .finish_non_exhaustive()
    }
}
