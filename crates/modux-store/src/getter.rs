//! Memoized getter cells.
//!
//! A `GetterCell` evaluates its handler lazily on first read and caches the
//! result together with the dependencies read during evaluation. Later reads
//! return the cache while the store revision is unchanged. After a commit the
//! recorded dependencies are compared against the current values and the
//! handler only runs again if one of them changed.

use crate::module::GetterFn;
use crate::store::StoreInner;
use crate::view::{Dependency, GetterView, Scope, StateView, Tracker};
use crate::warning::Warning;
use crate::Namespace;
use parking_lot::Mutex;
use serde_json::Value;
use std::cell::RefCell;
use std::sync::atomic::{AtomicU64, Ordering};

thread_local! {
    static EVALUATING: RefCell<Vec<usize>> = const { RefCell::new(Vec::new()) };
}

/// Marks a cell as being read on this thread; popped on drop, including
/// when the handler panics.
struct ReadGuard(usize);

impl ReadGuard {
    fn enter(id: usize) -> Option<Self> {
        EVALUATING.with(|stack| {
            let mut stack = stack.borrow_mut();
            if stack.contains(&id) {
                return None;
            }
            stack.push(id);
            Some(ReadGuard(id))
        })
    }
}

impl Drop for ReadGuard {
    fn drop(&mut self) {
        EVALUATING.with(|stack| {
            let mut stack = stack.borrow_mut();
            if let Some(pos) = stack.iter().rposition(|id| *id == self.0) {
                stack.remove(pos);
            }
        });
    }
}

struct Memo {
    value: Value,
    revision: u64,
    deps: Vec<Dependency>,
}

pub(crate) struct GetterCell {
    name: String,
    namespace: Namespace,
    handler: GetterFn,
    memo: Mutex<Option<Memo>>,
    evaluations: AtomicU64,
}

impl GetterCell {
    pub(crate) fn new(name: String, namespace: Namespace, handler: GetterFn) -> Self {
        Self {
            name,
            namespace,
            handler,
            memo: Mutex::new(None),
            evaluations: AtomicU64::new(0),
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    /// How many times the handler has run.
    pub(crate) fn evaluations(&self) -> u64 {
        self.evaluations.load(Ordering::Relaxed)
    }

    /// Current value of the getter. `None` when the read is re-entrant
    /// (the getter depends on itself).
    pub(crate) fn read(&self, inner: &StoreInner) -> Option<Value> {
        let Some(_guard) = ReadGuard::enter(self as *const Self as usize) else {
            inner.report(Warning::GetterCycle {
                name: self.name.clone(),
            });
            return None;
        };

        let revision = inner.tree().revision();
        let deps = {
            let memo = self.memo.lock();
            match memo.as_ref() {
                Some(m) if m.revision == revision => return Some(m.value.clone()),
                Some(m) => Some(m.deps.clone()),
                None => None,
            }
        };

        // Locks are released while dependencies are revalidated, since
        // validating a getter dependency reads another cell.
        if let Some(deps) = deps {
            if deps.iter().all(|dep| dep.is_current(inner)) {
                let mut memo = self.memo.lock();
                if let Some(m) = memo.as_mut() {
                    m.revision = m.revision.max(revision);
                    return Some(m.value.clone());
                }
            }
        }

        Some(self.evaluate(inner, revision))
    }

    fn evaluate(&self, inner: &StoreInner, revision: u64) -> Value {
        let tracker = Tracker::default();
        let value = {
            let state = StateView::new(inner.tree(), &self.namespace, &tracker);
            let getters = GetterView::new(inner, Scope::Flat, &self.namespace, &tracker);
            let root_getters = GetterView::new(inner, Scope::Root, &self.namespace, &tracker);
            (self.handler)(&state, &getters, inner.root_state(), &root_getters)
        };
        self.evaluations.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(getter = %self.name, revision, "getter evaluated");

        *self.memo.lock() = Some(Memo {
            value: value.clone(),
            revision,
            deps: tracker.into_deps(),
        });
        value
    }
}

impl std::fmt::Debug for GetterCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GetterCell")
            .field("name", &self.name)
            .field("namespace", &self.namespace)
            .field("evaluations", &self.evaluations())
            .finish_non_exhaustive()
    }
}
