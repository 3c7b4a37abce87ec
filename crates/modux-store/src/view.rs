//! Read-tracking views handed to getters.
//!
//! Every read made through a [`StateView`] or [`GetterView`] is recorded as a
//! dependency of the getter being evaluated, together with the value seen.
//! The getter memo revalidates exactly those dependencies after a commit.

use crate::store::StoreInner;
use crate::tree::StateTree;
use crate::Namespace;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::cell::RefCell;

/// Which getter table a read went through.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Scope {
    /// Flat table, fully-qualified names.
    Flat,
    /// Root-scope getters only.
    Root,
}

/// A value read during a getter evaluation.
#[derive(Clone, Debug)]
pub(crate) enum Dependency {
    State {
        path: Vec<String>,
        seen: Option<Value>,
    },
    Getter {
        scope: Scope,
        name: String,
        seen: Option<Value>,
    },
}

impl Dependency {
    /// Whether the dependency still reads the value it saw.
    pub(crate) fn is_current(&self, inner: &StoreInner) -> bool {
        match self {
            Dependency::State { path, seen } => inner.tree().value_at(path) == *seen,
            Dependency::Getter { scope, name, seen } => inner.read_getter(*scope, name) == *seen,
        }
    }
}

/// Collects dependencies during one getter evaluation.
#[derive(Debug, Default)]
pub(crate) struct Tracker {
    deps: RefCell<Vec<Dependency>>,
}

impl Tracker {
    fn record(&self, dep: Dependency) {
        self.deps.borrow_mut().push(dep);
    }

    pub(crate) fn into_deps(self) -> Vec<Dependency> {
        self.deps.into_inner()
    }
}

/// Tracked read access to a module's state record.
pub struct StateView<'a> {
    tree: &'a StateTree,
    base: &'a Namespace,
    tracker: &'a Tracker,
}

impl<'a> StateView<'a> {
    pub(crate) fn new(tree: &'a StateTree, base: &'a Namespace, tracker: &'a Tracker) -> Self {
        Self { tree, base, tracker }
    }

    /// Namespace of the record this view reads.
    pub fn namespace(&self) -> &Namespace {
        self.base
    }

    /// Read a field of the record.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.get_in(&[key])
    }

    /// Read a nested field below the record.
    pub fn get_in(&self, keys: &[&str]) -> Option<Value> {
        let mut path = self.base.segments().to_vec();
        path.extend(keys.iter().map(|k| (*k).to_owned()));
        self.read_path(path)
    }

    /// Read a field and deserialize it; `None` when absent or of another type.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.get(key).and_then(|v| serde_json::from_value(v).ok())
    }

    /// The whole record (`Null` if it no longer exists).
    pub fn value(&self) -> Value {
        self.read_path(self.base.segments().to_vec())
            .unwrap_or(Value::Null)
    }

    fn read_path(&self, path: Vec<String>) -> Option<Value> {
        let seen = self.tree.value_at(&path);
        self.tracker.record(Dependency::State {
            path,
            seen: seen.clone(),
        });
        seen
    }
}

/// Tracked read access to a getter table.
///
/// The `getters` argument of a getter is the flat table addressed by
/// fully-qualified names; `root_getters` only sees root-scope getters.
pub struct GetterView<'a> {
    inner: &'a StoreInner,
    scope: Scope,
    namespace: &'a Namespace,
    tracker: &'a Tracker,
}

impl<'a> GetterView<'a> {
    pub(crate) fn new(
        inner: &'a StoreInner,
        scope: Scope,
        namespace: &'a Namespace,
        tracker: &'a Tracker,
    ) -> Self {
        Self {
            inner,
            scope,
            namespace,
            tracker,
        }
    }

    /// Read a getter by the name it has in this table.
    pub fn get(&self, name: &str) -> Option<Value> {
        let seen = self.inner.read_getter(self.scope, name);
        self.tracker.record(Dependency::Getter {
            scope: self.scope,
            name: name.to_owned(),
            seen: seen.clone(),
        });
        seen
    }

    /// Read a getter and deserialize it.
    pub fn get_as<T: DeserializeOwned>(&self, name: &str) -> Option<T> {
        self.get(name).and_then(|v| serde_json::from_value(v).ok())
    }

    /// Read a getter declared in the same namespace as the reading getter.
    pub fn local(&self, name: &str) -> Option<Value> {
        match self.scope {
            Scope::Flat => self.get(&self.namespace.qualify(name)),
            Scope::Root => self.get(name),
        }
    }

    /// Whether `name` is registered in this table. Not tracked.
    pub fn contains(&self, name: &str) -> bool {
        self.inner.has_getter(self.scope, name)
    }
}
