//! Namespace-scoped context handed to actions.
//!
//! Actions receive an owned `ActionContext` so the future they return can
//! hold it across `.await` points. `commit` and `dispatch` on the context
//! prefix the action's namespace, so an action addresses sibling mutations
//! and actions by their local names.

use crate::store::Dispatch;
use crate::{Namespace, Store, StoreResult};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Scoped view of the store for one action invocation.
///
/// # Example
///
/// ```
/// use modux_store::{Module, Store};
/// use serde_json::{json, Value};
///
/// # futures::executor::block_on(async {
/// let inner = Module::new()
///     .namespaced(true)
///     .state(json!({"test": 1}))
///     .mutation("change", |state, n| {
///         state.insert("test".into(), n);
///     })
///     .action("change_later", |ctx, n| async move {
///         ctx.commit("change", n)?; // resolves to "inner/change"
///         Ok(Value::Null)
///     });
///
/// let store = Store::new(Module::new().module("inner", inner)).unwrap();
/// store.dispatch("inner/change_later", 2).await.unwrap();
/// assert_eq!(store.get_state()["inner"]["test"], 2);
/// # });
/// ```
#[derive(Clone)]
pub struct ActionContext {
    store: Store,
    namespace: Namespace,
}

impl ActionContext {
    pub(crate) fn new(store: Store, namespace: Namespace) -> Self {
        Self { store, namespace }
    }

    /// Namespace of the module that declared the action.
    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// Snapshot of the module's state record.
    pub fn state(&self) -> Value {
        self.store
            .inner()
            .tree()
            .value_at(self.namespace.segments())
            .unwrap_or(Value::Null)
    }

    /// Read one field of the module's state record.
    pub fn state_value(&self, key: &str) -> Option<Value> {
        let mut path = self.namespace.segments().to_vec();
        path.push(key.to_owned());
        self.store.inner().tree().value_at(&path)
    }

    /// Read one field of the module's state record and deserialize it.
    pub fn state_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.state_value(key)
            .and_then(|v| serde_json::from_value(v).ok())
    }

    /// Root state snapshot taken when the store was built.
    pub fn root_state(&self) -> &Value {
        self.store.root_state()
    }

    /// Read a getter of this module by its local name.
    pub fn getter(&self, local: &str) -> Option<Value> {
        self.store.getter(&self.namespace.qualify(local))
    }

    /// Read any getter by its fully-qualified name.
    pub fn getter_qualified(&self, name: &str) -> Option<Value> {
        self.store.getter(name)
    }

    /// Every getter in the store, keyed by qualified name in registration
    /// order.
    pub fn getters(&self) -> Map<String, Value> {
        self.store
            .getter_names()
            .iter()
            .filter_map(|name| Some((name.clone(), self.store.getter(name)?)))
            .collect()
    }

    /// Read a root-scope getter.
    pub fn root_getter(&self, name: &str) -> Option<Value> {
        self.store.root_getter(name)
    }

    /// Commit a mutation of this module by its local name.
    pub fn commit(&self, local: &str, payload: impl Into<Value>) -> StoreResult<()> {
        self.store.commit(&self.namespace.qualify(local), payload)
    }

    /// Dispatch an action of this module by its local name.
    pub fn dispatch(&self, local: &str, payload: impl Into<Value>) -> Dispatch {
        self.store.dispatch(&self.namespace.qualify(local), payload)
    }
}

impl std::fmt::Debug for ActionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionContext")
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}
