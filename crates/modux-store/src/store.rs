//! The store: resolved tables plus the commit/dispatch protocol.
//!
//! A [`Store`] is built once from a module declaration tree. It owns the
//! composed state tree, the flat getter/mutation/action tables produced by
//! the walker, and the subscriber lists. `Store` is a cheap handle over an
//! `Arc`, so actions can hold it across `.await` points.

use crate::context::ActionContext;
use crate::getter::GetterCell;
use crate::module::Module;
use crate::provide::{Providers, STORE_KEY};
use crate::tree::StateTree;
use crate::view::Scope;
use crate::walker::{BoundAction, BoundMutation, Tables, Walker};
use crate::warning::{Warning, WarningLog};
use crate::{namespace, ActionResult, Namespace, StoreOptions, StoreResult};
use futures::future::{self, BoxFuture, FutureExt};
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Future returned by [`Store::dispatch`].
pub type Dispatch = BoxFuture<'static, ActionResult>;

/// Subscriber callback: `(event, state)`.
pub type Subscriber = Arc<dyn Fn(&Event, &Value) + Send + Sync>;

/// A commit or dispatch as seen by subscribers.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Event {
    /// Qualified mutation or action name.
    pub name: String,
    /// Payload passed by the caller.
    pub payload: Value,
}

pub(crate) struct StoreInner {
    options: StoreOptions,
    tree: StateTree,
    root_state: Value,
    getters: HashMap<String, Arc<GetterCell>>,
    root_getters: HashMap<String, Arc<GetterCell>>,
    getter_order: Vec<String>,
    mutations: HashMap<String, BoundMutation>,
    actions: HashMap<String, BoundAction>,
    subscribers: Mutex<Vec<Subscriber>>,
    action_subscribers: Mutex<Vec<Subscriber>>,
    warnings: Mutex<WarningLog>,
}

impl StoreInner {
    pub(crate) fn tree(&self) -> &StateTree {
        &self.tree
    }

    pub(crate) fn root_state(&self) -> &Value {
        &self.root_state
    }

    fn table(&self, scope: Scope) -> &HashMap<String, Arc<GetterCell>> {
        match scope {
            Scope::Flat => &self.getters,
            Scope::Root => &self.root_getters,
        }
    }

    pub(crate) fn read_getter(&self, scope: Scope, name: &str) -> Option<Value> {
        let cell = self.table(scope).get(name)?.clone();
        cell.read(self)
    }

    pub(crate) fn has_getter(&self, scope: Scope, name: &str) -> bool {
        self.table(scope).contains_key(name)
    }

    /// Record a warning. Lookup misses are dropped in production mode.
    pub(crate) fn report(&self, warning: Warning) {
        if warning.is_lookup_miss() && !self.options.is_development() {
            return;
        }
        self.warnings.lock().push(warning);
    }

    /// Notify `list` in insertion order. The list is cloned out first so a
    /// subscriber may subscribe, commit or dispatch.
    fn notify(&self, list: &Mutex<Vec<Subscriber>>, event: &Event) {
        let subscribers = list.lock().clone();
        if subscribers.is_empty() {
            return;
        }
        let state = self.tree.snapshot();
        for subscriber in &subscribers {
            subscriber(event, &state);
        }
    }
}

/// Handle to a built store.
///
/// # Example
///
/// ```
/// use modux_store::{Module, Store};
/// use serde_json::json;
///
/// let store = Store::new(
///     Module::new()
///         .state(json!({"count": 0}))
///         .mutation("inc", |state, _| {
///             let n = state["count"].as_i64().unwrap_or(0);
///             state.insert("count".into(), json!(n + 1));
///         })
///         .getter("double", |state, _, _, _| {
///             json!(state.get_as::<i64>("count").unwrap_or(0) * 2)
///         }),
/// )
/// .unwrap();
///
/// store.commit("inc", ()).unwrap();
/// assert_eq!(store.getter("double"), Some(json!(2)));
/// ```
#[derive(Clone)]
pub struct Store {
    inner: Arc<StoreInner>,
}

/// Build a store with default options.
pub fn create_store(module: Module) -> StoreResult<Store> {
    Store::new(module)
}

impl Store {
    /// Build a store with default options.
    pub fn new(module: Module) -> StoreResult<Self> {
        Self::with_options(module, StoreOptions::default())
    }

    /// Build a store by walking `module` and its descendants.
    ///
    /// Fails without producing a partial store when a handler slot is not
    /// callable, a state value is not a record, or (in strict mode) two
    /// modules claim the same state key.
    pub fn with_options(module: Module, options: StoreOptions) -> StoreResult<Self> {
        let (tree, tables, warnings) = Walker::new(&options).run(module)?;
        let Tables {
            getters,
            root_getters,
            getter_order,
            mutations,
            actions,
        } = tables;

        tracing::debug!(
            getters = getters.len(),
            mutations = mutations.len(),
            actions = actions.len(),
            warnings = warnings.len(),
            mode = ?options.mode,
            "store built"
        );

        let root_state = tree.snapshot();
        Ok(Self {
            inner: Arc::new(StoreInner {
                options,
                tree,
                root_state,
                getters,
                root_getters,
                getter_order,
                mutations,
                actions,
                subscribers: Mutex::new(Vec::new()),
                action_subscribers: Mutex::new(Vec::new()),
                warnings: Mutex::new(warnings),
            }),
        })
    }

    pub(crate) fn inner(&self) -> &StoreInner {
        &self.inner
    }

    /// Options the store was built with.
    pub fn options(&self) -> &StoreOptions {
        &self.inner.options
    }

    /// Snapshot of the current state tree.
    pub fn get_state(&self) -> Value {
        self.inner.tree.snapshot()
    }

    /// Run `f` against the current state tree without cloning it.
    ///
    /// The tree is locked while `f` runs; `f` must not call back into the
    /// store.
    pub fn with_state<R>(&self, f: impl FnOnce(&Value) -> R) -> R {
        self.inner.tree.read(f)
    }

    /// Read the value at a slash path (`"cart/items"`). The empty path is
    /// the whole tree.
    pub fn state_at(&self, path: &str) -> Option<Value> {
        self.inner.tree.value_at(Namespace::parse(path).segments())
    }

    /// Root state as it was when the store was built.
    pub fn root_state(&self) -> &Value {
        &self.inner.root_state
    }

    /// Resolve `path` inside `container`; see
    /// [`namespace::get_namespaced_value`].
    pub fn get_namespaced_value<'a, S: AsRef<str>>(
        container: &'a Value,
        path: &[S],
    ) -> Option<&'a Value> {
        namespace::get_namespaced_value(container, path)
    }

    /// Read a getter by its qualified name.
    pub fn getter(&self, name: &str) -> Option<Value> {
        self.inner.read_getter(Scope::Flat, name)
    }

    /// Read a root-scope getter.
    pub fn root_getter(&self, name: &str) -> Option<Value> {
        self.inner.read_getter(Scope::Root, name)
    }

    /// Qualified getter names in registration order.
    pub fn getter_names(&self) -> &[String] {
        &self.inner.getter_order
    }

    /// How many times the getter `name` has been evaluated.
    pub fn getter_evaluations(&self, name: &str) -> Option<u64> {
        self.inner.getters.get(name).map(|cell| cell.evaluations())
    }

    pub fn has_getter(&self, name: &str) -> bool {
        self.inner.has_getter(Scope::Flat, name)
    }

    pub fn has_mutation(&self, name: &str) -> bool {
        self.inner.mutations.contains_key(name)
    }

    pub fn has_action(&self, name: &str) -> bool {
        self.inner.actions.contains_key(name)
    }

    /// Apply the mutation `name` synchronously, then notify subscribers.
    ///
    /// An unknown name is reported as a warning (development mode) and is
    /// otherwise a no-op.
    pub fn commit(&self, name: &str, payload: impl Into<Value>) -> StoreResult<()> {
        let payload = payload.into();
        let Some(bound) = self.inner.mutations.get(name) else {
            self.inner.report(Warning::UnknownMutation {
                name: name.to_owned(),
            });
            return Ok(());
        };

        self.inner
            .tree
            .mutate(&bound.namespace, |record| {
                (bound.handler)(record, payload.clone())
            })?;
        tracing::debug!(
            mutation = %name,
            revision = self.inner.tree.revision(),
            "committed"
        );

        let event = Event {
            name: name.to_owned(),
            payload,
        };
        self.inner.notify(&self.inner.subscribers, &event);
        Ok(())
    }

    /// Start the action `name` and return its future.
    ///
    /// The handler's synchronous body runs before this returns. Action
    /// subscribers are notified right after, so they see the dispatch before
    /// any of the action's asynchronous work has run. An unknown name is
    /// reported as a warning (development mode) and resolves to `Null`.
    pub fn dispatch(&self, name: &str, payload: impl Into<Value>) -> Dispatch {
        let payload = payload.into();
        let Some(bound) = self.inner.actions.get(name) else {
            self.inner.report(Warning::UnknownAction {
                name: name.to_owned(),
            });
            return future::ready(Ok(Value::Null)).boxed();
        };

        let ctx = ActionContext::new(self.clone(), bound.namespace.clone());
        let pending = (bound.handler)(ctx, payload.clone());
        tracing::debug!(action = %name, "dispatched");

        let event = Event {
            name: name.to_owned(),
            payload,
        };
        self.inner.notify(&self.inner.action_subscribers, &event);
        pending
    }

    /// Register a callback run after every commit.
    pub fn subscribe<F>(&self, subscriber: F)
    where
        F: Fn(&Event, &Value) + Send + Sync + 'static,
    {
        self.inner.subscribers.lock().push(Arc::new(subscriber));
    }

    /// Register a callback run on every dispatch.
    pub fn subscribe_action<F>(&self, subscriber: F)
    where
        F: Fn(&Event, &Value) + Send + Sync + 'static,
    {
        self.inner.action_subscribers.lock().push(Arc::new(subscriber));
    }

    /// Record a warning against this store.
    pub fn report(&self, warning: Warning) {
        self.inner.report(warning);
    }

    /// Warnings recorded since the last [`Store::take_warnings`], oldest
    /// first. Only the most recent 256 are kept.
    pub fn warnings(&self) -> Vec<Warning> {
        self.inner.warnings.lock().all()
    }

    /// Remove and return the pending warnings.
    pub fn take_warnings(&self) -> Vec<Warning> {
        self.inner.warnings.lock().take_new()
    }

    /// Register this store in `providers` under [`STORE_KEY`].
    pub fn install(&self, providers: &mut Providers) {
        providers.provide(STORE_KEY, self.clone());
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("options", &self.inner.options)
            .field("revision", &self.inner.tree.revision())
            .field("getters", &self.inner.getter_order)
            .field("mutations", &self.inner.mutations.len())
            .field("actions", &self.inner.actions.len())
            .finish_non_exhaustive()
    }
}
