//! Module declarations.
//!
//! A [`Module`] bundles a state record, getters, mutations, actions and child
//! modules. Declarations are plain data consumed once by `Store::new`; they
//! can be built in code with the builder methods, or loaded from a JSON
//! manifest whose handler entries name functions in a [`HandlerRegistry`].

use crate::context::ActionContext;
use crate::view::{GetterView, StateView};
use crate::{ActionResult, StoreError, StoreResult};
use futures::future::{BoxFuture, FutureExt};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

/// Getter handler: `(state, getters, root_state, root_getters) -> value`.
pub type GetterFn =
    Arc<dyn Fn(&StateView<'_>, &GetterView<'_>, &Value, &GetterView<'_>) -> Value + Send + Sync>;

/// Mutation handler: writes the payload into its module's state record.
pub type MutationFn = Arc<dyn Fn(&mut Map<String, Value>, Value) + Send + Sync>;

/// Action handler. The closure body runs when the action is dispatched; the
/// returned future runs when the dispatch is awaited.
pub type ActionFn = Arc<dyn Fn(ActionContext, Value) -> BoxFuture<'static, ActionResult> + Send + Sync>;

/// A handler slot of a module declaration.
#[derive(Clone)]
pub enum Entry<H> {
    /// A callable handler.
    Handler(H),
    /// A raw value standing where a handler was expected. Rejected when the
    /// store is built.
    Raw(Value),
}

impl<H> std::fmt::Debug for Entry<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Entry::Handler(_) => f.write_str("Handler(..)"),
            Entry::Raw(value) => f.debug_tuple("Raw").field(value).finish(),
        }
    }
}

/// Declaration of one module in the tree.
///
/// # Example
///
/// ```
/// use modux_store::{Module, Store};
/// use serde_json::json;
///
/// let counter = Module::new()
///     .namespaced(true)
///     .state(json!({"a": 1}))
///     .mutation("inc", |state, n| {
///         let a = state["a"].as_i64().unwrap_or(0);
///         state.insert("a".into(), json!(a + n.as_i64().unwrap_or(0)));
///     });
///
/// let store = Store::new(Module::new().module("m", counter)).unwrap();
/// store.commit("m/inc", 5).unwrap();
/// assert_eq!(store.get_state()["m"]["a"], 6);
/// ```
#[derive(Clone, Debug, Default)]
pub struct Module {
    pub(crate) namespaced: bool,
    pub(crate) state: Option<Value>,
    pub(crate) getters: Vec<(String, Entry<GetterFn>)>,
    pub(crate) mutations: Vec<(String, Entry<MutationFn>)>,
    pub(crate) actions: Vec<(String, Entry<ActionFn>)>,
    pub(crate) modules: Vec<(String, Module)>,
}

impl Module {
    /// Create an empty, non-namespaced module.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether this module's name becomes a namespace segment.
    pub fn namespaced(mut self, namespaced: bool) -> Self {
        self.namespaced = namespaced;
        self
    }

    /// Set the initial state record.
    pub fn state(mut self, state: Value) -> Self {
        self.state = Some(state);
        self
    }

    /// Declare a getter.
    pub fn getter<F>(self, name: impl Into<String>, getter: F) -> Self
    where
        F: Fn(&StateView<'_>, &GetterView<'_>, &Value, &GetterView<'_>) -> Value + Send + Sync + 'static,
    {
        self.getter_entry(name, Entry::Handler(Arc::new(getter)))
    }

    /// Declare a mutation.
    pub fn mutation<F>(self, name: impl Into<String>, mutation: F) -> Self
    where
        F: Fn(&mut Map<String, Value>, Value) + Send + Sync + 'static,
    {
        self.mutation_entry(name, Entry::Handler(Arc::new(mutation)))
    }

    /// Declare an action.
    pub fn action<F, Fut>(self, name: impl Into<String>, action: F) -> Self
    where
        F: Fn(ActionContext, Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ActionResult> + Send + 'static,
    {
        let handler: ActionFn = Arc::new(move |ctx, payload| action(ctx, payload).boxed());
        self.action_entry(name, Entry::Handler(handler))
    }

    /// Declare a getter slot directly.
    pub fn getter_entry(mut self, name: impl Into<String>, entry: Entry<GetterFn>) -> Self {
        upsert(&mut self.getters, name.into(), entry);
        self
    }

    /// Declare a mutation slot directly.
    pub fn mutation_entry(mut self, name: impl Into<String>, entry: Entry<MutationFn>) -> Self {
        upsert(&mut self.mutations, name.into(), entry);
        self
    }

    /// Declare an action slot directly.
    pub fn action_entry(mut self, name: impl Into<String>, entry: Entry<ActionFn>) -> Self {
        upsert(&mut self.actions, name.into(), entry);
        self
    }

    /// Add a child module. Its key is the namespace segment if the child is
    /// namespaced.
    pub fn module(mut self, key: impl Into<String>, module: Module) -> Self {
        upsert(&mut self.modules, key.into(), module);
        self
    }

    /// Whether this module is namespaced.
    pub fn is_namespaced(&self) -> bool {
        self.namespaced
    }

    /// Build a declaration tree from a JSON manifest.
    ///
    /// The manifest mirrors the module shape:
    ///
    /// ```json
    /// {
    ///   "namespaced": true,
    ///   "state": {"products": []},
    ///   "getters": {"count": "shop.count"},
    ///   "mutations": {"add": "shop.add"},
    ///   "actions": {},
    ///   "modules": {}
    /// }
    /// ```
    ///
    /// Handler entries are strings naming handlers in `registry`. Entries that
    /// do not resolve are kept as [`Entry::Raw`], so store construction
    /// reports them with `InvalidHandlerKind`.
    pub fn from_manifest(manifest: &Value, registry: &HandlerRegistry) -> StoreResult<Self> {
        let obj = manifest
            .as_object()
            .ok_or_else(|| StoreError::manifest("module manifest must be an object"))?;

        let mut module = Module::new();
        match obj.get("namespaced") {
            None | Some(Value::Null) => {}
            Some(Value::Bool(flag)) => module.namespaced = *flag,
            Some(other) => {
                return Err(StoreError::manifest(format!(
                    "namespaced must be a boolean, found {}",
                    crate::value_type_name(other)
                )))
            }
        }
        if let Some(state) = obj.get("state") {
            module.state = Some(state.clone());
        }

        for (name, raw) in manifest_table(obj, "getters")? {
            let entry = resolve_entry(raw, &registry.getters);
            module = module.getter_entry(name.clone(), entry);
        }
        for (name, raw) in manifest_table(obj, "mutations")? {
            let entry = resolve_entry(raw, &registry.mutations);
            module = module.mutation_entry(name.clone(), entry);
        }
        for (name, raw) in manifest_table(obj, "actions")? {
            let entry = resolve_entry(raw, &registry.actions);
            module = module.action_entry(name.clone(), entry);
        }
        for (key, child) in manifest_table(obj, "modules")? {
            module = module.module(key.clone(), Module::from_manifest(child, registry)?);
        }
        Ok(module)
    }

    /// Parse JSON text and build a declaration tree from it.
    pub fn from_manifest_str(raw: &str, registry: &HandlerRegistry) -> StoreResult<Self> {
        let manifest: Value =
            serde_json::from_str(raw).map_err(|e| StoreError::manifest(e.to_string()))?;
        Self::from_manifest(&manifest, registry)
    }
}

fn upsert<T>(entries: &mut Vec<(String, T)>, name: String, value: T) {
    match entries.iter_mut().find(|(existing, _)| *existing == name) {
        Some(slot) => slot.1 = value,
        None => entries.push((name, value)),
    }
}

fn manifest_table<'a>(
    obj: &'a Map<String, Value>,
    field: &str,
) -> StoreResult<Vec<(&'a String, &'a Value)>> {
    match obj.get(field) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Object(table)) => Ok(table.iter().collect()),
        Some(other) => Err(StoreError::manifest(format!(
            "{field} must be an object, found {}",
            crate::value_type_name(other)
        ))),
    }
}

fn resolve_entry<H: Clone>(raw: &Value, handlers: &HashMap<String, H>) -> Entry<H> {
    match raw.as_str().and_then(|name| handlers.get(name)) {
        Some(handler) => Entry::Handler(handler.clone()),
        None => Entry::Raw(raw.clone()),
    }
}

/// Named handlers that module manifests refer to.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    getters: HashMap<String, GetterFn>,
    mutations: HashMap<String, MutationFn>,
    actions: HashMap<String, ActionFn>,
}

impl HandlerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a getter under `name`.
    pub fn getter<F>(mut self, name: impl Into<String>, getter: F) -> Self
    where
        F: Fn(&StateView<'_>, &GetterView<'_>, &Value, &GetterView<'_>) -> Value + Send + Sync + 'static,
    {
        self.getters.insert(name.into(), Arc::new(getter));
        self
    }

    /// Register a mutation under `name`.
    pub fn mutation<F>(mut self, name: impl Into<String>, mutation: F) -> Self
    where
        F: Fn(&mut Map<String, Value>, Value) + Send + Sync + 'static,
    {
        self.mutations.insert(name.into(), Arc::new(mutation));
        self
    }

    /// Register an action under `name`.
    pub fn action<F, Fut>(mut self, name: impl Into<String>, action: F) -> Self
    where
        F: Fn(ActionContext, Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ActionResult> + Send + 'static,
    {
        let handler: ActionFn = Arc::new(move |ctx, payload| action(ctx, payload).boxed());
        self.actions.insert(name.into(), handler);
        self
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("getters", &self.getters.keys().collect::<Vec<_>>())
            .field("mutations", &self.mutations.keys().collect::<Vec<_>>())
            .field("actions", &self.actions.keys().collect::<Vec<_>>())
            .finish()
    }
}
