//! Helpers that bind store state, getters, mutations and actions to keys.
//!
//! Every helper takes the caller's [`Providers`], an optional namespace
//! (`"a/b"`) and a [`Mapping`]. Names are qualified with the namespace and
//! looked up once at binding time; a name the store does not have is skipped
//! and reported as a `Warning::Unbound`. Reads through a binding are live.

use crate::mapping::{Bound, Mapping};
use crate::{use_store, BindingResult};
use modux_store::{
    get_namespaced_value, BindingKind, Dispatch, HandlerKind, Namespace, Providers, Store, Value,
    Warning,
};
use std::sync::Arc;

type Project = Arc<dyn Fn(&Value) -> Value + Send + Sync>;

#[derive(Clone)]
enum Source {
    Path(Vec<String>),
    Project { slice: Vec<String>, project: Project },
}

/// Live read of a state value.
#[derive(Clone)]
pub struct StateBinding {
    store: Store,
    source: Source,
}

impl StateBinding {
    /// Current value, `None` if the path no longer resolves.
    pub fn get(&self) -> Option<Value> {
        match &self.source {
            Source::Path(path) => self
                .store
                .with_state(|state| get_namespaced_value(state, path).cloned()),
            Source::Project { slice, project } => {
                let slice = self
                    .store
                    .with_state(|state| get_namespaced_value(state, slice).cloned())
                    .unwrap_or(Value::Null);
                Some(project(&slice)).filter(|v| !v.is_null())
            }
        }
    }
}

/// Live read of a getter.
#[derive(Clone, Debug)]
pub struct GetterBinding {
    store: Store,
    name: String,
}

impl GetterBinding {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self) -> Option<Value> {
        self.store.getter(&self.name)
    }
}

/// A mutation bound to its qualified name.
#[derive(Clone, Debug)]
pub struct MutationBinding {
    store: Store,
    name: String,
}

impl MutationBinding {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Commit the mutation with `payload`.
    pub fn call(&self, payload: impl Into<Value>) -> BindingResult<()> {
        self.store.commit(&self.name, payload)?;
        Ok(())
    }
}

/// An action bound to its qualified name.
#[derive(Clone, Debug)]
pub struct ActionBinding {
    store: Store,
    name: String,
}

impl ActionBinding {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Dispatch the action with `payload`.
    pub fn call(&self, payload: impl Into<Value>) -> Dispatch {
        self.store.dispatch(&self.name, payload)
    }
}

fn namespace_of(namespace: Option<&str>) -> Namespace {
    namespace.map(Namespace::parse).unwrap_or_default()
}

fn unbound(store: &Store, kind: BindingKind, name: String) {
    store.report(Warning::Unbound { kind, name });
}

/// Bind state values by key. A key containing `/` reads a nested value
/// below the namespace.
///
/// ```
/// use modux_bindings::{map_state, Mapping};
/// use modux_store::{Module, Providers, Store};
/// use serde_json::json;
///
/// let store = Store::new(
///     Module::new().module("inner", Module::new().namespaced(true).state(json!({"test": 1}))),
/// )
/// .unwrap();
/// let mut providers = Providers::new();
/// store.install(&mut providers);
///
/// let state = map_state(&providers, Some("inner"), Mapping::aliased([("t", "test")])).unwrap();
/// assert_eq!(state.get("t").unwrap().get(), Some(json!(1)));
/// ```
pub fn map_state(
    providers: &Providers,
    namespace: Option<&str>,
    mapping: Mapping,
) -> BindingResult<Bound<StateBinding>> {
    let store = use_store(providers)?;
    let base = namespace_of(namespace);
    let mut bound = Bound::new();

    for (key, name) in mapping.pairs() {
        let mut path = base.segments().to_vec();
        path.extend(Namespace::parse(&name).segments().iter().cloned());
        let binding = StateBinding {
            store: store.clone(),
            source: Source::Path(path),
        };
        if binding.get().is_some() {
            bound.insert(key, binding);
        } else {
            unbound(&store, BindingKind::State, base.qualify(&name));
        }
    }
    tracing::debug!(namespace = %base, bound = bound.len(), "state bound");
    Ok(bound)
}

/// Bind computed state values: each function receives the namespace's
/// state slice.
pub fn map_state_with<I, K, F>(
    providers: &Providers,
    namespace: Option<&str>,
    projections: I,
) -> BindingResult<Bound<StateBinding>>
where
    I: IntoIterator<Item = (K, F)>,
    K: Into<String>,
    F: Fn(&Value) -> Value + Send + Sync + 'static,
{
    let store = use_store(providers)?;
    let base = namespace_of(namespace);
    let mut bound = Bound::new();

    for (key, project) in projections {
        let key = key.into();
        let binding = StateBinding {
            store: store.clone(),
            source: Source::Project {
                slice: base.segments().to_vec(),
                project: Arc::new(project),
            },
        };
        if binding.get().is_some() {
            bound.insert(key, binding);
        } else {
            unbound(&store, BindingKind::State, base.qualify(&key));
        }
    }
    Ok(bound)
}

/// Bind getters.
pub fn map_getters(
    providers: &Providers,
    namespace: Option<&str>,
    mapping: Mapping,
) -> BindingResult<Bound<GetterBinding>> {
    bind_named(providers, namespace, mapping, HandlerKind::Getter, |store, name| {
        store.has_getter(&name).then(|| GetterBinding {
            store: store.clone(),
            name,
        })
    })
}

/// Bind mutations; calling a binding commits.
pub fn map_mutations(
    providers: &Providers,
    namespace: Option<&str>,
    mapping: Mapping,
) -> BindingResult<Bound<MutationBinding>> {
    bind_named(providers, namespace, mapping, HandlerKind::Mutation, |store, name| {
        store.has_mutation(&name).then(|| MutationBinding {
            store: store.clone(),
            name,
        })
    })
}

/// Bind actions; calling a binding dispatches.
///
/// ```
/// use modux_bindings::{map_actions, Mapping};
/// use modux_store::{Module, Providers, Store, Value};
/// use serde_json::json;
///
/// # futures::executor::block_on(async {
/// let store = Store::new(
///     Module::new()
///         .state(json!({"n": 0}))
///         .mutation("set", |state, n| { state.insert("n".into(), n); })
///         .action("set_later", |ctx, n| async move {
///             ctx.commit("set", n)?;
///             Ok(Value::Null)
///         }),
/// )
/// .unwrap();
/// let mut providers = Providers::new();
/// store.install(&mut providers);
///
/// let actions = map_actions(&providers, None, Mapping::names(["set_later"])).unwrap();
/// actions.get("set_later").unwrap().call(4).await.unwrap();
/// assert_eq!(store.get_state()["n"], 4);
/// # });
/// ```
pub fn map_actions(
    providers: &Providers,
    namespace: Option<&str>,
    mapping: Mapping,
) -> BindingResult<Bound<ActionBinding>> {
    bind_named(providers, namespace, mapping, HandlerKind::Action, |store, name| {
        store.has_action(&name).then(|| ActionBinding {
            store: store.clone(),
            name,
        })
    })
}

fn bind_named<T>(
    providers: &Providers,
    namespace: Option<&str>,
    mapping: Mapping,
    kind: HandlerKind,
    resolve: impl Fn(&Store, String) -> Option<T>,
) -> BindingResult<Bound<T>> {
    let store = use_store(providers)?;
    let base = namespace_of(namespace);
    let mut bound = Bound::new();

    for (key, name) in mapping.pairs() {
        let qualified = base.qualify(&name);
        match resolve(&store, qualified.clone()) {
            Some(binding) => bound.insert(key, binding),
            None => unbound(&store, BindingKind::Handler(kind), qualified),
        }
    }
    tracing::debug!(%kind, namespace = %base, bound = bound.len(), "handlers bound");
    Ok(bound)
}
