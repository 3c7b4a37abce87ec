//! Module tree walker.
//!
//! Flattens a declaration tree into the store's tables. The walk is
//! depth-first pre-order; each module is processed in the fixed order
//! state, getters, mutations, actions, children, so a module's state record
//! exists before anything bound to it is registered.

use crate::getter::GetterCell;
use crate::module::{ActionFn, Entry, Module, MutationFn};
use crate::tree::StateTree;
use crate::warning::{Warning, WarningLog};
use crate::{value_type_name, HandlerKind, Namespace, StoreError, StoreOptions, StoreResult};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// A mutation bound to its module's namespace.
#[derive(Clone)]
pub(crate) struct BoundMutation {
    pub(crate) namespace: Namespace,
    pub(crate) handler: MutationFn,
}

/// An action bound to its module's namespace.
#[derive(Clone)]
pub(crate) struct BoundAction {
    pub(crate) namespace: Namespace,
    pub(crate) handler: ActionFn,
}

/// Resolution tables produced by a walk.
#[derive(Default)]
pub(crate) struct Tables {
    pub(crate) getters: HashMap<String, Arc<GetterCell>>,
    pub(crate) root_getters: HashMap<String, Arc<GetterCell>>,
    pub(crate) getter_order: Vec<String>,
    pub(crate) mutations: HashMap<String, BoundMutation>,
    pub(crate) actions: HashMap<String, BoundAction>,
}

pub(crate) struct Walker<'a> {
    options: &'a StoreOptions,
    tree: StateTree,
    tables: Tables,
    warnings: WarningLog,
}

impl<'a> Walker<'a> {
    pub(crate) fn new(options: &'a StoreOptions) -> Self {
        Self {
            options,
            tree: StateTree::default(),
            tables: Tables::default(),
            warnings: WarningLog::default(),
        }
    }

    /// Walk the whole tree starting at the root namespace.
    pub(crate) fn run(mut self, root: Module) -> StoreResult<(StateTree, Tables, WarningLog)> {
        self.walk(root, Namespace::root(), false)?;
        Ok((self.tree, self.tables, self.warnings))
    }

    fn walk(&mut self, module: Module, namespace: Namespace, claims_namespace: bool) -> StoreResult<()> {
        let Module {
            state,
            getters,
            mutations,
            actions,
            modules,
            ..
        } = module;

        self.register_state(state, &namespace, claims_namespace)?;
        for (name, entry) in getters {
            self.register_getter(&namespace, &name, entry)?;
        }
        for (name, entry) in mutations {
            self.register_mutation(&namespace, &name, entry)?;
        }
        for (name, entry) in actions {
            self.register_action(&namespace, &name, entry)?;
        }
        for (key, child) in modules {
            if child.namespaced {
                let child_ns = namespace.with_segment(key);
                self.walk(child, child_ns, true)?;
            } else {
                self.walk(child, namespace.clone(), false)?;
            }
        }
        Ok(())
    }

    /// Merge a module's initial state into the record at `namespace`.
    ///
    /// A namespaced module gets its own record even without declared state.
    /// Un-namespaced modules merge into the nearest namespaced (or root)
    /// record; in that merge a repeated key overwrites the earlier value
    /// unless strict mode is on.
    fn register_state(
        &mut self,
        state: Option<Value>,
        namespace: &Namespace,
        claims_namespace: bool,
    ) -> StoreResult<()> {
        let fields = match state {
            None | Some(Value::Null) => Default::default(),
            Some(Value::Object(fields)) => fields,
            Some(other) => {
                return Err(StoreError::invalid_state(
                    namespace.clone(),
                    value_type_name(&other),
                ))
            }
        };

        let strict = self.options.strict_state;
        if strict && claims_namespace {
            if let Some((key, parent)) = namespace.segments().split_last() {
                let parent = Namespace::from_segments(parent.to_vec());
                let taken = self.tree.with_record(&parent, |record| record.contains_key(key));
                if taken {
                    return Err(StoreError::key_collision(parent, key.clone()));
                }
            }
        }

        self.tree.with_record(namespace, |record| {
            for (key, value) in fields {
                if record.contains_key(&key) {
                    if strict {
                        return Err(StoreError::key_collision(namespace.clone(), key));
                    }
                    tracing::debug!(namespace = %namespace, key = %key, "state key overwritten");
                }
                record.insert(key, value);
            }
            Ok(())
        })
    }

    fn register_getter(
        &mut self,
        namespace: &Namespace,
        local: &str,
        entry: Entry<crate::module::GetterFn>,
    ) -> StoreResult<()> {
        let name = namespace.qualify(local);
        let handler = match entry {
            Entry::Handler(handler) => handler,
            Entry::Raw(value) => {
                return Err(StoreError::invalid_handler(
                    HandlerKind::Getter,
                    name,
                    value_type_name(&value),
                ))
            }
        };

        let cell = Arc::new(GetterCell::new(name.clone(), namespace.clone(), handler));
        if self.tables.getters.insert(name.clone(), cell.clone()).is_some() {
            self.warnings.push(Warning::DuplicateGetter { name: name.clone() });
            self.tables.getter_order.retain(|existing| *existing != name);
        }
        if namespace.is_root() {
            self.tables.root_getters.insert(name.clone(), cell);
        }
        self.tables.getter_order.push(name);
        Ok(())
    }

    fn register_mutation(
        &mut self,
        namespace: &Namespace,
        local: &str,
        entry: Entry<MutationFn>,
    ) -> StoreResult<()> {
        let name = namespace.qualify(local);
        let handler = match entry {
            Entry::Handler(handler) => handler,
            Entry::Raw(value) => {
                return Err(StoreError::invalid_handler(
                    HandlerKind::Mutation,
                    name,
                    value_type_name(&value),
                ))
            }
        };

        let bound = BoundMutation {
            namespace: namespace.clone(),
            handler,
        };
        if self.tables.mutations.insert(name.clone(), bound).is_some() {
            self.warnings.push(Warning::DuplicateMutation { name });
        }
        Ok(())
    }

    fn register_action(
        &mut self,
        namespace: &Namespace,
        local: &str,
        entry: Entry<ActionFn>,
    ) -> StoreResult<()> {
        let name = namespace.qualify(local);
        let handler = match entry {
            Entry::Handler(handler) => handler,
            Entry::Raw(value) => {
                return Err(StoreError::invalid_handler(
                    HandlerKind::Action,
                    name,
                    value_type_name(&value),
                ))
            }
        };

        let bound = BoundAction {
            namespace: namespace.clone(),
            handler,
        };
        if self.tables.actions.insert(name.clone(), bound).is_some() {
            self.warnings.push(Warning::DuplicateAction { name });
        }
        Ok(())
    }
}
