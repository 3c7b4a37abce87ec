//! Hierarchical namespaced state store.
//!
//! `modux-store` composes a tree of module declarations into one store with
//! a single state tree, flat tables of getters, mutations and actions keyed
//! by namespace-qualified names, and ordered subscriber lists.
//!
//! # Core Concepts
//!
//! - **Module**: declaration of state, getters, mutations, actions and child modules
//! - **Namespace**: segments contributed by `namespaced` ancestors; prefixes every name
//! - **Store**: the built store; `commit` applies mutations, `dispatch` runs actions
//! - **GetterView / StateView**: tracked reads that drive getter memoization
//! - **ActionContext**: namespace-scoped handle passed to actions
//! - **Providers**: explicit registry the store installs itself into
//!
//! # Name Resolution
//!
//! ```text
//! root                       -> "name"
//! namespaced "a" > "b"       -> "a/b/name"
//! namespaced "a" > plain "b" -> "a/name"
//! ```
//!
//! # Quick Start
//!
//! ```
//! use modux_store::{Module, Store};
//! use serde_json::{json, Value};
//!
//! # futures::executor::block_on(async {
//! let cart = Module::new()
//!     .namespaced(true)
//!     .state(json!({"items": []}))
//!     .getter("count", |state, _, _, _| {
//!         json!(state.get("items").and_then(|v| v.as_array().map(Vec::len)).unwrap_or(0))
//!     })
//!     .mutation("push", |state, item| {
//!         if let Some(items) = state.get_mut("items").and_then(Value::as_array_mut) {
//!             items.push(item);
//!         }
//!     })
//!     .action("add", |ctx, item| async move {
//!         ctx.commit("push", item)?;
//!         Ok(Value::Null)
//!     });
//!
//! let store = Store::new(Module::new().module("cart", cart)).unwrap();
//! store.dispatch("cart/add", "apple").await.unwrap();
//!
//! assert_eq!(store.getter("cart/count"), Some(json!(1)));
//! assert_eq!(store.get_state()["cart"]["items"], json!(["apple"]));
//! # });
//! ```

mod context;
mod error;
mod getter;
mod module;
pub mod namespace;
mod options;
mod provide;
mod store;
mod tree;
mod view;
mod walker;
mod warning;

// Core types
pub use error::{value_type_name, ActionError, ActionResult, HandlerKind, StoreError, StoreResult};
pub use module::{ActionFn, Entry, GetterFn, HandlerRegistry, Module, MutationFn};
pub use namespace::{get_namespaced_value, split_qualified, Namespace, SEPARATOR};
pub use store::{create_store, Dispatch, Event, Store, Subscriber};

// Handler-facing types
pub use context::ActionContext;
pub use view::{GetterView, StateView};

// Configuration and diagnostics
pub use options::{Mode, StoreOptions, MODE_ENV, STRICT_STATE_ENV};
pub use provide::{ProvideKey, Providers, STORE_KEY};
pub use warning::{BindingKind, Warning};

// Re-export serde_json::Value for convenience
pub use serde_json::Value;
