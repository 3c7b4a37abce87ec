//! Binding helpers over a modux store.
//!
//! The host builds a store, installs it into a [`Providers`] registry and
//! passes that registry to the code that needs it. Helpers here look the
//! store up from the registry and bind names to live readers and callables:
//!
//! - [`map_state`] / [`map_state_with`]: state values and computed projections
//! - [`map_getters`]: getters
//! - [`map_mutations`] / [`map_actions`]: callables that commit or dispatch
//!
//! ```
//! use modux_bindings::{map_getters, map_mutations, Mapping};
//! use modux_store::{Module, Providers, Store};
//! use serde_json::json;
//!
//! let store = Store::new(
//!     Module::new()
//!         .state(json!({"test": 1}))
//!         .getter("foo", |state, _, _, _| json!(state.get_as::<i64>("test").unwrap_or(0) + 1))
//!         .mutation("change", |state, n| { state.insert("test".into(), n); }),
//! )
//! .unwrap();
//! let mut providers = Providers::new();
//! store.install(&mut providers);
//!
//! let getters = map_getters(&providers, None, Mapping::names(["foo"])).unwrap();
//! let mutations = map_mutations(&providers, None, Mapping::aliased([("set", "change")])).unwrap();
//!
//! mutations.get("set").unwrap().call(2).unwrap();
//! assert_eq!(getters.get("foo").unwrap().get(), Some(json!(3)));
//! ```

mod bind;
mod error;
mod mapping;

pub use bind::{
    map_actions, map_getters, map_mutations, map_state, map_state_with, ActionBinding,
    GetterBinding, MutationBinding, StateBinding,
};
pub use error::{BindingError, BindingResult};
pub use mapping::{Bound, Mapping};

use modux_store::{Providers, Store, STORE_KEY};

/// The store installed in `providers`.
pub fn use_store(providers: &Providers) -> BindingResult<Store> {
    providers
        .inject::<Store>(STORE_KEY)
        .ok_or(BindingError::StoreNotInstalled)
}
