//! Integration tests for the binding helpers.

use modux_bindings::{
    map_actions, map_getters, map_mutations, map_state, map_state_with, use_store, BindingError,
    Mapping,
};
use modux_store::{
    BindingKind, GetterView, HandlerKind, Mode, Module, Providers, StateView, Store, StoreOptions,
    Value, Warning,
};
use serde_json::json;
use std::time::Duration;

// ============================================================================
// Fixtures
// ============================================================================

fn foo(state: &StateView<'_>, _: &GetterView<'_>, _: &Value, _: &GetterView<'_>) -> Value {
    json!(state.get_as::<i64>("test").unwrap_or(0) + 1)
}

fn test_module() -> Module {
    Module::new()
        .state(json!({"test": 1}))
        .getter("foo", foo)
        .mutation("change", |state, num| {
            state.insert("test".into(), num);
        })
        .action("delay_change", |ctx, num| async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            ctx.commit("change", num)?;
            Ok(Value::Null)
        })
}

fn installed() -> (Store, Providers) {
    let store = Store::with_options(
        test_module()
            .module("inner", test_module().namespaced(true))
            .module("box", test_module().namespaced(true)),
        StoreOptions::new().with_mode(Mode::Development),
    )
    .unwrap();
    let mut providers = Providers::new();
    store.install(&mut providers);
    (store, providers)
}

// ============================================================================
// Store lookup
// ============================================================================

#[test]
fn test_use_store_without_install() {
    let providers = Providers::new();
    assert!(matches!(use_store(&providers), Err(BindingError::StoreNotInstalled)));
    assert!(matches!(
        map_getters(&providers, None, Mapping::names(["foo"])),
        Err(BindingError::StoreNotInstalled)
    ));
}

#[test]
fn test_use_store_returns_installed_store() {
    let (store, providers) = installed();
    let found = use_store(&providers).unwrap();
    found.commit("change", 5).unwrap();
    assert_eq!(store.get_state()["test"], 5);
}

// ============================================================================
// State
// ============================================================================

#[test]
fn test_map_state() {
    let (_, providers) = installed();

    let state1 = map_state(&providers, None, Mapping::names(["test"])).unwrap();
    let state2 = map_state(&providers, None, Mapping::aliased([("test2", "test")])).unwrap();
    let state3 = map_state(&providers, Some("inner"), Mapping::names(["test"])).unwrap();
    let state4 = map_state(&providers, Some("box"), Mapping::aliased([("test4", "test")])).unwrap();

    assert_eq!(state1.get("test").unwrap().get(), Some(json!(1)));
    assert_eq!(state2.get("test2").unwrap().get(), Some(json!(1)));
    assert_eq!(state3.get("test").unwrap().get(), Some(json!(1)));
    assert_eq!(state4.get("test4").unwrap().get(), Some(json!(1)));
}

#[test]
fn test_map_state_nested_key_and_live_reads() {
    let (store, providers) = installed();

    let state = map_state(&providers, None, Mapping::aliased([("inner_test", "inner/test")])).unwrap();
    let binding = state.get("inner_test").unwrap();
    assert_eq!(binding.get(), Some(json!(1)));

    store.commit("inner/change", 8).unwrap();
    assert_eq!(binding.get(), Some(json!(8)));
}

#[test]
fn test_map_state_with_projection() {
    let (store, providers) = installed();

    let state = map_state_with(
        &providers,
        Some("box"),
        [("doubled", |slice: &Value| json!(slice["test"].as_i64().unwrap_or(0) * 2))],
    )
    .unwrap();
    assert_eq!(state.get("doubled").unwrap().get(), Some(json!(2)));

    store.commit("box/change", 4).unwrap();
    assert_eq!(state.get("doubled").unwrap().get(), Some(json!(8)));
}

#[test]
fn test_map_state_skips_missing_keys() {
    let (store, providers) = installed();
    store.take_warnings();

    let state = map_state(&providers, Some("inner"), Mapping::names(["test", "nope"])).unwrap();
    assert_eq!(state.keys().collect::<Vec<_>>(), ["test"]);
    assert_eq!(
        store.take_warnings(),
        [Warning::Unbound {
            kind: BindingKind::State,
            name: "inner/nope".into()
        }]
    );
}

// ============================================================================
// Getters
// ============================================================================

#[test]
fn test_map_getters() {
    let (_, providers) = installed();

    let getters1 = map_getters(&providers, None, Mapping::names(["foo"])).unwrap();
    let getters2 = map_getters(&providers, None, Mapping::aliased([("foo2", "foo")])).unwrap();
    let getters3 = map_getters(&providers, Some("inner"), Mapping::names(["foo"])).unwrap();
    let getters4 = map_getters(&providers, Some("box"), Mapping::aliased([("foo4", "foo")])).unwrap();

    assert_eq!(getters1.get("foo").unwrap().get(), Some(json!(2)));
    assert_eq!(getters2.get("foo2").unwrap().get(), Some(json!(2)));
    assert_eq!(getters3.get("foo").unwrap().name(), "inner/foo");
    assert_eq!(getters3.get("foo").unwrap().get(), Some(json!(2)));
    assert_eq!(getters4.get("foo4").unwrap().get(), Some(json!(2)));
}

#[test]
fn test_map_getters_skips_unknown_with_warning() {
    let (store, providers) = installed();

    let getters = map_getters(&providers, Some("inner"), Mapping::names(["bar"])).unwrap();
    assert!(getters.is_empty());
    assert_eq!(
        store.warnings(),
        [Warning::Unbound {
            kind: BindingKind::Handler(HandlerKind::Getter),
            name: "inner/bar".into()
        }]
    );
}

// ============================================================================
// Mutations and actions
// ============================================================================

#[test]
fn test_map_mutations() {
    let (store, providers) = installed();

    let m1 = map_mutations(&providers, None, Mapping::names(["change"])).unwrap();
    let m2 = map_mutations(&providers, None, Mapping::aliased([("change2", "change")])).unwrap();
    let m3 = map_mutations(&providers, Some("inner"), Mapping::names(["change"])).unwrap();
    let m4 = map_mutations(&providers, Some("box"), Mapping::aliased([("change4", "change")])).unwrap();

    m1.get("change").unwrap().call(2).unwrap();
    m2.get("change2").unwrap().call(2).unwrap();
    m3.get("change").unwrap().call(2).unwrap();
    m4.get("change4").unwrap().call(2).unwrap();

    let state = store.get_state();
    assert_eq!(state["test"], 2);
    assert_eq!(state["inner"]["test"], 2);
    assert_eq!(state["box"]["test"], 2);
    assert_eq!(store.getter("foo"), Some(json!(3)));
    assert_eq!(store.getter("inner/foo"), Some(json!(3)));
    assert_eq!(store.getter("box/foo"), Some(json!(3)));
}

#[tokio::test]
async fn test_map_actions() {
    let (store, providers) = installed();

    let a1 = map_actions(&providers, None, Mapping::names(["delay_change"])).unwrap();
    let a2 = map_actions(&providers, None, Mapping::aliased([("delay_change2", "delay_change")])).unwrap();
    let a3 = map_actions(&providers, Some("inner"), Mapping::names(["delay_change"])).unwrap();
    let a4 = map_actions(&providers, Some("box"), Mapping::aliased([("delay_change4", "delay_change")])).unwrap();

    a1.get("delay_change").unwrap().call(2).await.unwrap();
    a2.get("delay_change2").unwrap().call(2).await.unwrap();
    a3.get("delay_change").unwrap().call(2).await.unwrap();
    a4.get("delay_change4").unwrap().call(2).await.unwrap();

    let state = store.get_state();
    assert_eq!(state["test"], 2);
    assert_eq!(state["inner"]["test"], 2);
    assert_eq!(state["box"]["test"], 2);
    assert_eq!(store.getter("box/foo"), Some(json!(3)));
}

#[test]
fn test_production_mode_skips_silently() {
    let store = Store::with_options(test_module(), StoreOptions::new().with_mode(Mode::Production)).unwrap();
    let mut providers = Providers::new();
    store.install(&mut providers);

    let actions = map_actions(&providers, None, Mapping::names(["delay_change", "missing"])).unwrap();
    assert_eq!(actions.len(), 1);
    assert!(store.warnings().is_empty());
}
