//! Getter memoization: lazy evaluation, dependency revalidation and cycles.

use modux_store::{Module, Store, Warning};
use serde_json::json;

fn shop() -> Module {
    Module::new()
        .state(json!({"tax": 2}))
        .getter("tax", |state, _, _, _| state.get("tax").unwrap_or_default())
        .mutation("set_tax", |state, v| {
            state.insert("tax".into(), v);
        })
        .module(
            "cart",
            Module::new()
                .namespaced(true)
                .state(json!({"items": [3, 4], "note": ""}))
                .getter("count", |state, _, _, _| {
                    json!(state.get("items").and_then(|v| v.as_array().map(Vec::len)).unwrap_or(0))
                })
                .getter("total", |state, getters, _, root_getters| {
                    let sum: i64 = state
                        .get_as::<Vec<i64>>("items")
                        .unwrap_or_default()
                        .iter()
                        .sum();
                    let tax = root_getters.get_as::<i64>("tax").unwrap_or(0);
                    let count = getters.local("count").and_then(|v| v.as_i64()).unwrap_or(0);
                    json!(sum + tax * count)
                })
                .mutation("push", |state, item| {
                    if let Some(items) = state.get_mut("items").and_then(|v| v.as_array_mut()) {
                        items.push(item);
                    }
                })
                .mutation("note", |state, note| {
                    state.insert("note".into(), note);
                }),
        )
}

#[test]
fn test_getters_are_lazy() {
    let store = Store::new(shop()).unwrap();
    assert_eq!(store.getter_evaluations("cart/total"), Some(0));
    assert_eq!(store.getter_evaluations("missing"), None);

    assert_eq!(store.getter("cart/total"), Some(json!(11)));
    assert_eq!(store.getter_evaluations("cart/total"), Some(1));
    assert_eq!(store.getter_evaluations("cart/count"), Some(1));
}

#[test]
fn test_repeated_reads_hit_cache() {
    let store = Store::new(shop()).unwrap();
    for _ in 0..3 {
        assert_eq!(store.getter("cart/total"), Some(json!(11)));
    }
    assert_eq!(store.getter_evaluations("cart/total"), Some(1));
}

#[test]
fn test_unrelated_commit_does_not_recompute() {
    let store = Store::new(shop()).unwrap();
    store.getter("cart/total");

    store.commit("cart/note", "gift").unwrap();
    assert_eq!(store.getter("cart/total"), Some(json!(11)));
    assert_eq!(store.getter_evaluations("cart/total"), Some(1));
    assert_eq!(store.getter_evaluations("cart/count"), Some(1));
}

#[test]
fn test_dependency_change_recomputes() {
    let store = Store::new(shop()).unwrap();
    store.getter("cart/total");

    store.commit("cart/push", 5).unwrap();
    assert_eq!(store.getter("cart/count"), Some(json!(3)));
    assert_eq!(store.getter("cart/total"), Some(json!(18)));
    assert_eq!(store.getter_evaluations("cart/total"), Some(2));
}

#[test]
fn test_root_getter_dependency_change_recomputes() {
    let store = Store::new(shop()).unwrap();
    assert_eq!(store.getter("cart/total"), Some(json!(11)));

    store.commit("set_tax", 10).unwrap();
    assert_eq!(store.getter("cart/total"), Some(json!(27)));
    assert_eq!(store.getter_evaluations("cart/count"), Some(1));
}

#[test]
fn test_getter_sees_construction_root_state() {
    let store = Store::new(
        Module::new()
            .state(json!({"base": 1}))
            .mutation("set", |state, v| {
                state.insert("base".into(), v);
            })
            .module(
                "m",
                Module::new()
                    .namespaced(true)
                    .getter("initial_base", |_, _, root_state, _| root_state["base"].clone()),
            ),
    )
    .unwrap();

    store.commit("set", 5).unwrap();
    assert_eq!(store.getter("m/initial_base"), Some(json!(1)));
}

#[test]
fn test_getter_cycle_yields_none_with_warning() {
    let store = Store::new(
        Module::new()
            .getter("a", |_, getters, _, _| getters.get("b").unwrap_or_default())
            .getter("b", |_, getters, _, _| {
                json!(getters.get("a").is_none())
            }),
    )
    .unwrap();

    // `b` reads `a` while `a` is being evaluated; that read yields None.
    assert_eq!(store.getter("a"), Some(json!(true)));
    assert_eq!(store.take_warnings(), [Warning::GetterCycle { name: "a".into() }]);
}

#[test]
fn test_getter_reads_from_threads() {
    let store = Store::new(shop()).unwrap();
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let store = store.clone();
            std::thread::spawn(move || {
                store.commit("cart/push", i).unwrap();
                store.getter("cart/count")
            })
        })
        .collect();
    for handle in handles {
        assert!(handle.join().unwrap().is_some());
    }
    assert_eq!(store.getter("cart/count"), Some(json!(6)));
}
