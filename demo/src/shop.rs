use modux_store::{Module, Value};
use serde_json::json;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

static NEXT_ID: AtomicI64 = AtomicI64::new(0);

/// Namespaced `shop` module: a product list, a `count` getter, the
/// `_add_products` mutation and the delayed `delay_add_products` action.
pub fn module(delay: Duration) -> Module {
    Module::new()
        .namespaced(true)
        .state(json!({
            "products": [
                {"id": -1, "name": "123", "money": 54}
            ]
        }))
        .getter("count", |state, _, _, _| {
            json!(state
                .get("products")
                .and_then(|v| v.as_array().map(Vec::len))
                .unwrap_or(0))
        })
        .mutation("_add_products", |state, _| {
            let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
            if let Some(products) = state.get_mut("products").and_then(Value::as_array_mut) {
                products.push(json!({
                    "id": id,
                    "name": format!("product {}", id + 1),
                    "money": (id * 137 + 54) % 500,
                }));
            }
        })
        .action("delay_add_products", move |ctx, _| async move {
            tokio::time::sleep(delay).await;
            ctx.commit("_add_products", ())?;
            Ok(Value::Null)
        })
}

/// Root declaration with the shop mounted under `shop`.
pub fn root(delay: Duration) -> Module {
    Module::new().module("shop", module(delay))
}
