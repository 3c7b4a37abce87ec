mod shop;

use clap::Parser;
use modux_bindings::{map_actions, map_getters, Mapping};
use modux_store::{Mode, Providers, Store, StoreOptions};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
struct Args {
    /// TOML file with store options; environment variables are used when absent.
    #[arg(long, env = "MODUX_CONFIG")]
    config: Option<PathBuf>,

    #[arg(long, env = "MODUX_MODE")]
    mode: Option<Mode>,

    /// Fail on state key collisions between modules.
    #[arg(long, env = "MODUX_STRICT_STATE")]
    strict_state: bool,

    #[arg(long, env = "MODUX_DEMO_ROUNDS", default_value_t = 3)]
    rounds: usize,

    #[arg(long, env = "MODUX_DEMO_DELAY_MS", default_value_t = 200)]
    delay_ms: u64,
}

impl Args {
    fn store_options(&self) -> modux_store::StoreResult<StoreOptions> {
        let mut options = match &self.config {
            Some(path) => {
                let raw = std::fs::read_to_string(path).map_err(|e| {
                    modux_store::StoreError::config(format!("{}: {e}", path.display()))
                })?;
                StoreOptions::from_toml_str(&raw)?
            }
            None => StoreOptions::from_env()?,
        };
        if let Some(mode) = self.mode {
            options.mode = mode;
        }
        options.strict_state |= self.strict_state;
        Ok(options)
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let args = Args::parse();

    let options = args.store_options().expect("invalid store options");
    let store = Store::with_options(shop::root(Duration::from_millis(args.delay_ms)), options)
        .expect("failed to build store");

    store.subscribe(|event, state| {
        tracing::info!(
            mutation = %event.name,
            products = state["shop"]["products"].as_array().map_or(0, Vec::len),
            "committed"
        );
    });
    store.subscribe_action(|event, _| {
        tracing::info!(action = %event.name, "dispatched");
    });

    let mut providers = Providers::new();
    store.install(&mut providers);

    let getters = map_getters(&providers, Some("shop"), Mapping::names(["count"]))
        .expect("store is installed");
    let actions = map_actions(
        &providers,
        Some("shop"),
        Mapping::aliased([("add", "delay_add_products")]),
    )
    .expect("store is installed");

    let (Some(count), Some(add)) = (getters.get("count"), actions.get("add")) else {
        tracing::error!("shop module is missing its count getter or add action");
        return;
    };

    tracing::info!(count = ?count.get(), "starting");
    for round in 1..=args.rounds {
        add.call(()).await.expect("action failed");
        tracing::info!(round, count = ?count.get(), "product added");
    }

    match serde_json::to_string_pretty(&store.get_state()) {
        Ok(state) => println!("{state}"),
        Err(e) => tracing::error!(error = %e, "failed to render state"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_args_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_strict_state_flag_and_env() {
        let on = Args::try_parse_from(["demo", "--strict-state"]).unwrap();
        assert!(on.strict_state);
        let off = Args::try_parse_from(["demo"]).unwrap();
        assert!(!off.strict_state || std::env::var_os("MODUX_STRICT_STATE").is_some());

        let arg = Args::command()
            .get_arguments()
            .find(|arg| arg.get_id() == "strict_state")
            .cloned()
            .unwrap();
        assert_eq!(arg.get_env(), Some(std::ffi::OsStr::new("MODUX_STRICT_STATE")));
    }
}
