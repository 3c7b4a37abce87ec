//! Store configuration.
//!
//! Options come from code, from a TOML table, or from the environment:
//!
//! | Variable             | Values                              |
//! |----------------------|-------------------------------------|
//! | `MODUX_MODE`         | `development` / `dev`, `production` / `prod` |
//! | `MODUX_STRICT_STATE` | `1`, `true`, `yes`, `on` (anything else is false) |

use crate::{StoreError, StoreResult};
use serde::{Deserialize, Serialize};

/// Environment variable selecting the [`Mode`].
pub const MODE_ENV: &str = "MODUX_MODE";
/// Environment variable enabling strict state merging.
pub const STRICT_STATE_ENV: &str = "MODUX_STRICT_STATE";

/// Whether lookup-miss warnings are reported.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Development,
    Production,
}

impl Default for Mode {
    /// Development in debug builds, production in release builds.
    fn default() -> Self {
        if cfg!(debug_assertions) {
            Mode::Development
        } else {
            Mode::Production
        }
    }
}

impl std::str::FromStr for Mode {
    type Err = StoreError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Mode::Development),
            "production" | "prod" => Ok(Mode::Production),
            other => Err(StoreError::config(format!("unknown mode {other:?}"))),
        }
    }
}

/// Options applied when a store is built.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreOptions {
    /// Development or production reporting.
    pub mode: Mode,
    /// Fail construction when two modules write the same state key at one
    /// level, instead of letting the later one overwrite.
    pub strict_state: bool,
}

impl StoreOptions {
    /// Options for the current build profile.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the reporting mode.
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Enable or disable strict state merging.
    pub fn with_strict_state(mut self, strict: bool) -> Self {
        self.strict_state = strict;
        self
    }

    /// Whether lookup misses are reported.
    pub fn is_development(&self) -> bool {
        self.mode == Mode::Development
    }

    /// Defaults overridden by `MODUX_MODE` and `MODUX_STRICT_STATE`.
    pub fn from_env() -> StoreResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Parse options from a TOML table.
    ///
    /// ```
    /// use modux_store::{Mode, StoreOptions};
    ///
    /// let options = StoreOptions::from_toml_str("mode = \"production\"\nstrict_state = true").unwrap();
    /// assert_eq!(options.mode, Mode::Production);
    /// assert!(options.strict_state);
    /// ```
    pub fn from_toml_str(raw: &str) -> StoreResult<Self> {
        toml::from_str(raw).map_err(|e| StoreError::config(e.to_string()))
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> StoreResult<Self> {
        let mut options = Self::default();
        if let Some(raw) = lookup(MODE_ENV) {
            options.mode = raw.parse()?;
        }
        if let Some(raw) = lookup(STRICT_STATE_ENV) {
            options.strict_state = parse_flag(&raw);
        }
        Ok(options)
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_env() {
        let options = StoreOptions::from_lookup(lookup(&[])).unwrap();
        assert_eq!(options, StoreOptions::default());
        assert!(!options.strict_state);
    }

    #[test]
    fn test_env_overrides() {
        let options = StoreOptions::from_lookup(lookup(&[
            (MODE_ENV, "prod"),
            (STRICT_STATE_ENV, "yes"),
        ]))
        .unwrap();
        assert_eq!(options.mode, Mode::Production);
        assert!(options.strict_state);
    }

    #[test]
    fn test_env_rejects_unknown_mode() {
        let err = StoreOptions::from_lookup(lookup(&[(MODE_ENV, "staging")])).unwrap_err();
        assert!(matches!(err, StoreError::Config { .. }));
    }

    #[test]
    fn test_toml_partial_table_uses_defaults() {
        let options = StoreOptions::from_toml_str("strict_state = true").unwrap();
        assert!(options.strict_state);
        assert_eq!(options.mode, Mode::default());
    }

    #[test]
    fn test_toml_invalid_mode() {
        assert!(StoreOptions::from_toml_str("mode = \"loud\"").is_err());
    }
}
