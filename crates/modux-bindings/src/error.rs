//! Error types for modux-bindings.

use modux_store::StoreError;
use thiserror::Error;

/// Result type alias for binding operations.
pub type BindingResult<T> = Result<T, BindingError>;

/// Errors raised by binding helpers.
#[derive(Debug, Error)]
pub enum BindingError {
    /// No store was installed in the providers passed to a helper.
    #[error("no store installed: build a store and call Store::install before using bindings")]
    StoreNotInstalled,

    /// A store operation issued through a binding failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}
