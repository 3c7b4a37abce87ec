//! Non-fatal diagnostics.
//!
//! Warnings are logged through `tracing` and kept in a log on the store so
//! callers can inspect them. Lookup misses are only reported in development
//! mode; duplicate registrations and getter cycles are always reported.

use crate::HandlerKind;
use std::collections::VecDeque;
use std::fmt;

/// A non-fatal diagnostic raised by the store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Warning {
    /// A getter name was registered twice; the later registration won.
    DuplicateGetter { name: String },
    /// A mutation name was registered twice; the later registration won.
    DuplicateMutation { name: String },
    /// An action name was registered twice; the later registration won.
    DuplicateAction { name: String },
    /// `commit` was called with an unregistered type.
    UnknownMutation { name: String },
    /// `dispatch` was called with an unregistered type.
    UnknownAction { name: String },
    /// A getter read itself while being evaluated.
    GetterCycle { name: String },
    /// A binding helper asked for a name absent from the store.
    Unbound { kind: BindingKind, name: String },
}

/// The tables a binding helper can read from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BindingKind {
    State,
    Handler(HandlerKind),
}

impl fmt::Display for BindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindingKind::State => f.write_str("state"),
            BindingKind::Handler(kind) => write!(f, "{kind}"),
        }
    }
}

impl Warning {
    /// Lookup misses are advisory and silenced in production mode.
    pub fn is_lookup_miss(&self) -> bool {
        matches!(
            self,
            Warning::UnknownMutation { .. } | Warning::UnknownAction { .. } | Warning::Unbound { .. }
        )
    }

    /// Name the warning is about.
    pub fn name(&self) -> &str {
        match self {
            Warning::DuplicateGetter { name }
            | Warning::DuplicateMutation { name }
            | Warning::DuplicateAction { name }
            | Warning::UnknownMutation { name }
            | Warning::UnknownAction { name }
            | Warning::GetterCycle { name }
            | Warning::Unbound { name, .. } => name,
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::DuplicateGetter { name } => write!(f, "has multiple {name} getters"),
            Warning::DuplicateMutation { name } => write!(f, "has multiple {name} mutations"),
            Warning::DuplicateAction { name } => write!(f, "has multiple {name} actions"),
            Warning::UnknownMutation { name } => write!(f, "mutation {name} is not found"),
            Warning::UnknownAction { name } => write!(f, "action {name} is not found"),
            Warning::GetterCycle { name } => write!(f, "getter {name} depends on itself"),
            Warning::Unbound { kind, name } => write!(f, "{kind} {name} is not found"),
        }
    }
}

/// Maximum number of warnings kept between two `take_new` calls.
pub(crate) const MAX_PENDING: usize = 256;

/// Pending warnings, oldest first.
///
/// `take_new()` drains and returns everything recorded since the previous
/// call. When more than [`MAX_PENDING`] warnings pile up without being
/// taken, the oldest are dropped; every warning is still logged when pushed.
#[derive(Debug, Default)]
pub(crate) struct WarningLog {
    items: VecDeque<Warning>,
}

impl WarningLog {
    pub(crate) fn push(&mut self, warning: Warning) {
        tracing::warn!(name = %warning.name(), "{warning}");
        if self.items.len() == MAX_PENDING {
            self.items.pop_front();
        }
        self.items.push_back(warning);
    }

    pub(crate) fn all(&self) -> Vec<Warning> {
        self.items.iter().cloned().collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    pub(crate) fn take_new(&mut self) -> Vec<Warning> {
        self.items.drain(..).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_new_drains() {
        let mut log = WarningLog::default();
        log.push(Warning::UnknownAction { name: "a".into() });
        log.push(Warning::UnknownAction { name: "b".into() });

        assert_eq!(log.take_new().len(), 2);
        assert!(log.take_new().is_empty());
        assert_eq!(log.len(), 0);

        log.push(Warning::GetterCycle { name: "c".into() });
        assert_eq!(log.all(), [Warning::GetterCycle { name: "c".into() }]);
        assert_eq!(log.take_new(), vec![Warning::GetterCycle { name: "c".into() }]);
        assert!(log.all().is_empty());
    }

    #[test]
    fn test_pending_warnings_are_bounded() {
        let mut log = WarningLog::default();
        for i in 0..MAX_PENDING + 10 {
            log.push(Warning::UnknownMutation { name: format!("m{i}") });
        }

        assert_eq!(log.len(), MAX_PENDING);
        // The oldest entries were dropped.
        assert_eq!(log.all()[0].name(), "m10");
    }

    #[test]
    fn test_display_matches_log_text() {
        let w = Warning::DuplicateGetter { name: "b".into() };
        assert_eq!(w.to_string(), "has multiple b getters");
        let w = Warning::Unbound {
            kind: BindingKind::Handler(HandlerKind::Mutation),
            name: "inner/change".into(),
        };
        assert_eq!(w.to_string(), "mutation inner/change is not found");
    }

    #[test]
    fn test_lookup_miss_classification() {
        assert!(Warning::UnknownMutation { name: "x".into() }.is_lookup_miss());
        assert!(!Warning::DuplicateAction { name: "x".into() }.is_lookup_miss());
    }
}
