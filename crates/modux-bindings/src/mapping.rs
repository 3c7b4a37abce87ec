//! Name mappings and the bound tables they produce.

use std::fmt;

/// Which store names a helper binds, and under which keys.
///
/// ```
/// use modux_bindings::Mapping;
///
/// let plain = Mapping::names(["count", "total"]);
/// let aliased = Mapping::aliased([("how_many", "count")]);
/// assert_eq!(plain.pairs()[0], ("count".to_string(), "count".to_string()));
/// assert_eq!(aliased.pairs()[0].0, "how_many");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Mapping {
    /// Bind each name under itself.
    Names(Vec<String>),
    /// Bind `(alias, name)` pairs.
    Aliased(Vec<(String, String)>),
}

impl Mapping {
    pub fn names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Mapping::Names(names.into_iter().map(Into::into).collect())
    }

    pub fn aliased<I, A, N>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (A, N)>,
        A: Into<String>,
        N: Into<String>,
    {
        Mapping::Aliased(
            pairs
                .into_iter()
                .map(|(alias, name)| (alias.into(), name.into()))
                .collect(),
        )
    }

    /// `(key, name)` pairs in declaration order.
    pub fn pairs(&self) -> Vec<(String, String)> {
        match self {
            Mapping::Names(names) => names.iter().map(|n| (n.clone(), n.clone())).collect(),
            Mapping::Aliased(pairs) => pairs.clone(),
        }
    }
}

/// Bindings keyed by the mapping's keys, in declaration order.
///
/// Keys whose name did not resolve are absent.
#[derive(Clone)]
pub struct Bound<T> {
    entries: Vec<(String, T)>,
}

impl<T> Bound<T> {
    pub(crate) fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub(crate) fn insert(&mut self, key: String, value: T) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&T> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T> fmt::Debug for Bound<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.keys()).finish()
    }
}
