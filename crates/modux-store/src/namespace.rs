//! Namespace paths and slash-path resolution over the state tree.
//!
//! A namespace is the ordered list of segments contributed by a module's
//! namespaced ancestors (outermost first). It prefixes every getter, mutation
//! and action name registered by the module, and it locates the module's
//! record inside the state tree.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Separator between namespace segments in qualified names.
pub const SEPARATOR: char = '/';

/// An ordered list of namespace segments.
///
/// # Examples
///
/// ```
/// use modux_store::Namespace;
///
/// let ns = Namespace::root().child("cart").child("items");
/// assert_eq!(ns.qualify("add"), "cart/items/add");
/// assert_eq!(Namespace::root().qualify("add"), "add");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Namespace(Vec<String>);

impl Namespace {
    /// Create the root namespace (no segments).
    #[inline]
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Create a namespace from a list of segments.
    #[inline]
    pub fn from_segments(segments: Vec<String>) -> Self {
        Self(segments)
    }

    /// Parse a slash-separated namespace (`"a/b"`). Empty segments are skipped.
    pub fn parse(raw: &str) -> Self {
        Self(
            raw.split(SEPARATOR)
                .filter(|seg| !seg.is_empty())
                .map(str::to_owned)
                .collect(),
        )
    }

    /// Append a segment and return self (builder pattern).
    #[inline]
    pub fn child(mut self, segment: impl Into<String>) -> Self {
        self.0.push(segment.into());
        self
    }

    /// Append a segment and return a new namespace (non-mutating).
    #[inline]
    pub fn with_segment(&self, segment: impl Into<String>) -> Self {
        self.clone().child(segment)
    }

    /// Push a segment onto the namespace (mutating).
    #[inline]
    pub fn push(&mut self, segment: impl Into<String>) {
        self.0.push(segment.into());
    }

    /// Join this namespace with another one.
    pub fn join(&self, other: &Namespace) -> Namespace {
        let mut result = self.clone();
        result.0.extend(other.0.iter().cloned());
        result
    }

    /// Get the segments of this namespace.
    #[inline]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Whether this is the root namespace.
    #[inline]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of segments.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no segments.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Fully-qualified name of `local` inside this namespace.
    ///
    /// Root scope keeps the bare name; otherwise the segments are joined with
    /// `/` and followed by `/local`.
    pub fn qualify(&self, local: &str) -> String {
        if self.0.is_empty() {
            return local.to_owned();
        }
        let mut name = self.0.join("/");
        name.push(SEPARATOR);
        name.push_str(local);
        name
    }

    /// Iterate over the segments.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            write!(f, "<root>")
        } else {
            write!(f, "{}", self.0.join("/"))
        }
    }
}

impl From<&str> for Namespace {
    fn from(raw: &str) -> Self {
        Namespace::parse(raw)
    }
}

impl FromIterator<String> for Namespace {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Namespace(iter.into_iter().collect())
    }
}

/// Split a qualified name into its namespace and local name.
///
/// ```
/// use modux_store::namespace::split_qualified;
///
/// let (ns, local) = split_qualified("cart/items/add");
/// assert_eq!(ns.segments(), ["cart", "items"]);
/// assert_eq!(local, "add");
/// ```
pub fn split_qualified(name: &str) -> (Namespace, &str) {
    match name.rfind(SEPARATOR) {
        Some(idx) => (Namespace::parse(&name[..idx]), &name[idx + 1..]),
        None => (Namespace::root(), name),
    }
}

/// Resolve a value inside `container` by walking `segments` through nested
/// records.
///
/// - No segments: the container itself.
/// - A missing or non-record intermediate segment walks on through an empty
///   record instead of failing, so the lookup degrades to `None`.
/// - The final segment is read as-is; `None` when absent.
pub fn get_namespaced_value<'a, S: AsRef<str>>(
    container: &'a Value,
    segments: &[S],
) -> Option<&'a Value> {
    let Some((last, parents)) = segments.split_last() else {
        return Some(container);
    };
    let mut current = container;
    for seg in parents {
        match current.get(seg.as_ref()) {
            Some(next) if next.is_object() => current = next,
            _ => return None,
        }
    }
    current.get(last.as_ref())
}

/// Mutable counterpart of [`get_namespaced_value`].
pub fn get_namespaced_value_mut<'a, S: AsRef<str>>(
    container: &'a mut Value,
    segments: &[S],
) -> Option<&'a mut Value> {
    match segments {
        [] => Some(container),
        [seg, rest @ ..] => {
            let obj = container.as_object_mut()?;
            let child = obj.get_mut(seg.as_ref())?;
            get_namespaced_value_mut(child, rest)
        }
    }
}

/// Walk `segments`, creating empty records for missing or non-record levels,
/// and return the record at the end of the walk.
pub(crate) fn ensure_record<'a>(
    container: &'a mut Value,
    segments: &[String],
) -> &'a mut Map<String, Value> {
    if !container.is_object() {
        *container = Value::Object(Map::new());
    }
    let obj = container
        .as_object_mut()
        .expect("level was normalized to a record above");
    match segments {
        [] => obj,
        [seg, rest @ ..] => {
            let entry = obj
                .entry(seg.clone())
                .or_insert_with(|| Value::Object(Map::new()));
            ensure_record(entry, rest)
        }
    }
}

/// Construct a [`Namespace`] from a sequence of segments.
///
/// ```
/// use modux_store::namespace;
///
/// let ns = namespace!("cart", "items");
/// assert_eq!(ns.to_string(), "cart/items");
/// ```
#[macro_export]
macro_rules! namespace {
    () => {
        $crate::Namespace::root()
    };
    ($($seg:expr),+ $(,)?) => {{
        let mut ns = $crate::Namespace::root();
        $(
            ns.push($seg);
        )+
        ns
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_qualify() {
        assert_eq!(Namespace::root().qualify("foo"), "foo");
        assert_eq!(namespace!("inner").qualify("foo"), "inner/foo");
        assert_eq!(namespace!("a", "b").qualify("foo"), "a/b/foo");
    }

    #[test]
    fn test_parse_skips_empty_segments() {
        assert_eq!(Namespace::parse("").segments(), Vec::<String>::new().as_slice());
        assert_eq!(Namespace::parse("/a//b/").segments(), ["a", "b"]);
    }

    #[test]
    fn test_display() {
        assert_eq!(Namespace::root().to_string(), "<root>");
        assert_eq!(namespace!("a", "b").to_string(), "a/b");
    }

    #[test]
    fn test_split_qualified_bare_name() {
        let (ns, local) = split_qualified("change");
        assert!(ns.is_root());
        assert_eq!(local, "change");
    }

    #[test]
    fn test_resolve_empty_path_returns_container() {
        let doc = json!({"a": 1});
        assert_eq!(get_namespaced_value::<&str>(&doc, &[]), Some(&doc));
    }

    #[test]
    fn test_resolve_nested() {
        let doc = json!({"a": {"b": {"c": 3}}});
        assert_eq!(get_namespaced_value(&doc, &["a", "b"]), Some(&json!({"c": 3})));
        assert_eq!(get_namespaced_value(&doc, &["a", "b", "c"]), Some(&json!(3)));
    }

    #[test]
    fn test_resolve_missing_intermediate_degrades() {
        let doc = json!({"a": {"b": 1}});
        assert_eq!(get_namespaced_value(&doc, &["x", "b"]), None);
        // Walking through a scalar behaves like walking through an empty record.
        assert_eq!(get_namespaced_value(&doc, &["a", "b", "c"]), None);
    }

    #[test]
    fn test_resolve_missing_leaf() {
        let doc = json!({"a": {"b": 1}});
        assert_eq!(get_namespaced_value(&doc, &["a", "missing"]), None);
    }

    #[test]
    fn test_ensure_record_creates_levels() {
        let mut doc = json!({"a": 5});
        ensure_record(&mut doc, &["a".to_owned(), "b".to_owned()]).insert("x".into(), json!(1));
        assert_eq!(doc, json!({"a": {"b": {"x": 1}}}));
    }

    #[test]
    fn test_namespace_serde() {
        let ns = namespace!("cart", "items");
        let raw = serde_json::to_string(&ns).unwrap();
        assert_eq!(raw, r#"["cart","items"]"#);
        let parsed: Namespace = serde_json::from_str(&raw).unwrap();
        assert_eq!(ns, parsed);
    }
}
