//! Per-request match results.
//!
//! A `Context` is created fresh for every dispatch. It records the segments
//! the trie walk went through, the values each one captured, and a name to
//! values map built from them. `vars` is a free-form side channel for
//! handlers and middleware; the router never reads it.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// One step of a successful trie walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedSegment {
    /// Literal text for raw segments, capture name otherwise (may be empty).
    pub name: String,
    /// Kind of the segment, as displayed by `SegmentKind`.
    pub kind: &'static str,
    /// Values captured from the request path.
    pub values: Vec<String>,
}

#[derive(Debug, Default, Clone)]
pub struct Context {
    matched: Vec<MatchedSegment>,
    params: HashMap<String, Vec<String>>,
    vars: HashMap<String, String>,
    file_root: Option<PathBuf>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a context from a matched path, root first.
    ///
    /// Every segment with a non-empty name contributes its values; a later
    /// segment with the same name replaces the earlier values.
    pub(crate) fn from_matched(matched: Vec<MatchedSegment>) -> Self {
        let mut params = HashMap::new();
        for segment in &matched {
            if !segment.name.is_empty() {
                params.insert(segment.name.clone(), segment.values.clone());
            }
        }
        Self {
            matched,
            params,
            ..Self::default()
        }
    }

    /// First value captured under `name`.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params(name).first().map(String::as_str)
    }

    /// All values captured under `name`, in capture order.
    pub fn params(&self, name: &str) -> &[String] {
        self.params.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn all_params(&self) -> &HashMap<String, Vec<String>> {
        &self.params
    }

    pub fn matched(&self) -> &[MatchedSegment] {
        &self.matched
    }

    pub fn var(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn set_var(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), value.into());
    }

    pub fn vars(&self) -> &HashMap<String, String> {
        &self.vars
    }

    pub fn vars_mut(&mut self) -> &mut HashMap<String, String> {
        &mut self.vars
    }

    /// Root directory of the static-file route that matched, if any.
    pub fn file_root(&self) -> Option<&Path> {
        self.file_root.as_deref()
    }

    pub(crate) fn set_file_root(&mut self, root: PathBuf) {
        self.file_root = Some(root);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(name: &str, values: &[&str]) -> MatchedSegment {
        MatchedSegment {
            name: name.to_string(),
            kind: "Match",
            values: values.iter().map(|v| v.to_string()).collect(),
        }
    }

    #[test]
    fn test_params_by_name() {
        let ctx = Context::from_matched(vec![
            seg("", &[]),
            seg("user", &["alice"]),
            seg("", &["ignored"]),
        ]);
        assert_eq!(ctx.param("user"), Some("alice"));
        assert_eq!(ctx.params("user"), ["alice".to_string()]);
        assert_eq!(ctx.param("missing"), None);
        assert!(ctx.params("missing").is_empty());
        assert_eq!(ctx.all_params().len(), 1);
        assert_eq!(ctx.matched().len(), 3);
    }

    #[test]
    fn test_last_write_wins() {
        let ctx = Context::from_matched(vec![seg("v", &["a", "b"]), seg("v", &["c"])]);
        assert_eq!(ctx.params("v"), ["c".to_string()]);
    }

    #[test]
    fn test_vars_side_channel() {
        let mut ctx = Context::new();
        assert_eq!(ctx.var("user"), None);
        ctx.set_var("user", "bob");
        ctx.vars_mut().insert("role".into(), "admin".into());
        assert_eq!(ctx.var("user"), Some("bob"));
        assert_eq!(ctx.vars().len(), 2);
    }
}
