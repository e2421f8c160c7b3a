//! Route trie nodes.
//!
//! # Segment syntax
//! ```text
//!  Token          Kind       Matches
//!  users          Raw        the literal text, case-insensitively
//!  :id            Match      any single segment
//!  #{year}\d{4}   Regex      a single segment the pattern matches, named
//!  #\d+           Regex      a single segment the pattern matches, unnamed
//!  *rest          Wildcard   every remaining segment, joined by '/'
//! ```
//!
//! # Design Decisions
//! - Children are an ordered list; raw children are indexed by their
//!   lowercased text, and at most one non-raw child is kept in its own slot
//! - A second, different non-raw child is a registration error, so lookup
//!   never depends on iteration order
//! - Search is depth first with backtracking: raw child first, then the
//!   non-raw child; wildcards only take part when explicitly enabled

use std::collections::HashMap;
use std::fmt;

use regex::Regex;

use crate::routing::chain::Chain;
use crate::routing::context::MatchedSegment;
use crate::routing::error::RouteError;

/// Classification of a path segment.
#[derive(Debug, Clone)]
pub enum SegmentKind {
    Raw,
    Wildcard,
    Match,
    Regex(Regex),
}

impl SegmentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SegmentKind::Raw => "Raw",
            SegmentKind::Wildcard => "Wildcard",
            SegmentKind::Match => "Match",
            SegmentKind::Regex(_) => "Regex",
        }
    }

    pub fn is_raw(&self) -> bool {
        matches!(self, SegmentKind::Raw)
    }
}

impl fmt::Display for SegmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One node of a method's route trie.
#[derive(Debug, Clone)]
pub struct Segment {
    name: String,
    /// Lowercased registration token, the key under the parent.
    token: String,
    kind: SegmentKind,
    children: Vec<Segment>,
    raw_index: HashMap<String, usize>,
    non_raw: Option<usize>,
    trailing_slash: bool,
    chain: Chain,
}

/// Options that hold for one whole search.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Lookup {
    /// Whether any wildcard was ever registered; enables the second pass.
    pub has_wildcard: bool,
    pub strict_trailing_slash: bool,
    /// Whether the request path ends with '/'.
    pub trailing_slash: bool,
}

/// A segment of the request path.
struct PathPart<'p> {
    text: &'p str,
    key: String,
}

/// A segment visited during a search, with the values it captured.
pub(crate) struct Captured<'r> {
    pub segment: &'r Segment,
    pub values: Vec<String>,
}

impl Segment {
    /// The root of a method trie: raw, unnamed, no children yet.
    pub fn root() -> Self {
        Self::with_kind(String::new(), String::new(), SegmentKind::Raw)
    }

    fn with_kind(name: String, token: String, kind: SegmentKind) -> Self {
        Self {
            name,
            token,
            kind,
            children: Vec::new(),
            raw_index: HashMap::new(),
            non_raw: None,
            trailing_slash: false,
            chain: Chain::new(),
        }
    }

    /// Classify a registration token. `path` is only used for error reports.
    pub fn parse(token: &str, path: &str) -> Result<Self, RouteError> {
        let key = token.to_lowercase();
        let segment = if let Some(name) = token.strip_prefix(':') {
            Self::with_kind(name.to_string(), key, SegmentKind::Match)
        } else if let Some(name) = token.strip_prefix('*') {
            Self::with_kind(name.to_string(), key, SegmentKind::Wildcard)
        } else if let Some(body) = token.strip_prefix('#') {
            let (name, source) = split_regex(body, path)?;
            if source.is_empty() {
                return Err(RouteError::EmptyRegex { path: path.into() });
            }
            let pattern = Regex::new(source).map_err(|source| RouteError::InvalidRegex {
                path: path.into(),
                source,
            })?;
            Self::with_kind(name.to_string(), key, SegmentKind::Regex(pattern))
        } else {
            Self::with_kind(key.clone(), key, SegmentKind::Raw)
        };
        Ok(segment)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &SegmentKind {
        &self.kind
    }

    pub fn children(&self) -> &[Segment] {
        &self.children
    }

    pub fn has_non_raw_child(&self) -> bool {
        self.non_raw.is_some()
    }

    pub fn trailing_slash(&self) -> bool {
        self.trailing_slash
    }

    pub fn chain(&self) -> &Chain {
        &self.chain
    }

    pub fn is_routable(&self) -> bool {
        self.chain.is_routable()
    }

    /// Walk the tokens of `path`, creating nodes as needed, and install
    /// `chain` on the node it ends at.
    ///
    /// The caller has already checked the leading slash and that `chain` has
    /// a terminal handler; `on_redefined` builds the error for a node that
    /// is already routable. Every token is checked before the trie changes,
    /// so a failed registration leaves it untouched.
    pub(crate) fn insert(
        &mut self,
        path: &str,
        chain: Chain,
        on_redefined: impl FnOnce() -> RouteError,
    ) -> Result<&Segment, RouteError> {
        let tokens: Vec<&str> = path.split('/').filter(|t| !t.is_empty()).collect();
        let (existing, fresh) = self.plan_insert(&tokens, path)?;
        if existing.is_some_and(Segment::is_routable) {
            return Err(on_redefined());
        }

        let mut fresh = fresh.into_iter();
        let mut node = self;
        for token in &tokens {
            let index = match node.child_index(token) {
                Some(index) => index,
                None => match fresh.next() {
                    Some(child) => node.attach(child),
                    None => node.attach(Segment::parse(token, path)?),
                },
            };
            node = &mut node.children[index];
        }

        node.chain.merge(chain);
        if !tokens.is_empty() {
            node.trailing_slash = path.ends_with('/');
        }
        Ok(node)
    }

    /// Check `tokens` against the trie without changing it.
    ///
    /// Returns the node the path already ends at, if it exists, and the
    /// parsed segments still to be created, in path order.
    fn plan_insert<'s>(
        &'s self,
        tokens: &[&str],
        path: &str,
    ) -> Result<(Option<&'s Segment>, Vec<Segment>), RouteError> {
        let mut node = Some(self);
        let mut fresh = Vec::new();
        let mut after_wildcard = false;

        for token in tokens {
            if after_wildcard {
                return Err(RouteError::WildcardNotLast { path: path.into() });
            }
            let existing = node.and_then(|n| n.child_index(token).map(|i| &n.children[i]));
            let kind = match existing {
                Some(child) => {
                    node = Some(child);
                    &child.kind
                }
                None => {
                    let child = Segment::parse(token, path)?;
                    let sibling = match node {
                        Some(n) if !child.kind.is_raw() => n.non_raw.map(|i| &n.children[i]),
                        _ => None,
                    };
                    if let Some(other) = sibling {
                        return Err(RouteError::ConflictingSegment {
                            path: path.into(),
                            existing: other.token.clone(),
                            token: child.token,
                        });
                    }
                    node = None;
                    fresh.push(child);
                    &fresh[fresh.len() - 1].kind
                }
            };
            after_wildcard = matches!(kind, SegmentKind::Wildcard);
        }
        Ok((node, fresh))
    }

    /// Index of the existing child registered under `token`.
    fn child_index(&self, token: &str) -> Option<usize> {
        let key = token.to_lowercase();
        if is_special(token) {
            self.non_raw.filter(|&i| self.children[i].token == key)
        } else {
            self.raw_index.get(&key).copied()
        }
    }

    /// Add a child that `plan_insert` has already cleared.
    fn attach(&mut self, child: Segment) -> usize {
        let index = self.children.len();
        if child.kind.is_raw() {
            self.raw_index.insert(child.token.clone(), index);
        } else {
            self.non_raw = Some(index);
        }
        self.children.push(child);
        index
    }

    /// Candidate children for a request segment, in priority order.
    fn candidates<'a>(&'a self, key: &str) -> impl Iterator<Item = &'a Segment> + 'a {
        let raw = self.raw_index.get(key).map(|&i| &self.children[i]);
        let non_raw = self.non_raw.map(|i| &self.children[i]);
        raw.into_iter().chain(non_raw)
    }

    /// Try to match this node against the head of `parts`.
    ///
    /// Returns the captured values and whether the node consumed every
    /// remaining segment.
    fn match_head(&self, parts: &[PathPart<'_>], skip_wildcard: bool) -> Option<(Vec<String>, bool)> {
        let head = &parts[0];
        match &self.kind {
            SegmentKind::Raw if self.name == head.key => Some((vec![head.text.to_string()], false)),
            SegmentKind::Raw => None,
            SegmentKind::Match => Some((vec![head.text.to_string()], false)),
            SegmentKind::Regex(pattern) => pattern.captures(head.text).map(|caps| {
                let values = caps
                    .iter()
                    .map(|group| group.map_or_else(String::new, |m| m.as_str().to_string()))
                    .collect();
                (values, false)
            }),
            SegmentKind::Wildcard if skip_wildcard => None,
            SegmentKind::Wildcard => {
                let rest: Vec<&str> = parts.iter().map(|p| p.text).collect();
                Some((vec![rest.join("/")], true))
            }
        }
    }

    /// The node a search ended on must be routable and, in strict mode,
    /// agree with the request on the trailing slash. Wildcards are exempt
    /// from the slash check.
    fn accepts(&self, lookup: &Lookup) -> bool {
        if !self.chain.is_routable() {
            return false;
        }
        !lookup.strict_trailing_slash
            || matches!(self.kind, SegmentKind::Wildcard)
            || self.trailing_slash == lookup.trailing_slash
    }

    fn descend<'r>(
        &'r self,
        parts: &[PathPart<'_>],
        skip_wildcard: bool,
        trail: &mut Vec<Captured<'r>>,
    ) -> bool {
        self.candidates(&parts[0].key)
            .any(|child| child.walk(parts, skip_wildcard, trail))
    }

    fn walk<'r>(
        &'r self,
        parts: &[PathPart<'_>],
        skip_wildcard: bool,
        trail: &mut Vec<Captured<'r>>,
    ) -> bool {
        let Some((values, by_wildcard)) = self.match_head(parts, skip_wildcard) else {
            return false;
        };
        trail.push(Captured {
            segment: self,
            values,
        });

        let rest = &parts[1..];
        let found = rest.is_empty() || by_wildcard || self.descend(rest, skip_wildcard, trail);

        if !found {
            trail.pop();
        }
        found
    }

    pub(crate) fn to_matched(&self, values: Vec<String>) -> MatchedSegment {
        MatchedSegment {
            name: self.name.clone(),
            kind: self.kind.as_str(),
            values,
        }
    }

    /// Patterns of every routable node below and including this one.
    pub(crate) fn collect_patterns(&self, prefix: &str, out: &mut Vec<String>) {
        let pattern = if self.token.is_empty() {
            "/".to_string()
        } else {
            format!("{}{}", prefix, self.token)
        };
        if self.chain.is_routable() {
            let mut shown = pattern.clone();
            if self.trailing_slash && !shown.ends_with('/') {
                shown.push('/');
            }
            out.push(shown);
        }
        let prefix = if pattern.ends_with('/') {
            pattern
        } else {
            pattern + "/"
        };
        for child in &self.children {
            child.collect_patterns(&prefix, out);
        }
    }
}

/// Search the trie rooted at `root` for `path`.
///
/// Runs once with wildcards suppressed and, when the router has any
/// wildcard, once more with them enabled. On success the trail holds every
/// visited node, root first.
pub(crate) fn find_route<'r>(root: &'r Segment, path: &str, lookup: Lookup) -> Option<Vec<Captured<'r>>> {
    let parts: Vec<PathPart<'_>> = path
        .split('/')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|text| PathPart {
            text,
            key: text.to_lowercase(),
        })
        .collect();

    let mut trail = vec![Captured {
        segment: root,
        values: Vec::new(),
    }];
    if parts.is_empty() {
        return root.is_routable().then_some(trail);
    }

    let mut skip_wildcard = true;
    while !root.descend(&parts, skip_wildcard, &mut trail) {
        if skip_wildcard && lookup.has_wildcard {
            skip_wildcard = false;
        } else {
            return None;
        }
    }

    // The first full walk decides; a handler-less leaf is not-found.
    let leaf = trail.last()?.segment;
    leaf.accepts(&lookup).then_some(trail)
}

fn is_special(token: &str) -> bool {
    matches!(token.as_bytes().first(), Some(b':' | b'*' | b'#'))
}

/// Split `{name}pattern` into name and pattern; a token without a name block
/// is all pattern.
fn split_regex<'t>(body: &'t str, path: &str) -> Result<(&'t str, &'t str), RouteError> {
    match body.strip_prefix('{') {
        Some(named) => named
            .split_once('}')
            .ok_or_else(|| RouteError::UnclosedRegexName { path: path.into() }),
        None => Ok(("", body)),
    }
}
