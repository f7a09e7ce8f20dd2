//! # Solutions
//!
//! A [`Solution`] maps variable names to the nodes bound to them. Names use
//! a dotted and indexed grammar (`loop.body`, `for[2].iterator`), which
//! [`Solution::serialize`] renders as nested JSON: a `.member` becomes an
//! object key, an `[index]` becomes an array position. `ABSENT` renders as
//! `null`, as do array positions no variable names. Indices too sparse to pad
//! with nulls render as `"[i]"` object keys.

use crate::primitives::MAX_INDEX_GAP;
use crate::{NodeRef, NodeUniverse};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Variable bindings of one match, keyed by variable name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Solution {
    bindings: BTreeMap<String, NodeRef>,
}

impl Solution {
    /// Build a solution from `(name, value)` pairs; later pairs win.
    pub fn from_bindings<I, S>(bindings: I) -> Self
    where
        I: IntoIterator<Item = (S, NodeRef)>,
        S: Into<String>,
    {
        Self {
            bindings: bindings
                .into_iter()
                .map(|(name, value)| (name.into(), value))
                .collect(),
        }
    }

    /// Value bound to `name`.
    ///
    /// # Panics
    ///
    /// Panics when the solution has no variable called `name`; use
    /// [`Solution::try_get`] for names that may be missing.
    #[must_use]
    #[track_caller]
    #[allow(clippy::panic)]
    pub fn get(&self, name: &str) -> NodeRef {
        match self.bindings.get(name) {
            Some(&value) => value,
            None => panic!("solution has no variable named '{name}'"),
        }
    }

    #[must_use]
    pub fn try_get(&self, name: &str) -> Option<NodeRef> {
        self.bindings.get(name).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Bindings in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, NodeRef)> {
        self.bindings.iter().map(|(name, &value)| (name.as_str(), value))
    }

    /// Keep only the variables named in `keep` and the variables nested
    /// below them (`keep` followed by `.` or `[`).
    #[must_use]
    pub fn prune<S: AsRef<str>>(&self, keep: &[S]) -> Self {
        Self {
            bindings: self
                .bindings
                .iter()
                .filter(|(name, _)| keep.iter().any(|prefix| is_within(name, prefix.as_ref())))
                .map(|(name, &value)| (name.clone(), value))
                .collect(),
        }
    }

    /// Nested JSON rendering with node indices as leaves.
    #[must_use]
    pub fn serialize(&self) -> String {
        format!("{:#}", self.to_json(|node| Value::from(node.0)))
    }

    /// Nested JSON rendering with node labels as leaves.
    ///
    /// Unlabeled nodes fall back to their index.
    #[must_use]
    pub fn serialize_labeled(&self, universe: &NodeUniverse) -> String {
        format!(
            "{:#}",
            self.to_json(|node| match universe.label(node) {
                Some(label) => Value::from(label),
                None => Value::from(node.0),
            })
        )
    }

    /// Nested JSON value; `leaf` renders every real node.
    pub fn to_json(&self, leaf: impl Fn(NodeRef) -> Value) -> Value {
        if self.bindings.is_empty() {
            return Value::Object(Map::new());
        }
        let mut root = Tree::default();
        for (name, &value) in &self.bindings {
            root.insert(&parse_path(name), value);
        }
        root.render(&leaf)
    }
}

fn is_within(name: &str, prefix: &str) -> bool {
    name.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('.') || rest.starts_with('['))
}

// =============================================================================
// NAME PATHS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment<'n> {
    Member(&'n str),
    Index(usize),
}

/// Split `a.b[2].c` into member and index segments.
///
/// Malformed brackets are kept as part of the member name.
fn parse_path(name: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut rest = name;
    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix('.') {
            rest = after;
            continue;
        }
        if let Some(after) = rest.strip_prefix('[') {
            if let Some(close) = after.find(']') {
                if let Ok(index) = after[..close].parse::<usize>() {
                    segments.push(Segment::Index(index));
                    rest = &after[close + 1..];
                    continue;
                }
            }
        }
        let end = rest
            .char_indices()
            .skip(1)
            .find(|&(_, c)| c == '.' || c == '[')
            .map_or(rest.len(), |(position, _)| position);
        segments.push(Segment::Member(&rest[..end]));
        rest = &rest[end..];
    }
    segments
}

// =============================================================================
// RENDER TREE
// =============================================================================

#[derive(Debug, Default)]
struct Tree {
    value: Option<NodeRef>,
    members: BTreeMap<String, Tree>,
    elements: BTreeMap<usize, Tree>,
}

impl Tree {
    fn insert(&mut self, path: &[Segment<'_>], value: NodeRef) {
        match path.split_first() {
            None => self.value = Some(value),
            Some((Segment::Member(name), rest)) => self
                .members
                .entry((*name).to_string())
                .or_default()
                .insert(rest, value),
            Some((Segment::Index(index), rest)) => {
                self.elements.entry(*index).or_default().insert(rest, value);
            }
        }
    }

    /// Length of the array this node renders as, if it is one: only
    /// indices below it, with at most [`MAX_INDEX_GAP`] of them missing.
    fn array_length(&self) -> Option<usize> {
        if !self.members.is_empty() || self.value.is_some() {
            return None;
        }
        let length = self.elements.keys().next_back()?.checked_add(1)?;
        (length - self.elements.len() <= MAX_INDEX_GAP).then_some(length)
    }

    fn render(&self, leaf: &dyn Fn(NodeRef) -> Value) -> Value {
        let node = |value: NodeRef| if value.is_node() { leaf(value) } else { Value::Null };

        if self.members.is_empty() && self.elements.is_empty() {
            return self.value.map_or(Value::Null, node);
        }

        if let Some(length) = self.array_length() {
            return Value::Array(
                (0..length)
                    .map(|index| {
                        self.elements
                            .get(&index)
                            .map_or(Value::Null, |element| element.render(leaf))
                    })
                    .collect(),
            );
        }

        // Mixed or sparse shapes: a bound prefix lives under "", indices under "[i]".
        let mut object = Map::new();
        if let Some(value) = self.value {
            object.insert(String::new(), node(value));
        }
        for (name, member) in &self.members {
            object.insert(name.clone(), member.render(leaf));
        }
        for (index, element) in &self.elements {
            object.insert(format!("[{index}]"), element.render(leaf));
        }
        Value::Object(object)
    }
}
