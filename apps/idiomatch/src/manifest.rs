//! # Pattern Manifests
//!
//! Idiom patterns are authored as TOML manifests and translated into
//! [`PatternBuilder`] calls against a loaded store.
//!
//! ```toml
//! name = "even_successor"
//! variables = ["X", "Y"]
//! keep = ["X", "Y"]
//!
//! [[constraint]]
//! kind = "predicate"
//! variable = "X"
//! predicate = "is_even"
//!
//! [[constraint]]
//! kind = "edge"
//! relation = "next"
//! source = "X"
//! target = "Y"
//! ```
//!
//! `variables` fixes the elaboration order. Constraints are attached in file
//! order, so the first constraint naming a variable generates its candidates.
//!
//! An `any_of` constraint lists alternatives, each with its own constraints:
//!
//! ```toml
//! [[constraint]]
//! kind = "any_of"
//!
//! [[constraint.alternative]]
//! [[constraint.alternative.constraint]]
//! kind = "edge"
//! relation = "next"
//! source = "X"
//! target = "Y"
//!
//! [[constraint.alternative]]
//! [[constraint.alternative.constraint]]
//! kind = "edge"
//! relation = "next"
//! source = "Y"
//! target = "X"
//! ```

use idiomatch_core::{
    Accepted, Dominance, DominanceKind, Flow, IdiomError, NodeRef, Pattern, PatternBuilder,
    RelationStore, Seeds, Variable,
};
use serde::{Deserialize, Serialize};

/// A parsed pattern manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Display name of the idiom.
    #[serde(default)]
    pub name: Option<String>,

    /// Variable names in elaboration order.
    pub variables: Vec<String>,

    /// Names (or name prefixes) reported in solutions; empty keeps everything.
    #[serde(default)]
    pub keep: Vec<String>,

    /// Solution cap used when the command line gives none.
    #[serde(default)]
    pub max_solutions: Option<usize>,

    #[serde(default, rename = "constraint")]
    pub constraints: Vec<ConstraintEntry>,
}

/// One `[[constraint]]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConstraintEntry {
    Predicate {
        variable: String,
        predicate: String,
    },
    Unused {
        variable: String,
    },
    Edge {
        relation: String,
        source: String,
        target: String,
        #[serde(default)]
        rank: usize,
    },
    Same {
        left: String,
        right: String,
    },
    Distinct {
        left: String,
        right: String,
    },
    Ordering {
        left: String,
        right: String,
        accept: Vec<Comparison>,
    },
    Dominate {
        relation: String,
        dominator: String,
        dominated: String,
        #[serde(default)]
        flow: FlowEntry,
        #[serde(default)]
        strict: bool,
        #[serde(default)]
        negated: bool,
    },
    Dominance {
        relation: String,
        #[serde(default)]
        flow: FlowEntry,
        #[serde(default)]
        strict: bool,
        #[serde(default)]
        negated: bool,
        #[serde(default)]
        seeds: SeedsEntry,
        #[serde(default)]
        origins: Vec<String>,
        dominators: Vec<String>,
        dominated: Vec<String>,
    },
    Blocked {
        relation: String,
        from: Vec<String>,
        through: Vec<String>,
        to: Vec<String>,
    },
    SameSet {
        left: Vec<String>,
        right: Vec<String>,
    },
    IncomingValue {
        value: String,
        phi: String,
        block: String,
        /// Ranked relation carrying the phi's operands.
        values: String,
        /// Ranked relation carrying the phi's incoming blocks.
        blocks: String,
    },
    AnyOf {
        #[serde(rename = "alternative")]
        alternatives: Vec<Alternative>,
    },
}

/// One `[[constraint.alternative]]` table of an `any_of` constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alternative {
    #[serde(default, rename = "constraint")]
    pub constraints: Vec<ConstraintEntry>,
}

/// Outcome of comparing the left variable with the right one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    Less,
    Equal,
    Greater,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowEntry {
    #[default]
    Forward,
    Backward,
}

impl From<FlowEntry> for Flow {
    fn from(flow: FlowEntry) -> Self {
        match flow {
            FlowEntry::Forward => Self::Forward,
            FlowEntry::Backward => Self::Backward,
        }
    }
}

/// `seeds = "entries"`, `seeds = "none"` or `seeds = [0, 4]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SeedsEntry {
    Named(SeedsName),
    Nodes(Vec<u32>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedsName {
    Entries,
    None,
}

impl Default for SeedsEntry {
    fn default() -> Self {
        Self::Named(SeedsName::Entries)
    }
}

impl From<&SeedsEntry> for Seeds {
    fn from(seeds: &SeedsEntry) -> Self {
        match seeds {
            SeedsEntry::Named(SeedsName::Entries) => Self::Entries,
            SeedsEntry::Named(SeedsName::None) => Self::None,
            SeedsEntry::Nodes(nodes) => Self::Nodes(nodes.iter().copied().map(NodeRef::new).collect()),
        }
    }
}

fn kind(flow: FlowEntry, strict: bool, negated: bool) -> DominanceKind {
    DominanceKind {
        flow: flow.into(),
        strict,
        negated,
    }
}

// =============================================================================
// MANIFEST
// =============================================================================

impl Manifest {
    /// Parse a manifest from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, IdiomError> {
        toml::from_str(text)
            .map_err(|e| IdiomError::SerializationError(format!("Invalid pattern manifest: {e}")))
    }

    /// Display name, falling back to `"pattern"`.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("pattern")
    }

    /// Translate the manifest into a pattern over `store`.
    pub fn build<'a>(&self, store: &'a RelationStore) -> Result<Pattern<'a>, IdiomError> {
        let mut builder = PatternBuilder::new(store);
        builder.variables(self.variables.iter().cloned())?;

        for entry in &self.constraints {
            attach(&mut builder, entry)?;
        }

        tracing::debug!(
            pattern = self.display_name(),
            variables = self.variables.len(),
            constraints = self.constraints.len(),
            "manifest translated"
        );
        builder.build()
    }
}

fn lookup_all(builder: &PatternBuilder<'_>, names: &[String]) -> Result<Vec<Variable>, IdiomError> {
    names.iter().map(|name| builder.lookup(name)).collect()
}

fn attach(builder: &mut PatternBuilder<'_>, entry: &ConstraintEntry) -> Result<(), IdiomError> {
    match entry {
        ConstraintEntry::Predicate { variable, predicate } => {
            let variable = builder.lookup(variable)?;
            builder.predicate(variable, predicate)?;
        }
        ConstraintEntry::Unused { variable } => {
            let variable = builder.lookup(variable)?;
            builder.unused(variable);
        }
        ConstraintEntry::Edge {
            relation,
            source,
            target,
            rank,
        } => {
            let (source, target) = (builder.lookup(source)?, builder.lookup(target)?);
            builder.ranked_edge(source, target, relation, *rank)?;
        }
        ConstraintEntry::Same { left, right } => {
            let (left, right) = (builder.lookup(left)?, builder.lookup(right)?);
            builder.same(left, right);
        }
        ConstraintEntry::Distinct { left, right } => {
            let (left, right) = (builder.lookup(left)?, builder.lookup(right)?);
            builder.distinct(left, right);
        }
        ConstraintEntry::Ordering {
            left,
            right,
            accept,
        } => {
            let (left, right) = (builder.lookup(left)?, builder.lookup(right)?);
            let accepted = Accepted {
                less: accept.contains(&Comparison::Less),
                equal: accept.contains(&Comparison::Equal),
                greater: accept.contains(&Comparison::Greater),
            };
            builder.ordering(left, right, accepted);
        }
        ConstraintEntry::Dominate {
            relation,
            dominator,
            dominated,
            flow,
            strict,
            negated,
        } => {
            let (dominator, dominated) = (builder.lookup(dominator)?, builder.lookup(dominated)?);
            builder.dominates(dominator, dominated, relation, kind(*flow, *strict, *negated))?;
        }
        ConstraintEntry::Dominance {
            relation,
            flow,
            strict,
            negated,
            seeds,
            origins,
            dominators,
            dominated,
        } => {
            let constraint = Dominance {
                relation,
                kind: kind(*flow, *strict, *negated),
                seeds: seeds.into(),
                origins: lookup_all(builder, origins)?,
                dominators: lookup_all(builder, dominators)?,
                dominated: lookup_all(builder, dominated)?,
            };
            builder.dominance(constraint)?;
        }
        ConstraintEntry::Blocked {
            relation,
            from,
            through,
            to,
        } => {
            let from = lookup_all(builder, from)?;
            let through = lookup_all(builder, through)?;
            let to = lookup_all(builder, to)?;
            builder.blocked(&from, &through, &to, relation)?;
        }
        ConstraintEntry::SameSet { left, right } => {
            let (left, right) = (lookup_all(builder, left)?, lookup_all(builder, right)?);
            builder.same_set(&left, &right);
        }
        ConstraintEntry::IncomingValue {
            value,
            phi,
            block,
            values,
            blocks,
        } => {
            let value = builder.lookup(value)?;
            let (phi, block) = (builder.lookup(phi)?, builder.lookup(block)?);
            builder.incoming_value(value, phi, block, values, blocks)?;
        }
        ConstraintEntry::AnyOf { alternatives } => {
            let mut branches = Vec::with_capacity(alternatives.len());
            for alternative in alternatives {
                let mut branch = builder.alternative();
                for entry in &alternative.constraints {
                    attach(&mut branch, entry)?;
                }
                branches.push(branch);
            }
            builder.any_of(branches)?;
        }
    }
    Ok(())
}
