//! # Command Reports
//!
//! Serializable summaries printed by the CLI in `--json-mode`.

use crate::manifest::Manifest;
use idiomatch_core::primitives::DEFAULT_MAX_SOLUTIONS;
use idiomatch_core::{IdiomError, NodeRef, RelationStore, SearchStatistics};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Overview of a loaded store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSummary {
    pub nodes: usize,
    pub relations: Vec<RelationSummary>,
    pub predicates: Vec<PredicateSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationSummary {
    pub name: String,
    pub ranks: usize,
    pub edges: usize,
    pub sources: usize,
    pub sinks: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredicateSummary {
    pub name: String,
    pub members: usize,
}

impl StoreSummary {
    #[must_use]
    pub fn from_store(store: &RelationStore) -> Self {
        Self {
            nodes: store.node_count(),
            relations: store
                .relations()
                .map(|relation| RelationSummary {
                    name: relation.name().to_string(),
                    ranks: relation.rank_count(),
                    edges: relation.edge_count(),
                    sources: relation.sources().len(),
                    sinks: relation.sinks().len(),
                })
                .collect(),
            predicates: store
                .predicates()
                .map(|predicate| PredicateSummary {
                    name: predicate.name().to_string(),
                    members: predicate.len(),
                })
                .collect(),
        }
    }
}

/// Result of a `search` command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchReport {
    pub pattern: String,
    pub max_solutions: usize,
    /// True when the cap was reached; more solutions may exist.
    pub truncated: bool,
    pub solutions: Vec<Value>,
    pub statistics: SearchStatistics,
}

impl SearchReport {
    /// Build the manifest's pattern over `store` and search it.
    ///
    /// The cap is `max_solutions`, else the manifest's own cap, else
    /// [`DEFAULT_MAX_SOLUTIONS`]. Solutions are pruned to the manifest's
    /// `keep` list; with `labels` nodes render by label where one exists.
    pub fn run(
        manifest: &Manifest,
        store: &RelationStore,
        max_solutions: Option<usize>,
        labels: bool,
    ) -> Result<Self, IdiomError> {
        let max_solutions = max_solutions
            .or(manifest.max_solutions)
            .unwrap_or(DEFAULT_MAX_SOLUTIONS);
        let mut pattern = manifest.build(store)?;
        let (found, statistics) = pattern.search_with_statistics(max_solutions);

        let universe = store.universe();
        let leaf = |node: NodeRef| match universe.label(node) {
            Some(label) if labels => Value::from(label),
            _ => Value::from(node.0),
        };
        let solutions = found
            .iter()
            .map(|solution| {
                if manifest.keep.is_empty() {
                    solution.to_json(leaf)
                } else {
                    solution.prune(&manifest.keep).to_json(leaf)
                }
            })
            .collect();

        tracing::info!(
            pattern = manifest.display_name(),
            solutions = statistics.solutions,
            "search complete"
        );
        Ok(Self {
            pattern: manifest.display_name().to_string(),
            max_solutions,
            truncated: max_solutions != usize::MAX && found.len() >= max_solutions,
            solutions,
            statistics,
        })
    }
}

/// Result of a `check` command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckReport {
    pub pattern: String,
    pub valid: bool,
    pub variables: usize,
    pub constraints: usize,
    #[serde(default)]
    pub error: Option<String>,
}

impl CheckReport {
    /// Validate that the manifest builds against `store`.
    #[must_use]
    pub fn run(manifest: &Manifest, store: &RelationStore) -> Self {
        let error = manifest.build(store).err().map(|e| e.to_string());
        Self {
            pattern: manifest.display_name().to_string(),
            valid: error.is_none(),
            variables: manifest.variables.len(),
            constraints: manifest.constraints.len(),
            error,
        }
    }
}
