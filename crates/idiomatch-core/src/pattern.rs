//! # Patterns
//!
//! [`PatternBuilder`] declares named variables in elaboration order and
//! attaches constraints to them. [`PatternBuilder::build`] gathers all
//! constraints of a variable into one conjunction slot, so the resulting
//! [`Pattern`] is a list of `(name, selector)` pairs, one per variable, each
//! selecting its slot of a single shared conjunction.
//!
//! The order in which constraints are attached matters: the first constraint
//! attached to a variable generates its candidates, later ones filter them.
//! Attach the cheapest generator first (a predicate, or an edge from a
//! variable bound earlier).

use crate::atoms::{
    Accepted, DominanceAtom, DominanceKind, EdgeAtom, OrderingAtom, PredicateAtom, SameSetAtom,
    Slot, dominance, same_set,
};
use crate::solver::{self, SearchStatistics};
use crate::{
    Conjunction, Constraint, Disjunction, IdiomError, NodeRef, RelationStore, Selector, Solution,
};
use std::collections::BTreeMap;

/// Handle to a declared pattern variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Variable(usize);

impl Variable {
    /// Position in the elaboration order.
    #[must_use]
    pub fn position(self) -> usize {
        self.0
    }
}

/// Where a dominance check seeds its flow.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Seeds {
    /// The relation's sources (forward flow) or sinks (backward flow).
    #[default]
    Entries,
    /// Exactly these nodes.
    Nodes(Vec<NodeRef>),
    /// No seeds; only the origin group starts paths.
    None,
}

/// A fully general dominance constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dominance<'s> {
    pub relation: &'s str,
    pub kind: DominanceKind,
    pub seeds: Seeds,
    pub origins: Vec<Variable>,
    pub dominators: Vec<Variable>,
    pub dominated: Vec<Variable>,
}

// =============================================================================
// PATTERN BUILDER
// =============================================================================

/// Declares variables and attaches constraints against one relation store.
#[derive(Debug)]
pub struct PatternBuilder<'a> {
    store: &'a RelationStore,
    names: Vec<String>,
    index: BTreeMap<String, Variable>,
    constituents: Vec<Vec<Selector<'a>>>,
}

impl<'a> PatternBuilder<'a> {
    #[must_use]
    pub fn new(store: &'a RelationStore) -> Self {
        Self {
            store,
            names: Vec::new(),
            index: BTreeMap::new(),
            constituents: Vec::new(),
        }
    }

    /// Declare the next variable in elaboration order.
    pub fn variable(&mut self, name: impl Into<String>) -> Result<Variable, IdiomError> {
        let name = name.into();
        if self.index.contains_key(&name) {
            return Err(IdiomError::DuplicateVariable(name));
        }
        let variable = Variable(self.names.len());
        self.index.insert(name.clone(), variable);
        self.names.push(name);
        self.constituents.push(Vec::new());
        Ok(variable)
    }

    /// Declare several variables in order.
    pub fn variables<I, S>(&mut self, names: I) -> Result<Vec<Variable>, IdiomError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        names.into_iter().map(|name| self.variable(name)).collect()
    }

    /// Look up a declared variable by name.
    pub fn lookup(&self, name: &str) -> Result<Variable, IdiomError> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| IdiomError::UnknownVariable(name.to_string()))
    }

    /// Attach an arbitrary constraint, binding each listed slot to a variable.
    ///
    /// A variable may fill several slots; its candidates are then checked at
    /// all of them.
    pub fn constrain(
        &mut self,
        constraint: impl Into<Constraint<'a>>,
        slots: &[(Slot, Variable)],
    ) -> &mut Self {
        let shared = constraint.into().shared();
        for &(slot, variable) in slots {
            let aliases: Vec<Slot> = slots
                .iter()
                .filter(|&&(other, partner)| partner == variable && other != slot)
                .map(|&(other, _)| other)
                .collect();
            if !aliases.is_empty() {
                tracing::trace!(
                    variable = %self.names[variable.0],
                    aliases = aliases.len(),
                    "aliased slots"
                );
            }
            self.constituents[variable.0].push(Selector::new(&shared, slot).with_aliases(aliases));
        }
        self
    }

    /// `variable` is a member of the named predicate.
    pub fn predicate(&mut self, variable: Variable, name: &str) -> Result<&mut Self, IdiomError> {
        let atom = PredicateAtom::new(self.store.predicate(name)?);
        Ok(self.constrain(atom, &[(Slot::scalar(0), variable)]))
    }

    /// `variable` is deliberately absent.
    pub fn unused(&mut self, variable: Variable) -> &mut Self {
        self.constrain(PredicateAtom::unused(), &[(Slot::scalar(0), variable)])
    }

    /// `source -> target` is an edge of a simple relation.
    pub fn edge(
        &mut self,
        source: Variable,
        target: Variable,
        relation: &str,
    ) -> Result<&mut Self, IdiomError> {
        self.ranked_edge(source, target, relation, 0)
    }

    /// `source -> target` is an edge of the given rank of a relation.
    pub fn ranked_edge(
        &mut self,
        source: Variable,
        target: Variable,
        relation: &str,
        rank: usize,
    ) -> Result<&mut Self, IdiomError> {
        let atom = EdgeAtom::ranked(self.store.relation(relation)?, rank)?;
        Ok(self.constrain(
            atom,
            &[(Slot::scalar(0), source), (Slot::scalar(1), target)],
        ))
    }

    /// Compare `left` with `right` by universe index.
    pub fn ordering(&mut self, left: Variable, right: Variable, accepted: Accepted) -> &mut Self {
        let atom = OrderingAtom::new(accepted, self.store.node_count());
        self.constrain(atom, &[(Slot::scalar(0), left), (Slot::scalar(1), right)])
    }

    pub fn same(&mut self, left: Variable, right: Variable) -> &mut Self {
        self.ordering(left, right, Accepted::SAME)
    }

    pub fn distinct(&mut self, left: Variable, right: Variable) -> &mut Self {
        self.ordering(left, right, Accepted::DISTINCT)
    }

    /// Pairwise dominance: `dominator` dominates `dominated` over `relation`.
    pub fn dominates(
        &mut self,
        dominator: Variable,
        dominated: Variable,
        relation: &str,
        kind: DominanceKind,
    ) -> Result<&mut Self, IdiomError> {
        self.dominance(Dominance {
            relation,
            kind,
            seeds: Seeds::Entries,
            origins: Vec::new(),
            dominators: vec![dominator],
            dominated: vec![dominated],
        })
    }

    /// Every path from one of `from` to one of `to` passes one of `through`.
    ///
    /// The check is strict: a `to` node that is also a `through` node fails.
    pub fn blocked(
        &mut self,
        from: &[Variable],
        through: &[Variable],
        to: &[Variable],
        relation: &str,
    ) -> Result<&mut Self, IdiomError> {
        self.dominance(Dominance {
            relation,
            kind: DominanceKind::STRICTLY_DOMINATE,
            seeds: Seeds::None,
            origins: from.to_vec(),
            dominators: through.to_vec(),
            dominated: to.to_vec(),
        })
    }

    /// Attach a generalized dominance constraint.
    pub fn dominance(&mut self, request: Dominance<'_>) -> Result<&mut Self, IdiomError> {
        let relation = self.store.relation(request.relation)?;
        let sizes = [request.origins.len(), request.dominators.len(), request.dominated.len()];
        let atom = match request.seeds {
            Seeds::Entries => DominanceAtom::new(relation, request.kind, sizes),
            Seeds::Nodes(nodes) => DominanceAtom::with_seeds(relation, request.kind, nodes, sizes)?,
            Seeds::None => DominanceAtom::with_seeds(relation, request.kind, Vec::new(), sizes)?,
        };

        let groups = [
            (dominance::ORIGINS, &request.origins),
            (dominance::DOMINATORS, &request.dominators),
            (dominance::DOMINATED, &request.dominated),
        ];
        let slots: Vec<(Slot, Variable)> = groups
            .iter()
            .flat_map(|&(group, members)| {
                members
                    .iter()
                    .enumerate()
                    .map(move |(rank, &variable)| (Slot::ranked(group, rank), variable))
            })
            .collect();
        Ok(self.constrain(atom, &slots))
    }

    /// `left` and `right` hold the same set of nodes.
    pub fn same_set(&mut self, left: &[Variable], right: &[Variable]) -> &mut Self {
        let atom = SameSetAtom::new(self.store.node_count(), [left.len(), right.len()]);
        let slots: Vec<(Slot, Variable)> = [(same_set::LEFT, left), (same_set::RIGHT, right)]
            .iter()
            .flat_map(|&(group, members)| {
                members
                    .iter()
                    .enumerate()
                    .map(move |(rank, &variable)| (Slot::ranked(group, rank), variable))
            })
            .collect();
        self.constrain(atom, &slots)
    }

    /// An empty builder over the same variables, to describe one alternative
    /// for [`PatternBuilder::any_of`].
    #[must_use]
    pub fn alternative(&self) -> Self {
        Self {
            store: self.store,
            names: self.names.clone(),
            index: self.index.clone(),
            constituents: std::iter::repeat_with(Vec::new).take(self.names.len()).collect(),
        }
    }

    /// At least one of `alternatives` holds.
    ///
    /// The disjunction covers every variable some alternative constrains, and
    /// each alternative has to constrain all of them. Alternatives are tried
    /// in the order given.
    pub fn any_of(
        &mut self,
        alternatives: Vec<PatternBuilder<'a>>,
    ) -> Result<&mut Self, IdiomError> {
        let foreign = alternatives
            .iter()
            .flat_map(|branch| branch.names.iter().enumerate())
            .find(|&(position, name)| self.names.get(position) != Some(name));
        if let Some((_, name)) = foreign {
            return Err(IdiomError::UnknownVariable(name.clone()));
        }

        let covered: Vec<usize> = (0..self.names.len())
            .filter(|&position| {
                alternatives
                    .iter()
                    .any(|branch| {
                        branch
                            .constituents
                            .get(position)
                            .is_some_and(|selectors| !selectors.is_empty())
                    })
            })
            .collect();
        if covered.is_empty() {
            return Err(IdiomError::EmptyDisjunction);
        }

        let mut disjunction = Disjunction::with_slots(covered.len());
        for (index, branch) in alternatives.into_iter().enumerate() {
            let mut constituents = branch.constituents;
            let mut alternative = Conjunction::with_slots(covered.len());
            for (slot, &position) in covered.iter().enumerate() {
                let selectors = constituents
                    .get_mut(position)
                    .map(std::mem::take)
                    .unwrap_or_default();
                if selectors.is_empty() {
                    return Err(IdiomError::IncompleteAlternative {
                        alternative: index,
                        variable: self.names[position].clone(),
                    });
                }
                for selector in selectors {
                    alternative.push(slot, selector);
                }
            }
            disjunction.push(alternative);
        }

        tracing::debug!(
            alternatives = disjunction.alternative_count(),
            variables = covered.len(),
            "disjunction attached"
        );
        let slots: Vec<(Slot, Variable)> = covered
            .iter()
            .enumerate()
            .map(|(slot, &position)| (Slot::scalar(slot), Variable(position)))
            .collect();
        Ok(self.constrain(disjunction, &slots))
    }

    /// `value` flows into the phi node `phi` along the edge from `block`.
    ///
    /// Holds when, for some rank, `value -> phi` is an edge of `values` and
    /// `block -> phi` is an edge of `blocks` at that same rank.
    pub fn incoming_value(
        &mut self,
        value: Variable,
        phi: Variable,
        block: Variable,
        values: &str,
        blocks: &str,
    ) -> Result<&mut Self, IdiomError> {
        let ranks = self
            .store
            .relation(values)?
            .rank_count()
            .min(self.store.relation(blocks)?.rank_count());
        let mut alternatives = Vec::with_capacity(ranks);
        for rank in 0..ranks {
            let mut branch = self.alternative();
            branch
                .ranked_edge(value, phi, values, rank)?
                .ranked_edge(block, phi, blocks, rank)?;
            alternatives.push(branch);
        }
        self.any_of(alternatives)
    }

    /// Assemble the pattern.
    ///
    /// Fails when a declared variable has no constraint to draw candidates from.
    pub fn build(self) -> Result<Pattern<'a>, IdiomError> {
        if let Some(position) = self.constituents.iter().position(Vec::is_empty) {
            return Err(IdiomError::UnconstrainedVariable(
                self.names[position].clone(),
            ));
        }

        let mut conjunction = Conjunction::with_slots(self.names.len());
        for (slot, selectors) in self.constituents.into_iter().enumerate() {
            for selector in selectors {
                conjunction.push(slot, selector);
            }
        }
        let shared = Constraint::from(conjunction).shared();

        tracing::debug!(variables = self.names.len(), "pattern built");
        Ok(Pattern {
            variables: self
                .names
                .into_iter()
                .enumerate()
                .map(|(slot, name)| (name, Selector::scalar(&shared, slot)))
                .collect(),
        })
    }
}

// =============================================================================
// PATTERN
// =============================================================================

/// A ready-to-search list of variables in elaboration order.
#[derive(Debug)]
pub struct Pattern<'a> {
    variables: Vec<(String, Selector<'a>)>,
}

impl Pattern<'_> {
    /// Variable names in elaboration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.variables.iter().map(|(name, _)| name.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Enumerate up to `max_solutions` solutions.
    ///
    /// The pattern can be searched again afterwards.
    pub fn search(&mut self, max_solutions: usize) -> Vec<Solution> {
        solver::search(&mut self.variables, max_solutions)
    }

    /// [`Pattern::search`], also reporting search statistics.
    pub fn search_with_statistics(&mut self, max_solutions: usize) -> (Vec<Solution>, SearchStatistics) {
        solver::search_with_statistics(&mut self.variables, max_solutions)
    }
}
