//! # Search Driver
//!
//! Depth-first backtracking over an ordered list of variables, each backed
//! by an [`Atom`]. For the variable at the current depth the driver asks the
//! atom for its next value, fixes it and descends; when the atom has nothing
//! left, the driver cancels it and resumes the previous variable.
//!
//! Solutions are emitted in the lexicographic order of the candidate
//! sequences the atoms enumerate. The search is iterative, so its depth is
//! not limited by the call stack.

use crate::atoms::{Atom, SkipResult};
use crate::{NodeRef, Solution};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, trace, warn};

/// Counters collected during one search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchStatistics {
    /// Values committed with `fixate`.
    pub fixations: u64,
    /// Steps back to an earlier variable.
    pub backtracks: u64,
    /// Candidate rewrites (`Change`) negotiated with atoms.
    pub changes: u64,
    /// Solutions emitted.
    pub solutions: u64,
}

/// Enumerate up to `max_solutions` solutions of `variables`.
///
/// `variables` is the elaboration order; every atom must be freshly created
/// or fully cancelled. On return all atoms are cancelled again, so the same
/// variables can be searched a second time.
pub fn search<A: Atom>(variables: &mut [(String, A)], max_solutions: usize) -> Vec<Solution> {
    search_with_statistics(variables, max_solutions).0
}

/// [`search`], also reporting [`SearchStatistics`].
pub fn search_with_statistics<A: Atom>(
    variables: &mut [(String, A)],
    max_solutions: usize,
) -> (Vec<Solution>, SearchStatistics) {
    let mut statistics = SearchStatistics::default();
    let mut solutions = Vec::new();

    if max_solutions == 0 {
        return (solutions, statistics);
    }
    let Some(last) = variables.len().checked_sub(1) else {
        statistics.solutions = 1;
        return (vec![Solution::default()], statistics);
    };

    debug!(variables = variables.len(), max_solutions, "search started");

    let mut values = vec![NodeRef::UNBOUND; variables.len()];
    let mut depth = 0;
    variables[0].1.begin();

    loop {
        let next = next_value(&mut variables[depth].1, &mut statistics);
        match next {
            Some(value) => {
                variables[depth].1.fixate(value);
                values[depth] = value;
                statistics.fixations += 1;

                if depth < last {
                    depth += 1;
                    variables[depth].1.begin();
                    continue;
                }

                let solution = Solution::from_bindings(
                    variables
                        .iter()
                        .map(|(name, _)| name.as_str())
                        .zip(values.iter().copied()),
                );
                trace!(solution = solutions.len(), "solution found");
                solutions.push(solution);
                statistics.solutions += 1;

                if solutions.len() >= max_solutions {
                    for (_, atom) in variables.iter_mut().rev() {
                        atom.cancel();
                    }
                    break;
                }
                variables[depth].1.resume();
            }
            None => {
                variables[depth].1.cancel();
                values[depth] = NodeRef::UNBOUND;
                if depth == 0 {
                    break;
                }
                depth -= 1;
                statistics.backtracks += 1;
                variables[depth].1.resume();
            }
        }
    }

    debug!(
        solutions = statistics.solutions,
        fixations = statistics.fixations,
        backtracks = statistics.backtracks,
        "search finished"
    );
    (solutions, statistics)
}

/// Negotiate the next value of one variable with its atom.
///
/// Every `Change` proposal is remembered for the current request; an atom
/// that proposes the same candidate twice is treated as exhausted.
fn next_value<A: Atom + ?Sized>(atom: &mut A, statistics: &mut SearchStatistics) -> Option<NodeRef> {
    let mut candidate = NodeRef::UNBOUND;
    let mut proposed = BTreeSet::new();
    loop {
        match atom.skip_invalid(&mut candidate) {
            SkipResult::Fail => return None,
            SkipResult::Pass | SkipResult::ChangePass if candidate.is_unbound() => {
                warn!("atom accepted an unbound candidate; treating it as exhausted");
                return None;
            }
            SkipResult::Pass | SkipResult::ChangePass => return Some(candidate),
            SkipResult::Change => {
                statistics.changes += 1;
                if !proposed.insert(candidate) {
                    warn!(%candidate, "atom proposed the same candidate twice; treating it as exhausted");
                    return None;
                }
            }
        }
    }
}
