//! # Validation Tier Tests (T0-T3)
//!
//! If ANY tier fails, the solver is INVALID.
//!
//! ## Tiers
//! - T0: Store Integrity
//! - T1: Atom Correctness
//! - T2: Search Contract
//! - T3: Idiom Scenarios

use idiomatch_core::{
    Accepted, DominanceKind, IdiomError, NodeRef, NodeUniverse, PatternBuilder, PredicateSet,
    Relation, RelationStore, Solution, Variable,
};

fn n(index: u32) -> NodeRef {
    NodeRef::new(index)
}

/// Five nodes, `next: i -> i + 1`, `is_even = {0, 2, 4}`.
fn scenario_store() -> RelationStore {
    let mut store = RelationStore::new(NodeUniverse::with_size(5)).expect("store");
    let next = Relation::from_edges("next", 5, &[(0, 1), (1, 2), (2, 3), (3, 4)]).expect("next");
    store.insert_relation(next).expect("insert");
    store
        .insert_predicate(PredicateSet::new("is_even", vec![n(0), n(2), n(4)]))
        .expect("insert");
    store
}

fn pairs(solutions: &[Solution], first: &str, second: &str) -> Vec<(u32, u32)> {
    solutions
        .iter()
        .map(|s| (s.get(first).0, s.get(second).0))
        .collect()
}

// =============================================================================
// TIER T0: STORE INTEGRITY
// =============================================================================

mod t0_store_integrity {
    use super::*;

    /// T0.1: Forward and reverse adjacency must mirror each other.
    #[test]
    fn unmirrored_relation_rejected() {
        let mut store = RelationStore::new(NodeUniverse::with_size(2)).expect("store");
        let relation = Relation::simple("r", vec![vec![n(1)], vec![]], vec![vec![], vec![n(1)]]);
        assert!(matches!(
            store.insert_relation(relation),
            Err(IdiomError::InconsistentAdjacency { .. })
        ));
    }

    /// T0.2: Adjacency tables must cover the whole universe.
    #[test]
    fn short_tables_rejected() {
        let mut store = RelationStore::new(NodeUniverse::with_size(3)).expect("store");
        let relation = Relation::simple("r", vec![vec![]], vec![vec![]]);
        assert!(matches!(
            store.insert_relation(relation),
            Err(IdiomError::SizeMismatch { .. })
        ));
    }

    /// T0.3: Adjacency keeps insertion order.
    #[test]
    fn adjacency_order_preserved() {
        let relation = Relation::from_edges("r", 10, &[(0, 9), (0, 3), (0, 7)]).expect("relation");
        assert_eq!(relation.successors(n(0), 0), &[n(9), n(3), n(7)]);
    }

    /// T0.4: Packed stores restore bit-exact.
    #[test]
    fn packed_store_roundtrip() {
        let store = scenario_store();
        let bytes = idiomatch_core::store_to_bytes(&store).expect("pack");
        let restored = idiomatch_core::store_from_bytes(&bytes).expect("unpack");
        assert_eq!(idiomatch_core::store_to_bytes(&restored).expect("repack"), bytes);
    }
}

// =============================================================================
// TIER T1: ATOM CORRECTNESS
// =============================================================================

mod t1_atom_correctness {
    use super::*;

    /// T1.1: An edge anchored at A enumerates exactly A's successors, in order.
    #[test]
    fn edge_enumerates_successors_exactly() {
        let mut store = RelationStore::new(NodeUniverse::with_size(10)).expect("store");
        store
            .insert_relation(
                Relation::from_edges("r", 10, &[(1, 3), (1, 7), (1, 9), (2, 5)]).expect("relation"),
            )
            .expect("insert");
        store
            .insert_predicate(PredicateSet::new("anchor", vec![n(1)]))
            .expect("insert");

        let mut builder = PatternBuilder::new(&store);
        let a = builder.variable("A").expect("var");
        let b = builder.variable("B").expect("var");
        builder.predicate(a, "anchor").expect("predicate");
        builder.edge(a, b, "r").expect("edge");
        let mut pattern = builder.build().expect("build");

        let targets: Vec<u32> = pattern.search(100).iter().map(|s| s.get("B").0).collect();
        assert_eq!(targets, vec![3, 7, 9]);
    }

    /// T1.2: A non-successor is rejected even when it is otherwise valid.
    #[test]
    fn edge_rejects_other_candidates() {
        let mut store = RelationStore::new(NodeUniverse::with_size(10)).expect("store");
        store
            .insert_relation(
                Relation::from_edges("r", 10, &[(1, 3), (1, 7), (1, 9), (2, 5)]).expect("relation"),
            )
            .expect("insert");
        store
            .insert_predicate(PredicateSet::new("anchor", vec![n(1)]))
            .expect("insert");
        store
            .insert_predicate(PredicateSet::new("five", vec![n(5)]))
            .expect("insert");

        let mut builder = PatternBuilder::new(&store);
        let a = builder.variable("A").expect("var");
        let b = builder.variable("B").expect("var");
        builder.predicate(a, "anchor").expect("predicate");
        builder.predicate(b, "five").expect("predicate");
        builder.edge(a, b, "r").expect("edge");
        let mut pattern = builder.build().expect("build");
        assert!(pattern.search(100).is_empty());
    }

    /// T1.3: `distinct` rejects equal bindings and accepts unequal ones.
    #[test]
    fn distinct_ordering() {
        let mut store = RelationStore::new(NodeUniverse::with_size(10)).expect("store");
        store
            .insert_predicate(PredicateSet::new("four", vec![n(4)]))
            .expect("insert");
        store
            .insert_predicate(PredicateSet::new("four_or_nine", vec![n(4), n(9)]))
            .expect("insert");

        let mut builder = PatternBuilder::new(&store);
        let a = builder.variable("A").expect("var");
        let b = builder.variable("B").expect("var");
        builder.predicate(a, "four").expect("predicate");
        builder.predicate(b, "four_or_nine").expect("predicate");
        builder.ordering(a, b, Accepted::DISTINCT);
        let mut pattern = builder.build().expect("build");

        assert_eq!(pairs(&pattern.search(10), "A", "B"), vec![(4, 9)]);
    }

    /// T1.4: Strict dominance over the chain 0 -> 1 -> 2 -> 3.
    #[test]
    fn strict_dominance_on_chain() {
        let mut store = RelationStore::new(NodeUniverse::with_size(4)).expect("store");
        store
            .insert_relation(
                Relation::from_edges("cfg", 4, &[(0, 1), (1, 2), (2, 3)]).expect("relation"),
            )
            .expect("insert");
        store
            .insert_predicate(PredicateSet::new("one_or_three", vec![n(1), n(3)]))
            .expect("insert");

        let mut builder = PatternBuilder::new(&store);
        let a = builder.variable("A").expect("var");
        let b = builder.variable("B").expect("var");
        builder.predicate(a, "one_or_three").expect("predicate");
        builder.predicate(b, "one_or_three").expect("predicate");
        builder
            .dominates(a, b, "cfg", DominanceKind::STRICTLY_DOMINATE)
            .expect("dominance");
        let mut pattern = builder.build().expect("build");

        // (1, 3) holds; (3, 1) and (1, 1) do not; (3, 3) is not strict.
        assert_eq!(pairs(&pattern.search(10), "A", "B"), vec![(1, 3)]);
    }

    /// Chain 0 -> 1 -> 2 -> 3 with `all = {0, 1, 2, 3}`.
    fn chain_store() -> RelationStore {
        let mut store = RelationStore::new(NodeUniverse::with_size(4)).expect("store");
        store
            .insert_relation(
                Relation::from_edges("cfg", 4, &[(0, 1), (1, 2), (2, 3)]).expect("relation"),
            )
            .expect("insert");
        store
            .insert_predicate(PredicateSet::new("all", vec![n(0), n(1), n(2), n(3)]))
            .expect("insert");
        store
    }

    fn single_variable(
        store: &RelationStore,
        attach: impl FnOnce(&mut PatternBuilder<'_>, Variable),
    ) -> Vec<u32> {
        let mut builder = PatternBuilder::new(store);
        let x = builder.variable("x").expect("var");
        builder.predicate(x, "all").expect("predicate");
        attach(&mut builder, x);
        let mut pattern = builder.build().expect("build");
        pattern.search(usize::MAX).iter().map(|s| s.get("x").0).collect()
    }

    /// T1.5: A variable filling two slots of one constraint is checked at both.
    #[test]
    fn same_variable_in_both_slots() {
        let store = chain_store();
        let distinct = single_variable(&store, |b, x| {
            b.distinct(x, x);
        });
        let edge = single_variable(&store, |b, x| {
            b.edge(x, x, "cfg").expect("edge");
        });
        let strict = single_variable(&store, |b, x| {
            b.dominates(x, x, "cfg", DominanceKind::STRICTLY_DOMINATE)
                .expect("dominance");
        });
        assert!(distinct.is_empty());
        assert!(edge.is_empty());
        assert!(strict.is_empty());

        let same = single_variable(&store, |b, x| {
            b.same(x, x);
        });
        let reflexive = single_variable(&store, |b, x| {
            b.dominates(x, x, "cfg", DominanceKind::DOMINATE)
                .expect("dominance");
        });
        assert_eq!(same, vec![0, 1, 2, 3]);
        assert_eq!(reflexive, vec![0, 1, 2, 3]);
    }

    /// T1.6: `blocked` is strict: a target that is its own barrier fails.
    #[test]
    fn blocked_is_strict() {
        let store = chain_store();
        let mut builder = PatternBuilder::new(&store);
        let [from, through] = ["from", "through"].map(|name| builder.variable(name).expect("var"));
        builder.predicate(from, "all").expect("predicate");
        builder.edge(from, through, "cfg").expect("edge");
        builder
            .blocked(&[from], &[through], &[through], "cfg")
            .expect("blocked");
        assert!(builder.build().expect("build").search(usize::MAX).is_empty());

        let mut builder = PatternBuilder::new(&store);
        let [from, through, to] =
            ["from", "through", "to"].map(|name| builder.variable(name).expect("var"));
        builder.predicate(from, "all").expect("predicate");
        builder.edge(from, through, "cfg").expect("edge");
        builder.edge(through, to, "cfg").expect("edge");
        builder.blocked(&[from], &[through], &[to], "cfg").expect("blocked");
        let solutions = builder.build().expect("build").search(usize::MAX);
        assert_eq!(solutions.len(), 2);
    }

    /// T1.7: A disjunction binds every variable through one alternative.
    #[test]
    fn disjunction_alternatives_stay_whole() {
        let store = scenario_store();
        let mut builder = PatternBuilder::new(&store);
        let [x, y] = ["X", "Y"].map(|name| builder.variable(name).expect("var"));
        let mut forward = builder.alternative();
        forward.predicate(x, "is_even").expect("predicate");
        forward.edge(x, y, "next").expect("edge");
        let mut backward = builder.alternative();
        backward.edge(y, x, "next").expect("edge");
        backward.predicate(y, "is_even").expect("predicate");
        builder.any_of(vec![forward, backward]).expect("any_of");
        let mut pattern = builder.build().expect("build");

        assert_eq!(
            pairs(&pattern.search(usize::MAX), "X", "Y"),
            vec![(0, 1), (2, 3), (1, 0), (3, 2)]
        );
    }
}

// =============================================================================
// TIER T2: SEARCH CONTRACT
// =============================================================================

mod t2_search_contract {
    use super::*;

    fn odd_pairs_pattern(store: &RelationStore) -> idiomatch_core::Pattern<'_> {
        let mut builder = PatternBuilder::new(store);
        let x = builder.variable("X").expect("var");
        let y = builder.variable("Y").expect("var");
        builder.predicate(x, "odd").expect("predicate");
        builder.predicate(y, "odd").expect("predicate");
        builder.distinct(x, y);
        builder.build().expect("build")
    }

    fn odd_store() -> RelationStore {
        let mut store = RelationStore::new(NodeUniverse::with_size(8)).expect("store");
        store
            .insert_predicate(PredicateSet::new("odd", vec![n(1), n(3), n(5), n(7)]))
            .expect("insert");
        store
    }

    /// T2.1: Repeated searches return identical sequences.
    #[test]
    fn determinism() {
        let store = odd_store();
        let mut first = odd_pairs_pattern(&store);
        let mut second = odd_pairs_pattern(&store);
        let a = first.search(100);
        assert_eq!(a, second.search(100));
        assert_eq!(a, first.search(100));
    }

    /// T2.2: The cap bounds the result, and zero finds nothing.
    #[test]
    fn cap_respected() {
        let store = odd_store();
        let mut pattern = odd_pairs_pattern(&store);
        for k in 0..15 {
            assert!(pattern.search(k).len() <= k);
        }
        let (solutions, statistics) = pattern.search_with_statistics(0);
        assert!(solutions.is_empty());
        assert_eq!(statistics.fixations, 0);
    }

    /// T2.3: Raising the cap only appends solutions.
    #[test]
    fn monotonic_prefix() {
        let store = odd_store();
        let mut pattern = odd_pairs_pattern(&store);
        let mut previous = pattern.search(0);
        for k in 1..14 {
            let current = pattern.search(k);
            assert_eq!(&current[..previous.len()], previous.as_slice());
            previous = current;
        }
        assert_eq!(previous.len(), 12);
    }

    /// T2.4: Every solution satisfies each constraint on its own.
    #[test]
    fn soundness() {
        let store = odd_store();
        let mut pattern = odd_pairs_pattern(&store);
        let odd = store.predicate("odd").expect("predicate");
        for solution in pattern.search(100) {
            let (x, y) = (solution.get("X"), solution.get("Y"));
            assert!(odd.contains(x));
            assert!(odd.contains(y));
            assert_ne!(x, y);
        }
    }

    /// T2.5: Pruning twice equals pruning once.
    #[test]
    fn prune_idempotence() {
        let store = odd_store();
        let mut pattern = odd_pairs_pattern(&store);
        for solution in pattern.search(5) {
            let once = solution.prune(&["X"]);
            assert_eq!(once.prune(&["X"]), once);
            assert_eq!(once.len(), 1);
        }
    }

    /// T2.6: Sparse, huge and malformed index names render without padding.
    #[test]
    fn sparse_index_names_render() {
        let store = odd_store();
        let mut builder = PatternBuilder::new(&store);
        for name in ["slot[0]", "slot[4000000000]", "slot[18446744073709551615]", "bad[x"] {
            let variable = builder.variable(name).expect("var");
            builder.predicate(variable, "odd").expect("predicate");
        }
        let solutions = builder.build().expect("build").search(1);
        assert_eq!(solutions.len(), 1);

        let rendered: serde_json::Value =
            serde_json::from_str(&solutions[0].serialize()).expect("json");
        assert_eq!(
            rendered,
            serde_json::json!({
                "bad": { "[x": 1 },
                "slot": { "[0]": 1, "[4000000000]": 1, "[18446744073709551615]": 1 },
            })
        );
    }

    /// T2.7: An aliased constraint never admits a binding it would reject
    /// between two distinct variables.
    #[test]
    fn aliased_soundness() {
        let store = odd_store();
        let mut builder = PatternBuilder::new(&store);
        let x = builder.variable("X").expect("var");
        builder.predicate(x, "odd").expect("predicate");
        builder.ordering(x, x, Accepted::LESS);
        assert!(builder.build().expect("build").search(100).is_empty());
    }
}

// =============================================================================
// TIER T3: IDIOM SCENARIOS
// =============================================================================

mod t3_idiom_scenarios {
    use super::*;

    /// T3.1: Even node followed by its successor.
    #[test]
    fn even_successor_scenario() {
        let store = scenario_store();
        let mut builder = PatternBuilder::new(&store);
        let x = builder.variable("X").expect("var");
        let y = builder.variable("Y").expect("var");
        builder.predicate(x, "is_even").expect("predicate");
        builder.edge(x, y, "next").expect("edge");
        let mut pattern = builder.build().expect("build");

        assert_eq!(pairs(&pattern.search(10), "X", "Y"), vec![(0, 1), (2, 3)]);
    }

    /// T3.2: A reduction-shaped idiom: an add whose result feeds a phi that
    /// feeds the add back, inside a loop header that dominates both.
    #[test]
    fn reduction_cycle() {
        // 0: header, 1: phi, 2: add, 3: other add, 4: exit
        let universe = NodeUniverse::from_labels(
            ["header", "phi", "add", "add2", "exit"]
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
        );
        let mut store = RelationStore::new(universe).expect("store");
        store
            .insert_relation(
                Relation::from_ranked_edges("dfg", 5, 2, &[(0, 1, 2), (0, 2, 1), (1, 3, 3)])
                    .expect("dfg"),
            )
            .expect("insert");
        store
            .insert_relation(
                Relation::from_edges("cfg", 5, &[(0, 1), (1, 2), (2, 3), (3, 1), (3, 4)])
                    .expect("cfg"),
            )
            .expect("insert");
        store
            .insert_predicate(PredicateSet::new("is_add", vec![n(2), n(3)]))
            .expect("insert");
        store
            .insert_predicate(PredicateSet::new("is_phi", vec![n(1)]))
            .expect("insert");
        store
            .insert_predicate(PredicateSet::new("is_header", vec![n(0)]))
            .expect("insert");

        let mut builder = PatternBuilder::new(&store);
        let header = builder.variable("loop.header").expect("var");
        let phi = builder.variable("reduction.phi").expect("var");
        let add = builder.variable("reduction.add").expect("var");
        let unused = builder.variable("reduction.init").expect("var");
        builder.predicate(header, "is_header").expect("predicate");
        builder.predicate(phi, "is_phi").expect("predicate");
        builder.predicate(add, "is_add").expect("predicate");
        builder.ranked_edge(phi, add, "dfg", 0).expect("edge");
        builder.ranked_edge(add, phi, "dfg", 0).expect("edge");
        builder
            .dominates(header, add, "cfg", DominanceKind::STRICTLY_DOMINATE)
            .expect("dominance");
        builder.unused(unused);
        let mut pattern = builder.build().expect("build");

        let solutions = pattern.search(10);
        assert_eq!(solutions.len(), 1);
        let solution = &solutions[0];
        assert_eq!(solution.get("reduction.add"), n(2));
        assert_eq!(solution.get("reduction.init"), NodeRef::ABSENT);

        let rendered: serde_json::Value =
            serde_json::from_str(&solution.prune(&["reduction"]).serialize_labeled(store.universe()))
                .expect("json");
        assert_eq!(
            rendered,
            serde_json::json!({ "reduction": { "add": "add", "init": null, "phi": "phi" } })
        );
    }

    /// T3.3: Every path from the header to the exit passes the latch.
    #[test]
    fn blocked_paths() {
        let mut store = RelationStore::new(NodeUniverse::with_size(4)).expect("store");
        store
            .insert_relation(
                Relation::from_edges("cfg", 4, &[(0, 1), (1, 2), (2, 0), (2, 3)]).expect("cfg"),
            )
            .expect("insert");
        store
            .insert_predicate(PredicateSet::new("any", vec![n(0), n(1), n(2), n(3)]))
            .expect("insert");

        let mut builder = PatternBuilder::new(&store);
        let [from, through, to] =
            ["from", "through", "to"].map(|name| builder.variable(name).expect("var"));
        builder.predicate(from, "any").expect("predicate");
        builder.predicate(through, "any").expect("predicate");
        builder.predicate(to, "any").expect("predicate");
        builder.distinct(from, through);
        builder.distinct(through, to);
        builder.distinct(from, to);
        builder.blocked(&[from], &[through], &[to], "cfg").expect("blocked");
        let mut pattern = builder.build().expect("build");

        let solutions = pattern.search(100);
        let triples: Vec<(u32, u32, u32)> = solutions
            .iter()
            .map(|s| (s.get("from").0, s.get("through").0, s.get("to").0))
            .collect();
        assert!(triples.contains(&(0, 2, 3)));
        assert!(triples.contains(&(0, 1, 3)));
        assert!(!triples.contains(&(0, 3, 2)));
    }
}
