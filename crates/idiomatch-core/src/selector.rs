//! # Constraints and Selectors
//!
//! [`Constraint`] is the closed set of constraint kinds the solver knows. It
//! dispatches the slot-addressed protocol to the concrete atom by `match`.
//!
//! A [`Selector`] binds one slot of a shared constraint and presents it as a
//! single-variable [`Atom`]. Several selectors over the same constraint
//! observe each other's fixations, which is how multi-variable constraints
//! see their partner bindings.
//!
//! When one variable fills several slots of the same constraint, its
//! selectors carry the other slots as aliases. An accepted candidate is then
//! bound at its own slot and offered at every alias before it counts as
//! valid, so `distinct(x, x)` or `edge(x, x)` are checked rather than passing
//! with an unbound partner.

use crate::atoms::{
    Atom, Backend, DominanceAtom, EdgeAtom, OrderingAtom, PredicateAtom, SameSetAtom, SkipResult,
    Slot,
};
use crate::{Conjunction, Disjunction, NodeRef};
use std::cell::RefCell;
use std::rc::Rc;

/// Every constraint kind the solver understands.
#[derive(Debug)]
pub enum Constraint<'a> {
    Edge(EdgeAtom<'a>),
    Ordering(OrderingAtom),
    Dominance(DominanceAtom<'a>),
    Predicate(PredicateAtom<'a>),
    SameSet(SameSetAtom),
    Conjunction(Conjunction<'a>),
    Disjunction(Disjunction<'a>),
}

/// A constraint shared between the selectors of its slots.
pub type SharedConstraint<'a> = Rc<RefCell<Constraint<'a>>>;

impl<'a> Constraint<'a> {
    /// Wrap the constraint for sharing between selectors.
    #[must_use]
    pub fn shared(self) -> SharedConstraint<'a> {
        Rc::new(RefCell::new(self))
    }

    fn backend(&mut self) -> &mut dyn Backend {
        match self {
            Self::Edge(atom) => atom,
            Self::Ordering(atom) => atom,
            Self::Dominance(atom) => atom,
            Self::Predicate(atom) => atom,
            Self::SameSet(atom) => atom,
            Self::Conjunction(atom) => atom,
            Self::Disjunction(atom) => atom,
        }
    }
}

impl Backend for Constraint<'_> {
    fn begin(&mut self, slot: Slot) {
        self.backend().begin(slot);
    }

    fn skip_invalid(&mut self, slot: Slot, candidate: &mut NodeRef) -> SkipResult {
        self.backend().skip_invalid(slot, candidate)
    }

    fn fixate(&mut self, slot: Slot, value: NodeRef) {
        self.backend().fixate(slot, value);
    }

    fn resume(&mut self, slot: Slot) {
        self.backend().resume(slot);
    }

    fn cancel(&mut self, slot: Slot) {
        self.backend().cancel(slot);
    }
}

impl<'a> From<EdgeAtom<'a>> for Constraint<'a> {
    fn from(atom: EdgeAtom<'a>) -> Self {
        Self::Edge(atom)
    }
}

impl From<OrderingAtom> for Constraint<'_> {
    fn from(atom: OrderingAtom) -> Self {
        Self::Ordering(atom)
    }
}

impl<'a> From<DominanceAtom<'a>> for Constraint<'a> {
    fn from(atom: DominanceAtom<'a>) -> Self {
        Self::Dominance(atom)
    }
}

impl<'a> From<PredicateAtom<'a>> for Constraint<'a> {
    fn from(atom: PredicateAtom<'a>) -> Self {
        Self::Predicate(atom)
    }
}

impl From<SameSetAtom> for Constraint<'_> {
    fn from(atom: SameSetAtom) -> Self {
        Self::SameSet(atom)
    }
}

impl<'a> From<Conjunction<'a>> for Constraint<'a> {
    fn from(atom: Conjunction<'a>) -> Self {
        Self::Conjunction(atom)
    }
}

impl<'a> From<Disjunction<'a>> for Constraint<'a> {
    fn from(atom: Disjunction<'a>) -> Self {
        Self::Disjunction(atom)
    }
}

// =============================================================================
// SELECTOR
// =============================================================================

/// One slot of a shared constraint, seen as a single-variable atom.
#[derive(Debug)]
pub struct Selector<'a> {
    constraint: SharedConstraint<'a>,
    slot: Slot,
    aliases: Vec<Slot>,
}

impl<'a> Selector<'a> {
    #[must_use]
    pub fn new(constraint: &SharedConstraint<'a>, slot: Slot) -> Self {
        Self {
            constraint: Rc::clone(constraint),
            slot,
            aliases: Vec::new(),
        }
    }

    /// Other slots of the same constraint filled by this selector's variable.
    #[must_use]
    pub fn with_aliases(mut self, aliases: Vec<Slot>) -> Self {
        self.aliases = aliases;
        self
    }

    #[must_use]
    pub fn scalar(constraint: &SharedConstraint<'a>, index: usize) -> Self {
        Self::new(constraint, Slot::scalar(index))
    }

    #[must_use]
    pub fn slot(&self) -> Slot {
        self.slot
    }

    #[must_use]
    pub fn aliases(&self) -> &[Slot] {
        &self.aliases
    }
}

/// Bind `value` at `slot`, then offer it at each alias in turn, binding
/// every alias that accepts it. All temporary bindings are retracted again.
fn holds_at_aliases(
    constraint: &mut Constraint<'_>,
    slot: Slot,
    aliases: &[Slot],
    value: NodeRef,
) -> bool {
    constraint.fixate(slot, value);
    let mut bound = 0;
    for &alias in aliases {
        let mut offered = value;
        if constraint.skip_invalid(alias, &mut offered) != SkipResult::Pass {
            break;
        }
        constraint.fixate(alias, value);
        bound += 1;
    }
    for &alias in aliases[..bound].iter().rev() {
        constraint.resume(alias);
    }
    constraint.resume(slot);
    bound == aliases.len()
}

impl Atom for Selector<'_> {
    fn begin(&mut self) {
        self.constraint.borrow_mut().begin(self.slot);
    }

    fn skip_invalid(&mut self, candidate: &mut NodeRef) -> SkipResult {
        let mut constraint = self.constraint.borrow_mut();
        if self.aliases.is_empty() {
            return constraint.skip_invalid(self.slot, candidate);
        }

        let advancing = candidate.is_unbound();
        loop {
            let result = constraint.skip_invalid(self.slot, candidate);
            match result {
                SkipResult::Pass | SkipResult::ChangePass if !candidate.is_unbound() => {
                    if holds_at_aliases(&mut constraint, self.slot, &self.aliases, *candidate) {
                        return result;
                    }
                    if !advancing {
                        return SkipResult::Fail;
                    }
                    *candidate = NodeRef::UNBOUND;
                }
                _ => return result,
            }
        }
    }

    fn fixate(&mut self, value: NodeRef) {
        self.constraint.borrow_mut().fixate(self.slot, value);
    }

    fn resume(&mut self) {
        self.constraint.borrow_mut().resume(self.slot);
    }

    fn cancel(&mut self) {
        self.constraint.borrow_mut().cancel(self.slot);
    }
}
