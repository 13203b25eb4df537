//! Pareto sets.
//!
//! A [`ParetoSet`] keeps only elements no other element dominates. The
//! comparison is supplied per call so the same container serves stop
//! frontiers, the route bag and the destination set.

use super::criteria::{DominanceModel, Labelled};
use super::direction::SearchDirection;

/// Dominance relation for a Pareto set.
pub trait ParetoComparator<T> {
    /// True when `a` dominates `b`.
    fn dominates(&self, a: &T, b: &T) -> bool;

    /// True when `a` and `b` are equal on every compared criterion.
    fn same_criteria(&self, a: &T, b: &T) -> bool;
}

/// Compares anything [`Labelled`] with a [`DominanceModel`].
#[derive(Debug, Clone, Copy)]
pub struct LabelComparator {
    pub model: DominanceModel,
    pub direction: SearchDirection,
}

impl LabelComparator {
    pub fn new(model: DominanceModel, direction: SearchDirection) -> Self {
        Self { model, direction }
    }
}

impl<T: Labelled> ParetoComparator<T> for LabelComparator {
    fn dominates(&self, a: &T, b: &T) -> bool {
        self.model.dominates(self.direction, a.label(), b.label())
    }

    fn same_criteria(&self, a: &T, b: &T) -> bool {
        self.model.same_criteria(self.direction, a.label(), b.label())
    }
}

/// A set of mutually non-dominated elements.
#[derive(Debug, Clone)]
pub struct ParetoSet<T> {
    elements: Vec<T>,
}

impl<T> Default for ParetoSet<T> {
    fn default() -> Self {
        Self {
            elements: Vec::new(),
        }
    }
}

impl<T> ParetoSet<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `candidate` unless an element dominates it or has the same
    /// criteria. Elements the candidate dominates are removed.
    ///
    /// Returns true when the candidate was added.
    pub fn insert<C: ParetoComparator<T>>(&mut self, comparator: &C, candidate: T) -> bool {
        let rejected = self.elements.iter().any(|existing| {
            comparator.dominates(existing, &candidate)
                || comparator.same_criteria(existing, &candidate)
        });
        if rejected {
            return false;
        }

        self.elements
            .retain(|existing| !comparator.dominates(&candidate, existing));
        self.elements.push(candidate);
        true
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.elements.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.elements.iter_mut()
    }

    pub fn clear(&mut self) {
        self.elements.clear();
    }

    pub fn into_vec(self) -> Vec<T> {
        self.elements
    }
}

impl<'a, T> IntoIterator for &'a ParetoSet<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}
