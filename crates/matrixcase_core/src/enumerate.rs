//! Cartesian-product enumeration with a mixed-radix odometer.
//!
//! One index per parameter starts at 0. After each yielded tuple the last index is incremented; when it reaches its
//! list's length it resets to 0 and carries into the position to its left. Enumeration ends once a carry runs past
//! the first position. The last parameter therefore varies fastest and the first slowest.

use std::iter::FusedIterator;

use crate::value::Value;

/// Number of combinations, or `None` when the product overflows `usize`.
pub fn combination_count<L: AsRef<[Value]>>(value_lists: &[L]) -> Option<usize> {
    value_lists
        .iter()
        .try_fold(1usize, |acc, list| acc.checked_mul(list.as_ref().len()))
}

/// Start a fresh traversal over `value_lists`. The input is only borrowed and can be enumerated again.
pub fn enumerate<L: AsRef<[Value]>>(value_lists: &[L]) -> Combinations<'_, L> {
    Combinations::new(value_lists)
}

/// Lazy sequence of argument tuples, one per combination.
#[derive(Debug, Clone)]
pub struct Combinations<'a, L> {
    value_lists: &'a [L],
    index: Vec<usize>,
    remaining: Option<usize>,
    done: bool,
}

impl<'a, L: AsRef<[Value]>> Combinations<'a, L> {
    fn new(value_lists: &'a [L]) -> Self {
        Self {
            value_lists,
            index: vec![0; value_lists.len()],
            remaining: combination_count(value_lists),
            done: value_lists.iter().any(|list| list.as_ref().is_empty()),
        }
    }

    /// The current odometer reading: one selected position per parameter.
    pub fn position(&self) -> &[usize] {
        &self.index
    }

    fn advance(&mut self) {
        for pos in (0..self.index.len()).rev() {
            self.index[pos] += 1;
            if self.index[pos] < self.value_lists[pos].as_ref().len() {
                return;
            }
            self.index[pos] = 0;
        }
        self.done = true;
    }
}

impl<L: AsRef<[Value]>> Iterator for Combinations<'_, L> {
    type Item = Vec<Value>;

    fn next(&mut self) -> Option<Vec<Value>> {
        if self.done {
            return None;
        }
        let tuple = self
            .value_lists
            .iter()
            .zip(&self.index)
            .map(|(list, &i)| list.as_ref()[i].clone())
            .collect();
        self.advance();
        if let Some(remaining) = self.remaining.as_mut() {
            *remaining = remaining.saturating_sub(1);
        }
        Some(tuple)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match (self.done, self.remaining) {
            (true, _) => (0, Some(0)),
            (false, Some(n)) => (n, Some(n)),
            (false, None) => (0, None),
        }
    }
}

impl<L: AsRef<[Value]>> FusedIterator for Combinations<'_, L> {}
