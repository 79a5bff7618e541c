//! First-seen indexing of level and radius values.
//!
//! Values get a *discovery index* in arrival order. The *sorted order* is only
//! meaningful once input is exhausted, so it is computed on demand and never
//! cached.

use log::warn;
use std::collections::HashMap;

/// Exact-equality key for an axis value. `-0.0` and `0.0` share a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct AxisKey(u64);

impl AxisKey {
    fn new(value: f64) -> Self {
        let v = if value == 0.0 { 0.0 } else { value };
        AxisKey(v.to_bits())
    }
}

#[derive(Debug, Clone, Default)]
pub struct AxisIndexer {
    name:   &'static str,
    values: Vec<f64>,
    index:  HashMap<AxisKey, usize>,
}

impl AxisIndexer {
    pub fn new(name: &'static str) -> Self {
        Self { name, ..Default::default() }
    }

    /// Return the discovery index of `value`, assigning the next one if unseen.
    pub fn push(&mut self, value: f64) -> usize {
        let next = self.values.len();
        let idx = *self.index.entry(AxisKey::new(value)).or_insert(next);
        if idx == next {
            self.values.push(if value == 0.0 { 0.0 } else { value });
        }
        idx
    }

    pub fn get(&self, value: f64) -> Option<usize> {
        self.index.get(&AxisKey::new(value)).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Values in discovery order.
    pub fn discovered(&self) -> &[f64] {
        &self.values
    }

    /// Maps sorted position to discovery index.
    pub fn sorted_order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.values.len()).collect();
        order.sort_by(|&a, &b| self.values[a].total_cmp(&self.values[b]));
        order
    }

    /// Values in ascending order.
    pub fn sorted_values(&self) -> Vec<f64> {
        self.sorted_order().into_iter().map(|i| self.values[i]).collect()
    }

    /// Adjacent sorted values closer than `epsilon * max(1, |a|)`.
    pub fn near_duplicates(&self, epsilon: f64) -> Vec<(f64, f64)> {
        let sorted = self.sorted_values();
        sorted
            .windows(2)
            .filter(|w| (w[1] - w[0]) < epsilon * w[0].abs().max(1.0))
            .map(|w| (w[0], w[1]))
            .collect()
    }

    /// Log every near-duplicate pair; returns how many were found.
    pub fn warn_near_duplicates(&self, epsilon: f64) -> usize {
        let pairs = self.near_duplicates(epsilon);
        for (a, b) in &pairs {
            warn!(
                "{} axis: {a} and {b} are distinct entries but differ by less than {epsilon}",
                self.name
            );
        }
        pairs.len()
    }
}

/// Minimum and maximum of an ascending slice.
pub fn bounds(sorted: &[f64]) -> Option<(f64, f64)> {
    Some((*sorted.first()?, *sorted.last()?))
}
