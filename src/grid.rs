//! Sparse per-coefficient storage and its conversion to a dense, sorted array.
//!
//! During parsing, cells are addressed by `(time, level, radius)` *discovery*
//! indices. [`SparseGrid::reorder`] moves them to *sorted* positions and lays
//! them out radius-major, `[radius][level][time]`, which is the order the
//! output variables are declared in.

use crate::error::{ConvertError, Result};
use std::collections::HashMap;

/// `(time, level, radius)` discovery indices.
pub type Cell = (usize, usize, usize);

/// Final axis sizes, known only after the input is exhausted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridExtent {
    pub times:  usize,
    pub levels: usize,
    pub radii:  usize,
}

impl GridExtent {
    pub fn cells(&self) -> usize {
        self.times * self.levels * self.radii
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseGrid {
    cells: HashMap<Cell, f32>,
}

impl SparseGrid {
    /// Write `value` at the cell, returning what was there before.
    pub fn store(&mut self, time: usize, level: usize, radius: usize, value: f32) -> Option<f32> {
        self.cells.insert((time, level, radius), value)
    }

    pub fn get(&self, time: usize, level: usize, radius: usize) -> Option<f32> {
        self.cells.get(&(time, level, radius)).copied()
    }

    /// Number of materialised cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Materialise every absent cell of `extent` with `fill_value`.
    /// Returns the number of cells that were added.
    pub fn fill(&mut self, extent: GridExtent, fill_value: f32) -> usize {
        let mut added = 0;
        for t in 0..extent.times {
            for l in 0..extent.levels {
                for r in 0..extent.radii {
                    self.cells.entry((t, l, r)).or_insert_with(|| {
                        added += 1;
                        fill_value
                    });
                }
            }
        }
        added
    }

    pub fn is_dense(&self, extent: GridExtent) -> bool {
        (0..extent.times).all(|t| {
            (0..extent.levels).all(|l| (0..extent.radii).all(|r| self.cells.contains_key(&(t, l, r))))
        })
    }

    /// Build the dense array. `level_order[i]` and `radius_order[j]` are the
    /// discovery indices of the i-th smallest level and j-th smallest radius.
    ///
    /// The output at sorted `(t, i, j)` is the cell at `(t, level_order[i], radius_order[j])`.
    /// Every addressed cell must exist; run [`SparseGrid::fill`] first.
    pub fn reorder(&self, times: usize, level_order: &[usize], radius_order: &[usize]) -> Result<DenseGrid> {
        let mut data = Vec::with_capacity(times * level_order.len() * radius_order.len());
        for &r in radius_order {
            for &l in level_order {
                for t in 0..times {
                    let v = self.get(t, l, r).ok_or(ConvertError::SparseCell {
                        time:   t,
                        level:  l,
                        radius: r,
                    })?;
                    data.push(v);
                }
            }
        }
        Ok(DenseGrid {
            radii:  radius_order.len(),
            levels: level_order.len(),
            times,
            data,
        })
    }
}

/// Rectangular `[radius][level][time]` array with axes in ascending-value order.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseGrid {
    radii:  usize,
    levels: usize,
    times:  usize,
    data:   Vec<f32>,
}

impl DenseGrid {
    /// `[radii, levels, times]`
    pub fn shape(&self) -> [usize; 3] {
        [self.radii, self.levels, self.times]
    }

    /// Value at sorted positions; `None` when out of range.
    pub fn get(&self, time: usize, level: usize, radius: usize) -> Option<f32> {
        if time >= self.times || level >= self.levels || radius >= self.radii {
            return None;
        }
        Some(self.data[(radius * self.levels + level) * self.times + time])
    }

    /// Flat values, radius-major.
    pub fn values(&self) -> &[f32] {
        &self.data
    }
}

/// Coefficient name → sparse grid, remembering the order names first appeared.
#[derive(Debug, Default)]
pub struct GridStore {
    grids:  Vec<(String, SparseGrid)>,
    lookup: HashMap<String, usize>,
}

impl GridStore {
    /// Last write wins; the previous value at the cell, if any, is returned.
    pub fn store(&mut self, name: &str, time: usize, level: usize, radius: usize, value: f32) -> Option<f32> {
        let slot = match self.lookup.get(name) {
            Some(&i) => i,
            None => {
                self.grids.push((name.to_string(), SparseGrid::default()));
                self.lookup.insert(name.to_string(), self.grids.len() - 1);
                self.grids.len() - 1
            }
        };
        self.grids[slot].1.store(time, level, radius, value)
    }

    pub fn get(&self, name: &str) -> Option<&SparseGrid> {
        self.lookup.get(name).map(|&i| &self.grids[i].1)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.grids.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.grids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grids.is_empty()
    }

    /// Hand over the grids in first-seen order.
    pub fn into_grids(self) -> Vec<(String, SparseGrid)> {
        self.grids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FILL: f32 = -999.0;

    #[test]
    fn test_store_out_of_order_and_last_write_wins() {
        let mut g = SparseGrid::default();
        assert_eq!(g.store(5, 1, 2, 1.0), None);
        assert_eq!(g.store(0, 0, 0, 2.0), None);
        assert_eq!(g.store(5, 1, 2, 3.0), Some(1.0));
        assert_eq!(g.get(5, 1, 2), Some(3.0));
        assert_eq!(g.get(1, 1, 1), None);
        assert_eq!(g.len(), 2);
    }

    #[test]
    fn test_fill_makes_grid_dense_and_is_idempotent() {
        let extent = GridExtent { times: 2, levels: 3, radii: 4 };
        let mut g = SparseGrid::default();
        g.store(1, 2, 3, 7.0);
        assert!(!g.is_dense(extent));

        assert_eq!(g.fill(extent, FILL), extent.cells() - 1);
        assert!(g.is_dense(extent));
        assert_eq!(g.get(1, 2, 3), Some(7.0));
        assert_eq!(g.get(0, 0, 0), Some(FILL));

        let before = g.clone();
        assert_eq!(g.fill(extent, FILL), 0);
        assert_eq!(g, before);
    }

    #[test]
    fn test_reorder_is_a_permutation() {
        // radius discovery indices 0 -> 2.0, 1 -> 1.0, 2 -> 1.5
        let mut g = SparseGrid::default();
        g.store(0, 0, 0, 20.0);
        g.store(0, 0, 1, 10.0);
        g.store(0, 0, 2, 15.0);
        let dense = g.reorder(1, &[0], &[1, 2, 0]).unwrap();
        assert_eq!(dense.shape(), [3, 1, 1]);
        assert_eq!(dense.values(), &[10.0, 15.0, 20.0]);
    }

    #[test]
    fn test_reorder_layout_is_radius_level_time() {
        let extent = GridExtent { times: 2, levels: 2, radii: 2 };
        let mut g = SparseGrid::default();
        for t in 0..2 {
            for l in 0..2 {
                for r in 0..2 {
                    g.store(t, l, r, (100 * t + 10 * l + r) as f32);
                }
            }
        }
        assert!(g.is_dense(extent));
        // levels discovered descending, radii ascending
        let dense = g.reorder(2, &[1, 0], &[0, 1]).unwrap();
        assert_eq!(dense.get(0, 0, 0), Some(10.0));
        assert_eq!(dense.get(1, 1, 1), Some(101.0));
        assert_eq!(dense.get(1, 0, 1), Some(111.0));
        assert_eq!(dense.get(2, 0, 0), None);
        assert_eq!(dense.values(), &[10.0, 110.0, 0.0, 100.0, 11.0, 111.0, 1.0, 101.0]);
    }

    #[test]
    fn test_reorder_rejects_sparse_grid() {
        let mut g = SparseGrid::default();
        g.store(0, 0, 0, 1.0);
        match g.reorder(1, &[0], &[0, 1]) {
            Err(ConvertError::SparseCell { time, level, radius }) => {
                assert_eq!((time, level, radius), (0, 0, 1));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_store_keeps_first_seen_name_order() {
        let mut s = GridStore::default();
        s.store("VTC0", 0, 0, 0, 1.0);
        s.store("VRC1", 0, 0, 0, 2.0);
        assert_eq!(s.store("VTC0", 0, 0, 0, 3.0), Some(1.0));
        assert_eq!(s.names().collect::<Vec<_>>(), vec!["VTC0", "VRC1"]);
        assert_eq!(s.get("VTC0").unwrap().get(0, 0, 0), Some(3.0));
        assert!(s.get("VTS1").is_none());
        assert_eq!(s.len(), 2);
    }
}
