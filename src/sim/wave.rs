//! Damped 2D wave field
//!
//! Two-buffer leapfrog integrator. Slot `current` holds the heights at step
//! n; the other slot holds step n-1 and is overwritten in place with step
//! n+1, after which the roles swap. Edge cells are pinned to zero every step
//! so reflections are absorbed.
//!
//! Heights are never clamped here; display clamping belongs to the composer.

use crate::consts::RIPPLE_NEIGHBOR_SHARE;

#[derive(Debug, Clone)]
pub struct WaveField {
    cols: usize,
    rows: usize,
    damping: f32,
    buffers: [Vec<f32>; 2],
    /// Index of the buffer holding the latest heights
    current: usize,
}

impl WaveField {
    pub fn new(cols: usize, rows: usize, damping: f32) -> Self {
        let len = cols * rows;
        Self {
            cols,
            rows,
            damping,
            buffers: [vec![0.0; len], vec![0.0; len]],
            current: 0,
        }
    }

    #[inline]
    fn idx(&self, col: usize, row: usize) -> usize {
        col * self.rows + row
    }

    #[inline]
    pub fn damping(&self) -> f32 {
        self.damping
    }

    /// Latest heights, same indexing as the grid
    #[inline]
    pub fn current(&self) -> &[f32] {
        &self.buffers[self.current]
    }

    /// Heights from the step before
    #[inline]
    pub fn previous(&self) -> &[f32] {
        &self.buffers[self.current ^ 1]
    }

    #[inline]
    pub fn height(&self, col: usize, row: usize) -> f32 {
        self.buffers[self.current][self.idx(col, row)]
    }

    /// Zero both buffers
    pub fn reset(&mut self) {
        for buf in &mut self.buffers {
            buf.fill(0.0);
        }
    }

    /// Whether a ripple of `radius` cells fits at `(col, row)`
    pub fn ripple_fits(&self, col: usize, row: usize, radius: usize) -> bool {
        let radius = radius.max(1);
        col >= radius
            && row >= radius
            && col.saturating_add(radius) < self.cols
            && row.saturating_add(radius) < self.rows
    }

    /// Disturb the current buffer at `(col, row)` and its four neighbours.
    ///
    /// Returns `false` (and changes nothing) when the cell is closer than
    /// `radius` cells to an edge.
    pub fn add_ripple(&mut self, col: usize, row: usize, strength: f32, radius: usize) -> bool {
        if !self.ripple_fits(col, row, radius) {
            return false;
        }
        let rows = self.rows;
        let center = self.idx(col, row);
        let share = strength * RIPPLE_NEIGHBOR_SHARE;
        let buf = &mut self.buffers[self.current];
        buf[center] += strength;
        buf[center - rows] += share;
        buf[center + rows] += share;
        buf[center - 1] += share;
        buf[center + 1] += share;
        true
    }

    /// Advance one step and swap roles
    pub fn step(&mut self) {
        let (cols, rows, damping) = (self.cols, self.rows, self.damping);
        if cols == 0 || rows == 0 {
            return;
        }
        let current = self.current;
        let [a, b] = &mut self.buffers;
        let (cur, next) = if current == 0 {
            (&a[..], &mut b[..])
        } else {
            (&b[..], &mut a[..])
        };

        if cols > 2 && rows > 2 {
            for x in 1..cols - 1 {
                for z in 1..rows - 1 {
                    let i = x * rows + z;
                    let neighbors = cur[i - rows] + cur[i + rows] + cur[i - 1] + cur[i + 1];
                    next[i] = damping * (neighbors * 0.5 - next[i]);
                }
            }
        }

        // Absorbing boundary
        for x in 0..cols {
            next[x * rows] = 0.0;
            next[x * rows + rows - 1] = 0.0;
        }
        for z in 0..rows {
            next[z] = 0.0;
            next[(cols - 1) * rows + z] = 0.0;
        }

        self.current ^= 1;
    }

    /// Discrete energy of the scheme:
    /// `Σ cur² + d·Σ prev² − d·Σ cur·(½ · neighbour sum of prev)`.
    ///
    /// With zero edges this shrinks by exactly a factor of `damping` per step.
    pub fn energy(&self) -> f64 {
        let (cols, rows) = (self.cols, self.rows);
        let d = self.damping as f64;
        let cur = self.current();
        let prev = self.previous();

        let mut sum_cur = 0.0f64;
        let mut sum_prev = 0.0f64;
        for i in 0..cur.len() {
            sum_cur += (cur[i] as f64).powi(2);
            sum_prev += (prev[i] as f64).powi(2);
        }

        let mut coupling = 0.0f64;
        if cols > 2 && rows > 2 {
            for x in 1..cols - 1 {
                for z in 1..rows - 1 {
                    let i = x * rows + z;
                    let neighbors = prev[i - rows] + prev[i + rows] + prev[i - 1] + prev[i + 1];
                    coupling += cur[i] as f64 * neighbors as f64 * 0.5;
                }
            }
        }

        sum_cur + d * sum_prev - d * coupling
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn is_edge(field: &WaveField, i: usize) -> bool {
        let (c, r) = (i / field.rows, i % field.rows);
        c == 0 || r == 0 || c == field.cols - 1 || r == field.rows - 1
    }

    #[test]
    fn test_ripple_pattern() {
        let mut field = WaveField::new(10, 10, 0.95);
        assert!(field.add_ripple(4, 5, 2.0, 2));
        assert_eq!(field.height(4, 5), 2.0);
        assert_eq!(field.height(3, 5), 1.0);
        assert_eq!(field.height(5, 5), 1.0);
        assert_eq!(field.height(4, 4), 1.0);
        assert_eq!(field.height(4, 6), 1.0);
        assert_eq!(field.height(5, 6), 0.0);
    }

    #[test]
    fn test_ripple_rejected_near_edge() {
        let mut field = WaveField::new(10, 10, 0.95);
        assert!(!field.add_ripple(1, 5, 1.0, 2));
        assert!(!field.add_ripple(5, 8, 1.0, 2));
        assert!(!field.add_ripple(0, 0, 1.0, 0));
        assert!(!field.add_ripple(5, 5, 1.0, usize::MAX));
        assert!(field.current().iter().all(|&h| h == 0.0));
        assert!(field.add_ripple(1, 1, 1.0, 1));
    }

    #[test]
    fn test_neighbors_equal_after_one_step() {
        let mut field = WaveField::new(10, 10, 0.95);
        field.add_ripple(5, 5, 2.0, 2);
        field.step();

        let n = [
            field.height(4, 5),
            field.height(6, 5),
            field.height(5, 4),
            field.height(5, 6),
        ];
        assert!(n[0] != 0.0);
        assert!(n.iter().all(|&h| h == n[0]));
        // Positive ripple with positive damping pushes the neighbours up
        assert!(n[0] > 0.0);
        assert!((n[0] - 0.95).abs() < 1e-6);

        let mut sunk = WaveField::new(10, 10, 0.95);
        sunk.add_ripple(5, 5, -2.0, 2);
        sunk.step();
        assert!(sunk.height(4, 5) < 0.0);
    }

    #[test]
    fn test_step_swaps_roles() {
        let mut field = WaveField::new(6, 6, 0.95);
        field.add_ripple(3, 3, 1.0, 1);
        let before = field.current().to_vec();
        field.step();
        assert_eq!(field.previous(), before.as_slice());
    }

    #[test]
    fn test_energy_decays_by_damping() {
        let mut field = WaveField::new(12, 9, 0.97);
        field.add_ripple(6, 4, 1.5, 2);
        field.add_ripple(3, 3, -0.7, 2);
        let mut e = field.energy();
        assert!(e > 0.0);
        for _ in 0..50 {
            field.step();
            let next = field.energy();
            assert!((next - 0.97 * e).abs() < 1e-4 * e.max(1e-3));
            e = next;
        }
    }

    #[test]
    fn test_tiny_grid_steps_without_panicking() {
        let mut field = WaveField::new(2, 1, 0.95);
        field.step();
        assert!(field.current().iter().all(|&h| h == 0.0));
    }

    fn interior_field(cols: usize, rows: usize, damping: f32, cur: &[f32], prev: &[f32]) -> WaveField {
        let mut field = WaveField::new(cols, rows, damping);
        for i in 0..cols * rows {
            if !is_edge(&field, i) {
                field.buffers[0][i] = cur[i];
                field.buffers[1][i] = prev[i];
            }
        }
        field
    }

    proptest! {
        #[test]
        fn prop_energy_non_increasing(
            cols in 3usize..14,
            rows in 3usize..14,
            damping in 0.9005f32..0.9985,
            cur in prop::collection::vec(-2.0f32..2.0, 196),
            prev in prop::collection::vec(-2.0f32..2.0, 196),
        ) {
            let mut field = interior_field(cols, rows, damping, &cur, &prev);
            let e0 = field.energy();
            let tol = 1e-4 * e0.max(1e-6);
            let mut e = e0;
            for _ in 0..100 {
                field.step();
                let next = field.energy();
                prop_assert!(next <= e + tol, "energy rose from {} to {}", e, next);
                e = next;
            }
            prop_assert!(e <= e0 + tol);
        }

        #[test]
        fn prop_edges_zero_after_step(
            cols in 2usize..12,
            rows in 2usize..12,
            cur in prop::collection::vec(-5.0f32..5.0, 144),
            prev in prop::collection::vec(-5.0f32..5.0, 144),
        ) {
            let mut field = WaveField::new(cols, rows, 0.95);
            let len = cols * rows;
            field.buffers[0].copy_from_slice(&cur[..len]);
            field.buffers[1].copy_from_slice(&prev[..len]);
            field.step();
            for i in 0..len {
                if is_edge(&field, i) {
                    prop_assert_eq!(field.current()[i], 0.0);
                }
            }
        }

        #[test]
        fn prop_ripple_touches_five_cells(
            col in 2usize..8,
            row in 2usize..8,
            strength in -3.0f32..3.0,
            seed in prop::collection::vec(-1.0f32..1.0, 100),
        ) {
            let mut field = WaveField::new(10, 10, 0.95);
            field.buffers[0].copy_from_slice(&seed);
            field.buffers[1].copy_from_slice(&seed);
            let before = field.current().to_vec();
            prop_assert!(field.add_ripple(col, row, strength, 2));

            let touched = [
                (col, row),
                (col - 1, row),
                (col + 1, row),
                (col, row - 1),
                (col, row + 1),
            ];
            for i in 0..100 {
                let cell = (i / 10, i % 10);
                if !touched.contains(&cell) {
                    prop_assert_eq!(field.current()[i].to_bits(), before[i].to_bits());
                }
                prop_assert_eq!(field.previous()[i].to_bits(), seed[i].to_bits());
            }
        }
    }
}
