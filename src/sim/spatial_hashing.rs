use std::collections::HashMap;

use macroquad::prelude::Vec2;

use super::NeighborSearch;
use crate::boid::Boid;
use crate::flock::WorldBounds;

/// Spatial hashing–based neighbor search over a grid that wraps at the world edges.
///
/// The world is split into whole columns and rows at least `cell_size` wide, so
/// cells stay uniform across the seam. `cell_size` should be on the order of
/// the query radius.
pub struct SpatialHashNeighborSearch {
    pub cell_size: f32,
    cols: i32,
    rows: i32,
    cell_w: f32,
    cell_h: f32,
    grid: HashMap<(i32, i32), Vec<usize>>,
}

impl SpatialHashNeighborSearch {
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size: cell_size.max(1e-3),
            cols: 1,
            rows: 1,
            cell_w: 1.0,
            cell_h: 1.0,
            grid: HashMap::new(),
        }
    }

    #[inline]
    fn cell_of(&self, pos: Vec2) -> (i32, i32) {
        let cx = ((pos.x / self.cell_w).floor() as i32).clamp(0, self.cols - 1);
        let cy = ((pos.y / self.cell_h).floor() as i32).clamp(0, self.rows - 1);
        (cx, cy)
    }

    /// Wrapped cell coordinates within `reach` of `center` on an axis of `count` cells.
    fn span(center: i32, reach: i32, count: i32) -> Vec<i32> {
        if 2 * reach + 1 >= count {
            (0..count).collect()
        } else {
            (center - reach..=center + reach)
                .map(|c| c.rem_euclid(count))
                .collect()
        }
    }
}

impl NeighborSearch for SpatialHashNeighborSearch {
    fn rebuild(&mut self, boids: &[Boid], bounds: &WorldBounds) {
        self.cols = ((bounds.w / self.cell_size).floor() as i32).max(1);
        self.rows = ((bounds.h / self.cell_size).floor() as i32).max(1);
        self.cell_w = bounds.w / self.cols as f32;
        self.cell_h = bounds.h / self.rows as f32;

        self.grid.clear();
        for (i, boid) in boids.iter().enumerate() {
            let cell = self.cell_of(boid.pos);
            self.grid.entry(cell).or_default().push(i);
        }
    }

    fn candidates(&self, _boids: &[Boid], pos: Vec2, radius: f32) -> Vec<usize> {
        if radius <= 0.0 {
            return Vec::new();
        }
        let (cx, cy) = self.cell_of(pos);
        let reach_x = (radius / self.cell_w).ceil() as i32;
        let reach_y = (radius / self.cell_h).ceil() as i32;
        let ys = Self::span(cy, reach_y, self.rows);

        let mut out = Vec::new();
        for x in Self::span(cx, reach_x, self.cols) {
            for &y in &ys {
                if let Some(indices) = self.grid.get(&(x, y)) {
                    out.extend_from_slice(indices);
                }
            }
        }
        out
    }

    fn name(&self) -> &'static str {
        "SpatialHash"
    }
}
