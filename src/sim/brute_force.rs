use macroquad::prelude::Vec2;

use super::NeighborSearch;
use crate::boid::Boid;
use crate::flock::WorldBounds;

/// Every boid is a candidate; the O(n) scan per query.
pub struct BruteForceNeighborSearch;

impl NeighborSearch for BruteForceNeighborSearch {
    fn rebuild(&mut self, _boids: &[Boid], _bounds: &WorldBounds) {
        // Nothing to rebuild for brute force.
    }

    fn candidates(&self, boids: &[Boid], _pos: Vec2, _radius: f32) -> Vec<usize> {
        (0..boids.len()).collect()
    }

    fn name(&self) -> &'static str {
        "BruteForce"
    }
}
