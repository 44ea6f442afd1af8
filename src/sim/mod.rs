use std::sync::Arc;

use macroquad::prelude::Vec2;

use crate::boid::Boid;
use crate::config::SearchStrategy;
use crate::flock::{Generation, WorldBounds};

pub trait BoidSim {
    /// Compute and publish the next generation.
    fn step(&mut self) -> StepReport;

    /// The latest published generation.
    fn snapshot(&self) -> Arc<Generation>;
}

/// A pluggable neighbor query that can be swapped without touching boid update logic.
pub trait NeighborSearch: Send + Sync {
    /// Rebuild internal structures based on the current boid positions.
    fn rebuild(&mut self, boids: &[Boid], bounds: &WorldBounds);

    /// Indices of every boid that may lie within `radius` of `pos`.
    ///
    /// May return extra boids but never misses one, under any distance metric;
    /// exact filtering happens in [`neighbors::query_neighbors`].
    fn candidates(&self, boids: &[Boid], pos: Vec2, radius: f32) -> Vec<usize>;

    /// Human-readable name for display/debugging.
    fn name(&self) -> &'static str;
}

/// Build the search for one agent pool; `cell_size` is the widest radius it
/// will be queried with.
pub fn build_search(strategy: SearchStrategy, cell_size: f32) -> Box<dyn NeighborSearch> {
    match strategy {
        SearchStrategy::BruteForce => Box::new(BruteForceNeighborSearch),
        SearchStrategy::SpatialHash => Box::new(SpatialHashNeighborSearch::new(cell_size)),
    }
}

mod brute_force;
mod engine;
pub mod forces;
pub mod geometry;
pub mod neighbors;
mod spatial_hashing;
pub mod update;

pub use brute_force::BruteForceNeighborSearch;
pub use engine::{mean_velocity, Sim, SimError, StepReport};
pub use spatial_hashing::SpatialHashNeighborSearch;
