//! Parallel flocking simulation with prey, predators and a wrap-around world.
//!
//! Each frame the [`Sim`] scheduler computes every boid of the next
//! [`Generation`] from the previous one in parallel and publishes it as an
//! immutable snapshot for the renderer.

pub mod boid;
pub mod config;
pub mod flock;
pub mod sim;

pub use boid::{Boid, Class};
pub use config::{ConfigError, Preset, RuleParams, SearchStrategy, SimConfig};
pub use flock::{Generation, WorldBounds};
pub use sim::geometry::DistanceMetric;
pub use sim::{BoidSim, NeighborSearch, Sim, SimError, StepReport};
