use macroquad::prelude::Vec2;
use rand::Rng;
use rand_distr::{Distribution, UnitCircle};

use crate::boid::{heading_color, Boid};
use crate::config::SimConfig;
use crate::sim::geometry::DistanceMetric;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WorldBounds {
    pub w: f32,
    pub h: f32,
    pub metric: DistanceMetric,
}

impl WorldBounds {
    pub fn from_config(config: &SimConfig) -> Self {
        Self {
            w: config.world_width,
            h: config.world_height,
            metric: config.metric,
        }
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= 0.0 && p.x < self.w && p.y >= 0.0 && p.y < self.h
    }
}

/// Complete world state at one time step. Never modified once built; the
/// scheduler shares it behind an `Arc` with every update task and the renderer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Generation {
    index: u64,
    prey: Vec<Boid>,
    predators: Vec<Boid>,
}

impl Generation {
    pub fn new(index: u64, prey: Vec<Boid>, predators: Vec<Boid>) -> Self {
        Self {
            index,
            prey,
            predators,
        }
    }

    /// Number of frames computed before this one; the spawned state is 0.
    pub fn index(&self) -> u64 {
        self.index
    }

    pub fn prey(&self) -> &[Boid] {
        &self.prey
    }

    pub fn predators(&self) -> &[Boid] {
        &self.predators
    }

    pub fn len(&self) -> usize {
        self.prey.len() + self.predators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Random initial population for `config`, reproducible from `rng`.
    pub fn new_random_with_rng<R: Rng>(config: &SimConfig, rng: &mut R) -> Self {
        let bounds = WorldBounds::from_config(config);

        let prey = (0..config.prey_count)
            .map(|_| {
                let (pos, vel) =
                    random_motion(&bounds, config.spawn_speed, config.speed_limit, rng);
                let mut boid = Boid::prey(pos, vel);
                boid.color = heading_color(boid.heading());
                boid
            })
            .collect();

        let predator_floor = config.spawn_speed.min(config.predator_speed_limit);
        let predators = (0..config.predator_count)
            .map(|_| {
                let (pos, vel) =
                    random_motion(&bounds, predator_floor, config.predator_speed_limit, rng);
                Boid::predator(pos, vel)
            })
            .collect();

        Self::new(0, prey, predators)
    }
}

fn random_motion<R: Rng>(
    bounds: &WorldBounds,
    min_speed: f32,
    max_speed: f32,
    rng: &mut R,
) -> (Vec2, Vec2) {
    let x = rng.random_range(0.0..bounds.w);
    let y = rng.random_range(0.0..bounds.h);
    let [dx, dy]: [f32; 2] = UnitCircle.sample(rng);
    let speed = if max_speed > min_speed {
        rng.random_range(min_speed..=max_speed)
    } else {
        max_speed
    };
    (Vec2::new(x, y), Vec2::new(dx, dy) * speed)
}
