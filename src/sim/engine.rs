use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, info, trace};
use macroquad::prelude::Vec2;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};
use thiserror::Error;

use super::forces::{predator_steering, prey_steering};
use super::neighbors::{query_neighbors, Neighborhood, Perception};
use super::update::{advance, wrap_position};
use super::{build_search, BoidSim, NeighborSearch};
use crate::boid::Boid;
use crate::config::{ConfigError, SimConfig};
use crate::flock::{Generation, WorldBounds};

#[derive(Debug, Error)]
pub enum SimError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("failed to start update workers: {0}")]
    ThreadPool(#[from] ThreadPoolBuildError),
}

/// Where the scheduler is within a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Idle,
    Dispatched,
    Collecting,
    Published,
}

impl Phase {
    /// The one phase allowed to follow this one.
    fn next(self) -> Self {
        match self {
            Phase::Idle => Phase::Dispatched,
            Phase::Dispatched => Phase::Collecting,
            Phase::Collecting => Phase::Published,
            Phase::Published => Phase::Idle,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepReport {
    pub generation: u64,
    pub prey: usize,
    pub predators: usize,
    pub elapsed: Duration,
}

pub struct Sim {
    config: SimConfig,
    bounds: WorldBounds,
    current: Arc<Generation>,
    prey_search: Box<dyn NeighborSearch>,
    predator_search: Box<dyn NeighborSearch>,
    pool: ThreadPool,
    phase: Phase,
}

impl Sim {
    /// Validate `config` and spawn its random initial population.
    pub fn new(config: SimConfig) -> Result<Self, SimError> {
        config.validate()?;
        let mut rng = StdRng::seed_from_u64(config.seed);
        let generation = Generation::new_random_with_rng(&config, &mut rng);
        Self::from_generation(config, generation)
    }

    /// Start from a prepared generation instead of a random one. Positions
    /// outside the world are wrapped back into it first.
    pub fn from_generation(config: SimConfig, generation: Generation) -> Result<Self, SimError> {
        config.validate()?;
        let bounds = WorldBounds::from_config(&config);
        let generation = wrap_into(generation, &bounds);

        let mut builder = ThreadPoolBuilder::new().thread_name(|i| format!("boids-update-{i}"));
        if let Some(threads) = config.threads {
            builder = builder.num_threads(threads);
        }
        let pool = builder.build()?;

        let prey_search = build_search(config.search, config.flock_radius().max(1.0));
        let predator_search = build_search(
            config.search,
            config.avoidance.radius.max(config.separation.radius).max(1.0),
        );

        info!(
            "simulation ready: {} prey, {} predators, {}x{} world, {:?} distance, {} search on {} threads",
            generation.prey().len(),
            generation.predators().len(),
            bounds.w,
            bounds.h,
            bounds.metric,
            prey_search.name(),
            pool.current_num_threads(),
        );

        Ok(Self {
            config,
            bounds,
            current: Arc::new(generation),
            prey_search,
            predator_search,
            pool,
            phase: Phase::Idle,
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn bounds(&self) -> &WorldBounds {
        &self.bounds
    }

    pub fn algo_name(&self) -> &'static str {
        self.prey_search.name()
    }

    fn advance_phase(&mut self) -> Phase {
        let next = self.phase.next();
        trace!("generation {}: {:?} -> {:?}", self.current.index(), self.phase, next);
        self.phase = next;
        next
    }
}

fn wrap_into(generation: Generation, bounds: &WorldBounds) -> Generation {
    let wrap = |b: &Boid| Boid {
        pos: wrap_position(b.pos, bounds),
        ..*b
    };
    let prey: Vec<Boid> = generation.prey().iter().map(wrap).collect();
    let predators: Vec<Boid> = generation.predators().iter().map(wrap).collect();
    let moved = prey
        .iter()
        .chain(&predators)
        .zip(generation.prey().iter().chain(generation.predators()))
        .filter(|(after, before)| after.pos != before.pos)
        .count();
    if moved > 0 {
        debug!("wrapped {moved} starting positions into the world");
    }
    Generation::new(generation.index(), prey, predators)
}

/// Read-only view every update task of one frame shares.
struct Frame<'a> {
    prev: &'a Generation,
    config: &'a SimConfig,
    bounds: &'a WorldBounds,
    prey_search: &'a dyn NeighborSearch,
    predator_search: &'a dyn NeighborSearch,
}

impl Frame<'_> {
    fn scan(
        &self,
        me: &Boid,
        skip: Option<usize>,
        pool: &[Boid],
        search: &dyn NeighborSearch,
        perception: Perception,
    ) -> Neighborhood {
        if pool.is_empty() || perception.radius <= 0.0 {
            return Neighborhood::default();
        }
        let candidates = search.candidates(pool, me.pos, perception.radius);
        query_neighbors(me, skip, pool, candidates, perception, self.bounds)
    }

    fn next_prey(&self, index: usize, me: &Boid) -> Boid {
        let cfg = self.config;
        let prey = self.prev.prey();
        let predators = self.prev.predators();

        let flock_radius = cfg.flock_radius();
        let flock = self.scan(
            me,
            Some(index),
            prey,
            self.prey_search,
            Perception::with_cone(flock_radius, cfg.perception_cone),
        );
        let threats = if cfg.avoidance.is_active() {
            self.scan(
                me,
                None,
                predators,
                self.predator_search,
                Perception::omnidirectional(cfg.avoidance.radius),
            )
        } else {
            Neighborhood::default()
        };

        let steering = prey_steering(me, index, &flock, prey, &threats, predators, cfg);
        let accel = steering.acceleration(cfg);
        advance(me, accel, cfg.speed_limit, self.bounds)
    }

    fn next_predator(&self, index: usize, me: &Boid) -> Boid {
        let cfg = self.config;
        let prey = self.prev.prey();
        let predators = self.prev.predators();

        let pack = if cfg.separation.is_active() {
            self.scan(
                me,
                Some(index),
                predators,
                self.predator_search,
                Perception::omnidirectional(cfg.separation.radius),
            )
        } else {
            Neighborhood::default()
        };
        let quarry = self.scan(
            me,
            None,
            prey,
            self.prey_search,
            Perception::omnidirectional(cfg.pursuit.radius),
        );

        let steering = predator_steering(me, index, &pack, predators, &quarry, prey, cfg);
        let accel = steering.acceleration(cfg);
        advance(me, accel, cfg.predator_speed_limit, self.bounds)
    }
}

impl BoidSim for Sim {
    fn step(&mut self) -> StepReport {
        let start = Instant::now();
        let prev = Arc::clone(&self.current);

        self.prey_search.rebuild(prev.prey(), &self.bounds);
        self.predator_search.rebuild(prev.predators(), &self.bounds);
        let dispatched = self.advance_phase();
        debug_assert_eq!(dispatched, Phase::Dispatched);

        let mut prey = Vec::with_capacity(prev.prey().len());
        let mut predators = Vec::with_capacity(prev.predators().len());
        {
            let frame = Frame {
                prev: prev.as_ref(),
                config: &self.config,
                bounds: &self.bounds,
                prey_search: self.prey_search.as_ref(),
                predator_search: self.predator_search.as_ref(),
            };
            // Each task writes only its own index; both pools finish before join returns.
            self.pool.install(|| {
                rayon::join(
                    || {
                        prev.prey()
                            .par_iter()
                            .enumerate()
                            .map(|(i, b)| frame.next_prey(i, b))
                            .collect_into_vec(&mut prey)
                    },
                    || {
                        prev.predators()
                            .par_iter()
                            .enumerate()
                            .map(|(i, b)| frame.next_predator(i, b))
                            .collect_into_vec(&mut predators)
                    },
                )
            });
        }

        self.advance_phase();
        debug_assert_eq!(prey.len(), prev.prey().len());
        debug_assert_eq!(predators.len(), prev.predators().len());
        let next = Generation::new(prev.index() + 1, prey, predators);

        self.current = Arc::new(next);
        self.advance_phase();

        let report = StepReport {
            generation: self.current.index(),
            prey: self.current.prey().len(),
            predators: self.current.predators().len(),
            elapsed: start.elapsed(),
        };
        debug!(
            "generation {} published: {} prey, {} predators in {:?}",
            report.generation, report.prey, report.predators, report.elapsed
        );
        self.advance_phase();
        report
    }

    fn snapshot(&self) -> Arc<Generation> {
        Arc::clone(&self.current)
    }
}

/// Mean prey velocity, handy for HUDs and tests of collective motion.
pub fn mean_velocity(boids: &[Boid]) -> Vec2 {
    if boids.is_empty() {
        return Vec2::ZERO;
    }
    boids.iter().map(|b| b.vel).sum::<Vec2>() / boids.len() as f32
}
