use std::env;
use std::f32::consts::PI;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::sim::geometry::DistanceMetric;

/// Radius and weight of one steering rule.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RuleParams {
    pub radius: f32,
    pub weight: f32,
}

impl RuleParams {
    pub const OFF: RuleParams = RuleParams { radius: 0.0, weight: 0.0 };

    pub const fn new(radius: f32, weight: f32) -> Self {
        Self { radius, weight }
    }

    /// A rule with no reach or no weight never changes the acceleration.
    pub fn is_active(&self) -> bool {
        self.radius > 0.0 && self.weight != 0.0
    }
}

/// Which `NeighborSearch` the scheduler builds for each agent pool.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SearchStrategy {
    #[default]
    BruteForce,
    SpatialHash,
}

/// Immutable parameters of one simulation run.
#[derive(Clone, Debug, PartialEq)]
pub struct SimConfig {
    /// Seed for the initial population.
    pub seed: u64,
    pub world_width: f32,
    pub world_height: f32,
    /// How distances between agents are measured across the world edges.
    pub metric: DistanceMetric,
    pub prey_count: usize,
    pub predator_count: usize,
    /// Maximum prey speed in world units per frame.
    pub speed_limit: f32,
    /// Maximum predator speed in world units per frame.
    pub predator_speed_limit: f32,
    /// Bound on the blended acceleration applied in a single frame.
    pub acceleration_limit: f32,
    /// Bound on every individual rule accumulator before weighting.
    pub rule_limit: f32,
    /// Lower bound of the initial speed; the upper bound is the class speed limit.
    pub spawn_speed: f32,
    /// Largest angle (radians) between heading and a neighbor that prey can still
    /// perceive. `None` disables the cone.
    pub perception_cone: Option<f32>,
    pub separation: RuleParams,
    pub alignment: RuleParams,
    pub cohesion: RuleParams,
    /// Prey fleeing from predators.
    pub avoidance: RuleParams,
    /// Predators chasing the nearest prey.
    pub pursuit: RuleParams,
    /// Weight of the predator velocity-matching term toward prey inside the
    /// pursuit radius.
    pub pursuit_matching: f32,
    pub search: SearchStrategy,
    /// Worker threads for the update pool; `None` lets rayon decide.
    pub threads: Option<usize>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Preset::default().config()
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("world extent {width}x{height} must be positive and finite")]
    WorldExtent { width: f32, height: f32 },
    #[error("{name} must be positive and finite, got {value}")]
    Limit { name: &'static str, value: f32 },
    #[error("spawn speed {spawn} must lie in [0, {limit}]")]
    SpawnSpeed { spawn: f32, limit: f32 },
    #[error("{rule} rule radius {radius} must be non-negative and weight {weight} finite")]
    Rule {
        rule: &'static str,
        radius: f32,
        weight: f32,
    },
    #[error("perception cone {0} must lie in (0, pi]")]
    PerceptionCone(f32),
    #[error("thread count must be non-zero")]
    ZeroThreads,
    #[error("unknown preset `{0}` (expected classic, cone, torus, predators or hunt)")]
    UnknownPreset(String),
    #[error("unknown distance metric `{0}` (expected euclidean, corner or toroidal)")]
    UnknownMetric(String),
    #[error("environment variable {var}=`{value}` is not valid")]
    InvalidEnv { var: &'static str, value: String },
}

fn positive(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Limit { name, value })
    }
}

fn rule(name: &'static str, params: &RuleParams) -> Result<(), ConfigError> {
    if params.radius.is_finite() && params.radius >= 0.0 && params.weight.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::Rule {
            rule: name,
            radius: params.radius,
            weight: params.weight,
        })
    }
}

impl SimConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let extent_ok = |v: f32| v.is_finite() && v > 0.0;
        if !extent_ok(self.world_width) || !extent_ok(self.world_height) {
            return Err(ConfigError::WorldExtent {
                width: self.world_width,
                height: self.world_height,
            });
        }
        positive("speed_limit", self.speed_limit)?;
        positive("predator_speed_limit", self.predator_speed_limit)?;
        positive("acceleration_limit", self.acceleration_limit)?;
        positive("rule_limit", self.rule_limit)?;

        if !(self.spawn_speed.is_finite()
            && self.spawn_speed >= 0.0
            && self.spawn_speed <= self.speed_limit)
        {
            return Err(ConfigError::SpawnSpeed {
                spawn: self.spawn_speed,
                limit: self.speed_limit,
            });
        }

        rule("separation", &self.separation)?;
        rule("alignment", &self.alignment)?;
        rule("cohesion", &self.cohesion)?;
        rule("avoidance", &self.avoidance)?;
        rule("pursuit", &self.pursuit)?;
        if !self.pursuit_matching.is_finite() {
            return Err(ConfigError::Rule {
                rule: "pursuit_matching",
                radius: self.pursuit.radius,
                weight: self.pursuit_matching,
            });
        }

        if let Some(cone) = self.perception_cone {
            if !(cone > 0.0 && cone <= PI) {
                return Err(ConfigError::PerceptionCone(cone));
            }
        }
        if self.threads == Some(0) {
            return Err(ConfigError::ZeroThreads);
        }
        Ok(())
    }

    /// Radius prey scan their own pool with: the widest of the flocking rules.
    pub fn flock_radius(&self) -> f32 {
        self.separation
            .radius
            .max(self.alignment.radius)
            .max(self.cohesion.radius)
    }

    /// Build a configuration from `BOIDS_*` environment variables.
    ///
    /// `BOIDS_PRESET` picks the base profile; `BOIDS_SEED`, `BOIDS_PREY`,
    /// `BOIDS_PREDATORS`, `BOIDS_METRIC` and `BOIDS_THREADS` override single fields.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let preset = match lookup("BOIDS_PRESET") {
            Some(name) => name.parse::<Preset>()?,
            None => Preset::default(),
        };
        let mut config = preset.config();

        if let Some(seed) = parse_var(&lookup, "BOIDS_SEED")? {
            config.seed = seed;
        }
        if let Some(prey) = parse_var(&lookup, "BOIDS_PREY")? {
            config.prey_count = prey;
        }
        if let Some(predators) = parse_var(&lookup, "BOIDS_PREDATORS")? {
            config.predator_count = predators;
        }
        if let Some(threads) = parse_var(&lookup, "BOIDS_THREADS")? {
            config.threads = Some(threads);
        }
        if let Some(metric) = lookup("BOIDS_METRIC") {
            config.metric = metric.parse()?;
        }

        config.validate()?;
        Ok(config)
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<T>, ConfigError> {
    match lookup(var) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnv { var, value }),
    }
}

/// Named parameter profiles, one per historical program variant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Preset {
    /// Three classic rules, plain distance, no perception cone.
    Classic,
    /// Classic rules with a forward perception cone.
    Cone,
    /// Perception cone in a wrap-around world.
    Torus,
    /// Adds a predator pool that prey flee from.
    Predators,
    /// Predators actively chase the nearest prey.
    #[default]
    Hunt,
}

impl Preset {
    pub const ALL: [Preset; 5] = [
        Preset::Classic,
        Preset::Cone,
        Preset::Torus,
        Preset::Predators,
        Preset::Hunt,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Preset::Classic => "classic",
            Preset::Cone => "cone",
            Preset::Torus => "torus",
            Preset::Predators => "predators",
            Preset::Hunt => "hunt",
        }
    }

    pub fn config(self) -> SimConfig {
        match self {
            Preset::Classic => SimConfig {
                seed: 1,
                world_width: 1200.0,
                world_height: 800.0,
                metric: DistanceMetric::Euclidean,
                prey_count: 1000,
                predator_count: 0,
                speed_limit: 20.0,
                predator_speed_limit: 20.0,
                acceleration_limit: 10.0,
                rule_limit: 10.0,
                spawn_speed: 2.0,
                perception_cone: None,
                separation: RuleParams::new(5.0, 30.0),
                alignment: RuleParams::new(6.0, 20.0),
                cohesion: RuleParams::new(12.0, 10.0),
                avoidance: RuleParams::OFF,
                pursuit: RuleParams::OFF,
                pursuit_matching: 0.0,
                search: SearchStrategy::BruteForce,
                threads: None,
            },
            Preset::Cone => SimConfig {
                seed: 1,
                world_width: 1200.0,
                world_height: 800.0,
                metric: DistanceMetric::Euclidean,
                prey_count: 600,
                predator_count: 0,
                speed_limit: 4.0,
                predator_speed_limit: 4.0,
                acceleration_limit: 0.3,
                rule_limit: 1.0,
                spawn_speed: 1.5,
                perception_cone: Some(0.75 * PI),
                separation: RuleParams::new(12.0, 1.5),
                alignment: RuleParams::new(40.0, 1.0),
                cohesion: RuleParams::new(60.0, 0.05),
                avoidance: RuleParams::OFF,
                pursuit: RuleParams::OFF,
                pursuit_matching: 0.0,
                search: SearchStrategy::BruteForce,
                threads: None,
            },
            Preset::Torus => SimConfig {
                metric: DistanceMetric::Toroidal,
                search: SearchStrategy::SpatialHash,
                ..Preset::Cone.config()
            },
            Preset::Predators => SimConfig {
                predator_count: 6,
                predator_speed_limit: 4.4,
                avoidance: RuleParams::new(90.0, 4.0),
                ..Preset::Torus.config()
            },
            Preset::Hunt => SimConfig {
                predator_speed_limit: 4.6,
                pursuit: RuleParams::new(150.0, 1.2),
                pursuit_matching: 0.1,
                ..Preset::Predators.config()
            },
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Preset::ALL
            .into_iter()
            .find(|p| p.name() == wanted)
            .ok_or_else(|| ConfigError::UnknownPreset(s.to_owned()))
    }
}
