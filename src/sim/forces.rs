//! Steering rules and how they blend into one bounded acceleration.
//!
//! Every rule averages over the neighbors inside its own radius. A rule with
//! nobody in range contributes exactly zero.

use macroquad::prelude::Vec2;

use crate::boid::Boid;
use crate::config::SimConfig;
use crate::sim::geometry::clamp_magnitude;
use crate::sim::neighbors::Neighborhood;

/// Distances are pinned to at least this before dividing by them.
pub const MIN_DISTANCE: f32 = 1e-3;

/// Per-rule accumulators, each already clamped to `rule_limit` but not weighted.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Steering {
    pub alignment: Vec2,
    pub cohesion: Vec2,
    pub separation: Vec2,
    /// Threat direction; subtracted when blended.
    pub avoidance: Vec2,
    pub matching: Vec2,
    pub pursuit: Vec2,
}

impl Steering {
    /// Weighted sum of all accumulators, clamped to `acceleration_limit`.
    pub fn acceleration(&self, config: &SimConfig) -> Vec2 {
        let a = self.alignment * config.alignment.weight
            + self.cohesion * config.cohesion.weight
            + self.separation * config.separation.weight
            - self.avoidance * config.avoidance.weight
            + self.matching * config.pursuit_matching
            + self.pursuit * config.pursuit.weight;
        clamp_magnitude(a, config.acceleration_limit)
    }
}

fn mean<I: Iterator<Item = Vec2>>(terms: I) -> Option<Vec2> {
    let (sum, count) = terms.fold((Vec2::ZERO, 0usize), |(s, c), v| (s + v, c + 1));
    (count > 0).then(|| sum / count as f32)
}

/// Push away from something at `offset`, growing as `distance` shrinks: unit
/// length at `reach`, and capped only by `MIN_DISTANCE`.
pub fn repulsion(offset: Vec2, distance: f32, reach: f32) -> Vec2 {
    -offset.normalize_or_zero() * (reach / distance.max(MIN_DISTANCE))
}

/// Which way to step off a neighbor sitting exactly on our position: along the
/// velocity difference, or sideways off our heading with the side picked by pool
/// order so the pair always splits.
fn coincident_escape(me: &Boid, own: usize, other_index: usize, other: &Boid) -> Vec2 {
    let apart = (me.vel - other.vel).normalize_or_zero();
    if apart != Vec2::ZERO {
        return apart;
    }
    let side = Vec2::from_angle(me.heading()).perp();
    if own < other_index {
        side
    } else {
        -side
    }
}

/// Mean neighbor velocity minus our own. Indices missing from `pool` are skipped.
pub fn alignment(me: &Boid, hood: &Neighborhood, pool: &[Boid], radius: f32) -> Vec2 {
    mean(hood.within(radius).filter_map(|n| pool.get(n.index)).map(|b| b.vel))
        .map(|avg| avg - me.vel)
        .unwrap_or(Vec2::ZERO)
}

/// Offset to the local centroid. Built from metric offsets so it holds across the seam.
pub fn cohesion(hood: &Neighborhood, radius: f32) -> Vec2 {
    mean(hood.within(radius).map(|n| n.offset)).unwrap_or(Vec2::ZERO)
}

/// Repulsion from everyone inside `radius`. `own` is our slot in `pool`; it only
/// matters when a neighbor shares our exact position.
pub fn separation(me: &Boid, own: usize, hood: &Neighborhood, pool: &[Boid], radius: f32) -> Vec2 {
    mean(hood.within(radius).map(|n| {
        let offset = match pool.get(n.index) {
            Some(other) if n.offset == Vec2::ZERO => -coincident_escape(me, own, n.index, other),
            _ => n.offset,
        };
        repulsion(offset, n.distance, radius)
    }))
    .unwrap_or(Vec2::ZERO)
}

/// Threat vector toward nearby predators: closeness plus closing velocity, both
/// scaled by inverse distance and averaged over the predators in range.
pub fn avoidance(me: &Boid, threats: &Neighborhood, predators: &[Boid], radius: f32) -> Vec2 {
    mean(threats.within(radius).filter_map(|n| {
        let toward = n.offset.normalize_or_zero() * radius;
        let closing = me.vel - predators.get(n.index)?.vel;
        Some((toward + closing) / n.distance.max(MIN_DISTANCE))
    }))
    .unwrap_or(Vec2::ZERO)
}

/// Velocity matching toward prey in range, and the direct line to the nearest one.
pub fn pursuit(me: &Boid, quarry: &Neighborhood, prey: &[Boid], radius: f32) -> (Vec2, Vec2) {
    let in_range = quarry.within(radius).filter_map(|n| prey.get(n.index));
    let matching = mean(in_range.map(|b| b.vel))
        .map(|avg| avg - me.vel)
        .unwrap_or(Vec2::ZERO);
    let chase = quarry
        .nearest
        .filter(|n| n.distance < radius)
        .map(|n| n.offset)
        .unwrap_or(Vec2::ZERO);
    (matching, chase)
}

/// Steering for prey `index` from its flock mates and the predators it senses.
pub fn prey_steering(
    me: &Boid,
    index: usize,
    flock: &Neighborhood,
    prey: &[Boid],
    threats: &Neighborhood,
    predators: &[Boid],
    config: &SimConfig,
) -> Steering {
    let limit = config.rule_limit;
    let mut s = Steering::default();

    if config.alignment.is_active() {
        s.alignment = clamp_magnitude(alignment(me, flock, prey, config.alignment.radius), limit);
    }
    if config.cohesion.is_active() {
        s.cohesion = clamp_magnitude(cohesion(flock, config.cohesion.radius), limit);
    }
    if config.separation.is_active() {
        let push = separation(me, index, flock, prey, config.separation.radius);
        s.separation = clamp_magnitude(push, limit);
    }
    if config.avoidance.is_active() {
        s.avoidance = clamp_magnitude(
            avoidance(me, threats, predators, config.avoidance.radius),
            limit,
        );
    }
    s
}

/// Steering for a predator: keep clear of the pack, close in on prey.
pub fn predator_steering(
    me: &Boid,
    index: usize,
    pack: &Neighborhood,
    predators: &[Boid],
    quarry: &Neighborhood,
    prey: &[Boid],
    config: &SimConfig,
) -> Steering {
    let limit = config.rule_limit;
    let mut s = Steering::default();

    if config.separation.is_active() {
        let push = separation(me, index, pack, predators, config.separation.radius);
        s.separation = clamp_magnitude(push, limit);
    }
    if config.pursuit.radius > 0.0 {
        let (matching, chase) = pursuit(me, quarry, prey, config.pursuit.radius);
        s.matching = clamp_magnitude(matching, limit);
        s.pursuit = clamp_magnitude(chase, limit);
    }
    s
}
