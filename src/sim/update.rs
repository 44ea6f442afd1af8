use macroquad::prelude::Vec2;

use crate::boid::Boid;
use crate::flock::WorldBounds;
use crate::sim::geometry::clamp_magnitude;

/// Fold `v` into `[0, extent)`.
#[inline]
pub fn wrap_axis(v: f32, extent: f32) -> f32 {
    if !v.is_finite() {
        return 0.0;
    }
    let wrapped = v.rem_euclid(extent);
    // rem_euclid can round a tiny negative up to exactly `extent`.
    if wrapped >= extent {
        0.0
    } else {
        wrapped
    }
}

pub fn wrap_position(pos: Vec2, bounds: &WorldBounds) -> Vec2 {
    Vec2::new(wrap_axis(pos.x, bounds.w), wrap_axis(pos.y, bounds.h))
}

/// The boid one frame later: velocity gains `accel` and is clamped to
/// `speed_limit`, position moves by the new velocity and wraps into the world.
pub fn advance(boid: &Boid, accel: Vec2, speed_limit: f32, bounds: &WorldBounds) -> Boid {
    let vel = clamp_magnitude(boid.vel + accel, speed_limit);
    let pos = wrap_position(boid.pos + vel, bounds);
    Boid { pos, vel, ..*boid }
}
