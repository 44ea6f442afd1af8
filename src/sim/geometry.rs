use std::str::FromStr;

use macroquad::prelude::Vec2;

use crate::config::ConfigError;
use crate::flock::WorldBounds;

/// How the distance between two agents is measured.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DistanceMetric {
    /// Straight-line distance; edges do not connect.
    Euclidean,
    /// The shorter of the straight line and a route through the world's corner
    /// point. All four corners are the same point on the torus, so the route
    /// costs the distance from each agent to its nearest corner. This is an
    /// approximation: it never underestimates, but agents facing each other
    /// across a single edge are still measured the long way.
    CornerWrap,
    /// Exact minimum over every wrap combination on both axes.
    Toroidal,
}

impl FromStr for DistanceMetric {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "euclidean" => Ok(DistanceMetric::Euclidean),
            "corner" | "corner-wrap" => Ok(DistanceMetric::CornerWrap),
            "toroidal" | "torus" => Ok(DistanceMetric::Toroidal),
            _ => Err(ConfigError::UnknownMetric(s.to_owned())),
        }
    }
}

#[inline]
pub fn squared_magnitude(v: Vec2) -> f32 {
    v.x * v.x + v.y * v.y
}

/// Rescale `v` to exactly `limit` when it is longer, otherwise return it as is.
///
/// Non-finite input collapses to zero so a single bad term cannot poison the
/// state of an agent.
#[inline]
pub fn clamp_magnitude(v: Vec2, limit: f32) -> Vec2 {
    if !v.is_finite() {
        return Vec2::ZERO;
    }
    let sq = squared_magnitude(v);
    if sq > limit * limit {
        v * (limit / sq.sqrt())
    } else {
        v
    }
}

/// Unsigned angle between two vectors in `[0, pi]`, or NaN if either is zero.
pub fn angle_between(v1: Vec2, v2: Vec2) -> f32 {
    let denom = (squared_magnitude(v1) * squared_magnitude(v2)).sqrt();
    if denom == 0.0 {
        return f32::NAN;
    }
    (v1.dot(v2) / denom).clamp(-1.0, 1.0).acos()
}

/// Shortest per-axis vector from `from` to `to` when both axes wrap.
pub fn min_image_offset(from: Vec2, to: Vec2, bounds: &WorldBounds) -> Vec2 {
    Vec2::new(
        wrap_delta(to.x - from.x, bounds.w),
        wrap_delta(to.y - from.y, bounds.h),
    )
}

#[inline]
fn wrap_delta(d: f32, extent: f32) -> f32 {
    let half = extent * 0.5;
    if d > half {
        d - extent
    } else if d < -half {
        d + extent
    } else {
        d
    }
}

fn nearest_corner_distance(p: Vec2, bounds: &WorldBounds) -> f32 {
    let dx = p.x.min(bounds.w - p.x).max(0.0);
    let dy = p.y.min(bounds.h - p.y).max(0.0);
    (dx * dx + dy * dy).sqrt()
}

/// Offset from `from` to `to` and its length under the world's metric.
///
/// The offset is what steering rules should follow: for wrap-aware metrics it
/// points across the edge whenever that route is the one being measured.
pub fn displacement(from: Vec2, to: Vec2, bounds: &WorldBounds) -> (Vec2, f32) {
    match bounds.metric {
        DistanceMetric::Euclidean => {
            let offset = to - from;
            (offset, offset.length())
        }
        DistanceMetric::Toroidal => {
            let offset = min_image_offset(from, to, bounds);
            (offset, offset.length())
        }
        DistanceMetric::CornerWrap => {
            let direct = to - from;
            let direct_len = direct.length();
            let via_corner =
                nearest_corner_distance(from, bounds) + nearest_corner_distance(to, bounds);
            if via_corner < direct_len {
                (min_image_offset(from, to, bounds), via_corner)
            } else {
                (direct, direct_len)
            }
        }
    }
}

pub fn distance(a: Vec2, b: Vec2, bounds: &WorldBounds) -> f32 {
    displacement(a, b, bounds).1
}
