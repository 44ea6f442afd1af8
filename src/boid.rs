use macroquad::prelude::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Class {
    Prey,
    Predator,
}

/// One agent of either pool. Values are replaced every frame, never mutated
/// after they are published in a generation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Boid {
    pub pos: Vec2,
    pub vel: Vec2,
    pub class: Class,
    pub color: Color,
}

impl Boid {
    pub fn prey(pos: Vec2, vel: Vec2) -> Self {
        Self {
            pos,
            vel,
            class: Class::Prey,
            color: PREY_COLOR,
        }
    }

    pub fn predator(pos: Vec2, vel: Vec2) -> Self {
        Self {
            pos,
            vel,
            class: Class::Predator,
            color: PREDATOR_COLOR,
        }
    }

    /// Heading in radians, `atan2(vy, vx)`. A stationary boid faces +x.
    pub fn heading(&self) -> f32 {
        self.vel.y.atan2(self.vel.x)
    }

    pub fn speed(&self) -> f32 {
        self.vel.length()
    }
}

pub const PREY_COLOR: Color = Color::new(0.35, 0.75, 1.0, 0.9);
pub const PREDATOR_COLOR: Color = Color::new(1.0, 0.2, 0.15, 1.0);

pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> Color {
    let h = h.rem_euclid(1.0) * 6.0;
    let i = h.floor() as i32;
    let f = h - i as f32;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));

    let (r, g, b) = match i % 6 {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };

    Color::new(r, g, b, 0.9)
}

/// Hue that follows the spawn heading, so initially aligned boids share a tint.
pub fn heading_color(heading: f32) -> Color {
    let hue = (heading / std::f32::consts::TAU).rem_euclid(1.0);
    hsv_to_rgb(hue, 0.6, 1.0)
}
