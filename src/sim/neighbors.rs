use macroquad::prelude::Vec2;

use crate::boid::Boid;
use crate::flock::WorldBounds;
use crate::sim::geometry::{angle_between, displacement};

/// What a boid can sense: a radius and an optional forward cone half-angle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Perception {
    pub radius: f32,
    pub cone: Option<f32>,
}

impl Perception {
    pub fn omnidirectional(radius: f32) -> Self {
        Self { radius, cone: None }
    }

    pub fn with_cone(radius: f32, cone: Option<f32>) -> Self {
        Self { radius, cone }
    }
}

/// A sensed boid: its index in the scanned pool, the metric-aware offset from
/// the observer to it, and the distance along that route.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Neighbor {
    pub index: usize,
    pub offset: Vec2,
    pub distance: f32,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Neighborhood {
    pub members: Vec<Neighbor>,
    pub nearest: Option<Neighbor>,
}

impl Neighborhood {
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Members strictly closer than `radius`.
    pub fn within(&self, radius: f32) -> impl Iterator<Item = &Neighbor> + '_ {
        self.members.iter().filter(move |n| n.distance < radius)
    }

    pub fn contains(&self, index: usize) -> bool {
        self.members.iter().any(|n| n.index == index)
    }
}

/// Whether a boid heading along `heading` perceives something at `offset`.
///
/// A stationary observer has no heading and a coincident neighbor has no
/// direction; neither is constrained by the cone.
pub fn in_cone(heading: Vec2, offset: Vec2, cone: f32) -> bool {
    if heading == Vec2::ZERO || offset == Vec2::ZERO {
        return true;
    }
    angle_between(offset, heading) <= cone
}

/// Filter `candidates` from `population` down to what `me` perceives.
///
/// `skip` is the observer's own index when it belongs to `population`.
/// Candidates may be a superset (any order, no duplicates); the result keeps
/// their order and the nearest member is the first one seen at the minimum
/// distance.
pub fn query_neighbors<I>(
    me: &Boid,
    skip: Option<usize>,
    population: &[Boid],
    candidates: I,
    perception: Perception,
    bounds: &WorldBounds,
) -> Neighborhood
where
    I: IntoIterator<Item = usize>,
{
    let mut hood = Neighborhood::default();
    if perception.radius <= 0.0 {
        return hood;
    }

    for j in candidates {
        if Some(j) == skip {
            continue;
        }
        let Some(other) = population.get(j) else {
            continue;
        };

        let (offset, distance) = displacement(me.pos, other.pos, bounds);
        if !(distance < perception.radius) {
            continue;
        }
        if let Some(cone) = perception.cone {
            if !in_cone(me.vel, offset, cone) {
                continue;
            }
        }

        let neighbor = Neighbor {
            index: j,
            offset,
            distance,
        };
        match hood.nearest {
            Some(best) if best.distance <= distance => {}
            _ => hood.nearest = Some(neighbor),
        }
        hood.members.push(neighbor);
    }

    hood
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::geometry::DistanceMetric;
    use std::f32::consts::PI;

    fn bounds(metric: DistanceMetric) -> WorldBounds {
        WorldBounds {
            w: 200.0,
            h: 100.0,
            metric,
        }
    }

    fn at(x: f32, y: f32, vx: f32, vy: f32) -> Boid {
        Boid::prey(Vec2::new(x, y), Vec2::new(vx, vy))
    }

    fn scan(me: usize, pool: &[Boid], perception: Perception, b: &WorldBounds) -> Neighborhood {
        query_neighbors(&pool[me], Some(me), pool, 0..pool.len(), perception, b)
    }

    #[test]
    fn radius_is_exclusive_and_self_is_skipped() {
        let b = bounds(DistanceMetric::Euclidean);
        let pool = [
            at(50.0, 50.0, 1.0, 0.0),
            at(60.0, 50.0, 0.0, 1.0),
            at(40.0, 50.0, 0.0, 1.0),
            at(50.0, 80.0, 0.0, 1.0),
        ];
        let hood = scan(0, &pool, Perception::omnidirectional(10.0), &b);
        assert!(hood.is_empty());
        assert!(hood.nearest.is_none());

        let hood = scan(0, &pool, Perception::omnidirectional(10.5), &b);
        assert_eq!(hood.len(), 2);
        assert!(!hood.contains(0));
        assert!(hood.contains(1) && hood.contains(2));
    }

    #[test]
    fn nearest_prefers_first_seen_on_ties() {
        let b = bounds(DistanceMetric::Euclidean);
        let pool = [
            at(50.0, 50.0, 1.0, 0.0),
            at(55.0, 50.0, 0.0, 0.0),
            at(45.0, 50.0, 0.0, 0.0),
            at(50.0, 52.0, 0.0, 0.0),
        ];
        let hood = scan(0, &pool, Perception::omnidirectional(20.0), &b);
        assert_eq!(hood.nearest.map(|n| n.index), Some(3));

        let tied = [pool[0], pool[1], pool[2]];
        let hood = scan(0, &tied, Perception::omnidirectional(20.0), &b);
        assert_eq!(hood.nearest.map(|n| n.index), Some(1));
    }

    #[test]
    fn cone_hides_what_is_behind() {
        let b = bounds(DistanceMetric::Euclidean);
        let pool = [
            at(50.0, 50.0, 1.0, 0.0),
            at(58.0, 50.0, 0.0, 0.0),
            at(42.0, 50.0, 0.0, 0.0),
            at(50.0, 58.0, 0.0, 0.0),
        ];
        let hood = scan(0, &pool, Perception::with_cone(20.0, Some(0.75 * PI)), &b);
        assert!(hood.contains(1));
        assert!(!hood.contains(2));
        assert!(hood.contains(3));

        let all = scan(0, &pool, Perception::omnidirectional(20.0), &b);
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn stationary_observer_sees_all_around() {
        let b = bounds(DistanceMetric::Euclidean);
        let pool = [
            at(50.0, 50.0, 0.0, 0.0),
            at(58.0, 50.0, 0.0, 0.0),
            at(42.0, 50.0, 0.0, 0.0),
            at(50.0, 50.0, 1.0, 0.0),
        ];
        let hood = scan(0, &pool, Perception::with_cone(20.0, Some(0.7 * PI)), &b);
        assert_eq!(hood.len(), 3);
        assert_eq!(hood.nearest.map(|n| n.index), Some(3));
    }

    #[test]
    fn plain_query_is_symmetric_cone_query_is_not() {
        let b = bounds(DistanceMetric::Toroidal);
        let pool = [
            at(195.0, 10.0, 1.0, 0.0),
            at(3.0, 12.0, 1.0, 0.0),
            at(120.0, 60.0, -1.0, 0.0),
            at(130.0, 60.0, -1.0, 0.0),
        ];
        let plain = Perception::omnidirectional(15.0);
        for i in 0..pool.len() {
            let hood_i = scan(i, &pool, plain, &b);
            for j in 0..pool.len() {
                if i == j {
                    continue;
                }
                let hood_j = scan(j, &pool, plain, &b);
                assert_eq!(hood_i.contains(j), hood_j.contains(i), "{i} {j}");
            }
        }
        assert!(scan(0, &pool, plain, &b).contains(1));

        // Boid 0 flies toward boid 1 across the seam; boid 1 flies away from it.
        let cone = Perception::with_cone(15.0, Some(0.7 * PI));
        assert!(scan(0, &pool, cone, &b).contains(1));
        assert!(!scan(1, &pool, cone, &b).contains(0));
    }

    #[test]
    fn offsets_point_across_the_seam() {
        let b = bounds(DistanceMetric::Toroidal);
        let pool = [at(198.0, 50.0, 1.0, 0.0), at(2.0, 50.0, 1.0, 0.0)];
        let hood = scan(0, &pool, Perception::omnidirectional(10.0), &b);
        let n = hood.nearest.unwrap();
        assert!((n.offset.x - 4.0).abs() < 1e-4);
        assert!((n.distance - 4.0).abs() < 1e-4);
    }

    #[test]
    fn foreign_pool_and_superset_candidates() {
        let b = bounds(DistanceMetric::Euclidean);
        let me = at(10.0, 10.0, 1.0, 0.0);
        let predators = [at(14.0, 10.0, 0.0, 0.0), at(90.0, 90.0, 0.0, 0.0)];
        let hood = query_neighbors(
            &me,
            None,
            &predators,
            [1, 0, 7],
            Perception::omnidirectional(30.0),
            &b,
        );
        assert_eq!(hood.len(), 1);
        assert_eq!(hood.members[0].index, 0);
        assert_eq!(hood.within(3.0).count(), 0);
        assert_eq!(hood.within(5.0).count(), 1);
    }
}
