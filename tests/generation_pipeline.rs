use macroquad::prelude::Vec2;
use predator_boids::{
    Boid, BoidSim, DistanceMetric, Generation, Preset, RuleParams, SearchStrategy, Sim, SimConfig,
};

const EPS: f32 = 1e-4;

fn without_rules(config: SimConfig) -> SimConfig {
    SimConfig {
        separation: RuleParams { weight: 0.0, ..config.separation },
        alignment: RuleParams { weight: 0.0, ..config.alignment },
        cohesion: RuleParams { weight: 0.0, ..config.cohesion },
        avoidance: RuleParams { weight: 0.0, ..config.avoidance },
        pursuit: RuleParams { weight: 0.0, ..config.pursuit },
        pursuit_matching: 0.0,
        ..config
    }
}

fn assert_invariants(generation: &Generation, config: &SimConfig) {
    for b in generation.prey() {
        assert!(b.vel.length() <= config.speed_limit + EPS, "{b:?}");
        assert!(b.pos.x >= 0.0 && b.pos.x < config.world_width, "{b:?}");
        assert!(b.pos.y >= 0.0 && b.pos.y < config.world_height, "{b:?}");
    }
    for p in generation.predators() {
        assert!(p.vel.length() <= config.predator_speed_limit + EPS, "{p:?}");
        assert!(p.pos.x >= 0.0 && p.pos.x < config.world_width, "{p:?}");
        assert!(p.pos.y >= 0.0 && p.pos.y < config.world_height, "{p:?}");
    }
}

#[test]
fn invariants_hold_for_every_preset() {
    for preset in Preset::ALL {
        let config = SimConfig {
            prey_count: 150,
            ..preset.config()
        };
        let mut sim = Sim::new(config.clone()).unwrap();
        for _ in 0..40 {
            sim.step();
            let snapshot = sim.snapshot();
            assert_invariants(&snapshot, &config);
            assert!(snapshot
                .prey()
                .iter()
                .chain(snapshot.predators())
                .all(|b| b.pos.is_finite() && b.vel.is_finite()));
        }
        assert_eq!(sim.snapshot().index(), 40);
    }
}

#[test]
fn zero_weights_reduce_to_pure_motion() {
    let config = SimConfig {
        world_width: 100.0,
        world_height: 50.0,
        ..without_rules(Preset::Hunt.config())
    };
    let start = Generation::new(
        0,
        vec![
            Boid::prey(Vec2::new(10.0, 10.0), Vec2::new(1.0, 2.0)),
            Boid::prey(Vec2::new(99.0, 49.5), Vec2::new(2.0, 1.0)),
        ],
        vec![],
    );
    let mut sim = Sim::from_generation(config, start.clone()).unwrap();
    sim.step();
    let next = sim.snapshot();

    assert_eq!(next.prey().len(), 2);
    assert_eq!(next.prey()[0].pos, Vec2::new(11.0, 12.0));
    assert_eq!(next.prey()[1].pos, Vec2::new(1.0, 0.5));
    for (before, after) in start.prey().iter().zip(next.prey()) {
        assert_eq!(before.vel, after.vel);
        assert_eq!(before.color, after.color);
    }
}

#[test]
fn lone_prey_flies_straight() {
    let config = SimConfig {
        world_width: 1000.0,
        world_height: 1000.0,
        ..Preset::Hunt.config()
    };
    let vel = Vec2::new(1.5, -0.5);
    let start = Generation::new(0, vec![Boid::prey(Vec2::new(500.0, 500.0), vel)], vec![]);
    let mut sim = Sim::from_generation(config, start).unwrap();

    let mut expected = Vec2::new(500.0, 500.0);
    for _ in 0..200 {
        sim.step();
        expected += vel;
        expected = Vec2::new(expected.x.rem_euclid(1000.0), expected.y.rem_euclid(1000.0));
        let b = sim.snapshot().prey()[0];
        assert_eq!(b.vel, vel);
        assert!((b.pos - expected).length() < 1e-2, "{:?} vs {expected:?}", b.pos);
    }
}

#[test]
fn crossing_the_right_edge_lands_on_the_left() {
    let config = without_rules(Preset::Torus.config());
    let y = 123.0;
    let start = Generation::new(
        0,
        vec![Boid::prey(Vec2::new(config.world_width - 0.5, y), Vec2::new(1.0, 0.0))],
        vec![],
    );
    let mut sim = Sim::from_generation(config, start).unwrap();
    sim.step();
    assert_eq!(sim.snapshot().prey()[0].pos, Vec2::new(0.5, y));
}

#[test]
fn next_generation_keeps_source_order() {
    let config = without_rules(Preset::Predators.config());
    let mut sim = Sim::new(SimConfig {
        prey_count: 64,
        predator_count: 5,
        ..config
    })
    .unwrap();
    let before = sim.snapshot();
    sim.step();
    let after = sim.snapshot();
    for (b, a) in before.prey().iter().zip(after.prey()) {
        assert_eq!(a.vel, b.vel);
        assert_eq!(a.color, b.color);
    }
    for (b, a) in before.predators().iter().zip(after.predators()) {
        assert_eq!(a.vel, b.vel);
    }
}

#[test]
fn same_seed_same_run() {
    let config = SimConfig {
        prey_count: 200,
        seed: 99,
        ..Preset::Hunt.config()
    };
    let mut a = Sim::new(config.clone()).unwrap();
    let mut b = Sim::new(config).unwrap();
    for _ in 0..10 {
        a.step();
        b.step();
    }
    assert_eq!(*a.snapshot(), *b.snapshot());
}

#[test]
fn predators_close_in_on_a_lone_prey() {
    let config = SimConfig {
        world_width: 400.0,
        world_height: 400.0,
        metric: DistanceMetric::Toroidal,
        search: SearchStrategy::BruteForce,
        ..Preset::Hunt.config()
    };
    let start = Generation::new(
        0,
        vec![Boid::prey(Vec2::new(200.0, 200.0), Vec2::new(0.0, 0.0))],
        vec![Boid::predator(Vec2::new(100.0, 200.0), Vec2::new(0.0, 1.0))],
    );
    let mut sim = Sim::from_generation(config, start).unwrap();
    let gap = |g: &Generation| (g.prey()[0].pos - g.predators()[0].pos).length();
    let initial = gap(&sim.snapshot());
    for _ in 0..10 {
        sim.step();
    }
    assert!(gap(&sim.snapshot()) < initial);
}
