use std::collections::VecDeque;

use anyhow::Context;
use macroquad::prelude::*;

use predator_boids::sim::mean_velocity;
use predator_boids::{Boid, BoidSim, Class, Generation, Sim, SimConfig, WorldBounds};

const MSAA_SAMPLE_COUNT: i32 = 4;
const FRAME_WINDOW: usize = 100;
const PREY_SIZE: f32 = 6.0;
const PREDATOR_SIZE: f32 = 12.0;

fn window_conf() -> Conf {
    Conf {
        window_title: "Predator Boids".to_owned(),
        window_width: 1200,
        window_height: 800,
        sample_count: MSAA_SAMPLE_COUNT,
        high_dpi: true,
        ..Default::default()
    }
}

/// Maps world coordinates onto the window, preserving aspect ratio.
struct View {
    scale: f32,
    origin: Vec2,
}

impl View {
    fn fit(bounds: &WorldBounds) -> Self {
        let scale = (screen_width() / bounds.w).min(screen_height() / bounds.h);
        let used = Vec2::new(bounds.w, bounds.h) * scale;
        let origin = (Vec2::new(screen_width(), screen_height()) - used) * 0.5;
        Self { scale, origin }
    }

    fn to_screen(&self, p: Vec2) -> Vec2 {
        self.origin + p * self.scale
    }
}

fn draw_boid(boid: &Boid, view: &View) {
    let size = match boid.class {
        Class::Prey => PREY_SIZE,
        Class::Predator => PREDATOR_SIZE,
    } * view.scale;

    let forward = Vec2::from_angle(boid.heading());
    let side = forward.perp();
    let center = view.to_screen(boid.pos);

    let tip = center + forward * size;
    let tail = center - forward * size * 0.5;
    draw_triangle(tip, tail + side * size * 0.4, tail - side * size * 0.4, boid.color);
}

fn draw_generation(generation: &Generation, bounds: &WorldBounds, view: &View) {
    let corner = view.to_screen(Vec2::ZERO);
    draw_rectangle_lines(
        corner.x,
        corner.y,
        bounds.w * view.scale,
        bounds.h * view.scale,
        1.0,
        DARKGRAY,
    );
    for b in generation.prey() {
        draw_boid(b, view);
    }
    // Predators last so they stay visible inside dense flocks.
    for p in generation.predators() {
        draw_boid(p, view);
    }
}

async fn run() -> anyhow::Result<()> {
    let config = SimConfig::from_env().context("reading BOIDS_* configuration")?;
    log::info!("Using RNG seed: {}", config.seed);

    let mut sim = Sim::new(config).context("starting simulation")?;
    let bounds = *sim.bounds();

    let mut frame_times_ms: VecDeque<f32> = VecDeque::with_capacity(FRAME_WINDOW);

    loop {
        if is_key_pressed(KeyCode::Escape) {
            break;
        }

        let report = sim.step();
        let snapshot = sim.snapshot();

        let engine_ms = report.elapsed.as_secs_f32() * 1000.0;
        frame_times_ms.push_back(engine_ms);
        if frame_times_ms.len() > FRAME_WINDOW {
            frame_times_ms.pop_front();
        }
        let avg_ms = frame_times_ms.iter().sum::<f32>() / frame_times_ms.len() as f32;
        log::trace!("frame {} engine {:.2}ms", report.generation, engine_ms);

        clear_background(BLACK);
        let view = View::fit(&bounds);
        draw_generation(&snapshot, &bounds, &view);

        let flock_speed = mean_velocity(snapshot.prey()).length();
        draw_text(
            &format!(
                "Sim ({}) gen: {} prey: {} predators: {} avg_engine({}): {:.2}ms flock speed: {:.2}",
                sim.algo_name(),
                report.generation,
                report.prey,
                report.predators,
                FRAME_WINDOW,
                avg_ms,
                flock_speed,
            ),
            20.0,
            30.0,
            24.0,
            WHITE,
        );

        next_frame().await;
    }

    log::info!("stopped after {} generations", sim.snapshot().index());
    Ok(())
}

#[macroquad::main(window_conf)]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = run().await {
        log::error!("{err:#}");
        std::process::exit(1);
    }
}
