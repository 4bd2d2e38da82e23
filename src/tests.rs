//! Tests for the simulation step, resize policies, cursor steering and frame output.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::color::Color;
use crate::config::{BoundaryPolicy, CursorMode, ParticleConfig, Range, ResizePolicy};
use crate::particle::Particle;
use crate::renderer::Renderer;
use crate::simulation::Simulation;
use crate::surface::PixelSurface;

fn seeded(config: ParticleConfig, seed: u64) -> Simulation<ChaCha8Rng> {
    Simulation::new(config, 640.0, 480.0, ChaCha8Rng::seed_from_u64(seed))
}

fn assert_within_margin(sim: &Simulation<ChaCha8Rng>) {
    let margin = sim.config().margin;
    for p in sim.particles() {
        assert!(
            p.pos[0] >= -margin && p.pos[0] <= sim.width() + margin,
            "x out of bounds: {:?}",
            p.pos
        );
        assert!(
            p.pos[1] >= -margin && p.pos[1] <= sim.height() + margin,
            "y out of bounds: {:?}",
            p.pos
        );
    }
}

fn distance(a: [f64; 2], b: [f64; 2]) -> f64 {
    ((a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2)).sqrt()
}

// ---- Bounds ----

#[test]
fn test_bounce_stays_within_bounds() {
    let config = ParticleConfig {
        speed: Range::new(2.0, 6.0),
        ..ParticleConfig::constellation()
    };
    let mut sim = seeded(config, 1);
    sim.set_cursor(320.0, 240.0);
    for _ in 0..2000 {
        sim.step();
        assert_within_margin(&sim);
    }
}

#[test]
fn test_respawn_stays_within_bounds() {
    let mut sim = seeded(ParticleConfig::drift(), 2);
    sim.set_cursor(10.0, 470.0);
    for _ in 0..2000 {
        sim.step();
        assert_within_margin(&sim);
    }
    assert_eq!(sim.particles().len(), 60);
}

#[test]
fn test_expired_particles_respawn_at_top() {
    let config = ParticleConfig::drift();
    let mut p = Particle::new(100.0, 100.0, 0.0, 0.0, 1.0, Color::WHITE);
    p.life = 0.01;
    p.decay = 0.02;
    let mut sim = Simulation::with_particles(config, 640.0, 480.0, vec![p], ChaCha8Rng::seed_from_u64(4));
    sim.step();
    let respawned = sim.particles()[0];
    assert_eq!(respawned.pos[1], -sim.config().margin);
    assert_eq!(respawned.life, 1.0);
}

#[test]
fn test_expired_bounce_particles_respawn_on_surface() {
    let config = ParticleConfig {
        decay: Some(Range::new(0.005, 0.015)),
        ..ParticleConfig::constellation()
    };
    let mut p = Particle::new(320.0, 240.0, 0.0, 0.0, 1.0, Color::WHITE);
    p.life = 0.001;
    p.decay = 0.01;
    let mut sim = Simulation::with_particles(config, 640.0, 480.0, vec![p], ChaCha8Rng::seed_from_u64(13));
    sim.step();

    let respawned = sim.particles()[0];
    assert_eq!(respawned.life, 1.0);
    assert!(respawned.decay >= 0.005 && respawned.decay <= 0.015);
    assert!(respawned.pos[0] >= 0.0 && respawned.pos[0] <= 640.0);
    assert!(respawned.pos[1] >= 0.0 && respawned.pos[1] <= 480.0);
}

#[test]
fn test_non_finite_config_stays_within_bounds() {
    let mut config = ParticleConfig {
        speed: Range::new(f64::NAN, 1.0),
        ..ParticleConfig::constellation()
    };
    let mut sim = seeded(config.clone(), 14);
    for _ in 0..10 {
        sim.step();
        assert_within_margin(&sim);
    }

    config = ParticleConfig::drift();
    config.drift.frequency = f64::NAN;
    let mut sim = seeded(config, 15);
    for _ in 0..10 {
        sim.step();
        assert_within_margin(&sim);
    }
}

#[test]
fn test_empty_simulation_steps() {
    let config = ParticleConfig {
        count: -3,
        ..ParticleConfig::default()
    };
    let mut sim = seeded(config, 0);
    assert!(sim.particles().is_empty());
    sim.step();
    sim.initialize(-10, 100.0, 100.0);
    assert!(sim.particles().is_empty());
}

// ---- Motion ----

#[test]
fn test_ripple_shifts_x_by_sine_of_y() {
    let mut config = ParticleConfig::drift();
    config.decay = None;
    let p = Particle::new(100.0, 200.0, 0.0, 0.0, 1.0, Color::WHITE);
    let mut sim = Simulation::with_particles(config, 640.0, 480.0, vec![p], ChaCha8Rng::seed_from_u64(0));
    sim.step();

    let expected = 100.0 + (200.0_f64 * 0.01).sin() * 0.5;
    let moved = sim.particles()[0];
    assert!((moved.pos[0] - expected).abs() < 1e-12);
    assert_eq!(moved.pos[1], 200.0);
}

// ---- Determinism ----

#[test]
fn test_determinism_same_seed() {
    for config in vec![ParticleConfig::constellation(), ParticleConfig::drift()] {
        let mut sim_a = seeded(config.clone(), 12345);
        let mut sim_b = seeded(config, 12345);
        sim_a.set_cursor(200.0, 200.0);
        sim_b.set_cursor(200.0, 200.0);
        for _ in 0..300 {
            sim_a.step();
            sim_b.step();
            assert_eq!(sim_a.particles(), sim_b.particles(), "trajectories diverged");
        }
    }
}

#[test]
fn test_determinism_different_seeds() {
    let sim_a = seeded(ParticleConfig::default(), 111);
    let sim_b = seeded(ParticleConfig::default(), 222);
    assert_ne!(sim_a.particles(), sim_b.particles());
}

// ---- Resize ----

#[test]
fn test_reset_resize_respawns_inside_new_bounds() {
    let config = ParticleConfig {
        resize: ResizePolicy::Reset,
        ..ParticleConfig::constellation()
    };
    let mut sim = seeded(config, 8);
    sim.resize(200.0, 150.0);
    assert_eq!(sim.particles().len(), 100);
    for p in sim.particles() {
        assert!(p.pos[0] >= 0.0 && p.pos[0] <= 200.0);
        assert!(p.pos[1] >= 0.0 && p.pos[1] <= 150.0);
    }
}

#[test]
fn test_preserve_resize_corrects_on_next_step() {
    let mut sim = seeded(ParticleConfig::constellation(), 9);
    let before = sim.particles().to_vec();
    sim.resize(100.0, 80.0);

    assert_eq!(sim.particles(), &before[..]);
    let margin = sim.config().margin;
    assert!(sim
        .particles()
        .iter()
        .any(|p| p.pos[0] > 100.0 + margin || p.pos[1] > 80.0 + margin));

    sim.step();
    assert_eq!(sim.particles().len(), before.len());
    assert_within_margin(&sim);
}

#[test]
fn test_preserve_resize_respawn_policy() {
    let config = ParticleConfig {
        resize: ResizePolicy::Preserve,
        ..ParticleConfig::drift()
    };
    let mut sim = seeded(config, 10);
    sim.resize(50.0, 50.0);
    sim.step();
    assert_eq!(sim.particles().len(), 60);
    assert_within_margin(&sim);
}

// ---- Cursor ----

fn cursor_config(mode: CursorMode, boundary: BoundaryPolicy) -> ParticleConfig {
    let mut config = match boundary {
        BoundaryPolicy::Bounce => ParticleConfig::constellation(),
        BoundaryPolicy::Respawn => ParticleConfig::drift(),
    };
    config.cursor.mode = mode;
    config.drift.amplitude = 0.0;
    config.decay = None;
    config
}

#[test]
fn test_cursor_repels_particle_in_radius() {
    let p = Particle::new(300.0, 200.0, 0.0, 0.0, 1.0, Color::WHITE);
    let config = cursor_config(CursorMode::Repel, BoundaryPolicy::Bounce);
    let mut sim = Simulation::with_particles(config, 640.0, 480.0, vec![p], ChaCha8Rng::seed_from_u64(0));
    sim.set_cursor(340.0, 230.0);

    let before = distance(sim.particles()[0].pos, [340.0, 230.0]);
    sim.step();
    let after = distance(sim.particles()[0].pos, [340.0, 230.0]);
    assert!(after > before);
}

#[test]
fn test_cursor_attracts_particle_in_radius() {
    let p = Particle::new(300.0, 200.0, 0.0, 0.0, 1.0, Color::WHITE);
    let config = cursor_config(CursorMode::Attract, BoundaryPolicy::Respawn);
    let mut sim = Simulation::with_particles(config, 640.0, 480.0, vec![p], ChaCha8Rng::seed_from_u64(0));
    sim.set_cursor(340.0, 230.0);

    let before = distance(sim.particles()[0].pos, [340.0, 230.0]);
    sim.step();
    let after = distance(sim.particles()[0].pos, [340.0, 230.0]);
    assert!(after < before);
}

#[test]
fn test_cursor_ignores_far_particles() {
    let p = Particle::new(10.0, 10.0, 0.0, 0.0, 1.0, Color::WHITE);
    let config = cursor_config(CursorMode::Repel, BoundaryPolicy::Bounce);
    let mut sim = Simulation::with_particles(config, 640.0, 480.0, vec![p], ChaCha8Rng::seed_from_u64(0));
    sim.set_cursor(400.0, 400.0);
    sim.step();
    assert_eq!(sim.particles()[0].pos, [10.0, 10.0]);
}

// ---- Rendering ----

#[test]
fn test_render_is_idempotent() {
    for config in vec![ParticleConfig::constellation(), ParticleConfig::drift()] {
        let mut sim = Simulation::new(config, 160.0, 120.0, ChaCha8Rng::seed_from_u64(5));
        for _ in 0..10 {
            sim.step();
        }

        let mut renderer = Renderer::new();
        let mut surface = PixelSurface::new(160, 120);
        renderer.render(&sim, &mut surface).unwrap();
        let first = surface.pixels().to_vec();
        renderer.render(&sim, &mut surface).unwrap();

        assert!(first.iter().any(|&b| b != 0));
        assert_eq!(first, surface.pixels());
    }
}

#[test]
fn test_render_does_not_touch_particles() {
    let mut sim = seeded(ParticleConfig::constellation(), 6);
    sim.step();
    let before = sim.particles().to_vec();
    let mut surface = PixelSurface::new(640, 480);
    Renderer::new().render(&sim, &mut surface).unwrap();
    assert_eq!(sim.particles(), &before[..]);
}

#[test]
fn test_render_link_count_matches_pairs() {
    let particles = vec![
        Particle::new(0.0, 0.0, 0.0, 0.0, 1.0, Color::WHITE),
        Particle::new(50.0, 0.0, 0.0, 0.0, 1.0, Color::WHITE),
        Particle::new(200.0, 0.0, 0.0, 0.0, 1.0, Color::WHITE),
    ];
    let sim = Simulation::with_particles(
        ParticleConfig::constellation(),
        300.0,
        10.0,
        particles,
        ChaCha8Rng::seed_from_u64(0),
    );
    let mut renderer = Renderer::new();
    renderer.render(&sim, &mut PixelSurface::new(300, 10)).unwrap();
    let links = renderer.links();
    assert_eq!(links.len(), 1);
    assert_eq!((links[0].a, links[0].b), (0, 1));
}
